//! Top-level decode: walks every section of a DAT file into an
//! immutable in-memory [`World`].

use std::io::{Read, Seek};

use log::debug;

use crate::blind::{self, BlindObjects};
use crate::error::Result;
use crate::header::WorldHeader;
use crate::objects::{self, NameTables, WorldObject};
use crate::reader::{ReadExt, SeekExt};
use crate::render::{RenderData, VertexLayout};
use crate::types::Vec3;
use crate::world_info::WorldInfo;
use crate::world_tree::WorldTree;

/// A flat polygon with its plane, as stored in the collision and
/// particle-blocker sections.
#[derive(Debug, Clone)]
pub struct PolyRecord {
    pub normal: Vec3,
    pub dist: f32,
    pub vertices: Vec<Vec3>,
}

/// A fully decoded world. Built once, then read-only: the exporters and
/// the diagnostic transcript all render from this.
#[derive(Debug)]
pub struct World {
    pub header: WorldHeader,
    pub info: WorldInfo,
    pub tree: WorldTree,
    pub objects: Vec<WorldObject>,
    /// Name side tables; the keyframer/scatter queues are already
    /// consumed by the blind-object phase, the occluder hash table stays
    /// live for export.
    pub names: NameTables,
    pub blind: BlindObjects,
    pub particle_blockers: Vec<PolyRecord>,
    pub collision_polys: Vec<PolyRecord>,
    pub render: RenderData,
}

impl World {
    /// Decodes a whole world file.
    ///
    /// Phases run in a fixed order; the header, world info, and world
    /// tree are contiguous at the start of the file, every later section
    /// is reached through its header-declared absolute offset.
    pub fn parse<R: Read + Seek>(reader: &mut R, layout: VertexLayout) -> Result<Self> {
        let header = WorldHeader::read(reader)?;
        debug!("world version {}", header.version);

        let info = WorldInfo::read(reader)?;
        let tree = WorldTree::read(reader)?;
        debug!("world tree: {} models", tree.models.len());

        reader.goto(header.object_data_pos as u64)?;
        let (objects, mut names) = objects::read_world_objects(reader)?;
        debug!("{} world objects", objects.len());

        reader.goto(header.blind_object_data_pos as u64)?;
        let blind = blind::read_blind_objects(reader, &mut names)?;
        debug!(
            "{} keyframe tracks, {} scatter sets, {} blind records skipped",
            blind.tracks.len(),
            blind.scatter_sets.len(),
            blind.skipped
        );

        reader.goto(header.particle_blocker_data_pos as u64)?;
        let particle_blockers = read_poly_section(reader)?;

        reader.goto(header.collision_data_pos as u64)?;
        let collision_polys = read_poly_section(reader)?;

        reader.goto(header.render_data_pos as u64)?;
        let render = RenderData::read(reader, layout)?;
        debug!(
            "{} render nodes, {} world-model nodes",
            render.nodes.len(),
            render.model_nodes.len()
        );

        Ok(Self {
            header,
            info,
            tree,
            objects,
            names,
            blind,
            particle_blockers,
            collision_polys,
            render,
        })
    }
}

fn read_poly_section<R: Read>(reader: &mut R) -> Result<Vec<PolyRecord>> {
    let count = reader.read_u32_le()?;
    let mut polys = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let normal = reader.read_vec3()?;
        let dist = reader.read_f32_le()?;
        let vertex_count = reader.read_u32_le()?;
        let mut vertices = Vec::with_capacity(vertex_count as usize);
        for _ in 0..vertex_count {
            vertices.push(reader.read_vec3()?);
        }
        polys.push(PolyRecord {
            normal,
            dist,
            vertices,
        });
    }
    Ok(polys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_poly_section() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes());
        for f in [0.0f32, 1.0, 0.0, 5.0] {
            data.extend_from_slice(&f.to_le_bytes());
        }
        data.extend_from_slice(&3u32.to_le_bytes());
        for f in [0.0f32, 5.0, 0.0, 1.0, 5.0, 0.0, 0.0, 5.0, 1.0] {
            data.extend_from_slice(&f.to_le_bytes());
        }

        let polys = read_poly_section(&mut Cursor::new(data)).unwrap();
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].dist, 5.0);
        assert_eq!(polys[0].vertices.len(), 3);
    }
}
