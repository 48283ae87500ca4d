//! Physics/collision world models: the BSP-style solid representation
//! stored per solid group inside the world tree.

use std::io::Read;

use bitflags::bitflags;

use crate::error::Result;
use crate::reader::ReadExt;
use crate::types::Vec3;

bitflags! {
    /// Surface flags carried by collision surfaces
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SurfaceFlags: u32 {
        const SOLID = 1 << 0;
        const NONEXISTENT = 1 << 1;
        const INVISIBLE = 1 << 2;
        const SKY = 1 << 4;
        const FLATSHADE = 1 << 6;
        const LIGHTMAP = 1 << 7;
        const NOSUBDIV = 1 << 8;
        const PARTICLEBLOCKER = 1 << 10;
        const GOURAUDSHADE = 1 << 12;
        const PHYSICSBLOCKER = 1 << 17;
        const RBSPLITTER = 1 << 19;
        const VISBLOCKER = 1 << 21;
        const NOTASTEP = 1 << 22;
        const RECEIVELIGHT = 1 << 24;
        const RECEIVESHADOWS = 1 << 25;
        const RECEIVESUNLIGHT = 1 << 26;
        const SHADOWMESH = 1 << 28;
        const CASTSHADOWMESH = 1 << 29;
        const CLIPLIGHT = 1 << 30;
    }
}

impl SurfaceFlags {
    /// Names of the set flags, for the diagnostic transcript.
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }

    /// Editor surface type derived from the flag combination.
    pub fn surface_type(self) -> &'static str {
        if self.contains(Self::NONEXISTENT) {
            if self.contains(Self::VISBLOCKER) {
                "Occluder"
            } else if self.contains(Self::RBSPLITTER) {
                "RBSplitter"
            } else {
                "RenderOnly"
            }
        } else if !self.contains(Self::SOLID) {
            "NonSolid"
        } else if self.contains(Self::SKY) {
            "SkyPortal"
        } else {
            "Normal"
        }
    }

    /// Editor lighting classification derived from the flag combination.
    pub fn lighting_type(self) -> &'static str {
        if self.contains(Self::SHADOWMESH | Self::GOURAUDSHADE) {
            "ShadowMesh"
        } else if self.contains(Self::LIGHTMAP) {
            "Lightmap"
        } else if self.contains(Self::GOURAUDSHADE) {
            "Gouraud"
        } else if self.contains(Self::FLATSHADE) {
            "Flat"
        } else {
            "Gouraud"
        }
    }
}

/// A plane as normal plus distance
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f32,
}

/// A collision surface: flags plus a texture reference
#[derive(Debug, Clone, Copy)]
pub struct Surface {
    pub flags: SurfaceFlags,
    pub texture_index: u16,
    pub texture_flags: u16,
}

/// A polygon referencing a surface, a plane, and point indices
#[derive(Debug, Clone)]
pub struct Poly {
    pub surface: u32,
    pub plane: u32,
    pub indices: Vec<u32>,
}

/// A BSP node: polygon index plus two child links
#[derive(Debug, Clone, Copy)]
pub struct BspNode {
    pub poly: u32,
    pub leaf: u16,
    pub children: [i32; 2],
}

/// One solid group's collision representation
#[derive(Debug, Clone)]
pub struct WorldModel {
    pub world_info_flags: u32,
    pub name: String,
    pub portal_count: u32,
    pub leaf_count: u32,
    pub poly_vertex_count: u32,
    pub visible_list_count: u32,
    pub leaf_list_count: u32,
    pub bbox_min: Vec3,
    pub bbox_max: Vec3,
    pub translation: Vec3,
    pub texture_names: Vec<String>,
    pub planes: Vec<Plane>,
    pub surfaces: Vec<Surface>,
    pub polies: Vec<Poly>,
    pub nodes: Vec<BspNode>,
    pub points: Vec<Vec3>,
    pub root_node: i32,
    pub sections: u32,
}

impl WorldModel {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let _dummy = reader.read_u32_le()?;
        let world_info_flags = reader.read_u32_le()?;
        let name = reader.read_string()?;

        let point_count = reader.read_u32_le()?;
        let plane_count = reader.read_u32_le()?;
        let surface_count = reader.read_u32_le()?;
        let portal_count = reader.read_u32_le()?;
        let poly_count = reader.read_u32_le()?;
        let leaf_count = reader.read_u32_le()?;
        let poly_vertex_count = reader.read_u32_le()?;
        let visible_list_count = reader.read_u32_le()?;
        let leaf_list_count = reader.read_u32_le()?;
        let node_count = reader.read_u32_le()?;

        let bbox_min = reader.read_vec3()?;
        let bbox_max = reader.read_vec3()?;
        let translation = reader.read_vec3()?;

        let texture_blob_size = reader.read_u32_le()?;
        let _texture_name_count = reader.read_u32_le()?;
        let texture_blob = reader.read_bytes(texture_blob_size as usize)?;
        let texture_names = parse_texture_names(&texture_blob);

        // One byte per polygon giving its vertex count; the polygon
        // records themselves follow the plane and surface tables.
        let poly_vertex_counts = reader.read_bytes(poly_count as usize)?;

        let mut planes = Vec::with_capacity(plane_count as usize);
        for _ in 0..plane_count {
            planes.push(Plane {
                normal: reader.read_vec3()?,
                dist: reader.read_f32_le()?,
            });
        }

        let mut surfaces = Vec::with_capacity(surface_count as usize);
        for _ in 0..surface_count {
            surfaces.push(Surface {
                flags: SurfaceFlags::from_bits_retain(reader.read_u32_le()?),
                texture_index: reader.read_u16_le()?,
                texture_flags: reader.read_u16_le()?,
            });
        }

        let mut polies = Vec::with_capacity(poly_count as usize);
        for &vertex_count in &poly_vertex_counts {
            let surface = reader.read_u32_le()?;
            let plane = reader.read_u32_le()?;
            let mut indices = Vec::with_capacity(vertex_count as usize);
            for _ in 0..vertex_count {
                indices.push(reader.read_u32_le()?);
            }
            polies.push(Poly {
                surface,
                plane,
                indices,
            });
        }

        let mut nodes = Vec::with_capacity(node_count as usize);
        for _ in 0..node_count {
            nodes.push(BspNode {
                poly: reader.read_u32_le()?,
                leaf: reader.read_u16_le()?,
                children: [reader.read_i32_le()?, reader.read_i32_le()?],
            });
        }

        let mut points = Vec::with_capacity(point_count as usize);
        for _ in 0..point_count {
            points.push(reader.read_vec3()?);
        }

        let root_node = reader.read_i32_le()?;
        let sections = reader.read_u32_le()?;

        Ok(Self {
            world_info_flags,
            name,
            portal_count,
            leaf_count,
            poly_vertex_count,
            visible_list_count,
            leaf_list_count,
            bbox_min,
            bbox_max,
            translation,
            texture_names,
            planes,
            surfaces,
            polies,
            nodes,
            points,
            root_node,
            sections,
        })
    }

    /// Texture name for a surface index, falling back to `Default` when
    /// the stored index is out of range.
    pub fn texture_name(&self, surface_index: usize) -> &str {
        self.surfaces
            .get(surface_index)
            .and_then(|s| self.texture_names.get(s.texture_index as usize))
            .map_or("Default", String::as_str)
    }
}

fn parse_texture_names(blob: &[u8]) -> Vec<String> {
    blob.split(|&b| b == 0)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| String::from_utf8_lossy(chunk).replace('\\', "/"))
        .collect()
}
