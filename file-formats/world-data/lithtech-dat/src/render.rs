//! The render-node graph: renderable geometry with per-section material
//! data, plus the sky portals, occluders, and light groups attached to
//! each node.
//!
//! Render nodes carry two child-index fields forming an implicit binary
//! tree. The export pipeline never uses that tree (nodes are processed
//! in declaration order) but the fields are decoded so the cursor stays
//! aligned and the transcript can show them.

use std::io::{Read, Seek};

use crate::error::Result;
use crate::reader::{ReadExt, SeekExt};
use crate::types::{UVec3, Vec2, Vec3};

/// Vertex record layout selected on the command line. Jupiter v85 worlds
/// exist both with and without a tangent/binormal block per vertex, and
/// nothing in the file says which.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// `-v1`: position, uvs, color, normal, tangent, binormal
    TangentBasis,
    /// `-v2`: position, uvs, color, normal
    Compact,
}

/// Shader classification code stored per section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderType {
    None,
    Gouraud,
    Lightmap,
    /// Texturing pass of lightmapping
    LightmapTexture,
    Skypan,
    SkyPortal,
    Occluder,
    /// Gouraud-shaded dual texture
    DualTexture,
    /// Texture stage of lightmap-shaded dual texture
    LightmapDualTexture,
    /// Renderblock splitter
    Splitter,
    Unknown(u8),
}

impl ShaderType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Gouraud,
            2 => Self::Lightmap,
            4 => Self::LightmapTexture,
            5 => Self::Skypan,
            6 => Self::SkyPortal,
            7 => Self::Occluder,
            8 => Self::DualTexture,
            9 => Self::LightmapDualTexture,
            10 => Self::Splitter,
            code => Self::Unknown(code),
        }
    }

    /// The collapsed name used for the `Lighting` property in LTA output.
    pub fn lighting_name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Gouraud | Self::DualTexture => "Gouraud",
            Self::Lightmap | Self::LightmapTexture | Self::LightmapDualTexture => "Lightmap",
            Self::Skypan => "Skypan",
            Self::SkyPortal => "SkyPortal",
            Self::Occluder => "Occluder",
            Self::Splitter => "Splitter",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// The distinct per-code name used by the diagnostic transcript.
    pub fn debug_name(self) -> String {
        match self {
            Self::None => "None".into(),
            Self::Gouraud => "Gouraud".into(),
            Self::Lightmap => "Lightmap".into(),
            Self::LightmapTexture => "Lightmap_Texture".into(),
            Self::Skypan => "Skypan".into(),
            Self::SkyPortal => "SkyPortal".into(),
            Self::Occluder => "Occluder".into(),
            Self::DualTexture => "DualTexture".into(),
            Self::LightmapDualTexture => "Lightmap_DualTexture".into(),
            Self::Splitter => "Splitter".into(),
            Self::Unknown(code) => format!("Unknown({code})"),
        }
    }
}

/// A sub-group of a node's triangles sharing textures and a shader code.
/// Texture names are stored raw; normalization happens at reconstruction.
#[derive(Debug, Clone)]
pub struct Section {
    pub texture0: String,
    pub texture1: String,
    pub shader: ShaderType,
    pub triangle_count: u32,
    pub texture_effect: String,
}

/// A render vertex. Tangent/binormal data (when present in the file) is
/// consumed but not kept; nothing downstream uses it.
#[derive(Debug, Clone, Copy)]
pub struct RenderVertex {
    pub position: Vec3,
    pub uv0: Vec2,
    pub uv1: Vec2,
    pub color: [u8; 4],
    pub normal: Vec3,
}

/// A sky-portal polygon
#[derive(Debug, Clone)]
pub struct PortalPoly {
    pub vertices: Vec<Vec3>,
    pub normal: Vec3,
    pub dist: f32,
}

/// An occluder polygon; the name is stored as a hash only
#[derive(Debug, Clone)]
pub struct OccluderPoly {
    pub vertices: Vec<Vec3>,
    pub normal: Vec3,
    pub dist: f32,
    pub name_hash: u32,
}

/// A per-node light group. Lightmap payloads are consumed, not kept.
#[derive(Debug, Clone)]
pub struct LightGroup {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct RenderNode {
    pub center: Vec3,
    pub half_dims: Vec3,
    pub sections: Vec<Section>,
    pub vertices: Vec<RenderVertex>,
    /// Flat triangle stream; per-section slices are recovered from the
    /// section triangle counts.
    pub triangles: Vec<[u32; 3]>,
    pub sky_portals: Vec<PortalPoly>,
    pub occluders: Vec<OccluderPoly>,
    pub light_groups: Vec<LightGroup>,
    pub child_flags: u8,
    pub child_indices: [u32; 2],
}

impl RenderNode {
    pub fn read<R: Read + Seek>(reader: &mut R, layout: VertexLayout) -> Result<Self> {
        let center = reader.read_vec3()?;
        let half_dims = reader.read_vec3()?;

        let section_count = reader.read_u32_le()?;
        let mut sections = Vec::with_capacity(section_count as usize);
        for _ in 0..section_count {
            sections.push(read_section(reader)?);
        }

        let vertex_count = reader.read_u32_le()?;
        let mut vertices = Vec::with_capacity(vertex_count as usize);
        for _ in 0..vertex_count {
            vertices.push(read_vertex(reader, layout)?);
        }

        let triangle_count = reader.read_u32_le()?;
        let mut triangles = Vec::with_capacity(triangle_count as usize);
        for _ in 0..triangle_count {
            let tri = [
                reader.read_u32_le()?,
                reader.read_u32_le()?,
                reader.read_u32_le()?,
            ];
            let _poly_index = reader.read_u32_le()?;
            triangles.push(tri);
        }

        let portal_count = reader.read_u32_le()?;
        let mut sky_portals = Vec::with_capacity(portal_count as usize);
        for _ in 0..portal_count {
            let vertex_count = reader.read_u8()?;
            let mut verts = Vec::with_capacity(vertex_count as usize);
            for _ in 0..vertex_count {
                verts.push(reader.read_vec3()?);
            }
            sky_portals.push(PortalPoly {
                vertices: verts,
                normal: reader.read_vec3()?,
                dist: reader.read_f32_le()?,
            });
        }

        let occluder_count = reader.read_u32_le()?;
        let mut occluders = Vec::with_capacity(occluder_count as usize);
        for _ in 0..occluder_count {
            let vertex_count = reader.read_u8()?;
            let mut verts = Vec::with_capacity(vertex_count as usize);
            for _ in 0..vertex_count {
                verts.push(reader.read_vec3()?);
            }
            occluders.push(OccluderPoly {
                vertices: verts,
                normal: reader.read_vec3()?,
                dist: reader.read_f32_le()?,
                name_hash: reader.read_u32_le()?,
            });
        }

        let light_group_count = reader.read_u32_le()?;
        let mut light_groups = Vec::with_capacity(light_group_count as usize);
        for _ in 0..light_group_count {
            light_groups.push(read_light_group(reader)?);
        }

        let child_flags = reader.read_u8()?;
        let child_indices = [reader.read_u32_le()?, reader.read_u32_le()?];

        Ok(Self {
            center,
            half_dims,
            sections,
            vertices,
            triangles,
            sky_portals,
            occluders,
            light_groups,
            child_flags,
            child_indices,
        })
    }
}

fn read_section<R: Read + Seek>(reader: &mut R) -> Result<Section> {
    let texture0 = reader.read_string()?;
    let texture1 = reader.read_string()?;
    let shader = ShaderType::from_code(reader.read_u8()?);
    let triangle_count = reader.read_u32_le()?;
    let texture_effect = reader.read_string()?;

    // Inline compressed lightmap: width, height, byte size, payload.
    let _lightmap_width = reader.read_u32_le()?;
    let _lightmap_height = reader.read_u32_le()?;
    let lightmap_size = reader.read_u32_le()?;
    reader.skip(lightmap_size as u64)?;

    Ok(Section {
        texture0,
        texture1,
        shader,
        triangle_count,
        texture_effect,
    })
}

fn read_vertex<R: Read>(reader: &mut R, layout: VertexLayout) -> Result<RenderVertex> {
    let position = reader.read_vec3()?;
    let uv0 = reader.read_vec2()?;
    let uv1 = reader.read_vec2()?;
    let mut color = [0u8; 4];
    let color_bytes = reader.read_bytes(4)?;
    color.copy_from_slice(&color_bytes);
    let normal = reader.read_vec3()?;

    if layout == VertexLayout::TangentBasis {
        let _tangent = reader.read_vec3()?;
        let _binormal = reader.read_vec3()?;
    }

    Ok(RenderVertex {
        position,
        uv0,
        uv1,
        color,
        normal,
    })
}

fn read_light_group<R: Read + Seek>(reader: &mut R) -> Result<LightGroup> {
    let name = reader.read_string()?;
    let _color = reader.read_vec3()?;

    let intensity_len = reader.read_u32_le()?;
    reader.skip(intensity_len as u64)?;

    let section_count = reader.read_u32_le()?;
    for _ in 0..section_count {
        let sub_count = reader.read_u32_le()?;
        for _ in 0..sub_count {
            // left, top, width, height
            reader.skip(16)?;
            let data_len = reader.read_u32_le()?;
            reader.skip(data_len as u64)?;
        }
    }

    Ok(LightGroup { name })
}

/// A render sub-tree attached to a named placeable
#[derive(Debug, Clone)]
pub struct WorldModelNode {
    pub name: String,
    pub nodes: Vec<RenderNode>,
    pub no_child_flag: u32,
}

impl WorldModelNode {
    pub fn read<R: Read + Seek>(reader: &mut R, layout: VertexLayout) -> Result<Self> {
        let name = reader.read_string()?;
        let node_count = reader.read_u32_le()?;
        let mut nodes = Vec::with_capacity(node_count as usize);
        for _ in 0..node_count {
            nodes.push(RenderNode::read(reader, layout)?);
        }
        let no_child_flag = reader.read_u32_le()?;

        Ok(Self {
            name,
            nodes,
            no_child_flag,
        })
    }
}

/// A world-level light group in the render-data tail; grid data consumed
#[derive(Debug, Clone)]
pub struct GlobalLightGroup {
    pub name: String,
    pub color: Vec3,
    pub offset: UVec3,
    pub size: UVec3,
}

/// The full render-data section
#[derive(Debug, Clone, Default)]
pub struct RenderData {
    pub nodes: Vec<RenderNode>,
    pub model_nodes: Vec<WorldModelNode>,
    pub light_groups: Vec<GlobalLightGroup>,
}

impl RenderData {
    pub fn read<R: Read + Seek>(reader: &mut R, layout: VertexLayout) -> Result<Self> {
        let node_count = reader.read_u32_le()?;
        let mut nodes = Vec::with_capacity(node_count as usize);
        for _ in 0..node_count {
            nodes.push(RenderNode::read(reader, layout)?);
        }

        let model_node_count = reader.read_u32_le()?;
        let mut model_nodes = Vec::with_capacity(model_node_count as usize);
        for _ in 0..model_node_count {
            model_nodes.push(WorldModelNode::read(reader, layout)?);
        }

        let light_group_count = reader.read_u32_le()?;
        let mut light_groups = Vec::with_capacity(light_group_count as usize);
        for _ in 0..light_group_count {
            let name = reader.read_string()?;
            let color = reader.read_vec3()?;
            let offset = reader.read_uvec3()?;
            let size = reader.read_uvec3()?;
            let data_len = u64::from(size.x) * u64::from(size.y) * u64::from(size.z);
            reader.skip(data_len)?;
            light_groups.push(GlobalLightGroup {
                name,
                color,
                offset,
                size,
            });
        }

        Ok(Self {
            nodes,
            model_nodes,
            light_groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_type_mapping() {
        assert_eq!(ShaderType::from_code(4), ShaderType::LightmapTexture);
        assert_eq!(ShaderType::from_code(4).lighting_name(), "Lightmap");
        assert_eq!(ShaderType::from_code(4).debug_name(), "Lightmap_Texture");

        assert_eq!(ShaderType::from_code(8).lighting_name(), "Gouraud");
        assert_eq!(ShaderType::from_code(8).debug_name(), "DualTexture");

        assert_eq!(ShaderType::from_code(3), ShaderType::Unknown(3));
        assert_eq!(ShaderType::from_code(3).debug_name(), "Unknown(3)");
        assert_eq!(ShaderType::from_code(11).lighting_name(), "Unknown");
    }
}
