//! Geometry reconstruction: slices a render node's flat triangle stream
//! back into per-section groups with self-contained local vertex lists.
//!
//! The LTA brush grammar requires every polyhedron to carry its own point
//! list, so each group's vertex indices are renumbered densely in first-
//! encounter order.

use std::collections::HashMap;

use log::warn;

use crate::error::{DatError, Result};
use crate::render::{RenderNode, RenderVertex, ShaderType};

/// Primary texture name marking an animation-only section. Such sections
/// are dropped entirely, name slot and triangles both.
pub const ANIMATION_MARKER: &str = "lightanim_base";

/// Fallback name substituted for empty texture slots
pub const DEFAULT_TEXTURE: &str = "Default";

/// One self-contained exportable group: the brush unit of the output
#[derive(Debug, Clone)]
pub struct PrimitiveGroup {
    pub texture0: String,
    pub texture1: String,
    pub shader: ShaderType,
    pub texture_effect: String,
    pub vertices: Vec<RenderVertex>,
    /// Triangles over the local vertex list
    pub triangles: Vec<[u32; 3]>,
}

/// Splits `node`'s triangles into per-section groups, dropping
/// animation-only sections and locally renumbering vertex indices.
///
/// Section triangle counts are checked against the decoded stream
/// length; on mismatch the smaller count wins so neither buffer is
/// overrun. A triangle index past the vertex buffer is a hard error.
pub fn reconstruct_groups(node: &RenderNode, node_label: &str) -> Result<Vec<PrimitiveGroup>> {
    let declared: u64 = node
        .sections
        .iter()
        .map(|s| u64::from(s.triangle_count))
        .sum();
    let actual = node.triangles.len() as u64;
    if declared != actual {
        warn!(
            "{node_label}: section triangle counts sum to {declared}, stream has {actual}; \
             using the smaller"
        );
    }
    let usable = declared.min(actual) as usize;

    let mut groups = Vec::new();
    let mut cursor = 0usize;

    for section in &node.sections {
        let take = (section.triangle_count as usize).min(usable - cursor);
        let triangles = &node.triangles[cursor..cursor + take];
        cursor += take;

        // The marker test uses the trimmed raw name, before the empty ->
        // Default substitution.
        let trimmed = section.texture0.trim();
        if trimmed.eq_ignore_ascii_case(ANIMATION_MARKER) {
            continue;
        }

        let mut local_vertices = Vec::new();
        let mut index_map: HashMap<u32, u32> = HashMap::new();
        let mut local_triangles = Vec::with_capacity(triangles.len());

        for tri in triangles {
            let mut local = [0u32; 3];
            for (slot, &index) in local.iter_mut().zip(tri.iter()) {
                *slot = match index_map.get(&index) {
                    Some(&mapped) => mapped,
                    None => {
                        let vertex = node.vertices.get(index as usize).copied().ok_or(
                            DatError::IndexOutOfRange {
                                index,
                                max: node.vertices.len() as u32,
                            },
                        )?;
                        let mapped = local_vertices.len() as u32;
                        local_vertices.push(vertex);
                        index_map.insert(index, mapped);
                        mapped
                    }
                };
            }
            local_triangles.push(local);
        }

        groups.push(PrimitiveGroup {
            texture0: normalize_texture(&section.texture0),
            texture1: normalize_texture(&section.texture1),
            shader: section.shader,
            texture_effect: section.texture_effect.clone(),
            vertices: local_vertices,
            triangles: local_triangles,
        });
    }

    Ok(groups)
}

fn normalize_texture(name: &str) -> String {
    if name.trim().is_empty() {
        DEFAULT_TEXTURE.to_owned()
    } else {
        name.to_owned()
    }
}
