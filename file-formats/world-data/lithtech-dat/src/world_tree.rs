//! Spatial partition tree and its world-model list.
//!
//! The tree layout is bit-packed: one bit per node, 1 for an internal
//! node with exactly four children, 0 for a leaf. The shape is not used
//! by the export pipeline, but the layout bytes sit between the tree
//! header and the world models, so they must be consumed exactly.

use std::io::Read;

use crate::error::Result;
use crate::reader::ReadExt;
use crate::types::Vec3;
use crate::world_model::WorldModel;

#[derive(Debug, Clone)]
pub struct WorldTree {
    pub root_bbox_min: Vec3,
    pub root_bbox_max: Vec3,
    pub sub_node_count: u32,
    pub terrain_depth: u32,
    /// Raw bit-packed layout, `(sub_node_count + 7) / 8` bytes.
    pub layout: Vec<u8>,
    pub models: Vec<WorldModel>,
}

impl WorldTree {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let root_bbox_min = reader.read_vec3()?;
        let root_bbox_max = reader.read_vec3()?;
        let sub_node_count = reader.read_u32_le()?;
        let terrain_depth = reader.read_u32_le()?;

        let layout_len = (sub_node_count as usize).div_ceil(8);
        let layout = reader.read_bytes(layout_len)?;

        let model_count = reader.read_u32_le()?;
        let mut models = Vec::with_capacity(model_count as usize);
        for _ in 0..model_count {
            models.push(WorldModel::read(reader)?);
        }

        Ok(Self {
            root_bbox_min,
            root_bbox_max,
            sub_node_count,
            terrain_depth,
            layout,
            models,
        })
    }

    /// Renders the layout bits as an indented tree for the transcript.
    pub fn layout_tree_lines(&self) -> Vec<String> {
        let mut bits = BitCursor::new(&self.layout);
        let mut lines = Vec::new();
        if !self.layout.is_empty() {
            walk_layout(&mut bits, "", true, &mut lines);
        }
        lines
    }
}

struct BitCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn next(&mut self) -> bool {
        let bit = self
            .data
            .get(self.pos / 8)
            .is_some_and(|byte| (byte >> (self.pos % 8)) & 1 == 1);
        self.pos += 1;
        bit
    }
}

fn walk_layout(bits: &mut BitCursor<'_>, prefix: &str, is_last: bool, out: &mut Vec<String>) {
    let internal = bits.next();
    let connector = if is_last { "└── " } else { "├── " };
    let kind = if internal { "[Node]" } else { "[Leaf]" };
    out.push(format!("{prefix}{connector}{kind}"));

    if internal {
        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        for i in 0..4 {
            walk_layout(bits, &child_prefix, i == 3, out);
        }
    }
}
