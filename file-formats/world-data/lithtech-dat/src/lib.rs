//! # LithTech DAT World Parser
//!
//! This library decodes LithTech Jupiter v85 compiled world files (`.dat`)
//! and re-emits them as editable LTA scene descriptions, preserving
//! geometry, texturing, and object/keyframe metadata well enough to
//! re-edit the level.
//!
//! ## Features
//!
//! - **Parsing**: Walk the full record stream: header, world info,
//!   spatial tree with collision models, object property bags, blind
//!   objects (keyframe tracks, scatter volumes), particle blockers, and
//!   the render-node graph
//! - **Reconstruction**: Slice flat triangle streams back into
//!   per-material brushes with self-contained point lists
//! - **Texture mapping**: Recover per-polygon texture-space frames from
//!   UV coordinates and texture pixel dimensions
//! - **Export**: Emit the scene and its collision surfaces as LTA text
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use lithtech_dat::{VertexLayout, World};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("example.dat")?;
//! let mut reader = BufReader::new(file);
//! let world = World::parse(&mut reader, VertexLayout::Compact)?;
//!
//! println!("Version: {}", world.header.version);
//! println!("Objects: {}", world.objects.len());
//! println!("Render nodes: {}", world.render.nodes.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`reader`]: Little-endian primitive decoding over a byte cursor
//! - [`header`]: Section offset table
//! - [`world_info`]: World metadata and the coordinate offset
//! - [`world_tree`]: Spatial partition tree
//! - [`world_model`]: Collision models and surface flags
//! - [`objects`]: Object property bags and name side tables
//! - [`blind`]: Tagged blind-object records
//! - [`render`]: Render-node graph
//! - [`geometry`]: Per-section geometry reconstruction
//! - [`tex_basis`]: Texture-space basis recovery
//! - [`dtx`]: Texture descriptor dimension lookup
//! - [`lta`]: LTA text emission
//! - [`error`]: Error types and handling

pub mod blind;
pub mod dtx;
pub mod error;
pub mod geometry;
pub mod header;
pub mod lta;
pub mod objects;
pub mod reader;
pub mod render;
pub mod tex_basis;
pub mod types;
pub mod world;
pub mod world_info;
pub mod world_model;
pub mod world_tree;

pub use blind::{BlindObjects, Keyframe, KeyframeTrack, ScatterVolumeSet};
pub use dtx::TextureCatalog;
pub use error::{DatError, Result};
pub use geometry::{PrimitiveGroup, reconstruct_groups};
pub use header::WorldHeader;
pub use lta::{export_physics, export_scene};
pub use objects::{NameTables, PropertyValue, WorldObject, name_hash};
pub use render::{RenderData, RenderNode, Section, ShaderType, VertexLayout};
pub use tex_basis::{TextureSpace, texture_space};
pub use types::{BoundingBox, Quat, UVec3, Vec2, Vec3};
pub use world::World;
pub use world_info::{WorldInfo, WorldOffset};
pub use world_model::{SurfaceFlags, WorldModel};
pub use world_tree::WorldTree;
