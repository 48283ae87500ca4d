//! LTA output: the nested parenthesized scene-exchange grammar.
//!
//! [`export_scene`] writes the renderable world (geometry brushes,
//! objects, keyframe tracks, sky portals, occluders) and
//! [`export_physics`] writes the collision surfaces, each as one
//! complete LTA document.

mod physics;
mod polyhedron;
mod proplist;
mod scene;
mod writer;

pub use physics::export_physics;
pub use scene::{OCCLUDER_PLACEHOLDER, UNMATCHED_LABEL, export_scene};
pub use writer::LtaWriter;
