//! Blind objects: opaque records keyed by a numeric tag.
//!
//! Two tags are understood: keyframe tracks and scatter volumes. Both
//! are named positionally from the queues collected during world-object
//! decoding, since the records themselves carry no name. Every other tag
//! is skipped by its self-declared byte length.

use std::io::{Read, Seek};

use log::warn;

use crate::error::{DatError, Result};
use crate::objects::NameTables;
use crate::reader::{ReadExt, SeekExt};
use crate::types::Vec3;

/// Engine tag for keyframe track records
pub const KEYFRAMER_TAG: u32 = 1_789_855_876;
/// Engine tag for scatter volume records
pub const SCATTER_VOLUME_TAG: u32 = 1_945_451_140;

/// Label used when a track outnumbers the collected names
pub const UNNAMED_TRACK: &str = "<Unknown KeyFramer Name>";
/// Label used when a volume set outnumbers the collected names
pub const UNNAMED_SCATTER: &str = "<Unknown ScatterVolume Name>";

/// One key of a keyframe track
#[derive(Debug, Clone)]
pub struct Keyframe {
    /// Derived key name: `{base}0` for the first key, `{base}NN` after
    pub name: String,
    pub position: Vec3,
    /// Euler rotation in degrees
    pub rotation: Vec3,
    pub timestamp: f32,
    pub sound_radius: f32,
    pub sound_name: String,
    pub command: String,
    pub bezier_prev: Option<Vec3>,
    pub bezier_next: Option<Vec3>,
}

/// A named sequence of keyframes
#[derive(Debug, Clone)]
pub struct KeyframeTrack {
    pub name: String,
    pub keys: Vec<Keyframe>,
}

#[derive(Debug, Clone)]
pub struct ScatterParticle {
    pub position: Vec3,
    pub color: u32,
    pub scale: f32,
    pub wave_rotation: u8,
    pub wave_start: u8,
}

#[derive(Debug, Clone)]
pub struct ScatterVolume {
    pub position: Vec3,
    pub dims: Vec3,
    pub particles: Vec<ScatterParticle>,
}

/// A named group of scatter volumes
#[derive(Debug, Clone)]
pub struct ScatterVolumeSet {
    pub name: String,
    pub volumes: Vec<ScatterVolume>,
}

/// All interpreted blind objects
#[derive(Debug, Clone, Default)]
pub struct BlindObjects {
    pub tracks: Vec<KeyframeTrack>,
    pub scatter_sets: Vec<ScatterVolumeSet>,
    /// Count of records passed through uninterpreted
    pub skipped: u32,
}

/// Reads the blind-object section from the current cursor position,
/// consuming names from `tables` positionally.
pub fn read_blind_objects<R: Read + Seek>(
    reader: &mut R,
    tables: &mut NameTables,
) -> Result<BlindObjects> {
    let count = reader.read_u32_le()?;
    let mut blind = BlindObjects::default();

    for _ in 0..count {
        let engine_size = reader.read_u32_le()?;
        let tag = reader.read_u32_le()?;

        match tag {
            KEYFRAMER_TAG => {
                let name = match tables.keyframer_names.take() {
                    Some(n) => n.to_owned(),
                    None => {
                        warn!("keyframe track without a matching KeyFramer BaseKeyName");
                        UNNAMED_TRACK.to_owned()
                    }
                };
                blind.tracks.push(read_keyframe_track(reader, name)?);
            }
            SCATTER_VOLUME_TAG => {
                let name = match tables.scatter_names.take() {
                    Some(n) => n.to_owned(),
                    None => {
                        warn!("scatter volume without a matching ScatterVolume name");
                        UNNAMED_SCATTER.to_owned()
                    }
                };
                blind.scatter_sets.push(read_scatter_set(reader, name)?);
            }
            _ => {
                reader.skip(engine_size as u64)?;
                blind.skipped += 1;
            }
        }
    }

    Ok(blind)
}

fn read_keyframe_track<R: Read + Seek>(reader: &mut R, name: String) -> Result<KeyframeTrack> {
    let key_count = reader.read_u32_le()?;
    let mut keys = Vec::with_capacity(key_count as usize);

    for index in 0..key_count {
        let key_type = reader.read_u16_le()?;
        let sound_name_len = reader.read_u8()?;
        let command_len = reader.read_u8()?;

        let position = reader.read_vec3()?;
        let rotation = reader.read_vec3()?;
        let timestamp = reader.read_f32_le()?;
        let sound_radius = reader.read_f32_le()?;

        let sound_name = reader.read_string_raw(sound_name_len as usize)?;
        let command = reader.read_string_raw(command_len as usize)?;

        // Bit 0: previous Bezier tangent present, bit 1: next. Anything
        // else has no defined length, so the stream cannot be resynced.
        let (bezier_prev, bezier_next) = match key_type {
            0x0000 => (None, None),
            0x0001 => (Some(reader.read_vec3()?), None),
            0x0002 => (None, Some(reader.read_vec3()?)),
            0x0003 => (Some(reader.read_vec3()?), Some(reader.read_vec3()?)),
            code => {
                return Err(DatError::UnknownKeyType {
                    code,
                    offset: reader.stream_position()?,
                });
            }
        };

        keys.push(Keyframe {
            name: key_label(&name, index),
            position,
            rotation,
            timestamp,
            sound_radius,
            sound_name,
            command,
            bezier_prev,
            bezier_next,
        });
    }

    Ok(KeyframeTrack { name, keys })
}

/// Key 0 is `{base}0`; later keys are zero-padded to two digits.
fn key_label(base: &str, index: u32) -> String {
    if index == 0 {
        format!("{base}0")
    } else {
        format!("{base}{index:02}")
    }
}

fn read_scatter_set<R: Read>(reader: &mut R, name: String) -> Result<ScatterVolumeSet> {
    let volume_count = reader.read_u32_le()?;
    let mut volumes = Vec::with_capacity(volume_count as usize);

    for _ in 0..volume_count {
        let position = reader.read_vec3()?;
        let dims = reader.read_vec3()?;
        let particle_count = reader.read_u32_le()?;

        let mut particles = Vec::with_capacity(particle_count as usize);
        for _ in 0..particle_count {
            particles.push(ScatterParticle {
                position: reader.read_vec3()?,
                color: reader.read_u32_le()?,
                scale: reader.read_f32_le()?,
                wave_rotation: reader.read_u8()?,
                wave_start: reader.read_u8()?,
            });
        }

        volumes.push(ScatterVolume {
            position,
            dims,
            particles,
        });
    }

    Ok(ScatterVolumeSet { name, volumes })
}
