//! Global property-list entries.
//!
//! Every structural node that received a nonzero `propid` owns exactly
//! one entry here, in propid order. The entries are written from the
//! descriptor list the structural pass produced, so the two sides cannot
//! drift apart.

use std::io::Write;

use crate::blind::Keyframe;
use crate::error::Result;
use crate::objects::{PropertyValue, WorldObject};
use crate::world_info::WorldOffset;

use super::writer::{LtaWriter, fmt_f32, fmt_vec3};

/// Field set for the brush proplist entries shared by geometry groups,
/// auxiliary groups, and physics surfaces.
#[derive(Debug, Clone)]
pub(super) struct BrushProps {
    pub name: String,
    pub type_name: &'static str,
    pub lighting: &'static str,
    pub texture_effect: Option<String>,
    pub not_a_step: bool,
    pub clip_light: bool,
    pub cast_shadow_mesh: bool,
    pub receive_light: bool,
    pub receive_shadows: bool,
    pub receive_sunlight: bool,
}

impl BrushProps {
    /// Lit geometry defaults: receive everything, cast shadows.
    pub fn lit(name: String, lighting: &'static str, texture_effect: Option<String>) -> Self {
        Self {
            name,
            type_name: "Normal",
            lighting,
            texture_effect,
            not_a_step: false,
            clip_light: true,
            cast_shadow_mesh: true,
            receive_light: true,
            receive_shadows: true,
            receive_sunlight: true,
        }
    }

    /// Non-rendered helper geometry: no lighting interaction at all.
    pub fn unlit(name: String, type_name: &'static str, lighting: &'static str) -> Self {
        Self {
            name,
            type_name,
            lighting,
            texture_effect: None,
            not_a_step: false,
            clip_light: false,
            cast_shadow_mesh: false,
            receive_light: false,
            receive_shadows: false,
            receive_sunlight: false,
        }
    }
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

pub(super) fn write_brush_proplist<W: Write>(w: &mut LtaWriter<W>, props: &BrushProps) -> Result<()> {
    w.open_list("proplist")?;
    w.item(&format!("string \"Name\" ( ) ( data \"{}\" )", props.name))?;
    w.item("vector \"Pos\" ( distance ) ( data ( vector ( 0.000000 0.000000 0.000000 ) ) )")?;
    w.item("rotation \"Rotation\" ( ) ( data ( eulerangles ( 0.000000 0.000000 0.000000 ) ) )")?;
    w.item("longint \"RenderGroup\" ( ) ( data 0.000000 )")?;
    w.item(&format!(
        "string \"Type\" ( staticlist ) ( data \"{}\" )",
        props.type_name
    ))?;
    w.item(&format!(
        "string \"Lighting\" ( staticlist ) ( data \"{}\" )",
        props.lighting
    ))?;
    w.item(&format!(
        "bool \"NotAStep\" ( ) ( data {} )",
        flag(props.not_a_step)
    ))?;
    w.item("bool \"Detail\" ( ) ( data 0 )")?;
    w.item("longint \"LightControl\" ( groupowner group1 ) ( data 0.000000 )")?;
    match &props.texture_effect {
        Some(effect) if !effect.is_empty() => w.item(&format!(
            "string \"TextureEffect\" ( textureeffect ) ( data \"{effect}\" )"
        ))?,
        _ => w.item("string \"TextureEffect\" ( textureeffect )")?,
    }
    w.item("color \"AmbientLight\" ( group1 ) ( data ( vector ( 0.000000 0.000000 0.000000 ) ) )")?;
    w.item("longint \"LMGridSize\" ( group1 ) ( data 0.000000 )")?;
    w.item(&format!(
        "bool \"ClipLight\" ( group1 ) ( data {} )",
        flag(props.clip_light)
    ))?;
    w.item(&format!(
        "bool \"CastShadowMesh\" ( group1 ) ( data {} )",
        flag(props.cast_shadow_mesh)
    ))?;
    w.item(&format!(
        "bool \"ReceiveLight\" ( group1 ) ( data {} )",
        flag(props.receive_light)
    ))?;
    w.item(&format!(
        "bool \"ReceiveShadows\" ( group1 ) ( data {} )",
        flag(props.receive_shadows)
    ))?;
    w.item(&format!(
        "bool \"ReceiveSunlight\" ( group1 ) ( data {} )",
        flag(props.receive_sunlight)
    ))?;
    w.item("real \"LightPenScale\" ( group1 ) ( data 0.000000 )")?;
    w.item("real \"CreaseAngle\" ( group1 ) ( data 45.000000 )")?;
    w.close()?;
    Ok(())
}

/// Transcribes a world object's decoded property bag verbatim, in its
/// stored order. Only `Pos` is rewritten (world offset applied).
pub(super) fn write_object_proplist<W: Write>(
    w: &mut LtaWriter<W>,
    object: &WorldObject,
    offset: WorldOffset,
) -> Result<()> {
    w.open_list("proplist")?;
    for property in &object.properties {
        let key = &property.name;
        match &property.value {
            PropertyValue::String(s) => {
                w.item(&format!("string \"{key}\" ( ) ( data \"{s}\" )"))?;
            }
            PropertyValue::Vector(v) => {
                let v = if key == "Pos" { offset.apply(*v) } else { *v };
                w.item(&format!(
                    "vector \"{key}\" ( distance ) ( data ( vector ( {} ) ) )",
                    fmt_vec3(v)
                ))?;
            }
            PropertyValue::Color(v) => {
                w.item(&format!(
                    "color \"{key}\" ( ) ( data ( vector ( {} ) ) )",
                    fmt_vec3(*v)
                ))?;
            }
            PropertyValue::Real(r) => {
                w.item(&format!("real \"{key}\" ( ) ( data {} )", fmt_f32(*r)))?;
            }
            PropertyValue::Bool(b) => {
                w.item(&format!("bool \"{key}\" ( ) ( data {} )", flag(*b)))?;
            }
            PropertyValue::LongInt(v) => {
                w.item(&format!("longint \"{key}\" ( ) ( data {} )", fmt_f32(*v)))?;
            }
            PropertyValue::Rotation(q) => {
                w.item(&format!(
                    "rotation \"{key}\" ( ) ( data ( eulerangles ( {:.6} {:.6} {:.6} ) ) )",
                    q.x, q.y, q.z
                ))?;
            }
            PropertyValue::Unknown { .. } => {
                w.item(&format!("string \"{key}\" ( hidden )"))?;
            }
        }
    }
    w.close()?;
    Ok(())
}

pub(super) fn write_key_proplist<W: Write>(
    w: &mut LtaWriter<W>,
    key: &Keyframe,
    offset: WorldOffset,
) -> Result<()> {
    let bez_prev = key.bezier_prev.unwrap_or_default();
    let bez_next = key.bezier_next.unwrap_or_default();

    w.open_list("proplist")?;
    w.item(&format!("string \"Name\" ( ) ( data \"{}\" )", key.name))?;
    w.item(&format!(
        "vector \"Pos\" ( distance ) ( data ( vector ( {} ) ) )",
        fmt_vec3(offset.apply(key.position))
    ))?;
    w.item(&format!(
        "rotation \"Rotation\" ( ) ( data ( eulerangles ( {} ) ) )",
        fmt_vec3(key.rotation)
    ))?;
    w.item("longint \"RenderGroup\" ( ) ( data 0.000000 )")?;
    w.item(&format!(
        "real \"TimeStamp\" ( ) ( data {} )",
        fmt_f32(key.timestamp)
    ))?;
    if key.sound_name.is_empty() {
        w.item("string \"SoundName\" ( )")?;
    } else {
        w.item(&format!(
            "string \"SoundName\" ( ) ( data \"{}\" )",
            key.sound_name
        ))?;
    }
    w.item(&format!(
        "real \"SoundRadius\" ( radius ) ( data {} )",
        fmt_f32(key.sound_radius)
    ))?;
    if key.command.is_empty() {
        w.item("string \"Command\" ( notifychange )")?;
    } else {
        w.item(&format!(
            "string \"Command\" ( notifychange ) ( data \"{}\" )",
            key.command
        ))?;
    }
    w.item(&format!(
        "vector \"BezierPrev\" ( bezierprevtangent ) ( data ( vector ( {} ) ) )",
        fmt_vec3(bez_prev)
    ))?;
    w.item(&format!(
        "vector \"BezierNext\" ( beziernexttangent ) ( data ( vector ( {} ) ) )",
        fmt_vec3(bez_next)
    ))?;
    w.close()?;
    Ok(())
}
