//! Collision re-encoding: the `_PhysicsDATA` LTA containing one brush
//! per (world model, surface) group, annotated with the surface-type and
//! lighting classification decoded from the surface flags.

use std::collections::BTreeMap;
use std::io::Write;

use crate::error::{DatError, Result};
use crate::tex_basis::TextureSpace;
use crate::types::Vec3;
use crate::world::World;
use crate::world_info::WorldOffset;
use crate::world_model::{Poly, SurfaceFlags, WorldModel};

use super::proplist::{BrushProps, write_brush_proplist};
use super::writer::{LtaWriter, fmt_f32, fmt_vec3};

/// Exports physics/collision surfaces grouped by solid model.
pub fn export_physics<W: Write>(out: W, world: &World, map_name: &str) -> Result<()> {
    let offset = world.info.world_offset();
    let mut w = LtaWriter::new(out);

    w.open("world")?;
    w.open_list("header")?;
    w.item("versioncode 2")?;
    w.close()?;

    // Geometry: one polyhedron per surface group, surfaces ascending
    // within each model. The same iteration below numbers the brushes.
    w.open_list("polyhedronlist")?;
    let mut surface_order: Vec<(usize, u32)> = Vec::new();
    for (m, model) in world.tree.models.iter().enumerate() {
        for (surface, polys) in &polys_by_surface(model) {
            surface_order.push((m, *surface));
            write_surface_brush(&mut w, model, *surface, polys, offset)?;
        }
    }
    w.close()?;

    // Hierarchy: a container per model, a brush child per surface group.
    let mut nodeid = 1u32;
    let mut propid = 1u32;
    let mut brushindex = 0u32;

    w.open("nodehierarchy")?;
    w.open("worldnode")?;
    w.item("type null")?;
    w.item(&format!("label \"{map_name}_PhysicsDATA\""))?;
    w.item(&format!("nodeid {nodeid}"))?;
    nodeid += 1;
    w.item("flags ( worldroot expanded )")?;
    w.open("properties")?;
    w.item("propid 0")?;
    w.close()?;
    w.open_list("childlist")?;

    for model in &world.tree.models {
        w.open("worldnode")?;
        w.item("type null")?;
        w.item(&format!("label \"{}\"", model.name))?;
        w.item(&format!("nodeid {nodeid}"))?;
        nodeid += 1;
        w.item("flags ( )")?;
        w.open("properties")?;
        w.item("propid 0")?;
        w.close()?;
        w.open_list("childlist")?;

        for _ in polys_by_surface(model).keys() {
            w.open("worldnode")?;
            w.item("type brush")?;
            w.item(&format!("brushindex {brushindex}"))?;
            brushindex += 1;
            w.item(&format!("nodeid {nodeid}"))?;
            nodeid += 1;
            w.item("flags ( )")?;
            w.open("properties")?;
            w.item("name \"Brush\"")?;
            w.item(&format!("propid {propid}"))?;
            propid += 1;
            w.close()?;
            w.close()?;
        }

        w.close()?;
        w.close()?;
    }

    w.close()?;
    w.close()?;
    w.close()?; // nodehierarchy

    // Property list, same (model, surface) order as the brushes.
    w.open_list("globalproplist")?;
    w.open_list("proplist")?;
    w.close()?;

    let mut surface_index = 0usize;
    let mut last_model = usize::MAX;
    for &(m, surface) in &surface_order {
        if m != last_model {
            surface_index = 0;
            last_model = m;
        }
        let model = &world.tree.models[m];
        let flags = model
            .surfaces
            .get(surface as usize)
            .map_or(SurfaceFlags::empty(), |s| s.flags);

        let props = BrushProps {
            name: format!("Surface{surface_index}"),
            type_name: flags.surface_type(),
            lighting: flags.lighting_type(),
            texture_effect: None,
            not_a_step: flags.contains(SurfaceFlags::NOTASTEP),
            clip_light: flags.contains(SurfaceFlags::CLIPLIGHT),
            cast_shadow_mesh: flags.contains(SurfaceFlags::CASTSHADOWMESH),
            receive_light: flags.contains(SurfaceFlags::RECEIVELIGHT),
            receive_shadows: flags.contains(SurfaceFlags::RECEIVESHADOWS),
            receive_sunlight: flags.contains(SurfaceFlags::RECEIVESUNLIGHT),
        };
        write_brush_proplist(&mut w, &props)?;
        surface_index += 1;
    }

    w.close()?;
    w.close()?; // world
    Ok(())
}

/// Polygons grouped by surface index, ascending
fn polys_by_surface(model: &WorldModel) -> BTreeMap<u32, Vec<&Poly>> {
    let mut groups: BTreeMap<u32, Vec<&Poly>> = BTreeMap::new();
    for poly in &model.polies {
        groups.entry(poly.surface).or_default().push(poly);
    }
    groups
}

fn write_surface_brush<W: Write>(
    w: &mut LtaWriter<W>,
    model: &WorldModel,
    surface: u32,
    polys: &[&Poly],
    offset: WorldOffset,
) -> Result<()> {
    // Local point list over all of the group's polygons, first-encounter
    // order, shared by every polygon in the brush.
    let mut local_points: Vec<Vec3> = Vec::new();
    let mut point_map: std::collections::HashMap<u32, u32> = std::collections::HashMap::new();
    for poly in polys {
        for &index in &poly.indices {
            if !point_map.contains_key(&index) {
                let point =
                    model
                        .points
                        .get(index as usize)
                        .copied()
                        .ok_or(DatError::IndexOutOfRange {
                            index,
                            max: model.points.len() as u32,
                        })?;
                point_map.insert(index, local_points.len() as u32);
                local_points.push(point);
            }
        }
    }

    w.open_list("polyhedron")?;
    w.item("color 255 255 255")?;
    w.open("pointlist")?;
    for &point in &local_points {
        w.item(&format!("{} 255 255 255 255", fmt_vec3(offset.apply(point))))?;
    }
    w.close()?;

    let texture = model.texture_name(surface as usize);

    w.open_list("polylist")?;
    for poly in polys {
        let plane = model.planes.get(poly.plane as usize).copied().ok_or(
            DatError::IndexOutOfRange {
                index: poly.plane,
                max: model.planes.len() as u32,
            },
        )?;

        let indices: Vec<String> = poly
            .indices
            .iter()
            .map(|i| point_map[i].to_string())
            .collect();

        w.open("editpoly")?;
        w.item(&format!("f {}", indices.join(" ")))?;
        w.item(&format!("n {}", fmt_vec3(plane.normal)))?;
        w.item(&format!("dist {}", fmt_f32(plane.dist)))?;
        write_identity_textureinfo(w, texture)?;
        w.item("flags")?;
        w.item("shade 0 0 0")?;
        w.item("physicsmaterial \"Default\"")?;
        w.item("surfacekey \"\"")?;
        w.open_list("textures")?;
        w.open("1")?;
        write_identity_textureinfo(w, "Default")?;
        w.close()?;
        w.close()?;
        w.close()?;
    }
    w.close()?;

    w.close()?;
    Ok(())
}

fn write_identity_textureinfo<W: Write>(w: &mut LtaWriter<W>, texture: &str) -> Result<()> {
    let basis = TextureSpace::IDENTITY;
    w.open("textureinfo")?;
    w.item(&fmt_vec3(basis.origin))?;
    w.item(&fmt_vec3(basis.p))?;
    w.item(&fmt_vec3(basis.q))?;
    w.item("sticktopoly 1")?;
    w.item(&format!("name \"{texture}\""))?;
    w.close()?;
    Ok(())
}
