//! Diagnostic transcript: plain text dump of every decoded field.
//!
//! Pure formatting over the parsed scene; no decode logic lives here.

use std::io::{self, Write};

use lithtech_dat::world::PolyRecord;
use lithtech_dat::{Keyframe, PropertyValue, Vec3, World, WorldModel};

fn vec3(v: Vec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

pub fn write_transcript<W: Write>(out: &mut W, world: &World) -> io::Result<()> {
    header(out, world)?;
    world_info(out, world)?;
    world_tree(out, world)?;
    objects(out, world)?;
    blind_objects(out, world)?;
    poly_section(out, "Particle Blockers", &world.particle_blockers)?;
    poly_section(out, "Collision Polygons", &world.collision_polys)?;
    render_data(out, world)?;
    Ok(())
}

fn header<W: Write>(out: &mut W, world: &World) -> io::Result<()> {
    let h = &world.header;
    writeln!(out, "Header Information:")?;
    writeln!(out, "  Version: {}", h.version)?;
    writeln!(out, "  ObjectDataPos:          0x{:08X}", h.object_data_pos)?;
    writeln!(
        out,
        "  BlindObjectDataPos:     0x{:08X}",
        h.blind_object_data_pos
    )?;
    writeln!(out, "  LightgridPos:           0x{:08X}", h.lightgrid_pos)?;
    writeln!(
        out,
        "  CollisionDataPos:       0x{:08X}",
        h.collision_data_pos
    )?;
    writeln!(
        out,
        "  ParticleBlockerDataPos: 0x{:08X}",
        h.particle_blocker_data_pos
    )?;
    writeln!(out, "  RenderDataPos:          0x{:08X}", h.render_data_pos)
}

fn world_info<W: Write>(out: &mut W, world: &World) -> io::Result<()> {
    let info = &world.info;
    writeln!(out, "\nWorld Info:")?;
    writeln!(out, "  Info String:      {}", info.info_string)?;
    writeln!(out, "  Extents Min:      {}", vec3(info.extents_min))?;
    writeln!(out, "  Extents Max:      {}", vec3(info.extents_max))?;
    writeln!(out, "  Offset:           {}", vec3(info.offset))
}

fn world_tree<W: Write>(out: &mut W, world: &World) -> io::Result<()> {
    let tree = &world.tree;
    writeln!(out, "\nWorldTree Info:")?;
    writeln!(out, "  Root BBox Min:    {}", vec3(tree.root_bbox_min))?;
    writeln!(out, "  Root BBox Max:    {}", vec3(tree.root_bbox_max))?;
    writeln!(out, "  Sub Nodes:        {}", tree.sub_node_count)?;
    writeln!(out, "  Terrain Depth:    {}", tree.terrain_depth)?;
    writeln!(out, "  Layout Size:      {} bytes", tree.layout.len())?;
    for line in tree.layout_tree_lines() {
        writeln!(out, "  {line}")?;
    }

    writeln!(out, "  WorldModels:      {} total", tree.models.len())?;
    for (i, model) in tree.models.iter().enumerate() {
        writeln!(out, "\n  [WorldModel {i}]")?;
        world_model(out, model)?;
    }
    Ok(())
}

fn world_model<W: Write>(out: &mut W, model: &WorldModel) -> io::Result<()> {
    writeln!(out, "  Name:                {}", model.name)?;
    writeln!(out, "  World Info Flags:    {}", model.world_info_flags)?;
    writeln!(out, "  Points:              {}", model.points.len())?;
    writeln!(out, "  Planes:              {}", model.planes.len())?;
    writeln!(out, "  Surfaces:            {}", model.surfaces.len())?;
    writeln!(out, "  Portals:             {}", model.portal_count)?;
    writeln!(out, "  Polies:              {}", model.polies.len())?;
    writeln!(out, "  Leaves:              {}", model.leaf_count)?;
    writeln!(out, "  Poly Vertices:       {}", model.poly_vertex_count)?;
    writeln!(out, "  Nodes:               {}", model.nodes.len())?;
    writeln!(out, "  World BBox Min:      {}", vec3(model.bbox_min))?;
    writeln!(out, "  World BBox Max:      {}", vec3(model.bbox_max))?;
    writeln!(out, "  World Translation:   {}", vec3(model.translation))?;
    writeln!(out, "  RootNodeIndex:       {}", model.root_node)?;
    writeln!(out, "  Sections (raw):      {}", model.sections)?;

    writeln!(out, "\n  --- Surfaces ---")?;
    for (i, surface) in model.surfaces.iter().enumerate() {
        let names = surface.flags.names();
        let flag_str = if names.is_empty() {
            "None".to_string()
        } else {
            names.join(", ")
        };
        let texture = model
            .texture_names
            .get(surface.texture_index as usize)
            .map_or("<INVALID INDEX>", String::as_str);
        writeln!(
            out,
            "  [{i}] Flags: 0x{:08X} ({flag_str}), TextureIndex: {} ({texture}), TextureFlags: 0x{:04X}",
            surface.flags.bits(),
            surface.texture_index,
            surface.texture_flags
        )?;
    }
    Ok(())
}

fn objects<W: Write>(out: &mut W, world: &World) -> io::Result<()> {
    writeln!(out, "\nWorldObjects count: {}", world.objects.len())?;
    for (i, object) in world.objects.iter().enumerate() {
        writeln!(
            out,
            "\n[Object #{i}] Type: {}, Properties: {}",
            object.type_name,
            object.properties.len()
        )?;
        for property in &object.properties {
            let value = match &property.value {
                PropertyValue::String(s) => s.clone(),
                PropertyValue::Vector(v) | PropertyValue::Color(v) => vec3(*v),
                PropertyValue::Real(r) | PropertyValue::LongInt(r) => format!("{r}"),
                PropertyValue::Bool(b) => b.to_string(),
                PropertyValue::Rotation(q) => {
                    format!("({:.3}, {:.3}, {:.3}, {:.3})", q.x, q.y, q.z, q.w)
                }
                PropertyValue::Unknown { type_code, size } => {
                    format!("<Unknown type {type_code}, skipped {size} bytes>")
                }
            };
            writeln!(out, "  - {} = {value}", property.name)?;
        }
    }
    Ok(())
}

fn blind_objects<W: Write>(out: &mut W, world: &World) -> io::Result<()> {
    let blind = &world.blind;
    writeln!(
        out,
        "\nBlind Objects: {} keyframe tracks, {} scatter sets, {} skipped",
        blind.tracks.len(),
        blind.scatter_sets.len(),
        blind.skipped
    )?;

    for track in &blind.tracks {
        writeln!(out, "\n  KF Name: {}", track.name)?;
        writeln!(out, "  NumKeys = {}", track.keys.len())?;
        for (i, key) in track.keys.iter().enumerate() {
            keyframe(out, i, key)?;
        }
    }

    for set in &blind.scatter_sets {
        writeln!(out, "\n  ScatterVolume name: {}", set.name)?;
        writeln!(out, "  NumVolumes = {}", set.volumes.len())?;
        for (i, volume) in set.volumes.iter().enumerate() {
            writeln!(
                out,
                "    [Volume #{i}]: pos={}, dims={}, particles={}",
                vec3(volume.position),
                vec3(volume.dims),
                volume.particles.len()
            )?;
        }
    }
    Ok(())
}

fn keyframe<W: Write>(out: &mut W, index: usize, key: &Keyframe) -> io::Result<()> {
    writeln!(out, "    [Key #{index}] - {}:", key.name)?;
    writeln!(out, "    - Pos = {}", vec3(key.position))?;
    writeln!(out, "    - Rotation = {}", vec3(key.rotation))?;
    writeln!(out, "    - TimeStamp = {:.6}", key.timestamp)?;
    writeln!(out, "    - SoundRadius = {:.6}", key.sound_radius)?;
    writeln!(out, "    - SoundName = '{}'", key.sound_name)?;
    writeln!(out, "    - Command = '{}'", key.command)?;
    if let Some(v) = key.bezier_prev {
        writeln!(out, "    - BezierPrev = {}", vec3(v))?;
    }
    if let Some(v) = key.bezier_next {
        writeln!(out, "    - BezierNext = {}", vec3(v))?;
    }
    Ok(())
}

fn poly_section<W: Write>(out: &mut W, title: &str, polys: &[PolyRecord]) -> io::Result<()> {
    writeln!(out, "\n{title}: {}", polys.len())?;
    for (i, poly) in polys.iter().enumerate() {
        writeln!(
            out,
            "  [#{i}] Verts: {}, Dist: {:.2}, Normal: {}",
            poly.vertices.len(),
            poly.dist,
            vec3(poly.normal)
        )?;
        for v in &poly.vertices {
            writeln!(out, "    - {}", vec3(*v))?;
        }
    }
    Ok(())
}

fn render_data<W: Write>(out: &mut W, world: &World) -> io::Result<()> {
    let render = &world.render;
    writeln!(out, "\nRenderData - RENDERNODE count: {}", render.nodes.len())?;
    for (i, node) in render.nodes.iter().enumerate() {
        writeln!(out, "\n[RenderNode #{i}]")?;
        render_node(out, node)?;
    }

    writeln!(out, "\nWorldModelNodes count: {}", render.model_nodes.len())?;
    for (i, wm) in render.model_nodes.iter().enumerate() {
        writeln!(out, "\n[WMRenderNode #{i}] Name: {}", wm.name)?;
        for (s, node) in wm.nodes.iter().enumerate() {
            writeln!(out, "\n  [SubRenderNode #{s}]")?;
            render_node(out, node)?;
        }
        writeln!(out, "  NoChildFlag: {}", wm.no_child_flag)?;
    }

    writeln!(out, "\n[WorldLightGroups] Count: {}", render.light_groups.len())?;
    for (i, group) in render.light_groups.iter().enumerate() {
        writeln!(out, "  - [{i}] {}", group.name)?;
        writeln!(out, "      Color: {}", vec3(group.color))?;
        writeln!(
            out,
            "      Offset: ({}, {}, {})",
            group.offset.x, group.offset.y, group.offset.z
        )?;
        writeln!(
            out,
            "      Size: ({}, {}, {})",
            group.size.x, group.size.y, group.size.z
        )?;
    }
    Ok(())
}

fn render_node<W: Write>(out: &mut W, node: &lithtech_dat::RenderNode) -> io::Result<()> {
    writeln!(out, "  Center:    {}", vec3(node.center))?;
    writeln!(out, "  HalfDims:  {}", vec3(node.half_dims))?;
    writeln!(out, "  Sections:  {}", node.sections.len())?;
    for (s, section) in node.sections.iter().enumerate() {
        writeln!(
            out,
            "      [Section {s}] Texture0: {}, Tris: {}, Shadercode: {}",
            section.texture0,
            section.triangle_count,
            section.shader.debug_name()
        )?;
        if !section.texture1.is_empty() {
            writeln!(out, "      [Section {s}] Texture1: {}", section.texture1)?;
        }
        if !section.texture_effect.is_empty() {
            writeln!(
                out,
                "        [Section {s}] TextureEffect: {}",
                section.texture_effect
            )?;
        }
    }
    writeln!(out, "  Vertices: {}", node.vertices.len())?;
    writeln!(out, "  Triangles: {}", node.triangles.len())?;
    if !node.sky_portals.is_empty() {
        writeln!(out, "  SkyPortals: {}", node.sky_portals.len())?;
    }
    if !node.occluders.is_empty() {
        writeln!(out, "  Occluders: {}", node.occluders.len())?;
        for occluder in &node.occluders {
            writeln!(out, "    Occluder Hashcode: {}", occluder.name_hash)?;
        }
    }
    if !node.light_groups.is_empty() {
        writeln!(out, "  LightGroups: {}", node.light_groups.len())?;
        for group in &node.light_groups {
            writeln!(out, "    LightGroup name: {}", group.name)?;
        }
    }
    writeln!(out, "  ChildFlags: {}", node.child_flags)?;
    writeln!(
        out,
        "  ChildIndices: {}, {}",
        node.child_indices[0], node.child_indices[1]
    )
}
