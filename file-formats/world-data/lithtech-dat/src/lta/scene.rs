//! Scene re-encoding: turns a decoded [`World`] into the main LTA file.
//!
//! Three identifier streams run through the whole output: structural node
//! ids, property-list ids, and brush indices. All are global and strictly
//! increasing; a `propid` is the position of the owning node's entry in
//! the trailing global property list (0 refers to the leading empty
//! entry). The structural pass pushes one property descriptor per
//! allocated propid, and the property list is emitted from that same
//! ordered collection, so the two passes cannot disagree.

use std::io::Write;

use log::warn;

use crate::blind::Keyframe;
use crate::dtx::TextureCatalog;
use crate::error::Result;
use crate::geometry::{PrimitiveGroup, reconstruct_groups};
use crate::objects::WorldObject;
use crate::render::{OccluderPoly, PortalPoly, RenderNode};
use crate::world::World;

use super::polyhedron::{write_flat_brush, write_textured_brush};
use super::proplist::{
    BrushProps, write_brush_proplist, write_key_proplist, write_object_proplist,
};
use super::writer::LtaWriter;

/// Name substituted when no collected occluder name matches a stored hash
pub const OCCLUDER_PLACEHOLDER: &str = "Occluder";

/// Label of the container collecting geometry of render sub-trees whose
/// name matches no world object
pub const UNMATCHED_LABEL: &str = "UnmatchedWorldModels";

struct Brush {
    group: PrimitiveGroup,
    dims0: (u32, u32),
    dims1: (u32, u32),
    props: BrushProps,
}

fn make_brush(group: PrimitiveGroup, prop_name: String, textures: &mut TextureCatalog) -> Brush {
    let dims0 = textures.dimensions(&group.texture0);
    let dims1 = textures.dimensions(&group.texture1);
    let effect = (!group.texture_effect.is_empty()).then(|| group.texture_effect.clone());
    let props = BrushProps::lit(prop_name, group.shader.lighting_name(), effect);
    Brush {
        group,
        dims0,
        dims1,
        props,
    }
}

/// The three output-wide counters. Never reset mid-export: downstream
/// references depend on the values assigned upstream.
struct IdGen {
    node: u32,
    prop: u32,
    brush: u32,
}

impl IdGen {
    fn new() -> Self {
        Self {
            node: 1,
            prop: 1,
            brush: 0,
        }
    }

    fn next_node(&mut self) -> u32 {
        let id = self.node;
        self.node += 1;
        id
    }

    fn next_prop(&mut self) -> u32 {
        let id = self.prop;
        self.prop += 1;
        id
    }

    fn next_brush(&mut self) -> u32 {
        let id = self.brush;
        self.brush += 1;
        id
    }
}

/// One allocated propid's pending property-list entry
enum PropEntry<'a> {
    Brush(&'a BrushProps),
    Object(&'a WorldObject),
    Key(&'a Keyframe),
    Occluder(String),
    SkyPortals,
    Blockers,
    ParticleBlockers,
}

/// Exports the renderable scene: geometry brushes, placed objects,
/// keyframe tracks, sky portals, and occluders.
pub fn export_scene<W: Write>(
    out: W,
    world: &World,
    map_name: &str,
    textures: &mut TextureCatalog,
) -> Result<()> {
    let offset = world.info.world_offset();

    // Reconstruct every geometry group up front; brush emission order and
    // hierarchy order must see the identical collections.
    let mut rn_brushes: Vec<Vec<Brush>> = Vec::with_capacity(world.render.nodes.len());
    for (i, node) in world.render.nodes.iter().enumerate() {
        let groups = reconstruct_groups(node, &format!("render node {i}"))?;
        rn_brushes.push(
            groups
                .into_iter()
                .enumerate()
                .map(|(k, g)| make_brush(g, format!("RN{i}_S{k}"), textures))
                .collect(),
        );
    }

    let mut wm_brushes: Vec<Vec<Brush>> = Vec::with_capacity(world.render.model_nodes.len());
    for wm in &world.render.model_nodes {
        let mut brushes = Vec::new();
        for (s, node) in wm.nodes.iter().enumerate() {
            let groups = reconstruct_groups(node, &format!("world model {} sub-node {s}", wm.name))?;
            for (k, g) in groups.into_iter().enumerate() {
                brushes.push(make_brush(g, format!("{}_{s}_S{k}", wm.name), textures));
            }
        }
        wm_brushes.push(brushes);
    }

    // Link each render sub-tree to the first world object carrying its
    // name. The format has no foreign keys; name equality is all there is.
    let mut object_model: Vec<Option<usize>> = vec![None; world.objects.len()];
    for (m, wm) in world.render.model_nodes.iter().enumerate() {
        if let Some(o) = world
            .objects
            .iter()
            .position(|obj| obj.name() == Some(wm.name.as_str()))
        {
            object_model[o] = Some(m);
        }
    }
    let mut model_matched = vec![false; world.render.model_nodes.len()];
    for &m in object_model.iter().flatten() {
        model_matched[m] = true;
    }
    let unmatched: Vec<usize> = (0..wm_brushes.len())
        .filter(|&m| !model_matched[m] && !wm_brushes[m].is_empty())
        .collect();

    // Sky portals and occluders pool across all nodes, render-node graph
    // first, then the named sub-trees, in declaration order.
    let all_nodes: Vec<&RenderNode> = world
        .render
        .nodes
        .iter()
        .chain(world.render.model_nodes.iter().flat_map(|wm| wm.nodes.iter()))
        .collect();
    let sky_portals: Vec<&PortalPoly> =
        all_nodes.iter().flat_map(|n| n.sky_portals.iter()).collect();
    let occluders: Vec<&OccluderPoly> =
        all_nodes.iter().flat_map(|n| n.occluders.iter()).collect();

    let mut w = LtaWriter::new(out);

    w.open("world")?;
    w.open_list("header")?;
    w.item("versioncode 2")?;
    w.item(&format!("infostring \"{}\"", world.info.info_string))?;
    w.close()?;

    // Pass 1: geometry. The order here defines brush indices.
    w.open_list("polyhedronlist")?;
    for brushes in &rn_brushes {
        for b in brushes {
            write_textured_brush(&mut w, &b.group, b.dims0, b.dims1, offset)?;
        }
    }
    for (o, _) in world.objects.iter().enumerate() {
        if let Some(m) = object_model[o] {
            for b in &wm_brushes[m] {
                write_textured_brush(&mut w, &b.group, b.dims0, b.dims1, offset)?;
            }
        }
    }
    for &m in &unmatched {
        for b in &wm_brushes[m] {
            write_textured_brush(&mut w, &b.group, b.dims0, b.dims1, offset)?;
        }
    }
    for portal in &sky_portals {
        write_flat_brush(&mut w, &portal.vertices, portal.normal, portal.dist, offset)?;
    }
    for occluder in &occluders {
        write_flat_brush(
            &mut w,
            &occluder.vertices,
            occluder.normal,
            occluder.dist,
            offset,
        )?;
    }
    for poly in &world.collision_polys {
        write_flat_brush(&mut w, &poly.vertices, poly.normal, poly.dist, offset)?;
    }
    for poly in &world.particle_blockers {
        write_flat_brush(&mut w, &poly.vertices, poly.normal, poly.dist, offset)?;
    }
    w.close()?;

    // Pass 2: the structural tree, collecting property entries as propids
    // are handed out.
    let mut ids = IdGen::new();
    let mut entries: Vec<PropEntry> = Vec::new();

    w.open("nodehierarchy")?;
    open_container(&mut w, map_name, "worldroot expanded", ids.next_node())?;

    open_container(&mut w, "RenderNodes", "", ids.next_node())?;
    for (i, brushes) in rn_brushes.iter().enumerate() {
        if brushes.is_empty() {
            continue;
        }
        open_container(&mut w, &format!("RenderNode{i}"), "", ids.next_node())?;
        for b in brushes {
            let propid = ids.next_prop();
            entries.push(PropEntry::Brush(&b.props));
            write_brush_node(&mut w, &mut ids, propid)?;
        }
        close_container(&mut w)?;
    }
    close_container(&mut w)?;

    if !world.objects.is_empty() {
        open_container(&mut w, "ObjectsAndWMs", "", ids.next_node())?;

        for (o, object) in world.objects.iter().enumerate() {
            w.open("worldnode")?;
            w.item("type object")?;
            w.item(&format!("label \"{}\"", object.type_name))?;
            w.item(&format!("nodeid {}", ids.next_node()))?;
            w.item("flags ( )")?;
            w.open("properties")?;
            w.item(&format!("name \"{}\"", object.type_name))?;
            let propid = ids.next_prop();
            w.item(&format!("propid {propid}"))?;
            w.close()?;
            entries.push(PropEntry::Object(object));

            if let Some(m) = object_model[o] {
                if !wm_brushes[m].is_empty() {
                    w.open_list("childlist")?;
                    for b in &wm_brushes[m] {
                        let propid = ids.next_prop();
                        entries.push(PropEntry::Brush(&b.props));
                        write_brush_node(&mut w, &mut ids, propid)?;
                    }
                    w.close()?;
                }
            }
            w.close()?;
        }

        for track in &world.blind.tracks {
            open_container(&mut w, &track.name, "path", ids.next_node())?;
            for key in &track.keys {
                w.open("worldnode")?;
                w.item("type object")?;
                w.item("label \"Key\"")?;
                w.item(&format!("nodeid {}", ids.next_node()))?;
                w.item("flags ( )")?;
                w.open("properties")?;
                w.item("name \"Key\"")?;
                let propid = ids.next_prop();
                w.item(&format!("propid {propid}"))?;
                w.close()?;
                w.close()?;
                entries.push(PropEntry::Key(key));
            }
            close_container(&mut w)?;
        }

        close_container(&mut w)?;
    }

    if !unmatched.is_empty() {
        open_container(&mut w, UNMATCHED_LABEL, "", ids.next_node())?;
        for &m in &unmatched {
            for b in &wm_brushes[m] {
                let propid = ids.next_prop();
                entries.push(PropEntry::Brush(&b.props));
                write_brush_node(&mut w, &mut ids, propid)?;
            }
        }
        close_container(&mut w)?;
    }

    if !sky_portals.is_empty() {
        open_container(&mut w, "SkyPortals", "", ids.next_node())?;
        // One shared property entry for the whole group
        let propid = ids.next_prop();
        entries.push(PropEntry::SkyPortals);
        for _ in &sky_portals {
            write_brush_node(&mut w, &mut ids, propid)?;
        }
        close_container(&mut w)?;
    }

    if !occluders.is_empty() {
        open_container(&mut w, "Occluders", "", ids.next_node())?;
        for occluder in &occluders {
            let name = match world.names.occluder_names.find_by_hash(occluder.name_hash) {
                Some(name) => name.to_owned(),
                None => {
                    warn!(
                        "no collected occluder name hashes to {:#010x}",
                        occluder.name_hash
                    );
                    OCCLUDER_PLACEHOLDER.to_owned()
                }
            };
            let propid = ids.next_prop();
            entries.push(PropEntry::Occluder(name));
            write_brush_node(&mut w, &mut ids, propid)?;
        }
        close_container(&mut w)?;
    }

    if !world.collision_polys.is_empty() {
        open_container(&mut w, "Blockers", "", ids.next_node())?;
        let propid = ids.next_prop();
        entries.push(PropEntry::Blockers);
        for _ in &world.collision_polys {
            write_brush_node(&mut w, &mut ids, propid)?;
        }
        close_container(&mut w)?;
    }

    if !world.particle_blockers.is_empty() {
        open_container(&mut w, "ParticleBlockers", "", ids.next_node())?;
        let propid = ids.next_prop();
        entries.push(PropEntry::ParticleBlockers);
        for _ in &world.particle_blockers {
            write_brush_node(&mut w, &mut ids, propid)?;
        }
        close_container(&mut w)?;
    }

    close_container(&mut w)?;
    w.close()?; // nodehierarchy

    // Pass 3: the property list, in the exact order the propids were
    // allocated. Entry 0 is the empty list that propid 0 points at.
    w.open_list("globalproplist")?;
    w.open_list("proplist")?;
    w.close()?;
    for entry in &entries {
        match entry {
            PropEntry::Brush(props) => write_brush_proplist(&mut w, props)?,
            PropEntry::Object(object) => write_object_proplist(&mut w, object, offset)?,
            PropEntry::Key(key) => write_key_proplist(&mut w, key, offset)?,
            PropEntry::Occluder(name) => {
                write_brush_proplist(&mut w, &BrushProps::unlit(name.clone(), "Occluder", "Flat"))?;
            }
            PropEntry::SkyPortals => {
                let mut props = BrushProps::lit("SkyPortal".to_owned(), "Gouraud", None);
                props.type_name = "SkyPortal";
                write_brush_proplist(&mut w, &props)?;
            }
            PropEntry::Blockers => {
                write_brush_proplist(
                    &mut w,
                    &BrushProps::unlit("Blocker".to_owned(), "Blocker", "Flat"),
                )?;
            }
            PropEntry::ParticleBlockers => {
                write_brush_proplist(
                    &mut w,
                    &BrushProps::unlit("ParticleBlocker".to_owned(), "ParticleBlocker", "Flat"),
                )?;
            }
        }
    }
    w.close()?;

    w.close()?; // world
    Ok(())
}

fn open_container<W: Write>(
    w: &mut LtaWriter<W>,
    label: &str,
    flags: &str,
    nodeid: u32,
) -> Result<()> {
    w.open("worldnode")?;
    w.item("type null")?;
    w.item(&format!("label \"{label}\""))?;
    w.item(&format!("nodeid {nodeid}"))?;
    if flags.is_empty() {
        w.item("flags ( )")?;
    } else {
        w.item(&format!("flags ( {flags} )"))?;
    }
    w.open("properties")?;
    w.item("propid 0")?;
    w.close()?;
    w.open_list("childlist")?;
    Ok(())
}

fn close_container<W: Write>(w: &mut LtaWriter<W>) -> Result<()> {
    w.close()?; // childlist
    w.close()?; // worldnode
    Ok(())
}

fn write_brush_node<W: Write>(w: &mut LtaWriter<W>, ids: &mut IdGen, propid: u32) -> Result<()> {
    w.open("worldnode")?;
    w.item("type brush")?;
    w.item(&format!("brushindex {}", ids.next_brush()))?;
    w.item(&format!("nodeid {}", ids.next_node()))?;
    w.item("flags ( )")?;
    w.open("properties")?;
    w.item("name \"Brush\"")?;
    w.item(&format!("propid {propid}"))?;
    w.close()?;
    w.close()?;
    Ok(())
}

/// World fixtures shared by the exporter test modules
#[cfg(test)]
pub(crate) mod tests_support {
    use crate::blind::BlindObjects;
    use crate::header::WorldHeader;
    use crate::objects::NameTables;
    use crate::render::RenderData;
    use crate::types::Vec3;
    use crate::world::World;
    use crate::world_info::WorldInfo;
    use crate::world_model::WorldModel;
    use crate::world_tree::WorldTree;

    pub(crate) fn empty_world() -> World {
        World {
            header: WorldHeader {
                version: 85,
                object_data_pos: 0,
                blind_object_data_pos: 0,
                lightgrid_pos: 0,
                collision_data_pos: 0,
                particle_blocker_data_pos: 0,
                render_data_pos: 0,
                packer_type: 0,
                packer_version: 0,
                future: [0; 6],
            },
            info: WorldInfo {
                info_string: String::new(),
                extents_min: Vec3::default(),
                extents_max: Vec3::default(),
                offset: Vec3::default(),
            },
            tree: WorldTree {
                root_bbox_min: Vec3::default(),
                root_bbox_max: Vec3::default(),
                sub_node_count: 0,
                terrain_depth: 0,
                layout: Vec::new(),
                models: Vec::new(),
            },
            objects: Vec::new(),
            names: NameTables::default(),
            blind: BlindObjects::default(),
            particle_blockers: Vec::new(),
            collision_polys: Vec::new(),
            render: RenderData::default(),
        }
    }

    pub(crate) fn world_with_models(models: Vec<WorldModel>) -> World {
        let mut world = empty_world();
        world.tree.models = models;
        world
    }
}
