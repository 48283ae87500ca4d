//! End-to-end tests: build a synthetic world file byte by byte, decode
//! it, and export both LTA documents.

use std::io::Cursor;

use pretty_assertions::assert_eq;

use lithtech_dat::{
    TextureCatalog, VertexLayout, World, export_physics, export_scene, name_hash,
};

/// Incremental little-endian byte builder for test worlds
#[derive(Default)]
struct Bytes(Vec<u8>);

impl Bytes {
    fn u8(&mut self, v: u8) -> &mut Self {
        self.0.push(v);
        self
    }

    fn u16(&mut self, v: u16) -> &mut Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn u32(&mut self, v: u32) -> &mut Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn i32(&mut self, v: i32) -> &mut Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn f32(&mut self, v: f32) -> &mut Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn vec3(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.f32(x).f32(y).f32(z)
    }

    fn string(&mut self, s: &str) -> &mut Self {
        self.u16(s.len() as u16);
        self.0.extend_from_slice(s.as_bytes());
        self
    }

    fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.extend_from_slice(bytes);
        self
    }
}

fn string_prop(b: &mut Bytes, name: &str, value: &str) {
    b.string(name).u8(0).u32(0).u16(0).string(value);
}

fn vector_prop(b: &mut Bytes, name: &str, x: f32, y: f32, z: f32) {
    b.string(name).u8(1).u32(0).u16(12).vec3(x, y, z);
}

fn objects_section() -> Vec<u8> {
    let mut b = Bytes::default();
    b.u32(4);

    // A light with a position to transcribe
    b.u16(0).string("Light").u32(2);
    string_prop(&mut b, "Name", "Lamp1");
    vector_prop(&mut b, "Pos", 1.0, 2.0, 3.0);

    // The keyframer supplying the track name
    b.u16(0).string("KeyFramer").u32(2);
    string_prop(&mut b, "Name", "KF1");
    string_prop(&mut b, "BaseKeyName", "DoorKey");

    // A door whose name matches the render sub-tree
    b.u16(0).string("Door").u32(1);
    string_prop(&mut b, "Name", "Machine");

    // The occluder volume supplying the occluder name table
    b.u16(0).string("DynamicOccluderVolume").u32(1);
    string_prop(&mut b, "OccluderName1", "Hall");

    b.0
}

fn blind_section() -> Vec<u8> {
    const KEYFRAMER_TAG: u32 = 1_789_855_876;

    let mut track = Bytes::default();
    track.u32(1); // key count
    track.u16(0); // interpolation: no tangents
    track.u8(9); // sound name length
    track.u8(0); // command length
    track.vec3(5.0, 0.0, 0.0);
    track.vec3(0.0, 90.0, 0.0);
    track.f32(1.5);
    track.f32(100.0);
    track.raw(b"click.wav");

    let mut b = Bytes::default();
    b.u32(2);
    b.u32(track.0.len() as u32).u32(KEYFRAMER_TAG).raw(&track.0);
    // an uninterpreted record, skipped by its declared size
    b.u32(4).u32(0xBEEF).raw(&[1, 2, 3, 4]);
    b.0
}

fn poly_section() -> Vec<u8> {
    let mut b = Bytes::default();
    b.u32(1);
    b.vec3(0.0, 1.0, 0.0).f32(2.0);
    b.u32(3);
    b.vec3(0.0, 2.0, 0.0).vec3(1.0, 2.0, 0.0).vec3(0.0, 2.0, 1.0);
    b.0
}

fn push_section(b: &mut Bytes, tex0: &str, shader: u8, tri_count: u32, effect: &str) {
    b.string(tex0).string("");
    b.u8(shader).u32(tri_count).string(effect);
    b.u32(0).u32(0).u32(0); // empty lightmap block
}

fn push_vertex(b: &mut Bytes, layout: VertexLayout, x: f32, y: f32, z: f32, u: f32, v: f32) {
    b.vec3(x, y, z);
    b.f32(u).f32(v); // uv0
    b.f32(0.0).f32(0.0); // uv1
    b.raw(&[255, 255, 255, 255]);
    b.vec3(0.0, 1.0, 0.0);
    if layout == VertexLayout::TangentBasis {
        b.vec3(1.0, 0.0, 0.0);
        b.vec3(0.0, 0.0, 1.0);
    }
}

fn push_triangle(b: &mut Bytes, i0: u32, i1: u32, i2: u32) {
    b.u32(i0).u32(i1).u32(i2).u32(0);
}

fn push_node_tail(b: &mut Bytes) {
    b.u8(0); // child flags
    b.u32(0).u32(0); // child indices
}

fn render_section(layout: VertexLayout) -> Vec<u8> {
    let mut b = Bytes::default();

    // --- render nodes ---
    b.u32(1);
    b.vec3(0.0, 0.0, 0.0).vec3(1.0, 1.0, 1.0);

    b.u32(2); // sections
    push_section(&mut b, "lightanim_base", 2, 1, "");
    push_section(&mut b, "tex/floor.dtx", 4, 2, "ripple");

    b.u32(4); // vertices
    push_vertex(&mut b, layout, 0.0, 0.0, 0.0, 0.0, 0.0);
    push_vertex(&mut b, layout, 1.0, 0.0, 0.0, 1.0, 0.0);
    push_vertex(&mut b, layout, 1.0, 0.0, 1.0, 1.0, 1.0);
    push_vertex(&mut b, layout, 0.0, 0.0, 1.0, 0.0, 1.0);

    b.u32(3); // triangles: first belongs to the animation section
    push_triangle(&mut b, 0, 1, 2);
    push_triangle(&mut b, 0, 2, 3);
    push_triangle(&mut b, 1, 3, 2);

    // one sky portal
    b.u32(1);
    b.u8(3);
    b.vec3(0.0, 5.0, 0.0).vec3(1.0, 5.0, 0.0).vec3(0.0, 5.0, 1.0);
    b.vec3(0.0, -1.0, 0.0).f32(-5.0);

    // one occluder carrying the hash of "Hall"
    b.u32(1);
    b.u8(3);
    b.vec3(0.0, 0.0, 0.0).vec3(1.0, 0.0, 0.0).vec3(0.0, 1.0, 0.0);
    b.vec3(0.0, 0.0, 1.0).f32(0.0);
    b.u32(name_hash("Hall"));

    // one light group with a nested lightmap block to consume
    b.u32(1);
    b.string("lg0");
    b.vec3(1.0, 1.0, 1.0);
    b.u32(2).raw(&[0, 0]); // zero-compressed intensities
    b.u32(1); // section lightmaps
    b.u32(1); // sub-lightmaps
    b.u32(0).u32(0).u32(4).u32(4); // left, top, width, height
    b.u32(3).raw(&[9, 9, 9]);

    push_node_tail(&mut b);

    // --- named sub-trees ---
    b.u32(1);
    b.string("Machine");
    b.u32(1); // sub-nodes
    b.vec3(0.0, 0.0, 0.0).vec3(1.0, 1.0, 1.0);
    b.u32(1);
    push_section(&mut b, "tex/metal.dtx", 1, 1, "");
    b.u32(3);
    push_vertex(&mut b, layout, 0.0, 1.0, 0.0, 0.0, 0.0);
    push_vertex(&mut b, layout, 1.0, 1.0, 0.0, 1.0, 0.0);
    push_vertex(&mut b, layout, 0.0, 1.0, 1.0, 0.0, 1.0);
    b.u32(1);
    push_triangle(&mut b, 0, 1, 2);
    b.u32(0); // sky portals
    b.u32(0); // occluders
    b.u32(0); // light groups
    push_node_tail(&mut b);
    b.u32(0); // no-child flag

    // --- world light groups ---
    b.u32(1);
    b.string("glg");
    b.vec3(0.5, 0.5, 0.5);
    b.u32(0).u32(0).u32(0); // grid offset
    b.u32(1).u32(2).u32(1); // grid size -> 2 data bytes
    b.raw(&[7, 7]);

    b.0
}

fn world_model_bytes() -> Vec<u8> {
    let mut b = Bytes::default();
    b.u32(0); // dummy
    b.u32(0); // info flags
    b.string("Solid0");
    b.u32(3); // points
    b.u32(1); // planes
    b.u32(1); // surfaces
    b.u32(0); // portals
    b.u32(1); // polies
    b.u32(0); // leaves
    b.u32(3); // poly vertices
    b.u32(0); // visible list
    b.u32(0); // leaf list
    b.u32(0); // nodes
    b.vec3(0.0, 0.0, 0.0).vec3(1.0, 1.0, 1.0).vec3(0.0, 0.0, 0.0);

    let names = b"tex/floor.dtx\0";
    b.u32(names.len() as u32).u32(1).raw(names);

    b.u8(3); // vertex count of the single poly

    b.vec3(0.0, 1.0, 0.0).f32(0.0); // plane

    // SOLID | LIGHTMAP
    b.u32(1 | (1 << 7)).u16(0).u16(0);

    b.u32(0).u32(0); // poly: surface, plane
    b.u32(0).u32(1).u32(2); // indices

    b.vec3(0.0, 0.0, 0.0).vec3(1.0, 0.0, 0.0).vec3(0.0, 0.0, 1.0);

    b.i32(-1); // root node
    b.u32(0); // sections
    b.0
}

/// Assembles a complete world file and returns its bytes.
fn build_world(layout: VertexLayout) -> Vec<u8> {
    let mut prelude = Bytes::default();
    prelude.u32(5); // info string length
    prelude.raw(b"hello");
    prelude.vec3(-10.0, -10.0, -10.0);
    prelude.vec3(10.0, 10.0, 10.0);
    prelude.vec3(10.0, 0.0, 0.0); // world offset

    // world tree: one leaf node, one model
    prelude.vec3(-10.0, -10.0, -10.0).vec3(10.0, 10.0, 10.0);
    prelude.u32(1).u32(0);
    prelude.u8(0);
    prelude.u32(1);
    prelude.raw(&world_model_bytes());

    let header_len = 60u32;
    let objects = objects_section();
    let blind = blind_section();
    let blockers = poly_section();
    let collision = poly_section();
    let render = render_section(layout);

    let object_pos = header_len + prelude.0.len() as u32;
    let blind_pos = object_pos + objects.len() as u32;
    let blocker_pos = blind_pos + blind.len() as u32;
    let collision_pos = blocker_pos + blockers.len() as u32;
    let render_pos = collision_pos + collision.len() as u32;

    let mut file = Bytes::default();
    file.u32(85);
    file.u32(object_pos);
    file.u32(blind_pos);
    file.u32(0); // light grid, never read
    file.u32(collision_pos);
    file.u32(blocker_pos);
    file.u32(render_pos);
    file.u32(0).u32(0); // packer type/version
    file.raw(&[0u8; 24]);

    file.raw(&prelude.0)
        .raw(&objects)
        .raw(&blind)
        .raw(&blockers)
        .raw(&collision)
        .raw(&render);
    file.0
}

fn parse(layout: VertexLayout) -> World {
    let bytes = build_world(layout);
    World::parse(&mut Cursor::new(bytes), layout).expect("world should parse")
}

#[test]
fn parses_every_section() {
    let world = parse(VertexLayout::Compact);

    assert_eq!(world.header.version, 85);
    assert_eq!(world.info.info_string, "hello");
    assert_eq!(world.tree.models.len(), 1);
    assert_eq!(world.tree.models[0].name, "Solid0");
    assert_eq!(world.objects.len(), 4);
    assert_eq!(world.blind.tracks.len(), 1);
    assert_eq!(world.blind.tracks[0].name, "DoorKey");
    assert_eq!(world.blind.tracks[0].keys[0].sound_name, "click.wav");
    assert_eq!(world.blind.skipped, 1);
    assert_eq!(world.particle_blockers.len(), 1);
    assert_eq!(world.collision_polys.len(), 1);
    assert_eq!(world.render.nodes.len(), 1);
    assert_eq!(world.render.nodes[0].sections.len(), 2);
    assert_eq!(world.render.nodes[0].vertices.len(), 4);
    assert_eq!(world.render.nodes[0].triangles.len(), 3);
    assert_eq!(world.render.nodes[0].light_groups[0].name, "lg0");
    assert_eq!(world.render.model_nodes[0].name, "Machine");
    assert_eq!(world.render.light_groups[0].name, "glg");
}

#[test]
fn tangent_layout_parses_identically() {
    let compact = parse(VertexLayout::Compact);
    let tangent = parse(VertexLayout::TangentBasis);

    assert_eq!(
        compact.render.nodes[0].vertices.len(),
        tangent.render.nodes[0].vertices.len()
    );
    assert_eq!(
        compact.render.nodes[0].vertices[2].position,
        tangent.render.nodes[0].vertices[2].position
    );
    assert_eq!(compact.render.model_nodes[0].nodes[0].vertices.len(), 3);
}

#[test]
fn scene_export_is_complete_and_balanced() {
    let world = parse(VertexLayout::Compact);
    let mut textures = TextureCatalog::new(vec![]);

    let mut buf = Vec::new();
    export_scene(&mut buf, &world, "testmap", &mut textures).expect("export should succeed");
    let text = String::from_utf8(buf).expect("output is UTF-8");

    // brushes: 1 render-node group (animation section dropped) + 1
    // matched sub-tree group + sky portal + occluder + collision +
    // particle blocker
    assert_eq!(text.matches("( polyhedron (").count(), 6);

    // the animation marker contributes nothing anywhere
    assert!(!text.contains("lightanim_base"));

    // world offset lands on every point: vertex (1,0,0) -> (11,0,0)
    assert!(text.contains("( 11.000000 0.000000 0.000000 255 255 255 255 )"));

    // object properties transcribed, Pos shifted by the offset
    assert!(text.contains("( string \"Name\" ( ) ( data \"Lamp1\" ) )"));
    assert!(text.contains(
        "( vector \"Pos\" ( distance ) ( data ( vector ( 11.000000 2.000000 3.000000 ) ) ) )"
    ));

    // keyframe key entry, named positionally from the queue
    assert!(text.contains("( string \"Name\" ( ) ( data \"DoorKey0\" ) )"));
    assert!(text.contains("( real \"TimeStamp\" ( ) ( data 1.500000 ) )"));
    assert!(text.contains("( label \"DoorKey\" )"));

    // occluder name recovered through the hash table
    assert!(text.contains("( string \"Name\" ( ) ( data \"Hall\" ) )"));

    // matched sub-tree brush entry and section lighting classification
    assert!(text.contains("( string \"Name\" ( ) ( data \"Machine_0_S0\" ) )"));
    assert!(text.contains("( string \"Name\" ( ) ( data \"RN0_S0\" ) )"));
    assert!(text.contains("( string \"Lighting\" ( staticlist ) ( data \"Lightmap\" ) )"));
    assert!(text.contains("( string \"TextureEffect\" ( textureeffect ) ( data \"ripple\" ) )"));

    // auxiliary containers all present
    for label in [
        "RenderNodes",
        "ObjectsAndWMs",
        "SkyPortals",
        "Occluders",
        "Blockers",
        "ParticleBlockers",
    ] {
        assert!(
            text.contains(&format!("( label \"{label}\" )")),
            "missing container {label}"
        );
    }

    assert_eq!(text.matches('(').count(), text.matches(')').count());
}

#[test]
fn scene_export_counters_never_repeat() {
    let world = parse(VertexLayout::Compact);
    let mut textures = TextureCatalog::new(vec![]);
    let mut buf = Vec::new();
    export_scene(&mut buf, &world, "testmap", &mut textures).expect("export should succeed");
    let text = String::from_utf8(buf).expect("output is UTF-8");

    let ids: Vec<u32> = text
        .lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix("( nodeid ")
                .and_then(|r| r.strip_suffix(" )"))
                .and_then(|v| v.parse().ok())
        })
        .collect();
    for pair in ids.windows(2) {
        assert!(pair[1] > pair[0]);
    }

    let brush_indices: Vec<u32> = text
        .lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix("( brushindex ")
                .and_then(|r| r.strip_suffix(" )"))
                .and_then(|v| v.parse().ok())
        })
        .collect();
    let expected: Vec<u32> = (0..brush_indices.len() as u32).collect();
    assert_eq!(brush_indices, expected);

    // one proplist entry per brush with a distinct propid, plus shared
    // entries for sky portals, blockers, and particle blockers
    let nonzero_props: Vec<u32> = text
        .lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix("( propid ")
                .and_then(|r| r.strip_suffix(" )"))
                .and_then(|v| v.parse().ok())
        })
        .filter(|&v| v != 0)
        .collect();
    let distinct: std::collections::BTreeSet<u32> = nonzero_props.iter().copied().collect();
    let proplist_count = text.matches("( proplist (").count();
    assert_eq!(proplist_count, distinct.len() + 1);
}

#[test]
fn physics_export_classifies_surfaces() {
    let world = parse(VertexLayout::Compact);
    let mut buf = Vec::new();
    export_physics(&mut buf, &world, "testmap").expect("export should succeed");
    let text = String::from_utf8(buf).expect("output is UTF-8");

    assert!(text.contains("( label \"testmap_PhysicsDATA\" )"));
    assert!(text.contains("( label \"Solid0\" )"));
    assert!(text.contains("( string \"Name\" ( ) ( data \"Surface0\" ) )"));
    assert!(text.contains("( string \"Type\" ( staticlist ) ( data \"Normal\" ) )"));
    assert!(text.contains("( string \"Lighting\" ( staticlist ) ( data \"Lightmap\" ) )"));
    assert!(text.contains("( name \"tex/floor.dtx\" )"));
    // collision points shifted by the world offset
    assert!(text.contains("( 10.000000 0.000000 0.000000 255 255 255 255 )"));

    assert_eq!(text.matches('(').count(), text.matches(')').count());
}

#[test]
fn truncated_file_fails_cleanly() {
    let mut bytes = build_world(VertexLayout::Compact);
    bytes.truncate(bytes.len() - 40);
    let err = World::parse(&mut Cursor::new(bytes), VertexLayout::Compact).unwrap_err();
    assert!(matches!(err, lithtech_dat::DatError::UnexpectedEof));
}
