//! Brush (polyhedron) emission: point lists plus textured or flat
//! polygon records.

use std::io::Write;

use crate::error::Result;
use crate::geometry::PrimitiveGroup;
use crate::tex_basis::{TextureSpace, texture_space};
use crate::types::Vec3;
use crate::world_info::WorldOffset;

use super::writer::{LtaWriter, fmt_f32, fmt_vec3};

fn write_pointlist<W: Write>(w: &mut LtaWriter<W>, points: &[Vec3]) -> Result<()> {
    w.open("pointlist")?;
    for &p in points {
        w.item(&format!("{} 255 255 255 255", fmt_vec3(p)))?;
    }
    w.close()?;
    Ok(())
}

fn write_textureinfo<W: Write>(
    w: &mut LtaWriter<W>,
    basis: &TextureSpace,
    texture: &str,
) -> Result<()> {
    w.open("textureinfo")?;
    w.item(&fmt_vec3(basis.origin))?;
    w.item(&fmt_vec3(basis.p))?;
    w.item(&fmt_vec3(basis.q))?;
    w.item("sticktopoly 1")?;
    w.item(&format!("name \"{texture}\""))?;
    w.close()?;
    Ok(())
}

fn write_editpoly_tail<W: Write>(
    w: &mut LtaWriter<W>,
    secondary_basis: &TextureSpace,
    secondary_texture: &str,
) -> Result<()> {
    w.item("flags")?;
    w.item("shade 0 0 0")?;
    w.item("physicsmaterial \"Default\"")?;
    w.item("surfacekey \"\"")?;
    w.open_list("textures")?;
    w.open("1")?;
    write_textureinfo(w, secondary_basis, secondary_texture)?;
    w.close()?;
    w.close()?;
    Ok(())
}

/// Emits one reconstructed geometry group as a polyhedron. Texture
/// frames are solved per triangle from each UV channel and its texel
/// dimensions.
pub(super) fn write_textured_brush<W: Write>(
    w: &mut LtaWriter<W>,
    group: &PrimitiveGroup,
    dims0: (u32, u32),
    dims1: (u32, u32),
    offset: WorldOffset,
) -> Result<()> {
    w.open_list("polyhedron")?;
    w.item("color 255 255 255")?;

    let points: Vec<Vec3> = group
        .vertices
        .iter()
        .map(|v| offset.apply(v.position))
        .collect();
    write_pointlist(w, &points)?;

    w.open_list("polylist")?;
    for tri in &group.triangles {
        let v0 = &group.vertices[tri[0] as usize];
        let v1 = &group.vertices[tri[1] as usize];
        let v2 = &group.vertices[tri[2] as usize];

        let p0 = offset.apply(v0.position);
        let p1 = offset.apply(v1.position);
        let p2 = offset.apply(v2.position);

        let normal = v0.normal;
        let dist = p0.dot(normal);

        let basis0 = texture_space([p0, p1, p2], [v0.uv0, v1.uv0, v2.uv0], dims0.0, dims0.1);
        let basis1 = texture_space([p0, p1, p2], [v0.uv1, v1.uv1, v2.uv1], dims1.0, dims1.1);

        w.open("editpoly")?;
        w.item(&format!("f {} {} {}", tri[0], tri[1], tri[2]))?;
        w.item(&format!("n {}", fmt_vec3(normal)))?;
        w.item(&format!("dist {}", fmt_f32(dist)))?;
        write_textureinfo(w, &basis0, &group.texture0)?;
        write_editpoly_tail(w, &basis1, &group.texture1)?;
        w.close()?;
    }
    w.close()?;

    w.close()?;
    Ok(())
}

/// Emits a single flat polygon (sky portal, occluder, blocker) as a
/// polyhedron with an identity texture frame.
pub(super) fn write_flat_brush<W: Write>(
    w: &mut LtaWriter<W>,
    vertices: &[Vec3],
    normal: Vec3,
    dist: f32,
    offset: WorldOffset,
) -> Result<()> {
    w.open_list("polyhedron")?;
    w.item("color 255 255 255")?;

    let points: Vec<Vec3> = vertices.iter().map(|&v| offset.apply(v)).collect();
    write_pointlist(w, &points)?;

    let indices: Vec<String> = (0..vertices.len()).map(|i| i.to_string()).collect();

    w.open_list("polylist")?;
    w.open("editpoly")?;
    w.item(&format!("f {}", indices.join(" ")))?;
    w.item(&format!("n {}", fmt_vec3(normal)))?;
    w.item(&format!("dist {}", fmt_f32(dist)))?;
    write_textureinfo(w, &TextureSpace::IDENTITY, "Default")?;
    write_editpoly_tail(w, &TextureSpace::IDENTITY, "Default")?;
    w.close()?;
    w.close()?;

    w.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderVertex, ShaderType};
    use crate::types::Vec2;

    #[test]
    fn test_flat_brush_indices_cover_all_vertices() {
        let mut buf = Vec::new();
        let mut w = LtaWriter::new(&mut buf);
        let verts = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 0.5),
        ];
        write_flat_brush(
            &mut w,
            &verts,
            Vec3::new(0.0, 1.0, 0.0),
            0.0,
            WorldOffset::default(),
        )
        .unwrap();
        assert_eq!(w.depth(), 0);

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("( f 0 1 2 3 4 )"));
    }

    #[test]
    fn test_textured_brush_applies_offset() {
        let vertex = RenderVertex {
            position: Vec3::new(1.0, 0.0, 0.0),
            uv0: Vec2::new(0.0, 0.0),
            uv1: Vec2::new(0.0, 0.0),
            color: [255; 4],
            normal: Vec3::new(0.0, 1.0, 0.0),
        };
        let group = PrimitiveGroup {
            texture0: "stone".into(),
            texture1: "Default".into(),
            shader: ShaderType::Gouraud,
            texture_effect: String::new(),
            vertices: vec![vertex; 3],
            triangles: vec![[0, 1, 2]],
        };

        let mut buf = Vec::new();
        let mut w = LtaWriter::new(&mut buf);
        write_textured_brush(
            &mut w,
            &group,
            (0, 0),
            (0, 0),
            WorldOffset(Vec3::new(10.0, 0.0, 0.0)),
        )
        .unwrap();
        assert_eq!(w.depth(), 0);

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("( 11.000000 0.000000 0.000000 255 255 255 255 )"));
        assert!(text.contains("( name \"stone\" )"));
    }
}
