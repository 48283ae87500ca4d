//! Texture-space basis recovery.
//!
//! The editor format stores texture mapping as a world-space frame per
//! polygon: an origin plus two axis vectors whose projection reproduces
//! the original UV assignment. The compiled format stores per-vertex UVs
//! instead, so the frame is reconstructed by pushing three UV-space probe
//! points, (0,0), (1,0), and (0,1), through the triangle's barycentric
//! coordinates back into world space.

use crate::types::{Vec2, Vec3};

/// A texture-space reference frame in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureSpace {
    pub origin: Vec3,
    pub p: Vec3,
    pub q: Vec3,
}

impl TextureSpace {
    /// The frame used when texel dimensions are unknown (missing
    /// texture descriptor, reserved names).
    pub const IDENTITY: Self = Self {
        origin: Vec3::new(0.0, 0.0, 0.0),
        p: Vec3::new(1.0, 0.0, 0.0),
        q: Vec3::new(0.0, 0.0, 1.0),
    };
}

type DVec2 = [f64; 2];
type DVec3 = [f64; 3];

/// Computes the texture frame for a triangle with world positions `p` and
/// texture coordinates `uv`, where one texel spans `1/width` × `1/height`
/// of UV space. Zero texel dimensions short-circuit to
/// [`TextureSpace::IDENTITY`].
pub fn texture_space(p: [Vec3; 3], uv: [Vec2; 3], width: u32, height: u32) -> TextureSpace {
    if width == 0 || height == 0 {
        return TextureSpace::IDENTITY;
    }

    // V axis is flipped between the two coordinate conventions.
    let t: [DVec2; 3] = [
        [uv[0].x as f64, -(uv[0].y as f64)],
        [uv[1].x as f64, -(uv[1].y as f64)],
        [uv[2].x as f64, -(uv[2].y as f64)],
    ];

    let bc_o = barycentric(t, [0.0, 0.0]);
    let bc_p = barycentric(t, [1.0, 0.0]);
    let bc_q = barycentric(t, [0.0, 1.0]);

    let w: [DVec3; 3] = [dvec3(p[0]), dvec3(p[1]), dvec3(p[2])];

    let origin = combine(w, bc_o);
    let mut axis_p = sub(combine(w, bc_p), origin);
    let mut axis_q = sub(combine(w, bc_q), origin);

    // One texel of travel in U/V must correspond to the measured world
    // distance, so the axis magnitude is the inverse per-texel length.
    let len_p = norm(axis_p);
    let len_q = norm(axis_q);
    let scale_p = if len_p > 1e-8 {
        1.0 / (len_p / f64::from(width))
    } else {
        1.0
    };
    let scale_q = if len_q > 1e-8 {
        1.0 / (len_q / f64::from(height))
    } else {
        1.0
    };

    axis_p = if len_p > 1e-8 {
        mul(axis_p, 1.0 / len_p)
    } else {
        [1.0, 0.0, 0.0]
    };
    axis_q = if len_q > 1e-8 {
        mul(axis_q, 1.0 / len_q)
    } else {
        [0.0, 1.0, 0.0]
    };

    // Re-orthogonalize against the shared perpendicular to remove shear,
    // then put the measured magnitude back along the original direction.
    let r = cross(axis_q, axis_p);
    let mut ortho_p = cross(r, axis_q);
    let mut ortho_q = cross(axis_p, r);
    ortho_p = mul(ortho_p, 1.0 / norm(ortho_p));
    ortho_q = mul(ortho_q, 1.0 / norm(ortho_q));

    let p_rescale = 1.0 / dot(axis_p, ortho_p);
    let q_rescale = 1.0 / dot(axis_q, ortho_q);

    let p_final = mul(ortho_p, scale_p * p_rescale);
    let q_final = mul(ortho_q, -scale_q * q_rescale);

    TextureSpace {
        origin: fvec3(origin),
        p: fvec3(p_final),
        q: fvec3(q_final),
    }
}

/// Barycentric coordinates of `point` with respect to triangle `t`; a
/// degenerate UV triangle collapses every probe onto the first corner.
fn barycentric(t: [DVec2; 3], point: DVec2) -> DVec3 {
    let area =
        |a: DVec2, b: DVec2, c: DVec2| (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);

    let n = area(t[0], t[1], t[2]);
    if n.abs() < 1e-10 {
        return [1.0, 0.0, 0.0];
    }

    let u = area(t[1], t[2], point) / n;
    let v = area(t[2], t[0], point) / n;
    [u, v, 1.0 - u - v]
}

fn dvec3(v: Vec3) -> DVec3 {
    [v.x as f64, v.y as f64, v.z as f64]
}

fn fvec3(v: DVec3) -> Vec3 {
    Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32)
}

fn combine(w: [DVec3; 3], bc: DVec3) -> DVec3 {
    [
        bc[0] * w[0][0] + bc[1] * w[1][0] + bc[2] * w[2][0],
        bc[0] * w[0][1] + bc[1] * w[1][1] + bc[2] * w[2][1],
        bc[0] * w[0][2] + bc[1] * w[1][2] + bc[2] * w[2][2],
    ]
}

fn sub(a: DVec3, b: DVec3) -> DVec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn mul(a: DVec3, s: f64) -> DVec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn dot(a: DVec3, b: DVec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: DVec3, b: DVec3) -> DVec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: DVec3) -> f64 {
    dot(a, a).sqrt()
}
