//! Procedural meshes. Every builder returns a triangle list wound
//! counter-clockwise when seen from outside the shape.

use glam::{Vec2, Vec3, Vec4};
use std::f32::consts::TAU;

/// One vertex of a triangle list
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub color: Vec4,
    pub uv: Vec2,
    pub normal: Vec3,
}

impl MeshVertex {
    fn new(position: Vec3, color: Vec4, uv: Vec2, normal: Vec3) -> Self {
        MeshVertex {
            position,
            color,
            uv,
            normal,
        }
    }
}

fn ring_point(radius: f32, angle: f32, y: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), y, radius * angle.sin())
}

/// Builds an open-topped cylinder centred on the origin, axis along Y.
pub fn cylinder(
    radius: f32,
    height: f32,
    segments: usize,
    color: Vec4,
    with_bottom: bool,
) -> Vec<MeshVertex> {
    let segments = segments.max(3);
    let mut out = Vec::with_capacity(segments * if with_bottom { 9 } else { 6 });

    let y0 = -height * 0.5;
    let y1 = height * 0.5;

    for i in 0..segments {
        let a0 = i as f32 / segments as f32 * TAU;
        let a1 = (i + 1) as f32 / segments as f32 * TAU;

        let p00 = ring_point(radius, a0, y0);
        let p01 = ring_point(radius, a1, y0);
        let p10 = ring_point(radius, a0, y1);
        let p11 = ring_point(radius, a1, y1);

        let n0 = Vec3::new(a0.cos(), 0.0, a0.sin());
        let n1 = Vec3::new(a1.cos(), 0.0, a1.sin());

        out.push(MeshVertex::new(p00, color, Vec2::new(0.0, 0.0), n0));
        out.push(MeshVertex::new(p10, color, Vec2::new(0.0, 1.0), n0));
        out.push(MeshVertex::new(p11, color, Vec2::new(1.0, 1.0), n1));

        out.push(MeshVertex::new(p00, color, Vec2::new(0.0, 0.0), n0));
        out.push(MeshVertex::new(p11, color, Vec2::new(1.0, 1.0), n1));
        out.push(MeshVertex::new(p01, color, Vec2::new(1.0, 0.0), n1));
    }

    if with_bottom {
        let n = Vec3::NEG_Y;
        let center = Vec3::new(0.0, y0, 0.0);
        let uv = Vec2::splat(0.5);

        for i in 0..segments {
            let a0 = i as f32 / segments as f32 * TAU;
            let a1 = (i + 1) as f32 / segments as f32 * TAU;

            out.push(MeshVertex::new(center, color, uv, n));
            out.push(MeshVertex::new(ring_point(radius, a0, y0), color, uv, n));
            out.push(MeshVertex::new(ring_point(radius, a1, y0), color, uv, n));
        }
    }

    out
}

/// Builds a UV sphere centred on the origin.
pub fn sphere(radius: f32, segments: usize, rings: usize, color: Vec4) -> Vec<MeshVertex> {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut out = Vec::with_capacity(segments * rings * 6);

    let point = |theta: f32, phi: f32| {
        Vec3::new(
            theta.sin() * phi.cos(),
            theta.cos(),
            theta.sin() * phi.sin(),
        )
    };

    for y in 0..rings {
        let v0 = y as f32 / rings as f32;
        let v1 = (y + 1) as f32 / rings as f32;
        let th0 = v0 * std::f32::consts::PI;
        let th1 = v1 * std::f32::consts::PI;

        for x in 0..segments {
            let u0 = x as f32 / segments as f32;
            let u1 = (x + 1) as f32 / segments as f32;
            let ph0 = u0 * TAU;
            let ph1 = u1 * TAU;

            let n00 = point(th0, ph0);
            let n10 = point(th1, ph0);
            let n11 = point(th1, ph1);
            let n01 = point(th0, ph1);

            out.push(MeshVertex::new(n00 * radius, color, Vec2::new(u0, v0), n00));
            out.push(MeshVertex::new(n11 * radius, color, Vec2::new(u1, v1), n11));
            out.push(MeshVertex::new(n10 * radius, color, Vec2::new(u0, v1), n10));

            out.push(MeshVertex::new(n00 * radius, color, Vec2::new(u0, v0), n00));
            out.push(MeshVertex::new(n01 * radius, color, Vec2::new(u1, v0), n01));
            out.push(MeshVertex::new(n11 * radius, color, Vec2::new(u1, v1), n11));
        }
    }

    out
}

/// Builds an axis-aligned unit box spanning -0.5..0.5 on every axis.
pub fn unit_box(color: Vec4) -> Vec<MeshVertex> {
    // (normal, u axis, v axis); u x v == normal keeps every face counter-clockwise
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];

    let mut out = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let corner = |su: f32, sv: f32| {
            let position = normal * 0.5 + u * (su - 0.5) + v * (sv - 0.5);
            MeshVertex::new(position, color, Vec2::new(su, sv), normal)
        };
        let (c00, c10, c11, c01) = (
            corner(0.0, 0.0),
            corner(1.0, 0.0),
            corner(1.0, 1.0),
            corner(0.0, 1.0),
        );
        out.extend_from_slice(&[c00, c10, c11, c00, c11, c01]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WHITE: Vec4 = Vec4::ONE;

    /// Calculates the normal vector of a triangle
    fn calculate_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
        (b - a).cross(c - a).normalize_or_zero()
    }

    fn assert_outward_winding(mesh: &[MeshVertex]) {
        for tri in mesh.chunks_exact(3) {
            let (a, b, c) = (tri[0].position, tri[1].position, tri[2].position);
            if (b - a).cross(c - a).length() < 1e-5 {
                // Degenerate sliver at a sphere pole
                continue;
            }
            let face = calculate_normal(a, b, c);
            let shading = tri[0].normal + tri[1].normal + tri[2].normal;
            assert!(face.dot(shading) > 0.0, "inward triangle {:?}", tri);
        }
    }

    #[test]
    fn cylinder_vertex_counts() {
        assert_eq!(cylinder(0.3, 0.15, 64, WHITE, false).len(), 64 * 6);
        assert_eq!(cylinder(0.3, 0.15, 64, WHITE, true).len(), 64 * 9);
    }

    #[test]
    fn cylinder_wall_sits_on_radius_and_height() {
        let mesh = cylinder(0.3, 0.15, 16, WHITE, false);
        for v in &mesh {
            let radial = Vec2::new(v.position.x, v.position.z).length();
            assert_relative_eq!(radial, 0.3, epsilon = 1e-5);
            assert_relative_eq!(v.position.y.abs(), 0.075, epsilon = 1e-6);
            assert_relative_eq!(v.normal.length(), 1.0, epsilon = 1e-5);
        }
        assert_outward_winding(&mesh);
    }

    #[test]
    fn cylinder_bottom_faces_down() {
        let mesh = cylinder(0.3, 0.15, 8, WHITE, true);
        let bottom = &mesh[8 * 6..];
        assert!(bottom.iter().all(|v| v.normal == Vec3::NEG_Y));
        assert_outward_winding(bottom);
    }

    #[test]
    fn sphere_points_lie_on_surface() {
        let mesh = sphere(2.0, 16, 12, WHITE);
        assert_eq!(mesh.len(), 16 * 12 * 6);
        for v in &mesh {
            assert_relative_eq!(v.position.length(), 2.0, epsilon = 1e-4);
            assert_relative_eq!(v.normal.length(), 1.0, epsilon = 1e-4);
        }
        assert_outward_winding(&mesh);
    }

    #[test]
    fn unit_box_is_closed_and_outward() {
        let mesh = unit_box(WHITE);
        assert_eq!(mesh.len(), 36);
        for v in &mesh {
            assert_relative_eq!(v.position.abs().max_element(), 0.5);
        }
        assert_outward_winding(&mesh);
    }

    #[test]
    fn builders_clamp_degenerate_resolution() {
        assert_eq!(cylinder(1.0, 1.0, 0, WHITE, false).len(), 3 * 6);
        assert_eq!(sphere(1.0, 1, 1, WHITE).len(), 3 * 2 * 6);
    }
}
