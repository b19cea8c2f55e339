use glam::{Vec2, Vec3, Vec4};

/// Vertex in clip space, before the perspective divide
#[derive(Clone, Copy, Debug)]
pub struct ClipVertex {
    pub clip: Vec4,
    pub normal: Vec3,
    pub uv: Vec2,
    pub color: Vec4,
}

impl ClipVertex {
    pub fn lerp(&self, other: &ClipVertex, t: f32) -> ClipVertex {
        ClipVertex {
            clip: self.clip.lerp(other.clip, t),
            normal: self.normal.lerp(other.normal, t),
            uv: self.uv.lerp(other.uv, t),
            color: self.color.lerp(other.color, t),
        }
    }

    /// Signed distance to the near plane; non-negative is visible
    pub fn near_distance(&self) -> f32 {
        self.clip.z + self.clip.w
    }

    /// Perspective divide and viewport transform
    pub fn to_screen(&self, width: usize, height: usize) -> Vertex {
        let inv_w = 1.0 / self.clip.w;
        let ndc = self.clip.truncate() * inv_w;
        Vertex {
            screen_position: Vec2::new(
                (ndc.x + 1.0) * 0.5 * width as f32,
                (1.0 - ndc.y) * 0.5 * height as f32,
            ),
            depth: ndc.z * 0.5 + 0.5,
            inv_w,
            normal: self.normal,
            uv: self.uv,
            color: self.color,
        }
    }
}

/// Vertex structure with screen position, depth, and the attributes to interpolate
#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub screen_position: Vec2,
    pub depth: f32,
    pub inv_w: f32,
    pub normal: Vec3,
    pub uv: Vec2,
    pub color: Vec4,
}
