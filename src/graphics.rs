use crate::assets::Texture;
use crate::math::{calculate_light_intensity, edge_function};
use crate::vertex::{ClipVertex, Vertex};
use glam::{Vec2, Vec3, Vec4};

/// Colour and depth targets for one frame
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[u8; 3]>,
    pub z_buffer: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            pixels: vec![[0; 3]; width * height],
            z_buffer: vec![f32::INFINITY; width * height],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.resize(width * height, [0; 3]);
        self.z_buffer.resize(width * height, f32::INFINITY);
    }

    pub fn clear(&mut self, color: Vec3) {
        self.pixels.fill(to_rgb8(color));
        self.z_buffer.fill(f32::INFINITY);
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        self.pixels[y * self.width + x]
    }
}

/// Per-draw raster state
#[derive(Clone, Copy)]
pub struct DrawState<'a> {
    pub tint: Vec4,
    pub texture: Option<&'a Texture>,
    pub light_dir: Vec3,
    pub unlit: bool,
    pub blend: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub cull_back: bool,
}

impl Default for DrawState<'_> {
    fn default() -> Self {
        DrawState {
            tint: Vec4::ONE,
            texture: None,
            light_dir: Vec3::new(-0.4, -1.0, -0.2),
            unlit: false,
            blend: false,
            depth_test: true,
            depth_write: true,
            cull_back: true,
        }
    }
}

fn to_rgb8(color: Vec3) -> [u8; 3] {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8]
}

fn from_rgb8(rgb: [u8; 3]) -> Vec3 {
    Vec3::new(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32) / 255.0
}

/// Clips a triangle against the near plane and rasterizes what is left
pub fn draw_clip_triangle(tri: [ClipVertex; 3], fb: &mut FrameBuffer, state: &DrawState) {
    let mut polygon: Vec<ClipVertex> = Vec::with_capacity(4);
    for i in 0..3 {
        let a = &tri[i];
        let b = &tri[(i + 1) % 3];
        let (da, db) = (a.near_distance(), b.near_distance());
        if da >= 0.0 {
            polygon.push(*a);
        }
        if (da >= 0.0) != (db >= 0.0) {
            polygon.push(a.lerp(b, da / (da - db)));
        }
    }
    if polygon.len() < 3 {
        return;
    }

    let screen: Vec<Vertex> = polygon
        .iter()
        .map(|v| v.to_screen(fb.width, fb.height))
        .collect();
    for i in 1..screen.len() - 1 {
        draw_triangle(&screen[0], &screen[i], &screen[i + 1], fb, state);
    }
}

/// Draws a triangle with per-pixel lighting
pub fn draw_triangle(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    fb: &mut FrameBuffer,
    state: &DrawState,
) {
    if fb.width == 0 || fb.height == 0 {
        return;
    }
    let (s0, s1, s2) = (v0.screen_position, v1.screen_position, v2.screen_position);

    // Precompute area of the triangle; positive means counter-clockwise in NDC
    let area = edge_function(s0, s1, s2);
    if area.abs() < f32::EPSILON || (state.cull_back && area < 0.0) {
        return;
    }

    // Compute bounding box of the triangle
    let min = s0.min(s1).min(s2).floor().max(Vec2::ZERO);
    let max = s0
        .max(s1)
        .max(s2)
        .ceil()
        .min(Vec2::new(fb.width as f32 - 1.0, fb.height as f32 - 1.0));
    if min.x > max.x || min.y > max.y {
        return;
    }

    for y in min.y as usize..=max.y as usize {
        for x in min.x as usize..=max.x as usize {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

            // Normalize barycentric coordinates
            let w0 = edge_function(s1, s2, p) / area;
            let w1 = edge_function(s2, s0, p) / area;
            let w2 = edge_function(s0, s1, p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            // Depth test
            let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;
            let offset = y * fb.width + x;
            if state.depth_test && depth >= fb.z_buffer[offset] {
                continue;
            }

            // Perspective-correct weights for the attributes
            let (p0, p1, p2) = (w0 * v0.inv_w, w1 * v1.inv_w, w2 * v2.inv_w);
            let norm = 1.0 / (p0 + p1 + p2);
            let (p0, p1, p2) = (p0 * norm, p1 * norm, p2 * norm);

            let mut color = (v0.color * p0 + v1.color * p1 + v2.color * p2) * state.tint;
            if let Some(texture) = state.texture {
                let uv = v0.uv * p0 + v1.uv * p1 + v2.uv * p2;
                color *= texture.sample(uv);
            }
            let mut rgb = color.truncate();
            if !state.unlit {
                let normal = (v0.normal * p0 + v1.normal * p1 + v2.normal * p2).normalize_or_zero();
                rgb *= calculate_light_intensity(normal, state.light_dir);
            }

            if state.blend {
                let dst = from_rgb8(fb.pixels[offset]);
                rgb = dst.lerp(rgb, color.w.clamp(0.0, 1.0));
            }
            fb.pixels[offset] = to_rgb8(rgb);
            if state.depth_write {
                fb.z_buffer[offset] = depth;
            }
        }
    }
}

/// Draws a line between two points in the pixel buffer using Bresenham's algorithm
pub fn draw_line(from: Vec2, to: Vec2, fb: &mut FrameBuffer, color: Vec3) {
    let (mut x0, mut y0, x1, y1) = (
        from.x.round() as isize,
        from.y.round() as isize,
        to.x.round() as isize,
        to.y.round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy
    let rgb = to_rgb8(color);

    loop {
        if x0 >= 0 && x0 < fb.width as isize && y0 >= 0 && y0 < fb.height as isize {
            fb.pixels[y0 as usize * fb.width + x0 as usize] = rgb;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
