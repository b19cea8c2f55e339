use crate::assets::{SceneTextures, Texture};
use crate::camera::CameraController;
use crate::graphics::{draw_clip_triangle, draw_line, DrawState, FrameBuffer};
use crate::mesh::{self, MeshVertex};
use crate::state::{RenderFlags, SimState, StatusIcon};
use crate::vertex::ClipVertex;
use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
use std::f32::consts::{FRAC_PI_2, PI};

const SKY: Vec3 = Vec3::new(0.671, 0.851, 0.89);
const LIGHT_DIR: Vec3 = Vec3::new(-0.4, -1.0, -0.2);

const LED_ON: Vec4 = Vec4::new(0.141, 0.8, 0.263, 1.0);
const LED_OFF: Vec4 = Vec4::new(0.8787, 0.204, 0.051, 1.0);
const PANEL_ON: Vec4 = Vec4::new(0.922, 0.922, 0.922, 1.0);
const PANEL_OFF: Vec4 = Vec4::new(0.859, 0.918, 0.941, 1.0);

const DESK: Vec4 = Vec4::new(0.467, 0.553, 0.6, 1.0);
const DESK_LEG: Vec4 = Vec4::new(0.2, 0.2, 0.2, 1.0);
const SEAT: Vec4 = Vec4::new(0.25, 0.25, 0.28, 1.0);
const SEAT_BACK: Vec4 = Vec4::new(0.22, 0.22, 0.25, 1.0);
const SEAT_LEG: Vec4 = Vec4::new(0.12, 0.12, 0.12, 1.0);

/// How a mesh is shaded
#[derive(Clone, Copy)]
struct Material<'a> {
    tint: Vec4,
    texture: Option<&'a Texture>,
    unlit: bool,
    transparent: bool,
    two_sided: bool,
}

impl Material<'_> {
    fn solid(tint: Vec4) -> Self {
        Material {
            tint,
            texture: None,
            unlit: false,
            transparent: false,
            two_sided: false,
        }
    }
}

/// Owns the meshes and textures and draws the room
pub struct Renderer {
    cube: Vec<MeshVertex>,
    basin: Vec<MeshVertex>,
    water: Vec<MeshVertex>,
    droplet: Vec<MeshVertex>,
    textures: SceneTextures,
}

impl Renderer {
    pub fn new(textures: SceneTextures) -> Self {
        Renderer {
            cube: mesh::unit_box(Vec4::ONE),
            basin: mesh::cylinder(0.3, 0.15, 64, Vec4::ONE, true),
            water: mesh::cylinder(0.3, 0.15, 32, Vec4::new(0.3, 0.6, 1.0, 0.55), true),
            droplet: mesh::sphere(1.0, 8, 6, Vec4::new(0.35, 0.7, 1.0, 0.55)),
            textures,
        }
    }

    pub fn render(
        &self,
        fb: &mut FrameBuffer,
        state: &SimState,
        camera: &CameraController,
        flags: RenderFlags,
    ) {
        fb.clear(SKY);
        if fb.width == 0 || fb.height == 0 {
            return;
        }
        let aspect = fb.width as f32 / fb.height as f32;
        let view_proj = camera.projection(aspect) * camera.view();

        let mut pass = Pass {
            fb,
            view_proj,
            flags,
        };

        self.draw_room(&mut pass);
        self.draw_furniture(&mut pass);
        self.draw_ac(&mut pass, state);
        self.draw_basin(&mut pass, state);
        draw_crosshair(pass.fb);
    }

    fn draw_room(&self, pass: &mut Pass) {
        let wall_pos = Vec3::new(-0.2, 0.15, -3.12);
        let wall = Material {
            texture: self.textures.wall.as_ref(),
            two_sided: true,
            ..Material::solid(Vec4::new(0.93, 0.91, 0.87, 1.0))
        };
        pass.draw(&self.cube, boxed(wall_pos, Vec3::new(3.8, 2.6, 0.02)), &wall);

        let floor = Material {
            texture: self.textures.floor.as_ref(),
            ..Material::solid(Vec4::new(0.8, 0.76, 0.7, 1.0))
        };
        pass.draw(
            &self.cube,
            boxed(Vec3::new(-0.2, -1.105, -1.62), Vec3::new(3.78, 0.02, 3.0)),
            &floor,
        );
    }

    fn draw_furniture(&self, pass: &mut Pass) {
        let mut parts = vec![
            (Vec3::new(-1.305, -0.6, -0.65), Vec3::new(1.04, 0.024, 0.82), DESK),
            (Vec3::new(-1.296, -0.82, -1.03), Vec3::new(0.33, 0.04, 0.38), SEAT),
            (Vec3::new(-1.296, -0.65, -1.22), Vec3::new(0.33, 0.38, 0.05), SEAT_BACK),
        ];
        for (x, z) in [(-1.8, -0.3), (-0.8, -0.3), (-1.8, -1.0), (-0.8, -1.0)] {
            parts.push((Vec3::new(x, -0.85, z), Vec3::new(0.024, 0.47, 0.024), DESK_LEG));
        }
        for (x, z) in [(-1.4, -0.9), (-1.2, -0.9), (-1.4, -1.17), (-1.2, -1.17)] {
            parts.push((Vec3::new(x, -1.0, z), Vec3::new(0.022, 0.31, 0.022), SEAT_LEG));
        }

        // Second desk and chair
        for shift in [Vec3::ZERO, Vec3::new(2.2, 0.0, 0.0)] {
            for &(pos, size, tint) in &parts {
                pass.draw(&self.cube, boxed(pos + shift, size), &Material::solid(tint));
            }
        }

        // Laptop, paper and phone
        let items = [
            (
                Vec3::new(-1.3, -0.441, -0.579),
                Vec3::new(0.25, 0.21, 0.008),
                Vec4::new(0.25, 0.28, 0.32, 1.0),
            ),
            (
                Vec3::new(-1.3, -0.55, -0.68),
                Vec3::new(0.25, 0.008, 0.21),
                Vec4::new(0.984, 0.855, 0.835, 1.0),
            ),
            (
                Vec3::new(0.9, -0.57, -0.65),
                Vec3::new(0.26, 0.004, 0.37),
                Vec4::ONE,
            ),
            (
                Vec3::new(0.7, -0.57, -0.65),
                Vec3::new(0.056, 0.006, 0.128),
                Vec4::new(0.05, 0.05, 0.05, 1.0),
            ),
        ];
        for (pos, size, tint) in items {
            pass.draw(&self.cube, boxed(pos, size), &Material::solid(tint));
        }
    }

    fn draw_ac(&self, pass: &mut Pass, state: &SimState) {
        let ac = &state.ac;

        let body = Material {
            unlit: true,
            ..Material::solid(Vec4::new(1.0, 0.99, 0.99, 1.0))
        };
        pass.draw(&self.cube, boxed(ac.pos, Vec3::new(0.9, 0.26, 0.24)), &body);

        // Cover swings about a hinge along its back edge
        let hinge = ac.pos + Vec3::new(0.0, -0.135, 0.003 - 0.12);
        let cover = Mat4::from_translation(hinge)
            * Mat4::from_rotation_x(ac.cover_angle.to_radians())
            * Mat4::from_translation(Vec3::new(0.0, 0.0, 0.12))
            * Mat4::from_scale(Vec3::new(0.9, 0.01, 0.24));
        pass.draw(&self.cube, cover, &Material::solid(Vec4::new(0.9, 0.95, 0.97, 1.0)));

        // Cap faces the room
        let led = Mat4::from_scale_rotation_translation(
            Vec3::new(0.085, 0.08, 0.08),
            Quat::from_rotation_x(-FRAC_PI_2),
            ac.led_pos,
        );
        let led_tint = if ac.power { LED_ON } else { LED_OFF };
        pass.draw(&self.basin, led, &Material::solid(led_tint));

        let panel_tint = if ac.power { PANEL_ON } else { PANEL_OFF };
        let panel = Material {
            two_sided: true,
            ..Material::solid(panel_tint)
        };
        for x in [-0.30, -0.05, 0.20] {
            let center = ac.pos + Vec3::new(x, -0.075, 0.126);
            pass.draw(&self.cube, boxed(center, Vec3::new(0.19, 0.07, 0.004)), &panel);
        }

        let icon = Material {
            unlit: !ac.power,
            ..Material::solid(icon_tint(ac.status_icon(), ac.power))
        };
        let icon_pos = ac.pos + Vec3::new(0.20, -0.075, 0.13);
        pass.draw(&self.cube, boxed(icon_pos, Vec3::new(0.05, 0.05, 0.002)), &icon);
    }

    fn draw_basin(&self, pass: &mut Pass, state: &SimState) {
        let basin = &state.basin;
        let shell = Material {
            two_sided: true,
            ..Material::solid(Vec4::new(0.831, 0.722, 0.702, 1.0))
        };
        pass.draw(&self.basin, Mat4::from_translation(basin.pos), &shell);

        if basin.level > 0.01 {
            let center_y = -basin.height * 0.5 + basin.height * basin.level * 0.5;
            // Flipped so the cap is the water surface
            let water = Mat4::from_scale_rotation_translation(
                Vec3::new(0.99, basin.level, 0.99),
                Quat::from_rotation_x(PI),
                basin.pos + Vec3::new(0.0, center_y, 0.0),
            );
            let material = Material {
                transparent: true,
                two_sided: true,
                ..Material::solid(Vec4::ONE)
            };
            pass.draw(&self.water, water, &material);
        }

        let drop = Material {
            transparent: true,
            ..Material::solid(Vec4::ONE)
        };
        for d in state.drops.iter().filter(|d| d.alive) {
            let model =
                Mat4::from_scale_rotation_translation(Vec3::splat(0.02), Quat::IDENTITY, d.pos);
            pass.draw(&self.droplet, model, &drop);
        }
    }
}

/// One frame's render target and camera
struct Pass<'f> {
    fb: &'f mut FrameBuffer,
    view_proj: Mat4,
    flags: RenderFlags,
}

impl Pass<'_> {
    fn draw(&mut self, mesh: &[MeshVertex], model: Mat4, material: &Material) {
        let mvp = self.view_proj * model;
        let normal_matrix = Mat3::from_mat4(model).inverse().transpose();
        let blend = material.transparent && self.flags.transparency;
        let state = DrawState {
            tint: material.tint,
            texture: material.texture.filter(|_| self.flags.textures),
            light_dir: LIGHT_DIR,
            unlit: material.unlit,
            blend,
            depth_test: self.flags.depth_test,
            depth_write: !blend,
            cull_back: self.flags.cull_faces && !material.two_sided,
        };

        let clip = |v: &MeshVertex| ClipVertex {
            clip: mvp * v.position.extend(1.0),
            normal: (normal_matrix * v.normal).normalize_or_zero(),
            uv: v.uv,
            color: v.color,
        };
        for tri in mesh.chunks_exact(3) {
            draw_clip_triangle([clip(&tri[0]), clip(&tri[1]), clip(&tri[2])], self.fb, &state);
        }
    }
}

fn boxed(pos: Vec3, size: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(size, Quat::IDENTITY, pos)
}

fn icon_tint(icon: StatusIcon, power: bool) -> Vec4 {
    if !power {
        return Vec4::new(0.7, 0.7, 0.7, 1.0);
    }
    match icon {
        StatusIcon::Check => Vec4::new(0.2, 0.8, 0.3, 1.0),
        StatusIcon::Fire => Vec4::new(1.0, 0.45, 0.1, 1.0),
        StatusIcon::Snow => Vec4::new(0.55, 0.8, 1.0, 1.0),
    }
}

fn draw_crosshair(fb: &mut FrameBuffer) {
    let c = Vec2::new(fb.width as f32 * 0.5, fb.height as f32 * 0.5).floor();
    let arm = 2.0;
    draw_line(c - Vec2::new(arm, 0.0), c + Vec2::new(arm, 0.0), fb, Vec3::ONE);
    draw_line(c - Vec2::new(0.0, arm), c + Vec2::new(0.0, arm), fb, Vec3::ONE);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sky() -> [u8; 3] {
        let c = SKY * 255.0;
        [c.x as u8, c.y as u8, c.z as u8]
    }

    fn camera_facing_led(state: &SimState) -> CameraController {
        CameraController {
            pos: state.ac.led_pos + Vec3::new(0.0, 0.0, 0.3),
            ..CameraController::default()
        }
    }

    #[test]
    fn default_view_is_mostly_room() {
        let renderer = Renderer::new(SceneTextures::default());
        let mut fb = FrameBuffer::new(80, 60);
        renderer.render(
            &mut fb,
            &SimState::default(),
            &CameraController::default(),
            RenderFlags::default(),
        );

        let covered = fb.pixels.iter().filter(|p| **p != sky()).count();
        assert!(covered > fb.pixels.len() / 4);
    }

    #[test]
    fn crosshair_marks_centre() {
        let renderer = Renderer::new(SceneTextures::default());
        let mut fb = FrameBuffer::new(40, 30);
        renderer.render(
            &mut fb,
            &SimState::default(),
            &CameraController::default(),
            RenderFlags::default(),
        );
        assert_eq!(fb.pixel(20, 15), [255, 255, 255]);
        assert_eq!(fb.pixel(22, 15), [255, 255, 255]);
    }

    #[test]
    fn led_colour_follows_power() {
        let renderer = Renderer::new(SceneTextures::default());
        let mut state = SimState::default();
        let camera = camera_facing_led(&state);
        let mut fb = FrameBuffer::new(80, 60);

        renderer.render(&mut fb, &state, &camera, RenderFlags::default());
        let [r, g, _] = fb.pixel(43, 33);
        assert!(r > g, "off LED should be red, got {:?}", fb.pixel(43, 33));

        state.ac.power = true;
        renderer.render(&mut fb, &state, &camera, RenderFlags::default());
        let [r, g, _] = fb.pixel(43, 33);
        assert!(g > r, "on LED should be green, got {:?}", fb.pixel(43, 33));
    }

    #[test]
    fn empty_framebuffer_is_ignored() {
        let renderer = Renderer::new(SceneTextures::default());
        let mut fb = FrameBuffer::new(0, 0);
        renderer.render(
            &mut fb,
            &SimState::default(),
            &CameraController::default(),
            RenderFlags::default(),
        );
        assert!(fb.pixels.is_empty());
    }

    #[test]
    fn water_only_drawn_above_threshold() {
        let renderer = Renderer::new(SceneTextures::default());
        let mut state = SimState::default();
        let camera = CameraController {
            pos: state.basin.pos + Vec3::new(0.0, 1.0, 0.0),
            front: Vec3::NEG_Y,
            up: Vec3::NEG_Z,
            pitch: -89.0,
            ..CameraController::default()
        };
        let mut empty = FrameBuffer::new(40, 30);
        renderer.render(&mut empty, &state, &camera, RenderFlags::default());

        state.basin.level = 0.5;
        let mut filled = FrameBuffer::new(40, 30);
        renderer.render(&mut filled, &state, &camera, RenderFlags::default());

        // Water tints the basin floor blue
        let [r, _, b] = filled.pixel(24, 18);
        let [r0, _, b0] = empty.pixel(24, 18);
        assert!(b as i32 - r as i32 > b0 as i32 - r0 as i32);
    }
}
