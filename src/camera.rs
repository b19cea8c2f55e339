use glam::{Mat4, Vec3};

const MOUSE_SENSITIVITY: f32 = 0.1;
const PITCH_LIMIT: f32 = 89.0;
const FOV_MIN: f32 = 1.0;
const FOV_MAX: f32 = 45.0;

/// First-person camera. Angles are kept in degrees.
#[derive(Clone, Debug)]
pub struct CameraController {
    pub pos: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        CameraController {
            pos: Vec3::new(0.0, 0.3, 2.8),
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
        }
    }
}

impl CameraController {
    /// Applies a look delta measured in pointer pixels. Positive `dy` looks up.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * MOUSE_SENSITIVITY;
        self.pitch = (self.pitch + dy * MOUSE_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_front();
    }

    /// Zooms by changing the vertical field of view.
    pub fn scroll(&mut self, offset: f32) {
        self.fov = (self.fov - offset).clamp(FOV_MIN, FOV_MAX);
    }

    /// Moves along the ground plane relative to the current heading.
    pub fn move_planar(&mut self, forward: f32, left: f32) {
        let heading = Vec3::new(self.front.x, 0.0, self.front.z).normalize_or_zero();
        let side = Vec3::new(heading.z, 0.0, -heading.x);
        self.pos += heading * forward + side * left;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.pos, self.pos + self.front, self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect.max(0.01), 0.1, 100.0)
    }

    fn update_front(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn default_looks_down_negative_z() {
        let mut cam = CameraController::default();
        cam.look(0.0, 0.0);
        assert_abs_diff_eq!(cam.front.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(cam.front.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = CameraController::default();
        cam.look(0.0, 10_000.0);
        assert_eq!(cam.pitch, 89.0);
        cam.look(0.0, -20_000.0);
        assert_eq!(cam.pitch, -89.0);
        assert_relative_eq!(cam.front.length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn fov_is_clamped() {
        let mut cam = CameraController::default();
        cam.scroll(-10.0);
        assert_eq!(cam.fov, 45.0);
        cam.scroll(100.0);
        assert_eq!(cam.fov, 1.0);
        cam.scroll(-3.0);
        assert_eq!(cam.fov, 4.0);
    }

    #[test]
    fn planar_movement_keeps_height() {
        let mut cam = CameraController::default();
        cam.look(0.0, 300.0);
        let y = cam.pos.y;
        cam.move_planar(1.0, 0.0);
        assert_relative_eq!(cam.pos.y, y);
        assert_relative_eq!(cam.pos.z, 1.8, epsilon = 1e-5);
        // Left of a camera facing -Z is -X
        cam.move_planar(0.0, 1.0);
        assert_relative_eq!(cam.pos.x, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn view_maps_target_in_front_to_negative_z() {
        let cam = CameraController::default();
        let p = cam.view().transform_point3(cam.pos + cam.front * 2.0);
        assert_relative_eq!(p.z, -2.0, epsilon = 1e-5);
    }
}
