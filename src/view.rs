use crate::camera::CameraController;
use crate::config::Profile;
use crate::graphics::FrameBuffer;
use crate::input::FrameInput;
use crate::renderer::Renderer;
use crate::state::{RenderFlags, SimState};
use crate::terminal::Screen;
use log::debug;
use std::io::{self, Write};
use std::time::Instant;

const TEXT: [u8; 3] = [235, 235, 235];
const DEBUG_TEXT: [u8; 3] = [170, 220, 170];

/// Scene view: owns the framebuffer and the cell grid it is shown on
pub struct SceneView {
    renderer: Renderer,
    fb: FrameBuffer,
    screen: Screen,
    pub flags: RenderFlags,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl SceneView {
    pub fn new(renderer: Renderer, cols: u16, rows: u16, debug: bool) -> Self {
        let screen = Screen::new(cols, rows);
        let (width, height) = screen.pixel_size();
        SceneView {
            renderer,
            fb: FrameBuffer::new(width, height),
            screen,
            flags: RenderFlags {
                debug,
                ..RenderFlags::default()
            },
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    /// Applies the debug toggles and terminal resizes from one frame of input
    pub fn handle_input(&mut self, input: &FrameInput) {
        let flags = &mut self.flags;
        flags.depth_test ^= input.toggle_depth;
        flags.cull_faces ^= input.toggle_cull;
        flags.textures ^= input.toggle_textures;
        flags.transparency ^= input.toggle_transparency;
        flags.debug ^= input.toggle_debug;
        if input.toggle_depth
            || input.toggle_cull
            || input.toggle_textures
            || input.toggle_transparency
        {
            debug!("render flags now {:?}", self.flags);
        }

        if let Some((cols, rows)) = input.resized {
            self.screen.resize(cols, rows);
            let (width, height) = self.screen.pixel_size();
            self.fb.resize(width, height);
        }
    }

    /// Renders the scene and the overlays into the cell grid
    pub fn paint(
        &mut self,
        state: &SimState,
        camera: &CameraController,
        profile: &Profile,
        now: Instant,
    ) {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let duration = now.saturating_duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        self.renderer.render(&mut self.fb, state, camera, self.flags);
        self.screen.compose(&self.fb);

        let bottom = self.screen.rows().saturating_sub(1);
        self.screen.draw_text(0, bottom, &status_line(state, profile), TEXT);

        if self.flags.debug {
            for (i, line) in debug_lines(self.fps, camera, self.flags).iter().enumerate() {
                self.screen.draw_text(1, i as u16, line, DEBUG_TEXT);
            }
        }
    }

    pub fn present<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.screen.flush(out)
    }
}

/// The AC panel and basin readout
pub fn status_line(state: &SimState, profile: &Profile) -> String {
    let ac = &state.ac;
    let basin = &state.basin;
    format!(
        " Set {}°C  Room {}°C  [{}]  Power {}  Water {:.0}%{}  Basin {}  ({}) ",
        ac.desired_temp as i32,
        ac.measured_temp as i32,
        ac.status_icon().label(),
        if ac.power { "on" } else { "off" },
        basin.level * 100.0,
        if basin.full { " FULL" } else { "" },
        basin.state.label(),
        profile.name(),
    )
}

pub fn debug_lines(fps: f64, camera: &CameraController, flags: RenderFlags) -> Vec<String> {
    let on_off = |b: bool| if b { "on" } else { "off" };
    vec![
        // Draw program name and version
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        format!("FPS: {:.2}", fps),
        format!(
            "Camera: ({:.2}, {:.2}, {:.2}) yaw {:.1} pitch {:.1} fov {:.1}",
            camera.pos.x, camera.pos.y, camera.pos.z, camera.yaw, camera.pitch, camera.fov
        ),
        format!(
            "Depth [D] {}  Cull [C] {}  Textures [T] {}  Blend [X] {}",
            on_off(flags.depth_test),
            on_off(flags.cull_faces),
            on_off(flags.textures),
            on_off(flags.transparency)
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SceneTextures;
    use crate::state::BasinState;

    fn view(debug: bool) -> SceneView {
        SceneView::new(Renderer::new(SceneTextures::default()), 40, 12, debug)
    }

    #[test]
    fn status_line_shows_panel_values() {
        let mut state = SimState::default();
        let line = status_line(&state, &Profile::classic());
        assert!(line.contains("Set 24°C"));
        assert!(line.contains("Room 30°C"));
        assert!(line.contains("[cooling]"));
        assert!(line.contains("Power off"));
        assert!(line.contains("(classic)"));

        state.ac.power = true;
        state.basin.level = 0.82;
        state.basin.full = true;
        state.basin.state = BasinState::InFrontFull;
        let line = status_line(&state, &Profile::rapid());
        assert!(line.contains("Power on"));
        assert!(line.contains("Water 82% FULL"));
        assert!(line.contains("carried (full)"));
        assert!(line.contains("(rapid)"));
    }

    #[test]
    fn toggles_flip_flags() {
        let mut view = view(false);
        let input = FrameInput {
            toggle_depth: true,
            toggle_debug: true,
            ..FrameInput::default()
        };
        view.handle_input(&input);
        assert!(!view.flags.depth_test);
        assert!(view.flags.debug);
        assert!(view.flags.cull_faces);

        view.handle_input(&input);
        assert_eq!(view.flags, RenderFlags::default());
    }

    #[test]
    fn resize_rebuilds_framebuffer() {
        let mut view = view(false);
        view.handle_input(&FrameInput {
            resized: Some((20, 5)),
            ..FrameInput::default()
        });
        assert_eq!((view.fb.width, view.fb.height), (20, 10));
    }

    #[test]
    fn paint_and_present_write_output() {
        let mut view = view(true);
        view.paint(
            &SimState::default(),
            &CameraController::default(),
            &Profile::classic(),
            Instant::now(),
        );
        let mut out = Vec::new();
        view.present(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains(env!("CARGO_PKG_NAME")));
        assert!(text.contains("Room"));
    }

    #[test]
    fn debug_block_names_flags() {
        let lines = debug_lines(60.0, &CameraController::default(), RenderFlags::default());
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("60.00"));
        assert!(lines[3].contains("Cull [C] on"));
    }
}
