use glam::Vec3;

/// A falling drop of condensation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Droplet {
    pub pos: Vec3,
    pub vel: Vec3,
    pub alive: bool,
}

impl Droplet {
    pub fn new(pos: Vec3, vel: Vec3) -> Self {
        Droplet {
            pos,
            vel,
            alive: true,
        }
    }
}

/// Where the basin is and whether it is being carried
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BasinState {
    OnFloor,
    InFrontFull,
    InFrontEmpty,
}

impl BasinState {
    pub fn is_carried(self) -> bool {
        !matches!(self, BasinState::OnFloor)
    }

    pub fn label(self) -> &'static str {
        match self {
            BasinState::OnFloor => "on floor",
            BasinState::InFrontFull => "carried (full)",
            BasinState::InFrontEmpty => "carried (empty)",
        }
    }
}

/// The wall-mounted air conditioner
#[derive(Clone, Debug, PartialEq)]
pub struct AcUnit {
    pub pos: Vec3,
    pub led_pos: Vec3,
    pub led_radius: f32,
    pub power: bool,
    /// Cover hinge angle in degrees
    pub cover_angle: f32,
    pub desired_temp: f32,
    pub measured_temp: f32,
}

impl Default for AcUnit {
    fn default() -> Self {
        let pos = Vec3::new(-0.2, 1.0, -3.0);
        AcUnit {
            pos,
            led_pos: pos + Vec3::new(0.38, -0.075, 0.13),
            led_radius: 0.04,
            power: false,
            cover_angle: 0.0,
            desired_temp: 24.0,
            measured_temp: 30.5,
        }
    }
}

/// What the third panel screen shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusIcon {
    Check,
    Fire,
    Snow,
}

impl StatusIcon {
    pub fn label(self) -> &'static str {
        match self {
            StatusIcon::Check => "ok",
            StatusIcon::Fire => "heating",
            StatusIcon::Snow => "cooling",
        }
    }
}

impl AcUnit {
    pub fn status_icon(&self) -> StatusIcon {
        let diff = self.desired_temp - self.measured_temp;
        if diff.abs() < 0.5 {
            StatusIcon::Check
        } else if diff > 0.0 {
            StatusIcon::Fire
        } else {
            StatusIcon::Snow
        }
    }
}

/// The catch basin standing under the AC
#[derive(Clone, Debug, PartialEq)]
pub struct Basin {
    pub origin: Vec3,
    pub pos: Vec3,
    pub state: BasinState,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub height: f32,
    /// Water level in 0..=1
    pub level: f32,
    pub full: bool,
}

impl Default for Basin {
    fn default() -> Self {
        let origin = Vec3::new(-0.22, -1.0, -3.0);
        Basin {
            origin,
            pos: origin,
            state: BasinState::OnFloor,
            inner_radius: 0.26,
            outer_radius: 0.30,
            height: 0.15,
            level: 0.0,
            full: false,
        }
    }
}

impl Basin {
    /// Height of the water surface, or of the basin floor when empty
    pub fn water_surface(&self) -> f32 {
        self.pos.y - self.height * 0.5 + self.height * self.level
    }
}

/// Previous-frame input levels for edge detection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputLatches {
    pub lmb: bool,
    pub space: bool,
    pub look_led: bool,
}

impl InputLatches {
    /// Records `now` into `prev` and reports whether it just went high
    pub fn rising(prev: &mut bool, now: bool) -> bool {
        let edge = now && !*prev;
        *prev = now;
        edge
    }
}

/// Everything the simulation owns
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimState {
    pub ac: AcUnit,
    pub basin: Basin,
    pub drops: Vec<Droplet>,
    pub spawn_acc: f32,
    pub latches: InputLatches,
}

/// Renderer switches toggled from the keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderFlags {
    pub depth_test: bool,
    pub cull_faces: bool,
    pub textures: bool,
    pub transparency: bool,
    /// Debug overlay
    pub debug: bool,
}

impl Default for RenderFlags {
    fn default() -> Self {
        RenderFlags {
            depth_test: true,
            cull_faces: true,
            textures: true,
            transparency: true,
            debug: false,
        }
    }
}
