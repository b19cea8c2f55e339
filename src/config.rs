use clap::{Parser, ValueEnum};
use glam::Vec3;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Tuning profile for the simulation
    #[arg(long, value_enum, default_value_t = ProfileKind::Classic)]
    pub profile: ProfileKind,

    /// Directory holding wall.png and floor.png
    #[arg(long, default_value = "res")]
    pub assets: PathBuf,

    /// Frame rate cap
    #[arg(long, default_value_t = 75)]
    pub fps: u32,

    /// Write log output to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Show the debug overlay on start
    #[arg(long)]
    pub debug: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProfileKind {
    /// Slow drip, early full cutoff, click-to-toggle LED
    Classic,
    /// Fast drip, fills to the brim, gaze-to-toggle LED
    Rapid,
}

/// How the desired temperature reacts to the up/down keys
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TempInput {
    /// Adjust by `step` every tick while the key is held
    Held { step: f32 },
    /// Adjust by `step` once per key press
    PerPress { step: f32 },
}

/// What switches the AC when the player looks at the LED
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedTrigger {
    /// Left click while the gaze ray hits the LED
    Click,
    /// The gaze ray starting to hit the LED
    Gaze,
}

/// Named tuning constants for one flavour of the simulation
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub kind: ProfileKind,
    pub gravity: f32,
    pub fill_per_drop: f32,
    pub fill_threshold: f32,
    pub spawn_interval: f32,
    /// Cover angle in degrees when powered; the sign follows the hinge side
    pub cover_open_angle: f32,
    pub cover_smoothing: f32,
    pub facing_threshold: f32,
    pub temp_min: f32,
    pub temp_max: f32,
    pub temp_input: TempInput,
    pub temp_rate: f32,
    pub temp_epsilon: f32,
    pub normalize_ray: bool,
    pub clear_drops_on_empty: bool,
    pub led_trigger: LedTrigger,
    pub nozzle_offset: Vec3,
    pub drop_velocity: Vec3,
    /// Droplets below this height are discarded
    pub kill_altitude: f32,
    pub basin_pick_radius: f32,
    /// Per-tick blend toward the basin's carry or rest position
    pub basin_follow: f32,
    pub move_speed: f32,
}

impl Profile {
    pub fn classic() -> Self {
        Profile {
            kind: ProfileKind::Classic,
            gravity: 0.25,
            fill_per_drop: 0.02,
            fill_threshold: 0.81,
            spawn_interval: 0.42,
            cover_open_angle: 45.0,
            cover_smoothing: 0.001,
            facing_threshold: 0.80,
            temp_min: -10.0,
            temp_max: 40.0,
            temp_input: TempInput::Held { step: 0.05 },
            temp_rate: 0.9,
            temp_epsilon: 0.05,
            normalize_ray: true,
            clear_drops_on_empty: false,
            led_trigger: LedTrigger::Click,
            nozzle_offset: Vec3::new(0.0, -0.15, 0.09),
            drop_velocity: Vec3::new(0.0, -0.05, 0.0),
            kill_altitude: -5.0,
            basin_pick_radius: 0.45,
            basin_follow: 0.1,
            move_speed: 2.0,
        }
    }

    pub fn rapid() -> Self {
        Profile {
            kind: ProfileKind::Rapid,
            gravity: 0.85,
            fill_threshold: 1.0,
            spawn_interval: 0.05,
            cover_open_angle: -60.0,
            facing_threshold: 0.90,
            temp_min: 16.0,
            temp_max: 40.0,
            temp_input: TempInput::PerPress { step: 1.0 },
            temp_rate: 0.4,
            normalize_ray: false,
            clear_drops_on_empty: true,
            led_trigger: LedTrigger::Gaze,
            // Just in front of the body, above the basin
            nozzle_offset: Vec3::new(0.0, -0.065, 0.132),
            ..Profile::classic()
        }
    }

    pub fn for_kind(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Classic => Profile::classic(),
            ProfileKind::Rapid => Profile::rapid(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            ProfileKind::Classic => "classic",
            ProfileKind::Rapid => "rapid",
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile::classic()
    }
}
