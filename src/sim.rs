//! Per-frame simulation: AC power, cover, temperature, droplets and the basin.

use crate::camera::CameraController;
use crate::config::{LedTrigger, Profile, TempInput};
use crate::input::FrameInput;
use crate::math::{facing_dot, mix, ray_sphere_hit, smoothing_factor};
use crate::state::{AcUnit, Basin, BasinState, Droplet, InputLatches, SimState};
use glam::Vec3;
use log::{debug, info};

/// Keyboard look speed in pointer pixels per second
const LOOK_KEY_SPEED: f32 = 600.0;

/// Slack for float accumulation when comparing the water level to its threshold
const FILL_EPSILON: f32 = 1e-4;

/// Advances the whole simulation by `dt` seconds.
pub fn update(
    state: &mut SimState,
    camera: &mut CameraController,
    input: &FrameInput,
    dt: f32,
    profile: &Profile,
) {
    steer_camera(camera, input, dt, profile);
    adjust_desired_temp(state, input, profile);
    handle_pointer(state, camera, input, profile);
    handle_space(state, camera, input.space, profile);

    animate_cover(state, dt, profile);
    converge_temperature(state, dt, profile);
    spawn_droplets(state, dt, profile);
    step_droplets(state, dt, profile);
    move_basin(state, camera, profile);
}

fn steer_camera(camera: &mut CameraController, input: &FrameInput, dt: f32, profile: &Profile) {
    let look = input.look_delta + input.look_axis * LOOK_KEY_SPEED * dt;
    if look != glam::Vec2::ZERO {
        camera.look(look.x, look.y);
    }
    if input.scroll != 0.0 {
        camera.scroll(input.scroll);
    }
    let step = input.move_axis * profile.move_speed * dt;
    if step != glam::Vec2::ZERO {
        camera.move_planar(step.x, step.y);
    }
}

fn adjust_desired_temp(state: &mut SimState, input: &FrameInput, profile: &Profile) {
    let delta = match profile.temp_input {
        TempInput::Held { step } => {
            let mut d = 0.0;
            if input.temp_up_held {
                d += step;
            }
            if input.temp_down_held {
                d -= step;
            }
            d
        }
        TempInput::PerPress { step } => {
            (input.temp_up_presses as f32 - input.temp_down_presses as f32) * step
        }
    };
    if delta != 0.0 {
        let ac = &mut state.ac;
        ac.desired_temp = (ac.desired_temp + delta).clamp(profile.temp_min, profile.temp_max);
    }
}

/// Gaze ray from the camera, normalized or not depending on the profile
pub fn gaze_dir(camera: &CameraController, profile: &Profile) -> Vec3 {
    if profile.normalize_ray {
        camera.front.normalize_or_zero()
    } else {
        camera.front
    }
}

/// Whether the centre of view currently rests on the LED
pub fn looking_at_led(state: &SimState, camera: &CameraController, profile: &Profile) -> bool {
    let dir = gaze_dir(camera, profile);
    ray_sphere_hit(camera.pos, dir, state.ac.led_pos, state.ac.led_radius).is_some()
}

fn handle_pointer(
    state: &mut SimState,
    camera: &CameraController,
    input: &FrameInput,
    profile: &Profile,
) {
    let dir = gaze_dir(camera, profile);
    let look_led = looking_at_led(state, camera, profile);
    let gaze_edge = InputLatches::rising(&mut state.latches.look_led, look_led);
    let click = InputLatches::rising(&mut state.latches.lmb, input.lmb);

    let led_pressed = match profile.led_trigger {
        LedTrigger::Gaze => gaze_edge,
        LedTrigger::Click => click && look_led,
    };
    if led_pressed {
        press_led(state);
    }

    if click {
        let basin = &state.basin;
        let can_lift = basin.full && !state.ac.power && basin.state == BasinState::OnFloor;
        if can_lift
            && ray_sphere_hit(camera.pos, dir, basin.pos, profile.basin_pick_radius).is_some()
        {
            state.basin.state = BasinState::InFrontFull;
            info!("basin picked up");
        }
    }
}

/// Toggles power, or forces it off while the basin is full.
pub fn press_led(state: &mut SimState) {
    if state.basin.full {
        state.ac.power = false;
        info!("basin is full, AC stays off");
    } else {
        state.ac.power = !state.ac.power;
        info!("AC switched {}", if state.ac.power { "on" } else { "off" });
    }
}

fn handle_space(state: &mut SimState, camera: &CameraController, space: bool, profile: &Profile) {
    if !InputLatches::rising(&mut state.latches.space, space) {
        return;
    }
    let dot = facing_dot(camera.pos, camera.front, state.ac.pos);
    match state.basin.state {
        BasinState::InFrontFull if dot < -profile.facing_threshold => empty_basin(state, profile),
        BasinState::InFrontEmpty if dot > profile.facing_threshold => {
            state.basin.state = BasinState::OnFloor;
            info!("basin returned");
        }
        other => debug!("space ignored: basin {:?}, facing {:.2}", other, dot),
    }
}

fn empty_basin(state: &mut SimState, profile: &Profile) {
    let basin = &mut state.basin;
    basin.state = BasinState::InFrontEmpty;
    basin.level = 0.0;
    basin.full = false;
    if profile.clear_drops_on_empty {
        state.drops.clear();
    }
    info!("basin emptied");
}

fn animate_cover(state: &mut SimState, dt: f32, profile: &Profile) {
    let target = if state.ac.power {
        profile.cover_open_angle
    } else {
        0.0
    };
    let t = smoothing_factor(profile.cover_smoothing, dt);
    state.ac.cover_angle = mix(state.ac.cover_angle, target, t);
}

/// Moves the measured temperature toward the desired one while powered.
pub fn converge_temperature(state: &mut SimState, dt: f32, profile: &Profile) {
    let ac = &mut state.ac;
    if !ac.power {
        return;
    }
    let diff = ac.desired_temp - ac.measured_temp;
    if diff.abs() > profile.temp_epsilon {
        ac.measured_temp += diff.signum() * profile.temp_rate * dt;
    } else {
        ac.measured_temp = ac.desired_temp;
    }
}

fn spawn_droplets(state: &mut SimState, dt: f32, profile: &Profile) {
    let basin_ready = state.basin.state == BasinState::OnFloor && !state.basin.full;
    if !(state.ac.power && basin_ready) {
        return;
    }
    state.spawn_acc += dt;
    if state.spawn_acc >= profile.spawn_interval {
        state.spawn_acc = 0.0;
        state
            .drops
            .push(Droplet::new(state.ac.pos + profile.nozzle_offset, profile.drop_velocity));
    }
}

/// One explicit Euler step for a single droplet
pub fn integrate(drop: &mut Droplet, gravity: f32, dt: f32) {
    drop.vel.y -= gravity * dt;
    drop.pos += drop.vel * dt;
}

fn step_droplets(state: &mut SimState, dt: f32, profile: &Profile) {
    for drop in state.drops.iter_mut().filter(|d| d.alive) {
        integrate(drop, profile.gravity, dt);

        let basin = &state.basin;
        let dx = drop.pos.x - basin.pos.x;
        let dz = drop.pos.z - basin.pos.z;
        let inside = dx * dx + dz * dz <= basin.inner_radius * basin.inner_radius;
        if inside && drop.pos.y <= basin.water_surface() {
            drop.alive = false;
            absorb_drop(&mut state.basin, &mut state.ac, profile);
        } else if drop.pos.y < profile.kill_altitude {
            drop.alive = false;
        }
    }
    state.drops.retain(|d| d.alive);
}

/// Adds one droplet's worth of water, latching `full` on the threshold.
pub fn absorb_drop(basin: &mut Basin, ac: &mut AcUnit, profile: &Profile) {
    basin.level = (basin.level + profile.fill_per_drop).min(1.0);
    if !basin.full && basin.level >= profile.fill_threshold - FILL_EPSILON {
        basin.full = true;
        ac.power = false;
        info!("basin full at {:.2}, AC forced off", basin.level);
    }
}

fn move_basin(state: &mut SimState, camera: &CameraController, profile: &Profile) {
    let basin = &mut state.basin;
    let target = if basin.state.is_carried() {
        camera.pos + camera.front * 1.5 + Vec3::new(0.0, -0.3, 0.0)
    } else {
        basin.origin
    };
    basin.pos = mix(basin.pos, target, profile.basin_follow);
}
