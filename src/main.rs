mod assets;
mod camera;
mod config;
mod error;
mod graphics;
mod input;
mod math;
mod mesh;
mod renderer;
mod sim;
mod state;
mod terminal;
mod vertex;
mod view;

use crate::assets::SceneTextures;
use crate::camera::CameraController;
use crate::config::{Args, Profile};
use crate::error::StartupError;
use crate::input::InputCollector;
use crate::renderer::Renderer;
use crate::state::SimState;
use crate::view::SceneView;
use anyhow::Context;
use clap::Parser;
use crossterm::{
    event, execute,
    terminal::{Clear, ClearType},
};
use log::{error, info};
use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::{Duration, Instant};

/// Longest step the simulation takes, so a stall does not teleport droplets
const MAX_DT: f32 = 0.05;

fn init_logger(args: &Args) -> Result<(), StartupError> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = &args.log_file {
        let file = File::create(path).map_err(|source| StartupError::LogFile {
            path: path.clone(),
            source,
        })?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init()?;
    Ok(())
}

fn terminal_size() -> Result<(u16, u16), StartupError> {
    if let Some(size) = termsize::get() {
        if size.cols > 0 && size.rows > 0 {
            return Ok((size.cols, size.rows));
        }
    }
    crossterm::terminal::size().map_err(|_| StartupError::TerminalSize)
}

/// Main function
fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("{}: {}", env!("CARGO_PKG_NAME"), err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(args: &Args) -> Result<(), StartupError> {
    init_logger(args)?;
    let profile = Profile::for_kind(args.profile);
    info!("starting with the {} profile", profile.name());

    let (cols, rows) = terminal_size()?;
    // Loaded before the screen switch so warnings are not drawn over
    let textures = SceneTextures::load(&args.assets);
    let mut view = SceneView::new(Renderer::new(textures), cols, rows, args.debug);

    let mut out = io::stdout();
    if let Err(err) = terminal::enter_screen(&mut out) {
        let _ = terminal::cleanup(&mut out, false);
        return Err(StartupError::Screen(err));
    }
    let exact_release = match terminal::enable_input(&mut out) {
        Ok(exact) => exact,
        Err(err) => {
            let _ = terminal::cleanup(&mut out, false);
            return Err(StartupError::Input(err));
        }
    };
    info!("key releases reported: {}", exact_release);

    let result = run_loop(&mut out, &mut view, &profile, exact_release, args.fps);
    let restored = terminal::cleanup(&mut out, exact_release);

    result.map_err(StartupError::Runtime)?;
    restored.map_err(|err| StartupError::Runtime(err.into()))
}

fn run_loop<W: Write>(
    out: &mut W,
    view: &mut SceneView,
    profile: &Profile,
    exact_release: bool,
    fps: u32,
) -> anyhow::Result<()> {
    let frame_budget = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
    let mut input = InputCollector::new(exact_release);
    let mut state = SimState::default();
    let mut camera = CameraController::default();
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::ZERO).context("failed to poll events")? {
            let ev = event::read().context("failed to read event")?;
            input.handle(&ev, Instant::now());
        }

        let now = Instant::now();
        let frame = input.frame(now);
        if frame.quit {
            info!("quit requested");
            return Ok(());
        }
        let dt = now.duration_since(last).as_secs_f32().min(MAX_DT);
        last = now;

        if frame.resized.is_some() {
            execute!(out, Clear(ClearType::All)).context("failed to clear screen")?;
        }
        view.handle_input(&frame);
        sim::update(&mut state, &mut camera, &frame, dt, profile);
        view.paint(&state, &camera, profile, now);
        view.present(out).context("failed to draw frame")?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
    }
}
