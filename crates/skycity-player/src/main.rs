//! SkyCity - headless scene player
//!
//! Runs the scripted show (camera choreography, flyover, missile, lanterns,
//! flag) against an in-memory renderer and logs a summary once per second.
//!
//! Usage:
//!   skycity [--config <scene.toml>] [--duration <s>] [--fps <n>] [--seed <n>] [--realtime]

use anyhow::{Context, Result};
use clap::Parser;
use skycity_player::{HeadlessRenderer, Orchestrator, SceneConfig};
use skycity_runtime::FrameClock;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "skycity")]
#[command(about = "SkyCity scene player - run the scripted show headless")]
struct Args {
    /// Scene configuration file (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds of scene time to simulate
    #[arg(long, default_value_t = 45.0)]
    duration: f64,

    /// Fixed simulation rate in frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Override the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Pace frames with the wall clock instead of stepping as fast as possible
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().context("Invalid scene configuration")?;

    let mut renderer = HeadlessRenderer::for_scene(&config);
    let mut scene = Orchestrator::new(config).context("Failed to build scene")?;

    let step = 1.0 / f64::from(args.fps.max(1));
    let mut clock = FrameClock::new();
    let mut next_report = 0.0;

    loop {
        let time = if args.realtime {
            std::thread::sleep(Duration::from_secs_f64(step));
            clock.tick()
        } else {
            clock.advance(step)
        };
        scene.frame(time, &mut renderer);

        if time.total >= next_report {
            log::info!("{}", scene.summary());
            next_report += 1.0;
        }
        if time.total >= args.duration {
            break;
        }
    }

    let tally = scene.event_tally();
    log::info!(
        "[scene] done: {} frames, {} meshes, {} particle draws ({} last frame), {} impacts, {} lanterns launched",
        scene.frames(),
        renderer.mesh_count(),
        renderer.frames_drawn(),
        renderer.particle_count(),
        tally.missile_impacts,
        tally.lanterns_launched
    );
    if let Some(camera) = renderer.camera() {
        log::debug!("[scene] final view matrix {:?}", camera.view);
    }
    let missing: Vec<_> = scene.bridge().missing_meshes().collect();
    if !missing.is_empty() {
        log::warn!("[scene] meshes never found: {}", missing.join(", "));
    }
    Ok(())
}
