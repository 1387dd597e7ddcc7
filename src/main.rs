//! Head pitch amplitude tracker: logs the nod amplitude of a tracked face.

use anyhow::{Context, Result};
use clap::Parser;
use head_pose_amplitude::{
    app::AmplitudeApp,
    config::{Config, EXAMPLE_CONFIG},
};
use log::{info, warn};
use std::{path::PathBuf, sync::atomic::Ordering, time::Duration};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Number of pitch samples in the window
    #[arg(short = 'k', long)]
    capacity: Option<usize>,

    /// Milliseconds between amplitude evaluations
    #[arg(short, long)]
    tick_ms: Option<u64>,

    /// Measurement source (synthetic, replay)
    #[arg(short, long)]
    source: Option<String>,

    /// Recorded detections to replay (implies --source replay)
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Frames per second delivered by the source
    #[arg(long)]
    fps: Option<f64>,

    /// Deliver frames as fast as possible instead of in real time
    #[arg(long)]
    unpaced: bool,

    /// Seed for the synthetic source
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Stop after this many seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(capacity) = self.capacity {
            config.window.capacity = capacity;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.evaluator.tick_period_ms = tick_ms;
        }
        if let Some(source) = &self.source {
            config.source.kind = source.clone();
        }
        if let Some(path) = &self.replay {
            config.source.kind = "replay".to_string();
            config.source.replay_path = Some(path.clone());
        }
        if let Some(fps) = self.fps {
            config.source.fps = fps;
        }
        if self.unpaced {
            config.source.paced = false;
        }
        if self.seed.is_some() {
            config.source.seed = self.seed;
        }
        if self.max_frames.is_some() {
            config.source.max_frames = self.max_frames;
        }
    }
}

/// Convert `--duration` seconds into a run limit
fn run_duration(seconds: Option<f64>) -> Result<Option<Duration>> {
    let Some(secs) = seconds else {
        return Ok(None);
    };
    if !secs.is_finite() || secs <= 0.0 {
        anyhow::bail!("Duration must be a positive number of seconds, got {secs}");
    }
    match Duration::try_from_secs_f64(secs) {
        Ok(limit) => Ok(Some(limit)),
        Err(e) => anyhow::bail!("Duration of {secs} seconds is out of range: {e}"),
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Head Pose Amplitude");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    args.apply(&mut config);

    let run_for = run_duration(args.duration)?;

    // Create and run application
    let app = AmplitudeApp::new(config, run_for)?;
    let shutdown = app.shutdown_flag();
    ctrlc::set_handler(move || shutdown.store(true, Ordering::Release)).context("Failed to install Ctrl-C handler")?;

    let stats = app.run()?;
    info!(
        "Processed {} of {} frames ({} dropped), {} pitch samples, {} rejected, {} ticks",
        stats.frames_processed,
        stats.frames_captured,
        stats.frames_dropped,
        stats.samples_accepted,
        stats.samples_rejected,
        stats.ticks
    );

    Ok(())
}
