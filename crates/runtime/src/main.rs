#![deny(clippy::all, clippy::pedantic)]
//! # Spring-bone runtime
//!
//! Headless driver for the spring solver. Builds the demo rig, steps it at a
//! fixed frame delta and logs progress. Optionally hot-reloads its JSON config
//! and dumps the final pose buffer as raw bytes.

mod config;
mod scene;
mod watcher;

use anyhow::{Context, Result};
use clap::Parser;
use springbone::SpringSim;
use std::path::PathBuf;
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

use config::RuntimeConfig;
use scene::DemoScene;

const REPORT_EVERY: u32 = 100;

#[derive(Parser, Debug)]
#[command(about = "Run the spring-bone demo rig headless")]
struct Args {
    /// JSON config; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Write the final pose records to this file
    #[arg(long)]
    dump: Option<PathBuf>,
    /// Reload the config file whenever it changes
    #[arg(long, requires = "config")]
    watch: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    let (tx, rx) = mpsc::channel();
    let _config_watcher = match (&args.config, args.watch) {
        (Some(path), true) => match watcher::start(path, tx) {
            Ok(watcher_instance) => {
                tracing::info!("Config watcher started successfully.");
                Some(watcher_instance)
            }
            Err(e) => {
                tracing::error!("Failed to start config watcher: {e:?}");
                None
            }
        },
        _ => None,
    };

    tracing::info!("Initializing spring simulation...");
    let mut sim = SpringSim::new();
    let scene = DemoScene::build(&mut sim, &config)?;

    tracing::info!(
        "Starting spring loop for {} frames with dt = {}...",
        args.frames,
        args.dt
    );
    for frame in 0..args.frames {
        while let Ok(update) = rx.try_recv() {
            if let Err(e) = scene.apply(&mut sim, &update) {
                tracing::error!("Rejected config update: {e:#}");
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let time = frame as f32 * args.dt;
        sim.advance(&scene.rig_at(time), args.dt)
            .with_context(|| format!("frame {frame}"))?;

        if (frame + 1) % REPORT_EVERY == 0 {
            tracing::info!(
                "Frame {} complete. Hair tip: {:?}, tail tip: {:?}",
                frame + 1,
                scene.hair_tip(&sim, 0),
                scene.tail_tip(&sim)
            );
        }
    }

    tracing::info!(
        "Spring loop finished after {} frames, {} joint poses.",
        args.frames,
        sim.poses().len()
    );

    if let Some(path) = &args.dump {
        let records = sim.pose_records();
        std::fs::write(path, bytemuck::cast_slice::<_, u8>(records.as_slice()))
            .with_context(|| format!("writing pose dump {}", path.display()))?;
        tracing::info!("Wrote {} pose records to {}", records.len(), path.display());
    }

    Ok(())
}
