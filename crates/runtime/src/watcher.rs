//! # Config hot-reloading
//!
//! Watches the runtime's JSON config and sends a freshly parsed copy down a
//! channel whenever the file is written. The main loop drains the channel
//! between frames, so a reload never lands in the middle of a solve.
//!
//! The watch is placed on the file's parent directory, so saves that rename a
//! temporary file over the config are still seen.

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::{error, info};

use crate::config::RuntimeConfig;

/// Start watching `path`. Dropping the returned watcher stops it.
pub fn start(path: &Path, updates: Sender<RuntimeConfig>) -> Result<RecommendedWatcher> {
    let target = path
        .canonicalize()
        .with_context(|| format!("resolving config path {}", path.display()))?;
    let directory = target
        .parent()
        .map(Path::to_path_buf)
        .context("config file has no parent directory")?;

    info!("Initializing config watcher for {}", target.display());
    let watched = target.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            let changed = event.kind.is_modify() || event.kind.is_create();
            if changed && touches(&event.paths, &watched) {
                reload(&watched, &updates);
            }
        }
        Err(e) => error!("Error watching config file: {e:?}"),
    })?;

    watcher.watch(&directory, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

fn touches(paths: &[PathBuf], target: &Path) -> bool {
    paths.iter().any(|p| {
        p == target || (p.file_name() == target.file_name() && p.parent() == target.parent())
    })
}

fn reload(path: &Path, updates: &Sender<RuntimeConfig>) {
    match RuntimeConfig::load(path) {
        Ok(config) => {
            info!("Config changed: {}. Reloading.", path.display());
            if updates.send(config).is_err() {
                error!("Config receiver is gone, dropping reload");
            }
        }
        // Partially written file; a later event retries.
        Err(e) => error!("Ignoring unreadable config: {e:#}"),
    }
}
