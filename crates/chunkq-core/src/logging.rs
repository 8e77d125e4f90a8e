//! Tracing setup: append to `$XDG_STATE_HOME/chunkq/chunkq.log`, or stderr.
//!
//! `RUST_LOG` overrides the default filter. Per-chunk scheduler events are
//! logged at debug unless `verbose` is set, so the default keeps chunkq's own
//! crates at debug.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,chunkq_core=debug,chunkq=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Location of the run log; the state directory is created if missing.
pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("chunkq")?;
    Ok(xdg_dirs.place_state_file("chunkq.log")?)
}

fn open_log(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Install the global subscriber writing to the state-dir log file.
/// Returns Err when the file cannot be opened so the caller can use stderr.
pub fn init_logging() -> Result<()> {
    init_logging_at(&log_path()?)
}

pub fn init_logging_at(path: &Path) -> Result<()> {
    let file = open_log(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {}", e))?;

    tracing::info!(path = %path.display(), "chunkq logging initialized");
    Ok(())
}

/// Stderr-only subscriber. A subscriber already installed is left in place.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
