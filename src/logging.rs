//! File logging. The terminal is owned by the editor, so all tracing output
//! goes to `<config_dir>/batchpad/batchpad.log`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::ConfigEngine;

/// Environment variable holding the log filter, e.g. `BATCHPAD_LOG=debug`
pub const LOG_ENV: &str = "BATCHPAD_LOG";

pub fn log_file() -> Option<PathBuf> {
    ConfigEngine::config_dir().map(|dir| dir.join("batchpad.log"))
}

/// Install the global subscriber. Logging is best effort: when the log file
/// cannot be opened the editor runs without it.
pub fn init() -> Option<PathBuf> {
    let path = log_file()?;
    match init_at(&path) {
        Ok(()) => Some(path),
        Err(_) => None,
    }
}

fn init_at(path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    // Already installed (tests) is fine
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();
    Ok(())
}
