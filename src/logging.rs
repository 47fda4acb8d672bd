use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::Context;
use env_logger::{Builder, Env, Target};

use crate::error::BlogError;
use crate::models::config::cache_dir;

pub const LOG_ENV: &str = "BLOGTERM_LOG";
const LOG_FILE: &str = "blogterm.log";

/// Send `log` output to a file so it never lands on the terminal UI.
/// Returns the log file path.
pub fn init() -> Result<PathBuf, BlogError> {
    let dir = cache_dir()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {:?}", dir))?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    Builder::from_env(Env::default().filter_or(LOG_ENV, "info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init()
        .map_err(|e| BlogError::Config(e.to_string()))?;

    Ok(path)
}
