use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::BlogError;

pub const DEFAULT_API_URL: &str = "https://blog-backend-3jm8.onrender.com";
pub const API_URL_ENV: &str = "BLOGTERM_API_URL";
const APP_DIR: &str = "blogterm";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub excerpt_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            excerpt_chars: 100,
        }
    }
}

/// `~/.config/blogterm`, or the platform equivalent.
pub fn app_dir() -> Result<PathBuf, BlogError> {
    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .ok_or_else(|| BlogError::Config("Could not find home directory".to_string()))?;
    Ok(base.join(APP_DIR))
}

/// Where the log file goes; falls back to the config directory.
pub fn cache_dir() -> Result<PathBuf, BlogError> {
    match dirs::cache_dir() {
        Some(dir) => Ok(dir.join(APP_DIR)),
        None => app_dir(),
    }
}

impl Config {
    pub fn load() -> Result<Self, BlogError> {
        let path = app_dir()?.join("config.json");
        Ok(Self::load_from(&path)?.with_env())
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, BlogError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("no config at {:?}, using defaults", path);
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to open config file at {:?}", path))
                    .into())
            }
        };

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context("Failed to parse config JSON")?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), BlogError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {:?}", dir))?;
        }

        let json = serde_json::to_string_pretty(&self)
            .context("Failed to serialize config to JSON")?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open config file for writing at {:?}", path))?;

        file.write_all(json.as_bytes())
            .context("Failed to write config data")?;

        Ok(())
    }

    pub fn with_env(self) -> Self {
        match env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => self.with_api_url(url),
            _ => self,
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_url":"http://localhost:5000"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.excerpt_chars, 100);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config::default().with_api_url("http://example.test/");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_url, "http://example.test");
    }

    #[test]
    fn broken_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(Config::load_from(&path), Err(BlogError::Config(_))));
    }
}
