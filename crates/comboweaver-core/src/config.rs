use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    playback::{POLL_INTERVAL, PlaybackConfig, REWIND_SECONDS},
    reorder::LONG_PRESS_DELAY,
};

pub const CONFIG_FILE_NAME: &str = "comboweaver.config.toml";
pub const CONFIG_PATH_ENV: &str = "COMBOWEAVER_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub playback: PlaybackSection,
    pub reorder: ReorderSection,
    pub paths: PathsConfig,
    pub diagnostics: DiagnosticsConfig,
    pub share: ShareConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSection {
    pub rewind_seconds: f64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderSection {
    pub long_press_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub catalog_dir: PathBuf,
    pub favorites_file: PathBuf,
    pub session_file: PathBuf,
    pub logs_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub rust_log_filter: String,
    pub trace_file_prefix: String,
    /// Mirror events to stderr in addition to the JSON trace file.
    pub console: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub base_url: String,
}

impl Default for PlaybackSection {
    fn default() -> Self {
        Self {
            rewind_seconds: REWIND_SECONDS,
            poll_interval_ms: u64::try_from(POLL_INTERVAL.as_millis()).unwrap_or(100),
        }
    }
}

impl Default for ReorderSection {
    fn default() -> Self {
        Self {
            long_press_ms: u64::try_from(LONG_PRESS_DELAY.as_millis()).unwrap_or(300),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("data/catalogs"),
            favorites_file: PathBuf::from("data/favorites.json"),
            session_file: PathBuf::from("data/session.json"),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            rust_log_filter: crate::diagnostics::DEFAULT_FILTER.to_string(),
            trace_file_prefix: "comboweaver".to_string(),
            console: true,
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "https://comboweaver.example/".to_string(),
        }
    }
}

impl PlaybackSection {
    #[must_use]
    pub fn to_playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            rewind_seconds: if self.rewind_seconds > 0.0 {
                self.rewind_seconds
            } else {
                REWIND_SECONDS
            },
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(10)),
        }
    }
}

impl ReorderSection {
    #[must_use]
    pub fn long_press_delay(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

impl AppConfig {
    /// Loads the discovered config file, or defaults when none exists.
    pub fn load() -> Result<Self> {
        match discover_config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config TOML from {}", path.display()))?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

fn discover_config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
    }

    let cwd = env::current_dir().ok()?;
    [cwd.join(CONFIG_FILE_NAME), cwd.join("..").join(CONFIG_FILE_NAME)]
        .into_iter()
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str("[playback]\nrewind_seconds = 3.0\n")
            .expect("partial config should parse");
        assert_eq!(config.playback.rewind_seconds, 3.0);
        assert_eq!(config.playback.poll_interval_ms, 100);
        assert_eq!(config.reorder.long_press_ms, 300);
        assert_eq!(
            config.playback.to_playback_config().poll_interval,
            Duration::from_millis(100)
        );
    }
}
