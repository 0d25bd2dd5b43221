use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::clip::DEFAULT_PLAY_ODDS;

/// Application config, read from `random-sfx.toml` in the working directory.
/// Every section is optional.  This is separate from the per-clip settings
/// file, which `ConfigStore` owns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory scanned for clips (not recursive).
    #[serde(default = "default_sfx_dir")]
    pub sfx_dir: PathBuf,
    /// Per-clip `name|odds|volume` settings file.
    #[serde(default = "default_settings_file")]
    pub settings_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_play_odds")]
    pub default_play_odds: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Explicit mpv binary.  When unset the binary is looked up beside the
    /// executable and then on PATH.
    #[serde(default)]
    pub mpv_binary: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sfx_dir: default_sfx_dir(),
            settings_file: default_settings_file(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            default_play_odds: default_play_odds(),
        }
    }
}

fn default_sfx_dir() -> PathBuf {
    PathBuf::from("sfx")
}

fn default_settings_file() -> PathBuf {
    PathBuf::from("sfxConfig.txt")
}

fn default_tick_interval_ms() -> u64 {
    250
}

fn default_play_odds() -> u32 {
    DEFAULT_PLAY_ODDS
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Config {
    pub const FILE_NAME: &'static str = "random-sfx.toml";

    /// Load from `path`, or defaults if it does not exist.  Never writes:
    /// startup must not touch the filesystem before preconditions pass.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from(Self::FILE_NAME)
    }
}
