//! User configuration (YAML) for pacing, hotkeys and display fallback.

use crate::{PlaybackTiming, VirtualDisplayRect};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "MOUSEMACRO_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroConfig {
    pub playback: PlaybackConfig,
    pub hotkeys: HotkeyConfig,
    pub display: DisplayConfig,
}

/// Replay pacing in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub min_delay_ms: u64,
    pub settle_after_move_ms: u64,
    pub settle_after_scroll_ms: u64,
    pub loop_pause_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        let timing = PlaybackTiming::default();
        Self {
            min_delay_ms: timing.min_delay.as_millis() as u64,
            settle_after_move_ms: timing.settle_after_move.as_millis() as u64,
            settle_after_scroll_ms: timing.settle_after_scroll.as_millis() as u64,
            loop_pause_ms: timing.loop_pause.as_millis() as u64,
        }
    }
}

impl PlaybackConfig {
    pub fn timing(&self) -> PlaybackTiming {
        PlaybackTiming {
            min_delay: Duration::from_millis(self.min_delay_ms),
            settle_after_move: Duration::from_millis(self.settle_after_move_ms),
            settle_after_scroll: Duration::from_millis(self.settle_after_scroll_ms),
            loop_pause: Duration::from_millis(self.loop_pause_ms),
        }
    }
}

/// Hotkey chords, e.g. `ctrl+x` or `esc`. Each action accepts several chords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    pub toggle_recording: Vec<String>,
    pub toggle_playback: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            toggle_recording: vec!["ctrl+x".into()],
            // ctrl+z is a spare for setups where alt+z is taken.
            toggle_playback: vec!["alt+z".into(), "ctrl+z".into()],
            quit: vec!["esc".into()],
        }
    }
}

/// Size used when the OS cannot report any display geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub fallback_width: i32,
    pub fallback_height: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let rect = VirtualDisplayRect::default();
        Self {
            fallback_width: rect.width,
            fallback_height: rect.height,
        }
    }
}

impl DisplayConfig {
    pub fn fallback_rect(&self) -> VirtualDisplayRect {
        VirtualDisplayRect::new(0, 0, self.fallback_width, self.fallback_height)
    }
}

/// Location of the config file: `$MOUSEMACRO_CONFIG`, else `<config dir>/mousemacro/config.yaml`.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    let base = dirs_next::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("mousemacro").join("config.yaml")
}

/// Parse a config file.
pub fn load_from_path(path: impl AsRef<Path>) -> ConfigResult<MacroConfig> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse config from a YAML string. An empty document yields defaults.
pub fn parse_config(content: &str) -> ConfigResult<MacroConfig> {
    if content.trim().is_empty() {
        return Ok(MacroConfig::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Load the user config, falling back to defaults when missing or invalid.
pub fn load_config() -> MacroConfig {
    let path = config_path();

    if !path.exists() {
        debug!(?path, "No config file found, using defaults");
        return MacroConfig::default();
    }

    match load_from_path(&path) {
        Ok(config) => {
            info!(?path, "Loaded config");
            config
        }
        Err(e) => {
            warn!(?path, error = %e, "Failed to load config, using defaults");
            MacroConfig::default()
        }
    }
}
