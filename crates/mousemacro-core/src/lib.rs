//! mousemacro-core: recording, normalization and looping playback.
//!
//! Design goal: keep this crate platform-agnostic.
//! Platform specific I/O (display query, hook, inject) lives in `mousemacro-platform`.

mod config;
mod engine;
mod geometry;
mod recorder;
mod session;

pub use config::{
    config_path, load_config, load_from_path, parse_config, ConfigError, ConfigResult,
    DisplayConfig, HotkeyConfig, MacroConfig, PlaybackConfig, CONFIG_ENV_VAR,
};
pub use engine::{
    CancelToken, PlaybackHandle, PlaybackOutcome, PlaybackTiming, Player, PointerDriver,
    LOOP_PAUSE, MIN_DELAY, SETTLE_AFTER_MOVE, SETTLE_AFTER_SCROLL,
};
pub use geometry::{FixedGeometry, GeometryProvider, VirtualDisplayRect};
pub use recorder::{MouseButtonRaw, Recorder, RecorderEvent, RecorderState};
pub use session::SessionController;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// One captured interaction. Positions are ratios of the virtual display rect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RecordedEvent {
    /// Single click (press and release) of `button`.
    Click {
        /// Seconds since the previous event; 0 for the first one.
        delay_seconds: f64,
        x_ratio: f64,
        y_ratio: f64,
        button: MouseButton,
    },
    /// Wheel step. Positive `dy` is up, as reported by the OS.
    Scroll {
        delay_seconds: f64,
        x_ratio: f64,
        y_ratio: f64,
        dx: i32,
        dy: i32,
    },
}

impl RecordedEvent {
    pub fn delay_seconds(&self) -> f64 {
        match self {
            Self::Click { delay_seconds, .. } | Self::Scroll { delay_seconds, .. } => {
                *delay_seconds
            }
        }
    }

    pub fn ratio(&self) -> (f64, f64) {
        match self {
            Self::Click { x_ratio, y_ratio, .. } | Self::Scroll { x_ratio, y_ratio, .. } => {
                (*x_ratio, *y_ratio)
            }
        }
    }
}
