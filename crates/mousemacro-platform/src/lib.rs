//! mousemacro-platform: platform-specific I/O boundary for mousemacro.
//!
//! This crate provides:
//! - Virtual display geometry (all monitors) and DPI awareness
//! - Global input hook for recording and hotkeys via `rdev`
//! - Synthetic pointer output via `enigo`
//!
//! ## Module Structure
//!
//! - `error` - Common error types
//! - `display` - `GeometryProvider` backed by the OS display layout
//! - `injector` - `PointerDriver` backed by enigo
//! - `input_hook` - Global mouse/keyboard event capture

mod display;
mod error;
mod injector;
mod input_hook;

// Re-export error types
pub use error::{PlatformError, PlatformResult};

// Re-export display geometry
pub use display::{set_dpi_aware, SystemDisplay};

// Re-export pointer output
pub use injector::EnigoDriver;

// Re-export input hook
pub use input_hook::{start_input_hook, HookStopper, InputEvent, InputHookHandle};

pub use crossbeam_channel::RecvTimeoutError;
