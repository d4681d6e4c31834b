//! Global input hook feeding the recorder and the hotkey dispatcher.
//!
//! Mouse buttons, wheel and keys are captured on a dedicated thread through
//! `rdev` and forwarded over a bounded channel, so the OS callback never blocks
//! on session work.

use crate::{PlatformError, PlatformResult};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use mousemacro_core::MouseButtonRaw;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

mod rdev_impl;

/// How long `start_input_hook` waits for the listener to report a startup failure.
const STARTUP_GRACE: Duration = Duration::from_millis(300);

/// Events we capture. Positions are absolute screen coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Mouse button pressed.
    ButtonPress { x: i32, y: i32, button: MouseButtonRaw },
    /// Mouse button released.
    ButtonRelease { x: i32, y: i32, button: MouseButtonRaw },
    /// Mouse wheel scrolled, in wheel lines. Positive `delta_y` is up, positive `delta_x` is right.
    Scroll { x: i32, y: i32, delta_x: i32, delta_y: i32 },
    /// Key pressed (name as produced by the hook, e.g. `x`, `Ctrl`, `Esc`).
    KeyDown { key: String },
    /// Key released.
    KeyUp { key: String },
}

/// Cloneable stop signal for the hook.
#[derive(Debug, Clone)]
pub struct HookStopper(Arc<AtomicBool>);

impl HookStopper {
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Handle to the input hook.
pub struct InputHookHandle {
    event_rx: Receiver<InputEvent>,
    running: Arc<AtomicBool>,
}

impl InputHookHandle {
    /// Receive the next event, waiting at most `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }

    /// Signal the hook to stop forwarding events.
    pub fn stop(&self) {
        self.stopper().stop();
    }

    pub fn stopper(&self) -> HookStopper {
        HookStopper(self.running.clone())
    }
}

impl Drop for InputHookHandle {
    fn drop(&mut self) {
        // The listener thread blocks inside the OS hook and is not joined;
        // it stops forwarding and is torn down with the process.
        self.stop();
    }
}

/// Start capturing global input events.
///
/// Fails if the OS refuses the hook (missing permission, no display server).
pub fn start_input_hook() -> PlatformResult<InputHookHandle> {
    let (event_tx, event_rx) = bounded(1024);
    let (error_tx, error_rx) = bounded::<String>(1);
    let running = Arc::new(AtomicBool::new(true));
    let hook_running = running.clone();

    thread::Builder::new()
        .name("input-hook".into())
        .spawn(move || rdev_impl::start_hook(event_tx, hook_running, error_tx))
        .map_err(|e| PlatformError::HookFailed(format!("failed to spawn hook thread: {e}")))?;

    match error_rx.recv_timeout(STARTUP_GRACE) {
        Ok(message) => Err(PlatformError::HookFailed(message)),
        Err(RecvTimeoutError::Disconnected) => Err(PlatformError::HookFailed(
            "input listener exited during startup".into(),
        )),
        // Still listening after the grace period.
        Err(RecvTimeoutError::Timeout) => Ok(InputHookHandle { event_rx, running }),
    }
}
