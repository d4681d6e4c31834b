//! Playback engine: replays a recorded sequence on a dedicated thread until cancelled.

use crate::{GeometryProvider, MouseButton, RecordedEvent};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Floor applied to every recorded delay so replay never floods the target app.
pub const MIN_DELAY: Duration = Duration::from_millis(30);
/// Pause after moving the pointer, before clicking or scrolling.
pub const SETTLE_AFTER_MOVE: Duration = Duration::from_millis(20);
/// Pause after a synthetic scroll.
pub const SETTLE_AFTER_SCROLL: Duration = Duration::from_millis(30);
/// Pause between two full passes over the sequence.
pub const LOOP_PAUSE: Duration = Duration::from_millis(50);

/// Tuning knobs for replay pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTiming {
    pub min_delay: Duration,
    pub settle_after_move: Duration,
    pub settle_after_scroll: Duration,
    pub loop_pause: Duration,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            min_delay: MIN_DELAY,
            settle_after_move: SETTLE_AFTER_MOVE,
            settle_after_scroll: SETTLE_AFTER_SCROLL,
            loop_pause: LOOP_PAUSE,
        }
    }
}

impl PlaybackTiming {
    /// Wait before an event: the recorded delay, never below `min_delay`.
    pub fn event_delay(&self, delay_seconds: f64) -> Duration {
        Duration::try_from_secs_f64(delay_seconds)
            .unwrap_or(Duration::ZERO)
            .max(self.min_delay)
    }
}

/// Cooperative cancellation flag shared between the controller and one playback run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Synthetic pointer output (implemented by mousemacro-platform).
pub trait PointerDriver: Send + Sync {
    fn move_pointer_to(&self, x: i32, y: i32) -> Result<(), String>;
    fn click_button(&self, button: MouseButton) -> Result<(), String>;
    /// Positive `dy` scrolls up, positive `dx` scrolls right.
    fn scroll_by(&self, dx: i32, dy: i32) -> Result<(), String>;
}

/// How a playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Nothing to replay.
    Empty,
    /// Cancelled after this many complete passes.
    Cancelled { passes: u64 },
}

/// Player: replays a sequence against the current display geometry.
pub struct Player {
    driver: Arc<dyn PointerDriver>,
    geometry: Arc<dyn GeometryProvider>,
    timing: PlaybackTiming,
}

impl Player {
    pub fn new(
        driver: Arc<dyn PointerDriver>,
        geometry: Arc<dyn GeometryProvider>,
        timing: PlaybackTiming,
    ) -> Self {
        Self {
            driver,
            geometry,
            timing,
        }
    }

    /// Run the playback loop on a new thread and return a handle to it.
    pub fn spawn(self, sequence: Arc<[RecordedEvent]>, cancel: CancelToken) -> PlaybackHandle {
        let (done_tx, done_rx) = bounded::<()>(0);
        let token = cancel.clone();

        thread::spawn(move || {
            // Dropped on exit, which wakes anyone waiting on the handle.
            let _done: Sender<()> = done_tx;
            self.run(&sequence, &token);
        });

        PlaybackHandle { cancel, done_rx }
    }

    /// Replay `sequence` in order, forever, until `cancel` is signalled.
    ///
    /// Cancellation is checked at the top of each pass and before each event.
    /// An event that has started always runs to completion.
    pub fn run(&self, sequence: &[RecordedEvent], cancel: &CancelToken) -> PlaybackOutcome {
        if sequence.is_empty() {
            info!("No recorded events. Record something before starting playback.");
            return PlaybackOutcome::Empty;
        }

        info!(events = sequence.len(), "Playback started (loops until stopped)");

        let mut passes = 0u64;
        while !cancel.is_cancelled() {
            if !self.replay_pass(sequence, cancel) {
                break;
            }
            passes += 1;
            debug!(passes, "Playback pass completed");
            thread::sleep(self.timing.loop_pause);
        }

        info!(passes, "Playback stopped");
        PlaybackOutcome::Cancelled { passes }
    }

    /// Replay one pass. Returns false if cancelled part way through.
    fn replay_pass(&self, sequence: &[RecordedEvent], cancel: &CancelToken) -> bool {
        for (index, event) in sequence.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(index, "Playback cancelled mid-sequence");
                return false;
            }
            self.replay_event(index, event);
        }
        true
    }

    fn replay_event(&self, index: usize, event: &RecordedEvent) {
        match *event {
            RecordedEvent::Click {
                delay_seconds,
                x_ratio,
                y_ratio,
                button,
            } => {
                thread::sleep(self.timing.event_delay(delay_seconds));
                self.move_to(index, x_ratio, y_ratio);
                thread::sleep(self.timing.settle_after_move);
                debug!(index, ?button, "replaying click");
                if let Err(e) = self.driver.click_button(button) {
                    warn!(index, error = %e, "click injection failed");
                }
            }
            RecordedEvent::Scroll {
                delay_seconds,
                x_ratio,
                y_ratio,
                dx,
                dy,
            } => {
                thread::sleep(self.timing.event_delay(delay_seconds));
                self.move_to(index, x_ratio, y_ratio);
                thread::sleep(self.timing.settle_after_move);
                debug!(index, dx, dy, "replaying scroll");
                if let Err(e) = self.driver.scroll_by(dx, dy) {
                    warn!(index, error = %e, "scroll injection failed");
                }
                thread::sleep(self.timing.settle_after_scroll);
            }
        }
    }

    fn move_to(&self, index: usize, x_ratio: f64, y_ratio: f64) {
        // Re-resolve against whatever layout is active now.
        let rect = self.geometry.virtual_display_rect();
        let (x, y) = rect.to_absolute(x_ratio, y_ratio);
        if let Err(e) = self.driver.move_pointer_to(x, y) {
            warn!(index, x, y, error = %e, "pointer move failed");
        }
    }
}

/// Handle to one playback run.
#[derive(Clone)]
pub struct PlaybackHandle {
    cancel: CancelToken,
    done_rx: Receiver<()>,
}

impl PlaybackHandle {
    /// Whether the playback thread is still running (possibly draining a cancel).
    pub fn is_active(&self) -> bool {
        matches!(self.done_rx.try_recv(), Err(TryRecvError::Empty))
    }

    /// Signal the run to stop. Does not wait.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait up to `timeout` for the run to finish. Returns true if it did.
    pub fn wait(&self, timeout: Duration) -> bool {
        !matches!(self.done_rx.recv_timeout(timeout), Err(RecvTimeoutError::Timeout))
    }
}
