//! Routes hook events to the session: mouse input to the recorder, keys to hotkey actions.

use crate::hotkeys::{HotkeyAction, HotkeyMatcher};
use mousemacro_core::{RecorderEvent, SessionController};
use mousemacro_platform::{InputEvent, InputHookHandle, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How often the loop wakes up to check the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Cloneable stop signal for a running dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchStopper(Arc<AtomicBool>);

impl DispatchStopper {
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Dispatcher {
    session: Arc<SessionController>,
    hotkeys: HotkeyMatcher,
    running: Arc<AtomicBool>,
}

impl Dispatcher {
    pub fn new(session: Arc<SessionController>, hotkeys: HotkeyMatcher) -> Self {
        Self {
            session,
            hotkeys,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn stopper(&self) -> DispatchStopper {
        DispatchStopper(self.running.clone())
    }

    /// Block on the hook until stopped, quit, or the hook goes away.
    pub fn run(&mut self, hook: &InputHookHandle) {
        self.run_with(|timeout| hook.recv_timeout(timeout));
    }

    fn run_with(
        &mut self,
        mut next: impl FnMut(Duration) -> Result<InputEvent, RecvTimeoutError>,
    ) {
        info!("Dispatcher running");
        while self.running.load(Ordering::SeqCst) && !self.session.is_quit_requested() {
            match next(POLL_INTERVAL) {
                Ok(event) => self.handle(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("Input hook disconnected, stopping dispatcher");
                    break;
                }
            }
        }
        info!("Dispatcher stopped");
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::ButtonPress { x, y, button } => {
                log_captured(self.session.on_click_event(x, y, button, true));
            }
            InputEvent::ButtonRelease { x, y, button } => {
                self.session.on_click_event(x, y, button, false);
            }
            InputEvent::Scroll {
                x,
                y,
                delta_x,
                delta_y,
            } => {
                log_captured(self.session.on_scroll_event(x, y, delta_x, delta_y));
            }
            InputEvent::KeyDown { key } => {
                if let Some(action) = self.hotkeys.key_down(&key) {
                    self.perform(action);
                }
            }
            InputEvent::KeyUp { key } => self.hotkeys.key_up(&key),
        }
    }

    fn perform(&self, action: HotkeyAction) {
        debug!(?action, "Hotkey");
        match action {
            HotkeyAction::ToggleRecording => {
                let event = self.session.toggle_recording();
                println!("{}", describe(&event));
            }
            HotkeyAction::TogglePlayback => {
                let was_playing = self.session.is_playing();
                self.session.toggle_playback();
                if was_playing {
                    println!("Playback stopping.");
                } else {
                    println!("Playback started.");
                }
            }
            HotkeyAction::Quit => {
                println!("Quitting.");
                self.session.quit();
            }
        }
    }
}

fn log_captured(event: Option<RecorderEvent>) {
    if let Some(RecorderEvent::EventCaptured { event_count }) = event {
        debug!(event_count, "Captured");
    }
}

/// User-facing line for a recorder transition.
fn describe(event: &RecorderEvent) -> String {
    match event {
        RecorderEvent::Started { rect } => format!("Recording started on {rect}."),
        RecorderEvent::Stopped { event_count } => {
            format!("Recording stopped ({event_count} events).")
        }
        RecorderEvent::EventCaptured { event_count } => format!("{event_count} events captured."),
    }
}
