//! Session controller: owns recording/playback state and mediates host commands.

use crate::{
    CancelToken, GeometryProvider, MouseButtonRaw, PlaybackHandle, PlaybackTiming, Player,
    PointerDriver, RecordedEvent, Recorder, RecorderEvent, VirtualDisplayRect,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

type ShutdownHook = Box<dyn Fn() + Send + Sync>;

struct SessionState {
    recorder: Recorder,
    playback: Option<PlaybackHandle>,
}

/// Process-wide session. Share it as `Arc<SessionController>`; every method takes `&self`.
pub struct SessionController {
    state: Mutex<SessionState>,
    geometry: Arc<dyn GeometryProvider>,
    driver: Arc<dyn PointerDriver>,
    timing: PlaybackTiming,
    shutdown_hooks: Mutex<Vec<ShutdownHook>>,
    quit_requested: AtomicBool,
}

impl SessionController {
    pub fn new(geometry: Arc<dyn GeometryProvider>, driver: Arc<dyn PointerDriver>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                recorder: Recorder::new(),
                playback: None,
            }),
            geometry,
            driver,
            timing: PlaybackTiming::default(),
            shutdown_hooks: Mutex::new(Vec::new()),
            quit_requested: AtomicBool::new(false),
        }
    }

    /// Override replay pacing.
    pub fn with_timing(mut self, timing: PlaybackTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Register something to stop on `quit` (input listener, hotkey dispatcher).
    pub fn on_quit(&self, hook: impl Fn() + Send + Sync + 'static) {
        lock(&self.shutdown_hooks).push(Box::new(hook));
    }

    // === Recording ===

    /// Start a fresh session against a new display snapshot.
    pub fn start_recording(&self) -> RecorderEvent {
        let rect = self.geometry.virtual_display_rect();
        self.lock_state().recorder.start(rect)
    }

    /// Stop recording. `None` when already idle.
    pub fn stop_recording(&self) -> Option<RecorderEvent> {
        self.lock_state().recorder.stop()
    }

    /// Returns `Started` or `Stopped`. The display is only queried when starting.
    pub fn toggle_recording(&self) -> RecorderEvent {
        match self.stop_recording() {
            Some(stopped) => stopped,
            None => self.start_recording(),
        }
    }

    /// Button notification from the input listener.
    pub fn on_click_event(
        &self,
        x: i32,
        y: i32,
        button: MouseButtonRaw,
        is_press: bool,
    ) -> Option<RecorderEvent> {
        self.lock_state()
            .recorder
            .push_click(Instant::now(), x, y, button, is_press)
    }

    /// Wheel notification from the input listener.
    pub fn on_scroll_event(&self, x: i32, y: i32, dx: i32, dy: i32) -> Option<RecorderEvent> {
        self.lock_state()
            .recorder
            .push_scroll(Instant::now(), x, y, dx, dy)
    }

    // === Playback ===

    /// Cancel the active run, or start one over a snapshot of the current sequence.
    pub fn toggle_playback(&self) {
        let mut state = self.lock_state();

        if let Some(handle) = state.playback.as_ref().filter(|h| h.is_active()) {
            info!("Stopping playback");
            handle.cancel();
            return;
        }

        let sequence = state.recorder.snapshot();
        let player = Player::new(self.driver.clone(), self.geometry.clone(), self.timing);
        debug!(events = sequence.len(), "Starting playback run");
        state.playback = Some(player.spawn(sequence, CancelToken::new()));
    }

    /// Signal playback cancellation, then stop every registered resource.
    pub fn quit(&self) {
        self.quit_requested.store(true, Ordering::SeqCst);

        if let Some(handle) = self.lock_state().playback.as_ref() {
            handle.cancel();
        }

        let hooks = std::mem::take(&mut *lock(&self.shutdown_hooks));
        for hook in hooks {
            hook();
        }
        info!("Shutdown requested");
    }

    /// Wait up to `timeout` for the current playback run (if any) to exit.
    pub fn wait_playback_stopped(&self, timeout: Duration) -> bool {
        // Clone the handle so the state lock is not held while waiting.
        let handle = self.lock_state().playback.clone();
        handle.map_or(true, |h| h.wait(timeout))
    }

    // === Observers ===

    pub fn is_recording(&self) -> bool {
        self.lock_state().recorder.is_recording()
    }

    pub fn is_playing(&self) -> bool {
        self.lock_state()
            .playback
            .as_ref()
            .is_some_and(PlaybackHandle::is_active)
    }

    pub fn recorded_len(&self) -> usize {
        self.lock_state().recorder.event_count()
    }

    pub fn snapshot(&self) -> Arc<[RecordedEvent]> {
        self.lock_state().recorder.snapshot()
    }

    /// Display snapshot of the current (or last) recording session.
    pub fn active_display_rect(&self) -> VirtualDisplayRect {
        self.lock_state().recorder.rect()
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.state)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedGeometry, MouseButton};
    use std::sync::atomic::AtomicUsize;

    struct NullDriver;

    impl PointerDriver for NullDriver {
        fn move_pointer_to(&self, _x: i32, _y: i32) -> Result<(), String> {
            Ok(())
        }

        fn click_button(&self, _button: MouseButton) -> Result<(), String> {
            Ok(())
        }

        fn scroll_by(&self, _dx: i32, _dy: i32) -> Result<(), String> {
            Ok(())
        }
    }

    /// Counts display queries.
    struct CountingGeometry(AtomicUsize);

    impl GeometryProvider for CountingGeometry {
        fn virtual_display_rect(&self) -> VirtualDisplayRect {
            self.0.fetch_add(1, Ordering::SeqCst);
            VirtualDisplayRect::new(-1920, 0, 3840, 1080)
        }
    }

    fn controller() -> SessionController {
        SessionController::new(
            Arc::new(FixedGeometry(VirtualDisplayRect::new(0, 0, 1000, 1000))),
            Arc::new(NullDriver),
        )
    }

    #[test]
    fn test_toggle_recording() {
        let session = controller();
        assert!(!session.is_recording());
        assert!(matches!(session.toggle_recording(), RecorderEvent::Started { .. }));
        assert!(session.is_recording());
        assert_eq!(
            session.on_click_event(100, 100, MouseButtonRaw::Left, true),
            Some(RecorderEvent::EventCaptured { event_count: 1 })
        );
        assert_eq!(session.on_click_event(100, 100, MouseButtonRaw::Left, false), None);
        assert_eq!(
            session.toggle_recording(),
            RecorderEvent::Stopped { event_count: 1 }
        );
        assert!(!session.is_recording());
        assert_eq!(session.recorded_len(), 1);
    }

    #[test]
    fn test_display_queried_only_when_starting() {
        let geometry = Arc::new(CountingGeometry(AtomicUsize::new(0)));
        let session = SessionController::new(geometry.clone(), Arc::new(NullDriver));

        let started = session.toggle_recording();
        assert_eq!(
            started,
            RecorderEvent::Started { rect: VirtualDisplayRect::new(-1920, 0, 3840, 1080) }
        );
        session.toggle_recording();
        assert!(session.stop_recording().is_none());

        assert_eq!(geometry.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_events_ignored_when_not_recording() {
        let session = controller();
        session.on_click_event(100, 100, MouseButtonRaw::Left, true);
        session.on_scroll_event(100, 100, 0, 1);
        assert_eq!(session.recorded_len(), 0);
    }

    #[test]
    fn test_stop_when_idle_changes_nothing() {
        let session = controller();
        session.start_recording();
        session.on_click_event(1, 1, MouseButtonRaw::Right, true);
        session.stop_recording();
        let before = session.snapshot();

        session.stop_recording();
        session.on_click_event(2, 2, MouseButtonRaw::Right, true);

        assert!(!session.is_recording());
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_quit_runs_hooks_once() {
        let session = controller();
        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let calls = calls.clone();
            session.on_quit(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }

        session.quit();
        session.quit();

        assert!(session.is_quit_requested());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_playback_finishes_on_its_own() {
        let session = controller();
        session.toggle_playback();
        assert!(session.wait_playback_stopped(Duration::from_secs(5)));
        assert!(!session.is_playing());
    }
}
