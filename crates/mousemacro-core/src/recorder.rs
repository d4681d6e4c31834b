//! Recording engine: turns raw click/scroll notifications into a RecordedSequence.

use crate::{MouseButton, RecordedEvent, VirtualDisplayRect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// State of the recorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecorderState {
    /// Not recording.
    #[default]
    Idle,
    /// Recording in progress.
    Recording,
}

/// Events emitted by the recorder.
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    /// A new session started against this display snapshot.
    Started { rect: VirtualDisplayRect },
    /// Event captured.
    EventCaptured { event_count: usize },
    /// Session finished.
    Stopped { event_count: usize },
}

/// Raw mouse button (from platform layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButtonRaw {
    Left,
    Right,
    Middle,
    Unknown,
}

impl From<MouseButtonRaw> for MouseButton {
    fn from(raw: MouseButtonRaw) -> Self {
        match raw {
            MouseButtonRaw::Left => MouseButton::Left,
            MouseButtonRaw::Right => MouseButton::Right,
            MouseButtonRaw::Middle => MouseButton::Middle,
            // Side buttons and anything else replay as a middle click.
            MouseButtonRaw::Unknown => MouseButton::Middle,
        }
    }
}

/// The recorder collects press-only clicks and scrolls with relative delays.
#[derive(Debug)]
pub struct Recorder {
    state: RecorderState,
    events: Vec<RecordedEvent>,
    last_event_at: Option<Instant>,
    rect: VirtualDisplayRect,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            events: Vec::new(),
            last_event_at: None,
            rect: VirtualDisplayRect::default(),
        }
    }

    /// Get current state.
    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Get the number of captured events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Display snapshot taken when the current (or last) session started.
    pub fn rect(&self) -> VirtualDisplayRect {
        self.rect
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Immutable copy of the current sequence, safe to hand to a playback thread.
    pub fn snapshot(&self) -> Arc<[RecordedEvent]> {
        Arc::from(self.events.as_slice())
    }

    /// Start (or restart) a session. The previous sequence is discarded.
    pub fn start(&mut self, rect: VirtualDisplayRect) -> RecorderEvent {
        if self.state == RecorderState::Recording {
            debug!("Recording restarted, discarding {} events", self.events.len());
        }

        self.state = RecorderState::Recording;
        self.events = Vec::new();
        self.last_event_at = None;
        self.rect = rect;

        info!(%rect, "Recording started");
        RecorderEvent::Started { rect }
    }

    /// Stop recording. Returns `None` when already idle.
    pub fn stop(&mut self) -> Option<RecorderEvent> {
        if self.state == RecorderState::Idle {
            return None;
        }

        self.state = RecorderState::Idle;
        info!(event_count = self.events.len(), "Recording stopped");
        Some(RecorderEvent::Stopped {
            event_count: self.events.len(),
        })
    }

    /// Record a button notification. Releases are ignored.
    pub fn push_click(
        &mut self,
        at: Instant,
        x: i32,
        y: i32,
        button: MouseButtonRaw,
        is_press: bool,
    ) -> Option<RecorderEvent> {
        if self.state != RecorderState::Recording || !is_press {
            return None;
        }

        let delay_seconds = self.take_delay(at);
        let (x_ratio, y_ratio) = self.rect.to_ratio(x, y);
        let button = MouseButton::from(button);

        info!(
            "[REC] click d={:.3}s pos=({},{}) ratio=({:.4},{:.4}) btn={:?}",
            delay_seconds, x, y, x_ratio, y_ratio, button
        );

        self.push(RecordedEvent::Click {
            delay_seconds,
            x_ratio,
            y_ratio,
            button,
        })
    }

    /// Record a wheel notification. `dx`/`dy` are stored as received.
    pub fn push_scroll(
        &mut self,
        at: Instant,
        x: i32,
        y: i32,
        dx: i32,
        dy: i32,
    ) -> Option<RecorderEvent> {
        if self.state != RecorderState::Recording {
            return None;
        }

        let delay_seconds = self.take_delay(at);
        let (x_ratio, y_ratio) = self.rect.to_ratio(x, y);

        info!(
            "[REC] scroll d={:.3}s pos=({},{}) ratio=({:.4},{:.4}) dx={} dy={}",
            delay_seconds, x, y, x_ratio, y_ratio, dx, dy
        );

        self.push(RecordedEvent::Scroll {
            delay_seconds,
            x_ratio,
            y_ratio,
            dx,
            dy,
        })
    }

    fn take_delay(&mut self, at: Instant) -> f64 {
        let delay = match self.last_event_at {
            Some(last) => at.saturating_duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        self.last_event_at = Some(at);
        delay
    }

    fn push(&mut self, event: RecordedEvent) -> Option<RecorderEvent> {
        self.events.push(event);
        Some(RecorderEvent::EventCaptured {
            event_count: self.events.len(),
        })
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn rect() -> VirtualDisplayRect {
        VirtualDisplayRect::new(0, 0, 1000, 1000)
    }

    #[test]
    fn test_recorder_basic() {
        let mut recorder = Recorder::new();
        assert_eq!(recorder.state(), RecorderState::Idle);

        recorder.start(rect());
        assert_eq!(recorder.state(), RecorderState::Recording);

        let t0 = Instant::now();
        recorder.push_click(t0, 100, 200, MouseButtonRaw::Left, true);
        recorder.push_click(t0, 100, 200, MouseButtonRaw::Left, false);
        recorder.push_scroll(t0 + Duration::from_millis(10), 100, 200, 0, -1);

        assert_eq!(recorder.event_count(), 2);

        let event = recorder.stop();
        assert_eq!(event, Some(RecorderEvent::Stopped { event_count: 2 }));
        assert_eq!(recorder.state(), RecorderState::Idle);
    }

    #[test]
    fn test_ignored_while_idle() {
        let mut recorder = Recorder::new();
        let now = Instant::now();
        assert!(recorder.push_click(now, 1, 1, MouseButtonRaw::Left, true).is_none());
        assert!(recorder.push_scroll(now, 1, 1, 0, 1).is_none());
        assert_eq!(recorder.event_count(), 0);
    }

    #[test]
    fn test_delays_are_relative() {
        let mut recorder = Recorder::new();
        recorder.start(rect());

        let t0 = Instant::now();
        recorder.push_click(t0, 10, 10, MouseButtonRaw::Left, true);
        recorder.push_scroll(t0 + Duration::from_millis(250), 10, 10, 0, 3);
        recorder.push_click(t0 + Duration::from_millis(1250), 10, 10, MouseButtonRaw::Right, true);

        let delays: Vec<f64> = recorder.events().iter().map(|e| e.delay_seconds()).collect();
        assert_eq!(delays[0], 0.0);
        assert!((delays[1] - 0.25).abs() < 1e-9);
        assert!((delays[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut recorder = Recorder::new();
        recorder.start(rect());
        recorder.push_click(Instant::now(), 5, 5, MouseButtonRaw::Left, true);
        assert!(recorder.stop().is_some());
        assert!(recorder.stop().is_none());
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(recorder.event_count(), 1);
    }

    #[test]
    fn test_restart_discards_previous_session() {
        let mut recorder = Recorder::new();
        recorder.start(rect());
        let t0 = Instant::now();
        recorder.push_click(t0, 5, 5, MouseButtonRaw::Left, true);
        recorder.push_click(t0, 6, 6, MouseButtonRaw::Left, true);

        let wide = VirtualDisplayRect::new(-1920, 0, 3840, 1080);
        recorder.start(wide);
        assert_eq!(recorder.event_count(), 0);
        assert_eq!(recorder.rect(), wide);

        // First event of the new session has no delay.
        recorder.push_click(t0 + Duration::from_secs(3), 0, 0, MouseButtonRaw::Left, true);
        assert_eq!(recorder.events()[0].delay_seconds(), 0.0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut recorder = Recorder::new();
        recorder.start(rect());
        recorder.push_click(Instant::now(), 5, 5, MouseButtonRaw::Left, true);
        let snapshot = recorder.snapshot();

        recorder.start(rect());
        assert_eq!(snapshot.len(), 1);
        assert_eq!(recorder.event_count(), 0);
    }

    #[test]
    fn test_unknown_button_maps_to_middle() {
        let mut recorder = Recorder::new();
        recorder.start(rect());
        recorder.push_click(Instant::now(), 5, 5, MouseButtonRaw::Unknown, true);
        assert!(matches!(
            recorder.events()[0],
            RecordedEvent::Click { button: MouseButton::Middle, .. }
        ));
    }
}
