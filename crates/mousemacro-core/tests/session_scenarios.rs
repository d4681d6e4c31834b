//! End-to-end behaviour of the session controller with fake display and pointer.

use mousemacro_core::{
    FixedGeometry, MouseButton, MouseButtonRaw, PlaybackTiming, PointerDriver, RecordedEvent,
    SessionController, VirtualDisplayRect,
};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Move(i32, i32),
    Click(MouseButton),
    Scroll(i32, i32),
}

#[derive(Default)]
struct FakeDriver {
    calls: Mutex<Vec<Call>>,
}

impl FakeDriver {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl PointerDriver for FakeDriver {
    fn move_pointer_to(&self, x: i32, y: i32) -> Result<(), String> {
        self.calls.lock().unwrap().push(Call::Move(x, y));
        Ok(())
    }

    fn click_button(&self, button: MouseButton) -> Result<(), String> {
        self.calls.lock().unwrap().push(Call::Click(button));
        Ok(())
    }

    fn scroll_by(&self, dx: i32, dy: i32) -> Result<(), String> {
        self.calls.lock().unwrap().push(Call::Scroll(dx, dy));
        Ok(())
    }
}

const TIMEOUT: Duration = Duration::from_secs(5);

fn quick_timing() -> PlaybackTiming {
    PlaybackTiming {
        min_delay: Duration::from_millis(1),
        settle_after_move: Duration::ZERO,
        settle_after_scroll: Duration::ZERO,
        loop_pause: Duration::from_millis(1),
    }
}

fn setup(timing: PlaybackTiming) -> (SessionController, Arc<FakeDriver>) {
    let driver = Arc::new(FakeDriver::default());
    let session = SessionController::new(
        Arc::new(FixedGeometry(VirtualDisplayRect::new(0, 0, 1000, 1000))),
        driver.clone(),
    )
    .with_timing(timing);
    (session, driver)
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

#[test]
fn click_is_normalized_and_replayed_at_same_position() {
    let (session, driver) = setup(quick_timing());

    session.start_recording();
    session.on_click_event(100, 100, MouseButtonRaw::Left, true);
    session.on_click_event(100, 100, MouseButtonRaw::Left, false);
    session.stop_recording();

    let recorded = session.snapshot();
    assert_eq!(recorded.len(), 1);
    let (xr, yr) = recorded[0].ratio();
    assert!((xr - 0.1).abs() < 1e-12);
    assert!((yr - 0.1).abs() < 1e-12);

    session.toggle_playback();
    assert!(wait_for(|| driver.len() >= 2));
    session.toggle_playback();
    assert!(session.wait_playback_stopped(TIMEOUT));

    let calls = driver.calls();
    assert_eq!(calls[0], Call::Move(100, 100));
    assert_eq!(calls[1], Call::Click(MouseButton::Left));
}

#[test]
fn second_start_discards_first_session() {
    let (session, _driver) = setup(quick_timing());

    session.start_recording();
    session.on_click_event(10, 10, MouseButtonRaw::Left, true);
    session.on_scroll_event(10, 10, 0, 1);
    assert_eq!(session.recorded_len(), 2);

    session.start_recording();
    assert!(session.is_recording());
    assert_eq!(session.recorded_len(), 0);

    session.on_click_event(20, 20, MouseButtonRaw::Right, true);
    assert_eq!(session.recorded_len(), 1);
    assert_eq!(session.snapshot()[0].delay_seconds(), 0.0);
}

#[test]
fn empty_sequence_playback_makes_no_calls() {
    let (session, driver) = setup(quick_timing());

    session.toggle_playback();
    assert!(session.wait_playback_stopped(TIMEOUT));
    thread::sleep(Duration::from_millis(20));

    assert!(!session.is_playing());
    assert!(driver.calls().is_empty());
}

#[test]
fn scroll_deltas_replay_in_order_without_inversion() {
    let (session, driver) = setup(quick_timing());

    session.start_recording();
    session.on_scroll_event(500, 500, 0, 5);
    session.on_scroll_event(500, 500, 0, -3);
    session.stop_recording();

    session.toggle_playback();
    assert!(wait_for(|| driver.len() >= 4));
    session.toggle_playback();
    assert!(session.wait_playback_stopped(TIMEOUT));

    let scrolls: Vec<Call> = driver
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Scroll(..)))
        .collect();
    assert_eq!(scrolls[0], Call::Scroll(0, 5));
    assert_eq!(scrolls[1], Call::Scroll(0, -3));
}

#[test]
fn double_toggle_cancels_instead_of_starting_second_loop() {
    let (session, driver) = setup(PlaybackTiming::default());

    session.start_recording();
    session.on_click_event(300, 300, MouseButtonRaw::Left, true);
    session.stop_recording();

    session.toggle_playback();
    assert!(session.is_playing());
    session.toggle_playback();

    assert!(session.wait_playback_stopped(TIMEOUT));
    assert!(!session.is_playing());
    // At most the one event that was already under way.
    assert!(driver.len() <= 2);
}

#[test]
fn recording_during_playback_does_not_touch_running_snapshot() {
    let (session, driver) = setup(quick_timing());

    session.start_recording();
    session.on_click_event(100, 100, MouseButtonRaw::Left, true);
    session.stop_recording();

    session.toggle_playback();
    session.start_recording();
    session.on_click_event(900, 900, MouseButtonRaw::Right, true);

    assert!(wait_for(|| driver.len() >= 6));
    session.toggle_playback();
    assert!(session.wait_playback_stopped(TIMEOUT));

    for call in driver.calls() {
        match call {
            Call::Move(x, y) => assert_eq!((x, y), (100, 100)),
            Call::Click(button) => assert_eq!(button, MouseButton::Left),
            Call::Scroll(..) => panic!("unexpected scroll"),
        }
    }
    assert_eq!(session.recorded_len(), 1);
}

#[test]
fn delays_follow_wall_clock_gaps() {
    let (session, _driver) = setup(quick_timing());

    session.start_recording();
    session.on_click_event(1, 1, MouseButtonRaw::Left, true);
    thread::sleep(Duration::from_millis(60));
    session.on_scroll_event(1, 1, 0, 1);
    session.stop_recording();

    let events = session.snapshot();
    assert_eq!(events[0].delay_seconds(), 0.0);
    assert!(events[1].delay_seconds() >= 0.06);
    assert!(events[1].delay_seconds() < 5.0);
    assert!(matches!(events[1], RecordedEvent::Scroll { dy: 1, .. }));
}

#[test]
fn quit_cancels_playback_and_runs_hooks() {
    let (session, driver) = setup(quick_timing());
    let stopped = Arc::new(Mutex::new(false));
    let flag = stopped.clone();
    session.on_quit(move || *flag.lock().unwrap() = true);

    session.start_recording();
    session.on_click_event(1, 1, MouseButtonRaw::Middle, true);
    session.stop_recording();
    session.toggle_playback();
    assert!(wait_for(|| driver.len() >= 2));

    session.quit();

    assert!(session.wait_playback_stopped(TIMEOUT));
    assert!(session.is_quit_requested());
    assert!(*stopped.lock().unwrap());
}
