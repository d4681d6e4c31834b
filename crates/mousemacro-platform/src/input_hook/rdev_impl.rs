//! rdev-based input hooking.

use super::InputEvent;
use crossbeam_channel::Sender;
use enigo::{Enigo, Mouse, Settings};
use mousemacro_core::MouseButtonRaw;
use rdev::{listen, Event, EventType, Key};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

fn button_to_raw(button: rdev::Button) -> MouseButtonRaw {
    match button {
        rdev::Button::Left => MouseButtonRaw::Left,
        rdev::Button::Right => MouseButtonRaw::Right,
        rdev::Button::Middle => MouseButtonRaw::Middle,
        rdev::Button::Unknown(_) => MouseButtonRaw::Unknown,
    }
}

/// Run the hook until the process exits. Blocks the calling thread.
///
/// A listener failure is reported once through `error_tx`.
pub fn start_hook(event_tx: Sender<InputEvent>, running: Arc<AtomicBool>, error_tx: Sender<String>) {
    info!("Input hook thread started (rdev)");

    // rdev button and wheel events carry no position: track the last move,
    // starting from wherever the pointer is now.
    let mut last_pos = current_pointer_location().unwrap_or_else(|| {
        warn!("Pointer location unavailable, positions start at (0,0) until the first move");
        (0, 0)
    });

    let callback = move |event: Event| {
        if !running.load(Ordering::SeqCst) {
            return;
        }

        if let Some(input_event) = translate(event.event_type, &mut last_pos) {
            if let Err(e) = event_tx.try_send(input_event) {
                warn!("Failed to send input event: {}", e);
            }
        }
    };

    if let Err(err) = listen(callback) {
        error!(?err, "Input hook error");
        let _ = error_tx.send(format!("{err:?}"));
    }

    info!("Input hook thread exiting");
}

fn current_pointer_location() -> Option<(i32, i32)> {
    let enigo = Enigo::new(&Settings::default()).ok()?;
    match enigo.location() {
        Ok(pos) => Some(pos),
        Err(e) => {
            debug!(error = %e, "enigo location failed");
            None
        }
    }
}

/// Turn one rdev event into an `InputEvent`, updating `last_pos` on moves.
fn translate(event_type: EventType, last_pos: &mut (i32, i32)) -> Option<InputEvent> {
    let (x, y) = *last_pos;
    match event_type {
        EventType::MouseMove { x, y } => {
            *last_pos = (x.round() as i32, y.round() as i32);
            None
        }
        EventType::ButtonPress(button) => Some(InputEvent::ButtonPress {
            x,
            y,
            button: button_to_raw(button),
        }),
        EventType::ButtonRelease(button) => Some(InputEvent::ButtonRelease {
            x,
            y,
            button: button_to_raw(button),
        }),
        EventType::Wheel { delta_x, delta_y } => {
            let (delta_x, delta_y) = wheel_steps(delta_x, delta_y);
            Some(InputEvent::Scroll {
                x,
                y,
                delta_x,
                delta_y,
            })
        }
        EventType::KeyPress(key) => Some(InputEvent::KeyDown {
            key: format_key(key),
        }),
        EventType::KeyRelease(key) => Some(InputEvent::KeyUp {
            key: format_key(key),
        }),
    }
}

/// Wheel deltas in line steps, positive = up/right.
///
/// rdev reports macOS wheels as point deltas on the CG axes, where axis 2
/// is positive to the left. Replay scrolls by lines.
#[cfg(target_os = "macos")]
fn wheel_steps(delta_x: i64, delta_y: i64) -> (i32, i32) {
    (points_to_lines(delta_x.saturating_neg()), points_to_lines(delta_y))
}

#[cfg(not(target_os = "macos"))]
fn wheel_steps(delta_x: i64, delta_y: i64) -> (i32, i32) {
    (saturate(delta_x), saturate(delta_y))
}

/// Points per wheel line on macOS.
const POINTS_PER_LINE: f64 = 10.0;

/// Point delta to whole lines. A non-zero delta is always at least one line.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn points_to_lines(points: i64) -> i32 {
    if points == 0 {
        return 0;
    }
    let lines = (points as f64 / POINTS_PER_LINE).round() as i64;
    saturate(if lines == 0 { points.signum() } else { lines })
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Name a key the way hotkey chords spell it. Left/right modifiers are merged.
fn format_key(key: Key) -> String {
    match key {
        Key::ControlLeft | Key::ControlRight => "Ctrl".into(),
        Key::Alt | Key::AltGr => "Alt".into(),
        Key::ShiftLeft | Key::ShiftRight => "Shift".into(),
        Key::MetaLeft | Key::MetaRight => "Meta".into(),
        Key::Escape => "Esc".into(),
        Key::Return | Key::KpReturn => "Enter".into(),
        Key::Unknown(code) => format!("Unknown({})", code),
        other => {
            // KeyA -> "a", Num1 -> "1"; everything else keeps its rdev name (F1, Home, ...).
            let name = format!("{other:?}");
            name.strip_prefix("Key")
                .or_else(|| name.strip_prefix("Num"))
                .filter(|rest| rest.len() == 1)
                .map(str::to_lowercase)
                .unwrap_or(name)
        }
    }
}
