//! Synthetic pointer output using the `enigo` crate.
//!
//! On Windows, pointer moves go through `SetCursorPos` instead: enigo scales
//! absolute moves against the primary monitor only, which cannot reach a
//! secondary monitor of the virtual desktop.

use crate::{PlatformError, PlatformResult};
#[cfg(not(windows))]
use enigo::Coordinate;
use enigo::{Axis, Button, Direction, Enigo, InputError, Mouse, Settings};
use mousemacro_core::{MouseButton, PointerDriver};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Real pointer driver backed by `enigo`.
pub struct EnigoDriver {
    enigo: Mutex<Enigo>,
}

impl EnigoDriver {
    /// Create a new EnigoDriver.
    pub fn new() -> PlatformResult<Self> {
        let settings = Settings::default();
        let enigo = Enigo::new(&settings).map_err(|e| {
            PlatformError::InjectionFailed(format!("failed to create Enigo: {e}"))
        })?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }

    fn inject(&self, f: impl FnOnce(&mut Enigo) -> Result<(), InputError>) -> PlatformResult<()> {
        let mut enigo = self.enigo.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut enigo).map_err(|e| PlatformError::InjectionFailed(e.to_string()))
    }
}

impl PointerDriver for EnigoDriver {
    fn move_pointer_to(&self, x: i32, y: i32) -> Result<(), String> {
        debug!(x, y, "injecting pointer move");
        #[cfg(windows)]
        {
            win32::set_cursor_pos(x, y).map_err(|e| e.to_string())
        }
        #[cfg(not(windows))]
        {
            self.inject(|enigo| enigo.move_mouse(x, y, Coordinate::Abs))
                .map_err(|e| e.to_string())
        }
    }

    fn click_button(&self, button: MouseButton) -> Result<(), String> {
        debug!(?button, "injecting click");
        let btn = mouse_button_to_enigo(button);
        self.inject(|enigo| enigo.button(btn, Direction::Click))
            .map_err(|e| e.to_string())
    }

    fn scroll_by(&self, dx: i32, dy: i32) -> Result<(), String> {
        debug!(dx, dy, "injecting scroll");
        let (horizontal, vertical) = scroll_to_enigo(dx, dy);
        self.inject(|enigo| {
            if vertical != 0 {
                enigo.scroll(vertical, Axis::Vertical)?;
            }
            if horizontal != 0 {
                enigo.scroll(horizontal, Axis::Horizontal)?;
            }
            Ok(())
        })
        .map_err(|e| e.to_string())
    }
}

fn mouse_button_to_enigo(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

/// Recorded deltas use positive = up/right; enigo scrolls down for positive vertical lengths.
fn scroll_to_enigo(dx: i32, dy: i32) -> (i32, i32) {
    (dx, dy.saturating_neg())
}

/// Virtual-desktop cursor placement. Coordinates may be negative.
#[cfg(windows)]
mod win32 {
    use crate::{PlatformError, PlatformResult};
    use windows_sys::Win32::UI::WindowsAndMessaging::SetCursorPos;

    pub fn set_cursor_pos(x: i32, y: i32) -> PlatformResult<()> {
        if unsafe { SetCursorPos(x, y) } == 0 {
            return Err(PlatformError::InjectionFailed(format!(
                "SetCursorPos({x}, {y}) failed"
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn cursor_pos() -> Option<(i32, i32)> {
        use windows_sys::Win32::Foundation::POINT;
        use windows_sys::Win32::UI::WindowsAndMessaging::GetCursorPos;

        let mut point = POINT { x: 0, y: 0 };
        (unsafe { GetCursorPos(&mut point) } != 0).then_some((point.x, point.y))
    }
}
