//! Virtual display geometry and DPI awareness.
//!
//! Platform implementations:
//! - Windows: `GetSystemMetrics` virtual-screen metrics, Per-Monitor V2 DPI awareness (`windows.rs`)
//! - macOS: union of active `CGDisplay` bounds (`macos.rs`)
//! - Others: primary display size from rdev

use mousemacro_core::{GeometryProvider, VirtualDisplayRect};
use tracing::{debug, warn};

#[cfg(windows)]
mod windows;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(windows)]
pub use windows::set_dpi_aware;

/// Set DPI awareness (no-op outside Windows).
#[cfg(not(windows))]
pub fn set_dpi_aware() {}

/// Geometry provider backed by the OS display configuration.
#[derive(Debug, Clone, Copy)]
pub struct SystemDisplay {
    fallback: VirtualDisplayRect,
}

impl SystemDisplay {
    /// `fallback` is used when neither the virtual nor the primary display can be queried.
    pub fn new(fallback: VirtualDisplayRect) -> Self {
        Self { fallback }
    }
}

impl Default for SystemDisplay {
    fn default() -> Self {
        Self::new(VirtualDisplayRect::default())
    }
}

impl GeometryProvider for SystemDisplay {
    fn virtual_display_rect(&self) -> VirtualDisplayRect {
        resolve(query_virtual_rect(), query_primary_size(), self.fallback)
    }
}

/// Pick the first usable answer: virtual rect, then primary size at (0,0), then fallback.
fn resolve(
    virtual_rect: Option<(i32, i32, i32, i32)>,
    primary: Option<(i32, i32)>,
    fallback: VirtualDisplayRect,
) -> VirtualDisplayRect {
    if let Some((x, y, w, h)) = virtual_rect.filter(|&(_, _, w, h)| w > 0 && h > 0) {
        return VirtualDisplayRect::new(x, y, w, h);
    }
    if let Some((w, h)) = primary.filter(|&(w, h)| w > 0 && h > 0) {
        debug!(w, h, "Virtual screen unavailable, using primary display");
        return VirtualDisplayRect::new(0, 0, w, h);
    }
    warn!(%fallback, "Display geometry unavailable, using fallback");
    fallback
}

fn query_virtual_rect() -> Option<(i32, i32, i32, i32)> {
    #[cfg(windows)]
    {
        windows::virtual_screen()
    }
    #[cfg(target_os = "macos")]
    {
        macos::virtual_screen()
    }
    #[cfg(not(any(windows, target_os = "macos")))]
    {
        None
    }
}

fn query_primary_size() -> Option<(i32, i32)> {
    #[cfg(windows)]
    {
        windows::primary_screen()
    }
    #[cfg(target_os = "macos")]
    {
        macos::main_display()
    }
    #[cfg(not(any(windows, target_os = "macos")))]
    {
        match rdev::display_size() {
            Ok((w, h)) => Some((i32::try_from(w).ok()?, i32::try_from(h).ok()?)),
            Err(error) => {
                debug!(?error, "rdev display_size failed");
                None
            }
        }
    }
}
