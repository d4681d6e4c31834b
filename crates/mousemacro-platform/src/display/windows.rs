//! Windows display metrics and DPI awareness.

use std::sync::Once;
use tracing::{info, warn};
use windows_sys::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SetProcessDPIAware, SM_CXSCREEN, SM_CXVIRTUALSCREEN, SM_CYSCREEN,
    SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN,
};

static INIT: Once = Once::new();

/// Make the process DPI aware so hook, metrics and injection all use physical pixels.
///
/// Must be called before the first geometry query.
pub fn set_dpi_aware() {
    INIT.call_once(|| unsafe {
        if SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) != 0 {
            info!("Set Per-Monitor V2 DPI awareness");
        } else if SetProcessDPIAware() != 0 {
            info!("Set system DPI awareness");
        } else {
            warn!("Failed to set DPI awareness, coordinates may be scaled");
        }
    });
}

/// Bounding box of all monitors: (x, y, width, height).
pub fn virtual_screen() -> Option<(i32, i32, i32, i32)> {
    let (x, y, w, h) = unsafe {
        (
            GetSystemMetrics(SM_XVIRTUALSCREEN),
            GetSystemMetrics(SM_YVIRTUALSCREEN),
            GetSystemMetrics(SM_CXVIRTUALSCREEN),
            GetSystemMetrics(SM_CYVIRTUALSCREEN),
        )
    };
    (w > 0 && h > 0).then_some((x, y, w, h))
}

pub fn primary_screen() -> Option<(i32, i32)> {
    let (w, h) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
    (w > 0 && h > 0).then_some((w, h))
}
