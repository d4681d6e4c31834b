//! Virtual display geometry and ratio-coordinate normalization.

use serde::{Deserialize, Serialize};

/// Bounding rectangle of every active display in an extended desktop.
///
/// The origin may be negative when a secondary monitor sits left of or above
/// the primary one. Width and height are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualDisplayRect {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: i32,
    pub height: i32,
}

impl VirtualDisplayRect {
    /// Build a rect, flooring width and height to 1.
    pub fn new(origin_x: i32, origin_y: i32, width: i32, height: i32) -> Self {
        Self {
            origin_x,
            origin_y,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Absolute pointer position -> display-independent ratio.
    pub fn to_ratio(&self, x: i32, y: i32) -> (f64, f64) {
        let xr = f64::from(x - self.origin_x) / f64::from(self.width.max(1));
        let yr = f64::from(y - self.origin_y) / f64::from(self.height.max(1));
        (xr, yr)
    }

    /// Ratio -> absolute pointer position, rounded to the nearest pixel.
    pub fn to_absolute(&self, xr: f64, yr: f64) -> (i32, i32) {
        let x = (f64::from(self.origin_x) + xr * f64::from(self.width.max(1))).round();
        let y = (f64::from(self.origin_y) + yr * f64::from(self.height.max(1))).round();
        (x as i32, y as i32)
    }
}

impl Default for VirtualDisplayRect {
    fn default() -> Self {
        Self::new(0, 0, 1920, 1080)
    }
}

impl std::fmt::Display for VirtualDisplayRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} (origin={},{})",
            self.width, self.height, self.origin_x, self.origin_y
        )
    }
}

/// Source of the current virtual display geometry.
///
/// Implementations must never fail: fall back to something usable instead.
pub trait GeometryProvider: Send + Sync {
    fn virtual_display_rect(&self) -> VirtualDisplayRect;
}

/// Provider that always reports the same rect.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeometry(pub VirtualDisplayRect);

impl GeometryProvider for FixedGeometry {
    fn virtual_display_rect(&self) -> VirtualDisplayRect {
        self.0
    }
}
