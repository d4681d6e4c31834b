//! macOS display bounds via Core Graphics.
//!
//! Coordinates are in points, which is also what the injector uses.

use core_graphics::display::CGDisplay;

/// Union of the bounds of every active display: (x, y, width, height).
pub fn virtual_screen() -> Option<(i32, i32, i32, i32)> {
    let ids = CGDisplay::active_displays().ok()?;
    let mut bounds = ids.into_iter().map(|id| CGDisplay::new(id).bounds());

    let first = bounds.next()?;
    let mut min_x = first.origin.x;
    let mut min_y = first.origin.y;
    let mut max_x = first.origin.x + first.size.width;
    let mut max_y = first.origin.y + first.size.height;

    for b in bounds {
        min_x = min_x.min(b.origin.x);
        min_y = min_y.min(b.origin.y);
        max_x = max_x.max(b.origin.x + b.size.width);
        max_y = max_y.max(b.origin.y + b.size.height);
    }

    Some((
        min_x.floor() as i32,
        min_y.floor() as i32,
        (max_x - min_x).round() as i32,
        (max_y - min_y).round() as i32,
    ))
}

pub fn main_display() -> Option<(i32, i32)> {
    let bounds = CGDisplay::main().bounds();
    let (w, h) = (bounds.size.width.round() as i32, bounds.size.height.round() as i32);
    (w > 0 && h > 0).then_some((w, h))
}
