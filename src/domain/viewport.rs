// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/viewport.rs
//
// Fit-to-surface coordinate mapping between display space and native pixels.

use crate::constant::SCALE_EPSILON;

/// A point in either display or native space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle spanned by two corners, regardless of drag direction.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Both sides strictly larger than `min`.
    pub fn exceeds(&self, min: f32) -> bool {
        self.width > min && self.height > min
    }
}

/// Rendered size of a display container in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Letterboxed fit of a native image into a display surface.
///
/// The image is scaled uniformly by `min(Cw/W, Ch/H)` and centered, so the
/// unused margin is split evenly along the axis that does not fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    native_width: u32,
    native_height: u32,
}

impl Viewport {
    /// Compute the fit of a `native` sized image into `surface`.
    pub fn fit(native: (u32, u32), surface: SurfaceSize) -> Self {
        let (w, h) = native;
        let scale = if w == 0 || h == 0 || surface.is_empty() {
            0.0
        } else {
            (surface.width as f32 / w as f32).min(surface.height as f32 / h as f32)
        };

        if !scale.is_finite() || scale <= 0.0 {
            return Self {
                scale: SCALE_EPSILON,
                offset_x: 0.0,
                offset_y: 0.0,
                native_width: w,
                native_height: h,
            };
        }

        Self {
            scale,
            offset_x: (surface.width as f32 - w as f32 * scale) / 2.0,
            offset_y: (surface.height as f32 - h as f32 * scale) / 2.0,
            native_width: w,
            native_height: h,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_y)
    }

    pub fn native_size(&self) -> (u32, u32) {
        (self.native_width, self.native_height)
    }

    pub fn to_display(&self, native: Point) -> Point {
        Point::new(
            self.offset_x + native.x * self.scale,
            self.offset_y + native.y * self.scale,
        )
    }

    pub fn to_native(&self, display: Point) -> Point {
        Point::new(
            (display.x - self.offset_x) / self.scale,
            (display.y - self.offset_y) / self.scale,
        )
    }

    /// Map a display-space rectangle into native space via its two corners.
    pub fn rect_to_native(&self, rect: &Rect) -> Rect {
        Rect::from_corners(
            self.to_native(rect.top_left()),
            self.to_native(rect.bottom_right()),
        )
    }

    /// Where the whole image lands on the surface.
    pub fn image_rect(&self) -> Rect {
        Rect::new(
            self.offset_x,
            self.offset_y,
            self.native_width as f32 * self.scale,
            self.native_height as f32 * self.scale,
        )
    }
}
