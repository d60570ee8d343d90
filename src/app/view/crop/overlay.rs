// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/view/crop/overlay.rs
//
// Selection renderer: letterboxed image plus dashed selection overlay.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::domain::viewport::{Rect, SurfaceSize, Viewport};

const BACKGROUND_COLOR: Rgba<u8> = Rgba([0, 0, 0, 0]);
const ACCENT_COLOR: Rgba<u8> = Rgba([244, 226, 37, 255]);
const HANDLE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Accent at 5% opacity.
const FILL_COLOR: Rgba<u8> = Rgba([244, 226, 37, 13]);
const BORDER_WIDTH: i64 = 2;
const DASH_LENGTH: i64 = 5;
const HANDLE_SIZE: f32 = 12.0;

/// Draw `image` fitted into `surface` and, when `selectable`, the selection.
///
/// Pure and idempotent. Callers re-run it on every resize because display
/// coordinates only mean something relative to the current surface.
pub fn render_surface(
    image: &DynamicImage,
    surface: SurfaceSize,
    selection: Option<Rect>,
    selectable: bool,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(surface.width, surface.height, BACKGROUND_COLOR);
    if surface.is_empty() || image.width() == 0 || image.height() == 0 {
        return canvas;
    }

    let viewport = Viewport::fit((image.width(), image.height()), surface);
    let target = viewport.image_rect();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (tw, th) = (
        (target.width.round() as u32).max(1),
        (target.height.round() as u32).max(1),
    );
    let scaled = imageops::resize(image, tw, th, FilterType::Triangle);
    imageops::overlay(
        &mut canvas,
        &scaled,
        target.x.round() as i64,
        target.y.round() as i64,
    );

    if let Some(rect) = selection.filter(|_| selectable) {
        draw_dashed_outline(&mut canvas, &rect);
        for (cx, cy) in [
            (rect.x, rect.y),
            (rect.x + rect.width, rect.y),
            (rect.x, rect.y + rect.height),
            (rect.x + rect.width, rect.y + rect.height),
        ] {
            draw_handle(&mut canvas, cx, cy);
        }
        fill_rect(&mut canvas, &rect, FILL_COLOR);
    }

    canvas
}

/// Source-over compositing in integer space, so opaque strokes land exactly.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let a = u32::from(color[3]);
    if a == 255 {
        *dst = color;
        return;
    }
    let inv = 255 - a;
    for c in 0..3 {
        dst[c] = ((u32::from(color[c]) * a + u32::from(dst[c]) * inv + 127) / 255) as u8;
    }
    dst[3] = (a + (u32::from(dst[3]) * inv + 127) / 255) as u8;
}

fn edges(rect: &Rect) -> (i64, i64, i64, i64) {
    (
        rect.x.round() as i64,
        rect.y.round() as i64,
        (rect.x + rect.width).round() as i64,
        (rect.y + rect.height).round() as i64,
    )
}

fn fill_rect(canvas: &mut RgbaImage, rect: &Rect, color: Rgba<u8>) {
    let (x0, y0, x1, y1) = edges(rect);
    for y in y0..y1 {
        for x in x0..x1 {
            blend_pixel(canvas, x, y, color);
        }
    }
}

/// Stroke the rectangle clockwise from the top-left corner.
///
/// The dash pattern runs continuously around the perimeter.
fn draw_dashed_outline(canvas: &mut RgbaImage, rect: &Rect) {
    let (x0, y0, x1, y1) = edges(rect);
    let half = BORDER_WIDTH / 2;
    let mut travelled = 0_i64;

    let mut stroke = |canvas: &mut RgbaImage,
                      points: &mut dyn Iterator<Item = (i64, i64)>,
                      horizontal: bool| {
        for (x, y) in points {
            if (travelled / DASH_LENGTH) % 2 == 0 {
                for o in -half..BORDER_WIDTH - half {
                    if horizontal {
                        blend_pixel(canvas, x, y + o, ACCENT_COLOR);
                    } else {
                        blend_pixel(canvas, x + o, y, ACCENT_COLOR);
                    }
                }
            }
            travelled += 1;
        }
    };

    stroke(canvas, &mut (x0..x1).map(|x| (x, y0)), true);
    stroke(canvas, &mut (y0..y1).map(|y| (x1, y)), false);
    stroke(canvas, &mut (x0 + 1..=x1).rev().map(|x| (x, y1)), true);
    stroke(canvas, &mut (y0 + 1..=y1).rev().map(|y| (x0, y)), false);
}

/// White disc with an accent ring, centered on a corner.
fn draw_handle(canvas: &mut RgbaImage, cx: f32, cy: f32) {
    let radius = HANDLE_SIZE / 2.0;
    let ring = BORDER_WIDTH as f32 / 2.0;
    let reach = (radius + ring).ceil() as i64;
    let (ix, iy) = (cx.round() as i64, cy.round() as i64);

    for y in iy - reach..=iy + reach {
        for x in ix - reach..=ix + reach {
            let d = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
            if d <= radius - ring {
                blend_pixel(canvas, x, y, HANDLE_COLOR);
            } else if d <= radius + ring {
                blend_pixel(canvas, x, y, ACCENT_COLOR);
            }
        }
    }
}
