// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/view/canvas.rs
//
// One image canvas: live surface size plus its selection gesture tracker.

use image::RgbaImage;

use super::crop::{GestureOutput, GestureTracker, PointerEvent, render_surface};
use crate::domain::document::ImageHandle;
use crate::domain::viewport::SurfaceSize;

#[derive(Debug, Clone)]
pub struct Canvas {
    surface: SurfaceSize,
    tracker: GestureTracker,
}

impl Canvas {
    /// Canvas that accepts drag selections.
    pub fn selectable(surface: SurfaceSize, min_selection: f32) -> Self {
        Self {
            surface,
            tracker: GestureTracker::new(true, min_selection),
        }
    }

    /// Display-only canvas.
    pub fn display_only(surface: SurfaceSize) -> Self {
        Self {
            surface,
            tracker: GestureTracker::non_interactive(),
        }
    }

    /// Current rendered size, sampled fresh on every call.
    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn resize(&mut self, surface: SurfaceSize) {
        self.surface = surface;
    }

    pub fn pointer(&mut self, event: PointerEvent) -> GestureOutput {
        self.tracker.handle(event)
    }

    pub fn tracker(&self) -> &GestureTracker {
        &self.tracker
    }

    /// Forget any drag and overlay, e.g. after the image was replaced.
    pub fn reset_selection(&mut self) {
        self.tracker.reset();
    }

    /// Render `image` at the current surface size, or `None` if the slot is empty.
    pub fn render(&self, image: Option<&ImageHandle>) -> Option<RgbaImage> {
        let image = image?;
        Some(render_surface(
            image.image(),
            self.surface,
            self.tracker.overlay(),
            self.tracker.is_interactive(),
        ))
    }
}
