// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/view/crop/mod.rs
//
// Crop selection module: gesture tracking and the overlay renderer.

mod overlay;
mod selection;

pub use overlay::render_surface;
pub use selection::{DragState, GestureOutput, GestureTracker, PointerEvent, transition};
