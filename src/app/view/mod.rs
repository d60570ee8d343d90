// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/view/mod.rs
//
// View layer: canvases and the selection overlay.

pub mod canvas;
pub mod crop;

pub use canvas::Canvas;
