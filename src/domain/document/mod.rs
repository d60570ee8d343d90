// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/document/mod.rs
//
// Document module root: decoded rasters, encoded payloads and crop operations.

pub mod operations;
pub mod payload;
pub mod raster;

pub use operations::crop::{CropRegion, ExtractedRegion, extract_region};
pub use payload::ImagePayload;
pub use raster::{ImageHandle, ImageId, SourceFile};
