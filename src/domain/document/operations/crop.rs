// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/document/operations/crop.rs
//
// Crop operation: map a display-space selection into native pixels and cut it out.

use crate::domain::document::payload::ImagePayload;
use crate::domain::document::raster::ImageHandle;
use crate::domain::viewport::{Rect, SurfaceSize, Viewport};
use crate::error::ExtractionError;

/// Crop region in native pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn as_tuple(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }

    /// Round a native-space rectangle to whole pixels, clipped to the image.
    ///
    /// Parts of the selection that fall into the letterbox margin are cut off.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_native_rect(rect: &Rect, bounds: (u32, u32)) -> Result<Self, ExtractionError> {
        let (w, h) = (i64::from(bounds.0), i64::from(bounds.1));
        let x0 = (rect.x.round() as i64).clamp(0, w);
        let y0 = (rect.y.round() as i64).clamp(0, h);
        let x1 = ((rect.x + rect.width).round() as i64).clamp(0, w);
        let y1 = ((rect.y + rect.height).round() as i64).clamp(0, h);

        let (width, height) = (x1 - x0, y1 - y0);
        if width <= 0 || height <= 0 {
            return Err(ExtractionError::Degenerate { width, height });
        }

        Ok(Self::new(x0 as u32, y0 as u32, width as u32, height as u32))
    }
}

/// Result of cutting a selection out of its source image.
#[derive(Debug, Clone)]
pub struct ExtractedRegion {
    pub region: CropRegion,
    pub payload: ImagePayload,
}

/// Cut the display-space `selection` out of `image`.
///
/// `surface` must be the size the selection was drawn on. The fit is
/// recomputed from it rather than from the live layout.
pub fn extract_region(
    image: Option<&ImageHandle>,
    selection: &Rect,
    surface: SurfaceSize,
) -> Result<ExtractedRegion, ExtractionError> {
    let image = image.ok_or(ExtractionError::NotDecoded)?;
    let viewport = Viewport::fit(image.dimensions(), surface);
    let native = viewport.rect_to_native(selection);
    let region = CropRegion::from_native_rect(&native, image.dimensions())?;

    let (x, y, width, height) = region.as_tuple();
    let cropped = image.image().crop_imm(x, y, width, height);
    let payload = ImagePayload::encode_png(&cropped)?;

    log::debug!(
        "Extracted {}x{} at ({}, {}) from {}",
        width,
        height,
        x,
        y,
        image.id()
    );

    Ok(ExtractedRegion { region, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> ImageHandle {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        });
        ImageHandle::from_image(DynamicImage::ImageRgba8(img)).unwrap()
    }

    #[test]
    fn maps_display_selection_to_native_crop() {
        let image = gradient(600, 400);
        let surface = SurfaceSize::new(300, 300);
        let selection = Rect::new(50.0, 150.0, 200.0, 50.0);

        let extracted = extract_region(Some(&image), &selection, surface).unwrap();
        assert_eq!(extracted.region, CropRegion::new(100, 200, 400, 100));

        let crop = extracted.payload.decode().unwrap().to_rgba8();
        assert_eq!(crop.dimensions(), (400, 100));
        assert_eq!(crop.get_pixel(0, 0), &Rgba([100, 200, 0, 255]));
    }

    #[test]
    fn frozen_surface_wins_over_layout() {
        let image = gradient(600, 400);
        let selection = Rect::new(50.0, 150.0, 200.0, 50.0);

        let frozen = extract_region(Some(&image), &selection, SurfaceSize::new(300, 300)).unwrap();
        let reflowed = extract_region(Some(&image), &selection, SurfaceSize::new(600, 600)).unwrap();
        assert_ne!(frozen.region, reflowed.region);
        assert_eq!(frozen.region.as_tuple(), (100, 200, 400, 100));
    }

    #[test]
    fn margin_part_is_clipped() {
        let image = gradient(600, 400);
        // Starts in the top letterbox band (y < 50).
        let selection = Rect::new(0.0, 20.0, 100.0, 80.0);
        let extracted = extract_region(Some(&image), &selection, SurfaceSize::new(300, 300)).unwrap();
        assert_eq!(extracted.region, CropRegion::new(0, 0, 200, 100));
    }

    #[test]
    fn selection_entirely_in_margin_is_degenerate() {
        let image = gradient(600, 400);
        let selection = Rect::new(10.0, 0.0, 100.0, 40.0);
        let err = extract_region(Some(&image), &selection, SurfaceSize::new(300, 300)).unwrap_err();
        assert!(matches!(err, ExtractionError::Degenerate { .. }));
    }

    #[test]
    fn missing_image_is_not_decoded() {
        let err = extract_region(None, &Rect::new(0.0, 0.0, 50.0, 50.0), SurfaceSize::new(300, 300))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::NotDecoded));
    }
}
