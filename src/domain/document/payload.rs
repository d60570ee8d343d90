// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/document/payload.rs
//
// Self-describing encoded image blobs exchanged with the fusion service.

use std::fmt;
use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat};

/// Encoded image bytes plus the format they are encoded in.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImagePayload({}, {} bytes)", self.mime_type(), self.bytes.len())
    }
}

impl ImagePayload {
    pub fn new(format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    /// Encode a raster as PNG.
    pub fn encode_png(img: &DynamicImage) -> image::ImageResult<Self> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(Self::new(ImageFormat::Png, bytes))
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Render as `data:<mime>;base64,<data>`.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }

    /// Parse a data URL, or bare base64 which is assumed to be PNG.
    pub fn from_data_url(s: &str) -> Option<Self> {
        let (format, data) = match s.strip_prefix("data:") {
            Some(rest) => {
                let (mime, data) = rest.split_once(";base64,")?;
                (ImageFormat::from_mime_type(mime)?, data)
            }
            None => (ImageFormat::Png, s),
        };
        let bytes = STANDARD.decode(data.trim()).ok()?;
        Some(Self::new(format, bytes))
    }

    /// Decode the payload into a raster.
    pub fn decode(&self) -> image::ImageResult<DynamicImage> {
        image::load_from_memory_with_format(&self.bytes, self.format)
    }
}
