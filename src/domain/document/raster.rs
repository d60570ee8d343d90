// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/document/raster.rs
//
// Decoded raster images backing the two upload slots.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{DynamicImage, GenericImageView, ImageFormat};
use sha2::{Digest, Sha256};

use super::payload::ImagePayload;
use crate::constant::ACCEPTED_MIME_TYPES;
use crate::error::DecodeError;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one successful upload.
///
/// Every decode yields a fresh id, so re-uploading identical bytes still
/// counts as a different image for selection tagging and request fencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u64);

impl ImageId {
    fn next() -> Self {
        Self(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "img-{}", self.0)
    }
}

/// Raw upload as delivered by the file source.
#[derive(Clone)]
pub struct SourceFile {
    pub bytes: Vec<u8>,
    pub mime_hint: Option<String>,
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("bytes", &self.bytes.len())
            .field("mime_hint", &self.mime_hint)
            .finish()
    }
}

impl SourceFile {
    pub fn new(bytes: Vec<u8>, mime_hint: Option<impl Into<String>>) -> Self {
        Self {
            bytes,
            mime_hint: mime_hint.map(Into::into),
        }
    }
}

/// A decoded image plus the encoded bytes it came from.
pub struct ImageHandle {
    id: ImageId,
    digest: String,
    document: DynamicImage,
    source: ImagePayload,
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "ImageHandle({}, {w}x{h}, {})", self.id, self.short_digest())
    }
}

impl ImageHandle {
    /// Decode an upload.
    ///
    /// The MIME hint selects the decoder when present; otherwise the format is
    /// sniffed from the bytes. A hinted decode that fails is retried with the
    /// sniffed format. Only the uploader's accepted types are allowed.
    pub fn decode(file: &SourceFile) -> Result<Self, DecodeError> {
        if file.bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let Some(mime) = file.mime_hint.as_deref().map(str::to_ascii_lowercase) else {
            let format = sniff(&file.bytes)?;
            return Self::decode_as(file, format);
        };

        if !ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(DecodeError::UnsupportedType(mime));
        }
        let mime = if mime == "image/jpg" { "image/jpeg".to_string() } else { mime };
        let hinted = ImageFormat::from_mime_type(&mime).ok_or(DecodeError::UnsupportedType(mime))?;

        match Self::decode_as(file, hinted) {
            Err(err) => match sniff(&file.bytes) {
                Ok(actual) if actual != hinted => {
                    log::debug!(
                        "Hint {} does not match content, decoding as {}",
                        hinted.to_mime_type(),
                        actual.to_mime_type()
                    );
                    Self::decode_as(file, actual)
                }
                _ => Err(err),
            },
            ok => ok,
        }
    }

    fn decode_as(file: &SourceFile, format: ImageFormat) -> Result<Self, DecodeError> {
        let document = image::load_from_memory_with_format(&file.bytes, format)?;
        Ok(Self::from_parts(
            document,
            ImagePayload::new(format, file.bytes.clone()),
        ))
    }

    /// Wrap an already decoded raster, encoding it as PNG for transmission.
    pub fn from_image(document: DynamicImage) -> image::ImageResult<Self> {
        let source = ImagePayload::encode_png(&document)?;
        Ok(Self::from_parts(document, source))
    }

    fn from_parts(document: DynamicImage, source: ImagePayload) -> Self {
        let digest = format!("{:x}", Sha256::digest(&source.bytes));
        Self {
            id: ImageId::next(),
            digest,
            document,
            source,
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    /// Hex SHA-256 of the encoded bytes.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn short_digest(&self) -> &str {
        &self.digest[..12.min(self.digest.len())]
    }

    /// Returns the native pixel dimensions (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        self.document.dimensions()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.document
    }

    /// The encoded bytes as uploaded, for transmission.
    pub fn payload(&self) -> &ImagePayload {
        &self.source
    }
}

/// Detect the format from the bytes, restricted to accepted types.
fn sniff(bytes: &[u8]) -> Result<ImageFormat, DecodeError> {
    let format = image::guess_format(bytes)?;
    if !ACCEPTED_MIME_TYPES.contains(&format.to_mime_type()) {
        return Err(DecodeError::UnsupportedType(format.to_mime_type().to_string()));
    }
    Ok(format)
}
