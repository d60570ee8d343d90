// SPDX-License-Identifier: GPL-3.0-or-later
// src/error.rs
//
// Error kinds of the selection and fusion workflow.

use thiserror::Error;

use crate::app::model::Slot;

/// Uploaded bytes could not be turned into an image handle.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("not a valid image: {0}")]
    Image(#[from] image::ImageError),

    #[error("decoder task failed: {0}")]
    Interrupted(String),
}

/// A committed selection could not be turned into a crop.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("source image is not decoded yet")]
    NotDecoded,

    #[error("selection maps to an empty native region ({width}x{height})")]
    Degenerate { width: i64, height: i64 },

    #[error("failed to encode crop: {0}")]
    Encode(#[from] image::ImageError),
}

/// The remote fusion call failed.
#[derive(Debug, Clone, Error)]
pub enum RemoteCallError {
    /// Network failure, timeout or the service could not be reached.
    #[error("fusion service unreachable: {0}")]
    Transport(String),

    /// The service answered but reported failure.
    #[error("fusion failed: {0}")]
    Rejected(String),

    /// The service answered with something we cannot interpret.
    #[error("malformed fusion response: {0}")]
    Malformed(String),
}

/// A submit action was refused before any request was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please upload both images and select a region")]
    NotReady,

    #[error("Please provide a fusion prompt")]
    MissingPrompt,

    #[error("A fusion request is already in flight")]
    InFlight,
}

/// Everything the workbench can report back from an update.
#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("{slot} image: {source}")]
    Decode {
        slot: Slot,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Remote(#[from] RemoteCallError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// A response arrived for inputs that have since been replaced.
    #[error("discarded stale fusion response")]
    StaleResponseDiscarded,
}

impl WorkbenchError {
    /// Whether this error should be shown to the user.
    ///
    /// Extraction failures drop the commit silently and stale responses are
    /// internal bookkeeping.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::Extraction(_) | Self::StaleResponseDiscarded)
    }
}
