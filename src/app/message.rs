// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/message.rs
//
// Application messages: user actions, canvas input and task completions.

use crate::app::model::{RequestTicket, Slot};
use crate::app::view::crop::PointerEvent;
use crate::domain::document::{ImageHandle, SourceFile};
use crate::domain::fusion::{FusionParameter, FusionResponse};
use crate::domain::viewport::SurfaceSize;
use crate::error::{DecodeError, RemoteCallError};

#[derive(Debug)]
pub enum AppMessage {
    // Uploads.
    Upload {
        slot: Slot,
        file: SourceFile,
    },
    ImageDecoded {
        slot: Slot,
        ticket: u64,
        result: Result<ImageHandle, DecodeError>,
    },

    // Canvas.
    SurfaceResized {
        slot: Slot,
        size: SurfaceSize,
    },
    Pointer {
        slot: Slot,
        event: PointerEvent,
    },

    // Fusion configuration.
    SetPrompt(String),
    SetParameter {
        parameter: FusionParameter,
        value: u8,
    },

    // Fusion.
    Submit,
    FusionFinished {
        ticket: RequestTicket,
        result: Result<FusionResponse, RemoteCallError>,
    },

    // Notices.
    ClearNotice,
}
