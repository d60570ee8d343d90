// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/model.rs
//
// Workbench state: image slots, committed selection, preview and workflow state.

use std::fmt;

use image::{DynamicImage, RgbaImage};

use crate::app::view::Canvas;
use crate::config::AppConfig;
use crate::constant::INITIAL_CONFIDENCE;
use crate::domain::document::{ExtractedRegion, ImageHandle, ImageId, ImagePayload};
use crate::domain::fusion::FusionParameters;
use crate::domain::viewport::{Rect, SurfaceSize};
use crate::error::WorkbenchError;

// =============================================================================
// Enums
// =============================================================================

/// The two upload slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Garment that receives the feature.
    Base,
    /// Image the feature is selected from.
    Source,
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Slot::Base => 0,
            Slot::Source => 1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Base => f.write_str("base"),
            Slot::Source => f.write_str("source"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Empty,
    PartiallyLoaded,
    ReadySelecting,
    ReadyToSubmit,
    Submitting,
    Resulted,
}

/// User-facing toast.
#[derive(Debug)]
pub enum Notice {
    Info(String),
    Error(WorkbenchError),
}

// =============================================================================
// Records
// =============================================================================

/// The accepted selection on the source image.
#[derive(Debug, Clone)]
pub struct CommittedSelection {
    /// Display-space rectangle as drawn.
    pub rect: Rect,
    /// Surface size at commit time.
    pub surface: SurfaceSize,
    pub image_id: ImageId,
    pub extracted: ExtractedRegion,
}

/// Fence for one remote call: the inputs it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub seq: u64,
    pub base: ImageId,
    pub source: ImageId,
}

/// The displayed fusion result.
#[derive(Debug, Clone)]
pub struct Preview {
    pub payload: ImagePayload,
    pub image: DynamicImage,
    /// False when the service returned no image and the base is shown instead.
    pub generated: bool,
}

// =============================================================================
// Model
// =============================================================================

pub struct AppModel {
    // Slots.
    pub(crate) base: Option<ImageHandle>,
    pub(crate) source: Option<ImageHandle>,
    pub(crate) pending_uploads: [Option<u64>; 2],
    pub(crate) next_upload: u64,

    // Canvases.
    pub(crate) base_canvas: Canvas,
    pub(crate) source_canvas: Canvas,

    // Selection and fusion inputs.
    pub(crate) selection: Option<CommittedSelection>,
    pub(crate) prompt: String,
    pub(crate) parameters: FusionParameters,

    // Fusion.
    pub(crate) state: WorkflowState,
    pub(crate) in_flight: Option<RequestTicket>,
    pub(crate) next_request: u64,
    pub(crate) preview: Option<Preview>,
    pub(crate) confidence: u8,

    // UI state.
    pub(crate) notice: Option<Notice>,
}

impl fmt::Debug for AppModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppModel")
            .field("state", &self.state)
            .field("base", &self.base)
            .field("source", &self.source)
            .field("selection", &self.selection.as_ref().map(|s| s.rect))
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl AppModel {
    pub fn new(config: &AppConfig) -> Self {
        let surface = config.surface_size();
        Self {
            base: None,
            source: None,
            pending_uploads: [None, None],
            next_upload: 1,
            base_canvas: Canvas::display_only(surface),
            source_canvas: Canvas::selectable(surface, config.min_selection_size),
            selection: None,
            prompt: String::new(),
            parameters: config.default_parameters.clamped(),
            state: WorkflowState::Empty,
            in_flight: None,
            next_request: 1,
            preview: None,
            confidence: INITIAL_CONFIDENCE,
            notice: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn image(&self, slot: Slot) -> Option<&ImageHandle> {
        match slot {
            Slot::Base => self.base.as_ref(),
            Slot::Source => self.source.as_ref(),
        }
    }

    pub(crate) fn image_slot_mut(&mut self, slot: Slot) -> &mut Option<ImageHandle> {
        match slot {
            Slot::Base => &mut self.base,
            Slot::Source => &mut self.source,
        }
    }

    pub fn canvas(&self, slot: Slot) -> &Canvas {
        match slot {
            Slot::Base => &self.base_canvas,
            Slot::Source => &self.source_canvas,
        }
    }

    pub(crate) fn canvas_mut(&mut self, slot: Slot) -> &mut Canvas {
        match slot {
            Slot::Base => &mut self.base_canvas,
            Slot::Source => &mut self.source_canvas,
        }
    }

    pub(crate) fn pending_upload(&mut self, slot: Slot) -> &mut Option<u64> {
        &mut self.pending_uploads[slot.index()]
    }

    pub fn selection(&self) -> Option<&CommittedSelection> {
        self.selection.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn parameters(&self) -> FusionParameters {
        self.parameters
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn confidence(&self) -> u8 {
        self.confidence
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the submit button is enabled. The prompt is checked on submit.
    pub fn can_submit(&self) -> bool {
        self.in_flight.is_none()
            && self.base.is_some()
            && self.source.is_some()
            && self.selection.is_some()
    }

    /// Render a slot at its current surface size.
    pub fn render(&self, slot: Slot) -> Option<RgbaImage> {
        self.canvas(slot).render(self.image(slot))
    }

    pub(crate) fn set_info<S: Into<String>>(&mut self, msg: S) {
        self.notice = Some(Notice::Info(msg.into()));
    }

    pub(crate) fn set_error(&mut self, err: WorkbenchError) {
        if err.is_user_visible() {
            self.notice = Some(Notice::Error(err));
        } else {
            log::debug!("Suppressed: {err}");
        }
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Whether `ticket` was built from the images currently loaded.
    pub(crate) fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.base.as_ref().map(ImageHandle::id) == Some(ticket.base)
            && self.source.as_ref().map(ImageHandle::id) == Some(ticket.source)
    }

    /// Derive the stable state from slots, selection and in-flight request.
    ///
    /// `Resulted` is never derived; any later upload or commit leaves it.
    pub(crate) fn settle(&mut self) {
        self.state = match (&self.base, &self.source) {
            (None, None) => WorkflowState::Empty,
            (Some(_), None) | (None, Some(_)) => WorkflowState::PartiallyLoaded,
            // A stale request still blocks submits until it lands.
            _ if self.in_flight.is_some() => WorkflowState::Submitting,
            _ if self.selection.is_none() => WorkflowState::ReadySelecting,
            _ => WorkflowState::ReadyToSubmit,
        };
    }
}
