// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/update.rs
//
// Workflow transitions: one message in, at most one task out.

use crate::app::message::AppMessage;
use crate::app::model::{AppModel, CommittedSelection, Preview, RequestTicket, Slot, WorkflowState};
use crate::app::view::crop::{GestureOutput, PointerEvent};
use crate::domain::document::{ImageHandle, SourceFile, extract_region};
use crate::domain::fusion::{FusionRequest, FusionResponse, NativeSelection};
use crate::domain::viewport::Rect;
use crate::error::{DecodeError, RemoteCallError, SubmitError, WorkbenchError};

/// Asynchronous work requested by an update.
#[derive(Debug)]
pub enum UpdateResult {
    None,
    /// Decode an upload off the event loop.
    Decode {
        slot: Slot,
        ticket: u64,
        file: SourceFile,
    },
    /// Call the fusion service.
    Fuse {
        ticket: RequestTicket,
        request: FusionRequest,
    },
}

impl AppModel {
    pub fn update(&mut self, message: AppMessage) -> UpdateResult {
        match message {
            AppMessage::Upload { slot, file } => return self.start_upload(slot, file),
            AppMessage::ImageDecoded {
                slot,
                ticket,
                result,
            } => self.finish_upload(slot, ticket, result),
            AppMessage::SurfaceResized { slot, size } => {
                self.canvas_mut(slot).resize(size);
            }
            AppMessage::Pointer { slot, event } => self.pointer(slot, event),
            AppMessage::SetPrompt(prompt) => self.prompt = prompt,
            AppMessage::SetParameter { parameter, value } => {
                self.parameters.set(parameter, value);
            }
            AppMessage::Submit => match self.submit() {
                Ok(result) => return result,
                Err(e) => {
                    log::info!("Submit refused: {e}");
                    self.set_error(e.into());
                }
            },
            AppMessage::FusionFinished { ticket, result } => {
                if let Err(e) = self.apply_fusion(ticket, result) {
                    if e.is_user_visible() {
                        log::warn!("Fusion #{}: {e}", ticket.seq);
                    }
                    self.set_error(e);
                }
            }
            AppMessage::ClearNotice => self.clear_notice(),
        }
        UpdateResult::None
    }

    // =========================================================================
    // Uploads
    // =========================================================================

    fn start_upload(&mut self, slot: Slot, file: SourceFile) -> UpdateResult {
        let ticket = self.next_upload;
        self.next_upload += 1;
        *self.pending_upload(slot) = Some(ticket);
        log::info!(
            "Decoding {slot} upload #{ticket} ({} bytes, {:?})",
            file.bytes.len(),
            file.mime_hint
        );
        UpdateResult::Decode { slot, ticket, file }
    }

    fn finish_upload(&mut self, slot: Slot, ticket: u64, result: Result<ImageHandle, DecodeError>) {
        if *self.pending_upload(slot) != Some(ticket) {
            log::debug!("Dropping superseded {slot} upload #{ticket}");
            return;
        }
        *self.pending_upload(slot) = None;

        let handle = match result {
            Ok(handle) => handle,
            Err(source) => {
                log::warn!("Failed to decode {slot} upload #{ticket}: {source}");
                self.set_error(WorkbenchError::Decode { slot, source });
                return;
            }
        };

        let (w, h) = handle.dimensions();
        log::info!(
            "Loaded {slot} image {} ({w}x{h}, sha256 {})",
            handle.id(),
            handle.short_digest()
        );

        // Replacing either slot invalidates everything derived from the pair.
        *self.image_slot_mut(slot) = Some(handle);
        self.selection = None;
        self.preview = None;
        self.source_canvas.reset_selection();

        self.set_info(match slot {
            Slot::Base => "Base image loaded",
            Slot::Source => "Source image loaded",
        });
        self.settle();
    }

    // =========================================================================
    // Selection
    // =========================================================================

    fn pointer(&mut self, slot: Slot, event: PointerEvent) {
        // Selecting only starts once both slots are filled.
        if self.base.is_none() || self.source.is_none() {
            return;
        }

        if let GestureOutput::Committed(rect) = self.canvas_mut(slot).pointer(event) {
            self.commit_selection(slot, rect);
        }
    }

    fn commit_selection(&mut self, slot: Slot, rect: Rect) {
        let surface = self.canvas(slot).surface();
        let Some(image) = self.image(slot) else {
            return;
        };
        let image_id = image.id();

        match extract_region(Some(image), &rect, surface) {
            Ok(extracted) => {
                log::info!(
                    "Selection committed on {image_id}: {:?} -> native {:?}",
                    rect,
                    extracted.region
                );
                self.selection = Some(CommittedSelection {
                    rect,
                    surface,
                    image_id,
                    extracted,
                });
                self.settle();
            }
            Err(e) => {
                self.canvas_mut(slot).reset_selection();
                self.set_error(e.into());
            }
        }
    }

    // =========================================================================
    // Fusion
    // =========================================================================

    fn submit(&mut self) -> Result<UpdateResult, SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::InFlight);
        }

        let (Some(base), Some(source), Some(selection)) =
            (&self.base, &self.source, &self.selection)
        else {
            return Err(SubmitError::NotReady);
        };
        if selection.image_id != source.id() {
            return Err(SubmitError::NotReady);
        }
        if self.prompt.trim().is_empty() {
            return Err(SubmitError::MissingPrompt);
        }

        let ticket = RequestTicket {
            seq: self.next_request,
            base: base.id(),
            source: source.id(),
        };
        let request = FusionRequest {
            base: base.payload().clone(),
            source: source.payload().clone(),
            selection: NativeSelection {
                region: selection.extracted.region,
                image_id: source.id(),
                image_digest: source.digest().to_string(),
            },
            detail: selection.extracted.payload.clone(),
            prompt: self.prompt.clone(),
            parameters: self.parameters,
        };

        self.next_request += 1;
        self.in_flight = Some(ticket);
        self.state = WorkflowState::Submitting;
        log::info!(
            "Submitting fusion #{} (base {}, source {}, region {:?})",
            ticket.seq,
            ticket.base,
            ticket.source,
            request.selection.region
        );

        Ok(UpdateResult::Fuse { ticket, request })
    }

    fn apply_fusion(
        &mut self,
        ticket: RequestTicket,
        result: Result<FusionResponse, RemoteCallError>,
    ) -> Result<(), WorkbenchError> {
        if self.in_flight != Some(ticket) {
            return Err(WorkbenchError::StaleResponseDiscarded);
        }
        self.in_flight = None;

        if !self.is_current(&ticket) {
            self.settle();
            return Err(WorkbenchError::StaleResponseDiscarded);
        }

        let response = match result {
            Ok(response) if response.success => response,
            Ok(response) => {
                self.settle();
                let msg = response.error.unwrap_or_else(|| "Fusion failed".to_string());
                return Err(RemoteCallError::Rejected(msg).into());
            }
            Err(e) => {
                self.settle();
                return Err(e.into());
            }
        };

        let preview = match response.result_image {
            Some(payload) => match payload.decode() {
                Ok(image) => Preview {
                    payload,
                    image,
                    generated: true,
                },
                Err(e) => {
                    self.settle();
                    return Err(RemoteCallError::Malformed(format!("result image: {e}")).into());
                }
            },
            None => {
                let Some(base) = self.base.as_ref() else {
                    self.settle();
                    return Err(WorkbenchError::StaleResponseDiscarded);
                };
                log::warn!("Fusion #{} returned no image, showing base image", ticket.seq);
                Preview {
                    payload: base.payload().clone(),
                    image: base.image().clone(),
                    generated: false,
                }
            }
        };

        if preview.generated
            && let Some(confidence) = response.confidence
        {
            self.confidence = confidence.min(100);
        }
        self.preview = Some(preview);
        self.state = WorkflowState::Resulted;
        self.set_info("Fusion completed successfully!");
        log::info!("Fusion #{} applied (confidence {}%)", ticket.seq, self.confidence);
        Ok(())
    }
}
