// SPDX-License-Identifier: GPL-3.0-or-later
// tests/workflow.rs
//
// Workbench transitions driven message by message.

mod common;

use common::{drag, load, loaded_model, pattern_pixel, upload_file};
use image::{DynamicImage, GenericImageView};

use imagefuse::app::{AppMessage, AppModel, Notice, Slot, UpdateResult, WorkflowState};
use imagefuse::config::AppConfig;
use imagefuse::domain::document::{CropRegion, ImagePayload, SourceFile};
use imagefuse::domain::fusion::{FusionParameter, FusionResponse};
use imagefuse::domain::viewport::Rect;
use imagefuse::error::{DecodeError, RemoteCallError, SubmitError, WorkbenchError};

fn submit(model: &mut AppModel) -> (imagefuse::app::RequestTicket, imagefuse::domain::fusion::FusionRequest) {
    match model.update(AppMessage::Submit) {
        UpdateResult::Fuse { ticket, request } => (ticket, request),
        other => panic!("submit refused: {other:?} / {:?}", model.notice()),
    }
}

fn notice_error(model: &AppModel) -> Option<&WorkbenchError> {
    match model.notice() {
        Some(Notice::Error(e)) => Some(e),
        _ => None,
    }
}

#[test]
fn end_to_end_selection_and_fusion() {
    let mut model = AppModel::new(&AppConfig::default());
    assert_eq!(model.state(), WorkflowState::Empty);

    load(&mut model, Slot::Base, upload_file(400, 600));
    assert_eq!(model.state(), WorkflowState::PartiallyLoaded);
    assert!(matches!(model.notice(), Some(Notice::Info(m)) if m == "Base image loaded"));

    load(&mut model, Slot::Source, upload_file(600, 400));
    assert_eq!(model.state(), WorkflowState::ReadySelecting);
    assert!(!model.can_submit());

    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    assert_eq!(model.state(), WorkflowState::ReadyToSubmit);

    let selection = model.selection().unwrap();
    assert_eq!(selection.rect, Rect::new(50.0, 150.0, 200.0, 50.0));
    assert_eq!(selection.extracted.region, CropRegion::new(100, 200, 400, 100));

    let crop = selection.extracted.payload.decode().unwrap();
    assert_eq!(crop.dimensions(), (400, 100));
    assert_eq!(crop.get_pixel(0, 0), pattern_pixel(100, 200));
    assert_eq!(crop.get_pixel(399, 99), pattern_pixel(499, 299));

    model.update(AppMessage::SetPrompt("add the lace collar".into()));
    model.update(AppMessage::SetParameter {
        parameter: FusionParameter::DrapeMatch,
        value: 40,
    });
    let (ticket, request) = submit(&mut model);
    assert_eq!(model.state(), WorkflowState::Submitting);
    assert!(model.is_submitting());
    assert_eq!(request.selection.region, CropRegion::new(100, 200, 400, 100));
    assert_eq!(request.selection.image_id, model.image(Slot::Source).unwrap().id());
    assert_eq!(request.parameters.drape_match, 40);
    assert_eq!(request.parameters.fabric_weight, 65);

    let result = ImagePayload::encode_png(&DynamicImage::new_rgba8(400, 600)).unwrap();
    model.update(AppMessage::FusionFinished {
        ticket,
        result: Ok(FusionResponse::success(Some(result), Some(91))),
    });

    assert_eq!(model.state(), WorkflowState::Resulted);
    assert!(!model.is_submitting());
    assert_eq!(model.confidence(), 91);
    let preview = model.preview().unwrap();
    assert!(preview.generated);
    assert_eq!(preview.image.dimensions(), (400, 600));
    assert!(matches!(model.notice(), Some(Notice::Info(m)) if m == "Fusion completed successfully!"));
}

#[test]
fn small_drag_does_not_commit() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Source, (10.0, 10.0), (25.0, 15.0));
    assert!(model.selection().is_none());
    assert_eq!(model.state(), WorkflowState::ReadySelecting);
}

#[test]
fn reversed_drag_is_normalized() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Source, (180.0, 180.0), (120.0, 130.0));
    let selection = model.selection().unwrap();
    assert_eq!(selection.rect, Rect::new(120.0, 130.0, 60.0, 50.0));
    assert_eq!(selection.extracted.region, CropRegion::new(240, 160, 120, 100));
}

#[test]
fn drag_on_base_canvas_is_ignored() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Base, (50.0, 50.0), (200.0, 200.0));
    assert!(model.selection().is_none());
}

#[test]
fn selection_entirely_in_letterbox_is_dropped() {
    let mut model = loaded_model();
    // Rows 0..50 of the source canvas are margin.
    drag(&mut model, Slot::Source, (10.0, 2.0), (100.0, 40.0));
    assert!(model.selection().is_none());
    assert_eq!(model.state(), WorkflowState::ReadySelecting);
    assert!(notice_error(&model).is_none());
    assert!(model.canvas(Slot::Source).tracker().overlay().is_none());
}

#[test]
fn reupload_invalidates_selection_and_result() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    model.update(AppMessage::SetPrompt("swap sleeves".into()));
    let (ticket, _) = submit(&mut model);
    model.update(AppMessage::FusionFinished {
        ticket,
        result: Ok(FusionResponse::success(None, Some(50))),
    });
    assert_eq!(model.state(), WorkflowState::Resulted);

    load(&mut model, Slot::Source, upload_file(300, 300));
    assert!(model.selection().is_none());
    assert!(model.preview().is_none());
    assert_eq!(model.state(), WorkflowState::ReadySelecting);
    assert!(model.canvas(Slot::Source).tracker().overlay().is_none());
}

#[test]
fn submit_requires_prompt_and_selection() {
    let mut model = loaded_model();
    assert!(matches!(model.update(AppMessage::Submit), UpdateResult::None));
    assert!(matches!(
        notice_error(&model),
        Some(WorkbenchError::Submit(SubmitError::NotReady))
    ));

    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    model.update(AppMessage::SetPrompt("   ".into()));
    assert!(matches!(model.update(AppMessage::Submit), UpdateResult::None));
    assert!(matches!(
        notice_error(&model),
        Some(WorkbenchError::Submit(SubmitError::MissingPrompt))
    ));
    assert_eq!(model.state(), WorkflowState::ReadyToSubmit);
}

#[test]
fn only_one_request_in_flight() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    model.update(AppMessage::SetPrompt("add pockets".into()));
    submit(&mut model);
    assert!(matches!(model.update(AppMessage::Submit), UpdateResult::None));
    assert!(matches!(
        notice_error(&model),
        Some(WorkbenchError::Submit(SubmitError::InFlight))
    ));
    assert_eq!(model.state(), WorkflowState::Submitting);
}

#[test]
fn decode_failure_leaves_slot_untouched() {
    let mut model = loaded_model();
    let before = model.image(Slot::Source).unwrap().id();

    load(
        &mut model,
        Slot::Source,
        SourceFile::new(b"not an image".to_vec(), Some("image/png")),
    );
    assert_eq!(model.image(Slot::Source).unwrap().id(), before);
    assert!(matches!(
        notice_error(&model),
        Some(WorkbenchError::Decode {
            slot: Slot::Source,
            source: DecodeError::Image(_)
        })
    ));
    assert_eq!(model.state(), WorkflowState::ReadySelecting);

    load(
        &mut model,
        Slot::Base,
        SourceFile::new(b"%PDF-1.7".to_vec(), Some("application/pdf")),
    );
    assert!(matches!(
        notice_error(&model),
        Some(WorkbenchError::Decode {
            slot: Slot::Base,
            source: DecodeError::UnsupportedType(_)
        })
    ));
}

#[test]
fn superseded_upload_is_dropped() {
    let mut model = AppModel::new(&AppConfig::default());
    let first = model.update(AppMessage::Upload {
        slot: Slot::Base,
        file: upload_file(10, 10),
    });
    let second = model.update(AppMessage::Upload {
        slot: Slot::Base,
        file: upload_file(40, 30),
    });
    let (
        UpdateResult::Decode {
            ticket: t1,
            file: f1,
            ..
        },
        UpdateResult::Decode {
            ticket: t2,
            file: f2,
            ..
        },
    ) = (first, second)
    else {
        panic!("uploads did not request decodes");
    };

    // Newer upload finishes first; the older one must not overwrite it.
    model.update(AppMessage::ImageDecoded {
        slot: Slot::Base,
        ticket: t2,
        result: imagefuse::domain::document::ImageHandle::decode(&f2),
    });
    model.update(AppMessage::ImageDecoded {
        slot: Slot::Base,
        ticket: t1,
        result: imagefuse::domain::document::ImageHandle::decode(&f1),
    });
    assert_eq!(model.image(Slot::Base).unwrap().dimensions(), (40, 30));
}

#[test]
fn rejected_fusion_returns_to_ready() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    model.update(AppMessage::SetPrompt("blend the hem".into()));
    let (ticket, _) = submit(&mut model);

    model.update(AppMessage::FusionFinished {
        ticket,
        result: Ok(FusionResponse::failure("quota exceeded")),
    });
    assert_eq!(model.state(), WorkflowState::ReadyToSubmit);
    assert!(model.preview().is_none());
    assert!(matches!(
        notice_error(&model),
        Some(WorkbenchError::Remote(RemoteCallError::Rejected(m))) if m == "quota exceeded"
    ));

    // Retry is allowed.
    let (ticket, _) = submit(&mut model);
    model.update(AppMessage::FusionFinished {
        ticket,
        result: Err(RemoteCallError::Transport("connection refused".into())),
    });
    assert_eq!(model.state(), WorkflowState::ReadyToSubmit);
    assert!(matches!(
        notice_error(&model),
        Some(WorkbenchError::Remote(RemoteCallError::Transport(_)))
    ));
}

#[test]
fn success_without_image_shows_base() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    model.update(AppMessage::SetPrompt("add buttons".into()));
    let (ticket, _) = submit(&mut model);

    model.update(AppMessage::FusionFinished {
        ticket,
        result: Ok(FusionResponse::success(None, Some(12))),
    });
    assert_eq!(model.state(), WorkflowState::Resulted);
    let preview = model.preview().unwrap();
    assert!(!preview.generated);
    assert_eq!(preview.image.dimensions(), (400, 600));
    assert_eq!(model.confidence(), 98);
}

#[test]
fn undecodable_result_is_malformed() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    model.update(AppMessage::SetPrompt("add buttons".into()));
    let (ticket, _) = submit(&mut model);

    let garbage = ImagePayload::new(image::ImageFormat::Png, b"nope".to_vec());
    model.update(AppMessage::FusionFinished {
        ticket,
        result: Ok(FusionResponse::success(Some(garbage), Some(70))),
    });
    assert_eq!(model.state(), WorkflowState::ReadyToSubmit);
    assert_eq!(model.confidence(), 98);
    assert!(matches!(
        notice_error(&model),
        Some(WorkbenchError::Remote(RemoteCallError::Malformed(_)))
    ));
}

#[test]
fn response_for_replaced_images_is_discarded() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    model.update(AppMessage::SetPrompt("add lace".into()));
    let (ticket, _) = submit(&mut model);

    load(&mut model, Slot::Base, upload_file(200, 200));
    assert!(model.selection().is_none());
    // Still waiting on the old request.
    assert_eq!(model.state(), WorkflowState::Submitting);
    assert!(!model.can_submit());

    let result = ImagePayload::encode_png(&DynamicImage::new_rgba8(8, 8)).unwrap();
    model.update(AppMessage::FusionFinished {
        ticket,
        result: Ok(FusionResponse::success(Some(result), Some(5))),
    });
    assert!(model.preview().is_none());
    assert_eq!(model.confidence(), 98);
    assert!(!model.is_submitting());
    assert_eq!(model.state(), WorkflowState::ReadySelecting);
    assert!(matches!(model.notice(), Some(Notice::Info(m)) if m == "Base image loaded"));

    // A duplicate completion is dropped as well.
    model.update(AppMessage::FusionFinished {
        ticket,
        result: Ok(FusionResponse::success(None, None)),
    });
    assert!(model.preview().is_none());
}

#[test]
fn resized_surface_maps_new_drags_only() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    model.update(AppMessage::SurfaceResized {
        slot: Slot::Source,
        size: imagefuse::domain::viewport::SurfaceSize::new(600, 600),
    });

    // The committed selection keeps the size it was drawn at.
    let selection = model.selection().unwrap();
    assert_eq!(selection.surface.width, 300);
    assert_eq!(selection.extracted.region, CropRegion::new(100, 200, 400, 100));

    let rendered = model.render(Slot::Source).unwrap();
    assert_eq!(rendered.dimensions(), (600, 600));

    // At 600x600 the image fills the width 1:1 with a 100px top margin.
    drag(&mut model, Slot::Source, (100.0, 200.0), (300.0, 300.0));
    assert_eq!(
        model.selection().unwrap().extracted.region,
        CropRegion::new(100, 100, 200, 100)
    );
}

#[test]
fn pending_stale_request_keeps_submitting_until_it_lands() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    model.update(AppMessage::SetPrompt("add lace".into()));
    let (stale, _) = submit(&mut model);

    load(&mut model, Slot::Source, upload_file(600, 400));
    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    assert!(model.selection().is_some());
    assert_eq!(model.state(), WorkflowState::Submitting);
    assert!(!model.can_submit());
    assert!(matches!(model.update(AppMessage::Submit), UpdateResult::None));
    assert!(matches!(
        notice_error(&model),
        Some(WorkbenchError::Submit(SubmitError::InFlight))
    ));

    model.update(AppMessage::FusionFinished {
        ticket: stale,
        result: Ok(FusionResponse::success(None, Some(40))),
    });
    assert_eq!(model.state(), WorkflowState::ReadyToSubmit);
    assert!(model.preview().is_none());
    assert!(model.can_submit());

    let (ticket, request) = submit(&mut model);
    assert_ne!(ticket, stale);
    assert_eq!(request.selection.image_id, model.image(Slot::Source).unwrap().id());
    assert_eq!(model.state(), WorkflowState::Submitting);
}

#[test]
fn no_selection_until_both_images_are_loaded() {
    let mut model = AppModel::new(&AppConfig::default());
    load(&mut model, Slot::Source, upload_file(600, 400));
    assert_eq!(model.state(), WorkflowState::PartiallyLoaded);

    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    assert!(model.selection().is_none());
    assert!(model.canvas(Slot::Source).tracker().overlay().is_none());
    assert_eq!(model.state(), WorkflowState::PartiallyLoaded);

    load(&mut model, Slot::Base, upload_file(400, 600));
    assert_eq!(model.state(), WorkflowState::ReadySelecting);
    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    assert_eq!(model.state(), WorkflowState::ReadyToSubmit);
    model.update(AppMessage::SetPrompt("add lace".into()));
    submit(&mut model);
}

#[test]
fn new_selection_after_result_keeps_preview_through_failure() {
    let mut model = loaded_model();
    drag(&mut model, Slot::Source, (50.0, 150.0), (250.0, 200.0));
    model.update(AppMessage::SetPrompt("add lace".into()));
    let (ticket, _) = submit(&mut model);
    let result = ImagePayload::encode_png(&DynamicImage::new_rgba8(40, 60)).unwrap();
    model.update(AppMessage::FusionFinished {
        ticket,
        result: Ok(FusionResponse::success(Some(result.clone()), Some(88))),
    });
    assert_eq!(model.state(), WorkflowState::Resulted);

    drag(&mut model, Slot::Source, (120.0, 130.0), (180.0, 180.0));
    assert_eq!(model.state(), WorkflowState::ReadyToSubmit);
    assert_eq!(model.selection().unwrap().extracted.region, CropRegion::new(240, 160, 120, 100));
    assert_eq!(model.preview().unwrap().payload, result);

    let (ticket, _) = submit(&mut model);
    model.update(AppMessage::FusionFinished {
        ticket,
        result: Err(RemoteCallError::Transport("timed out".into())),
    });
    assert_eq!(model.state(), WorkflowState::ReadyToSubmit);
    let preview = model.preview().unwrap();
    assert_eq!(preview.payload, result);
    assert!(preview.generated);
    assert_eq!(model.confidence(), 88);
}

#[test]
fn clear_notice_dismisses_toast() {
    let mut model = loaded_model();
    assert!(model.notice().is_some());
    model.update(AppMessage::ClearNotice);
    assert!(model.notice().is_none());

    model.update(AppMessage::Submit);
    assert!(notice_error(&model).is_some());
    model.update(AppMessage::ClearNotice);
    assert!(model.notice().is_none());
    assert_eq!(model.state(), WorkflowState::ReadySelecting);
}
