// SPDX-License-Identifier: GPL-3.0-or-later
// tests/common/mod.rs
//
// Shared fixtures for the workflow tests.

#![allow(dead_code)]

use image::{DynamicImage, Rgba, RgbaImage};

use imagefuse::app::view::crop::PointerEvent;
use imagefuse::app::{AppMessage, AppModel, Slot, UpdateResult};
use imagefuse::domain::document::{ImageHandle, ImagePayload, SourceFile};
use imagefuse::domain::viewport::Point;

/// Pixel at native `(x, y)` of [`pattern`] images.
pub fn pattern_pixel(x: u32, y: u32) -> Rgba<u8> {
    Rgba([(x / 3) as u8, (y / 3) as u8, 40, 255])
}

/// Position-coded test image, up to 765 pixels per axis.
pub fn pattern(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, pattern_pixel))
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    ImagePayload::encode_png(&pattern(width, height))
        .unwrap()
        .bytes
}

pub fn upload_file(width: u32, height: u32) -> SourceFile {
    SourceFile::new(png(width, height), Some("image/png"))
}

/// Upload and decode synchronously.
pub fn load(model: &mut AppModel, slot: Slot, file: SourceFile) {
    let UpdateResult::Decode { slot, ticket, file } =
        model.update(AppMessage::Upload { slot, file })
    else {
        panic!("upload did not request a decode");
    };
    let result = ImageHandle::decode(&file);
    assert!(matches!(
        model.update(AppMessage::ImageDecoded {
            slot,
            ticket,
            result
        }),
        UpdateResult::None
    ));
}

pub fn drag(model: &mut AppModel, slot: Slot, from: (f32, f32), to: (f32, f32)) {
    for event in [
        PointerEvent::Down(Point::new(from.0, from.1)),
        PointerEvent::Move(Point::new(to.0, to.1)),
        PointerEvent::Up,
    ] {
        model.update(AppMessage::Pointer { slot, event });
    }
}

/// Base 400x600 and source 600x400 on the default 300x300 surfaces.
pub fn loaded_model() -> AppModel {
    let mut model = AppModel::new(&imagefuse::AppConfig::default());
    load(&mut model, Slot::Base, upload_file(400, 600));
    load(&mut model, Slot::Source, upload_file(600, 400));
    model
}
