// SPDX-License-Identifier: GPL-3.0-or-later
// src/constant.rs
//
// Application constants that should not be changed by the user.

/// Lower bound for the fit scale (prevents division by zero on empty surfaces).
pub const SCALE_EPSILON: f32 = 0.0001;

/// Selections must exceed this size on both axes (display pixels) to commit.
pub const MIN_SELECTION_SIZE: f32 = 20.0;

/// Upper bound of every fusion parameter slider.
pub const PARAMETER_MAX: u8 = 100;

/// Default fabric weight slider position.
pub const DEFAULT_FABRIC_WEIGHT: u8 = 65;

/// Default drape match slider position.
pub const DEFAULT_DRAPE_MATCH: u8 = 85;

/// Default seamless blend slider position.
pub const DEFAULT_SEAMLESS_BLEND: u8 = 92;

/// Confidence shown before the first fusion result arrives.
pub const INITIAL_CONFIDENCE: u8 = 98;

/// Default display surface edge in pixels (square source canvas).
pub const DEFAULT_SURFACE_EDGE: u32 = 300;

/// Default timeout for one remote fusion call in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Config directory name below the platform config dir.
pub const CONFIG_DIR: &str = "imagefuse";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";

/// MIME types accepted from the file source.
pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg", "image/webp"];
