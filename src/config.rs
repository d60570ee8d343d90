// SPDX-License-Identifier: GPL-3.0-or-later
// src/config.rs
//
// Global configuration for the workbench, read from a YAML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::constant::{
    CONFIG_DIR, CONFIG_FILE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SURFACE_EDGE,
    MIN_SELECTION_SIZE,
};
use crate::domain::fusion::FusionParameters;
use crate::domain::viewport::SurfaceSize;

/// Global configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Slider positions for a fresh session.
    pub default_parameters: FusionParameters,
    /// Selections must exceed this many display pixels on both axes.
    pub min_selection_size: f32,
    /// Initial canvas width in pixels.
    pub surface_width: u32,
    /// Initial canvas height in pixels.
    pub surface_height: u32,
    /// Fusion endpoint, e.g. `http://localhost:3000/api/fusion`.
    pub endpoint: Option<String>,
    /// Timeout for one fusion call in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_parameters: FusionParameters::default(),
            min_selection_size: MIN_SELECTION_SIZE,
            surface_width: DEFAULT_SURFACE_EDGE,
            surface_height: DEFAULT_SURFACE_EDGE,
            endpoint: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Platform default location, e.g. `~/.config/imagefuse/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location.
    ///
    /// A missing default file yields the defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config.normalized())
    }

    /// Clamp values that would break the workflow.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.default_parameters = self.default_parameters.clamped();
        if !self.min_selection_size.is_finite() || self.min_selection_size < 0.0 {
            self.min_selection_size = MIN_SELECTION_SIZE;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        self
    }

    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.surface_width, self.surface_height)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
