// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/fusion.rs
//
// Fusion request/response model and the remote service contract.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::constant::{
    DEFAULT_DRAPE_MATCH, DEFAULT_FABRIC_WEIGHT, DEFAULT_SEAMLESS_BLEND, PARAMETER_MAX,
};
use crate::domain::document::{CropRegion, ImageId, ImagePayload};
use crate::error::RemoteCallError;

/// One of the three blend sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionParameter {
    FabricWeight,
    DrapeMatch,
    SeamlessBlend,
}

/// Blend sliders, each an integer percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionParameters {
    pub fabric_weight: u8,
    pub drape_match: u8,
    pub seamless_blend: u8,
}

impl Default for FusionParameters {
    fn default() -> Self {
        Self {
            fabric_weight: DEFAULT_FABRIC_WEIGHT,
            drape_match: DEFAULT_DRAPE_MATCH,
            seamless_blend: DEFAULT_SEAMLESS_BLEND,
        }
    }
}

impl FusionParameters {
    /// Set one slider, clamping into range.
    pub fn set(&mut self, parameter: FusionParameter, value: u8) {
        let value = value.min(PARAMETER_MAX);
        match parameter {
            FusionParameter::FabricWeight => self.fabric_weight = value,
            FusionParameter::DrapeMatch => self.drape_match = value,
            FusionParameter::SeamlessBlend => self.seamless_blend = value,
        }
    }

    pub fn get(&self, parameter: FusionParameter) -> u8 {
        match parameter {
            FusionParameter::FabricWeight => self.fabric_weight,
            FusionParameter::DrapeMatch => self.drape_match,
            FusionParameter::SeamlessBlend => self.seamless_blend,
        }
    }

    /// Copy with every slider clamped into range (for values read from config).
    #[must_use]
    pub fn clamped(self) -> Self {
        let mut out = Self::default();
        out.set(FusionParameter::FabricWeight, self.fabric_weight);
        out.set(FusionParameter::DrapeMatch, self.drape_match);
        out.set(FusionParameter::SeamlessBlend, self.seamless_blend);
        out
    }
}

/// Native-space selection, tagged with the image it was drawn on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSelection {
    pub region: CropRegion,
    pub image_id: ImageId,
    /// Content digest of the tagged image, used as the wire identity.
    pub image_digest: String,
}

/// Everything the fusion service needs for one composition.
#[derive(Debug, Clone)]
pub struct FusionRequest {
    pub base: ImagePayload,
    pub source: ImagePayload,
    pub selection: NativeSelection,
    pub detail: ImagePayload,
    pub prompt: String,
    pub parameters: FusionParameters,
}

/// What the fusion service answered.
#[derive(Debug, Clone, Default)]
pub struct FusionResponse {
    pub success: bool,
    pub result_image: Option<ImagePayload>,
    pub confidence: Option<u8>,
    pub error: Option<String>,
}

impl FusionResponse {
    pub fn success(result_image: Option<ImagePayload>, confidence: Option<u8>) -> Self {
        Self {
            success: true,
            result_image,
            confidence,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// The remote image-generation service.
///
/// Calls are latent and fallible. Implementations are driven from a
/// single-threaded event loop, so the returned future need not be `Send`.
pub trait FusionService {
    fn fuse(
        &self,
        request: FusionRequest,
    ) -> impl Future<Output = Result<FusionResponse, RemoteCallError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_sliders() {
        let p = FusionParameters::default();
        assert_eq!((p.fabric_weight, p.drape_match, p.seamless_blend), (65, 85, 92));
    }

    #[test]
    fn set_clamps_to_hundred() {
        let mut p = FusionParameters::default();
        p.set(FusionParameter::DrapeMatch, 250);
        p.set(FusionParameter::FabricWeight, 0);
        assert_eq!(p.get(FusionParameter::DrapeMatch), 100);
        assert_eq!(p.get(FusionParameter::FabricWeight), 0);
        assert_eq!(p.get(FusionParameter::SeamlessBlend), 92);
    }

    #[test]
    fn clamped_fixes_out_of_range_config() {
        let p = FusionParameters {
            fabric_weight: 101,
            drape_match: 3,
            seamless_blend: 255,
        }
        .clamped();
        assert_eq!((p.fabric_weight, p.drape_match, p.seamless_blend), (100, 3, 100));
    }
}
