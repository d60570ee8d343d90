// SPDX-License-Identifier: GPL-3.0-or-later
// src/service/http.rs
//
// JSON-over-HTTP client for the fusion endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::document::ImagePayload;
use crate::domain::fusion::{FusionRequest, FusionResponse, FusionService};
use crate::error::RemoteCallError;

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    base_image: String,
    source_image: String,
    detail_image: String,
    selection_box: WireSelectionBox,
    prompt: String,
    parameters: WireParameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireSelectionBox {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    image_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireParameters {
    fabric_weight: u8,
    drape_match: u8,
    seamless_blend: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireResponse {
    success: bool,
    result_image: Option<String>,
    confidence: Option<f64>,
    error: Option<String>,
    has_generated_image: Option<bool>,
    analysis: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireHealth {
    status: String,
}

impl From<&FusionRequest> for WireRequest {
    fn from(request: &FusionRequest) -> Self {
        let region = request.selection.region;
        Self {
            base_image: request.base.to_data_url(),
            source_image: request.source.to_data_url(),
            detail_image: request.detail.to_data_url(),
            selection_box: WireSelectionBox {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                image_id: request.selection.image_digest.clone(),
            },
            prompt: request.prompt.trim().to_string(),
            parameters: WireParameters {
                fabric_weight: request.parameters.fabric_weight,
                drape_match: request.parameters.drape_match,
                seamless_blend: request.parameters.seamless_blend,
            },
        }
    }
}

impl WireResponse {
    fn into_response(self) -> Result<FusionResponse, RemoteCallError> {
        if !self.success {
            return Ok(FusionResponse::failure(
                self.error
                    .unwrap_or_else(|| "An unknown error occurred during fusion".to_string()),
            ));
        }

        if let Some(analysis) = &self.analysis {
            log::debug!("Fusion analysis: {analysis}");
        }

        // The endpoint echoes the base image when nothing was generated.
        let result_image = match (self.result_image, self.has_generated_image) {
            (_, Some(false)) | (None, _) => None,
            (Some(url), _) => Some(ImagePayload::from_data_url(&url).ok_or_else(|| {
                RemoteCallError::Malformed("resultImage is not a base64 data URL".to_string())
            })?),
        };

        Ok(FusionResponse::success(
            result_image,
            self.confidence.map(confidence_percent),
        ))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn confidence_percent(value: f64) -> u8 {
    if value.is_finite() {
        value.round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

// =============================================================================
// Client
// =============================================================================

/// Talks to a fusion endpoint such as `http://localhost:3000/api/fusion`.
#[derive(Debug, Clone)]
pub struct HttpFusionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFusionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RemoteCallError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteCallError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query the endpoint's health check.
    pub async fn health(&self) -> Result<bool, RemoteCallError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| RemoteCallError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let body: WireHealth = response
            .json()
            .await
            .map_err(|e| RemoteCallError::Malformed(e.to_string()))?;
        Ok(body.status == "ok")
    }

    async fn post(&self, request: &FusionRequest) -> Result<FusionResponse, RemoteCallError> {
        let wire = WireRequest::from(request);
        log::debug!(
            "POST {} (prompt {} chars, box {}x{})",
            self.endpoint,
            wire.prompt.len(),
            wire.selection_box.width,
            wire.selection_box.height
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&wire)
            .send()
            .await
            .map_err(|e| RemoteCallError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteCallError::Transport(e.to_string()))?;

        parse_body(status.as_u16(), status.is_success(), &body)
    }
}

/// Map an HTTP status and body onto the response model.
fn parse_body(status: u16, ok: bool, body: &str) -> Result<FusionResponse, RemoteCallError> {
    match serde_json::from_str::<WireResponse>(body) {
        Ok(wire) if ok => wire.into_response(),
        Ok(wire) => Err(RemoteCallError::Rejected(
            wire.error.unwrap_or_else(|| format!("HTTP {status}")),
        )),
        Err(_) if !ok => Err(RemoteCallError::Rejected(format!("HTTP {status}"))),
        Err(e) => Err(RemoteCallError::Malformed(e.to_string())),
    }
}

impl FusionService for HttpFusionClient {
    async fn fuse(&self, request: FusionRequest) -> Result<FusionResponse, RemoteCallError> {
        self.post(&request).await
    }
}
