//! Client for the remote jewelry image generation service.
//!
//! The service exposes a single endpoint, `POST {api_url}/generate_image`,
//! taking `{ "prompt": "..." }` and answering `{ "image_base64": "..." }`.
//! One attempt per call: no retry, no timeout.

use std::sync::Arc;

use async_trait::async_trait;
use base64::alphabet::STANDARD as STANDARD_ALPHABET;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use log::{error, info};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ExportError, GenerationError};
use crate::models::{DesignParameters, GeneratedArtifact};
use crate::prompts::build_prompt;

/// Path appended to the configured API URL
pub const GENERATE_IMAGE_PATH: &str = "generate_image";

/// Prefix of every image reference the studio produces
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Standard alphabet, padding optional
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &STANDARD_ALPHABET,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Status and raw body of an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP seam used by [`DesignRequestService`].
#[async_trait]
pub trait ImageTransport: Send + Sync {
    /// POSTs `body` as JSON to `url`.
    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, GenerationError>;
}

/// [`ImageTransport`] over a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses an existing client (connection pooling)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, GenerationError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(format!("Failed to read response: {}", e)))?;

        Ok(TransportResponse { status, body })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateImageResponse {
    image_base64: Option<String>,
}

/// Turns design parameters into generated artifacts.
#[derive(Clone)]
pub struct DesignRequestService {
    transport: Arc<dyn ImageTransport>,
}

impl DesignRequestService {
    pub fn new(transport: Arc<dyn ImageTransport>) -> Self {
        Self { transport }
    }

    /// Service talking HTTP through reqwest
    pub fn over_http() -> Self {
        Self::new(Arc::new(ReqwestTransport::new()))
    }

    /// Generates one image for `params` from the service at `api_url`.
    pub async fn generate(
        &self,
        api_url: &str,
        params: &DesignParameters,
    ) -> Result<GeneratedArtifact, GenerationError> {
        let url = generate_image_url(api_url)?;
        let prompt = build_prompt(params);

        info!("[generate] Sending prompt: {}", prompt);
        info!("[generate] API URL: {}", url);

        let response = self
            .transport
            .post_json(&url, &json!({ "prompt": prompt }))
            .await
            .inspect_err(|e| error!("[generate] {}", e))?;

        info!("[generate] Response status: {}", response.status);

        if !response.is_success() {
            error!("[generate] API error: {} - {}", response.status, response.body);
            return Err(GenerationError::RequestFailed {
                status: response.status,
                body: response.body,
            });
        }

        let image_data = parse_generate_response(&response.body)
            .inspect_err(|e| error!("[generate] {}", e))?;

        info!("[generate] Image received ({} chars)", image_data.len());
        Ok(GeneratedArtifact { image_data, prompt })
    }
}

/// Builds the endpoint URL, rejecting a blank API URL
pub fn generate_image_url(api_url: &str) -> Result<String, GenerationError> {
    let trimmed = api_url.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::InvalidEndpoint);
    }
    let base = trimmed.strip_suffix('/').unwrap_or(trimmed);
    Ok(format!("{}/{}", base, GENERATE_IMAGE_PATH))
}

/// Extracts the image payload from a 2xx body as a PNG data URI
fn parse_generate_response(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateImageResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

    let payload = parsed
        .image_base64
        .filter(|p| !p.is_empty())
        .ok_or_else(|| GenerationError::MalformedResponse("No image_base64 in response".to_string()))?;

    Ok(to_data_uri(&payload))
}

/// Wraps a base64 PNG payload as a data URI
pub fn to_data_uri(base64_payload: &str) -> String {
    format!("{}{}", PNG_DATA_URI_PREFIX, base64_payload)
}

/// Decodes the bytes behind a base64 data URI.
///
/// Line breaks and missing padding in the payload are accepted.
pub fn decode_data_uri(image_data: &str) -> Result<Vec<u8>, ExportError> {
    let (header, payload) = image_data
        .split_once(',')
        .ok_or_else(|| ExportError::InvalidImage("not a data URI".to_string()))?;
    if !header.starts_with("data:") || !header.ends_with(";base64") {
        return Err(ExportError::InvalidImage(format!(
            "unsupported image reference: {}",
            header
        )));
    }
    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    LENIENT_BASE64
        .decode(&compact)
        .map_err(|e| ExportError::InvalidImage(format!("failed to decode image: {}", e)))
}
