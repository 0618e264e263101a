use crate::{
    config::StabilityConfig,
    error::{ArtworkError, Result},
    models::{GenerationRequest, StabilityErrorPayload},
};
use reqwest::{header, Client, RequestBuilder, StatusCode};

/// Shown when the image API fails without any readable reason.
pub const UNKNOWN_UPSTREAM_ERROR: &str = "发生未知错误，请稍后再试。";

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ImageClient {
    pub fn new(client: Client, config: &StabilityConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the multipart form for `request` and return the image bytes.
    pub async fn generate(&self, request: GenerationRequest) -> Result<Vec<u8>> {
        if request.prompt.trim().is_empty() {
            return Err(ArtworkError::RequestError("prompt must not be empty".into()));
        }

        log::info!(
            "Generating image: style={} format={}",
            request.style_preset,
            request.output_format.as_str()
        );

        let builder = self.client.post(&self.endpoint).multipart(request.to_form());
        self.send(builder).await
    }

    /// Pass an already encoded form body through untouched.
    pub async fn forward(&self, content_type: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        log::debug!("Forwarding {} byte form ({})", body.len(), content_type);

        let builder = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, content_type)
            .body(body);
        self.send(builder).await
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ArtworkError::ConfigError("STABILITY_API_KEY is not set".into()))?;

        let _timer = crate::logger::timer("stability image request");

        let response = builder
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
            .header(header::ACCEPT, "image/*")
            .send()
            .await
            .map_err(|e| {
                log::error!("Image API request failed: {}", e);
                ArtworkError::RequestError(e.to_string())
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ArtworkError::ResponseError(e.to_string()))?;

        if !status.is_success() {
            let message = upstream_error_message(status, &bytes);
            log::error!("Image API returned {}: {}", status.as_u16(), message);
            return Err(ArtworkError::UpstreamError(message));
        }

        if bytes.is_empty() {
            return Err(ArtworkError::ResponseError("No image generated".into()));
        }

        log::info!("Image API returned {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Status text first, then whatever the error payload carries, then the
/// generic fallback.
pub fn upstream_error_message(status: StatusCode, body: &[u8]) -> String {
    let payload = match serde_json::from_slice::<StabilityErrorPayload>(body) {
        Ok(payload) => {
            log::debug!("Image API error payload: {}", String::from_utf8_lossy(body));
            Some(payload)
        }
        Err(e) => {
            log::warn!("Image API error body is not JSON: {}", e);
            None
        }
    };

    status
        .canonical_reason()
        .map(str::to_string)
        .or_else(|| payload.and_then(|p| p.best_message()))
        .unwrap_or_else(|| UNKNOWN_UPSTREAM_ERROR.to_string())
}
