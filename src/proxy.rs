use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::{ArtworkError, Result},
    models::{ErrorBody, GenerationRequest, GenerationResult},
};

pub const GENERATE_PATH: &str = "/api/generate-image";

/// Shown when the proxy fails without an `error` field.
pub const GENERATION_FAILED: &str = "生成图片失败";

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult>;
}

/// Calls the generation route of a running proxy server.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, GENERATE_PATH)
    }
}

#[async_trait]
impl ImageGenerator for ProxyClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        let response = self
            .client
            .post(self.url())
            .multipart(request.to_form())
            .send()
            .await?;

        if !response.status().is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .map(|body| body.error)
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| GENERATION_FAILED.to_string());
            return Err(ArtworkError::GenerationFailed(message));
        }

        let bytes = response.bytes().await?;
        log::info!("Received {} byte image from proxy", bytes.len());
        Ok(GenerationResult::new(bytes.to_vec(), &self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_route() {
        let client = ProxyClient::new("http://127.0.0.1:3000/");
        assert_eq!(client.url(), "http://127.0.0.1:3000/api/generate-image");
    }
}
