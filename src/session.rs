use crate::{
    models::{GenerationRequest, GenerationResult, StylePreset},
    proxy::ImageGenerator,
    upload::{UploadOutcome, Uploader},
};

/// State behind the generate page: one prompt, at most one image, and the
/// messages shown next to them.
#[derive(Debug, Default)]
pub struct ArtworkSession {
    pub prompt: String,
    pub style_preset: StylePreset,
    pub loading: bool,
    pub uploading: bool,
    pub error: String,
    pub image: Option<GenerationResult>,
    pub upload_status: String,
}

impl ArtworkSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Generate an image for the current prompt, replacing any previous one.
    pub async fn generate(&mut self, generator: &dyn ImageGenerator) {
        self.loading = true;
        self.error.clear();

        let request = GenerationRequest::new(self.prompt.clone()).with_style(self.style_preset);
        match generator.generate(request).await {
            Ok(result) => {
                log::info!("Generated image available at {}", result.object_url);
                self.image = Some(result);
            }
            Err(e) => {
                log::warn!("Image generation failed: {}", e);
                self.error = e.user_message();
            }
        }

        self.loading = false;
    }

    /// Upload the current image. Ignored while an upload is running.
    pub async fn upload(&mut self, uploader: &Uploader) -> Option<UploadOutcome> {
        if self.uploading {
            log::warn!("Upload already in progress");
            return None;
        }

        self.uploading = true;
        self.error.clear();

        let result = uploader.run(self.image.as_ref()).await;
        self.upload_status = uploader.progress().status;

        let outcome = match result {
            Ok(outcome) => {
                log::info!(
                    "Uploaded {}/{} ({} bytes)",
                    outcome.target.bucket_name,
                    outcome.target.object_name,
                    self.image.as_ref().map(|i| i.len()).unwrap_or(0)
                );
                Some(outcome)
            }
            Err(e) => {
                self.error = e.user_message();
                self.upload_status.clear();
                None
            }
        };

        self.uploading = false;
        outcome
    }
}
