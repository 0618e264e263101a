use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    #[serde(rename = "3d-model")]
    ThreeDModel,
    AnalogFilm,
    Anime,
    Cinematic,
    ComicBook,
    DigitalArt,
    Enhance,
    #[default]
    FantasyArt,
    Isometric,
    LineArt,
    LowPoly,
    ModelingCompound,
    NeonPunk,
    Origami,
    Photographic,
    PixelArt,
    TileTexture,
}

impl StylePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            StylePreset::ThreeDModel => "3d-model",
            StylePreset::AnalogFilm => "analog-film",
            StylePreset::Anime => "anime",
            StylePreset::Cinematic => "cinematic",
            StylePreset::ComicBook => "comic-book",
            StylePreset::DigitalArt => "digital-art",
            StylePreset::Enhance => "enhance",
            StylePreset::FantasyArt => "fantasy-art",
            StylePreset::Isometric => "isometric",
            StylePreset::LineArt => "line-art",
            StylePreset::LowPoly => "low-poly",
            StylePreset::ModelingCompound => "modeling-compound",
            StylePreset::NeonPunk => "neon-punk",
            StylePreset::Origami => "origami",
            StylePreset::Photographic => "photographic",
            StylePreset::PixelArt => "pixel-art",
            StylePreset::TileTexture => "tile-texture",
        }
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text-to-image request, consumed once by the proxy call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub style_preset: StylePreset,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            output_format: OutputFormat::default(),
            style_preset: StylePreset::default(),
        }
    }

    pub fn with_style(mut self, style_preset: StylePreset) -> Self {
        self.style_preset = style_preset;
        self
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    /// Form fields in the order the image API expects them.
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            ("prompt", self.prompt.clone()),
            ("output_format", self.output_format.as_str().to_string()),
            ("style_preset", self.style_preset.as_str().to_string()),
        ]
    }

    pub fn to_form(&self) -> reqwest::multipart::Form {
        self.form_fields()
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                form.text(name, value)
            })
    }
}

/// A generated image held in memory until the next generation.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub image: Vec<u8>,
    pub object_url: String,
}

impl GenerationResult {
    pub fn new(image: Vec<u8>, origin: &str) -> Self {
        let object_url = format!(
            "blob:{}/{}",
            origin.trim_end_matches('/'),
            uuid::Uuid::new_v4()
        );
        Self { image, object_url }
    }

    pub fn len(&self) -> usize {
        self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }
}

/// JSON body returned by the proxy on failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// Error payload of the image API. Every field is optional; the API has
/// used several shapes over time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StabilityErrorPayload {
    #[serde(rename = "statusText")]
    pub status_text: Option<String>,
    pub message: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl StabilityErrorPayload {
    pub fn best_message(&self) -> Option<String> {
        let non_empty = |s: &Option<String>| s.as_ref().filter(|s| !s.is_empty()).cloned();

        non_empty(&self.status_text)
            .or_else(|| non_empty(&self.message))
            .or_else(|| {
                if self.errors.is_empty() {
                    None
                } else {
                    Some(self.errors.join("; "))
                }
            })
            .or_else(|| non_empty(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_matches_page_form() {
        let request = GenerationRequest::new("a wolf running in the moonlight");
        let fields = request.form_fields();
        assert_eq!(fields[0], ("prompt", "a wolf running in the moonlight".to_string()));
        assert_eq!(fields[1], ("output_format", "png".to_string()));
        assert_eq!(fields[2], ("style_preset", "fantasy-art".to_string()));
    }

    #[test]
    fn style_preset_serde_names() {
        let json = serde_json::to_string(&StylePreset::ThreeDModel).unwrap();
        assert_eq!(json, "\"3d-model\"");
        let parsed: StylePreset = serde_json::from_str("\"neon-punk\"").unwrap();
        assert_eq!(parsed, StylePreset::NeonPunk);
    }

    #[test]
    fn error_payload_prefers_status_text() {
        let payload: StabilityErrorPayload = serde_json::from_str(
            r#"{"statusText":"Forbidden","name":"unauthorized","errors":["bad key"]}"#,
        )
        .unwrap();
        assert_eq!(payload.best_message().as_deref(), Some("Forbidden"));

        let payload: StabilityErrorPayload =
            serde_json::from_str(r#"{"name":"bad_request","errors":["prompt: required"]}"#)
                .unwrap();
        assert_eq!(payload.best_message().as_deref(), Some("prompt: required"));

        let empty: StabilityErrorPayload = serde_json::from_str("{}").unwrap();
        assert!(empty.best_message().is_none());
    }

    #[test]
    fn object_url_is_blob_handle() {
        let result = GenerationResult::new(vec![1, 2, 3], "http://localhost:3000/");
        assert!(result.object_url.starts_with("blob:http://localhost:3000/"));
        assert_eq!(result.len(), 3);
    }
}
