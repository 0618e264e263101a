pub mod image_client;

use crate::{config::StabilityConfig, error::Result};
use reqwest::Client;

pub use image_client::ImageClient;

/// Entry point to the Stability image API.
#[derive(Clone)]
pub struct StabilityClient {
    image_client: ImageClient,
}

impl StabilityClient {
    pub fn new(config: StabilityConfig) -> Result<Self> {
        if config.api_key.is_none() {
            log::warn!("STABILITY_API_KEY is not set, image generation will fail");
        }

        // No request timeout: generation can take a long time.
        let client = Client::builder().build()?;

        Ok(Self {
            image_client: ImageClient::new(client, &config),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn supported_styles() -> Vec<&'static str> {
        use crate::models::StylePreset::*;
        [
            ThreeDModel,
            AnalogFilm,
            Anime,
            Cinematic,
            ComicBook,
            DigitalArt,
            Enhance,
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
        ]
        .iter()
        .map(|s| s.as_str())
        .collect()
    }
}
