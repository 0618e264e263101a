use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde_json::json;

use super::AppState;
use crate::{
    error::{ArtworkError, Result},
    models::{ErrorBody, GenerationRequest, IMAGE_PNG},
    stability::StabilityClient,
};

/// Forward the submitted form to the image API and answer with the PNG.
pub async fn generate_image(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    match forward(&req, body, &state).await {
        Ok(image) => HttpResponse::Ok().content_type(IMAGE_PNG).body(image),
        Err(e) => {
            log::error!("Image generation failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorBody {
                error: e.to_string(),
            })
        }
    }
}

async fn forward(req: &HttpRequest, body: web::Bytes, state: &AppState) -> Result<Vec<u8>> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        return state
            .stability
            .image()
            .forward(content_type, body.to_vec())
            .await;
    }

    // Urlencoded forms are re-sent as multipart.
    if content_type.starts_with("application/x-www-form-urlencoded") {
        let fields = std::str::from_utf8(&body)
            .map_err(|e| ArtworkError::RequestError(format!("form body is not utf-8: {}", e)))?;
        let request = web::Query::<GenerationRequest>::from_query(fields)
            .map_err(|e| ArtworkError::RequestError(format!("invalid form: {}", e)))?
            .into_inner();
        return state.stability.image().generate(request).await;
    }

    Err(ArtworkError::RequestError("expected a form body".into()))
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "upstream": state.stability.image().endpoint(),
        "api_key": state.stability.image().has_api_key(),
        "styles": StabilityClient::supported_styles(),
    }))
}
