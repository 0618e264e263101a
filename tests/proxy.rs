#![cfg(all(feature = "server", feature = "test-util"))]

use actix_web::{http::header, test, web, App, HttpRequest, HttpResponse, HttpServer};
use artwork_gnfd::{
    models::ErrorBody,
    server::{configure, AppState},
    testing::TINY_PNG,
    Config, StabilityConfig,
};

const BOUNDARY: &str = "----artworkboundary7MA4YWxkTrZu0gW";

async fn upstream_ok(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let accept = req.headers().get(header::ACCEPT).and_then(|v| v.to_str().ok());
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if auth != Some("Bearer sk-test") || accept != Some("image/*") {
        return HttpResponse::Unauthorized().json(serde_json::json!({"name": "unauthorized"}));
    }
    if !content_type.starts_with("multipart/form-data") {
        return HttpResponse::BadRequest().json(serde_json::json!({"errors": ["not a form"]}));
    }
    if !String::from_utf8_lossy(&body).contains("a wolf running in the moonlight") {
        return HttpResponse::BadRequest().json(serde_json::json!({"errors": ["prompt missing"]}));
    }

    HttpResponse::Ok()
        .content_type("image/png")
        .body(TINY_PNG.to_vec())
}

async fn upstream_rejects() -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "id": "c4b1e0",
        "name": "bad_request",
        "errors": ["style_preset: invalid value"]
    }))
}

async fn upstream_garbage() -> HttpResponse {
    HttpResponse::BadGateway()
        .content_type("text/html")
        .body("<html>upstream down</html>")
}

async fn upstream_empty() -> HttpResponse {
    HttpResponse::Ok().content_type("image/png").finish()
}

async fn spawn_upstream() -> String {
    let server = HttpServer::new(|| {
        App::new()
            .route("/ok", web::post().to(upstream_ok))
            .route("/reject", web::post().to(upstream_rejects))
            .route("/garbage", web::post().to(upstream_garbage))
            .route("/empty", web::post().to(upstream_empty))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}

fn form_body(prompt: &str) -> String {
    let mut body = String::new();
    for (name, value) in [
        ("prompt", prompt),
        ("output_format", "png"),
        ("style_preset", "fantasy-art"),
    ] {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        ));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    body
}

fn state_for(endpoint: String, api_key: Option<&str>) -> web::Data<AppState> {
    let mut stability = StabilityConfig::new().with_endpoint(endpoint);
    if let Some(key) = api_key {
        stability = stability.with_api_key(key);
    }
    let config = Config::new().with_stability(stability);
    web::Data::new(AppState::new(&config).unwrap())
}

fn generate_request(prompt: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/generate-image")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(form_body(prompt))
}

#[actix_web::test]
async fn success_returns_png_bytes() {
    let upstream = spawn_upstream().await;
    let app = test::init_service(
        App::new()
            .app_data(state_for(format!("{}/ok", upstream), Some("sk-test")))
            .configure(configure),
    )
    .await;

    let resp =
        test::call_service(&app, generate_request("a wolf running in the moonlight").to_request())
            .await;

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let body = test::read_body(resp).await;
    assert!(!body.is_empty());
    assert_eq!(&body[..], TINY_PNG);
}

#[actix_web::test]
async fn upstream_rejection_becomes_json_500() {
    let upstream = spawn_upstream().await;
    let app = test::init_service(
        App::new()
            .app_data(state_for(format!("{}/reject", upstream), Some("sk-test")))
            .configure(configure),
    )
    .await;

    let resp = test::call_service(&app, generate_request("anything").to_request()).await;
    assert_eq!(resp.status(), 500);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.error, "Stability API error: Bad Request");
}

#[actix_web::test]
async fn malformed_upstream_error_still_has_message() {
    let upstream = spawn_upstream().await;
    let app = test::init_service(
        App::new()
            .app_data(state_for(format!("{}/garbage", upstream), Some("sk-test")))
            .configure(configure),
    )
    .await;

    let resp = test::call_service(&app, generate_request("anything").to_request()).await;
    assert_eq!(resp.status(), 500);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert!(!body.error.is_empty());
    assert!(body.error.starts_with("Stability API error"));
}

#[actix_web::test]
async fn empty_success_body_is_an_error() {
    let upstream = spawn_upstream().await;
    let app = test::init_service(
        App::new()
            .app_data(state_for(format!("{}/empty", upstream), Some("sk-test")))
            .configure(configure),
    )
    .await;

    let resp = test::call_service(&app, generate_request("anything").to_request()).await;
    assert_eq!(resp.status(), 500);
}

#[actix_web::test]
async fn missing_secret_is_reported() {
    let upstream = spawn_upstream().await;
    let app = test::init_service(
        App::new()
            .app_data(state_for(format!("{}/ok", upstream), None))
            .configure(configure),
    )
    .await;

    let resp =
        test::call_service(&app, generate_request("a wolf running in the moonlight").to_request())
            .await;
    assert_eq!(resp.status(), 500);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert!(body.error.contains("STABILITY_API_KEY"));
}

#[actix_web::test]
async fn unreachable_upstream_is_reported() {
    let app = test::init_service(
        App::new()
            .app_data(state_for("http://127.0.0.1:9/none".to_string(), Some("sk-test")))
            .configure(configure),
    )
    .await;

    let resp = test::call_service(&app, generate_request("anything").to_request()).await;
    assert_eq!(resp.status(), 500);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert!(!body.error.is_empty());
}

#[actix_web::test]
async fn urlencoded_form_is_resent_as_multipart() {
    let upstream = spawn_upstream().await;
    let app = test::init_service(
        App::new()
            .app_data(state_for(format!("{}/ok", upstream), Some("sk-test")))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generate-image")
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload("prompt=a+wolf+running+in+the+moonlight&output_format=png&style_preset=anime")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], TINY_PNG);
}

#[actix_web::test]
async fn urlencoded_form_with_unknown_style_is_rejected() {
    let upstream = spawn_upstream().await;
    let app = test::init_service(
        App::new()
            .app_data(state_for(format!("{}/ok", upstream), Some("sk-test")))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generate-image")
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload("prompt=wolf&style_preset=watercolour")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert!(body.error.contains("invalid form"));
}

#[actix_web::test]
async fn health_lists_styles() {
    let app = test::init_service(
        App::new()
            .app_data(state_for("http://127.0.0.1:9/none".to_string(), None))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["api_key"], false);
    let styles = body["styles"].as_array().unwrap();
    assert_eq!(styles.len(), 17);
    assert!(styles.iter().any(|s| s == "fantasy-art"));
}

#[actix_web::test]
async fn non_form_body_rejected() {
    let upstream = spawn_upstream().await;
    let app = test::init_service(
        App::new()
            .app_data(state_for(format!("{}/ok", upstream), Some("sk-test")))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generate-image")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload(r#"{"prompt":"x"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
}
