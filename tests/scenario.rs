#![cfg(all(feature = "server", feature = "test-util"))]

use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use artwork_gnfd::{
    server::{configure, AppState},
    testing::{MockAuth, MockCall, MockGreenfield, MockWallet, TEST_TX_HASH, TINY_PNG},
    upload::STATUS_DONE,
    ArtworkSession, Config, GreenfieldConfig, ProxyClient, StabilityConfig, Uploader,
};

async fn stability_png() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("image/png")
        .body(TINY_PNG.to_vec())
}

async fn stability_forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(serde_json::json!({"name": "forbidden"}))
}

/// Fake image API plus a real proxy server in front of it.
async fn spawn_stack(upstream_path: &'static str) -> String {
    let upstream = HttpServer::new(|| {
        App::new()
            .route("/ok", web::post().to(stability_png))
            .route("/forbidden", web::post().to(stability_forbidden))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let upstream_addr = upstream.addrs()[0];
    actix_web::rt::spawn(upstream.run());

    let config = Config::new().with_stability(
        StabilityConfig::new()
            .with_api_key("sk-test")
            .with_endpoint(format!("http://{}{}", upstream_addr, upstream_path)),
    );
    let state = web::Data::new(AppState::new(&config).unwrap());
    let proxy = HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let proxy_addr = proxy.addrs()[0];
    actix_web::rt::spawn(proxy.run());

    format!("http://{}", proxy_addr)
}

fn uploader(mock: Arc<MockGreenfield>, wallet: Arc<MockWallet>) -> Uploader {
    Uploader::new(
        Arc::new(GreenfieldConfig::new()),
        mock,
        wallet,
        Arc::new(MockAuth::new("http://localhost:3000")),
    )
}

#[actix_web::test]
async fn wolf_prompt_generates_and_uploads() {
    let base_url = spawn_stack("/ok").await;
    let proxy = ProxyClient::new(base_url);

    let mut session = ArtworkSession::new();
    session.set_prompt("a wolf running in the moonlight");
    session.generate(&proxy).await;

    assert!(session.error.is_empty(), "unexpected error: {}", session.error);
    let image = session.image.clone().unwrap();
    assert_eq!(image.image, TINY_PNG);
    assert!(image.object_url.starts_with("blob:"));

    let mock = Arc::new(MockGreenfield::new().with_existing_bucket("ai-socia-demo"));
    let wallet = Arc::new(MockWallet::connected(5600));
    let uploader = uploader(mock.clone(), wallet);

    let outcome = session.upload(&uploader).await.unwrap();

    assert_eq!(session.upload_status, STATUS_DONE);
    assert_eq!(session.upload_status, "上传完成！");
    assert!(session.error.is_empty());
    assert_eq!(outcome.transaction_hash, TEST_TX_HASH);
    assert_eq!(outcome.target.content_type, "image/png");
    assert!(outcome.target.object_name.starts_with("artwork-"));

    let calls = mock.calls();
    let payload_size = calls.iter().find_map(|c| match c {
        MockCall::CreateObjectChecksums { payload_size, .. } => Some(*payload_size),
        _ => None,
    });
    assert_eq!(payload_size, Some(TINY_PNG.len() as u64));

    // Object creation is broadcast before the upload references its hash.
    let create_idx = calls
        .iter()
        .position(|c| matches!(c, MockCall::Broadcast { kind: "create_object", .. }))
        .unwrap();
    let upload_idx = calls
        .iter()
        .position(|c| matches!(c, MockCall::Upload { .. }))
        .unwrap();
    assert!(create_idx < upload_idx);
}

#[actix_web::test]
async fn upstream_failure_surfaces_in_session() {
    let base_url = spawn_stack("/forbidden").await;
    let proxy = ProxyClient::new(base_url);

    let mut session = ArtworkSession::new();
    session.set_prompt("a wolf running in the moonlight");
    session.generate(&proxy).await;

    assert_eq!(session.error, "Stability API error: Forbidden");
    assert!(session.image.is_none());
    assert!(!session.loading);
}

#[actix_web::test]
async fn rejected_upload_code_reports_message_and_clears_status() {
    let base_url = spawn_stack("/ok").await;
    let proxy = ProxyClient::new(base_url);

    let mut session = ArtworkSession::new();
    session.set_prompt("a wolf running in the moonlight");
    session.generate(&proxy).await;

    let mock = Arc::new(
        MockGreenfield::new().with_upload_response(7, Some("object is not in created status")),
    );
    let uploader = uploader(mock.clone(), Arc::new(MockWallet::connected(5600)));

    assert!(session.upload(&uploader).await.is_none());
    assert!(session.error.contains("object is not in created status"));
    assert!(session.upload_status.is_empty());
    // The object record stays on chain; nothing rolls it back.
    assert_eq!(mock.uploads().len(), 1);
}
