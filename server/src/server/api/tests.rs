use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use image_processor::{CaptionFont, DEFAULT_FONT_SIZE};
use serde_json::Value;
use tower::ServiceExt;

use crate::app::SharedState;
use crate::config::{AppConfig, StorageMode};
use crate::server::router::create_router;
use crate::services::storage::{DiskStore, ImageStore, MemoryStore};

fn disk_app(dir: &tempfile::TempDir) -> Router {
    let config = AppConfig {
        output_dir: dir.path().join("generated"),
        data_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    let store = ImageStore::Disk(DiskStore::open(config.output_dir.clone()).unwrap());
    create_router(SharedState::new(
        config,
        store,
        CaptionFont::builtin(DEFAULT_FONT_SIZE),
    ))
}

fn memory_app() -> Router {
    let config = AppConfig {
        storage_mode: StorageMode::Memory,
        default_caption: StorageMode::Memory.default_caption().into(),
        ..AppConfig::default()
    };
    let store = ImageStore::Memory(MemoryStore::new(4, Duration::from_secs(60)));
    create_router(SharedState::new(
        config,
        store,
        CaptionFont::builtin(DEFAULT_FONT_SIZE),
    ))
}

fn form_post(body: &str) -> Request<Body> {
    Request::post("/generate")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn generate_without_url_is_bad_request() {
    let app = memory_app();
    let (status, body) = send_json(&app, form_post("headline=Hi")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "URL is required");

    let (status, _) = send_json(&app, form_post("url=%20%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_with_unsupported_body_is_bad_request() {
    let app = memory_app();
    let request = Request::post("/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"url":"https://example.com"}"#))
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn disk_generate_then_download_and_preview() {
    let dir = tempfile::tempdir().unwrap();
    let app = disk_app(&dir);

    let (status, body) = send_json(
        &app,
        form_post("url=https%3A%2F%2Fexample.com&headline=Example"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let filename = body["filename"].as_str().unwrap().to_string();
    assert!(filename.starts_with("qr_shreeram_") && filename.ends_with(".png"));
    assert_eq!(body["download_url"], format!("/download/{filename}"));
    assert_eq!(body["preview_url"], format!("/preview/{filename}"));
    assert!(body["size_kb"].as_f64().unwrap() > 0.0);
    assert!(dir.path().join("generated").join(&filename).is_file());

    let response = app
        .clone()
        .oneshot(get(&format!("/download/{filename}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(&format!("shreeram_qrcode_{filename}")));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));

    let (status, bytes) = send(&app, get(&format!("/preview/{filename}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(bytes.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn memory_generate_returns_data_url_and_caches() {
    let app = memory_app();

    let (status, body) = send_json(&app, form_post("url=https%3A%2F%2Fexample.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let id = body["qr_id"].as_str().unwrap().to_string();
    assert!(id.starts_with("qr_"));
    assert!(
        body["data_url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );

    let response = app
        .clone()
        .oneshot(get(&format!("/download/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains(&format!("shreeram_qr_{id}.png")));

    let (status, gallery) = send_json(&app, get("/gallery")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gallery["count"], 1);
    assert_eq!(gallery["qr_codes"][0]["id"], id.as_str());
    assert_eq!(gallery["qr_codes"][0]["created"], "Recently generated");
}

#[tokio::test]
async fn multipart_body_is_accepted() {
    let app = memory_app();
    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"url\"\r\n\r\nhttps://example.com\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"box_size\"\r\n\r\n5\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::post("/generate")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn invalid_color_is_server_error() {
    let app = memory_app();
    let (status, body) = send_json(&app, form_post("url=x&fill_color=notacolor")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to generate QR code:")
    );
}

#[tokio::test]
async fn unknown_download_is_not_found_in_both_modes() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send_json(&disk_app(&dir), get("/download/missing.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File not found");

    let (status, body) = send_json(&memory_app(), get("/download/qr_missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "QR code not found or expired");
}

#[tokio::test]
async fn traversal_names_are_not_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("secret.png"), b"secret").unwrap();
    let app = disk_app(&dir);
    let (status, _) = send_json(&app, get("/preview/..%2Fsecret.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn disk_gallery_lists_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let app = disk_app(&dir);

    let (_, empty) = send_json(&app, get("/gallery")).await;
    assert_eq!(empty["count"], 0);

    let mut generated = Vec::new();
    for round in 0..2 {
        if round > 0 {
            // file times and name timestamps have one-second resolution on some filesystems
            tokio::time::sleep(Duration::from_millis(1100)).await;
        }
        let (status, body) = send_json(&app, form_post("url=https%3A%2F%2Fexample.com")).await;
        assert_eq!(status, StatusCode::OK);
        generated.push(body["filename"].as_str().unwrap().to_string());
    }
    let (status, gallery) = send_json(&app, get("/gallery")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gallery["count"], 2);
    assert_eq!(gallery["files"][0]["filename"], generated[1].as_str());
    assert_eq!(gallery["files"][1]["filename"], generated[0].as_str());
    assert!(gallery["files"][0]["created"].is_string());
}

#[tokio::test]
async fn jpeg_files_are_served_as_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let app = disk_app(&dir);
    std::fs::write(dir.path().join("generated").join("scan.jpg"), b"\xff\xd8\xff").unwrap();

    for uri in ["/preview/scan.jpg", "/download/scan.jpg"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/jpeg"
        );
    }
}

#[tokio::test]
async fn self_test_reports_storage() {
    let (status, body) = send_json(&memory_app(), get("/test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "working");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["builtin_font"], true);
    assert_eq!(body["capacity"], 4);

    let dir = tempfile::tempdir().unwrap();
    let (_, body) = send_json(&disk_app(&dir), get("/test")).await;
    assert_eq!(body["storage"], "disk");
    assert_eq!(body["output_dir_exists"], true);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let (status, body) = send_json(&memory_app(), get("/no/such/page")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Page not found");
}
