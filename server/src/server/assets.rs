//! Embedded web page and static files (`server/web/`).

use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;
use serde_json::json;

#[derive(Embed)]
#[folder = "web/"]
struct WebAssets;

/// GET / – the generator form.
pub async fn index() -> Response {
    serve_embedded("index.html").unwrap_or_else(not_found)
}

/// Fallback handler: embedded static file by path, otherwise JSON 404.
pub async fn static_fallback(uri: Uri) -> Response {
    let request_path = uri.path().trim_start_matches('/');
    if request_path.is_empty() {
        return index().await;
    }
    serve_embedded(request_path).unwrap_or_else(not_found)
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({ "error": "Page not found" })),
    )
        .into_response()
}

fn serve_embedded(path: &str) -> Option<Response> {
    let content = WebAssets::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref())],
            content.data.to_vec(),
        )
            .into_response(),
    )
}

#[cfg(test)]
mod tests {
    use super::{index, static_fallback};
    use axum::body::to_bytes;
    use axum::http::{StatusCode, Uri, header};

    #[tokio::test]
    async fn index_serves_html_form() {
        let response = index().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("name=\"url\""));
    }

    #[tokio::test]
    async fn script_is_served_with_js_mime() {
        let response = static_fallback(Uri::from_static("/js/main.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let mime = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(mime.to_str().unwrap().contains("javascript"));
    }

    #[tokio::test]
    async fn unknown_path_returns_json_404() {
        let response = static_fallback(Uri::from_static("/nope/nothing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], "Page not found");
    }
}
