//! QR generation endpoint.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use axum::Json;
use axum::extract::{Form, FromRequest, Multipart, Request, State};
use axum::http::header;
use image_engine::qr::{DEFAULT_BORDER, DEFAULT_BOX_SIZE};
use image_processor::png_data_url;
use serde_json::json;

use crate::app::SharedState;
use crate::services::generator::{self, QrRequest};
use crate::services::storage::{ImageStore, size_kb};

use super::{ApiError, ApiResult, err_json};

pub const DEFAULT_FILL_COLOR: &str = "#000000";
pub const DEFAULT_BACK_COLOR: &str = "#ffffff";
const BOX_SIZE_RANGE: RangeInclusive<u32> = 1..=50;
const BORDER_RANGE: RangeInclusive<u32> = 0..=20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("URL is required")]
    MissingUrl,
}

/// Raw `/generate` fields, from either a urlencoded or a multipart body.
#[derive(Debug, Clone, Default)]
pub struct GenerateForm {
    pub url: Option<String>,
    pub headline: Option<String>,
    pub fill_color: Option<String>,
    pub back_color: Option<String>,
    pub box_size: Option<String>,
    pub border: Option<String>,
}

impl GenerateForm {
    pub fn from_fields(mut fields: HashMap<String, String>) -> Self {
        Self {
            url: fields.remove("url"),
            headline: fields.remove("headline"),
            fill_color: fields.remove("fill_color"),
            back_color: fields.remove("back_color"),
            box_size: fields.remove("box_size"),
            border: fields.remove("border"),
        }
    }

    /// Apply defaults and validate. An empty headline becomes `default_caption`.
    pub fn into_request(self, default_caption: &str) -> Result<QrRequest, ValidationError> {
        let payload = self.url.as_deref().map(str::trim).unwrap_or_default();
        if payload.is_empty() {
            return Err(ValidationError::MissingUrl);
        }

        let headline = self.headline.as_deref().map(str::trim).unwrap_or_default();
        let caption = if headline.is_empty() {
            default_caption
        } else {
            headline
        };

        Ok(QrRequest {
            payload: payload.to_string(),
            caption: caption.to_string(),
            fill_color: color_or(self.fill_color, DEFAULT_FILL_COLOR),
            back_color: color_or(self.back_color, DEFAULT_BACK_COLOR),
            box_size: bounded_or("box_size", self.box_size, DEFAULT_BOX_SIZE, BOX_SIZE_RANGE),
            border: bounded_or("border", self.border, DEFAULT_BORDER, BORDER_RANGE),
        })
    }
}

fn color_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

fn bounded_or(name: &str, value: Option<String>, default: u32, range: RangeInclusive<u32>) -> u32 {
    let Some(raw) = value else {
        return default;
    };
    match raw.trim().parse::<u32>() {
        Ok(v) if range.contains(&v) => v,
        _ => {
            tracing::warn!(field = name, value = %raw, default, "Invalid numeric value, using default");
            default
        }
    }
}

impl<S> FromRequest<S> for GenerateForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);

        let fields = match content_type.as_deref() {
            None => HashMap::new(),
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let mut multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| err_json(400, &e.body_text()))?;
                let mut fields = HashMap::new();
                while let Some(field) = multipart
                    .next_field()
                    .await
                    .map_err(|e| err_json(400, &e.body_text()))?
                {
                    let Some(name) = field.name().map(str::to_string) else {
                        continue;
                    };
                    let value = field
                        .text()
                        .await
                        .map_err(|e| err_json(400, &e.body_text()))?;
                    fields.insert(name, value);
                }
                fields
            }
            Some(_) => {
                let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                    .await
                    .map_err(|e| err_json(400, &e.body_text()))?;
                fields
            }
        };

        Ok(Self::from_fields(fields))
    }
}

fn generation_failed(e: impl std::fmt::Display) -> ApiError {
    let message = format!("Failed to generate QR code: {e}");
    tracing::error!("{message}");
    err_json(500, &message)
}

/// POST /generate
pub async fn generate(State(state): State<SharedState>, form: GenerateForm) -> ApiResult {
    let request = form
        .into_request(&state.config().default_caption)
        .map_err(|e| {
            tracing::warn!("Generate request rejected: {e}");
            err_json(400, &e.to_string())
        })?;

    tracing::info!(
        url = %request.payload,
        caption = %request.caption,
        fill = %request.fill_color,
        back = %request.back_color,
        box_size = request.box_size,
        border = request.border,
        "QR generation requested"
    );

    let image = generator::generate_png_blocking(request, state.font())
        .await
        .map_err(generation_failed)?;

    let data_url = match state.store() {
        ImageStore::Memory(_) => Some(png_data_url(&image.png)),
        ImageStore::Disk(_) => None,
    };
    let stored = state.store().save(image.png).map_err(generation_failed)?;
    let download_url = format!("/download/{}", stored.id);
    let size_kb = size_kb(stored.size_bytes);

    let body = match data_url {
        None => json!({
            "success": true,
            "filename": stored.id,
            "download_url": download_url,
            "preview_url": format!("/preview/{}", stored.id),
            "size_kb": size_kb,
            "width": image.width,
            "height": image.height,
            "message": "QR code generated successfully!",
        }),
        Some(data_url) => json!({
            "success": true,
            "qr_id": stored.id,
            "download_url": download_url,
            "data_url": data_url,
            "size_kb": size_kb,
            "width": image.width,
            "height": image.height,
            "message": "QR code generated successfully!",
        }),
    };

    Ok(Json(body))
}
