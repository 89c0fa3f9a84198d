//! QR request -> captioned PNG.

use std::sync::Arc;

use image_engine::{ColorError, QrError, QrStyle};
use image_processor::{CaptionFont, ComposeError};

/// Parameters of one generation request, already defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRequest {
    pub payload: String,
    pub caption: String,
    pub fill_color: String,
    pub back_color: String,
    pub box_size: u32,
    pub border: u32,
}

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid color: {0}")]
    Color(#[from] ColorError),
    #[error(transparent)]
    Qr(#[from] QrError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error("generation task failed: {0}")]
    Task(String),
}

/// Encode, caption and PNG-encode a QR code.
pub fn generate_png(request: &QrRequest, font: &CaptionFont) -> Result<GeneratedImage, GenerateError> {
    let fill = image_engine::parse_color(&request.fill_color)?;
    let back = image_engine::parse_color(&request.back_color)?;
    let style = QrStyle {
        box_size: request.box_size,
        border: request.border,
        fill,
        back,
    };

    let qr = image_engine::generate_qr(&request.payload, &style)?;
    tracing::debug!(width = qr.width(), height = qr.height(), "QR base image created");

    let composed = image_processor::compose(&qr, &request.caption, fill, back, font)?;
    let png = image_processor::encode_png(&composed)?;

    tracing::info!(
        width = composed.width(),
        height = composed.height(),
        bytes = png.len(),
        font = %font.describe(),
        "QR code with caption generated"
    );

    Ok(GeneratedImage {
        png,
        width: composed.width(),
        height: composed.height(),
    })
}

/// [`generate_png`] on the blocking thread pool.
pub async fn generate_png_blocking(
    request: QrRequest,
    font: Arc<CaptionFont>,
) -> Result<GeneratedImage, GenerateError> {
    tokio::task::spawn_blocking(move || generate_png(&request, &font))
        .await
        .map_err(|e| GenerateError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use image_processor::DEFAULT_FONT_SIZE;

    use super::*;

    fn request(caption: &str) -> QrRequest {
        QrRequest {
            payload: "https://example.com".into(),
            caption: caption.into(),
            fill_color: "#000000".into(),
            back_color: "#ffffff".into(),
            box_size: 10,
            border: 4,
        }
    }

    #[test]
    fn output_is_taller_than_wide() {
        let font = CaptionFont::builtin(DEFAULT_FONT_SIZE);
        let image = generate_png(&request("Hello"), &font).unwrap();
        assert!(image.height > image.width);
        assert!(image.png.starts_with(b"\x89PNG"));
    }

    #[test]
    fn same_request_is_byte_identical() {
        let font = CaptionFont::builtin(DEFAULT_FONT_SIZE);
        let a = generate_png(&request("Same"), &font).unwrap();
        let b = generate_png(&request("Same"), &font).unwrap();
        assert_eq!(a.png, b.png);
    }

    #[test]
    fn bad_color_is_reported() {
        let font = CaptionFont::builtin(DEFAULT_FONT_SIZE);
        let mut req = request("");
        req.fill_color = "#zzzzzz".into();
        assert!(matches!(generate_png(&req, &font), Err(GenerateError::Color(_))));
    }

    #[tokio::test]
    async fn blocking_variant_matches() {
        let font = Arc::new(CaptionFont::builtin(DEFAULT_FONT_SIZE));
        let image = generate_png_blocking(request(""), font).await.unwrap();
        assert_eq!(image.width % 10, 0);
        assert!(image.height > image.width);
    }
}
