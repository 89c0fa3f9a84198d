//! Caption compositing: a caption band above an unmodified QR bitmap.
//!
//! ```text
//! +--------------------+  y = 0
//! |      caption       |  drawn at y = 10, centered (clamped to x >= 0)
//! +--------------------+  y = text_height + 30
//! |                    |
//! |     QR bitmap      |
//! |                    |
//! +--------------------+  y = qr_height + text_height + 40
//! ```

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgb, RgbImage, imageops};
use tracing::{debug, warn};

use crate::text::{self, DrawError, GlyphPainter, TextMetrics};

/// Vertical position of the caption line.
pub const CAPTION_TOP: u32 = 10;

/// Gap between the top of the canvas plus text height and the QR bitmap.
pub const QR_OFFSET_PADDING: u32 = 30;

/// Extra height added to the canvas beyond QR and text heights.
pub const CANVAS_PADDING: u32 = 40;

/// Offsets at which the caption is redrawn to thicken its strokes.
pub const BOLD_OFFSETS: [(i32, i32); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("QR bitmap is empty ({width}x{height})")]
    EmptyBitmap { width: u32, height: u32 },
    #[error("caption could not be drawn: {0}")]
    Draw(#[from] DrawError),
    #[error("PNG encode error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Geometry of a composited image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub qr_y: u32,
    pub text_x: u32,
    pub text_y: u32,
}

/// Horizontal caption position: centered, or 0 when the caption is wider.
pub fn caption_x(canvas_width: u32, text_width: u32) -> u32 {
    let centered = (i64::from(canvas_width) - i64::from(text_width)) / 2;
    centered.max(0) as u32
}

/// Compute canvas size and element positions for a QR bitmap and caption metrics.
pub fn layout(qr_width: u32, qr_height: u32, metrics: &TextMetrics) -> CaptionLayout {
    CaptionLayout {
        canvas_width: qr_width,
        canvas_height: qr_height + metrics.height + CANVAS_PADDING,
        qr_y: metrics.height + QR_OFFSET_PADDING,
        text_x: caption_x(qr_width, metrics.width),
        text_y: CAPTION_TOP,
    }
}

/// Compose `caption` above `qr` on a `background` canvas, drawn in `foreground`.
pub fn compose<P: GlyphPainter + ?Sized>(
    qr: &RgbImage,
    caption: &str,
    foreground: Rgb<u8>,
    background: Rgb<u8>,
    painter: &P,
) -> Result<RgbImage, ComposeError> {
    if qr.width() == 0 || qr.height() == 0 {
        return Err(ComposeError::EmptyBitmap {
            width: qr.width(),
            height: qr.height(),
        });
    }

    let metrics = text::measure_caption(painter, caption);
    let geometry = layout(qr.width(), qr.height(), &metrics);

    let mut canvas = RgbImage::from_pixel(geometry.canvas_width, geometry.canvas_height, background);
    imageops::replace(&mut canvas, qr, 0, i64::from(geometry.qr_y));

    draw_bold(
        painter,
        &mut canvas,
        geometry.text_x as i32,
        geometry.text_y as i32,
        caption,
        foreground,
    )?;

    debug!(
        width = geometry.canvas_width,
        height = geometry.canvas_height,
        text_x = geometry.text_x,
        "Caption composited"
    );
    Ok(canvas)
}

/// Draw the caption at each bold offset.
///
/// A failed pass is replaced by a single draw at the base position and no
/// further offsets are attempted.
pub fn draw_bold<P: GlyphPainter + ?Sized>(
    painter: &P,
    canvas: &mut RgbImage,
    x: i32,
    y: i32,
    caption: &str,
    color: Rgb<u8>,
) -> Result<(), DrawError> {
    for (dx, dy) in BOLD_OFFSETS {
        if let Err(e) = painter.draw(canvas, x + dx, y + dy, caption, color) {
            warn!(error = %e, dx, dy, "Caption pass failed, drawing once without offset");
            return painter.draw(canvas, x, y, caption, color);
        }
    }
    Ok(())
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ComposeError> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// `data:` URL for PNG bytes.
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
