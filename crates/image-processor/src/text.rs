//! Caption measurement and drawing primitives.
//!
//! Measurement falls through three strategies: the ink bounding box of the
//! laid-out glyphs, then advance metrics, then a per-character estimate.

use ab_glyph::{Font, GlyphId, PxScale, ScaleFont, point};
use image::{Rgb, RgbImage};
use tracing::debug;

/// Estimated width of one character when no metrics are available.
pub const FALLBACK_CHAR_WIDTH: u32 = 15;

/// Estimated caption height when no metrics are available.
pub const FALLBACK_TEXT_HEIGHT: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("text origin ({x}, {y}) lies outside the {width}x{height} canvas")]
    OutsideCanvas {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
}

/// A font backend the compositor can measure and draw captions with.
pub trait GlyphPainter {
    /// Width and height of the inked pixels of `text`.
    fn ink_bounds(&self, text: &str) -> Option<(u32, u32)>;

    /// Advance width and line height of `text`.
    fn advance_extent(&self, text: &str) -> Option<(u32, u32)>;

    /// Draw `text` with the top of its line at `(x, y)`.
    fn draw(
        &self,
        canvas: &mut RgbImage,
        x: i32,
        y: i32,
        text: &str,
        color: Rgb<u8>,
    ) -> Result<(), DrawError>;
}

/// Which measurement strategy produced a [`TextMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureTier {
    InkBounds,
    Advance,
    Estimate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    pub width: u32,
    pub height: u32,
    pub tier: MeasureTier,
}

/// Measure a caption, falling back from ink bounds to advances to an estimate.
pub fn measure_caption<P: GlyphPainter + ?Sized>(painter: &P, text: &str) -> TextMetrics {
    let metrics = if let Some((width, height)) = painter.ink_bounds(text) {
        TextMetrics {
            width,
            height,
            tier: MeasureTier::InkBounds,
        }
    } else if let Some((width, height)) = painter.advance_extent(text) {
        TextMetrics {
            width,
            height,
            tier: MeasureTier::Advance,
        }
    } else {
        TextMetrics {
            width: FALLBACK_CHAR_WIDTH * text.chars().count() as u32,
            height: FALLBACK_TEXT_HEIGHT,
            tier: MeasureTier::Estimate,
        }
    };

    debug!(
        width = metrics.width,
        height = metrics.height,
        tier = ?metrics.tier,
        "Caption measured"
    );
    metrics
}

/// Fail when `(x, y)` is not a pixel of `canvas`.
pub fn check_origin(canvas: &RgbImage, x: i32, y: i32) -> Result<(), DrawError> {
    let inside = x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height();
    if inside {
        Ok(())
    } else {
        Err(DrawError::OutsideCanvas {
            x,
            y,
            width: canvas.width(),
            height: canvas.height(),
        })
    }
}

/// Measure the pixel width of a string at the given font and scale.
pub fn measure_text_width<F: Font>(font: &F, scale: PxScale, text: &str) -> u32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev_glyph: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width.ceil().max(0.0) as u32
}

/// Compute the line height for the given font and scale.
pub fn line_height<F: Font>(font: &F, scale: PxScale) -> u32 {
    let scaled = font.as_scaled(scale);
    (scaled.ascent() - scaled.descent() + scaled.line_gap()).ceil() as u32
}

/// Pixel bounds of the outlined glyphs of `text`, laid out on one line with
/// the top of the line at y = 0.
pub fn outline_ink_bounds<F: Font>(font: &F, scale: PxScale, text: &str) -> Option<(u32, u32)> {
    let scaled = font.as_scaled(scale);
    let mut caret = point(0.0, scaled.ascent());
    let mut prev_glyph: Option<GlyphId> = None;
    let mut bounds: Option<(f32, f32, f32, f32)> = None;

    for ch in text.chars() {
        let mut glyph = scaled.scaled_glyph(ch);
        if let Some(prev) = prev_glyph {
            caret.x += scaled.kern(prev, glyph.id);
        }
        glyph.position = caret;
        caret.x += scaled.h_advance(glyph.id);
        prev_glyph = Some(glyph.id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let r = outlined.px_bounds();
            bounds = Some(match bounds {
                None => (r.min.x, r.min.y, r.max.x, r.max.y),
                Some((x0, y0, x1, y1)) => (
                    x0.min(r.min.x),
                    y0.min(r.min.y),
                    x1.max(r.max.x),
                    y1.max(r.max.y),
                ),
            });
        }
    }

    let (x0, y0, x1, y1) = bounds?;
    let width = (x1 - x0).ceil();
    let height = (y1 - y0).ceil();
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some((width as u32, height as u32))
}
