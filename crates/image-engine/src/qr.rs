//! QR code generation.

use image::{Rgb, RgbImage};
use qrcode::{EcLevel, QrCode};
use tracing::debug;

/// Default module size in pixels.
pub const DEFAULT_BOX_SIZE: u32 = 10;

/// Default quiet-zone width in modules.
pub const DEFAULT_BORDER: u32 = 4;

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("QR encode error: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("module size must be at least 1 pixel")]
    ZeroBoxSize,
    #[error("QR image too large ({0} px per side)")]
    TooLarge(u64),
}

/// Rasterization parameters for a QR symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrStyle {
    /// Pixels per module.
    pub box_size: u32,
    /// Quiet zone around the symbol, in modules.
    pub border: u32,
    pub fill: Rgb<u8>,
    pub back: Rgb<u8>,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            box_size: DEFAULT_BOX_SIZE,
            border: DEFAULT_BORDER,
            fill: Rgb([0, 0, 0]),
            back: Rgb([255, 255, 255]),
        }
    }
}

const MAX_SIDE: u64 = 16_384;

/// Generate a QR code image from a URL or text string.
///
/// The image side is `(modules + 2 * border) * box_size` pixels.
pub fn generate_qr(data: &str, style: &QrStyle) -> Result<RgbImage, QrError> {
    if style.box_size == 0 {
        return Err(QrError::ZeroBoxSize);
    }

    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)?;
    let module_count = code.width() as u32;

    let side = (u64::from(module_count) + 2 * u64::from(style.border)) * u64::from(style.box_size);
    if side > MAX_SIDE {
        return Err(QrError::TooLarge(side));
    }
    let side = side as u32;

    let mut img = RgbImage::from_pixel(side, side, style.back);
    let offset = style.border * style.box_size;

    for (i, color) in code.to_colors().iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let x = (i as u32) % module_count;
        let y = (i as u32) / module_count;
        let px = offset + x * style.box_size;
        let py = offset + y * style.box_size;
        for dy in 0..style.box_size {
            for dx in 0..style.box_size {
                img.put_pixel(px + dx, py + dy, style.fill);
            }
        }
    }

    debug!(
        modules = module_count,
        box_size = style.box_size,
        border = style.border,
        side,
        "QR symbol rasterized"
    );

    Ok(img)
}
