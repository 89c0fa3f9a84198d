//! Caption font resolution.
//!
//! Candidates are tried in order: caller-supplied paths first, then a list of
//! well-known font files for the host platform. The first file that exists
//! and parses wins; when none does, the built-in bitmap font is used, so
//! resolution itself never fails.

use std::fmt;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use tracing::{debug, info, warn};

use crate::bitmap_font::BitmapFont;
use crate::text::{self, DrawError, GlyphPainter};

/// Default caption size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 30.0;

#[derive(Debug, thiserror::Error)]
pub enum FontLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid font data (TTF/OTF/TTC expected)")]
    InvalidFont,
}

/// A font ready to draw captions.
pub enum CaptionFont {
    Outline {
        font: FontVec,
        scale: PxScale,
        path: PathBuf,
    },
    Builtin(BitmapFont),
}

impl fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline { scale, path, .. } => f
                .debug_struct("Outline")
                .field("path", path)
                .field("size", &scale.y)
                .finish(),
            Self::Builtin(font) => f.debug_tuple("Builtin").field(font).finish(),
        }
    }
}

impl CaptionFont {
    /// The built-in bitmap font sized to approximate `size` pixels.
    pub fn builtin(size: f32) -> Self {
        Self::Builtin(BitmapFont::for_pixel_size(size))
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }

    /// Human-readable origin of the font, for logs and diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Outline { path, .. } => path.display().to_string(),
            Self::Builtin(font) => format!("built-in 5x7 (scale {})", font.scale()),
        }
    }
}

impl GlyphPainter for CaptionFont {
    fn ink_bounds(&self, text: &str) -> Option<(u32, u32)> {
        match self {
            Self::Outline { font, scale, .. } => text::outline_ink_bounds(font, *scale, text),
            Self::Builtin(font) => font.ink_bounds(text),
        }
    }

    fn advance_extent(&self, text: &str) -> Option<(u32, u32)> {
        match self {
            Self::Outline { font, scale, .. } => {
                let width = text::measure_text_width(font, *scale, text);
                if width == 0 {
                    return None;
                }
                Some((width, text::line_height(font, *scale)))
            }
            Self::Builtin(font) => font.advance_extent(text),
        }
    }

    fn draw(
        &self,
        canvas: &mut RgbImage,
        x: i32,
        y: i32,
        text: &str,
        color: Rgb<u8>,
    ) -> Result<(), DrawError> {
        text::check_origin(canvas, x, y)?;
        match self {
            Self::Outline { font, scale, .. } => {
                draw_text_mut(canvas, color, x, y, *scale, font, text);
            }
            Self::Builtin(font) => font.draw(canvas, i64::from(x), i64::from(y), text, color),
        }
        Ok(())
    }
}

/// Scale at which one em of `font` spans `size` pixels.
///
/// `PxScale` measures ascent to descent, which is taller than the em box for
/// most fonts.
pub fn em_scale<F: Font>(font: &F, size: f32) -> PxScale {
    match font.units_per_em() {
        Some(upem) if upem > 0.0 => PxScale::from(size * font.height_unscaled() / upem),
        _ => PxScale::from(size),
    }
}

/// Load an outline font file with an em size of `size` pixels.
///
/// Collections (`.ttc`) use their first face.
pub fn load_font_file(path: &Path, size: f32) -> Result<CaptionFont, FontLoadError> {
    let data = std::fs::read(path)?;
    let font = FontVec::try_from_vec_and_index(data, 0).map_err(|_| FontLoadError::InvalidFont)?;
    let scale = em_scale(&font, size);
    Ok(CaptionFont::Outline {
        font,
        scale,
        path: path.to_path_buf(),
    })
}

/// Well-known font files for the host platform, most preferred first.
pub fn system_font_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/Library/Fonts/Arial.ttf",
            "/System/Library/Fonts/Arial.ttf",
            "/System/Library/Fonts/Helvetica.ttc",
            "/System/Library/Fonts/Supplemental/Verdana.ttf",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &[
            "C:\\Windows\\Fonts\\arial.ttf",
            "C:\\Windows\\Fonts\\calibri.ttf",
            "C:\\Windows\\Fonts\\verdana.ttf",
        ]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        ]
    }
}

/// Ordered font search list with a guaranteed built-in fallback.
#[derive(Debug, Clone)]
pub struct FontResolver {
    candidates: Vec<PathBuf>,
    size: f32,
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_SIZE)
    }
}

impl FontResolver {
    /// Resolver over the platform's well-known font files.
    pub fn new(size: f32) -> Self {
        Self {
            candidates: system_font_candidates().iter().map(PathBuf::from).collect(),
            size,
        }
    }

    /// Resolver over exactly `candidates`, without platform defaults.
    pub fn with_candidates(candidates: Vec<PathBuf>, size: f32) -> Self {
        Self { candidates, size }
    }

    /// Search `paths` before the current candidates.
    pub fn prepend_paths<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut merged: Vec<PathBuf> = paths.into_iter().collect();
        merged.append(&mut self.candidates);
        self.candidates = merged;
        self
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Return the first loadable candidate, or the built-in font.
    pub fn resolve(&self) -> CaptionFont {
        for path in &self.candidates {
            if !path.exists() {
                debug!(path = %path.display(), "Font candidate not present");
                continue;
            }
            match load_font_file(path, self.size) {
                Ok(font) => {
                    info!(path = %path.display(), size = self.size, "Loaded caption font");
                    return font;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load font candidate");
                }
            }
        }

        let font = CaptionFont::builtin(self.size);
        warn!(font = %font.describe(), "No outline font found, using built-in bitmap font");
        font
    }
}
