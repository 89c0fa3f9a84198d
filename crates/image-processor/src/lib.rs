//! Caption compositing for QR images.
//!
//! Resolves a caption font (platform font files with a built-in bitmap
//! fallback), measures the caption with a three-step fallback, and draws it
//! in simulated bold above the QR bitmap.

pub mod bitmap_font;
pub mod compose;
pub mod font;
pub mod text;

// Re-exports for convenience
pub use bitmap_font::BitmapFont;
pub use compose::{ComposeError, compose, encode_png, png_data_url};
pub use font::{CaptionFont, DEFAULT_FONT_SIZE, FontResolver};
pub use text::{GlyphPainter, MeasureTier, TextMetrics, measure_caption};
