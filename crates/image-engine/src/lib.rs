//! QR symbol rendering for captioned QR images.
//!
//! Encodes a payload into a QR matrix (error-correction level H, smallest
//! fitting version) and rasterizes it with a configurable module size,
//! quiet-zone border and colors.

pub mod color;
pub mod qr;

pub use color::{ColorError, parse_color};
pub use qr::{QrError, QrStyle, generate_qr};
