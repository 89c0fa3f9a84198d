//! Built-in 5x7 bitmap font used when no outline font can be loaded.
//!
//! Glyphs cover printable ASCII (0x20..=0x7E). Each glyph is five column
//! bytes, least significant bit at the top row. Other characters render as
//! `?`.

use image::{Rgb, RgbImage};

const GLYPH_COLUMNS: u32 = 5;
const GLYPH_ROWS: u32 = 7;
const FIRST_CHAR: u32 = 0x20;

#[rustfmt::skip]
const GLYPHS: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x00], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x7F, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x10, 0x08, 0x08, 0x10, 0x08], // ~
];

fn glyph_for(ch: char) -> &'static [u8; 5] {
    let code = ch as u32;
    let index = if (FIRST_CHAR..FIRST_CHAR + GLYPHS.len() as u32).contains(&code) {
        code - FIRST_CHAR
    } else {
        '?' as u32 - FIRST_CHAR
    };
    &GLYPHS[index as usize]
}

fn is_lit(glyph: &[u8; 5], col: u32, row: u32) -> bool {
    glyph[col as usize] & (1 << row) != 0
}

/// Fixed-pitch bitmap font, each glyph pixel drawn as a `scale` x `scale` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapFont {
    scale: u32,
}

impl Default for BitmapFont {
    fn default() -> Self {
        Self::new(3)
    }
}

impl BitmapFont {
    pub fn new(scale: u32) -> Self {
        Self {
            scale: scale.max(1),
        }
    }

    /// Pick the integer scale whose cell height best matches a pixel size.
    pub fn for_pixel_size(px: f32) -> Self {
        let cell = (GLYPH_ROWS + 1) as f32;
        Self::new((px / cell).round().max(1.0) as u32)
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Horizontal advance per character (glyph plus one column of spacing).
    pub fn advance(&self) -> u32 {
        (GLYPH_COLUMNS + 1) * self.scale
    }

    /// Line height (glyph rows plus one row of spacing).
    pub fn line_height(&self) -> u32 {
        (GLYPH_ROWS + 1) * self.scale
    }

    /// Width and height of the lit pixels of `text`, or `None` if nothing is lit.
    pub fn ink_bounds(&self, text: &str) -> Option<(u32, u32)> {
        let mut min_x = u32::MAX;
        let mut max_x = 0u32;
        let mut min_y = u32::MAX;
        let mut max_y = 0u32;

        for (i, ch) in text.chars().enumerate() {
            let glyph = glyph_for(ch);
            let origin = i as u32 * (GLYPH_COLUMNS + 1);
            for col in 0..GLYPH_COLUMNS {
                for row in 0..GLYPH_ROWS {
                    if is_lit(glyph, col, row) {
                        min_x = min_x.min(origin + col);
                        max_x = max_x.max(origin + col);
                        min_y = min_y.min(row);
                        max_y = max_y.max(row);
                    }
                }
            }
        }

        if min_x == u32::MAX {
            return None;
        }
        Some((
            (max_x - min_x + 1) * self.scale,
            (max_y - min_y + 1) * self.scale,
        ))
    }

    /// Advance-based extent of `text`, or `None` for an empty string.
    pub fn advance_extent(&self, text: &str) -> Option<(u32, u32)> {
        let count = text.chars().count() as u32;
        if count == 0 {
            return None;
        }
        Some((count * self.advance(), self.line_height()))
    }

    /// Draw `text` with its top-left cell corner at `(x, y)`, clipping to the canvas.
    pub fn draw(&self, canvas: &mut RgbImage, x: i64, y: i64, text: &str, color: Rgb<u8>) {
        let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
        let scale = i64::from(self.scale);

        for (i, ch) in text.chars().enumerate() {
            let glyph = glyph_for(ch);
            let cell_x = x + i as i64 * i64::from(self.advance());
            if cell_x >= width {
                break;
            }
            for col in 0..GLYPH_COLUMNS {
                for row in 0..GLYPH_ROWS {
                    if !is_lit(glyph, col, row) {
                        continue;
                    }
                    let px = cell_x + i64::from(col) * scale;
                    let py = y + i64::from(row) * scale;
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let (tx, ty) = (px + dx, py + dy);
                            if (0..width).contains(&tx) && (0..height).contains(&ty) {
                                canvas.put_pixel(tx as u32, ty as u32, color);
                            }
                        }
                    }
                }
            }
        }
    }
}
