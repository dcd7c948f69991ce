//! Label rasterisation: turns a few lines of text into a fixed-size RGBA
//! bitmap ready for texture upload.
//!
//! Glyphs come from the 8×8 `font8x8` bitmap font, scaled per line. The
//! output depends only on `(lines, style)`, so identical inputs produce
//! byte-identical bitmaps.

use font8x8::legacy::BASIC_LEGACY;
use image::{Rgba, RgbaImage};

const GLYPH_SIZE: u32 = 8;

pub const MIN_FRACTION_DIGITS: usize = 2;
pub const MAX_FRACTION_DIGITS: usize = 8;

/// Appearance of one text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    /// Integer upscale of the 8×8 glyphs.
    pub scale: u32,
    pub color: [u8; 4],
    /// Double-strikes each glyph one pixel to the right.
    pub bold: bool,
}

/// Canvas geometry and per-line styling.
///
/// The first line is drawn with `title`, every following line with `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelStyle {
    pub width: u32,
    pub height: u32,
    pub padding_top: u32,
    pub line_gap: u32,
    pub title: LineStyle,
    pub body: LineStyle,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            width: 768,
            height: 128,
            padding_top: 16,
            line_gap: 16,
            title: LineStyle {
                scale: 3,
                color: [0xff, 0xff, 0xff, 0xff],
                bold: true,
            },
            body: LineStyle {
                scale: 2,
                color: [0xff, 0xd7, 0x00, 0xff],
                bold: false,
            },
        }
    }
}

/// Renders `lines` top-aligned and horizontally centered on a transparent
/// canvas. Characters that do not fit the canvas width are dropped.
pub fn rasterize<S: AsRef<str>>(lines: &[S], style: &LabelStyle) -> RgbaImage {
    let mut canvas = RgbaImage::new(style.width, style.height);
    let mut top = style.padding_top;

    for (row, line) in lines.iter().enumerate() {
        let line_style = if row == 0 { style.title } else { style.body };
        let scale = line_style.scale.max(1);
        let cell = GLYPH_SIZE * scale;
        if top >= style.height {
            break;
        }

        let max_cols = (style.width / cell) as usize;
        let glyphs: Vec<[u8; 8]> = line
            .as_ref()
            .chars()
            .take(max_cols)
            .map(glyph_for_char)
            .collect();

        let line_width = glyphs.len() as u32 * cell;
        let left = (style.width - line_width) / 2;

        for (col, glyph) in glyphs.iter().enumerate() {
            let glyph_left = left + col as u32 * cell;
            draw_glyph(&mut canvas, glyph, glyph_left, top, scale, &line_style);
        }

        top += cell + style.line_gap;
    }

    canvas
}

fn draw_glyph(
    canvas: &mut RgbaImage,
    glyph: &[u8; 8],
    left: u32,
    top: u32,
    scale: u32,
    style: &LineStyle,
) {
    let (width, height) = canvas.dimensions();
    let color = Rgba(style.color);

    for (gy, bits) in glyph.iter().enumerate() {
        for gx in 0..GLYPH_SIZE {
            // Bit 0 is the leftmost column.
            if (bits >> gx) & 0x01 == 0 {
                continue;
            }
            for sy in 0..scale {
                let y = top + gy as u32 * scale + sy;
                if y >= height {
                    continue;
                }
                for sx in 0..scale {
                    let x = left + gx * scale + sx;
                    if x < width {
                        canvas.put_pixel(x, y, color);
                    }
                    if style.bold && x + 1 < width {
                        canvas.put_pixel(x + 1, y, color);
                    }
                }
            }
        }
    }
}

fn glyph_for_char(ch: char) -> [u8; 8] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

/// Formats a price with thousands grouping and between
/// [`MIN_FRACTION_DIGITS`] and [`MAX_FRACTION_DIGITS`] fractional digits.
///
/// `1234.5` becomes `"1,234.50"`, `0.123456789` becomes `"0.12345679"`.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return price.to_string();
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, price.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < MIN_FRACTION_DIGITS {
        frac.push('0');
    }

    let is_zero = int_part.bytes().all(|b| b == b'0') && frac.bytes().all(|b| b == b'0');
    let sign = if price < 0.0 && !is_zero { "-" } else { "" };

    format!("{sign}{}.{frac}", group_thousands(int_part))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
