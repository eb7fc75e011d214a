//! Poster Text Rendering
//!
//! Text is turned into tiny-skia paths and filled like any other shape.
//! `(x, y)` always names the top-left corner of the text box.

use tiny_skia::{Path, PathBuilder, Rect};

use crate::canvas::Canvas;
use crate::fonts::FaceData;
use crate::palette::Rgba;

/// Rows per bitmap glyph; the cell is one row and one column larger
const BITMAP_ROWS: usize = 7;
const BITMAP_COLS: usize = 5;
const BITMAP_CELL_W: f32 = 6.0;
const BITMAP_CELL_H: f32 = 8.0;

/// How a piece of text is painted
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub fill: Rgba,
    /// Dilation color and width in pixels, drawn beneath the fill
    pub stroke: Option<(Rgba, f32)>,
}

impl TextStyle {
    pub fn fill(color: impl Into<Rgba>) -> Self {
        Self { fill: color.into(), stroke: None }
    }

    pub fn stroked(mut self, color: impl Into<Rgba>, width: f32) -> Self {
        self.stroke = Some((color.into(), width));
        self
    }
}

/// Face used for poster text
#[derive(Debug, Clone)]
pub enum TextFace {
    Outline(FaceData),
    /// Built-in 5x7 block face, always available
    Bitmap,
}

impl TextFace {
    /// Advance width of `text` at pixel `size`
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        match self {
            TextFace::Outline(data) => match data.face() {
                Some(face) => {
                    let scale = size / face.units_per_em() as f32;
                    text.chars()
                        .map(|c| {
                            face.glyph_index(c)
                                .and_then(|g| face.glyph_hor_advance(g))
                                .unwrap_or(0) as f32
                                * scale
                        })
                        .sum()
                }
                None => TextFace::Bitmap.measure(text, size),
            },
            TextFace::Bitmap => {
                let unit = size / BITMAP_CELL_H;
                let n = text.chars().count() as f32;
                // Trailing column gap is not part of the ink
                (n * BITMAP_CELL_W - 1.0).max(0.0) * unit
            }
        }
    }

    /// Left edge that centers `text` across `width`
    pub fn centered_x(&self, text: &str, size: f32, width: f32) -> f32 {
        ((width - self.measure(text, size)) / 2.0).floor()
    }

    pub fn draw(&self, canvas: &mut Canvas, x: f32, y: f32, text: &str, size: f32, style: TextStyle) {
        match self {
            TextFace::Outline(data) => {
                let Some(path) = outline_path(data, text, x, y, size) else {
                    return;
                };
                if let Some((color, width)) = style.stroke {
                    // Centered stroke of twice the width dilates by `width`
                    canvas.stroke_path(&path, color, width * 2.0);
                }
                canvas.fill_path(&path, style.fill);
            }
            TextFace::Bitmap => {
                if let Some((color, width)) = style.stroke {
                    if let Some(path) = bitmap_path(text, x, y, size, width) {
                        canvas.fill_path(&path, color);
                    }
                }
                if let Some(path) = bitmap_path(text, x, y, size, 0.0) {
                    canvas.fill_path(&path, style.fill);
                }
            }
        }
    }
}

struct GlyphPen<'a> {
    pb: &'a mut PathBuilder,
    scale: f32,
    origin_x: f32,
    baseline: f32,
}

impl GlyphPen<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for GlyphPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.pb.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.pb.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.pb.close();
    }
}

fn outline_path(data: &FaceData, text: &str, x: f32, y: f32, size: f32) -> Option<Path> {
    let face = data.face()?;
    let scale = size / face.units_per_em() as f32;
    let baseline = y + face.ascender() as f32 * scale;

    let mut pb = PathBuilder::new();
    let mut pen_x = x;
    for ch in text.chars() {
        let Some(gid) = face.glyph_index(ch) else {
            continue;
        };
        let mut pen = GlyphPen { pb: &mut pb, scale, origin_x: pen_x, baseline };
        face.outline_glyph(gid, &mut pen);
        pen_x += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
    }
    pb.finish()
}

/// Union of the lit cells of each glyph, each cell grown by `grow` pixels
fn bitmap_path(text: &str, x: f32, y: f32, size: f32, grow: f32) -> Option<Path> {
    let unit = size / BITMAP_CELL_H;
    let mut pb = PathBuilder::new();

    for (i, ch) in text.chars().enumerate() {
        let left = x + i as f32 * BITMAP_CELL_W * unit;
        let rows = bitmap_glyph(ch);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..BITMAP_COLS {
                if bits & (1 << (BITMAP_COLS - 1 - col)) == 0 {
                    continue;
                }
                let cx = left + col as f32 * unit;
                let cy = y + row as f32 * unit;
                if let Some(rect) =
                    Rect::from_ltrb(cx - grow, cy - grow, cx + unit + grow, cy + unit + grow)
                {
                    pb.push_rect(rect);
                }
            }
        }
    }
    pb.finish()
}

/// Row bitmaps for the built-in face; lowercase shares the capitals
pub fn bitmap_glyph(ch: char) -> [u8; BITMAP_ROWS] {
    match ch.to_ascii_uppercase() {
        ' ' => [0; 7],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '\'' => [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        // Hollow box for anything the face lacks
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{Rgb, DEEP_PURPLE, WHITE};

    #[test]
    fn test_bitmap_measure() {
        // Four cells of 6 units minus the trailing gap, at 1 px per unit
        assert_eq!(TextFace::Bitmap.measure("2025", 8.0), 23.0);
        assert_eq!(TextFace::Bitmap.measure("", 8.0), 0.0);
    }

    #[test]
    fn test_lowercase_shares_capitals() {
        assert_eq!(bitmap_glyph('n'), bitmap_glyph('N'));
        assert_ne!(bitmap_glyph('N'), bitmap_glyph('~'));
    }

    #[test]
    fn test_bitmap_draw_paints_cells() {
        let mut canvas = Canvas::filled(40, 20, Rgb(0, 0, 0)).unwrap();
        // "I": top row is 01110, so column 0 stays dark and column 1 lights
        TextFace::Bitmap.draw(&mut canvas, 0.0, 0.0, "I", 16.0, TextStyle::fill(WHITE));
        assert_eq!(canvas.pixel(0, 0), Some(Rgb(0, 0, 0).opaque()));
        assert_eq!(canvas.pixel(2, 0), Some(WHITE.opaque()));
    }

    #[test]
    fn test_bitmap_stroke_surrounds_fill() {
        let mut canvas = Canvas::filled(40, 24, Rgb(0, 0, 0)).unwrap();
        let style = TextStyle::fill(WHITE).stroked(DEEP_PURPLE, 2.0);
        TextFace::Bitmap.draw(&mut canvas, 4.0, 4.0, "I", 16.0, style);
        // Column 0 of "I" row 0 is off, but the neighbour's dilation reaches it
        assert_eq!(canvas.pixel(5, 4), Some(DEEP_PURPLE.opaque()));
        assert_eq!(canvas.pixel(6, 4), Some(WHITE.opaque()));
    }

    #[test]
    fn test_centered_x() {
        let x = TextFace::Bitmap.centered_x("AB", 8.0, 100.0);
        assert_eq!(x, 44.0);
    }
}
