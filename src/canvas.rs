//! Canvas - RGBA drawing surface over tiny-skia
//!
//! Shapes follow the outline-inside-the-box convention: an outlined ellipse
//! never paints outside its bounding box.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};

use crate::geometry::{arc_points, BBox};
use crate::palette::{Rgb, Rgba};

/// Segments used to flatten one arc; plenty at poster scale
const ARC_SEGMENTS: usize = 96;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Invalid canvas size {0}x{1}")]
    InvalidSize(u32, u32),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Fill and outline for a closed shape
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeStyle {
    pub fill: Option<Rgba>,
    pub outline: Option<Rgba>,
    pub width: f32,
}

impl ShapeStyle {
    pub fn fill(color: impl Into<Rgba>) -> Self {
        Self { fill: Some(color.into()), outline: None, width: 0.0 }
    }

    /// Add an outline; widths below one pixel are drawn as one pixel
    pub fn outlined(mut self, color: impl Into<Rgba>, width: f32) -> Self {
        self.outline = Some(color.into());
        self.width = width.max(1.0);
        self
    }
}

pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Fully transparent canvas
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        let pixmap = Pixmap::new(width, height).ok_or(CanvasError::InvalidSize(width, height))?;
        Ok(Self { pixmap })
    }

    pub fn filled(width: u32, height: u32, color: Rgb) -> Result<Self, CanvasError> {
        let mut canvas = Self::new(width, height)?;
        canvas.pixmap.fill(tiny_skia::Color::from_rgba8(color.0, color.1, color.2, 255));
        Ok(canvas)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn rectangle(&mut self, bbox: BBox, style: ShapeStyle) {
        if let Some(fill) = style.fill {
            if let Some(rect) = to_rect(bbox) {
                self.fill_path(&PathBuilder::from_rect(rect), fill);
            }
        }
        if let Some(outline) = style.outline {
            if let Some(rect) = to_rect(inset(bbox, style.width / 2.0)) {
                self.stroke_path(&PathBuilder::from_rect(rect), outline, style.width);
            }
        }
    }

    pub fn ellipse(&mut self, bbox: BBox, style: ShapeStyle) {
        if let Some(fill) = style.fill {
            if let Some(path) = to_rect(bbox).and_then(PathBuilder::from_oval) {
                self.fill_path(&path, fill);
            }
        }
        if let Some(outline) = style.outline {
            let inner = inset(bbox, style.width / 2.0);
            if let Some(path) = to_rect(inner).and_then(PathBuilder::from_oval) {
                self.stroke_path(&path, outline, style.width);
            }
        }
    }

    pub fn polygon(&mut self, points: &[(f32, f32)], style: ShapeStyle) {
        let Some(path) = polyline_path(points, true) else {
            return;
        };
        if let Some(fill) = style.fill {
            self.fill_path(&path, fill);
        }
        if let Some(outline) = style.outline {
            self.stroke_path(&path, outline, style.width);
        }
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba, width: f32) {
        if let Some(path) = polyline_path(&[from, to], false) {
            self.stroke_path(&path, color, width);
        }
    }

    /// Stroke part of the ellipse inscribed in `bbox`, angles as in [`arc_points`].
    /// The stroke stays inside the box.
    pub fn arc(&mut self, bbox: BBox, start_deg: f32, end_deg: f32, color: Rgba, width: f32) {
        let points = arc_points(inset(bbox, width / 2.0), start_deg, end_deg, ARC_SEGMENTS);
        if let Some(path) = polyline_path(&points, false) {
            self.stroke_path(&path, color, width);
        }
    }

    pub fn fill_path(&mut self, path: &Path, color: Rgba) {
        let paint = paint_for(color);
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    pub fn stroke_path(&mut self, path: &Path, color: Rgba, width: f32) {
        let paint = paint_for(color);
        let stroke = Stroke {
            width,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, Transform::identity(), None);
    }

    /// Source-over composite of `layer` onto this canvas at the origin
    pub fn composite(&mut self, layer: &Canvas) {
        self.pixmap.draw_pixmap(
            0,
            0,
            layer.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Straight-alpha color at a pixel, `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba(c.red(), c.green(), c.blue(), c.alpha()))
    }

    /// Drop the alpha channel
    pub fn into_rgb(self) -> RgbImage {
        let width = self.pixmap.width();
        let height = self.pixmap.height();
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue()]);
        }
        RgbImage { width, height, data }
    }
}

/// Opaque 8-bit RGB image, the final form before encoding
pub struct RgbImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(Rgb(self.data[i], self.data[i + 1], self.data[i + 2]))
    }

    /// Blend toward grey Gaussian noise (mean 128, deviation `sigma`).
    ///
    /// `amount` is the weight of the noise image: 0.0 leaves the image as is.
    /// A negative or non-finite `sigma` leaves the image untouched.
    pub fn blend_noise<R: Rng + ?Sized>(&mut self, rng: &mut R, sigma: f64, amount: f64) {
        let Ok(grain) = Normal::new(128.0, sigma) else {
            return;
        };
        for px in self.data.chunks_exact_mut(3) {
            let noise = grain.sample(rng).clamp(0.0, 255.0);
            for channel in px.iter_mut() {
                let v = *channel as f64;
                *channel = (v + (noise - v) * amount).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    /// Encode as PNG, recording `dpi` in the pHYs chunk
    pub fn encode_png(&self, dpi: u32) -> Result<Vec<u8>, CanvasError> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width, self.height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_compression(png::Compression::Best);
            let ppm = dots_per_meter(dpi);
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.data)?;
            writer.finish()?;
        }
        Ok(buf)
    }
}

pub fn dots_per_meter(dpi: u32) -> u32 {
    (dpi as f64 / 0.0254).round() as u32
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.0, color.1, color.2, color.3);
    paint.anti_alias = true;
    paint
}

fn to_rect(b: BBox) -> Option<Rect> {
    Rect::from_ltrb(b.left, b.top, b.right, b.bottom)
}

fn inset(b: BBox, by: f32) -> BBox {
    BBox::new(b.left + by, b.top + by, b.right - by, b.bottom - by)
}

fn polyline_path(points: &[(f32, f32)], close: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0, first.1);
    for (x, y) in rest {
        pb.line_to(*x, *y);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{CREAM, PINK, WHITE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_invalid_size() {
        assert!(matches!(Canvas::new(0, 10), Err(CanvasError::InvalidSize(0, 10))));
    }

    #[test]
    fn test_filled_ellipse_center() {
        let mut canvas = Canvas::filled(100, 100, CREAM).unwrap();
        canvas.ellipse(BBox::around(50.0, 50.0, 30.0, 30.0), ShapeStyle::fill(PINK));
        assert_eq!(canvas.pixel(50, 50), Some(PINK.opaque()));
        assert_eq!(canvas.pixel(2, 2), Some(CREAM.opaque()));
    }

    #[test]
    fn test_outline_stays_inside_box() {
        let mut canvas = Canvas::new(100, 100).unwrap();
        let style = ShapeStyle::default().outlined(WHITE, 8.0);
        canvas.ellipse(BBox::around(50.0, 50.0, 40.0, 40.0), style);
        // Just outside the right edge of the box
        assert_eq!(canvas.pixel(91, 50).map(|c| c.3), Some(0));
        // On the ring
        assert_eq!(canvas.pixel(86, 50), Some(WHITE.opaque()));
    }

    #[test]
    fn test_composite_over() {
        let mut base = Canvas::filled(10, 10, CREAM).unwrap();
        let mut layer = Canvas::new(10, 10).unwrap();
        layer.rectangle(BBox::new(0.0, 0.0, 10.0, 10.0), ShapeStyle::fill(PINK));
        base.composite(&layer);
        assert_eq!(base.pixel(5, 5), Some(PINK.opaque()));
    }

    #[test]
    fn test_noise_is_subtle() {
        let mut img = Canvas::filled(16, 16, Rgb(128, 128, 128)).unwrap().into_rgb();
        let mut rng = StdRng::seed_from_u64(7);
        img.blend_noise(&mut rng, 15.0, 0.03);
        for y in 0..16 {
            for x in 0..16 {
                let Rgb(r, _, _) = img.pixel(x, y).unwrap();
                assert!((126..=130).contains(&r), "pixel {} drifted", r);
            }
        }
    }

    #[test]
    fn test_png_header_and_dpi() {
        let img = Canvas::filled(40, 30, CREAM).unwrap().into_rgb();
        let bytes = img.encode_png(300).unwrap();
        let decoder = png::Decoder::new(bytes.as_slice());
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (40, 30));
        let dims = info.pixel_dims.unwrap();
        assert_eq!(dims.xppu, 11811);
        assert_eq!(dims.unit, png::Unit::Meter);
    }

    #[test]
    fn test_invalid_sigma_leaves_image() {
        let mut img = Canvas::filled(4, 4, CREAM).unwrap().into_rgb();
        let mut rng = StdRng::seed_from_u64(1);
        img.blend_noise(&mut rng, -1.0, 0.5);
        assert_eq!(img.pixel(2, 2), Some(CREAM));
    }

    #[test]
    fn test_arc_stroke_stays_in_box() {
        let mut canvas = Canvas::new(100, 100).unwrap();
        let white = WHITE.opaque();
        canvas.arc(BBox::new(20.0, 20.0, 80.0, 80.0), 0.0, 360.0, white, 10.0);
        // Left edge of the box is x = 20; the ring spans 20..30
        assert_eq!(canvas.pixel(17, 50).map(|c| c.3), Some(0));
        assert_eq!(canvas.pixel(25, 50), Some(white));
        assert_eq!(canvas.pixel(50, 50).map(|c| c.3), Some(0));
    }
}
