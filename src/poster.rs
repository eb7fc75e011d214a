//! Neko Sonic Festival Poster
//!
//! A 4:3, anime-inspired poster: a pink headphone cat surrounded by
//! friends, notes and stars over a pastel gradient. Layers are composed in
//! the same order every run; only the background bubbles and the paper
//! noise draw from the random stream.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{Canvas, CanvasError, RgbImage, ShapeStyle};
use crate::fonts::{find_system_sans, FaceData};
use crate::geometry::{lerp_rgb, star_points, BBox};
use crate::glyphs::{TextFace, TextStyle};
use crate::palette::*;
use crate::print::PrintSpec;

pub const DEFAULT_WIDTH: u32 = 1600;
pub const DEFAULT_HEIGHT: u32 = 1200;
pub const DEFAULT_OUTPUT: &str = "neko-sonic-poster.png";

pub const TITLE: &str = "NEKO FEST";
pub const SUBTITLE: &str = "Summer Sonic";
pub const DETAIL: &str = "2025";

const BUBBLE_COUNT: usize = 15;
const GRADIENT_ALPHA: u8 = 180;

/// Where poster text gets its glyphs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontSource {
    /// Installed Helvetica or sans-serif, else the built-in face
    #[default]
    System,
    /// A specific font file, else the built-in face
    File(PathBuf),
    /// Always the built-in bitmap face
    Builtin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosterConfig {
    pub width: u32,
    pub height: u32,
    pub print: PrintSpec,
    /// Fixed seed for reproducible output; OS entropy when absent
    pub seed: Option<u64>,
    pub font: FontSource,
    pub noise_sigma: f64,
    pub noise_amount: f64,
    pub output_path: PathBuf,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            print: PrintSpec::default(),
            seed: None,
            font: FontSource::System,
            noise_sigma: 15.0,
            noise_amount: 0.03,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

/// Resolve a font source, settling silently on the bitmap face
pub fn resolve_face(source: &FontSource) -> TextFace {
    let found = match source {
        FontSource::System => find_system_sans(),
        FontSource::File(path) => match FaceData::from_file(path, 0) {
            Ok(face) => Some(face),
            Err(e) => {
                debug!(error = %e, "Poster font unavailable");
                None
            }
        },
        FontSource::Builtin => None,
    };
    match found {
        Some(face) => TextFace::Outline(face),
        None => {
            debug!("Using built-in bitmap face for poster text");
            TextFace::Bitmap
        }
    }
}

pub struct Poster {
    config: PosterConfig,
    face: TextFace,
}

impl Poster {
    pub fn new(config: PosterConfig) -> Self {
        let face = resolve_face(&config.font);
        Self { config, face }
    }

    /// Draw every layer and return the flattened, noise-textured image
    pub fn render(&self) -> Result<RgbImage, CanvasError> {
        let (w, h) = (self.config.width, self.config.height);
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut img = gradient_background(w, h)?;

        let mut overlay = Canvas::new(w, h)?;
        draw_bubbles(&mut overlay, &mut rng);
        draw_characters(&mut overlay);
        img.composite(&overlay);

        let mut text_layer = Canvas::new(w, h)?;
        self.draw_text(&mut text_layer);
        img.composite(&text_layer);

        let mut rgb = img.into_rgb();
        rgb.blend_noise(&mut rng, self.config.noise_sigma, self.config.noise_amount);
        Ok(rgb)
    }

    fn draw_text(&self, layer: &mut Canvas) {
        let width = self.config.width as f32;
        let height = self.config.height as f32;
        let face = &self.face;

        let title_size = 120.0;
        let title_x = face.centered_x(TITLE, title_size, width);
        let title_y = 80.0;
        for (dx, dy) in [(3.0, 3.0), (-3.0, 3.0), (3.0, -3.0), (-3.0, -3.0)] {
            face.draw(layer, title_x + dx, title_y + dy, TITLE, title_size, TextStyle::fill(DEEP_PURPLE));
        }
        face.draw(layer, title_x, title_y, TITLE, title_size, TextStyle::fill(WHITE));

        let subtitle_size = 45.0;
        face.draw(
            layer,
            face.centered_x(SUBTITLE, subtitle_size, width),
            220.0,
            SUBTITLE,
            subtitle_size,
            TextStyle::fill(ELECTRIC_BLUE).stroked(WHITE, 2.0),
        );

        let detail_size = 32.0;
        face.draw(
            layer,
            face.centered_x(DETAIL, detail_size, width),
            height - 80.0,
            DETAIL,
            detail_size,
            TextStyle::fill(PINK).stroked(WHITE, 1.0),
        );
    }
}

/// Lavender fading to soft pink, laid over a cream base
pub fn gradient_background(width: u32, height: u32) -> Result<Canvas, CanvasError> {
    let mut canvas = Canvas::filled(width, height, CREAM)?;
    for y in 0..height {
        let progress = y as f64 / height as f64;
        let color = lerp_rgb(LAVENDER, SOFT_PINK, progress).with_alpha(GRADIENT_ALPHA);
        let band = BBox::new(0.0, y as f32, width as f32, y as f32 + 2.0);
        canvas.rectangle(band, ShapeStyle::fill(color));
    }
    Ok(canvas)
}

fn draw_bubbles<R: Rng>(layer: &mut Canvas, rng: &mut R) {
    let (w, h) = (layer.width(), layer.height());
    for _ in 0..BUBBLE_COUNT {
        let x = rng.random_range(100..=w.saturating_sub(100).max(100)) as f32;
        let y = rng.random_range(100..=h.saturating_sub(100).max(100)) as f32;
        let size = rng.random_range(40..=120) as f32;
        let color = BUBBLE_COLORS[rng.random_range(0..BUBBLE_COLORS.len())];
        layer.ellipse(
            BBox::around(x, y, size, size),
            ShapeStyle::fill(color.with_alpha(60)).outlined(WHITE.with_alpha(100), 4.0),
        );
    }
}

fn draw_characters(layer: &mut Canvas) {
    let w = layer.width() as f32;
    let h = layer.height() as f32;

    let main_x = (layer.width() / 2) as f32;
    let main_y = (layer.height() / 2 + 50) as f32;
    draw_cat_face(layer, main_x, main_y, 220.0, PINK);
    draw_headphones(layer, main_x, main_y - 50.0, 180.0, ELECTRIC_BLUE);

    draw_cat_face(layer, 300.0, 350.0, 110.0, SUNSHINE_YELLOW);
    draw_cat_face(layer, w - 300.0, 380.0, 100.0, MINT);
    draw_cat_face(layer, 250.0, h - 250.0, 90.0, LAVENDER);
    draw_cat_face(layer, w - 280.0, h - 280.0, 95.0, PEACH);

    let notes = [
        (450.0, 200.0, 40.0, ELECTRIC_BLUE),
        (1150.0, 220.0, 35.0, PINK),
        (200.0, 600.0, 38.0, SUNSHINE_YELLOW),
        (1350.0, 650.0, 42.0, DEEP_PURPLE),
        (600.0, 950.0, 36.0, MINT),
        (1000.0, 980.0, 39.0, PINK),
    ];
    for (x, y, size, color) in notes {
        draw_music_note(layer, x, y, size, color);
    }

    let stars = [
        (150.0, 150.0, 30.0, SUNSHINE_YELLOW),
        (1450.0, 180.0, 28.0, PINK),
        (100.0, h - 150.0, 32.0, ELECTRIC_BLUE),
        (1500.0, h - 120.0, 27.0, LAVENDER),
        (800.0, 100.0, 35.0, MINT),
        (700.0, 1050.0, 29.0, DEEP_PURPLE),
        (1200.0, 1080.0, 31.0, SUNSHINE_YELLOW),
    ];
    for (x, y, size, color) in stars {
        draw_star(layer, x, y, size, color, 5);
    }
}

/// Kawaii cat face: round head, pointed ears, big glossy eyes, whiskers, blush
pub fn draw_cat_face(canvas: &mut Canvas, x: f32, y: f32, size: f32, color: Rgb) {
    canvas.ellipse(
        BBox::around(x, y, size, size),
        ShapeStyle::fill(color).outlined(WHITE, 8.0),
    );

    for side in [-1.0f32, 1.0] {
        let ear = [
            (x + side * size * 0.7, y - size * 0.5),
            (x + side * size * 0.9, y - size * 1.2),
            (x + side * size * 0.3, y - size * 0.8),
        ];
        canvas.polygon(&ear, ShapeStyle::fill(color).outlined(WHITE, 1.0));
        canvas.ellipse(
            BBox::around(x + side * size * 0.75, y - size * 0.85, 15.0, 15.0),
            ShapeStyle::fill(DARK_PINK),
        );
    }

    let eye_y = y - size * 0.2;
    for side in [-1.0f32, 1.0] {
        let eye_x = x + side * size * 0.4;
        canvas.ellipse(BBox::around(eye_x, eye_y, 25.0, 35.0), ShapeStyle::fill(EYE_DARK));
        canvas.ellipse(BBox::around(eye_x, eye_y, 18.0, 28.0), ShapeStyle::fill(ELECTRIC_BLUE));
        canvas.ellipse(
            BBox::new(eye_x - 10.0, eye_y - 20.0, eye_x + 5.0, eye_y - 5.0),
            ShapeStyle::fill(WHITE),
        );
        canvas.ellipse(
            BBox::new(eye_x + 8.0, eye_y + 10.0, eye_x + 15.0, eye_y + 17.0),
            ShapeStyle::fill(EYE_GLINT),
        );
    }

    let nose = [
        (x, y + size * 0.1),
        (x - 12.0, y + size * 0.25),
        (x + 12.0, y + size * 0.25),
    ];
    canvas.polygon(&nose, ShapeStyle::fill(DARK_PINK));

    canvas.arc(
        BBox::new(x - 30.0, y + size * 0.1, x + 30.0, y + size * 0.5),
        0.0,
        180.0,
        EYE_DARK.opaque(),
        6.0,
    );

    for side in [-1.0f32, 1.0] {
        let inner = x + side * size * 0.8;
        let outer = x + side * size * 1.3;
        canvas.line((inner, y), (outer, y - 20.0), WHISKER, 4.0);
        canvas.line((inner, y + 20.0), (outer, y + 20.0), WHISKER, 4.0);
        canvas.line((inner, y + 40.0), (outer, y + 60.0), WHISKER, 4.0);
    }

    for side in [-1.0f32, 1.0] {
        canvas.ellipse(
            BBox::around(x + side * size * 0.85, y + size * 0.3, 20.0, 15.0),
            ShapeStyle::fill(BLUSH),
        );
    }
}

/// Eighth note: round head, stem, triangular flag
pub fn draw_music_note(canvas: &mut Canvas, x: f32, y: f32, size: f32, color: Rgb) {
    canvas.ellipse(
        BBox::new(x - size / 2.0, y + size, x + size / 2.0, y + size * 2.0),
        ShapeStyle::fill(color).outlined(WHITE, 3.0),
    );
    canvas.rectangle(
        BBox::new(x + size / 2.0 - 6.0, y - size * 2.0, x + size / 2.0 + 6.0, y + size),
        ShapeStyle::fill(color).outlined(WHITE, 3.0),
    );
    let flag = [
        (x + size / 2.0, y - size * 2.0),
        (x + size * 1.5, y - size),
        (x + size / 2.0, y - size * 0.5),
    ];
    canvas.polygon(&flag, ShapeStyle::fill(color).outlined(WHITE, 1.0));
}

pub fn draw_star(canvas: &mut Canvas, x: f32, y: f32, size: f32, color: Rgb, points: usize) {
    let vertices = star_points(x, y, size, points);
    canvas.polygon(&vertices, ShapeStyle::fill(color).outlined(WHITE, 3.0));
}

/// Headband arc over the head with a cushioned cup on each side
pub fn draw_headphones(canvas: &mut Canvas, x: f32, y: f32, size: f32, color: Rgb) {
    canvas.arc(
        BBox::new(x - size, y - size * 0.3, x + size, y + size * 1.5),
        180.0,
        360.0,
        color.opaque(),
        15.0,
    );
    for side in [-1.0f32, 1.0] {
        let cx = x + side * size;
        let cy = y + size * 0.5;
        canvas.ellipse(
            BBox::around(cx, cy, 30.0, 30.0),
            ShapeStyle::fill(color).outlined(WHITE, 6.0),
        );
        canvas.ellipse(BBox::around(cx, cy, 20.0, 20.0), ShapeStyle::fill(DARK_PINK));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> PosterConfig {
        PosterConfig {
            width: 400,
            height: 300,
            seed: Some(seed),
            font: FontSource::Builtin,
            ..PosterConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = PosterConfig::default();
        assert_eq!((config.width, config.height), (1600, 1200));
        assert_eq!(config.print.dpi, 300);
        assert_eq!(config.output_path, PathBuf::from("neko-sonic-poster.png"));
    }

    #[test]
    fn test_gradient_runs_lavender_to_pink() {
        let canvas = gradient_background(10, 100).unwrap();
        let top = canvas.pixel(5, 0).unwrap();
        let bottom = canvas.pixel(5, 99).unwrap();
        // Blue channel falls from lavender (255) toward soft pink (193)
        assert!(top.2 > bottom.2);
        assert_eq!(top.3, 255);
    }

    #[test]
    fn test_star_is_filled_at_center() {
        let mut canvas = Canvas::new(100, 100).unwrap();
        draw_star(&mut canvas, 50.0, 50.0, 30.0, MINT, 5);
        assert_eq!(canvas.pixel(50, 50), Some(MINT.opaque()));
        assert_eq!(canvas.pixel(2, 98).map(|c| c.3), Some(0));
    }

    #[test]
    fn test_cat_face_eye_is_blue() {
        let mut canvas = Canvas::new(400, 400).unwrap();
        draw_cat_face(&mut canvas, 200.0, 200.0, 100.0, PINK);
        // Iris center sits left of the face center, above it
        assert_eq!(canvas.pixel(160, 185), Some(ELECTRIC_BLUE.opaque()));
        assert_eq!(canvas.pixel(200, 200).map(|c| (c.0, c.1, c.2)), Some((255, 105, 180)));
    }

    #[test]
    fn test_render_dimensions() {
        let img = Poster::new(small_config(1)).render().unwrap();
        assert_eq!((img.width(), img.height()), (400, 300));
    }

    #[test]
    fn test_seeded_render_is_deterministic() {
        let a = Poster::new(small_config(42)).render().unwrap().encode_png(300).unwrap();
        let b = Poster::new(small_config(42)).render().unwrap().encode_png(300).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_font_file_falls_back() {
        let face = resolve_face(&FontSource::File(PathBuf::from("/nonexistent/face.ttf")));
        assert!(matches!(face, TextFace::Bitmap));
    }

    #[test]
    fn test_system_source_uses_installed_sans() {
        let installed = find_system_sans().is_some();
        let face = resolve_face(&FontSource::System);
        assert_eq!(matches!(face, TextFace::Outline(_)), installed);
    }
}
