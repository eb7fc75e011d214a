//! Geometry helpers for the poster scene

use std::f32::consts::PI;

use crate::palette::Rgb;

/// Ratio of the inner (valley) radius to the outer (tip) radius of a star
pub const STAR_INNER_RATIO: f32 = 0.4;

/// Axis-aligned box given by its left, top, right, bottom edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Box of half-extents `rx`, `ry` around a center
    pub fn around(cx: f32, cy: f32, rx: f32, ry: f32) -> Self {
        Self::new(cx - rx, cy - ry, cx + rx, cy + ry)
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Star polygon vertices, alternating tip and valley, first tip pointing up.
///
/// Vertex `i` sits at angle `2π·i / (2·points) − π/2`; even indices use
/// `size`, odd ones `size · 0.4`.
pub fn star_points(cx: f32, cy: f32, size: f32, points: usize) -> Vec<(f32, f32)> {
    let count = points * 2;
    (0..count)
        .map(|i| {
            let angle = PI * 2.0 * i as f32 / count as f32 - PI / 2.0;
            let r = if i % 2 == 0 { size } else { size * STAR_INNER_RATIO };
            (cx + r * angle.cos(), cy + r * angle.sin())
        })
        .collect()
}

/// Per-channel linear blend from `from` (t = 0) to `to` (t = 1), truncated
pub fn lerp_rgb(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t) as u8;
    Rgb(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Points along the ellipse inscribed in `bbox`, from `start_deg` to `end_deg`.
///
/// Angles run clockwise from 3 o'clock in y-down screen space. An end angle
/// below the start wraps once around.
pub fn arc_points(bbox: BBox, start_deg: f32, end_deg: f32, segments: usize) -> Vec<(f32, f32)> {
    let (cx, cy) = bbox.center();
    let rx = bbox.width() / 2.0;
    let ry = bbox.height() / 2.0;
    let end_deg = if end_deg < start_deg { end_deg + 360.0 } else { end_deg };
    let segments = segments.max(1);

    (0..=segments)
        .map(|i| {
            let deg = start_deg + (end_deg - start_deg) * i as f32 / segments as f32;
            let rad = deg.to_radians();
            (cx + rx * rad.cos(), cy + ry * rad.sin())
        })
        .collect()
}
