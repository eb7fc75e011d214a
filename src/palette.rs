//! Color Palettes
//!
//! Named colors for the poster scene. Report colors live in `styles`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn with_alpha(self, alpha: u8) -> Rgba {
        Rgba(self.0, self.1, self.2, alpha)
    }

    pub const fn opaque(self) -> Rgba {
        self.with_alpha(255)
    }

    /// Channels as 0.0..=1.0 floats, the form PDF content streams take
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

impl From<Rgb> for Rgba {
    fn from(c: Rgb) -> Self {
        c.opaque()
    }
}

// Anime festival palette
pub const PINK: Rgb = Rgb(255, 105, 180);
pub const ELECTRIC_BLUE: Rgb = Rgb(0, 191, 255);
pub const SUNSHINE_YELLOW: Rgb = Rgb(255, 223, 0);
pub const DEEP_PURPLE: Rgb = Rgb(138, 43, 226);
pub const SOFT_PINK: Rgb = Rgb(255, 182, 193);
pub const MINT: Rgb = Rgb(152, 255, 152);
pub const PEACH: Rgb = Rgb(255, 218, 185);
pub const LAVENDER: Rgb = Rgb(230, 190, 255);
pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const CREAM: Rgb = Rgb(255, 253, 240);
pub const DARK_PINK: Rgb = Rgb(199, 21, 133);

// Face details
pub const EYE_DARK: Rgb = Rgb(40, 40, 60);
pub const EYE_GLINT: Rgb = Rgb(200, 230, 255);
pub const BLUSH: Rgba = Rgba(255, 150, 180, 100);
pub const WHISKER: Rgba = Rgba(255, 255, 255, 200);

/// Colors the decorative background circles draw from
pub const BUBBLE_COLORS: [Rgb; 5] = [PINK, ELECTRIC_BLUE, SUNSHINE_YELLOW, LAVENDER, MINT];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_channels() {
        let (r, g, b) = WHITE.to_unit();
        assert_eq!((r, g, b), (1.0, 1.0, 1.0));
    }
}
