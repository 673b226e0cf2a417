//! Traveler colors.
//!
//! Each traveler carries an RGBA color for display.  The palette spreads
//! hues evenly around the color wheel so neighbouring ids stay distinct.

/// Straight (non-premultiplied) RGBA, components in `[0, 1]`.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Fully saturated opaque color at `hue` degrees.
    pub fn from_hue(hue: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let x = 1.0 - (h % 2.0 - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        Self::rgba(r, g, b, 1.0)
    }

    /// `count` colors with evenly spaced hues.
    pub fn palette(count: usize) -> Vec<Color> {
        let step = 360.0 / count.max(1) as f32;
        (0..count).map(|i| Color::from_hue(i as f32 * step)).collect()
    }

    /// 8-bit `(r, g, b)` triple, e.g. for ANSI truecolor output.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}
