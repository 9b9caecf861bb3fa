//! Pixel color type

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGBA color.
///
/// Frame buffers store pixels packed as `0xAARRGGBB`; use [`Color::to_argb`]
/// and [`Color::from_argb`] to cross that boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Opaque color from a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub const fn from_argb(argb: u32) -> Self {
        Self::rgba((argb >> 16) as u8, (argb >> 8) as u8, argb as u8, (argb >> 24) as u8)
    }

    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Source-over composite of `self` onto `dst`, with `self`'s alpha
    /// additionally scaled by `coverage` in `[0, 1]`.
    pub fn over(self, dst: Color, coverage: f32) -> Color {
        let sa = (self.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return dst;
        }
        let da = dst.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        Color::rgba(
            mix(self.r, dst.r),
            mix(self.g, dst.g),
            mix(self.b, dst.b),
            (out_a * 255.0).round() as u8,
        )
    }

    /// Rec. 601 luma in `[0, 255]`
    pub fn luma(self) -> u8 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32).round() as u8
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_packing() {
        let c = Color::rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(c.to_argb(), 0x4411_2233);
        assert_eq!(Color::from_argb(0x4411_2233), c);
        assert_eq!(Color::TRANSPARENT.to_argb(), 0);
    }

    #[test]
    fn hex_is_opaque() {
        assert_eq!(Color::from_hex(0xFF8000), Color::rgba(255, 128, 0, 255));
    }

    #[test]
    fn over_opaque_replaces() {
        assert_eq!(Color::RED.over(Color::BLUE, 1.0), Color::RED);
    }

    #[test]
    fn over_zero_coverage_keeps_destination() {
        assert_eq!(Color::RED.over(Color::BLUE, 0.0), Color::BLUE);
    }

    #[test]
    fn over_half_coverage_blends() {
        let c = Color::WHITE.over(Color::BLACK, 0.5);
        assert_eq!(c.a, 255);
        assert!((127..=128).contains(&c.r));
    }

    #[test]
    fn luma_of_white_and_black() {
        assert_eq!(Color::WHITE.luma(), 255);
        assert_eq!(Color::BLACK.luma(), 0);
    }
}
