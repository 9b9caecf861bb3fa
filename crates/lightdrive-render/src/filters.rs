//! Built-in CPU filters
//!
//! Software counterparts of the usual post-process stages: exposure,
//! vignette and two colour remaps. All of them leave alpha untouched.

use crate::filter::Filter;
use crate::frame_buffer::FrameBuffer;
use lightdrive_core::Color;

/// Inverts the RGB channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Invert;

impl Filter for Invert {
    fn apply(&self, buffer: &mut FrameBuffer) {
        buffer.map_pixels(|_, _, c| Color::rgba(255 - c.r, 255 - c.g, 255 - c.b, c.a));
    }

    fn name(&self) -> &str {
        "invert"
    }
}

/// Replaces RGB with luma.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grayscale;

impl Filter for Grayscale {
    fn apply(&self, buffer: &mut FrameBuffer) {
        buffer.map_pixels(|_, _, c| {
            let l = c.luma();
            Color::rgba(l, l, l, c.a)
        });
    }

    fn name(&self) -> &str {
        "grayscale"
    }
}

/// Scales RGB by a constant factor, saturating at white.
#[derive(Debug, Clone, Copy)]
pub struct Exposure {
    pub factor: f32,
}

impl Exposure {
    pub fn new(factor: f32) -> Self {
        Self {
            factor: factor.max(0.0),
        }
    }
}

impl Filter for Exposure {
    fn apply(&self, buffer: &mut FrameBuffer) {
        let k = self.factor;
        let scale = |v: u8| (v as f32 * k).round().clamp(0.0, 255.0) as u8;
        buffer.map_pixels(|_, _, c| Color::rgba(scale(c.r), scale(c.g), scale(c.b), c.a));
    }

    fn name(&self) -> &str {
        "exposure"
    }
}

/// Darkens toward the corners.
#[derive(Debug, Clone, Copy)]
pub struct Vignette {
    /// 0 leaves the image untouched, 1 blacks out the corners
    pub intensity: f32,
    /// Falloff exponent; larger values keep more of the centre bright
    pub smoothness: f32,
}

impl Default for Vignette {
    fn default() -> Self {
        Self {
            intensity: 0.3,
            smoothness: 2.0,
        }
    }
}

impl Filter for Vignette {
    fn apply(&self, buffer: &mut FrameBuffer) {
        let (w, h) = buffer.size();
        if w == 0 || h == 0 {
            return;
        }
        let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
        let max_d = (cx * cx + cy * cy).sqrt();
        let intensity = self.intensity.clamp(0.0, 1.0);
        let smoothness = self.smoothness.max(0.01);
        buffer.map_pixels(|x, y, c| {
            let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
            let d = (dx * dx + dy * dy).sqrt() / max_d;
            let k = 1.0 - intensity * d.powf(smoothness);
            let shade = |v: u8| (v as f32 * k).round().clamp(0.0, 255.0) as u8;
            Color::rgba(shade(c.r), shade(c.g), shade(c.b), c.a)
        });
    }

    fn name(&self) -> &str {
        "vignette"
    }
}

/// Adapts a closure into a filter.
pub struct FnFilter<F> {
    name: String,
    f: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&mut FrameBuffer) + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(&mut FrameBuffer) + Send + Sync,
{
    fn apply(&self, buffer: &mut FrameBuffer) {
        (self.f)(buffer);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Parse a filter spec such as `invert`, `grayscale`, `exposure=1.5` or
/// `vignette=0.4`.
pub fn parse_filter(spec: &str) -> Option<crate::filter::FilterHandle> {
    use crate::filter::FilterHandle;

    let (name, arg) = match spec.split_once('=') {
        Some((n, a)) => (n.trim(), Some(a.trim())),
        None => (spec.trim(), None),
    };
    let number = |default: f32| -> Option<f32> {
        match arg {
            Some(a) => a.parse().ok(),
            None => Some(default),
        }
    };
    match name.to_ascii_lowercase().as_str() {
        "invert" => Some(FilterHandle::new(Invert)),
        "grayscale" | "greyscale" => Some(FilterHandle::new(Grayscale)),
        "exposure" => Some(FilterHandle::new(Exposure::new(number(1.0)?))),
        "vignette" => Some(FilterHandle::new(Vignette {
            intensity: number(0.3)?,
            ..Vignette::default()
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(c: Color) -> FrameBuffer {
        let mut fb = FrameBuffer::new(1, 1);
        fb.set(0, 0, c);
        fb
    }

    #[test]
    fn invert_keeps_alpha() {
        let mut fb = single(Color::rgba(10, 20, 30, 40));
        Invert.apply(&mut fb);
        assert_eq!(fb.get(0, 0), Some(Color::rgba(245, 235, 225, 40)));
    }

    #[test]
    fn invert_twice_is_identity() {
        let mut fb = single(Color::rgba(1, 2, 3, 4));
        Invert.apply(&mut fb);
        Invert.apply(&mut fb);
        assert_eq!(fb.get(0, 0), Some(Color::rgba(1, 2, 3, 4)));
    }

    #[test]
    fn grayscale_equalizes_channels() {
        let mut fb = single(Color::RED);
        Grayscale.apply(&mut fb);
        let c = fb.get(0, 0).unwrap();
        assert_eq!(c.r, c.g);
        assert_eq!(c.g, c.b);
        assert_eq!(c.r, 76);
    }

    #[test]
    fn exposure_saturates() {
        let mut fb = single(Color::rgb(100, 200, 0));
        Exposure::new(2.0).apply(&mut fb);
        assert_eq!(fb.get(0, 0), Some(Color::rgb(200, 255, 0)));
    }

    #[test]
    fn vignette_darkens_corners_more_than_centre() {
        let mut fb = FrameBuffer::new(9, 9);
        fb.clear(Color::WHITE);
        Vignette {
            intensity: 1.0,
            smoothness: 1.0,
        }
        .apply(&mut fb);
        let centre = fb.get(4, 4).unwrap();
        let corner = fb.get(0, 0).unwrap();
        assert!(corner.r < centre.r);
        assert_eq!(centre.a, 255);
    }

    #[test]
    fn parse_specs() {
        assert_eq!(parse_filter("invert").unwrap().name(), "invert");
        assert_eq!(parse_filter("exposure=1.5").unwrap().name(), "exposure");
        assert_eq!(parse_filter(" Vignette = 0.5 ").unwrap().name(), "vignette");
        assert!(parse_filter("exposure=bright").is_none());
        assert!(parse_filter("sepia").is_none());
    }
}
