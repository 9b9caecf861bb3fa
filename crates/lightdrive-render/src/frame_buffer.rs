//! Offscreen ARGB pixel buffer

use crate::error::RenderError;
use lightdrive_core::Color;
use std::path::Path;

/// A CPU pixel surface of fixed size, pixels packed as `0xAARRGGBB`.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl FrameBuffer {
    /// Create a fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i64, y: i64) -> Option<Color> {
        self.index(x, y).map(|i| Color::from_argb(self.pixels[i]))
    }

    /// Overwrite one pixel; out-of-bounds writes are ignored
    pub fn set(&mut self, x: i64, y: i64, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color.to_argb();
        }
    }

    /// Composite `color` over one pixel with the given coverage
    pub fn blend(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if let Some(i) = self.index(x, y) {
            let dst = Color::from_argb(self.pixels[i]);
            self.pixels[i] = color.over(dst, coverage).to_argb();
        }
    }

    /// Fill the whole extent with one color
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_argb());
    }

    /// Overwrite an axis-aligned rectangle, clipped to the buffer
    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Color) {
        let (x0, x1) = clip_span(x, w, self.width);
        let (y0, y1) = clip_span(y, h, self.height);
        let argb = color.to_argb();
        let stride = self.width as usize;
        for row in y0..y1 {
            self.pixels[row * stride + x0..row * stride + x1].fill(argb);
        }
    }

    /// Composite `color` over an axis-aligned rectangle, clipped to the buffer
    pub fn blend_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Color) {
        let (x0, x1) = clip_span(x, w, self.width);
        let (y0, y1) = clip_span(y, h, self.height);
        let stride = self.width as usize;
        for row in y0..y1 {
            for px in &mut self.pixels[row * stride + x0..row * stride + x1] {
                *px = color.over(Color::from_argb(*px), 1.0).to_argb();
            }
        }
    }

    /// Apply `f` to every pixel in place
    pub fn map_pixels(&mut self, mut f: impl FnMut(u32, u32, Color) -> Color) {
        let w = self.width as usize;
        for (i, px) in self.pixels.iter_mut().enumerate() {
            let (x, y) = ((i % w) as u32, (i / w) as u32);
            *px = f(x, y, Color::from_argb(*px)).to_argb();
        }
    }

    /// Nearest-neighbour scale of `self` onto the whole of `dst`.
    pub fn scale_into(&self, dst: &mut FrameBuffer) {
        if dst.size() == self.size() {
            dst.pixels.copy_from_slice(&self.pixels);
            return;
        }
        if self.width == 0 || self.height == 0 {
            dst.clear(Color::TRANSPARENT);
            return;
        }
        let (sw, sh) = (self.width as u64, self.height as u64);
        let (dw, dh) = (dst.width as u64, dst.height as u64);
        for dy in 0..dh {
            let sy = (dy * sh / dh) as usize;
            let src_row = &self.pixels[sy * sw as usize..(sy + 1) * sw as usize];
            let dst_row = &mut dst.pixels[(dy * dw) as usize..((dy + 1) * dw) as usize];
            for (dx, px) in dst_row.iter_mut().enumerate() {
                *px = src_row[(dx as u64 * sw / dw) as usize];
            }
        }
    }

    /// Convert to an `image` RGBA buffer
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut raw = Vec::with_capacity(self.pixels.len() * 4);
        for &px in &self.pixels {
            let c = Color::from_argb(px);
            raw.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        image::RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    /// Encode as PNG at `path`
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        self.to_rgba_image()
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Visible part of `[start, start + len)` within `[0, limit)`
fn clip_span(start: i64, len: u32, limit: u32) -> (usize, usize) {
    let limit = limit as i64;
    let lo = start.clamp(0, limit);
    let hi = start.saturating_add(len as i64).clamp(0, limit);
    (lo as usize, hi.max(lo) as usize)
}
