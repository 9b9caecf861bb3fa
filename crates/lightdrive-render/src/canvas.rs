//! Drawing context handed to the state layer during a render pass

use crate::frame_buffer::FrameBuffer;
use crate::hints::RenderHints;
use lightdrive_core::Color;

/// Mutable view of the offscreen frame buffer for one render pass.
///
/// The pipeline owns the buffer; a canvas only lives for the duration of
/// `StateLayer::render`.
pub struct Canvas<'a> {
    buffer: &'a mut FrameBuffer,
    hints: RenderHints,
}

impl<'a> Canvas<'a> {
    pub fn new(buffer: &'a mut FrameBuffer, hints: RenderHints) -> Self {
        Self { buffer, hints }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn hints(&self) -> RenderHints {
        self.hints
    }

    pub fn clear(&mut self, color: Color) {
        self.buffer.clear(color);
    }

    pub fn set_pixel(&mut self, x: i64, y: i64, color: Color) {
        self.buffer.set(x, y, color);
    }

    pub fn pixel(&self, x: i64, y: i64) -> Option<Color> {
        self.buffer.get(x, y)
    }

    /// Integer rectangle, composited over the current contents
    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Color) {
        if color.a == 255 {
            self.buffer.fill_rect(x, y, w, h, color);
            return;
        }
        self.buffer.blend_rect(x, y, w, h, color);
    }

    /// Rectangle with fractional bounds.
    ///
    /// With shape smoothing on, edge pixels get partial coverage; otherwise
    /// the bounds are rounded to whole pixels.
    pub fn fill_rect_f(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let (x1, y1) = (x + w, y + h);
        if !self.hints.shape_smoothing {
            let cols = pixel_span(x.round(), x1.round(), self.width());
            let rows = pixel_span(y.round(), y1.round(), self.height());
            let (w, h) = ((cols.1 - cols.0) as u32, (rows.1 - rows.0) as u32);
            self.fill_rect(cols.0 as i64, rows.0 as i64, w, h, color);
            return;
        }
        let cols = pixel_span(x.floor(), x1.ceil(), self.width());
        let rows = pixel_span(y.floor(), y1.ceil(), self.height());
        for py in rows.0..rows.1 {
            let cov_y = overlap(py as f32, y, y1);
            for px in cols.0..cols.1 {
                let coverage = cov_y * overlap(px as f32, x, x1);
                if coverage > 0.0 {
                    self.buffer.blend(px as i64, py as i64, color, coverage);
                }
            }
        }
    }

    /// Direct access for drawing routines the canvas does not offer
    pub fn buffer_mut(&mut self) -> &mut FrameBuffer {
        self.buffer
    }
}

/// Whole-pixel range `[lo, hi)` clipped to `[0, limit)`
fn pixel_span(lo: f32, hi: f32, limit: u32) -> (usize, usize) {
    let lo = (lo as i64).clamp(0, limit as i64);
    let hi = (hi as i64).clamp(lo, limit as i64);
    (lo as usize, hi as usize)
}

/// Length of `[cell, cell + 1)` covered by `[lo, hi)`
fn overlap(cell: f32, lo: f32, hi: f32) -> f32 {
    (hi.min(cell + 1.0) - lo.max(cell)).clamp(0.0, 1.0)
}
