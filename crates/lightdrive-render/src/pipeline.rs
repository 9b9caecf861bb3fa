//! Offscreen render, filter and present pipeline
//!
//! One frame is: clear the frame buffer, let the state draw into it, run the
//! filter chain over it, then scale it into the display surface's back buffer
//! and show it. The internal resolution is fixed by the configuration; the
//! surface may report any output size.

use crate::canvas::Canvas;
use crate::error::RenderError;
use crate::filter::FilterChain;
use crate::frame_buffer::FrameBuffer;
use crate::hints::{Antialiasing, RenderHints};
use crate::surface::DisplaySurface;
use lightdrive_core::{Color, LightDriveError};
use std::sync::Arc;

/// Per-frame counters of the last rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub filters_applied: usize,
    pub output_size: (u32, u32),
}

/// Owns the frame buffer and the display surface between `open` and `close`.
pub struct RenderPipeline {
    width: u32,
    height: u32,
    hints: RenderHints,
    filters: Arc<FilterChain>,
    buffer: Option<FrameBuffer>,
    surface: Option<Box<dyn DisplaySurface>>,
}

impl RenderPipeline {
    pub fn new(width: u32, height: u32, filters: Arc<FilterChain>) -> Self {
        Self {
            width,
            height,
            hints: RenderHints::default(),
            filters,
            buffer: None,
            surface: None,
        }
    }

    /// Attach a surface and allocate the frame buffer
    pub fn open(&mut self, surface: Box<dyn DisplaySurface>) {
        if self.surface.is_some() {
            self.close();
        }
        let (out_w, out_h) = surface.output_size();
        log::debug!(
            "Render pipeline open: internal {}x{}, output {}x{}",
            self.width,
            self.height,
            out_w,
            out_h
        );
        self.buffer = Some(FrameBuffer::new(self.width, self.height));
        self.surface = Some(surface);
    }

    pub fn is_open(&self) -> bool {
        self.surface.is_some() && self.buffer.is_some()
    }

    pub fn view_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn hints(&self) -> RenderHints {
        self.hints
    }

    pub fn set_antialiasing(&mut self, mode: Antialiasing) {
        self.hints.apply(mode);
    }

    pub fn filters(&self) -> &Arc<FilterChain> {
        &self.filters
    }

    /// Render one frame.
    ///
    /// `draw` receives a canvas over the cleared frame buffer. Its error is
    /// returned untouched and nothing is presented for that frame.
    pub fn render_frame<F>(&mut self, draw: F) -> Result<FrameStats, LightDriveError>
    where
        F: FnOnce(&mut Canvas<'_>) -> Result<(), LightDriveError>,
    {
        let (Some(buffer), Some(surface)) = (self.buffer.as_mut(), self.surface.as_mut()) else {
            return Err(RenderError::NotInitialized("render_frame").into());
        };

        buffer.clear(Color::TRANSPARENT);
        {
            let mut canvas = Canvas::new(buffer, self.hints);
            draw(&mut canvas)?;
        }

        let filters_applied = if self.filters.is_empty() {
            0
        } else {
            self.filters.apply_all(buffer)
        };

        let back = surface.back_buffer()?;
        buffer.scale_into(back);
        let output_size = back.size();
        surface.show()?;

        Ok(FrameStats {
            filters_applied,
            output_size,
        })
    }

    /// Forward a diagnostic title to the surface
    pub fn set_title(&mut self, title: &str) {
        if let Some(surface) = self.surface.as_mut() {
            surface.set_title(title);
        }
    }

    /// Copy of the current frame buffer contents
    pub fn snapshot(&self) -> Option<FrameBuffer> {
        self.buffer.clone()
    }

    /// Dispose the surface and release the frame buffer. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.dispose();
            log::debug!("Render pipeline closed");
        }
        self.buffer = None;
    }
}

impl Drop for RenderPipeline {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterHandle;
    use crate::filters::{FnFilter, Invert};
    use crate::surface::HeadlessSurface;

    fn pipeline(w: u32, h: u32) -> RenderPipeline {
        RenderPipeline::new(w, h, Arc::new(FilterChain::new()))
    }

    #[test]
    fn render_before_open_is_not_initialized() {
        let mut p = pipeline(4, 4);
        let err = p.render_frame(|_| Ok(())).unwrap_err();
        assert!(matches!(err, LightDriveError::NotInitialized(_)));
    }

    #[test]
    fn frame_is_cleared_drawn_and_presented() {
        let mut p = pipeline(2, 2);
        let surface = HeadlessSurface::new(2, 2);
        let probe = surface.probe();
        p.open(Box::new(surface));

        p.render_frame(|c| {
            c.set_pixel(0, 0, Color::RED);
            Ok(())
        })
        .unwrap();
        // the second frame must not see the first one's pixels
        p.render_frame(|c| {
            assert_eq!(c.pixel(0, 0), Some(Color::TRANSPARENT));
            Ok(())
        })
        .unwrap();

        assert_eq!(probe.presented(), 2);
        assert_eq!(probe.last_frame().unwrap().get(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn filters_run_after_draw_in_order() {
        let chain = Arc::new(FilterChain::new());
        chain.add(FilterHandle::new(FnFilter::new("red", |fb: &mut FrameBuffer| {
            fb.clear(Color::RED)
        })));
        chain.add(FilterHandle::new(Invert));
        let mut p = RenderPipeline::new(1, 1, Arc::clone(&chain));
        let surface = HeadlessSurface::new(1, 1);
        let probe = surface.probe();
        p.open(Box::new(surface));

        let stats = p
            .render_frame(|c| {
                c.clear(Color::BLUE);
                Ok(())
            })
            .unwrap();
        assert_eq!(stats.filters_applied, 2);
        assert_eq!(
            probe.last_frame().unwrap().get(0, 0),
            Some(Color::rgb(0, 255, 255))
        );
    }

    #[test]
    fn output_is_scaled_to_surface_size() {
        let mut p = pipeline(2, 1);
        let surface = HeadlessSurface::new(4, 2);
        let probe = surface.probe();
        p.open(Box::new(surface));
        let stats = p
            .render_frame(|c| {
                c.set_pixel(1, 0, Color::GREEN);
                Ok(())
            })
            .unwrap();
        assert_eq!(stats.output_size, (4, 2));
        let shown = probe.last_frame().unwrap();
        assert_eq!(shown.get(3, 1), Some(Color::GREEN));
        assert_eq!(shown.get(0, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn draw_error_skips_present() {
        let mut p = pipeline(1, 1);
        let surface = HeadlessSurface::new(1, 1);
        let probe = surface.probe();
        p.open(Box::new(surface));
        let err = p
            .render_frame(|_| Err(LightDriveError::state("boom")))
            .unwrap_err();
        assert!(matches!(err, LightDriveError::State(_)));
        assert_eq!(probe.presented(), 0);
    }

    #[test]
    fn close_disposes_surface_and_releases_buffer() {
        let mut p = pipeline(1, 1);
        let surface = HeadlessSurface::new(1, 1);
        let probe = surface.probe();
        p.open(Box::new(surface));
        assert!(p.is_open());
        p.close();
        p.close();
        assert!(!p.is_open());
        assert!(probe.is_disposed());
        assert!(p.snapshot().is_none());
    }

    #[test]
    fn antialiasing_updates_canvas_hints() {
        let mut p = pipeline(1, 1);
        p.open(Box::new(HeadlessSurface::new(1, 1)));
        p.set_antialiasing(Antialiasing::BOTH);
        p.render_frame(|c| {
            assert!(c.hints().shape_smoothing && c.hints().text_smoothing);
            Ok(())
        })
        .unwrap();
    }
}
