//! Presentation targets
//!
//! A display surface hands out a back buffer at its current output size,
//! accepts the scaled frame, and shows it. Window-backed implementations live
//! with the platform layer; [`HeadlessSurface`] presents into memory.

use crate::error::RenderError;
use crate::frame_buffer::FrameBuffer;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Number of swap buffers a headless surface rotates through by default
pub const DEFAULT_BUFFER_COUNT: usize = 3;

/// Destination of presented frames.
pub trait DisplaySurface: Send {
    /// Current output size in pixels; may differ from the internal resolution
    fn output_size(&self) -> (u32, u32);

    /// Acquire the back buffer to draw the next frame into
    fn back_buffer(&mut self) -> Result<&mut FrameBuffer, RenderError>;

    /// Submit the back buffer and advance the swap chain
    fn show(&mut self) -> Result<(), RenderError>;

    /// Diagnostic title (window caption, log line...)
    fn set_title(&mut self, _title: &str) {}

    /// Release every resource; the surface is unusable afterwards
    fn dispose(&mut self) {}
}

#[derive(Default)]
struct ProbeInner {
    presented: AtomicU64,
    disposed: AtomicBool,
    last: Mutex<Option<FrameBuffer>>,
    title: Mutex<String>,
}

/// Read-only view of what a [`HeadlessSurface`] has presented, usable from
/// other threads after the surface moved into the loop.
#[derive(Clone, Default)]
pub struct PresentProbe {
    inner: Arc<ProbeInner>,
}

impl PresentProbe {
    /// Number of frames shown so far
    pub fn presented(&self) -> u64 {
        self.inner.presented.load(Ordering::Acquire)
    }

    /// Copy of the most recently shown frame
    pub fn last_frame(&self) -> Option<FrameBuffer> {
        self.inner
            .last
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn title(&self) -> String {
        self.inner
            .title
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }
}

/// In-memory surface with a rotating set of swap buffers.
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    buffers: Vec<FrameBuffer>,
    back: usize,
    probe: PresentProbe,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_buffers(width, height, DEFAULT_BUFFER_COUNT)
    }

    pub fn with_buffers(width: u32, height: u32, count: usize) -> Self {
        Self {
            width,
            height,
            buffers: (0..count.max(1))
                .map(|_| FrameBuffer::new(width, height))
                .collect(),
            back: 0,
            probe: PresentProbe::default(),
        }
    }

    pub fn probe(&self) -> PresentProbe {
        self.probe.clone()
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Change the output size; swap buffers are recreated lazily
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl DisplaySurface for HeadlessSurface {
    fn output_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn back_buffer(&mut self) -> Result<&mut FrameBuffer, RenderError> {
        if self.buffers.is_empty() {
            return Err(RenderError::Surface("surface has been disposed".into()));
        }
        let size = (self.width, self.height);
        let buffer = &mut self.buffers[self.back];
        if buffer.size() != size {
            *buffer = FrameBuffer::new(size.0, size.1);
        }
        Ok(buffer)
    }

    fn show(&mut self) -> Result<(), RenderError> {
        let Some(front) = self.buffers.get(self.back) else {
            return Err(RenderError::Surface("surface has been disposed".into()));
        };
        {
            let mut last = self
                .probe
                .inner
                .last
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            match last.as_mut() {
                Some(copy) if copy.size() == front.size() => {
                    copy.pixels_mut().copy_from_slice(front.pixels())
                }
                _ => *last = Some(front.clone()),
            }
        }
        self.probe.inner.presented.fetch_add(1, Ordering::AcqRel);
        self.back = (self.back + 1) % self.buffers.len();
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        *self
            .probe
            .inner
            .title
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = title.to_string();
    }

    fn dispose(&mut self) {
        self.buffers.clear();
        self.back = 0;
        self.probe.inner.disposed.store(true, Ordering::Release);
    }
}
