//! LightDrive Render - software frame buffer and present pipeline
//!
//! The state layer draws into an offscreen `FrameBuffer` through a `Canvas`;
//! the `FilterChain` post-processes it in place and the `RenderPipeline`
//! scales the result into a `DisplaySurface` back buffer and shows it.

mod canvas;
mod error;
mod filter;
pub mod filters;
mod frame_buffer;
mod hints;
mod pipeline;
pub mod surface;

pub use canvas::Canvas;
pub use error::RenderError;
pub use filter::{Filter, FilterChain, FilterHandle, FilterSnapshot};
pub use filters::parse_filter;
pub use frame_buffer::FrameBuffer;
pub use hints::{Antialiasing, RenderHints};
pub use pipeline::{FrameStats, RenderPipeline};
pub use surface::{DisplaySurface, HeadlessSurface, PresentProbe};
