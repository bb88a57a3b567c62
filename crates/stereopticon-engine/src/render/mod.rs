//! GPU rendering subsystem.
//!
//! Renderers issue GPU commands via wgpu against a [`RenderCtx`] (device,
//! queue, surface format, viewport) and a [`RenderTarget`] (encoder + color
//! view). Each renderer is responsible for its own GPU resources (pipelines,
//! buffers, textures).
//!
//! Convention:
//! - the viewport is in physical pixels (the stereo split addresses raw
//!   surface pixels, not DPI-scaled UI space)
//! - clip space is wgpu's: +Y up in NDC, depth in `[0, 1]`

mod color;
mod ctx;

pub use color::Color;
pub use ctx::{RenderCtx, RenderTarget};
