//! Coordinate and math types shared between the engine and renderers.
//!
//! Canonical spaces:
//! - Surface coordinates: physical pixels, origin top-left.
//! - World space: right-handed, +X right, +Y up, camera looking down −Z.
//! - Clip space: wgpu NDC (+Y up, depth in `[0, 1]`).

mod mat4;
mod viewport;

pub use mat4::Mat4;
pub use viewport::Viewport;
