//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per window (or per loop)
//! - call `tick()` once per presented frame to obtain `FrameTime`
//! - feed `FrameTime::elapsed` to animation schedulers as the monotonic "now"

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
