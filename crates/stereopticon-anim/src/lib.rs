//! Frame-driven animation driver.
//!
//! Drives a sequence of per-frame progress callbacks in `[0, 1]` against a
//! monotonic clock, decoupled from what is being animated. The host owns the
//! per-frame scheduling primitive (a display refresh callback, a render loop,
//! a test harness) and injects it as a [`FrameScheduler`]; the driver has no
//! implicit process-wide dependency.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`timing`] | `linear`, `ease_in_out_sine`, the `Timing` function type |
//! | [`scheduler`] | `FrameScheduler` trait, `FrameQueue` implementation |
//! | [`driver`] | `Animation`, `start`, `AnimationHandle` |
//! | [`session`] | `ScopedAnimation`, `start_scoped`, abort signalling, `Completion` |
//!
//! # Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use stereopticon_anim::{Animation, FrameQueue, start, timing};
//!
//! let mut frames = FrameQueue::new();
//! let handle = start(
//!     &mut frames,
//!     Animation::new(timing::linear, Duration::from_secs(1))
//!         .on_update(|p| println!("progress {p}")),
//! );
//!
//! // The host loop pumps the queue once per frame with the current time.
//! frames.pump(0.5);
//! assert!(handle.running());
//! frames.pump(1.0);
//! assert!(!handle.running());
//! ```
//!
//! All state is single-threaded by design: suspension between frames happens
//! only by yielding control back to the host loop, never by blocking.

pub mod driver;
pub mod scheduler;
pub mod session;
pub mod timing;

pub use driver::{start, Animation, AnimationHandle};
pub use scheduler::{FrameCallback, FrameQueue, FrameScheduler};
pub use session::{start_scoped, AbortController, AbortSignal, Completion, ScopedAnimation};
pub use timing::{ease_in_out_sine, linear, Timing};
