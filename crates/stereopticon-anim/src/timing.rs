//! Timing (easing) functions.
//!
//! A timing function maps the linear elapsed fraction of a run to an eased
//! progress value. Inputs are normally in `[0, 1]`; outputs may leave that
//! range for overshoot effects. The driver clamps the *input* to at most 1
//! but never clamps the output.

use std::f32::consts::PI;

/// Pure timing function: linear elapsed fraction → eased progress.
pub type Timing = fn(f32) -> f32;

/// Identity timing: progress equals elapsed fraction.
#[inline]
pub fn linear(x: f32) -> f32 {
    x
}

/// Sinusoidal ease-in-out: slow start, slow stop.
#[inline]
pub fn ease_in_out_sine(x: f32) -> f32 {
    -((PI * x).cos() - 1.0) / 2.0
}
