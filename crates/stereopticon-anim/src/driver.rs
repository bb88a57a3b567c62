//! Callback-flavoured animation runs.
//!
//! [`start`] kicks off one run described by an [`Animation`] and returns an
//! [`AnimationHandle`] the caller owns. Per frame, with current time `t`:
//!
//! 1. if the handle was stopped, do nothing (no further frames are scheduled)
//! 2. `fraction = (t - start) / duration`, clamped to at most 1
//! 3. invoke `on_update(timing(fraction))`
//! 4. if `fraction < 1`, schedule another frame; otherwise mark the run
//!    finished and invoke `on_end` exactly once
//!
//! Exactly one of completion (`on_end` fires once) or cancellation (`on_end`
//! never fires) happens per run. A scheduled frame callback may still be
//! invoked by the host after `stop()`; step 1 suppresses its effects rather
//! than assuming the host cancelled the callback.
//!
//! The driver raises no errors of its own. A panicking `on_update` unwinds
//! through the host's pump and — since the follow-up frame is only scheduled
//! after the update returns — implicitly cancels the rest of the run.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::scheduler::FrameScheduler;
use crate::timing::Timing;

/// One animation run: timing function, duration, lifecycle callbacks.
///
/// A zero duration completes on the first scheduled frame with the fraction
/// clamped to 1.
pub struct Animation {
    timing: Timing,
    duration: Duration,
    on_start: Option<Box<dyn FnOnce()>>,
    on_update: Option<Box<dyn FnMut(f32)>>,
    on_end: Option<Box<dyn FnOnce()>>,
}

impl Animation {
    pub fn new(timing: Timing, duration: Duration) -> Self {
        Self {
            timing,
            duration,
            on_start: None,
            on_update: None,
            on_end: None,
        }
    }

    /// Invoked synchronously by [`start`], before the first frame is scheduled.
    pub fn on_start(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    /// Invoked once per frame with the eased progress value.
    pub fn on_update(mut self, f: impl FnMut(f32) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Invoked exactly once when the run completes. Never invoked after
    /// cancellation.
    pub fn on_end(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }
}

struct RunState {
    running: Cell<bool>,
    timing: Timing,
    duration: f64, // seconds
    start: f64,    // scheduler time at `start()`
    on_update: RefCell<Option<Box<dyn FnMut(f32)>>>,
    on_end: RefCell<Option<Box<dyn FnOnce()>>>,
}

/// Caller-owned handle to a run started with [`start`].
pub struct AnimationHandle {
    state: Rc<RunState>,
}

impl AnimationHandle {
    /// True from creation until the run is stopped or completes.
    pub fn running(&self) -> bool {
        self.state.running.get()
    }

    /// Requests cancellation. Idempotent; takes effect at the next frame
    /// boundary, after which no `on_update` or `on_end` call occurs.
    pub fn stop(&self) {
        self.state.running.set(false);
    }
}

/// Starts a run: invokes `on_start`, records the start time from
/// `scheduler.now()`, and schedules the first frame.
pub fn start(scheduler: &mut dyn FrameScheduler, animation: Animation) -> AnimationHandle {
    let Animation {
        timing,
        duration,
        on_start,
        on_update,
        on_end,
    } = animation;

    if let Some(f) = on_start {
        f();
    }

    let state = Rc::new(RunState {
        running: Cell::new(true),
        timing,
        duration: duration.as_secs_f64(),
        start: scheduler.now(),
        on_update: RefCell::new(on_update),
        on_end: RefCell::new(on_end),
    });

    schedule_frame(scheduler, Rc::clone(&state));
    AnimationHandle { state }
}

fn schedule_frame(scheduler: &mut dyn FrameScheduler, state: Rc<RunState>) {
    scheduler.schedule(Box::new(move |sched, now| frame(sched, state, now)));
}

fn frame(scheduler: &mut dyn FrameScheduler, state: Rc<RunState>, now: f64) {
    if !state.running.get() {
        return;
    }

    // Clamped to at most 1; negative values (host clock behind the start
    // timestamp) pass through to the timing function unclamped.
    let fraction = if state.duration > 0.0 {
        ((now - state.start) / state.duration).min(1.0)
    } else {
        1.0
    };

    if let Some(update) = state.on_update.borrow_mut().as_mut() {
        update((state.timing)(fraction as f32));
    }

    if fraction < 1.0 {
        schedule_frame(scheduler, state);
    } else {
        state.running.set(false);
        if let Some(end) = state.on_end.borrow_mut().take() {
            end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameQueue;
    use crate::timing;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn recorder() -> (Rc<RefCell<Vec<f32>>>, Box<dyn FnMut(f32)>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, Box::new(move |v| sink.borrow_mut().push(v)))
    }

    // ── completion ────────────────────────────────────────────────────────

    #[test]
    fn linear_run_reports_expected_fractions() {
        // Frames at 0, 250, 500, 1000 ms of a 1000 ms run; the 1250 ms pump
        // must find nothing scheduled because the run completed at 1000 ms.
        let mut frames = FrameQueue::new();
        let (seen, record) = recorder();
        let ended = Rc::new(Cell::new(0u32));

        let e = Rc::clone(&ended);
        let handle = start(
            &mut frames,
            Animation::new(timing::linear, Duration::from_millis(1000))
                .on_update(record)
                .on_end(move || e.set(e.get() + 1)),
        );

        for t in [0.0, 0.25, 0.5, 1.0, 1.25] {
            frames.pump(t);
        }

        assert_eq!(*seen.borrow(), vec![0.0, 0.25, 0.5, 1.0]);
        assert_eq!(ended.get(), 1);
        assert!(!handle.running());
        assert!(frames.is_idle());
    }

    #[test]
    fn fractions_are_non_decreasing_and_end_at_one() {
        let mut frames = FrameQueue::new();
        let (seen, record) = recorder();

        start(
            &mut frames,
            Animation::new(timing::linear, Duration::from_secs(1)).on_update(record),
        );

        for t in [0.0, 0.1, 0.4, 0.4, 0.9, 2.0] {
            frames.pump(t);
        }

        let seen = seen.borrow();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 1.0);
    }

    #[test]
    fn on_start_runs_synchronously_before_any_frame() {
        let mut frames = FrameQueue::new();
        let started = Rc::new(Cell::new(false));

        let s = Rc::clone(&started);
        start(
            &mut frames,
            Animation::new(timing::linear, Duration::from_secs(1)).on_start(move || s.set(true)),
        );

        assert!(started.get());
        assert!(!frames.is_idle()); // first frame scheduled, not yet run
    }

    #[test]
    fn zero_duration_completes_on_first_frame() {
        let mut frames = FrameQueue::new();
        let (seen, record) = recorder();

        let handle = start(
            &mut frames,
            Animation::new(timing::linear, Duration::ZERO).on_update(record),
        );

        frames.pump(0.0);
        assert_eq!(*seen.borrow(), vec![1.0]);
        assert!(!handle.running());
    }

    #[test]
    fn start_time_comes_from_scheduler_clock() {
        let mut frames = FrameQueue::new();
        frames.pump(10.0); // advance the clock before starting

        let (seen, record) = recorder();
        start(
            &mut frames,
            Animation::new(timing::linear, Duration::from_secs(2)).on_update(record),
        );

        frames.pump(11.0);
        assert_eq!(*seen.borrow(), vec![0.5]);
    }

    #[test]
    fn eased_values_pass_through_timing() {
        let mut frames = FrameQueue::new();
        let (seen, record) = recorder();

        start(
            &mut frames,
            Animation::new(timing::ease_in_out_sine, Duration::from_secs(1)).on_update(record),
        );

        frames.pump(0.5);
        let v = seen.borrow()[0];
        assert!((v - 0.5).abs() < 1e-6);
    }

    // ── cancellation ──────────────────────────────────────────────────────

    #[test]
    fn stop_mid_run_suppresses_remaining_frames() {
        let mut frames = FrameQueue::new();
        let (seen, record) = recorder();
        let ended = Rc::new(Cell::new(false));

        let e = Rc::clone(&ended);
        let handle = start(
            &mut frames,
            Animation::new(timing::linear, Duration::from_millis(1000))
                .on_update(record)
                .on_end(move || e.set(true)),
        );

        frames.pump(0.0);
        frames.pump(0.25);
        frames.pump(0.5);
        handle.stop();
        frames.pump(1.0);
        frames.pump(1.25);

        assert_eq!(*seen.borrow(), vec![0.0, 0.25, 0.5]);
        assert!(!ended.get());
        assert!(!handle.running());
    }

    #[test]
    fn stop_before_first_frame_yields_no_callbacks() {
        let mut frames = FrameQueue::new();
        let (seen, record) = recorder();
        let ended = Rc::new(Cell::new(false));

        let e = Rc::clone(&ended);
        let handle = start(
            &mut frames,
            Animation::new(timing::linear, Duration::from_secs(1))
                .on_update(record)
                .on_end(move || e.set(true)),
        );

        handle.stop();
        frames.pump(0.0);
        frames.pump(1.0);

        assert!(seen.borrow().is_empty());
        assert!(!ended.get());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut frames = FrameQueue::new();
        let handle = start(
            &mut frames,
            Animation::new(timing::linear, Duration::from_secs(1)),
        );

        handle.stop();
        handle.stop();
        assert!(!handle.running());
    }

    #[test]
    fn stop_after_completion_is_a_no_op() {
        let mut frames = FrameQueue::new();
        let ended = Rc::new(Cell::new(0u32));

        let e = Rc::clone(&ended);
        let handle = start(
            &mut frames,
            Animation::new(timing::linear, Duration::from_millis(100))
                .on_end(move || e.set(e.get() + 1)),
        );

        frames.pump(1.0);
        assert_eq!(ended.get(), 1);
        handle.stop();
        assert_eq!(ended.get(), 1);
    }

    // ── callback failure ──────────────────────────────────────────────────

    #[test]
    fn panicking_update_cancels_remaining_frames() {
        let mut frames = FrameQueue::new();
        start(
            &mut frames,
            Animation::new(timing::linear, Duration::from_secs(1))
                .on_update(|_| panic!("update failed")),
        );

        let result = catch_unwind(AssertUnwindSafe(|| frames.pump(0.5)));
        assert!(result.is_err());
        // The follow-up frame is scheduled only after `on_update` returns,
        // so the unwound run left nothing behind.
        assert!(frames.is_idle());
    }
}
