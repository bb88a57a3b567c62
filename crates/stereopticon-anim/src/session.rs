//! Session-scoped animation runs.
//!
//! Same per-frame algorithm as [`driver`](crate::driver), with the two
//! bindings swapped: cancellation is observed through an abort-style signal
//! instead of a handle method, and completion settles a [`Completion`] token
//! instead of invoking an `on_end` callback. The token settles exactly once,
//! on completion or at the first frame boundary after the abort is observed.
//! An already-aborted signal settles the token immediately and schedules
//! nothing.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::scheduler::FrameScheduler;
use crate::timing::Timing;

/// Raises the abort signal for the runs observing it.
pub struct AbortController {
    aborted: Rc<Cell<bool>>,
}

impl AbortController {
    pub fn new() -> Self {
        Self {
            aborted: Rc::new(Cell::new(false)),
        }
    }

    /// A signal observing this controller.
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            aborted: Rc::clone(&self.aborted),
        }
    }

    /// Raises the signal. Idempotent. Observing runs settle at their next
    /// frame boundary.
    pub fn abort(&self) {
        self.aborted.set(true);
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation signal handed to a scoped run.
#[derive(Clone)]
pub struct AbortSignal {
    aborted: Rc<Cell<bool>>,
}

impl AbortSignal {
    pub fn aborted(&self) -> bool {
        self.aborted.get()
    }
}

/// Settled-once completion token returned by [`start_scoped`].
///
/// The analogue of the resolved promise in callback-free hosts: poll
/// [`is_settled`](Self::is_settled) from the frame loop to chain follow-up
/// runs.
#[derive(Clone)]
pub struct Completion {
    settled: Rc<Cell<bool>>,
}

impl Completion {
    /// True once the run has completed or its abort has been observed.
    pub fn is_settled(&self) -> bool {
        self.settled.get()
    }
}

/// One scoped run: timing, duration, progress callback, abort binding.
pub struct ScopedAnimation {
    timing: Timing,
    duration: Duration,
    on_update: Option<Box<dyn FnMut(f32)>>,
    abort: Option<AbortSignal>,
}

impl ScopedAnimation {
    pub fn new(timing: Timing, duration: Duration) -> Self {
        Self {
            timing,
            duration,
            on_update: None,
            abort: None,
        }
    }

    /// Invoked once per frame with the eased progress value.
    pub fn on_update(mut self, f: impl FnMut(f32) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Binds the run to an abort signal.
    pub fn abort_on(mut self, signal: AbortSignal) -> Self {
        self.abort = Some(signal);
        self
    }
}

struct ScopedState {
    timing: Timing,
    duration: f64, // seconds
    start: f64,
    on_update: RefCell<Option<Box<dyn FnMut(f32)>>>,
    abort: Option<AbortSignal>,
    settled: Rc<Cell<bool>>,
}

/// Starts a scoped run and returns its completion token.
pub fn start_scoped(scheduler: &mut dyn FrameScheduler, animation: ScopedAnimation) -> Completion {
    let ScopedAnimation {
        timing,
        duration,
        on_update,
        abort,
    } = animation;

    let settled = Rc::new(Cell::new(false));

    if abort.as_ref().is_some_and(AbortSignal::aborted) {
        settled.set(true);
        return Completion { settled };
    }

    let state = Rc::new(ScopedState {
        timing,
        duration: duration.as_secs_f64(),
        start: scheduler.now(),
        on_update: RefCell::new(on_update),
        abort,
        settled: Rc::clone(&settled),
    });

    schedule_frame(scheduler, state);
    Completion { settled }
}

fn schedule_frame(scheduler: &mut dyn FrameScheduler, state: Rc<ScopedState>) {
    scheduler.schedule(Box::new(move |sched, now| frame(sched, state, now)));
}

fn frame(scheduler: &mut dyn FrameScheduler, state: Rc<ScopedState>, now: f64) {
    if state.settled.get() {
        return;
    }

    if state.abort.as_ref().is_some_and(AbortSignal::aborted) {
        state.settled.set(true);
        return;
    }

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
        state.settled.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameQueue;
    use crate::timing;

    fn recorder() -> (Rc<RefCell<Vec<f32>>>, Box<dyn FnMut(f32)>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, Box::new(move |v| sink.borrow_mut().push(v)))
    }

    #[test]
    fn run_settles_once_on_completion() {
        let mut frames = FrameQueue::new();
        let (seen, record) = recorder();

        let done = start_scoped(
            &mut frames,
            ScopedAnimation::new(timing::linear, Duration::from_secs(1)).on_update(record),
        );

        frames.pump(0.5);
        assert!(!done.is_settled());
        frames.pump(1.0);
        assert!(done.is_settled());
        frames.pump(1.5);

        assert_eq!(*seen.borrow(), vec![0.5, 1.0]);
        assert!(frames.is_idle());
    }

    #[test]
    fn abort_before_start_settles_immediately_without_frames() {
        let mut frames = FrameQueue::new();
        let ctrl = AbortController::new();
        ctrl.abort();

        let (seen, record) = recorder();
        let done = start_scoped(
            &mut frames,
            ScopedAnimation::new(timing::linear, Duration::from_secs(1))
                .on_update(record)
                .abort_on(ctrl.signal()),
        );

        assert!(done.is_settled());
        assert!(frames.is_idle());
        frames.pump(0.5);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn abort_mid_run_settles_at_next_frame_boundary() {
        let mut frames = FrameQueue::new();
        let ctrl = AbortController::new();
        let (seen, record) = recorder();

        let done = start_scoped(
            &mut frames,
            ScopedAnimation::new(timing::linear, Duration::from_secs(1))
                .on_update(record)
                .abort_on(ctrl.signal()),
        );

        frames.pump(0.25);
        ctrl.abort();
        assert!(!done.is_settled()); // cooperative: not until the next frame

        frames.pump(0.5);
        assert!(done.is_settled());
        assert_eq!(*seen.borrow(), vec![0.25]); // the aborted frame produced no update
        assert!(frames.is_idle());
    }

    #[test]
    fn abort_after_completion_changes_nothing() {
        let mut frames = FrameQueue::new();
        let ctrl = AbortController::new();

        let done = start_scoped(
            &mut frames,
            ScopedAnimation::new(timing::linear, Duration::from_millis(100))
                .abort_on(ctrl.signal()),
        );

        frames.pump(1.0);
        assert!(done.is_settled());
        ctrl.abort();
        assert!(done.is_settled());
    }

    #[test]
    fn one_controller_cancels_multiple_runs() {
        let mut frames = FrameQueue::new();
        let ctrl = AbortController::new();

        let a = start_scoped(
            &mut frames,
            ScopedAnimation::new(timing::linear, Duration::from_secs(4)).abort_on(ctrl.signal()),
        );
        let b = start_scoped(
            &mut frames,
            ScopedAnimation::new(timing::ease_in_out_sine, Duration::from_secs(2))
                .abort_on(ctrl.signal()),
        );

        frames.pump(0.1);
        ctrl.abort();
        frames.pump(0.2);

        assert!(a.is_settled());
        assert!(b.is_settled());
        assert!(frames.is_idle());
    }
}
