//! Frame scheduling capability.
//!
//! The driver never owns a clock or an event loop; the host injects one
//! through [`FrameScheduler`]. [`FrameQueue`] is the provided single-threaded
//! implementation: the host pumps it once per frame with the current time.
//! Because the host supplies time, the same type serves as the deterministic
//! scheduler in tests.

/// Callback invoked once on a scheduled frame.
///
/// Receives the scheduler itself (so the callback can schedule a follow-up
/// frame) and the current monotonic time in seconds.
pub type FrameCallback = Box<dyn FnOnce(&mut dyn FrameScheduler, f64)>;

/// Host capability: schedule a callback for the next frame and read a
/// monotonic clock consistent with the times passed to frame callbacks.
pub trait FrameScheduler {
    /// Schedules `frame` to run once on the next frame.
    fn schedule(&mut self, frame: FrameCallback);

    /// Current monotonic time in seconds.
    fn now(&self) -> f64;
}

/// Single-threaded frame-callback queue.
///
/// Callbacks scheduled while a pump is in progress run on the *next* pump,
/// which gives each animation exactly one step per frame.
#[derive(Default)]
pub struct FrameQueue {
    now: f64,
    pending: Vec<FrameCallback>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no callbacks are waiting for the next frame.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Fires every callback that was pending when the pump started, passing
    /// `now` (monotonic seconds) to each.
    pub fn pump(&mut self, now: f64) {
        self.now = now;
        let batch = std::mem::take(&mut self.pending);
        for frame in batch {
            frame(self, now);
        }
    }
}

impl FrameScheduler for FrameQueue {
    fn schedule(&mut self, frame: FrameCallback) {
        self.pending.push(frame);
    }

    fn now(&self) -> f64 {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn pump_fires_pending_callbacks_with_time() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut queue = FrameQueue::new();

        let s = Rc::clone(&seen);
        queue.schedule(Box::new(move |_, t| s.borrow_mut().push(t)));

        queue.pump(1.25);
        assert_eq!(*seen.borrow(), vec![1.25]);
        assert!(queue.is_idle());
    }

    #[test]
    fn callbacks_scheduled_during_pump_wait_for_next_pump() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut queue = FrameQueue::new();

        let s = Rc::clone(&seen);
        queue.schedule(Box::new(move |sched, t| {
            s.borrow_mut().push(t);
            let s2 = Rc::clone(&s);
            sched.schedule(Box::new(move |_, t| s2.borrow_mut().push(t)));
        }));

        queue.pump(1.0);
        assert_eq!(*seen.borrow(), vec![1.0]);
        assert!(!queue.is_idle());

        queue.pump(2.0);
        assert_eq!(*seen.borrow(), vec![1.0, 2.0]);
    }

    #[test]
    fn now_tracks_last_pump() {
        let mut queue = FrameQueue::new();
        assert_eq!(queue.now(), 0.0);
        queue.pump(3.5);
        assert_eq!(queue.now(), 3.5);
    }
}
