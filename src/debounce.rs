//! Delay-coalescing scheduler for auto-save.
//!
//! Every [`trigger`](Debouncer::trigger) restarts a quiet window. Once the
//! window elapses with no further triggers, [`poll`](Debouncer::poll) fires
//! exactly once. A burst of edits therefore produces a single write.
//!
//! The clock is never read here: callers pass `now`, which keeps the
//! scheduler deterministic under test.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Schedule (or reschedule) the action for `now + delay`.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True exactly once when the window has elapsed, then disarms.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and report whether anything was pending. Used to flush early.
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
