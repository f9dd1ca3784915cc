use std::time::Duration;

use super::clock::Deadline;
use super::{Action, SharedClock, SystemClock};

/// Stays unfinished until `duration` has elapsed since `initialize`.
///
/// The comparison is strict: at exactly `start + duration` the wait is still
/// running.
pub struct WaitAction {
    duration: Duration,
    deadline: Deadline,
    clock: SharedClock,
}

impl WaitAction {
    pub fn new(duration: Duration) -> Self {
        Self::with_clock(duration, SystemClock::shared())
    }

    pub fn with_clock(duration: Duration, clock: SharedClock) -> Self {
        Self {
            duration,
            deadline: Deadline::Unset,
            clock,
        }
    }
}

impl Action for WaitAction {
    fn initialize(&mut self) {
        self.deadline = Deadline::after(self.clock.now(), self.duration);
    }

    fn is_finished(&self) -> bool {
        self.deadline.has_passed(self.clock.now())
    }
}
