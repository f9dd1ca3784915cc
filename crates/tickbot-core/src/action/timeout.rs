use std::time::Duration;

use super::clock::Deadline;
use super::{Action, BoxedAction, SharedClock, SystemClock};

/// Wraps one child and finishes when the child does or when `max_run_time`
/// has passed, whichever comes first.
///
/// The deadline is polled, not preemptive: `execute` always forwards to the
/// child. Callers cannot tell a timeout from a normal completion.
pub struct TimeoutAction {
    child: BoxedAction,
    max_run_time: Duration,
    deadline: Deadline,
    clock: SharedClock,
}

impl TimeoutAction {
    pub fn new(child: BoxedAction, max_run_time: Duration) -> Self {
        Self::with_clock(child, max_run_time, SystemClock::shared())
    }

    pub fn with_clock(child: BoxedAction, max_run_time: Duration, clock: SharedClock) -> Self {
        Self {
            child,
            max_run_time,
            deadline: Deadline::Unset,
            clock,
        }
    }

    pub fn child(&self) -> &dyn Action {
        self.child.as_ref()
    }
}

impl Action for TimeoutAction {
    fn initialize(&mut self) {
        self.child.initialize();
        self.deadline = Deadline::after(self.clock.now(), self.max_run_time);
    }

    fn execute(&mut self) {
        self.child.execute();
    }

    fn is_finished(&self) -> bool {
        self.deadline.is_set()
            && (self.deadline.has_passed(self.clock.now()) || self.child.is_finished())
    }
}
