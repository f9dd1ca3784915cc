//! Cooperative, externally ticked units of work.
//!
//! An [`Action`] goes through `initialize → execute* → finished`. Nothing in
//! this module schedules its own ticks: a driver (see [`Driver`] and
//! [`ActionRunner`]) calls `initialize()` once and then `execute()` until
//! `is_finished()` reports true.
//!
//! Actions compose into trees:
//!
//! ```text
//! SequentialAction ── one child at a time, in list order
//! ParallelAction   ── every unfinished child on every tick
//! WaitAction       ── finished once its duration has elapsed
//! TimeoutAction    ── child finished OR deadline passed
//! ```
//!
//! The [`ActionExt`] combinators build those composites fluently:
//!
//! ```
//! use std::time::Duration;
//! use tickbot_core::action::{once, ActionExt, Driver};
//!
//! let greet = once(|| println!("hello"))
//!     .and_then([once(|| println!("world")).boxed()])
//!     .with_timeout(Duration::from_secs(5));
//!
//! let mut driver = Driver::new(greet);
//! while !driver.tick() {}
//! ```

mod clock;
mod driver;
mod leaf;
mod parallel;
mod runner;
mod sequential;
mod timeout;
mod wait;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use driver::{ticker, Driver};
pub use leaf::{once, Once};
pub use parallel::ParallelAction;
pub use runner::{ActionRunner, JobId};
pub use sequential::SequentialAction;
pub use timeout::TimeoutAction;
pub use wait::WaitAction;

use std::time::Duration;

/// A unit of polled, resumable work.
///
/// Every method has a no-op default, so a leaf only overrides what it needs.
/// The defaults describe an action that is finished from the start.
pub trait Action: Send {
    /// Prepares internal state. Called exactly once, before the first
    /// `execute`.
    fn initialize(&mut self) {}

    /// Performs one quantum of work. Must stay harmless once the action is
    /// finished: a composite may call it once more in the tick where the
    /// action first reports finished.
    fn execute(&mut self) {}

    /// Pure predicate over the current state (and the clock, for timed
    /// actions).
    fn is_finished(&self) -> bool {
        true
    }
}

/// An exclusively owned action, as stored by composites.
pub type BoxedAction = Box<dyn Action>;

impl Action for BoxedAction {
    fn initialize(&mut self) {
        (**self).initialize();
    }

    fn execute(&mut self) {
        (**self).execute();
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }
}

/// The no-op action: does nothing and is always finished.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ActionBase;

impl Action for ActionBase {}

/// Fluent combinators available on every sized action.
///
/// Each combinator consumes the receiver and returns a new composite in which
/// the receiver is the first (or wrapped) element.
pub trait ActionExt: Action + Sized + 'static {
    fn boxed(self) -> BoxedAction {
        Box::new(self)
    }

    /// Runs `self` and `others` side by side; finished when all are.
    fn along_with<I>(self, others: I) -> ParallelAction
    where
        I: IntoIterator<Item = BoxedAction>,
    {
        ParallelAction::new(std::iter::once(self.boxed()).chain(others))
    }

    /// Runs `self`, then each of `others` in order.
    fn and_then<I>(self, others: I) -> SequentialAction
    where
        I: IntoIterator<Item = BoxedAction>,
    {
        SequentialAction::new(std::iter::once(self.boxed()).chain(others))
    }

    /// Waits for `delay` before starting `self`.
    fn delay_for(self, delay: Duration) -> SequentialAction {
        self.delay_for_on(delay, SystemClock::shared())
    }

    fn delay_for_on(self, delay: Duration, clock: SharedClock) -> SequentialAction {
        SequentialAction::new([WaitAction::with_clock(delay, clock).boxed(), self.boxed()])
    }

    /// Bounds `self` by `max_run_time`.
    fn with_timeout(self, max_run_time: Duration) -> TimeoutAction {
        self.with_timeout_on(max_run_time, SystemClock::shared())
    }

    fn with_timeout_on(self, max_run_time: Duration, clock: SharedClock) -> TimeoutAction {
        TimeoutAction::with_clock(self.boxed(), max_run_time, clock)
    }

    /// Holds for `wait` after `self` has finished.
    fn with_wait(self, wait: Duration) -> SequentialAction {
        self.with_wait_on(wait, SystemClock::shared())
    }

    fn with_wait_on(self, wait: Duration, clock: SharedClock) -> SequentialAction {
        SequentialAction::new([self.boxed(), WaitAction::with_clock(wait, clock).boxed()])
    }
}

impl<A: Action + Sized + 'static> ActionExt for A {}

#[cfg(test)]
pub(crate) mod probe {
    //! Instrumented leaf used by the composite tests.

    use super::Action;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    pub struct ProbeState {
        pub initialized: u32,
        pub executes: u32,
    }

    /// Shared journal of `"<name>:init"` / `"<name>:exec"` entries.
    pub type Journal = Arc<Mutex<Vec<String>>>;

    pub fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    /// Finishes after exactly `finish_after` executes (never, if `None`).
    pub struct Probe {
        name: &'static str,
        finish_after: Option<u32>,
        state: Arc<Mutex<ProbeState>>,
        journal: Journal,
    }

    impl Probe {
        pub fn new(
            name: &'static str,
            finish_after: Option<u32>,
            journal: &Journal,
        ) -> (Self, Arc<Mutex<ProbeState>>) {
            let state = Arc::new(Mutex::new(ProbeState::default()));
            let probe = Self {
                name,
                finish_after,
                state: state.clone(),
                journal: journal.clone(),
            };
            (probe, state)
        }
    }

    impl Action for Probe {
        fn initialize(&mut self) {
            self.state.lock().unwrap().initialized += 1;
            self.journal.lock().unwrap().push(format!("{}:init", self.name));
        }

        fn execute(&mut self) {
            self.state.lock().unwrap().executes += 1;
            self.journal.lock().unwrap().push(format!("{}:exec", self.name));
        }

        fn is_finished(&self) -> bool {
            let state = self.state.lock().unwrap();
            match self.finish_after {
                Some(n) => state.initialized > 0 && state.executes >= n,
                None => false,
            }
        }
    }
}
