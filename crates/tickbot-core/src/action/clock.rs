use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of "now" for timed actions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub type SharedClock = Arc<dyn Clock>;

/// The process monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn shared() -> SharedClock {
        Arc::new(SystemClock)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Starts at the instant it was created and advances by explicit
/// [`advance`](ManualClock::advance) calls, which makes tick-by-tick tests of
/// waits and timeouts deterministic.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Total time advanced since creation.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

/// Deadline state shared by the timed actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Deadline {
    /// `initialize` has not run yet.
    Unset,
    At(Instant),
    /// `now + duration` is not representable; the deadline never passes.
    Never,
}

impl Deadline {
    pub(crate) fn after(now: Instant, duration: Duration) -> Self {
        now.checked_add(duration).map_or(Deadline::Never, Deadline::At)
    }

    /// Strictly after the deadline; `false` while unset.
    pub(crate) fn has_passed(&self, now: Instant) -> bool {
        matches!(self, Deadline::At(at) if now > *at)
    }

    pub(crate) fn is_set(&self) -> bool {
        !matches!(self, Deadline::Unset)
    }
}
