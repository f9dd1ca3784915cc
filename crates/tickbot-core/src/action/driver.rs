use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

use super::{Action, BoxedAction};
use crate::error::{BotError, Result};

/// The tick timer shared by [`Driver::run`] and host loops: fires at once,
/// then every `interval` (at least 1ms), delaying instead of bursting after
/// a stall.
pub fn ticker(interval: Duration) -> Interval {
    let mut timer = tokio::time::interval(interval.max(Duration::from_millis(1)));
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// Ticks a single action tree: `initialize` once, then `execute` until the
/// root reports finished.
pub struct Driver {
    root: BoxedAction,
    started: bool,
    ticks: u64,
}

impl Driver {
    pub fn new(root: impl Action + 'static) -> Self {
        Self {
            root: Box::new(root),
            started: false,
            ticks: 0,
        }
    }

    /// Initializes the root. Later calls do nothing.
    pub fn start(&mut self) {
        if !self.started {
            self.started = true;
            self.root.initialize();
            debug!("driver started");
        }
    }

    /// One tick: executes the root unless it is already finished, and
    /// reports whether it is finished now.
    pub fn tick(&mut self) -> bool {
        self.start();
        if !self.root.is_finished() {
            self.root.execute();
            self.ticks += 1;
        }
        self.root.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.started && self.root.is_finished()
    }

    /// Number of ticks that executed the root.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks every `interval` until the root finishes. Fails with
    /// [`BotError::TickLimit`] once `max_ticks` executes have not been enough.
    pub async fn run(&mut self, interval: Duration, max_ticks: Option<u64>) -> Result<u64> {
        self.start();
        let mut timer = ticker(interval);

        while !self.root.is_finished() {
            if let Some(limit) = max_ticks {
                if self.ticks >= limit {
                    return Err(BotError::TickLimit(limit));
                }
            }
            timer.tick().await;
            self.root.execute();
            self.ticks += 1;
        }

        info!(ticks = self.ticks, "action tree finished");
        Ok(self.ticks)
    }
}
