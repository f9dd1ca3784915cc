use tracing::debug;

use super::{Action, BoxedAction};

/// Drives all of its children on every tick; finished once every child is.
///
/// "Parallel" is cooperative: one caller interleaves the children within a
/// single `execute`, in list order. A child seen finished is latched and is
/// never executed again. There is no partial-failure policy, so one child
/// that never finishes keeps the whole group running.
pub struct ParallelAction {
    children: Vec<BoxedAction>,
    done: Vec<bool>,
    started: bool,
}

impl ParallelAction {
    pub fn new<I>(children: I) -> Self
    where
        I: IntoIterator<Item = BoxedAction>,
    {
        let children: Vec<BoxedAction> = children.into_iter().collect();
        let done = vec![false; children.len()];
        Self {
            children,
            done,
            started: false,
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of children already latched as finished.
    pub fn finished_count(&self) -> usize {
        self.done.iter().filter(|d| **d).count()
    }
}

impl Action for ParallelAction {
    fn initialize(&mut self) {
        self.started = true;
        for child in &mut self.children {
            child.initialize();
        }
    }

    fn execute(&mut self) {
        for (position, (child, done)) in self.children.iter_mut().zip(&mut self.done).enumerate() {
            if *done {
                continue;
            }
            if child.is_finished() {
                *done = true;
                debug!(position, "parallel child finished");
                continue;
            }
            child.execute();
        }
    }

    fn is_finished(&self) -> bool {
        if self.children.is_empty() {
            return true;
        }
        self.started
            && self
                .children
                .iter()
                .zip(&self.done)
                .all(|(child, done)| *done || child.is_finished())
    }
}
