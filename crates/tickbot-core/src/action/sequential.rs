use tracing::debug;

use super::{Action, BoxedAction};

/// Runs its children one at a time, in list order.
///
/// Only the child at the cursor is ever active. The cursor moves on at the
/// start of the tick after the current child reports finished, and the next
/// child receives `initialize` and its first `execute` in that same tick.
/// An empty sequence is finished from the start.
pub struct SequentialAction {
    children: Vec<BoxedAction>,
    index: usize,
    started: bool,
}

impl SequentialAction {
    pub fn new<I>(children: I) -> Self
    where
        I: IntoIterator<Item = BoxedAction>,
    {
        Self {
            children: children.into_iter().collect(),
            index: 0,
            started: false,
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Position of the active child.
    pub fn current_index(&self) -> usize {
        self.index
    }
}

impl Action for SequentialAction {
    fn initialize(&mut self) {
        self.started = true;
        self.index = 0;
        if let Some(first) = self.children.first_mut() {
            first.initialize();
        }
    }

    fn execute(&mut self) {
        let Some(current) = self.children.get(self.index) else {
            return;
        };
        if current.is_finished() {
            if self.index + 1 >= self.children.len() {
                return;
            }
            self.index += 1;
            debug!(index = self.index, len = self.children.len(), "sequence advanced");
            self.children[self.index].initialize();
        }
        self.children[self.index].execute();
    }

    fn is_finished(&self) -> bool {
        match self.children.len() {
            0 => true,
            len => self.started && self.index == len - 1 && self.children[self.index].is_finished(),
        }
    }
}
