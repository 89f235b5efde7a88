//! Bounded FIFO buffer of pending tasks.
//!
//! The buffer itself is dumb: every access happens under the pool's one
//! mutex, and the blocking logic (the `not_full` / `not_empty` waits)
//! lives with the pool and the workers that own the condvars.

use super::task::TaskCell;
use std::collections::VecDeque;

pub(crate) struct TaskQueue {
    items: VecDeque<TaskCell>,
    limit: usize,
}

impl TaskQueue {
    pub(crate) fn with_limit(limit: usize) -> Self {
        Self {
            items: VecDeque::new(),
            limit,
        }
    }

    pub(crate) fn has_room(&self) -> bool {
        self.items.len() < self.limit
    }

    pub(crate) fn push(&mut self, cell: TaskCell) {
        debug_assert!(self.has_room(), "push on a full queue");
        self.items.push_back(cell);
    }

    pub(crate) fn pop(&mut self) -> Option<TaskCell> {
        self.items.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = TaskCell> + '_ {
        self.items.drain(..)
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("len", &self.items.len())
            .field("limit", &self.limit)
            .finish()
    }
}
