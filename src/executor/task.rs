//! Task representation and execution.

use crate::handle::Rendezvous;
use crate::payload::Payload;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A unit of work the pool can execute.
///
/// The body runs at most once, on a worker thread, and yields one opaque
/// [`Payload`]. Implement this for task types carrying their own state;
/// plain closures go through [`ThreadPool::submit_fn`] instead.
///
/// [`ThreadPool::submit_fn`]: crate::ThreadPool::submit_fn
pub trait Task: Send {
    /// Execute the task body and produce its result.
    fn run(self: Box<Self>) -> Payload;
}

/// Closure adapter: erases an `FnOnce() -> R` into a [`Task`].
pub(crate) struct FnTask {
    func: Box<dyn FnOnce() -> Payload + Send>,
}

impl FnTask {
    pub(crate) fn new<F, R>(f: F) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        Self {
            func: Box::new(move || Payload::new(f())),
        }
    }
}

impl Task for FnTask {
    fn run(self: Box<Self>) -> Payload {
        (self.func)()
    }
}

/// Queued form of a task: the boxed body plus the delivery slot, absent
/// on the fire-and-forget path.
pub(crate) struct TaskCell {
    id: TaskId,
    task: Box<dyn Task>,
    rendezvous: Option<Arc<Rendezvous>>,
}

impl TaskCell {
    pub(crate) fn new(task: Box<dyn Task>, rendezvous: Option<Arc<Rendezvous>>) -> Self {
        Self {
            id: TaskId::next(),
            task,
            rendezvous,
        }
    }

    /// Run the body and deliver its value. Called at most once, outside
    /// the pool mutex.
    ///
    /// A panicking body is treated as having delivered the empty
    /// sentinel, so the worker returns to its loop in a consistent state
    /// and no awaiter is left suspended.
    pub(crate) fn execute(self) {
        let TaskCell { id, task, rendezvous } = self;

        match catch_unwind(AssertUnwindSafe(move || task.run())) {
            Ok(payload) => {
                if let Some(rendezvous) = rendezvous {
                    rendezvous.publish(payload);
                }
            }
            Err(_) => {
                eprintln!("crew: task {:?} panicked", id);
                if let Some(rendezvous) = rendezvous {
                    rendezvous.publish(Payload::empty());
                }
            }
        }
    }

    /// Discard the cell without running it, waking any awaiter with the
    /// empty sentinel. Used for tasks still queued at shutdown.
    pub(crate) fn abandon(self) {
        if let Some(rendezvous) = self.rendezvous {
            rendezvous.publish(Payload::empty());
        }
    }
}

impl std::fmt::Debug for TaskCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskCell")
            .field("id", &self.id)
            .field("has_rendezvous", &self.rendezvous.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::ResultHandle;

    #[test]
    fn test_execute_delivers_value() {
        let rendezvous = Arc::new(Rendezvous::new());
        let cell = TaskCell::new(Box::new(FnTask::new(|| 6 * 7)), Some(rendezvous.clone()));

        cell.execute();

        let handle = ResultHandle::valid(rendezvous);
        assert_eq!(handle.wait().take::<i32>().unwrap(), 42);
    }

    #[test]
    fn test_execute_without_rendezvous_discards_value() {
        let cell = TaskCell::new(Box::new(FnTask::new(|| vec![1u8; 16])), None);
        cell.execute();
    }

    #[test]
    fn test_panicking_body_delivers_sentinel() {
        let rendezvous = Arc::new(Rendezvous::new());
        let cell = TaskCell::new(
            Box::new(FnTask::new(|| -> u32 { panic!("boom") })),
            Some(rendezvous.clone()),
        );

        cell.execute();

        let handle = ResultHandle::valid(rendezvous);
        assert!(handle.wait().is_empty());
    }

    #[test]
    fn test_abandon_wakes_awaiter() {
        let rendezvous = Arc::new(Rendezvous::new());
        let cell = TaskCell::new(Box::new(FnTask::new(|| 1u8)), Some(rendezvous.clone()));

        cell.abandon();

        let handle = ResultHandle::valid(rendezvous);
        assert!(handle.wait().is_empty());
    }
}
