//! One-shot rendezvous between a worker and the awaiter of its result.

use crate::payload::Payload;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Shared delivery slot between the executing worker and the awaiter.
///
/// This is the ownership anchor that decouples a result's lifetime from
/// the submitter's stack: the task cell and the [`ResultHandle`] each
/// hold an `Arc` of it, so the slot lives as long as the longest holder.
/// A suspended waiter keeps the allocation alive through its own `Arc`,
/// which is what makes destruction-while-waiting unreachable.
pub(crate) struct Rendezvous {
    slot: Mutex<Option<Payload>>,
    delivered: Condvar,
}

impl Rendezvous {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            delivered: Condvar::new(),
        }
    }

    /// Store the payload and release the rendezvous.
    ///
    /// The pool's protocol guarantees at most one publish per slot:
    /// exactly one worker owns the task the slot is attached to.
    pub(crate) fn publish(&self, payload: Payload) {
        let mut slot = self.slot.lock();
        debug_assert!(slot.is_none(), "rendezvous delivered twice");
        *slot = Some(payload);
        self.delivered.notify_one();
    }

    fn wait_take(&self) -> Payload {
        let mut slot = self.slot.lock();
        loop {
            if let Some(payload) = slot.take() {
                return payload;
            }
            self.delivered.wait(&mut slot);
        }
    }
}

/// Awaitable handle for the result of one submitted task.
///
/// Returned by submission; *valid* when the task was admitted (a worker
/// will deliver), *invalid* when admission timed out. The handle is not
/// `Clone` and [`wait`](ResultHandle::wait) consumes it: one submission,
/// one await.
pub struct ResultHandle {
    rendezvous: Option<Arc<Rendezvous>>,
}

impl ResultHandle {
    pub(crate) fn valid(rendezvous: Arc<Rendezvous>) -> Self {
        Self {
            rendezvous: Some(rendezvous),
        }
    }

    pub(crate) fn invalid() -> Self {
        Self { rendezvous: None }
    }

    /// Whether the submission behind this handle was admitted.
    pub fn is_valid(&self) -> bool {
        self.rendezvous.is_some()
    }

    /// Block until the task's value is delivered and return it by move.
    ///
    /// On an invalid handle this returns the empty sentinel immediately
    /// without blocking. There is no timeout; callers needing one must
    /// layer their own.
    pub fn wait(self) -> Payload {
        match self.rendezvous {
            Some(rendezvous) => rendezvous.wait_take(),
            None => Payload::empty(),
        }
    }
}

impl std::fmt::Debug for ResultHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultHandle")
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_publish_then_wait() {
        let rendezvous = Arc::new(Rendezvous::new());
        rendezvous.publish(Payload::new(7u32));

        let handle = ResultHandle::valid(rendezvous);
        assert_eq!(handle.wait().take::<u32>().unwrap(), 7);
    }

    #[test]
    fn test_wait_blocks_until_published() {
        let rendezvous = Arc::new(Rendezvous::new());
        let publisher = rendezvous.clone();

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            publisher.publish(Payload::new("done".to_string()));
        });

        let handle = ResultHandle::valid(rendezvous);
        assert_eq!(handle.wait().take::<String>().unwrap(), "done");
    }

    #[test]
    fn test_invalid_handle_returns_sentinel() {
        let handle = ResultHandle::invalid();
        assert!(!handle.is_valid());
        assert!(handle.wait().is_empty());
    }

    #[test]
    fn test_publish_with_no_waiter_does_not_leak() {
        let rendezvous = Arc::new(Rendezvous::new());
        let handle = ResultHandle::valid(rendezvous.clone());
        drop(handle);

        // the worker-side Arc is the last holder; delivery and drop are fine
        rendezvous.publish(Payload::new(vec![0u8; 64]));
        drop(rendezvous);
    }
}
