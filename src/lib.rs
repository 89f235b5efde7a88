//! crew - a bounded worker pool with fixed and elastic scaling modes.
//!
//! Submitted tasks land on a bounded FIFO queue and are executed by
//! long-lived worker threads; each submission returns a [`ResultHandle`]
//! that can be awaited for the task's value. A fixed pool keeps its
//! start-time worker count for life; an elastic pool grows on backlog up
//! to a ceiling and shrinks back toward its floor as workers idle out.
//!
//! # Quick Start
//!
//! ```no_run
//! use crew::prelude::*;
//!
//! let pool = ThreadPool::new();
//! pool.start(4).unwrap();
//!
//! let handle = pool.submit_fn(|| (1..=10u64).product::<u64>());
//!
//! let value: u64 = handle.wait().take().unwrap();
//! println!("10! = {}", value);
//! ```
//!
//! # Features
//!
//! - **Bounded admission**: submitters block at most one second on a
//!   full queue, then receive an invalid handle instead of an error
//! - **Elastic scaling**: one new worker per submission that observes
//!   backlog, idle workers retire after a minute above the floor
//! - **Detached results**: a result's lifetime is tied to its handle,
//!   never to the submitter's stack
//! - **Orderly shutdown**: the destructor returns only after every
//!   worker has exited; queued leftovers wake their awaiters with an
//!   empty sentinel

// Lint configuration
#![warn(missing_docs, missing_debug_implementations)]
#![allow(dead_code)]

pub mod config;
pub mod error;
pub mod executor;
pub mod handle;
pub mod payload;
pub mod prelude;

// Re-export key types at crate root
pub use config::{PoolConfig, PoolConfigBuilder, PoolMode};
pub use error::{Error, Result};
pub use executor::{Task, ThreadPool};
pub use handle::ResultHandle;
pub use payload::Payload;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_and_wait() {
        let pool = ThreadPool::new();
        pool.start(2).unwrap();

        let handle = pool.submit_fn(|| 21 * 2);
        assert_eq!(handle.wait().take::<i32>().unwrap(), 42);
    }

    #[test]
    fn test_many_submissions() {
        let pool = ThreadPool::new();
        pool.start(4).unwrap();

        let handles: Vec<ResultHandle> =
            (0..32u32).map(|n| pool.submit_fn(move || n + 1)).collect();

        let total: u32 = handles
            .into_iter()
            .map(|h| h.wait().take::<u32>().unwrap())
            .sum();
        assert_eq!(total, (1..=32).sum());
    }

    #[test]
    fn test_drop_is_clean() {
        let pool = ThreadPool::new();
        pool.start(2).unwrap();
        let _handle = pool.submit_fn(|| "done".to_string());
        drop(pool);
    }
}
