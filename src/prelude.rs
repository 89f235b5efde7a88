//! Convenient re-exports for common crew types.
//!
//! This module provides a single import for most use cases:
//! ```
//! use crew::prelude::*;
//! ```

pub use crate::config::{PoolConfig, PoolConfigBuilder, PoolMode};
pub use crate::error::{Error, Result};
pub use crate::executor::{Task, ThreadPool};
pub use crate::handle::ResultHandle;
pub use crate::payload::Payload;
