use crate::error::{Error, Result};
use std::time::Duration;

/// Ceiling on the task queue limit.
pub const TASK_QUEUE_MAX: usize = i32::MAX as usize;

/// Hard ceiling on the elastic-mode worker census.
pub const THREAD_SIZE_MAX: usize = 1024;

/// How long an elastic worker above the floor may sit idle before it
/// retires itself.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest a submitter may block waiting for queue room.
pub(crate) const SUBMIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Wait slice for elastic workers parked on an empty queue, so the idle
/// clock gets re-examined between waits.
pub(crate) const ELASTIC_WAIT_SLICE: Duration = Duration::from_secs(1);

/// Worker-lifecycle policy of a pool. Locked in once the pool starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolMode {
    /// Worker count equals the start-time size for the pool's lifetime.
    Fixed,
    /// Worker count may grow on backlog up to a ceiling and shrink back
    /// toward the floor when workers idle past [`IDLE_TIMEOUT`].
    Elastic,
}

impl Default for PoolMode {
    fn default() -> Self {
        PoolMode::Fixed
    }
}

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Worker-lifecycle policy.
    pub mode: PoolMode,
    /// Bound on the pending-task queue, `1..=TASK_QUEUE_MAX`.
    pub task_queue_max: usize,
    /// Elastic-mode worker ceiling, `1..=THREAD_SIZE_MAX`.
    pub thread_size_max: usize,
    /// Name prefix for spawned worker threads.
    pub thread_name_prefix: String,
    /// Stack size for worker threads, if overridden.
    pub stack_size: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            mode: PoolMode::default(),
            task_queue_max: TASK_QUEUE_MAX,
            thread_size_max: THREAD_SIZE_MAX,
            thread_name_prefix: "crew-worker".to_string(),
            stack_size: Some(2 * 1024 * 1024),
        }
    }
}

impl PoolConfig {
    /// Start building a configuration.
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::new()
    }

    /// Check the configuration against the pool's limits.
    pub fn validate(&self) -> Result<()> {
        if self.task_queue_max == 0 || self.task_queue_max > TASK_QUEUE_MAX {
            return Err(Error::config("task_queue_max out of range"));
        }
        if self.thread_size_max == 0 || self.thread_size_max > THREAD_SIZE_MAX {
            return Err(Error::config("thread_size_max out of range"));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(Error::config("thread_name_prefix must not be empty"));
        }
        Ok(())
    }
}

/// Builder for [`PoolConfig`].
#[derive(Debug, Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
        }
    }

    /// Set the worker-lifecycle policy.
    pub fn mode(mut self, mode: PoolMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Bound the pending-task queue.
    pub fn task_queue_max(mut self, max: usize) -> Self {
        self.config.task_queue_max = max;
        self
    }

    /// Cap the elastic-mode worker census.
    pub fn thread_size_max(mut self, max: usize) -> Self {
        self.config.thread_size_max = max;
        self
    }

    /// Set the worker thread name prefix.
    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    /// Override the worker thread stack size.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<PoolConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.mode, PoolMode::Fixed);
        assert_eq!(config.task_queue_max, TASK_QUEUE_MAX);
        assert_eq!(config.thread_size_max, THREAD_SIZE_MAX);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = PoolConfig::builder()
            .mode(PoolMode::Elastic)
            .task_queue_max(64)
            .thread_size_max(8)
            .thread_name_prefix("unit")
            .build()
            .unwrap();

        assert_eq!(config.mode, PoolMode::Elastic);
        assert_eq!(config.task_queue_max, 64);
        assert_eq!(config.thread_size_max, 8);
        assert_eq!(config.thread_name_prefix, "unit");
    }

    #[test]
    fn test_rejects_zero_queue_limit() {
        let result = PoolConfig::builder().task_queue_max(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_oversized_thread_ceiling() {
        let result = PoolConfig::builder().thread_size_max(THREAD_SIZE_MAX + 1).build();
        assert!(result.is_err());
    }
}
