//! Error types for the crew worker pool.

/// Result type alias for crew operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the crew worker pool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Executor error
    #[error("executor error: {0}")]
    Executor(String),

    /// Pool already started
    #[error("pool already started")]
    AlreadyStarted,

    /// Payload extraction on an empty or drained payload
    #[error("payload is empty")]
    EmptyPayload,

    /// Payload extracted with the wrong type
    #[error("payload type mismatch: expected {expected}")]
    TypeMismatch {
        /// The type the caller asked for.
        expected: &'static str,
    },
}

impl Error {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create an executor error
    pub fn executor<S: Into<String>>(msg: S) -> Self {
        Error::Executor(msg.into())
    }
}
