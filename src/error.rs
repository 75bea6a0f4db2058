use std::io;
use thiserror::Error;

/// Error type for worker pool operations.
#[derive(Error, Debug)]
pub enum PoolError {
    /// IO error while spawning a worker thread.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The pool was constructed with zero workers.
    #[error("pool requires at least one worker")]
    ZeroWorkers,

    /// A job was submitted after shutdown had begun.
    #[error("pool is stopped")]
    Stopped,
}

/// Result type alias for worker pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
