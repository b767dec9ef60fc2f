//! Error types for lablib core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("only 1D arrays are allowed: `{name}` has {ndim} dimension(s)")]
    InvalidShape { name: &'static str, ndim: usize },

    #[error("failed to allocate lookback buffer of {requested} samples")]
    OutOfMemory { requested: usize },

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}

/// Result type for lablib core operations
pub type Result<T> = std::result::Result<T, CoreError>;
