//! Error types for batch runs

use thiserror::Error;

/// Errors that stop a batch run before it starts
///
/// Per-record failures never surface here; they are counted in
/// [`BatchStats`](crate::BatchStats).
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
