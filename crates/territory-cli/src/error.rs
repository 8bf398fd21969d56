//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
///
/// Anything surfacing here ends the process with exit code 1. Failures on
/// individual records are counted by the batch runs instead.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store could not be opened or read
    #[error("Store error: {0}")]
    Store(#[from] territory_store::StoreError),

    /// Parser rejected the input
    #[error("Parser error: {0}")]
    Parser(#[from] territory_parser::ParserError),

    /// Batch run could not start
    #[error("Janitor error: {0}")]
    Janitor(#[from] territory_janitor::JanitorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
