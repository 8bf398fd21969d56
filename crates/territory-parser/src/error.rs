//! Error types for the location parser

use thiserror::Error;

/// Errors that can occur during parsing
#[derive(Error, Debug)]
pub enum ParserError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// LLM provider asked us to slow down
    #[error("LLM rate limit exceeded")]
    RateLimited,

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Fallback call timeout
    #[error("Extraction timeout")]
    Timeout,

    /// Extraction response has the wrong shape
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ParserError {
    fn from(e: serde_json::Error) -> Self {
        ParserError::JsonParse(e.to_string())
    }
}
