//! Territory LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `territory-domain`, used by
//! the location parser as its extraction fallback.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use territory_llm::MockProvider;
//! use territory_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new(r#"{"city": "Austin"}"#);
//! let answer = provider.generate("the capital area").unwrap();
//! assert_eq!(answer, r#"{"city": "Austin"}"#);
//! ```

#![warn(missing_docs)]

pub mod ollama;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use territory_domain::traits::{LlmProvider as LlmProviderTrait, RateLimited};
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Request did not complete in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl RateLimited for LlmError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimitExceeded)
    }
}

/// Mock LLM provider for deterministic testing
///
/// Answers come from, in order: the scripted queue (one entry per call), a
/// per-prompt table, then the default response. Every prompt is recorded.
///
/// # Examples
///
/// ```
/// use territory_llm::{LlmError, MockProvider};
/// use territory_domain::traits::LlmProvider;
///
/// // Same answer for every clause
/// let provider = MockProvider::new("[]");
/// assert_eq!(provider.generate("north suburbs").unwrap(), "[]");
///
/// // Scripted sequence: first call rate-limited, second succeeds
/// let provider = MockProvider::new("[]");
/// provider.push_error(LlmError::RateLimitExceeded);
/// provider.push_response("{}");
/// assert!(provider.generate("p").is_err());
/// assert_eq!(provider.generate("p").unwrap(), "{}");
/// assert_eq!(provider.generate("p").unwrap(), "[]");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        locked(&self.responses).insert(prompt.into(), response.into());
    }

    /// Queue a response for the next unscripted call
    pub fn push_response(&self, response: impl Into<String>) {
        locked(&self.script).push_back(Ok(response.into()));
    }

    /// Queue an error for the next unscripted call
    pub fn push_error(&self, error: LlmError) {
        locked(&self.script).push_back(Err(error));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        locked(&self.prompts).len()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        locked(&self.prompts).clear();
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        locked(&self.prompts).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        locked(&self.prompts).push(prompt.to_string());

        if let Some(scripted) = locked(&self.script).pop_front() {
            return scripted;
        }

        if let Some(response) = locked(&self.responses).get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.generate(prompt)
    }
}
