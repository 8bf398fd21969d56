//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API.
//!
//! Each call makes a single HTTP attempt; retry and rate-limit pacing belong
//! to the caller. HTTP 429 is reported as [`LlmError::RateLimitExceeded`].
//!
//! # Examples
//!
//! ```no_run
//! use territory_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.1");
//! ```

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use territory_domain::traits::LlmProvider as LlmProviderTrait;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<serde_json::Value>,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
            client: build_client(timeout),
        }
    }

    /// Create a new Ollama provider on `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = build_client(timeout);
        self
    }

    /// Generate text using the Ollama API
    ///
    /// `format` is passed through to Ollama's structured-output field: a JSON
    /// schema object, or the string `"json"` for plain JSON mode.
    ///
    /// # Errors
    ///
    /// - [`LlmError::RateLimitExceeded`] on HTTP 429
    /// - [`LlmError::Timeout`] when the request exceeds the timeout
    /// - [`LlmError::ModelNotAvailable`] on HTTP 404
    /// - [`LlmError::Communication`] for any other transport or HTTP failure
    /// - [`LlmError::InvalidResponse`] when the body is not an Ollama response
    pub async fn generate_async(
        &self,
        prompt: &str,
        format: Option<serde_json::Value>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let request_body = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            format,
        };

        debug!("POST {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<OllamaGenerateResponse>()
            .await
            .map(|r| r.response)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    fn block_on(&self, prompt: &str, format: Option<serde_json::Value>) -> Result<String, LlmError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;
        runtime.block_on(self.generate_async(prompt, format))
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    // Connections are not pooled: each blocking call drives its own runtime.
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(0)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(e.to_string())
    } else {
        LlmError::Communication(format!("Request failed: {}", e))
    }
}

/// Ollama `format` value for a schema string: the schema itself when it is a
/// JSON object, plain JSON mode otherwise
fn format_for_schema(schema: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(schema) {
        Ok(value) if value.is_object() => value,
        _ => serde_json::Value::String("json".to_string()),
    }
}

impl LlmProviderTrait for OllamaProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.block_on(prompt, None)
    }

    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        self.block_on(prompt, Some(format_for_schema(schema)))
    }
}
