//! Extraction service fallback with retry and rate-limit pacing

use crate::config::ParserConfig;
use crate::error::ParserError;
use crate::prompt::{PromptBuilder, FACT_SCHEMA};
use crate::response::parse_fallback_response;
use std::fmt::Display;
use std::sync::Arc;
use territory_domain::traits::{LlmProvider, RateLimited};
use territory_domain::LocationFact;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Facts recovered by the fallback and the number of calls it took
#[derive(Debug, Default)]
pub(crate) struct FallbackResult {
    pub facts: Vec<LocationFact>,
    pub attempts: u32,
}

/// Ask the extraction service about one clause
///
/// Up to `max_attempts` calls. A rate-limit signal waits the fixed cooldown;
/// timeouts, communication errors and malformed responses back off
/// exponentially. Exhausting the attempts yields no facts.
pub(crate) async fn run_fallback<L>(
    llm: &Arc<L>,
    config: &ParserConfig,
    clause: &str,
    state_hint: Option<&str>,
) -> FallbackResult
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: RateLimited + Display,
{
    let prompt = PromptBuilder::new(clause).with_state_hint(state_hint).build();
    let mut attempts = 0;

    while attempts < config.max_attempts {
        attempts += 1;

        let outcome = timeout(config.extraction_timeout(), call_llm(llm, &prompt))
            .await
            .unwrap_or(Err(ParserError::Timeout));

        let wait = match outcome.and_then(|response| parse_fallback_response(&response)) {
            Ok(facts) => {
                debug!(
                    "Extraction returned {} facts for '{}' (attempt {})",
                    facts.len(),
                    clause,
                    attempts
                );
                return FallbackResult { facts, attempts };
            }
            Err(ParserError::RateLimited) => {
                warn!(
                    "Rate limited on '{}' (attempt {}/{}), cooling down {}s",
                    clause, attempts, config.max_attempts, config.rate_limit_cooldown_secs
                );
                config.rate_limit_cooldown()
            }
            Err(e) => {
                warn!(
                    "Extraction failed for '{}' (attempt {}/{}): {}",
                    clause, attempts, config.max_attempts, e
                );
                config.backoff_for(attempts)
            }
        };

        if attempts < config.max_attempts {
            sleep(wait).await;
        }
    }

    warn!("Skipping '{}' after {} extraction attempts", clause, attempts);
    FallbackResult {
        facts: Vec::new(),
        attempts,
    }
}

/// Call the LLM provider
async fn call_llm<L>(llm: &Arc<L>, prompt: &str) -> Result<String, ParserError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: RateLimited + Display,
{
    let llm = Arc::clone(llm);
    let prompt = prompt.to_string();

    // Call in a blocking context since LlmProvider is not async
    tokio::task::spawn_blocking(move || {
        llm.generate_structured(&prompt, FACT_SCHEMA).map_err(|e| {
            if e.is_rate_limited() {
                ParserError::RateLimited
            } else {
                ParserError::Llm(e.to_string())
            }
        })
    })
    .await
    .map_err(|e| ParserError::Llm(format!("Task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use territory_llm::{LlmError, MockProvider};

    fn fast_config() -> ParserConfig {
        ParserConfig {
            rate_limit_cooldown_secs: 0,
            retry_backoff_secs: 0,
            ..ParserConfig::default()
        }
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let llm = Arc::new(MockProvider::new(r#"[{"city": "Frisco", "state_code": "TX"}]"#));
        let result = run_fallback(&llm, &fast_config(), "the north suburbs", Some("TX")).await;
        assert_eq!(result.attempts, 1);
        assert_eq!(result.facts.len(), 1);
        assert!(llm.prompts()[0].contains("the north suburbs"));
        assert!(llm.prompts()[0].contains("TX"));
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let llm = Arc::new(MockProvider::new(r#"{"city": "Frisco"}"#));
        llm.push_error(LlmError::RateLimitExceeded);
        llm.push_error(LlmError::Timeout("slow".to_string()));

        let result = run_fallback(&llm, &fast_config(), "north suburbs", None).await;
        assert_eq!(result.attempts, 3);
        assert_eq!(result.facts.len(), 1);
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let llm = Arc::new(MockProvider::new("[]"));
        for _ in 0..5 {
            llm.push_error(LlmError::RateLimitExceeded);
        }
        let result = run_fallback(&llm, &fast_config(), "north suburbs", None).await;
        assert_eq!(result.attempts, 3);
        assert!(result.facts.is_empty());
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_malformed_response_skips_clause() {
        let llm = Arc::new(MockProvider::new("I could not find a place"));
        let result = run_fallback(&llm, &fast_config(), "nowhere", None).await;
        assert!(result.facts.is_empty());
        assert_eq!(result.attempts, 3);
    }

    #[tokio::test]
    async fn test_empty_answer_is_final() {
        let llm = Arc::new(MockProvider::new("[]"));
        let result = run_fallback(&llm, &fast_config(), "nowhere", None).await;
        assert!(result.facts.is_empty());
        assert_eq!(result.attempts, 1);
    }
}
