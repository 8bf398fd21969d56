//! Core LocationParser implementation

use crate::config::ParserConfig;
use crate::enrich::enrich;
use crate::error::ParserError;
use crate::fallback::run_fallback;
use crate::rules::{read_clause, region_from_hint};
use crate::split::split_clauses;
use crate::types::{InheritedRegion, ParseOutcome};
use std::fmt::Display;
use std::sync::Arc;
use territory_domain::traits::{LlmProvider, RateLimited};
use territory_domain::{Gazetteer, LocationFact};
use tracing::{debug, info};

/// Parse with pattern rules only: no gazetteer, no extraction service
///
/// Clauses without recoverable geography are dropped, and so are clauses
/// whose locality the rules could not read.
pub fn parse_rules(raw_text: &str, state_hint: Option<&str>) -> Vec<LocationFact> {
    split_clauses(raw_text)
        .iter()
        .map(|clause| read_clause(clause, state_hint))
        .filter(|ruled| !ruled.unread_locality)
        .filter_map(|ruled| ruled.fact.validated())
        .collect()
}

/// The LocationParser turns broker text into structured location facts
pub struct LocationParser<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    gazetteer: Arc<dyn Gazetteer + Send + Sync>,
    config: ParserConfig,
}

impl<L> LocationParser<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: RateLimited + Display,
{
    /// Create a new LocationParser
    pub fn new(
        llm_provider: L,
        gazetteer: Arc<dyn Gazetteer + Send + Sync>,
        config: ParserConfig,
    ) -> Self {
        Self {
            llm_provider: Arc::new(llm_provider),
            gazetteer,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse one raw statement into facts, in input order
    ///
    /// Clauses the rules cannot place go to the extraction service when the
    /// fallback is enabled. Unplaceable clauses are skipped, never fatal.
    ///
    /// # Errors
    ///
    /// [`ParserError::TextTooLong`] when the input exceeds `max_text_length`.
    pub async fn parse(
        &self,
        raw_text: &str,
        state_hint: Option<&str>,
    ) -> Result<ParseOutcome, ParserError> {
        let text = raw_text.trim();
        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(ParserError::TextTooLong(length, self.config.max_text_length));
        }

        let mut outcome = ParseOutcome::default();

        for clause in split_clauses(text) {
            let ruled = read_clause(&clause, state_hint);

            if ruled.fact.has_geography() && !ruled.unread_locality {
                let mut fact = ruled.fact;
                enrich(&mut fact, self.gazetteer.as_ref());
                outcome.facts.push(fact);
                continue;
            }

            if !self.config.fallback_enabled {
                debug!("Rules cannot place '{}', fallback disabled", clause.text);
                continue;
            }

            // A state the rules did find narrows the extraction service down.
            let hint_region = ruled
                .fact
                .state_code
                .clone()
                .map(|state_code| InheritedRegion {
                    state_code,
                    country: ruled.fact.country.clone(),
                })
                .or_else(|| clause.inherited_region.clone())
                .or_else(|| state_hint.and_then(region_from_hint));
            let hint = hint_region
                .as_ref()
                .map(|r| r.state_code.as_str())
                .or(state_hint);

            outcome.used_fallback = true;
            let result = run_fallback(&self.llm_provider, &self.config, &clause.text, hint).await;
            outcome.fallback_attempts += result.attempts;

            for mut fact in result.facts {
                fact.is_resale |= ruled.fact.is_resale;
                if fact.radius_miles.is_none() {
                    fact.radius_miles = ruled.fact.radius_miles;
                }
                if let Some(region) = hint_region.as_ref() {
                    if fact.state_code.is_none() && fact.country == region.country {
                        fact.state_code = Some(region.state_code.clone());
                    }
                }
                enrich(&mut fact, self.gazetteer.as_ref());
                outcome.facts.push(fact);
            }
        }

        if outcome.facts.is_empty() {
            info!("No location recovered from '{}'", text);
        } else {
            debug!("Parsed {} facts from '{}'", outcome.facts.len(), text);
        }

        Ok(outcome)
    }
}
