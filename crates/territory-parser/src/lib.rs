//! Territory Location Parser
//!
//! Converts free-text territory availability statements from franchise
//! brokers into structured [`LocationFact`](territory_domain::LocationFact)s.
//!
//! # Pipeline
//!
//! ```text
//! raw text → split into clauses → pattern rules → validation
//!          → (no geography?) extraction service fallback
//!          → gazetteer enrichment → facts in input order
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use territory_domain::StaticGazetteer;
//! use territory_llm::MockProvider;
//! use territory_parser::{LocationParser, ParserConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let parser = LocationParser::new(
//!     MockProvider::new("[]"),
//!     Arc::new(StaticGazetteer::new()),
//!     ParserConfig::default(),
//! );
//!
//! let outcome = parser.parse("Dallas or Amarillo, TX", None).await?;
//! assert_eq!(outcome.facts.len(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod enrich;
mod error;
mod fallback;
mod parser;
mod prompt;
mod response;
mod rules;
mod split;
mod types;


pub use config::ParserConfig;
pub use enrich::enrich;
pub use error::ParserError;
pub use parser::{parse_rules, LocationParser};
pub use prompt::FACT_SCHEMA;
pub use response::parse_fallback_response;
pub use split::split_clauses;
pub use types::{Clause, InheritedRegion, ParseOutcome};
