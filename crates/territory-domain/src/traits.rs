//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{CheckId, TerritoryCheck};

/// Trait for storing and retrieving territory checks
///
/// Implemented by the infrastructure layer (territory-store). All operations
/// are simple predicate-filtered CRUD; no transactions are required.
pub trait TerritoryStore {
    /// Error type for store operations
    type Error;

    /// Insert a new check
    fn insert_check(&mut self, check: &TerritoryCheck) -> Result<CheckId, Self::Error>;

    /// Get a check by ID
    fn get_check(&self, id: CheckId) -> Result<Option<TerritoryCheck>, Self::Error>;

    /// Query checks matching criteria, ordered by id
    fn query_checks(&self, query: &CheckQuery) -> Result<Vec<TerritoryCheck>, Self::Error>;

    /// Overwrite the geography of an existing check
    ///
    /// Returns `false` when no row has the check's id.
    fn update_check(&mut self, check: &TerritoryCheck) -> Result<bool, Self::Error>;

    /// Delete checks by id, returning how many rows were removed
    fn delete_checks(&mut self, ids: &[CheckId]) -> Result<usize, Self::Error>;

    /// Franchise ids owning more than one check
    fn franchises_with_multiple_checks(&self) -> Result<Vec<String>, Self::Error>;
}

/// Query criteria for retrieving checks
#[derive(Debug, Clone, Default)]
pub struct CheckQuery {
    /// Filter by owning franchise
    pub franchise_id: Option<String>,

    /// Only rows not yet written by a parse run whose city, county and postal
    /// code are all null
    pub missing_geography: bool,

    /// Only rows with a postal code but a null city, county, state or coordinate
    pub needs_enrichment: bool,

    /// Only rows with an id strictly greater than this cursor
    pub after: Option<CheckId>,

    /// Maximum results to return
    pub limit: Option<usize>,
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (territory-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate output constrained to a JSON schema (if supported)
    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}

/// Errors that carry a rate-limit marker
///
/// The parser's fallback retry policy uses this to pick a fixed cooldown
/// instead of the regular backoff.
pub trait RateLimited {
    /// True when the provider asked the caller to slow down
    fn is_rate_limited(&self) -> bool;
}
