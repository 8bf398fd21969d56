//! Types for parsing requests and results

use territory_domain::LocationFact;

/// One independent place reference cut from a raw statement
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Clause text, with any merged qualifiers
    pub text: String,

    /// State (and its country) shared from a later clause, e.g. the "TX" in
    /// "Dallas or Amarillo, TX"
    pub inherited_region: Option<InheritedRegion>,
}

/// A state or province code carried over from a neighbouring clause
#[derive(Debug, Clone, PartialEq)]
pub struct InheritedRegion {
    /// Two-letter state or province code
    pub state_code: String,

    /// ISO country code the region belongs to
    pub country: String,
}

/// Result of parsing one raw statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Facts in left-to-right input order; the first one is the primary
    pub facts: Vec<LocationFact>,

    /// At least one clause went to the extraction service
    pub used_fallback: bool,

    /// Extraction service calls made, retries included
    pub fallback_attempts: u32,
}

impl ParseOutcome {
    /// True when nothing geographic was recovered
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}
