//! Scope levels - geographic specificity of a location fact

use crate::LocationFact;

/// Geographic specificity, ordered from most specific to least
///
/// The derived `Ord` follows declaration order, so
/// `PostalCode < City < County < State`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeLevel {
    /// A single postal code
    PostalCode,

    /// A city
    City,

    /// A county
    County,

    /// A whole state or province
    State,
}

impl ScopeLevel {
    /// Numeric rank (1 = postal code ... 4 = state)
    pub fn rank(&self) -> u8 {
        match self {
            ScopeLevel::PostalCode => 1,
            ScopeLevel::City => 2,
            ScopeLevel::County => 3,
            ScopeLevel::State => 4,
        }
    }

    /// Scope level of a fact: the most specific present field wins
    ///
    /// Returns `None` for a fact without geography.
    pub fn of(fact: &LocationFact) -> Option<Self> {
        if fact.postal_code.is_some() {
            Some(ScopeLevel::PostalCode)
        } else if fact.city.is_some() {
            Some(ScopeLevel::City)
        } else if fact.county.is_some() {
            Some(ScopeLevel::County)
        } else if fact.state_code.is_some() {
            Some(ScopeLevel::State)
        } else {
            None
        }
    }

    /// Lowercase name for logs and output
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeLevel::PostalCode => "postal_code",
            ScopeLevel::City => "city",
            ScopeLevel::County => "county",
            ScopeLevel::State => "state",
        }
    }
}
