//! Territory check records - persisted facts tied to a franchise and a date

use crate::{AvailabilityStatus, LocationFact};
use std::fmt;

/// Unique identifier for a territory check based on UUIDv7
///
/// UUIDv7 keeps identifiers chronologically sortable, which the store uses as
/// a stable paging cursor and the dedup engine uses as the final tie-break
/// between records observed on the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CheckId(u128);

impl CheckId {
    /// Generate a new UUIDv7-based CheckId
    ///
    /// # Examples
    ///
    /// ```
    /// use territory_domain::CheckId;
    ///
    /// let id = CheckId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a CheckId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a CheckId from its UUID string form
    ///
    /// # Examples
    ///
    /// ```
    /// use territory_domain::CheckId;
    ///
    /// let id = CheckId::new();
    /// let parsed = CheckId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s.trim())
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid check id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for CheckId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A territory availability fact observed for one franchise
///
/// One raw broker statement may split into several checks that share
/// `franchise_id`, `location_raw`, `availability_status` and `check_date` but
/// differ in geography.
#[derive(Debug, Clone, PartialEq)]
pub struct TerritoryCheck {
    /// Unique identifier
    pub id: CheckId,

    /// Owning franchise
    pub franchise_id: String,

    /// Original text as collected, never rewritten
    pub location_raw: String,

    /// Structured geography parsed from `location_raw`
    pub location: LocationFact,

    /// Availability reported by the broker
    pub availability_status: AvailabilityStatus,

    /// When the status was observed (Unix seconds)
    pub check_date: Option<u64>,

    /// Set once a parse run has written this row, so rows that only carry a
    /// state leave the parse backlog
    pub parsed: bool,
}

impl TerritoryCheck {
    /// Create an unparsed check with empty geography
    pub fn new(
        franchise_id: impl Into<String>,
        location_raw: impl Into<String>,
        availability_status: AvailabilityStatus,
        check_date: Option<u64>,
    ) -> Self {
        Self {
            id: CheckId::new(),
            franchise_id: franchise_id.into(),
            location_raw: location_raw.into(),
            location: LocationFact::empty(),
            availability_status,
            check_date,
            parsed: false,
        }
    }

    /// Attach parsed geography
    pub fn with_location(mut self, location: LocationFact) -> Self {
        self.location = location;
        self
    }

    /// Create a sibling row for an additional clause split from the same raw text
    ///
    /// The sibling gets a fresh id and shares franchise, raw text, status and date.
    pub fn split_sibling(&self, location: LocationFact) -> Self {
        Self {
            id: CheckId::new(),
            franchise_id: self.franchise_id.clone(),
            location_raw: self.location_raw.clone(),
            location,
            availability_status: self.availability_status,
            check_date: self.check_date,
            parsed: true,
        }
    }

    /// Raw text trimmed and case-folded, used for exact-duplicate grouping
    pub fn normalized_raw(&self) -> String {
        self.location_raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// True when city, county and postal code are all missing
    ///
    /// A state alone is treated as a hint rather than parsed geography.
    pub fn lacks_geography(&self) -> bool {
        self.location.city.is_none()
            && self.location.county.is_none()
            && self.location.postal_code.is_none()
    }
}
