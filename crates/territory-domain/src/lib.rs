//! Territory Domain Layer
//!
//! Core value types and collaborator interfaces for the territory
//! normalization and deduplication engine. Like every domain layer in this
//! workspace it has a single external dependency (`uuid`) and no I/O.
//!
//! ## Key Concepts
//!
//! - **LocationFact**: one parsed place reference (country, state, county,
//!   city, postal code, radius, resale flag, coordinates)
//! - **TerritoryCheck**: a persisted fact tied to a franchise and a date
//! - **AvailabilityStatus**: Available / Not Available / Pending
//! - **ScopeLevel**: geographic specificity (postal code < city < county < state)
//! - **Gazetteer**: postal-code reference lookup
//!
//! ## Architecture
//!
//! Infrastructure (SQLite store, gazetteer table, LLM providers) lives in other
//! crates and is reached only through the traits in [`traits`] and
//! [`gazetteer::Gazetteer`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod check;
pub mod gazetteer;
pub mod location;
pub mod region;
pub mod scope;
pub mod status;
pub mod traits;

// Re-exports for convenience
pub use check::{CheckId, TerritoryCheck};
pub use gazetteer::{normalize_postal_code, Gazetteer, PostalRecord, StaticGazetteer};
pub use location::LocationFact;
pub use scope::ScopeLevel;
pub use status::AvailabilityStatus;
