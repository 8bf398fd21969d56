//! Multi-location splitting
//!
//! Cuts a raw statement into independent place references. Segments that only
//! qualify the previous place ("25 miles", "TX", "resale") are merged back into
//! it. Clauses without a state of their own borrow the next stated one, or
//! failing that the closest earlier one.

use crate::rules;
use crate::types::{Clause, InheritedRegion};
use regex::Regex;
use std::sync::LazyLock;

// Uppercase "OR" is left alone: it is far more often Oregon than a conjunction.
static SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?:or|Or|and|And|AND|plus)\s+|\s*(?:&|/|;|,|\n)\s*")
        .expect("separator regex is valid")
});

/// Split `raw` into clauses, preserving left-to-right order
pub fn split_clauses(raw: &str) -> Vec<Clause> {
    let mut texts: Vec<String> = Vec::new();

    for segment in SEPARATOR_REGEX.split(raw) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match texts.last_mut() {
            Some(previous) if rules::is_qualifier(segment, previous) => {
                previous.push_str(", ");
                previous.push_str(segment);
            }
            _ => texts.push(segment.to_string()),
        }
    }

    let explicit: Vec<Option<InheritedRegion>> =
        texts.iter().map(|t| rules::explicit_region(t)).collect();

    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let inherited_region = if explicit[i].is_some() {
                None
            } else {
                // Trailing shared state first, then the nearest earlier one
                explicit[i + 1..]
                    .iter()
                    .flatten()
                    .next()
                    .or_else(|| explicit[..i].iter().rev().flatten().next())
                    .cloned()
            };
            Clause {
                text,
                inherited_region,
            }
        })
        .collect()
}
