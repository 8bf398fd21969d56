//! Rule-based field extraction for a single clause
//!
//! Matching works on a "masked" copy of the clause: every span that has been
//! consumed (radius phrase, resale marker, postal code) is overwritten with
//! spaces so byte offsets stay aligned with the original text.

use crate::types::{Clause, InheritedRegion};
use regex::Regex;
use std::sync::LazyLock;
use territory_domain::region::{self, RegionCountry};
use territory_domain::{normalize_postal_code, LocationFact};

static RADIUS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*-?\s*(?:miles?|mi)\b(?:\s+of\b)?")
        .expect("radius regex is valid")
});

static RESALE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bre-?sale\b").expect("resale regex is valid"));

static CA_POSTAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Z]\d[A-Z])[\s-]?(\d[A-Z]\d)\b").expect("canadian postal regex is valid")
});

static US_POSTAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})(?:-\d{4})?\b").expect("zip regex is valid"));

static REGION_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z]{2}\b").expect("region code regex is valid"));

static CANADA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcanada\b").expect("canada regex is valid"));

static COUNTRY_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:(?i:usa|united\s+states(?:\s+of\s+america)?|canada)\b|US\b|U\.S\.(?:A\.?)?)")
        .expect("country regex is valid")
});

static FILLER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:surrounding(?:\s+areas?)?|areas?|vicinity|metro(?:politan)?|greater|region|statewide|state\s*wide|entire\s+state|all\s+of|city\s+of|within|near|around|in|plus|only|and|or)\b",
    )
    .expect("filler regex is valid")
});

static STATEWIDE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:state\s*wide|entire\s+state|whole\s+state|all\s+of\s+the\s+state)\b")
        .expect("statewide regex is valid")
});

static COUNTY_SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\s+(?:county|parish|co\.?)$").expect("county regex is valid")
});

static REGION_NAMES: LazyLock<Vec<(&'static str, &'static str, RegionCountry)>> =
    LazyLock::new(region::region_names_longest_first);

const MAX_LOCALITY_WORDS: usize = 4;

const EDGE_PUNCTUATION: &[char] = &[',', '.', ';', ':', '(', ')', '-', '+', '\'', '"'];

/// A matched region with the byte offset where it starts
struct RegionMatch {
    code: &'static str,
    country: RegionCountry,
    start: usize,
}

/// A matched postal code with the byte offset where it starts
struct PostalMatch {
    code: String,
    country: &'static str,
    start: usize,
}

/// Overwrite every match of `re` with spaces
fn mask(text: &mut String, re: &Regex) {
    let ranges: Vec<_> = re.find_iter(text).map(|m| m.range()).collect();
    for range in ranges {
        let blank = " ".repeat(range.len());
        text.replace_range(range, &blank);
    }
}

fn mask_postal_codes(text: &mut String) {
    mask(text, &CA_POSTAL_REGEX);
    mask(text, &US_POSTAL_REGEX);
}

fn find_postal(text: &str) -> Option<PostalMatch> {
    if let Some(caps) = CA_POSTAL_REGEX.captures(text) {
        let joined = format!("{}{}", &caps[1], &caps[2]);
        if let (Some(code), Some(whole)) = (normalize_postal_code(&joined, "CA"), caps.get(0)) {
            return Some(PostalMatch {
                code,
                country: "CA",
                start: whole.start(),
            });
        }
    }
    let m = US_POSTAL_REGEX.find(text)?;
    normalize_postal_code(m.as_str(), "US").map(|code| PostalMatch {
        code,
        country: "US",
        start: m.start(),
    })
}

/// True when the clause carries a US or Canadian postal code
pub fn has_postal_code(text: &str) -> bool {
    find_postal(text).is_some()
}

/// Two-letter region code, accepted only when written in uppercase or right
/// after a comma so that words like "or" and "in" are not read as states.
/// The last accepted code wins.
fn find_region_code(masked: &str) -> Option<RegionMatch> {
    REGION_CODE_REGEX
        .find_iter(masked)
        .filter(|m| {
            let token = m.as_str();
            let uppercase = token.chars().all(|c| c.is_ascii_uppercase());
            let after_comma = masked[..m.start()].trim_end().ends_with(',');
            uppercase || after_comma
        })
        .filter_map(|m| {
            region::region_for_code(m.as_str()).map(|(code, country)| RegionMatch {
                code,
                country,
                start: m.start(),
            })
        })
        .last()
}

fn is_word_boundary(bytes: &[u8], start: usize, end: usize) -> bool {
    let before = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
    let after = end >= bytes.len() || !bytes[end].is_ascii_alphanumeric();
    before && after
}

/// True when nothing but filler, country words and punctuation remain
fn is_blank_tail(tail: &str) -> bool {
    let stripped = FILLER_REGEX.replace_all(tail, " ");
    let stripped = COUNTRY_WORD_REGEX.replace_all(&stripped, " ");
    !stripped.chars().any(|c| c.is_alphanumeric())
}

/// Full state or province name ending the place reference, longest name first
fn find_region_name(masked: &str) -> Option<RegionMatch> {
    let lower = masked.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut best: Option<RegionMatch> = None;

    for &(name, code, country) in REGION_NAMES.iter() {
        let needle = name.to_ascii_lowercase();
        let mut from = 0;
        while let Some(pos) = lower[from..].find(&needle) {
            let start = from + pos;
            let end = start + needle.len();
            if is_word_boundary(bytes, start, end)
                && is_blank_tail(&masked[end..])
                && best.as_ref().map_or(true, |b| start < b.start)
            {
                best = Some(RegionMatch {
                    code,
                    country,
                    start,
                });
            }
            from = start + 1;
        }
    }
    best
}

pub(crate) fn region_from_hint(hint: &str) -> Option<InheritedRegion> {
    let (code, country) = region::region_for_code(hint).or_else(|| region::region_for_name(hint))?;
    Some(InheritedRegion {
        state_code: code.to_string(),
        country: country.iso_code().to_string(),
    })
}

/// Region stated in the clause itself: a code, a name, or a Canadian postal prefix
pub fn explicit_region(text: &str) -> Option<InheritedRegion> {
    let mut masked = text.to_string();
    mask(&mut masked, &RADIUS_REGEX);
    mask(&mut masked, &RESALE_REGEX);
    let postal = find_postal(&masked);
    mask_postal_codes(&mut masked);

    if let Some(m) = find_region_code(&masked).or_else(|| find_region_name(&masked)) {
        return Some(InheritedRegion {
            state_code: m.code.to_string(),
            country: m.country.iso_code().to_string(),
        });
    }

    let postal = postal.filter(|p| p.country == "CA")?;
    region::province_for_postal_prefix(&postal.code).map(|code| InheritedRegion {
        state_code: code.to_string(),
        country: "CA".to_string(),
    })
}

/// True when a segment only qualifies its neighbour instead of naming a place:
/// a radius, "surrounding area", a resale marker, a country word, a bare state
/// or a bare postal code.
///
/// A bare state only qualifies a previous segment without its own state, and a
/// bare postal code only qualifies one without its own postal code; otherwise
/// the segment is a place in its own right ("Washington or Oregon").
pub fn is_qualifier(segment: &str, previous: &str) -> bool {
    let mut masked = segment.to_string();
    mask(&mut masked, &RADIUS_REGEX);
    mask(&mut masked, &RESALE_REGEX);
    let has_postal = find_postal(&masked).is_some();
    mask_postal_codes(&mut masked);

    let stripped = FILLER_REGEX.replace_all(&masked, " ");
    let stripped = COUNTRY_WORD_REGEX.replace_all(&stripped, " ");
    let rest = stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(EDGE_PUNCTUATION)
        .trim()
        .to_string();

    let has_region = if rest.is_empty() {
        false
    } else if region::region_for_name(&rest).is_some() {
        true
    } else if rest
        .split_whitespace()
        .all(|t| region::region_for_code(t.trim_matches(EDGE_PUNCTUATION)).is_some())
    {
        true
    } else {
        return false;
    };

    if has_region && explicit_region(previous).is_some() {
        return false;
    }
    if has_postal && has_postal_code(previous) {
        return false;
    }
    true
}

/// Locality text once filler and country words are removed
fn strip_filler(raw: &str) -> String {
    let stripped = FILLER_REGEX.replace_all(raw, " ");
    let stripped = COUNTRY_WORD_REGEX.replace_all(&stripped, " ");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_matches(EDGE_PUNCTUATION).trim().to_string()
}

fn letter_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphabetic()).count()
}

/// Locality text with filler removed, if it reads like a place name:
/// capitalized, at least two letters, at most four words
fn clean_locality(raw: &str) -> Option<String> {
    let trimmed = strip_filler(raw);
    let capitalized = trimmed.chars().next().is_some_and(|c| c.is_uppercase());
    let words = trimmed.split_whitespace().count();
    (letter_count(&trimmed) >= 2 && capitalized && words <= MAX_LOCALITY_WORDS).then_some(trimmed)
}

/// What the pattern rules read from one clause
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RuledClause {
    pub fact: LocationFact,

    /// Words before the state or postal code that look like a place the
    /// rules could not read, e.g. the lowercase "oakland" in "oakland, ca".
    /// The fact then understates the clause and must not be trusted alone.
    pub unread_locality: bool,
}

/// Extract structured fields from one clause
///
/// The fact may carry no geography at all; callers decide whether to fall
/// back to the extraction service.
pub(crate) fn read_clause(clause: &Clause, state_hint: Option<&str>) -> RuledClause {
    let text = clause.text.as_str();
    let mut fact = LocationFact::empty();

    fact.is_resale = RESALE_REGEX.is_match(text);
    fact.radius_miles = RADIUS_REGEX
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok());

    let mut masked = text.to_string();
    mask(&mut masked, &RADIUS_REGEX);
    mask(&mut masked, &RESALE_REGEX);

    let postal = find_postal(&masked);
    mask_postal_codes(&mut masked);

    let code_match = find_region_code(&masked);
    let name_match = if code_match.is_none() {
        find_region_name(&masked)
    } else {
        None
    };
    let stated = code_match.or(name_match);

    let cut = [
        postal.as_ref().map(|p| p.start),
        stated.as_ref().map(|r| r.start),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(masked.len());

    let mut unread_locality = false;
    match clean_locality(&masked[..cut]) {
        Some(locality) => match COUNTY_SUFFIX_REGEX.captures(&locality) {
            Some(caps) => fact.county = Some(caps[1].trim().to_string()),
            None => fact.city = Some(locality),
        },
        None => {
            unread_locality = cut < masked.len()
                && !STATEWIDE_REGEX.is_match(text)
                && letter_count(&strip_filler(&masked[..cut])) >= 2;
        }
    }

    let own_region = stated
        .map(|r| InheritedRegion {
            state_code: r.code.to_string(),
            country: r.country.iso_code().to_string(),
        })
        .or_else(|| {
            postal
                .as_ref()
                .filter(|p| p.country == "CA")
                .and_then(|p| region::province_for_postal_prefix(&p.code))
                .map(|code| InheritedRegion {
                    state_code: code.to_string(),
                    country: "CA".to_string(),
                })
        });

    // A borrowed state only completes a clause that names something itself.
    let anchored = own_region.is_some()
        || postal.is_some()
        || fact.city.is_some()
        || fact.county.is_some()
        || STATEWIDE_REGEX.is_match(text);
    let region = own_region.or_else(|| {
        if anchored {
            clause
                .inherited_region
                .clone()
                .or_else(|| state_hint.and_then(region_from_hint))
        } else {
            None
        }
    });

    let canadian = postal.as_ref().is_some_and(|p| p.country == "CA")
        || region.as_ref().is_some_and(|r| r.country == "CA")
        || CANADA_REGEX.is_match(text);
    if canadian {
        fact.country = "CA".to_string();
    }

    fact.state_code = region.map(|r| r.state_code);
    fact.postal_code = postal.map(|p| p.code);

    fact.sanitize();
    RuledClause {
        fact,
        unread_locality,
    }
}
