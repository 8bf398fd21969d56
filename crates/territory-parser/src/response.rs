//! Validation of extraction service responses
//!
//! Every field is checked on its own. A field with the wrong type or shape is
//! dropped (null or default) rather than failing the whole object, and objects
//! left without geography are discarded.

use crate::error::ParserError;
use serde_json::{Map, Value};
use territory_domain::location::{is_all_digits, DEFAULT_COUNTRY};
use territory_domain::region;
use territory_domain::{normalize_postal_code, LocationFact};
use tracing::{debug, warn};

/// Parse an extraction response into validated facts
///
/// Accepts a single object or an array of objects, optionally wrapped in a
/// markdown code block.
pub fn parse_fallback_response(response: &str) -> Result<Vec<LocationFact>, ParserError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ParserError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let items = match json {
        Value::Array(items) => items,
        Value::Object(obj) => vec![Value::Object(obj)],
        _ => {
            return Err(ParserError::InvalidFormat(
                "Expected JSON object or array".to_string(),
            ))
        }
    };

    let mut facts = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            warn!("Extraction item {} is not an object", idx);
            continue;
        };
        match fact_from_object(obj).validated() {
            Some(fact) => facts.push(fact),
            None => debug!("Extraction item {} carries no geography", idx),
        }
    }
    Ok(facts)
}

/// Extract JSON from response, handling markdown code blocks and leading prose
fn extract_json(response: &str) -> Result<String, ParserError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ParserError::InvalidFormat("Empty code block".to_string()));
        }
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        return Ok(lines[1..end].join("\n"));
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed.to_string());
    }

    let start = trimmed.find(['{', '[']);
    let end = trimmed.rfind(['}', ']']);
    match (start, end) {
        (Some(start), Some(end)) if end > start => Ok(trimmed[start..=end].to_string()),
        _ => Err(ParserError::InvalidFormat("No JSON found in response".to_string())),
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
}

fn country_field(obj: &Map<String, Value>) -> String {
    text_field(obj, "country")
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string())
}

fn state_field(obj: &Map<String, Value>) -> Option<String> {
    let raw = text_field(obj, "state_code")?;
    if raw.len() == 2 && raw.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(raw.to_ascii_uppercase());
    }
    region::region_for_name(&raw).map(|(code, _)| code.to_string())
}

fn county_field(obj: &Map<String, Value>) -> Option<String> {
    let raw = text_field(obj, "county")?;
    let lower = raw.to_ascii_lowercase();
    let stripped = [" county", " parish"]
        .iter()
        .find_map(|suffix| lower.ends_with(suffix).then(|| raw[..raw.len() - suffix.len()].trim()))
        .unwrap_or(raw.as_str());
    (!stripped.is_empty()).then(|| stripped.to_string())
}

fn postal_field(obj: &Map<String, Value>, country: &str) -> Option<String> {
    let raw = match obj.get("postal_code")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_u64().map(|v| format!("{:05}", v))?,
        _ => return None,
    };
    normalize_postal_code(&raw, country)
}

fn radius_field(obj: &Map<String, Value>) -> Option<f64> {
    let radius = match obj.get("radius_miles")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (radius.is_finite() && radius >= 0.0).then_some(radius)
}

fn fact_from_object(obj: &Map<String, Value>) -> LocationFact {
    let country = country_field(obj);
    LocationFact {
        state_code: state_field(obj),
        county: county_field(obj),
        city: text_field(obj, "city").filter(|c| !is_all_digits(c)),
        postal_code: postal_field(obj, &country),
        radius_miles: radius_field(obj),
        is_resale: obj.get("is_resale").and_then(Value::as_bool).unwrap_or(false),
        country,
        ..LocationFact::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_object() {
        let facts = parse_fallback_response(
            r#"{"country": "US", "state_code": "TX", "city": "Fort Worth", "radius_miles": 10}"#,
        )
        .unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].city.as_deref(), Some("Fort Worth"));
        assert_eq!(facts[0].state_code.as_deref(), Some("TX"));
        assert_eq!(facts[0].radius_miles, Some(10.0));
    }

    #[test]
    fn test_parse_array_with_markdown_wrapper() {
        let response = "```json\n[\n  {\"city\": \"Dallas\", \"state_code\": \"TX\"},\n  {\"city\": \"Tyler\", \"state_code\": \"TX\"}\n]\n```";
        let facts = parse_fallback_response(response).unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[1].city.as_deref(), Some("Tyler"));
    }

    #[test]
    fn test_leading_prose_tolerated() {
        let facts = parse_fallback_response(r#"Here you go: [{"county": "Travis County", "state_code": "Texas"}]"#)
            .unwrap();
        assert_eq!(facts[0].county.as_deref(), Some("Travis"));
        assert_eq!(facts[0].state_code.as_deref(), Some("TX"));
    }

    #[test]
    fn test_wrong_typed_fields_rejected_individually() {
        let facts = parse_fallback_response(
            r#"[{"city": 94551, "state_code": "California Republic", "postal_code": "94551",
                 "radius_miles": "lots", "is_resale": "yes", "country": 1}]"#,
        )
        .unwrap();
        assert_eq!(facts.len(), 1);
        let fact = &facts[0];
        assert_eq!(fact.city, None);
        assert_eq!(fact.state_code, None);
        assert_eq!(fact.postal_code.as_deref(), Some("94551"));
        assert_eq!(fact.radius_miles, None);
        assert!(!fact.is_resale);
        assert_eq!(fact.country, "US");
    }

    #[test]
    fn test_digit_city_rejected() {
        let facts = parse_fallback_response(r#"[{"city": "94551"}]"#).unwrap();
        assert!(facts.is_empty());
    }

    #[test]
    fn test_objects_without_geography_dropped() {
        let facts =
            parse_fallback_response(r#"[{"radius_miles": 5}, "junk", {"city": "Waco"}]"#).unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].city.as_deref(), Some("Waco"));
    }

    #[test]
    fn test_canadian_postal_and_numeric_zip() {
        let facts = parse_fallback_response(
            r#"[{"country": "ca", "postal_code": "k1a0b1"}, {"postal_code": 2134}]"#,
        )
        .unwrap();
        assert_eq!(facts[0].postal_code.as_deref(), Some("K1A 0B1"));
        assert_eq!(facts[0].country, "CA");
        assert_eq!(facts[1].postal_code.as_deref(), Some("02134"));
    }

    #[test]
    fn test_malformed_responses() {
        assert!(parse_fallback_response("This is not JSON").is_err());
        assert!(parse_fallback_response("42").is_err());
        assert!(parse_fallback_response("```").is_err());
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_fallback_response("[]").unwrap().is_empty());
    }
}
