//! Prompt for the extraction fallback

/// JSON schema every extraction response must follow
pub const FACT_SCHEMA: &str = r#"{
  "type": "array",
  "items": {
    "type": "object",
    "properties": {
      "country": {"type": "string"},
      "state_code": {"type": ["string", "null"]},
      "county": {"type": ["string", "null"]},
      "city": {"type": ["string", "null"]},
      "postal_code": {"type": ["string", "null"]},
      "radius_miles": {"type": ["number", "null"]},
      "is_resale": {"type": "boolean"}
    }
  }
}"#;

/// Builds the fallback prompt for one clause
pub struct PromptBuilder {
    clause: String,
    state_hint: Option<String>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(clause: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
            state_hint: None,
        }
    }

    /// Add the state the surrounding record belongs to
    pub fn with_state_hint(mut self, hint: Option<&str>) -> Self {
        self.state_hint = hint
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        if let Some(hint) = &self.state_hint {
            prompt.push_str(&format!("The record is filed under state/province: {}\n\n", hint));
        }

        prompt.push_str("Text:\n---\n");
        prompt.push_str(&self.clause);
        prompt.push_str("\n---\n\n");
        prompt.push_str("Schema:\n");
        prompt.push_str(FACT_SCHEMA);
        prompt.push('\n');
        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"Extract every place mentioned in the franchise territory text below.
Return a JSON array with one object per place and no other text.

Fields:
- country: ISO 3166-1 alpha-2 code, "US" unless the place is clearly elsewhere
- state_code: two-letter state or province code
- county: county name without the word "County" (US only)
- city: city name, never a number
- postal_code: 5-digit ZIP or Canadian "A1A 1A1"
- radius_miles: number of miles only if a number is stated
- is_resale: true if the text says resale

Use null for anything not stated."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_clause_and_schema() {
        let prompt = PromptBuilder::new("the greater metroplex").build();
        assert!(prompt.contains("the greater metroplex"));
        assert!(prompt.contains("\"radius_miles\""));
        assert!(!prompt.contains("filed under"));
    }

    #[test]
    fn test_prompt_includes_hint() {
        let prompt = PromptBuilder::new("the metroplex")
            .with_state_hint(Some(" TX "))
            .build();
        assert!(prompt.contains("state/province: TX"));
    }

    #[test]
    fn test_blank_hint_ignored() {
        let prompt = PromptBuilder::new("x").with_state_hint(Some("  ")).build();
        assert!(!prompt.contains("filed under"));
    }

    #[test]
    fn test_schema_is_json() {
        let value: serde_json::Value = serde_json::from_str(FACT_SCHEMA).unwrap();
        assert_eq!(value["type"], "array");
    }
}
