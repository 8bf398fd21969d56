//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use territory_domain::{LocationFact, PostalRecord};
use territory_janitor::BatchStats;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format parsed facts.
    pub fn format_facts(&self, facts: &[LocationFact]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_facts_json(facts),
            OutputFormat::Table => self.format_facts_table(facts),
            OutputFormat::Quiet => Ok(facts
                .iter()
                .map(LocationFact::display_name)
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_facts_json(&self, facts: &[LocationFact]) -> Result<String> {
        let json_facts: Vec<serde_json::Value> = facts
            .iter()
            .map(|f| {
                serde_json::json!({
                    "country": f.country,
                    "state_code": f.state_code,
                    "county": f.county,
                    "city": f.city,
                    "postal_code": f.postal_code,
                    "radius_miles": f.radius_miles,
                    "is_resale": f.is_resale,
                    "latitude": f.latitude,
                    "longitude": f.longitude,
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json_facts)?)
    }

    fn format_facts_table(&self, facts: &[LocationFact]) -> Result<String> {
        if facts.is_empty() {
            return Ok(self.colorize("No location found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["City", "County", "State", "Postal", "Country", "Radius", "Resale"]);

        for fact in facts {
            let radius = fact
                .radius_miles
                .map(|r| format!("{} mi", r))
                .unwrap_or_default();
            builder.push_record([
                fact.city.as_deref().unwrap_or("-"),
                fact.county.as_deref().unwrap_or("-"),
                fact.state_code.as_deref().unwrap_or("-"),
                fact.postal_code.as_deref().unwrap_or("-"),
                fact.country.as_str(),
                radius.as_str(),
                if fact.is_resale { "yes" } else { "" },
            ]);
        }

        Ok(self.styled(builder))
    }

    /// Format the counters of a batch run.
    pub fn format_stats(&self, title: &str, stats: &BatchStats) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
            OutputFormat::Quiet => Ok(stats.processed.to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record([title, ""]);
                for (label, value) in stats_rows(stats) {
                    builder.push_record([label.to_string(), value.to_string()]);
                }
                let mut out = self.styled(builder);
                if stats.errors > 0 {
                    out.push('\n');
                    out.push_str(&self.warning(&format!(
                        "{} store error(s), see log for details",
                        stats.errors
                    )));
                }
                Ok(out)
            }
        }
    }

    /// Format a gazetteer lookup.
    pub fn format_postal_record(&self, record: Option<&PostalRecord>) -> Result<String> {
        let Some(record) = record else {
            return Ok(self.colorize("Postal code not found.", "yellow"));
        };

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "postal_code": record.postal_code,
                "country": record.country,
                "city": record.city,
                "county": record.county,
                "state_code": record.state_code,
                "latitude": record.latitude,
                "longitude": record.longitude,
            }))?),
            OutputFormat::Quiet => Ok(record.postal_code.clone()),
            OutputFormat::Table => {
                let coordinates = match (record.latitude, record.longitude) {
                    (Some(lat), Some(lon)) => format!("{:.4}, {:.4}", lat, lon),
                    _ => "-".to_string(),
                };
                let mut builder = Builder::default();
                builder.push_record(["Postal", "City", "County", "State", "Country", "Coordinates"]);
                builder.push_record([
                    record.postal_code.as_str(),
                    record.city.as_deref().unwrap_or("-"),
                    record.county.as_deref().unwrap_or("-"),
                    record.state_code.as_deref().unwrap_or("-"),
                    record.country.as_str(),
                    coordinates.as_str(),
                ]);
                Ok(self.styled(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Whether machine-readable output was requested.
    pub fn is_machine_readable(&self) -> bool {
        self.format != OutputFormat::Table
    }

    fn styled(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn stats_rows(stats: &BatchStats) -> Vec<(&'static str, usize)> {
    [
        ("Processed", stats.processed),
        ("Updated", stats.updated),
        ("Split", stats.split),
        ("Inserted", stats.inserted),
        ("Unchanged", stats.unchanged),
        ("Skipped", stats.skipped),
        ("Enriched", stats.enriched),
        ("Deleted", stats.deleted),
        ("Franchises", stats.franchises),
        ("Fallback calls", stats.fallback_calls as usize),
        ("Errors", stats.errors),
    ]
    .into_iter()
    .filter(|(label, count)| *count > 0 || *label == "Processed")
    .collect()
}
