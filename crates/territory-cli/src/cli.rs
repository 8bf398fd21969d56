//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Territory CLI - Normalize and deduplicate franchise territory availability.
#[derive(Debug, Parser)]
#[command(name = "territory")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Territory check database
    #[arg(long, env = "TERRITORY_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Postal-code gazetteer database
    #[arg(long, env = "TERRITORY_GAZETTEER", global = true)]
    pub gazetteer: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (counts or ids only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse stored checks that have no geography yet
    Parse(ParseArgs),

    /// Remove redundant checks
    Dedup(DedupArgs),

    /// Fill missing geography from the gazetteer
    Enrich(EnrichArgs),

    /// Parse a single statement and print the facts
    Check(CheckArgs),

    /// Manage the postal-code gazetteer
    Gazetteer(GazetteerArgs),
}

/// Arguments for the parse command.
#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Stop after this many rows
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Show intended changes without writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Pause after each row that needed the extraction service
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Keep going until the backlog is empty
    #[arg(long = "loop")]
    pub loop_until_empty: bool,

    /// Never call the extraction service
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the dedup command.
#[derive(Debug, Args)]
pub struct DedupArgs {
    /// Only this franchise
    #[arg(long)]
    pub franchise: Option<String>,

    /// Show intended deletions without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Only remove identical statements
    #[arg(long)]
    pub exact_only: bool,
}

/// Arguments for the enrich command.
#[derive(Debug, Args)]
pub struct EnrichArgs {
    /// Stop after this many rows
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Show intended changes without writing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the check command.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Statement to parse, e.g. "Dallas or Amarillo, TX"
    pub text: String,

    /// State to assume when the text names none
    #[arg(short, long)]
    pub state: Option<String>,

    /// Never call the extraction service
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the gazetteer command.
#[derive(Debug, Args)]
pub struct GazetteerArgs {
    #[command(subcommand)]
    pub command: GazetteerCommand,
}

/// Gazetteer subcommands.
#[derive(Debug, Subcommand)]
pub enum GazetteerCommand {
    /// Load postal codes from a CSV file
    ///
    /// Columns: postal_code,country,city,county,state_code,latitude,longitude
    Import {
        /// CSV file to load
        csv: PathBuf,
    },

    /// Show how many postal codes are loaded
    Stats,

    /// Look up a single postal code
    Lookup {
        /// Postal code
        postal_code: String,

        /// Country code
        #[arg(long, default_value = "US")]
        country: String,
    },
}
