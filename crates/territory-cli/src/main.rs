//! Territory CLI - command-line entry point.

use clap::Parser;
use territory_cli::commands::{self, Context};
use territory_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> territory_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let ctx = Context::new(config, cli.db, cli.gazetteer);

    match cli.command {
        Command::Parse(args) => commands::execute_parse(args, &ctx, &formatter).await?,
        Command::Dedup(args) => commands::execute_dedup(args, &ctx, &formatter)?,
        Command::Enrich(args) => commands::execute_enrich(args, &ctx, &formatter)?,
        Command::Check(args) => commands::execute_check(args, &ctx, &formatter).await?,
        Command::Gazetteer(args) => commands::execute_gazetteer(args, &ctx, &formatter)?,
    }

    Ok(())
}
