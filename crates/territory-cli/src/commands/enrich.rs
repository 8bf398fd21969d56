//! Enrich command implementation.

use super::Context;
use crate::cli::EnrichArgs;
use crate::error::Result;
use crate::output::Formatter;
use territory_janitor::{Janitor, JanitorConfig};

/// Execute the enrich command.
pub fn execute_enrich(args: EnrichArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let mut store = ctx.open_store()?;
    let gazetteer = ctx.gazetteer();

    let mut janitor = Janitor::new(JanitorConfig {
        record_limit: args.limit.or(ctx.config.janitor.record_limit),
        dry_run: ctx.config.janitor.dry_run || args.dry_run,
        loop_until_empty: true,
        ..ctx.config.janitor.clone()
    });

    let stats = janitor.enrich_backlog(gazetteer.as_ref(), &mut store)?;
    println!("{}", formatter.format_stats("Enrich", &stats)?);
    Ok(())
}
