//! Dedup command implementation.

use super::Context;
use crate::cli::DedupArgs;
use crate::error::Result;
use crate::output::Formatter;
use territory_dedup::{DedupConfig, DedupEngine};
use territory_janitor::{Janitor, JanitorConfig};

/// Execute the dedup command.
pub fn execute_dedup(args: DedupArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let mut store = ctx.open_store()?;

    let dedup_config = if args.exact_only {
        DedupConfig::exact_only()
    } else {
        ctx.config.dedup.clone()
    };
    let engine = DedupEngine::new(dedup_config).with_gazetteer(ctx.gazetteer());

    let mut janitor = Janitor::new(JanitorConfig {
        dry_run: ctx.config.janitor.dry_run || args.dry_run,
        ..ctx.config.janitor.clone()
    });
    if janitor.config().dry_run && !formatter.is_machine_readable() {
        println!("{}", formatter.info("Dry run: nothing will be deleted"));
    }

    let stats = janitor.dedup_sweep(&engine, &mut store, args.franchise.as_deref())?;
    println!("{}", formatter.format_stats("Dedup", &stats)?);
    Ok(())
}
