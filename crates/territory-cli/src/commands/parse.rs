//! Parse command implementation.

use super::Context;
use crate::cli::ParseArgs;
use crate::error::Result;
use crate::output::Formatter;
use territory_janitor::{Janitor, JanitorConfig};

/// Execute the parse command.
pub async fn execute_parse(args: ParseArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let mut store = ctx.open_store()?;
    let parser = ctx.parser(args.offline);
    let config = janitor_config(&args, &ctx.config.janitor);

    if config.dry_run && !formatter.is_machine_readable() {
        println!("{}", formatter.info("Dry run: nothing will be written"));
    }

    let mut janitor = Janitor::new(config);
    let stats = janitor.parse_backlog(&parser, &mut store).await?;
    println!("{}", formatter.format_stats("Parse", &stats)?);
    Ok(())
}

fn janitor_config(args: &ParseArgs, base: &JanitorConfig) -> JanitorConfig {
    let mut config = base.clone();
    if args.limit.is_some() {
        config.record_limit = args.limit;
    }
    if let Some(delay) = args.delay_ms {
        config.fallback_delay_ms = delay;
    }
    config.loop_until_empty |= args.loop_until_empty;
    config.dry_run |= args.dry_run;
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_janitor_config() {
        let args = ParseArgs {
            limit: Some(10),
            dry_run: true,
            delay_ms: Some(0),
            loop_until_empty: true,
            offline: false,
        };
        let config = janitor_config(&args, &JanitorConfig::default());
        assert_eq!(config.record_limit, Some(10));
        assert_eq!(config.fallback_delay_ms, 0);
        assert!(config.loop_until_empty);
        assert!(config.dry_run);
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let args = ParseArgs {
            limit: None,
            dry_run: false,
            delay_ms: None,
            loop_until_empty: false,
            offline: false,
        };
        let base = JanitorConfig {
            record_limit: Some(7),
            ..JanitorConfig::backlog()
        };
        let config = janitor_config(&args, &base);
        assert_eq!(config, base);
    }
}
