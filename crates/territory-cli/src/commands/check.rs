//! Check command implementation.

use super::Context;
use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the check command.
pub async fn execute_check(args: CheckArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let state = args
        .state
        .as_deref()
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty());
    if let Some(state) = &state {
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CliError::InvalidInput(format!(
                "State must be a two-letter code, got '{}'",
                state
            )));
        }
    }

    let parser = ctx.parser(args.offline);
    let outcome = parser.parse(&args.text, state.as_deref()).await?;

    println!("{}", formatter.format_facts(&outcome.facts)?);
    if outcome.used_fallback && !formatter.is_machine_readable() {
        println!(
            "{}",
            formatter.info(&format!(
                "Extraction service used ({} call(s))",
                outcome.fallback_attempts
            ))
        );
    }
    Ok(())
}
