//! Gazetteer command implementation.

use super::Context;
use crate::cli::{GazetteerArgs, GazetteerCommand};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use territory_domain::Gazetteer;
use territory_store::SqliteGazetteer;

/// Execute a gazetteer subcommand.
pub fn execute_gazetteer(args: GazetteerArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let gazetteer = SqliteGazetteer::open(&ctx.gazetteer)?;

    match args.command {
        GazetteerCommand::Import { csv } => {
            if !csv.exists() {
                return Err(CliError::InvalidInput(format!(
                    "CSV file not found: {}",
                    csv.display()
                )));
            }
            let imported = gazetteer.import_csv(&csv)?;
            if formatter.is_machine_readable() {
                println!("{}", imported);
            } else {
                println!(
                    "{}",
                    formatter.success(&format!("Imported {} postal code(s)", imported))
                );
            }
        }
        GazetteerCommand::Stats => {
            let count = gazetteer.count()?;
            if formatter.is_machine_readable() {
                println!("{}", count);
            } else {
                println!(
                    "{}",
                    formatter.info(&format!(
                        "{} postal code(s) in {}",
                        count,
                        ctx.gazetteer.display()
                    ))
                );
            }
        }
        GazetteerCommand::Lookup {
            postal_code,
            country,
        } => {
            let record = gazetteer.lookup(&postal_code, &country);
            println!("{}", formatter.format_postal_record(record.as_ref())?);
        }
    }
    Ok(())
}
