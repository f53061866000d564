//! # Types Subcommand
//!
//! Prints the record types a run would synthesize, in visitation order.

use anyhow::{Context, Result};
use clap::Args;

use crate::schema::SchemaArgs;

/// Arguments for the types subcommand.
#[derive(Args, Debug)]
pub struct TypesArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Print a JSON array instead of one name per line.
    #[arg(long)]
    pub json: bool,
}

/// Execute the types subcommand.
pub fn run_types(args: &TypesArgs) -> Result<u8> {
    let loaded = args.schema.load()?;
    let names = loaded.generator()?.reachable();
    if args.json {
        let rendered = serde_json::to_string_pretty(&names).context("failed to serialize type list")?;
        println!("{rendered}");
    } else {
        for name in &names {
            println!("{name}");
        }
    }
    tracing::debug!(count = names.len(), "listed reachable types");
    Ok(0)
}
