//! # Verify Subcommand
//!
//! Regenerates in memory and compares the SHA-256 of the result with the
//! file on disk. Exit code 1 means the file is stale.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::schema::{sha256_hex, SchemaArgs};

/// Arguments for the verify subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Previously generated file to check.
    #[arg(long)]
    pub out: PathBuf,
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let expected = sha256_hex(args.schema.load()?.render()?.as_bytes());
    let on_disk = std::fs::read(&args.out)
        .with_context(|| format!("failed to read generated file: {}", args.out.display()))?;
    let actual = sha256_hex(&on_disk);

    if actual == expected {
        println!("OK: {} is up to date (sha256 {expected})", args.out.display());
        Ok(0)
    } else {
        tracing::error!(
            out = %args.out.display(),
            expected = %expected,
            actual = %actual,
            "generated file is stale"
        );
        println!(
            "STALE: {} (expected sha256 {expected}, found {actual}); rerun `mdgen generate`",
            args.out.display()
        );
        Ok(1)
    }
}
