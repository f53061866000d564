//! # Generate Subcommand
//!
//! Renders the manifest and delivers the result to stdout or `--out`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::schema::{sha256_hex, SchemaArgs};

/// Arguments for the generate subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Output file. Parent directories are created. Defaults to stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Execute the generate subcommand.
pub fn run_generate(args: &GenerateArgs) -> Result<u8> {
    let code = args.schema.load()?.render()?;
    let digest = sha256_hex(code.as_bytes());

    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
            }
            std::fs::write(path, &code)
                .with_context(|| format!("failed to write output: {}", path.display()))?;
            tracing::info!(out = %path.display(), sha256 = %digest, bytes = code.len(), "wrote generated code");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(code.as_bytes())
                .context("failed to write generated code to stdout")?;
            stdout.flush().context("failed to flush stdout")?;
            tracing::info!(sha256 = %digest, bytes = code.len(), "generated code written to stdout");
        }
    }
    Ok(0)
}
