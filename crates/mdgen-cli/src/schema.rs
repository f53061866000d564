//! Manifest loading shared by every subcommand, with command-line overrides
//! applied on top of the file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use sha2::{Digest, Sha256};

use mdgen_codegen::CodeGenerator;
use mdgen_core::{SchemaGraph, SchemaManifest};

/// Arguments selecting the schema and what to generate from it.
#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Schema manifest (YAML; `.json` files are read as JSON).
    #[arg(long)]
    pub schema: PathBuf,

    /// Package identifier, overriding the manifest.
    #[arg(long)]
    pub package: Option<String>,

    /// Root record name, overriding the manifest's roots. Repeatable.
    #[arg(long = "root")]
    pub roots: Vec<String>,
}

/// A loaded manifest and the graph built from it.
#[derive(Debug)]
pub struct LoadedSchema {
    pub manifest: SchemaManifest,
    pub graph: SchemaGraph,
}

impl SchemaArgs {
    /// Read the manifest and apply overrides.
    pub fn load(&self) -> Result<LoadedSchema> {
        let mut manifest = SchemaManifest::load(&self.schema)
            .with_context(|| format!("failed to load schema manifest: {}", self.schema.display()))?;
        if let Some(package) = &self.package {
            manifest.package = package.clone();
        }
        if !self.roots.is_empty() {
            manifest.roots = self.roots.clone();
        }
        if manifest.roots.is_empty() {
            bail!("no root types: list them under `roots` or pass --root");
        }
        let graph = manifest
            .graph()
            .with_context(|| format!("invalid schema manifest: {}", self.schema.display()))?;
        tracing::debug!(
            schema = %self.schema.display(),
            records = graph.len(),
            roots = ?manifest.roots,
            "loaded schema"
        );
        Ok(LoadedSchema { manifest, graph })
    }
}

impl LoadedSchema {
    /// Generator configured from the manifest.
    pub fn generator(&self) -> Result<CodeGenerator<'_, SchemaGraph>> {
        let generator = CodeGenerator::new(&self.graph, &self.manifest.roots, &self.manifest.package)
            .context("failed to resolve root types")?
            .with_patterns(self.manifest.patterns.clone())
            .with_options(self.manifest.options.clone());
        Ok(generator)
    }

    /// Render the complete generated file.
    pub fn render(&self) -> Result<String> {
        self.generator()?
            .generate()
            .with_context(|| format!("code generation failed for package {}", self.manifest.package))
    }
}

/// Lower-case hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data).iter().map(|b| format!("{b:02x}")).collect()
}
