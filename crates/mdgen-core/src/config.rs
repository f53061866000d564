//! # Generator Options
//!
//! Run-level options loaded from the `options` block of a manifest. Every
//! field has a default, so an absent block yields [`GeneratorOptions::default`].

use serde::{Deserialize, Serialize};

/// Default value of [`GeneratorOptions::generator_name`].
pub const DEFAULT_GENERATOR_NAME: &str = "mdgen";

/// How an embedded field whose name override is `"-"` takes part in
/// validation. Sentinel fields conventionally carry `json:"-"`, so the
/// default keeps them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddedExclusion {
    /// Embedded fields are validated regardless of their name override.
    #[default]
    Include,
    /// Embedded fields tagged `"-"` are skipped like unexported fields.
    Skip,
}

/// Options for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorOptions {
    /// Policy for embedded fields tagged `"-"`.
    pub embedded_exclusion: EmbeddedExclusion,
    /// Name echoed into the `Code generated by` header line.
    pub generator_name: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            embedded_exclusion: EmbeddedExclusion::default(),
            generator_name: DEFAULT_GENERATOR_NAME.to_string(),
        }
    }
}
