//! # Schema Manifest
//!
//! A YAML or JSON document describing one generation run:
//!
//! ```yaml
//! package: model
//! roots: [Root]
//! patterns:
//!   patternNoAsterisk: '"^[^*]*$"'
//! types:
//!   - name: Root
//!     fields:
//!       - { name: Name, type: nullable.String, tag: 'json:"name" validate:"required"' }
//!       - { name: Tags, type: "[]Tag", tag: 'json:"tags"' }
//!   - name: Tag
//!     fields:
//!       - { name: Key, type: nullable.String, tag: 'json:"key"' }
//! ```
//!
//! The manifest is the host-neutral stand-in for reflecting over source
//! declarations: it is converted into a [`SchemaGraph`] once, and the
//! generator never sees the raw document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::GeneratorOptions;
use crate::error::SchemaError;
use crate::pattern::PatternPool;
use crate::schema::{is_exported_ident, Field, RecordType, SchemaGraph, TypeDescriptor, SENTINEL_FIELD};
use crate::tag::StructTag;

/// Top-level manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaManifest {
    /// Package identifier of the generated file.
    pub package: String,
    /// Root record names, in traversal order.
    #[serde(default)]
    pub roots: Vec<String>,
    /// Pattern variables echoed into the header.
    #[serde(default)]
    pub patterns: PatternPool,
    /// Run options.
    #[serde(default)]
    pub options: GeneratorOptions,
    /// Record definitions.
    #[serde(default)]
    pub types: Vec<RecordDef>,
}

/// A record definition as written in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordDef {
    /// Qualified type name.
    pub name: String,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// A field definition as written in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    /// Identifier.
    pub name: String,
    /// Host type expression.
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Raw struct tag.
    #[serde(default)]
    pub tag: String,
    /// Defaults to the identifier's case.
    #[serde(default)]
    pub exported: Option<bool>,
    /// Defaults to true only for the `_` sentinel.
    #[serde(default)]
    pub embedded: Option<bool>,
}

impl SchemaManifest {
    /// Load a manifest from disk. Files ending in `.json` are parsed as JSON,
    /// anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read and
    /// [`SchemaError::Json`]/[`SchemaError::Yaml`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse a YAML manifest.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Yaml`] on malformed input.
    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a JSON manifest.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] on malformed input.
    pub fn from_json_str(content: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Build the schema graph.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateType`] for repeated record names and
    /// [`SchemaError::MalformedTag`] for unparseable struct tags.
    pub fn graph(&self) -> Result<SchemaGraph, SchemaError> {
        let mut graph = SchemaGraph::new();
        for def in &self.types {
            graph.insert(def.to_record()?)?;
        }
        Ok(graph)
    }
}

impl RecordDef {
    fn to_record(&self) -> Result<RecordType, SchemaError> {
        let fields = self
            .fields
            .iter()
            .map(|f| f.to_field(&self.name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RecordType::new(self.name.clone(), fields))
    }
}

impl FieldDef {
    fn to_field(&self, record: &str) -> Result<Field, SchemaError> {
        let tag = StructTag::parse(&self.tag).map_err(|source| SchemaError::MalformedTag {
            record: record.to_string(),
            field: self.name.clone(),
            source,
        })?;
        Ok(Field {
            name: self.name.clone(),
            ty: self.ty.clone(),
            tag,
            exported: self.exported.unwrap_or_else(|| is_exported_ident(&self.name)),
            embedded: self.embedded.unwrap_or(self.name == SENTINEL_FIELD),
        })
    }
}
