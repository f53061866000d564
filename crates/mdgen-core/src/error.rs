//! # Error Types
//!
//! Errors raised while loading a schema manifest into a [`SchemaGraph`].
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! [`SchemaGraph`]: crate::schema::SchemaGraph

use thiserror::Error;

/// Error while building a schema graph.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The manifest file could not be read.
    #[error("io error reading '{path}': {source}")]
    Io {
        /// Path of the manifest.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid YAML or does not match the manifest shape.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The manifest is not valid JSON or does not match the manifest shape.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two record definitions share a qualified name.
    #[error("duplicate record type '{0}'")]
    DuplicateType(String),

    /// A field carries a struct tag that does not follow the `key:"value"` syntax.
    #[error("record '{record}', field '{field}': {source}")]
    MalformedTag {
        /// Record that declares the field.
        record: String,
        /// Field identifier.
        field: String,
        /// Parse failure.
        #[source]
        source: TagParseError,
    },
}

/// A type expression failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid type expression `{expr}`: {reason}")]
pub struct DescriptorParseError {
    /// The expression text.
    pub expr: String,
    /// What was wrong with it.
    pub reason: String,
}

impl DescriptorParseError {
    pub(crate) fn new(expr: &str, reason: impl Into<String>) -> Self {
        Self {
            expr: expr.to_string(),
            reason: reason.into(),
        }
    }
}

/// A struct tag failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed struct tag `{tag}`: {reason}")]
pub struct TagParseError {
    /// The raw tag text.
    pub tag: String,
    /// What was wrong with it.
    pub reason: String,
}

impl TagParseError {
    pub(crate) fn new(tag: &str, reason: impl Into<String>) -> Self {
        Self {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}
