//! # Error Types
//!
//! Every failure is a generation-time error that aborts the whole run. No
//! partial output is ever returned alongside an error.

use std::fmt;

use thiserror::Error;

/// Generated method a failure was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Presence check.
    IsSet,
    /// State reset.
    Reset,
    /// Field validator.
    Validate,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IsSet => "IsSet()",
            Self::Reset => "Reset()",
            Self::Validate => "validate()",
        })
    }
}

/// Error during code generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// A requested root name is absent from the schema graph.
    #[error("object with root key {0} not found")]
    UnknownRootType(String),

    /// A record has no exported field to build a presence check from.
    #[error("unhandled struct {0} (does not have any exported fields)")]
    NoExportedFields(String),

    /// A field's shape has no synthesis rule for the method being generated.
    #[error("unhandled type {descriptor} for {method} for '{key}'")]
    UnsupportedFieldType {
        /// Dotted flattened key of the field.
        key: String,
        /// Declared type of the field.
        descriptor: String,
        /// Method being generated.
        method: Method,
    },

    /// A validation rule does not apply to the field's shape.
    #[error("'{key}': unhandled validation rule '{rule}' for type {descriptor}")]
    UnsupportedRule {
        /// Dotted flattened key of the field.
        key: String,
        /// Rule name as written in the tag.
        rule: String,
        /// Declared type of the field.
        descriptor: String,
    },

    /// A validation rule carries a value it cannot use.
    #[error("'{key}': invalid value '{value}' for validation rule '{rule}': {reason}")]
    InvalidRuleValue {
        /// Dotted flattened key of the field.
        key: String,
        /// Rule name.
        rule: String,
        /// Value as written in the tag.
        value: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A `pattern`-style rule names a variable missing from the pattern pool.
    #[error("'{key}': pattern variable '{pattern}' is not declared")]
    UnknownPattern {
        /// Dotted flattened key of the field.
        key: String,
        /// Referenced pattern variable.
        pattern: String,
    },

    /// A struct-level rule names a field the record does not have.
    #[error("'{key}': validation rule '{rule}' references unknown field '{field}'")]
    UnknownSibling {
        /// Dotted key of the record carrying the rule.
        key: String,
        /// Rule name.
        rule: String,
        /// External name that did not resolve.
        field: String,
    },

    /// Writing into the output buffer failed.
    #[error("write error: {0}")]
    Fmt(#[from] fmt::Error),
}

impl CodegenError {
    /// Flattened key path the error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::UnsupportedFieldType { key, .. }
            | Self::UnsupportedRule { key, .. }
            | Self::InvalidRuleValue { key, .. }
            | Self::UnknownPattern { key, .. }
            | Self::UnknownSibling { key, .. } => Some(key),
            Self::UnknownRootType(_) | Self::NoExportedFields(_) | Self::Fmt(_) => None,
        }
    }
}
