//! # Struct Tags
//!
//! Fields carry Go-style struct tags: space-separated `key:"value"` pairs,
//! e.g. `json:"service_name" validate:"required,maxLength=1024"`. The
//! generator reads two keys: [`NAME_KEY`] for the external field name and
//! [`VALIDATE_KEY`] for validation rules.
//!
//! Tags are parsed eagerly when a manifest is loaded, so a malformed tag is
//! reported against its record and field instead of silently dropping keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TagParseError;

/// Tag key holding the external (serialized) field name.
pub const NAME_KEY: &str = "json";

/// Tag key holding the comma-separated validation rules.
pub const VALIDATE_KEY: &str = "validate";

/// Name override that removes a field from external naming.
pub const EXCLUDED_NAME: &str = "-";

/// A parsed struct tag. Keeps the raw text for diagnostics and the ordered
/// `(key, value)` pairs for lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StructTag {
    raw: String,
    entries: Vec<(String, String)>,
}

impl StructTag {
    /// Parse a struct tag.
    ///
    /// # Errors
    ///
    /// Returns [`TagParseError`] when a key is not followed by `:"`, a quoted
    /// value is unterminated, or a value contains an unknown escape.
    pub fn parse(raw: &str) -> Result<Self, TagParseError> {
        let mut entries = Vec::new();
        let mut rest = raw;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            let key_len = rest
                .bytes()
                .take_while(|&b| b > b' ' && b != b':' && b != b'"' && b != 0x7f)
                .count();
            if key_len == 0 {
                return Err(TagParseError::new(raw, "expected a tag key"));
            }
            let (key, after_key) = rest.split_at(key_len);
            let Some(quoted) = after_key.strip_prefix(":\"") else {
                return Err(TagParseError::new(
                    raw,
                    format!("key '{key}' must be followed by :\"value\""),
                ));
            };
            let (value, remainder) = unquote(raw, quoted)?;
            entries.push((key.to_string(), value));
            rest = remainder;
        }
        Ok(Self {
            raw: raw.to_string(),
            entries,
        })
    }

    /// Look up the value stored under `key`. The first occurrence wins.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Resolve the external name of a field declared as `ident`.
    ///
    /// The first comma-separated segment of the [`NAME_KEY`] value overrides
    /// the name; `"-"` excludes the field from external naming; an absent
    /// tag or an empty first segment falls back to the lower-cased identifier.
    pub fn external_name(&self, ident: &str) -> ExternalName {
        match self.lookup(NAME_KEY) {
            Some(EXCLUDED_NAME) => ExternalName::Excluded,
            Some(value) => match value.split(',').next() {
                Some(name) if !name.is_empty() => ExternalName::Named(name.to_string()),
                _ => ExternalName::Named(ident.to_lowercase()),
            },
            None => ExternalName::Named(ident.to_lowercase()),
        }
    }

    /// The validation rules declared under [`VALIDATE_KEY`], split on commas.
    /// Empty segments are dropped.
    pub fn validation_rules(&self) -> Vec<&str> {
        self.lookup(VALIDATE_KEY)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Scan a double-quoted value whose opening quote has been consumed.
/// Returns the unescaped value and the text after the closing quote.
fn unquote<'a>(raw: &str, quoted: &'a str) -> Result<(String, &'a str), TagParseError> {
    let mut value = String::new();
    let mut chars = quoted.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, &quoted[i + 1..])),
            '\\' => match chars.next() {
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, other)) => {
                    return Err(TagParseError::new(
                        raw,
                        format!("unknown escape sequence '\\{other}'"),
                    ))
                }
                None => break,
            },
            _ => value.push(c),
        }
    }
    Err(TagParseError::new(raw, "unterminated quoted value"))
}

impl TryFrom<String> for StructTag {
    type Error = TagParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<StructTag> for String {
    fn from(tag: StructTag) -> Self {
        tag.raw
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// External name of a field after tag resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExternalName {
    /// The field is serialized under this name.
    Named(String),
    /// The tag override is `"-"`.
    Excluded,
}

impl ExternalName {
    /// Returns true for an `Excluded` name.
    pub fn is_excluded(&self) -> bool {
        matches!(self, Self::Excluded)
    }

    /// The name, if the field has one.
    pub fn as_named(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Excluded => None,
        }
    }
}
