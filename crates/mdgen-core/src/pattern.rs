//! # Pattern Pool
//!
//! Maps pattern-variable names to their regex source. The generator only
//! echoes the names into the output header (one compiled variable each,
//! sorted by name) and checks that `pattern=` rules reference a known entry.
//! The sources themselves are declared by hand next to the generated file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pattern-variable name to regex source. Iteration is lexicographic by name,
/// which keeps the emitted header byte-stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternPool(BTreeMap<String, String>);

impl PatternPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.0.insert(name.into(), source.into());
    }

    /// Returns true if `name` is a declared pattern variable.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PatternPool {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
