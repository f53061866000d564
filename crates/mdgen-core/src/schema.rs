//! # Schema Graph
//!
//! Record types, their ordered fields, and the tagged [`TypeDescriptor`]
//! that replaces host-language type reflection. The graph is immutable once
//! built; the generator borrows it for the duration of one run.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DescriptorParseError, SchemaError};
use crate::tag::{ExternalName, StructTag};

/// Identifier of the sentinel field that attaches struct-level rules to a
/// record (`_ struct{} \`validate:"requiredAnyOf=a;b"\``).
pub const SENTINEL_FIELD: &str = "_";

/// Primitive kind carried by a nullable wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NullableKind {
    /// `nullable.String`
    String,
    /// `nullable.Int`
    Int,
    /// `nullable.Float64`
    Float,
    /// `nullable.Interface`
    Interface,
}

impl NullableKind {
    /// Wrapper type name in generated code.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::String => "nullable.String",
            Self::Int => "nullable.Int",
            Self::Float => "nullable.Float64",
            Self::Interface => "nullable.Interface",
        }
    }

    fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "nullable.String" => Some(Self::String),
            "nullable.Int" => Some(Self::Int),
            "nullable.Float64" => Some(Self::Float),
            "nullable.Interface" => Some(Self::Interface),
            _ => None,
        }
    }
}

/// Builtin host types that classify as [`TypeDescriptor::Primitive`].
const BUILTIN_TYPES: &[&str] = &[
    "bool", "string", "byte", "rune", "int", "int8", "int16", "int32", "int64", "uint",
    "uint8", "uint16", "uint32", "uint64", "float32", "float64", "interface{}", "any", "error",
];

/// A field's declared type.
///
/// Serialized as a host type expression: `nullable.String`, `[]Tag`,
/// `map[string]interface{}`, `func()`, `Service`. Pointers, fixed-size
/// arrays and package-qualified names parse as primitives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeDescriptor {
    /// A bare host type with no synthesis rule of its own (`string`,
    /// `interface{}`, `func()`, `*Tag`, `[4]string`, `time.Duration`).
    Primitive(String),
    /// A nullable wrapper around a primitive.
    Nullable(NullableKind),
    /// Ordered sequence of elements.
    SequenceOf(Box<TypeDescriptor>),
    /// String-keyed mapping of elements.
    MappingOf(Box<TypeDescriptor>),
    /// Reference to a record by name. The name need not resolve in
    /// the graph: unresolved records (e.g. `struct{}`) are non-custom.
    Record(String),
}

impl TypeDescriptor {
    /// Shorthand for `SequenceOf`.
    pub fn sequence_of(elem: TypeDescriptor) -> Self {
        Self::SequenceOf(Box::new(elem))
    }

    /// Shorthand for `MappingOf`.
    pub fn mapping_of(elem: TypeDescriptor) -> Self {
        Self::MappingOf(Box::new(elem))
    }

    /// Shorthand for `Record`.
    pub fn record(name: impl Into<String>) -> Self {
        Self::Record(name.into())
    }

    /// Shorthand for `Primitive`.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive(name.into())
    }

    /// The element type of a container, or the descriptor itself otherwise.
    pub fn unwrap_container(&self) -> &TypeDescriptor {
        match self {
            Self::SequenceOf(elem) | Self::MappingOf(elem) => elem,
            other => other,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(name) | Self::Record(name) => f.write_str(name),
            Self::Nullable(kind) => f.write_str(kind.type_name()),
            Self::SequenceOf(elem) => write!(f, "[]{elem}"),
            Self::MappingOf(elem) => write!(f, "map[string]{elem}"),
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = DescriptorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        if expr.is_empty() {
            return Err(DescriptorParseError::new(s, "empty type expression"));
        }
        if let Some(elem) = expr.strip_prefix("[]") {
            return Ok(Self::sequence_of(elem.parse()?));
        }
        if let Some(rest) = expr.strip_prefix("map[") {
            let Some(elem) = rest.strip_prefix("string]") else {
                return Err(DescriptorParseError::new(s, "mapping keys must be string"));
            };
            return Ok(Self::mapping_of(elem.parse()?));
        }
        if expr.starts_with("nullable.") {
            return NullableKind::from_type_name(expr)
                .map(Self::Nullable)
                .ok_or_else(|| DescriptorParseError::new(s, "unknown nullable wrapper"));
        }
        if is_opaque_host_type(expr) {
            return Ok(Self::Primitive(expr.to_string()));
        }
        if expr.contains(char::is_whitespace) {
            return Err(DescriptorParseError::new(s, "unsupported type expression"));
        }
        Ok(Self::Record(expr.to_string()))
    }
}

/// Host types that never name a schema record: builtins, functions,
/// channels, pointers, fixed-size arrays and types from other packages.
fn is_opaque_host_type(expr: &str) -> bool {
    BUILTIN_TYPES.contains(&expr)
        || expr.starts_with("func(")
        || expr.starts_with("chan ")
        || expr.starts_with('*')
        || expr.starts_with('[')
        || expr.contains('.')
}

impl TryFrom<String> for TypeDescriptor {
    type Error = DescriptorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TypeDescriptor> for String {
    fn from(ty: TypeDescriptor) -> Self {
        ty.to_string()
    }
}

/// A record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Identifier in generated code.
    pub name: String,
    /// Declared type.
    pub ty: TypeDescriptor,
    /// Tag metadata.
    pub tag: StructTag,
    /// Visible outside the declaring package.
    pub exported: bool,
    /// Embedded/anonymous field.
    pub embedded: bool,
}

impl Field {
    /// Create a field with an empty tag. Exported-ness follows the host
    /// convention: the identifier starts with an uppercase letter.
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let name = name.into();
        let exported = is_exported_ident(&name);
        Self {
            name,
            ty,
            tag: StructTag::default(),
            exported,
            embedded: false,
        }
    }

    /// The sentinel field carrying struct-level rules.
    pub fn sentinel(tag: StructTag) -> Self {
        Self {
            name: SENTINEL_FIELD.to_string(),
            ty: TypeDescriptor::record("struct{}"),
            tag,
            exported: false,
            embedded: true,
        }
    }

    /// Replace the tag.
    pub fn with_tag(mut self, tag: StructTag) -> Self {
        self.tag = tag;
        self
    }

    /// Mark the field as embedded.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Returns true for the `_` sentinel marker.
    pub fn is_sentinel(&self) -> bool {
        self.name == SENTINEL_FIELD
    }

    /// External name after tag resolution.
    pub fn external_name(&self) -> ExternalName {
        self.tag.external_name(&self.name)
    }

    /// Segment this field contributes to a dotted key path. Excluded fields
    /// fall back to the lower-cased identifier; the sentinel contributes
    /// nothing.
    pub fn key_segment(&self) -> Option<String> {
        if self.is_sentinel() {
            return None;
        }
        Some(match self.external_name() {
            ExternalName::Named(name) => name,
            ExternalName::Excluded => self.name.to_lowercase(),
        })
    }

    /// Dotted key of this field below `parent`.
    pub fn flattened_key(&self, parent: &str) -> String {
        match (parent.is_empty(), self.key_segment()) {
            (_, None) => parent.to_string(),
            (true, Some(segment)) => segment,
            (false, Some(segment)) => format!("{parent}.{segment}"),
        }
    }
}

/// Host convention for exported identifiers.
pub fn is_exported_ident(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// A record (struct) type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    /// Qualified type name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

impl RecordType {
    /// Create a record type.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Exported fields in declaration order.
    pub fn exported_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.exported)
    }

    /// Find a field by its external name.
    pub fn field_by_external_name(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.external_name().as_named() == Some(name))
    }
}

/// Lookup of record types by qualified name.
pub trait SchemaLookup {
    /// Resolve a record type.
    fn record(&self, name: &str) -> Option<&RecordType>;

    /// Returns true if `name` resolves to a record in this schema.
    fn contains(&self, name: &str) -> bool {
        self.record(name).is_some()
    }
}

/// In-memory schema graph keyed by qualified type name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaGraph {
    records: BTreeMap<String, RecordType>,
}

impl SchemaGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateType`] if the name is already present.
    pub fn insert(&mut self, record: RecordType) -> Result<(), SchemaError> {
        if self.records.contains_key(&record.name) {
            return Err(SchemaError::DuplicateType(record.name));
        }
        self.records.insert(record.name.clone(), record);
        Ok(())
    }

    /// Build a graph from records.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateType`] on a repeated name.
    pub fn from_records(records: impl IntoIterator<Item = RecordType>) -> Result<Self, SchemaError> {
        let mut graph = Self::new();
        for record in records {
            graph.insert(record)?;
        }
        Ok(graph)
    }

    /// Record names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the graph has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SchemaLookup for SchemaGraph {
    fn record(&self, name: &str) -> Option<&RecordType> {
        self.records.get(name)
    }
}
