//! # Type Descriptor Classifier
//!
//! Maps a field's declared type to the shape the synthesizers dispatch on.
//! Container and record shapes record whether the contained/target type is
//! a record of the schema ("custom"), which decides between recursing into
//! generated methods and checking primitive values directly.

use mdgen_core::{NullableKind, RecordType, SchemaLookup, TypeDescriptor};

/// Shape of a field as seen by the synthesizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape<'a> {
    /// One of the nullable wrapper kinds.
    Nullable(NullableKind),
    /// Sequence of `elem`.
    Sequence {
        /// Element type.
        elem: &'a TypeDescriptor,
        /// Element is a schema record.
        custom: bool,
    },
    /// String-keyed mapping of `elem`.
    Mapping {
        /// Element type.
        elem: &'a TypeDescriptor,
        /// Element is a schema record.
        custom: bool,
    },
    /// Nested record.
    Record {
        /// Record name.
        name: &'a str,
        /// The record resolves in the schema.
        custom: bool,
    },
    /// No synthesis rule applies.
    Unsupported,
}

impl FieldShape<'_> {
    /// Returns true for sequences and mappings.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Sequence { .. } | Self::Mapping { .. })
    }
}

/// Classify a declared type.
pub fn classify<'a, L: SchemaLookup + ?Sized>(ty: &'a TypeDescriptor, schema: &L) -> FieldShape<'a> {
    match ty {
        TypeDescriptor::Nullable(kind) => FieldShape::Nullable(*kind),
        TypeDescriptor::SequenceOf(elem) => FieldShape::Sequence {
            elem: elem.as_ref(),
            custom: custom_record(elem, schema).is_some(),
        },
        TypeDescriptor::MappingOf(elem) => FieldShape::Mapping {
            elem: elem.as_ref(),
            custom: custom_record(elem, schema).is_some(),
        },
        TypeDescriptor::Record(name) => FieldShape::Record {
            name: name.as_str(),
            custom: schema.contains(name),
        },
        TypeDescriptor::Primitive(_) => FieldShape::Unsupported,
    }
}

/// The schema record `ty` names, if any.
pub fn custom_record<'s, L: SchemaLookup + ?Sized>(
    ty: &TypeDescriptor,
    schema: &'s L,
) -> Option<&'s RecordType> {
    match ty {
        TypeDescriptor::Record(name) => schema.record(name),
        _ => None,
    }
}

/// The schema record reached through a field: the field's own record type,
/// or the element record of a sequence or mapping.
pub fn nested_record<'s, L: SchemaLookup + ?Sized>(
    ty: &TypeDescriptor,
    schema: &'s L,
) -> Option<&'s RecordType> {
    custom_record(ty.unwrap_container(), schema)
}
