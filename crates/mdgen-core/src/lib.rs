//! # mdgen-core: Schema Graph Model
//!
//! This crate defines the host-neutral description of the record types the
//! generator works on. A schema loader (the [`manifest`] module, or any other
//! front end) populates a [`SchemaGraph`]; the synthesis core in
//! `mdgen-codegen` only ever reads it.
//!
//! ## Key Types
//!
//! - [`SchemaGraph`]: lookup of a [`RecordType`] by qualified name.
//! - [`TypeDescriptor`]: tagged variant describing a field's declared type.
//!   Exhaustive `match` everywhere; adding a shape forces every synthesizer
//!   to handle it.
//! - [`StructTag`]: parsed Go-style struct tag (`json:"name" validate:"required"`).
//! - [`PatternPool`]: pattern-variable names echoed into the output header.
//! - [`GeneratorOptions`]: run options, including the declared policy for
//!   embedded fields whose tag override is `"-"`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mdgen-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod manifest;
pub mod pattern;
pub mod schema;
pub mod tag;

pub use config::{EmbeddedExclusion, GeneratorOptions};
pub use error::{DescriptorParseError, SchemaError, TagParseError};
pub use manifest::{FieldDef, RecordDef, SchemaManifest};
pub use pattern::PatternPool;
pub use schema::{Field, NullableKind, RecordType, SchemaGraph, SchemaLookup, TypeDescriptor};
pub use tag::{ExternalName, StructTag};
