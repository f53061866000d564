//! # mdgen-codegen: Model Method Synthesis
//!
//! Given a [`SchemaGraph`](mdgen_core::SchemaGraph) and a list of root
//! record names, [`CodeGenerator`] emits one source file containing, for
//! every record reachable from the roots:
//!
//! - `IsSet()`: true when any exported field holds a non-default value;
//! - `Reset()`: returns every exported field to its default state in place;
//! - `validate()`: checks the rules declared in each field's `validate` tag.
//!
//! ## Pipeline
//!
//! ```text
//! roots ──► engine (dedup walk) ──► presence / reset / validation ──► emitter
//!                 │                          │
//!                 └── classify ◄─────────────┘
//!                                            └──► syntax (TargetSyntax)
//! ```
//!
//! Rule selection and traversal never spell target-language text; all
//! literal templates live behind [`TargetSyntax`], with [`GoSyntax`] as the
//! default rendering.
//!
//! ## Crate Policy
//!
//! - Depends only on `mdgen-core` among workspace crates.
//! - No I/O: the caller decides where the generated text goes.
//! - Errors abort the run; no partial output is ever returned.
//! - No `unsafe` code.

pub mod classify;
mod emit;
pub mod engine;
pub mod error;
mod presence;
mod reset;
mod rules;
pub mod syntax;
mod validation;

pub use classify::{classify, FieldShape};
pub use engine::CodeGenerator;
pub use error::{CodegenError, Method};
pub use syntax::{GoSyntax, TargetSyntax, GO};
