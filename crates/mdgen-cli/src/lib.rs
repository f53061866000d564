//! # mdgen-cli: Model Decoder Generator Command-Line Interface
//!
//! Output delivery for `mdgen-codegen`: the synthesis core returns text, this
//! crate decides where it goes.
//!
//! ## Subcommands
//!
//! - `generate`: render a schema manifest to stdout or a file
//! - `verify`: fail when a checked-in generated file is stale
//! - `types`: list the records a run would synthesize
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `*Args` structs; handlers are `run_*`
//!   functions returning the process exit code.
//! - Generation logic stays in `mdgen-codegen`.
//! - Generated code goes to stdout or a file; logs go to stderr.

pub mod generate;
pub mod schema;
pub mod types;
pub mod verify;
