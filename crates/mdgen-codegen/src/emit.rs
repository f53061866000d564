//! Output buffer: the header first, then one block of methods per visited
//! record. Text is only ever appended.

use mdgen_core::PatternPool;

use crate::error::CodegenError;
use crate::syntax::TargetSyntax;

/// Append-only accumulator of generated source.
#[derive(Debug, Default)]
pub(crate) struct Emitter {
    buf: String,
    records: usize,
}

impl Emitter {
    /// Start a buffer with the package declaration, imports, and one
    /// compiled variable per pattern, sorted by name.
    pub fn with_header(
        syntax: &dyn TargetSyntax,
        generator: &str,
        package: &str,
        patterns: &PatternPool,
    ) -> Result<Self, CodegenError> {
        let mut emitter = Self::default();
        let names: Vec<&str> = patterns.names().collect();
        syntax.header(&mut emitter.buf, generator, package, &names)?;
        Ok(emitter)
    }

    /// Append the methods of one record.
    pub fn push_record(&mut self, block: &str) {
        self.buf.push_str(block);
        self.records += 1;
    }

    /// Number of record blocks appended.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
