//! Reset synthesizer: `Reset()` returns every exported field to its default
//! state while keeping allocated storage.
//!
//! Sequences of records reset each element before truncating, so pooled
//! elements are clean when the backing array is reused.

use mdgen_core::{RecordType, SchemaLookup};

use crate::classify::{classify, FieldShape};
use crate::engine::Context;
use crate::error::{CodegenError, Method};

/// Emit the reset of `record`.
pub(crate) fn synthesize<L: SchemaLookup + ?Sized>(
    ctx: &Context<'_, L>,
    out: &mut String,
    record: &RecordType,
    key: &str,
) -> Result<(), CodegenError> {
    ctx.syntax.reset_open(out, &record.name)?;
    for field in record.exported_fields() {
        match classify(&field.ty, ctx.schema) {
            FieldShape::Sequence { custom, .. } => {
                if custom {
                    ctx.syntax.reset_elements(out, &field.name)?;
                }
                ctx.syntax.reset_truncate(out, &field.name)?;
            }
            FieldShape::Mapping { .. } => ctx.syntax.reset_drain(out, &field.name)?,
            FieldShape::Nullable(_) | FieldShape::Record { .. } => {
                ctx.syntax.reset_delegate(out, &field.name)?;
            }
            FieldShape::Unsupported => {
                return Err(CodegenError::UnsupportedFieldType {
                    key: field.flattened_key(key),
                    descriptor: field.ty.to_string(),
                    method: Method::Reset,
                })
            }
        }
    }
    ctx.syntax.reset_close(out)?;
    Ok(())
}
