//! Presence synthesizer: `IsSet()` is true when any exported field holds a
//! non-default value.

use mdgen_core::{RecordType, SchemaLookup};

use crate::classify::{classify, FieldShape};
use crate::engine::Context;
use crate::error::{CodegenError, Method};
use crate::syntax::Presence;

/// Emit the presence check of `record`.
///
/// # Errors
///
/// [`CodegenError::NoExportedFields`] if the record has nothing to test and
/// [`CodegenError::UnsupportedFieldType`] for an exported field of primitive
/// type.
pub(crate) fn synthesize<L: SchemaLookup + ?Sized>(
    ctx: &Context<'_, L>,
    out: &mut String,
    record: &RecordType,
    key: &str,
) -> Result<(), CodegenError> {
    let mut fields = record.exported_fields().peekable();
    if fields.peek().is_none() {
        return Err(CodegenError::NoExportedFields(record.name.clone()));
    }
    ctx.syntax.presence_open(out, &record.name)?;
    for (i, field) in fields.enumerate() {
        let presence = match classify(&field.ty, ctx.schema) {
            shape if shape.is_container() => Presence::Len,
            FieldShape::Nullable(_) | FieldShape::Record { .. } => Presence::Call,
            _ => {
                return Err(CodegenError::UnsupportedFieldType {
                    key: field.flattened_key(key),
                    descriptor: field.ty.to_string(),
                    method: Method::IsSet,
                })
            }
        };
        ctx.syntax.presence_term(out, i == 0, &field.name, presence)?;
    }
    ctx.syntax.presence_close(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdgen_core::{Field, GeneratorOptions, NullableKind, PatternPool, SchemaGraph, TypeDescriptor};

    use crate::syntax::GO;

    fn run(graph: &SchemaGraph, name: &str) -> Result<String, CodegenError> {
        let patterns = PatternPool::new();
        let options = GeneratorOptions::default();
        let ctx = Context {
            schema: graph,
            syntax: &GO,
            patterns: &patterns,
            options: &options,
        };
        let mut out = String::new();
        synthesize(&ctx, &mut out, graph.record(name).unwrap(), "")?;
        Ok(out)
    }

    #[test]
    fn or_of_exported_fields() {
        let graph = SchemaGraph::from_records([
            RecordType::new(
                "Root",
                vec![
                    Field::new("Name", TypeDescriptor::Nullable(NullableKind::String)),
                    Field::new("Tags", TypeDescriptor::sequence_of(TypeDescriptor::record("Tag"))),
                    Field::new("Labels", TypeDescriptor::mapping_of(TypeDescriptor::primitive("string"))),
                    Field::new("Tag", TypeDescriptor::record("Tag")),
                    Field::new("hidden", TypeDescriptor::primitive("func()")),
                ],
            ),
            RecordType::new("Tag", vec![Field::new("Key", TypeDescriptor::Nullable(NullableKind::String))]),
        ])
        .unwrap();
        assert_eq!(
            run(&graph, "Root").unwrap(),
            "\nfunc (val *Root) IsSet() bool {\n\treturn val.Name.IsSet() || len(val.Tags) > 0 || len(val.Labels) > 0 || val.Tag.IsSet()\n}\n"
        );
    }

    #[test]
    fn record_without_exported_fields() {
        let graph = SchemaGraph::from_records([RecordType::new(
            "Opaque",
            vec![Field::new("inner", TypeDescriptor::Nullable(NullableKind::Int))],
        )])
        .unwrap();
        assert_eq!(
            run(&graph, "Opaque").unwrap_err(),
            CodegenError::NoExportedFields("Opaque".into())
        );
    }

    #[test]
    fn primitive_field_has_no_presence() {
        let graph = SchemaGraph::from_records([RecordType::new(
            "Tag",
            vec![Field::new("Handler", TypeDescriptor::primitive("func()"))
                .with_tag(mdgen_core::StructTag::parse(r#"json:"handler""#).unwrap())],
        )])
        .unwrap();
        assert_eq!(
            run(&graph, "Tag").unwrap_err(),
            CodegenError::UnsupportedFieldType {
                key: "handler".into(),
                descriptor: "func()".into(),
                method: Method::IsSet,
            }
        );
    }
}
