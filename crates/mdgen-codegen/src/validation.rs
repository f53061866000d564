//! # Validation Synthesizer
//!
//! Emits `validate()` for a record. Non-root records start with a presence
//! short-circuit: an absent optional substructure is always valid. Each
//! exported or embedded field then selects a rule set by priority:
//!
//! 1. nullable wrapper kind (string, int, float, interface); float shares the
//!    int rules;
//! 2. the field's shape: sequence, mapping, or record, each distinguishing
//!    custom (schema record) from primitive contents;
//! 3. anything else fails with [`CodegenError::UnsupportedFieldType`].
//!
//! Rules come from the field's `validate` tag. Every rule must apply to the
//! shape it is attached to; unknown or misplaced rules abort generation
//! instead of being dropped.

use mdgen_core::{EmbeddedExclusion, Field, NullableKind, RecordType, SchemaLookup, TypeDescriptor};

use crate::classify::{classify, FieldShape};
use crate::engine::Context;
use crate::error::{CodegenError, Method};
use crate::rules::{FieldRules, Rule};
use crate::syntax::{
    Bound, DynamicCheck, InputType, MapCheck, NumberCheck, Presence, Sibling, StringCheck,
    ValueChecks,
};

/// Emit the validator of `record`.
pub(crate) fn synthesize<L: SchemaLookup + ?Sized>(
    ctx: &Context<'_, L>,
    out: &mut String,
    record: &RecordType,
    key: &str,
    is_root: bool,
) -> Result<(), CodegenError> {
    ctx.syntax.validate_open(out, &record.name)?;
    if !is_root {
        ctx.syntax.validate_short_circuit(out)?;
    }
    for field in &record.fields {
        if !participates(field, ctx.options.embedded_exclusion) {
            continue;
        }
        let mut field_key = field.flattened_key(key);
        if field_key.is_empty() {
            field_key = record.name.clone();
        }
        let rules = FieldRules::parse(field, field_key)?;
        let v = FieldValidator {
            ctx,
            rules: &rules,
            name: field.key_segment().unwrap_or_default(),
        };
        match classify(&field.ty, ctx.schema) {
            FieldShape::Nullable(NullableKind::String) => v.nullable_string(out)?,
            FieldShape::Nullable(NullableKind::Int | NullableKind::Float) => v.nullable_number(out)?,
            FieldShape::Nullable(NullableKind::Interface) => v.nullable_interface(out)?,
            FieldShape::Sequence { elem, custom } => v.sequence(out, elem, custom)?,
            FieldShape::Mapping { elem, custom } => v.mapping(out, elem, custom)?,
            FieldShape::Record { custom: true, .. } => v.custom_record(out)?,
            FieldShape::Record { custom: false, .. } => v.struct_level(out, record)?,
            FieldShape::Unsupported => {
                return Err(CodegenError::UnsupportedFieldType {
                    key: rules.key.clone(),
                    descriptor: field.ty.to_string(),
                    method: Method::Validate,
                })
            }
        }
    }
    ctx.syntax.validate_close(out)?;
    Ok(())
}

/// Exported fields and embedded fields take part; other unexported fields
/// are skipped. Embedded fields excluded from naming follow the configured
/// policy.
fn participates(field: &Field, policy: EmbeddedExclusion) -> bool {
    if field.embedded && field.external_name().is_excluded() {
        return policy == EmbeddedExclusion::Include;
    }
    field.exported || field.embedded
}

fn is_string(ty: &TypeDescriptor) -> bool {
    matches!(ty, TypeDescriptor::Primitive(name) if name == "string")
}

fn is_dynamic(ty: &TypeDescriptor) -> bool {
    matches!(ty, TypeDescriptor::Primitive(name) if name == "interface{}" || name == "any")
}

struct FieldValidator<'c, 'f, L: ?Sized> {
    ctx: &'c Context<'c, L>,
    rules: &'c FieldRules<'f>,
    name: String,
}

impl<'f, L: SchemaLookup + ?Sized> FieldValidator<'_, 'f, L> {
    fn field(&self) -> &'f str {
        &self.rules.field.name
    }

    fn required(&self, out: &mut String, rule: &Rule<'_>, presence: Presence) -> Result<(), CodegenError> {
        self.rules.flag(rule)?;
        self.ctx.syntax.required(out, self.field(), &self.name, presence)?;
        Ok(())
    }

    fn string_check(&self, rule: &Rule<'f>) -> Result<Option<StringCheck<'f>>, CodegenError> {
        let label = rule.label();
        Ok(Some(match rule.name {
            "maxLength" => StringCheck::Length {
                bound: Bound::Max,
                limit: self.rules.limit(rule)?,
                label,
            },
            "minLength" => StringCheck::Length {
                bound: Bound::Min,
                limit: self.rules.limit(rule)?,
                label,
            },
            "pattern" => StringCheck::Pattern {
                pattern: self.rules.pattern(rule, self.ctx.patterns)?,
                label,
            },
            _ => return Ok(None),
        }))
    }

    fn nullable_string(&self, out: &mut String) -> Result<(), CodegenError> {
        let mut checks = Vec::new();
        for rule in &self.rules.rules {
            if rule.name == "required" {
                self.required(out, rule, Presence::Call)?;
            } else if rule.name == "enum" {
                checks.push(StringCheck::Enum {
                    variable: self.rules.identifier(rule)?,
                    label: rule.label(),
                });
            } else if let Some(check) = self.string_check(rule)? {
                checks.push(check);
            } else {
                return Err(self.rules.unsupported(rule));
            }
        }
        if !checks.is_empty() {
            self.ctx.syntax.nullable_string(out, self.field(), &self.name, &checks)?;
        }
        Ok(())
    }

    fn nullable_number(&self, out: &mut String) -> Result<(), CodegenError> {
        let mut checks = Vec::new();
        for rule in &self.rules.rules {
            let bound = match rule.name {
                "required" => {
                    self.required(out, rule, Presence::Call)?;
                    continue;
                }
                "min" => Bound::Min,
                "max" => Bound::Max,
                _ => return Err(self.rules.unsupported(rule)),
            };
            checks.push(NumberCheck {
                bound,
                literal: self.rules.number(rule)?,
                label: rule.label(),
            });
        }
        if !checks.is_empty() {
            self.ctx.syntax.nullable_number(out, self.field(), &self.name, &checks)?;
        }
        Ok(())
    }

    fn dynamic_check(&self, rule: &Rule<'f>, check: &mut DynamicCheck) -> Result<bool, CodegenError> {
        match rule.name {
            "maxLength" | "maxLengthVals" => {
                check.max_length = Some((self.rules.limit(rule)?, rule.label()));
            }
            "inputTypes" | "inputTypesVals" => {
                check.input_types = Some((self.rules.input_types(rule)?, rule.label()));
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// A length limit only reaches string payloads; with an explicit type
    /// list that excludes strings it would never fire.
    fn check_dynamic_consistency(&self, check: &DynamicCheck) -> Result<(), CodegenError> {
        let Some((_, types_label)) = &check.input_types else {
            return Ok(());
        };
        let conflicting = check.max_length.is_some()
            && !check
                .input_types
                .as_ref()
                .is_some_and(|(types, _)| types.contains(&InputType::String));
        match self.rules.rules.iter().find(|r| r.name.starts_with("maxLength")) {
            Some(rule) if conflicting => Err(self.rules.invalid(
                rule,
                format!("length limit never applies with {types_label}"),
            )),
            _ => Ok(()),
        }
    }

    fn nullable_interface(&self, out: &mut String) -> Result<(), CodegenError> {
        let mut check = DynamicCheck::default();
        for rule in &self.rules.rules {
            if rule.name == "required" {
                self.required(out, rule, Presence::Call)?;
            } else if rule.name.ends_with("Vals") || !self.dynamic_check(rule, &mut check)? {
                return Err(self.rules.unsupported(rule));
            }
        }
        self.check_dynamic_consistency(&check)?;
        if !check.is_empty() {
            self.ctx.syntax.nullable_dynamic(out, self.field(), &self.name, &check)?;
        }
        Ok(())
    }

    fn sequence(&self, out: &mut String, elem: &TypeDescriptor, custom: bool) -> Result<(), CodegenError> {
        let mut checks = Vec::new();
        for rule in &self.rules.rules {
            if rule.name == "required" {
                self.required(out, rule, Presence::Len)?;
                continue;
            }
            match self.string_check(rule)? {
                Some(check) if !custom && is_string(elem) => checks.push(check),
                _ => return Err(self.rules.unsupported(rule)),
            }
        }
        if custom {
            self.ctx.syntax.element_validate(out, self.field(), &self.name)?;
        } else if !checks.is_empty() {
            self.ctx.syntax.string_elements(out, self.field(), &self.name, &checks)?;
        }
        Ok(())
    }

    fn mapping(&self, out: &mut String, elem: &TypeDescriptor, custom: bool) -> Result<(), CodegenError> {
        let mut pattern_keys = None;
        let mut string_values = Vec::new();
        let mut dynamic_values = DynamicCheck::default();
        for rule in &self.rules.rules {
            match rule.name {
                "required" => self.required(out, rule, Presence::Len)?,
                "patternKeys" if !custom => {
                    pattern_keys = Some((self.rules.pattern(rule, self.ctx.patterns)?, rule.label()));
                }
                "maxLengthVals" if is_string(elem) => string_values.push(StringCheck::Length {
                    bound: Bound::Max,
                    limit: self.rules.limit(rule)?,
                    label: rule.label(),
                }),
                "maxLengthVals" | "inputTypesVals" if is_dynamic(elem) => {
                    self.dynamic_check(rule, &mut dynamic_values)?;
                }
                _ => return Err(self.rules.unsupported(rule)),
            }
        }
        if custom {
            self.ctx.syntax.element_validate(out, self.field(), &self.name)?;
            return Ok(());
        }
        self.check_dynamic_consistency(&dynamic_values)?;
        let values = if !string_values.is_empty() {
            ValueChecks::String(string_values)
        } else if !dynamic_values.is_empty() {
            ValueChecks::Dynamic(dynamic_values)
        } else {
            ValueChecks::None
        };
        if pattern_keys.is_some() || values != ValueChecks::None {
            let check = MapCheck { pattern_keys, values };
            self.ctx.syntax.map_entries(out, self.field(), &self.name, &check)?;
        }
        Ok(())
    }

    fn custom_record(&self, out: &mut String) -> Result<(), CodegenError> {
        for rule in &self.rules.rules {
            match rule.name {
                "required" => self.required(out, rule, Presence::Call)?,
                _ => return Err(self.rules.unsupported(rule)),
            }
        }
        self.ctx.syntax.record_validate(out, self.field(), &self.name)?;
        Ok(())
    }

    /// Rules across sibling fields, attached to a non-schema record field
    /// (normally the `_` sentinel).
    fn struct_level(&self, out: &mut String, record: &'f RecordType) -> Result<(), CodegenError> {
        for rule in &self.rules.rules {
            match rule.name {
                "requiredAnyOf" => {
                    let siblings = self.siblings(rule, record)?;
                    let label = self.rules.list(rule)?.join(";");
                    self.ctx.syntax.required_any_of(out, &siblings, &label)?;
                }
                "requiredIfAny" => {
                    let siblings = self.siblings(rule, record)?;
                    let Some((target, others)) = siblings.split_first().filter(|(_, o)| !o.is_empty()) else {
                        return Err(self.rules.invalid(rule, "expected a target field and at least one other"));
                    };
                    let names = self.rules.list(rule)?;
                    let label = names[1..].join(";");
                    self.ctx.syntax.required_if_any(out, *target, names[0], others, &label)?;
                }
                _ => return Err(self.rules.unsupported(rule)),
            }
        }
        Ok(())
    }

    fn siblings(&self, rule: &Rule<'f>, record: &'f RecordType) -> Result<Vec<Sibling<'f>>, CodegenError> {
        self.rules
            .list(rule)?
            .into_iter()
            .map(|name| {
                let sibling = record.field_by_external_name(name).ok_or_else(|| {
                    CodegenError::UnknownSibling {
                        key: self.rules.key.clone(),
                        rule: rule.name.to_string(),
                        field: name.to_string(),
                    }
                })?;
                let presence = match classify(&sibling.ty, self.ctx.schema) {
                    shape if shape.is_container() => Presence::Len,
                    FieldShape::Nullable(_) | FieldShape::Record { .. } => Presence::Call,
                    _ => {
                        return Err(self
                            .rules
                            .invalid(rule, format!("field '{name}' has no presence check")))
                    }
                };
                Ok(Sibling {
                    field: &sibling.name,
                    presence,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdgen_core::{GeneratorOptions, PatternPool, SchemaGraph, StructTag};

    use crate::syntax::GO;

    fn tag(raw: &str) -> StructTag {
        StructTag::parse(raw).unwrap()
    }

    fn run(graph: &SchemaGraph, record: &str, is_root: bool) -> Result<String, CodegenError> {
        let patterns: PatternPool = [("patternNoDot", "^[^.]*$")].into_iter().collect();
        let options = GeneratorOptions::default();
        let ctx = Context {
            schema: graph,
            syntax: &GO,
            patterns: &patterns,
            options: &options,
        };
        let mut out = String::new();
        let record = graph.record(record).unwrap();
        synthesize(&ctx, &mut out, record, "ctx", is_root)?;
        Ok(out)
    }

    fn single(ty: TypeDescriptor, raw_tag: &str) -> SchemaGraph {
        SchemaGraph::from_records([
            RecordType::new("R", vec![Field::new("F", ty).with_tag(tag(raw_tag))]),
            RecordType::new(
                "Child",
                vec![Field::new("K", TypeDescriptor::Nullable(NullableKind::String))],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn root_has_no_short_circuit() {
        let graph = single(TypeDescriptor::Nullable(NullableKind::String), r#"json:"f""#);
        let root = run(&graph, "R", true).unwrap();
        let child = run(&graph, "R", false).unwrap();
        assert!(!root.contains("if !val.IsSet()"));
        assert!(child.starts_with("\nfunc (val *R) validate() error {\n\tif !val.IsSet() {\n\t\treturn nil\n\t}\n"));
    }

    #[test]
    fn nullable_string_rules() {
        let graph = single(
            TypeDescriptor::Nullable(NullableKind::String),
            r#"json:"f" validate:"required,maxLength=1024,pattern=patternNoDot,enum=enumOutcome""#,
        );
        let out = run(&graph, "R", true).unwrap();
        assert!(out.contains("\tif !val.F.IsSet() {\n\t\treturn fmt.Errorf(\"'f' required\")\n\t}\n"));
        assert!(out.contains("if utf8.RuneCountInString(val.F.Val) > 1024 {"));
        assert!(out.contains("validation rule 'maxLength(1024)' violated"));
        assert!(out.contains("!patternNoDotRegexp.MatchString(val.F.Val)"));
        assert!(out.contains("for _, s := range enumOutcome {"));
    }

    #[test]
    fn float_reuses_int_rules() {
        let int = single(TypeDescriptor::Nullable(NullableKind::Int), r#"json:"f" validate:"min=0,max=100""#);
        let float = single(TypeDescriptor::Nullable(NullableKind::Float), r#"json:"f" validate:"min=0,max=100""#);
        assert_eq!(run(&int, "R", true).unwrap(), run(&float, "R", true).unwrap());
        assert!(run(&int, "R", true)
            .unwrap()
            .contains("\tif val.F.IsSet() && val.F.Val < 0 {\n"));
    }

    #[test]
    fn string_rule_on_number_is_unsupported() {
        let graph = single(TypeDescriptor::Nullable(NullableKind::Int), r#"json:"f" validate:"maxLength=3""#);
        let err = run(&graph, "R", true).unwrap_err();
        assert_eq!(
            err,
            CodegenError::UnsupportedRule {
                key: "ctx.f".into(),
                rule: "maxLength".into(),
                descriptor: "nullable.Int".into(),
            }
        );
    }

    #[test]
    fn interface_rules_render_type_switch() {
        let graph = single(
            TypeDescriptor::Nullable(NullableKind::Interface),
            r#"json:"f" validate:"maxLength=1024,inputTypes=string;int""#,
        );
        let out = run(&graph, "R", true).unwrap();
        assert!(out.contains("\tif val.F.IsSet() {\n\t\tswitch t := val.F.Val.(type) {\n"), "{out}");
        assert!(out.contains("validation rule 'inputTypes(string;int)' violated"));
    }

    #[test]
    fn interface_length_without_string_type_rejected() {
        let graph = single(
            TypeDescriptor::Nullable(NullableKind::Interface),
            r#"json:"f" validate:"maxLength=10,inputTypes=bool""#,
        );
        assert!(matches!(
            run(&graph, "R", true),
            Err(CodegenError::InvalidRuleValue { .. })
        ));
    }

    #[test]
    fn custom_sequence_recurses_into_elements() {
        let graph = single(
            TypeDescriptor::sequence_of(TypeDescriptor::record("Child")),
            r#"json:"children" validate:"required""#,
        );
        let out = run(&graph, "R", true).unwrap();
        assert!(out.contains("\tif len(val.F) == 0 {\n\t\treturn fmt.Errorf(\"'children' required\")\n"));
        assert!(out.contains("\t\tif err := elem.validate(); err != nil {\n\t\t\treturn errors.Wrapf(err, \"children\")\n"));
    }

    #[test]
    fn string_sequence_checks_elements() {
        let graph = single(
            TypeDescriptor::sequence_of(TypeDescriptor::primitive("string")),
            r#"json:"tags" validate:"maxLength=10""#,
        );
        let out = run(&graph, "R", true).unwrap();
        assert!(out.contains("\tfor _, elem := range val.F {\n\t\tif utf8.RuneCountInString(elem) > 10 {\n"));
    }

    #[test]
    fn element_rule_on_custom_sequence_unsupported() {
        let graph = single(
            TypeDescriptor::sequence_of(TypeDescriptor::record("Child")),
            r#"json:"children" validate:"maxLength=10""#,
        );
        assert!(matches!(run(&graph, "R", true), Err(CodegenError::UnsupportedRule { .. })));
    }

    #[test]
    fn mapping_rules() {
        let graph = single(
            TypeDescriptor::mapping_of(TypeDescriptor::primitive("interface{}")),
            r#"json:"labels" validate:"patternKeys=patternNoDot,inputTypesVals=string;bool,maxLengthVals=1024""#,
        );
        let out = run(&graph, "R", true).unwrap();
        assert!(out.contains("\tfor k, v := range val.F {\n"), "{out}");
        assert!(out.contains("!patternNoDotRegexp.MatchString(k)"));
        assert!(out.contains("switch t := v.(type) {"));
        assert!(out.contains("validation rule 'maxLengthVals(1024)' violated"));
    }

    #[test]
    fn mapping_of_records_recurses() {
        let graph = single(
            TypeDescriptor::mapping_of(TypeDescriptor::record("Child")),
            r#"json:"by_name""#,
        );
        let out = run(&graph, "R", true).unwrap();
        assert!(out.contains("\tfor _, elem := range val.F {\n"));
    }

    #[test]
    fn unknown_pattern_rejected() {
        let graph = single(
            TypeDescriptor::Nullable(NullableKind::String),
            r#"json:"f" validate:"pattern=patternMissing""#,
        );
        assert_eq!(
            run(&graph, "R", true).unwrap_err(),
            CodegenError::UnknownPattern {
                key: "ctx.f".into(),
                pattern: "patternMissing".into()
            }
        );
    }

    #[test]
    fn nested_record_required_then_recursion() {
        let graph = single(TypeDescriptor::record("Child"), r#"json:"child" validate:"required""#);
        let out = run(&graph, "R", true).unwrap();
        let required = out.find("if !val.F.IsSet() {").unwrap();
        let recurse = out.find("if err := val.F.validate(); err != nil {").unwrap();
        assert!(required < recurse);
    }

    #[test]
    fn sentinel_struct_level_rules() {
        let graph = SchemaGraph::from_records([RecordType::new(
            "Page",
            vec![
                Field::new("URL", TypeDescriptor::Nullable(NullableKind::String)).with_tag(tag(r#"json:"url""#)),
                Field::new("Refs", TypeDescriptor::sequence_of(TypeDescriptor::primitive("string")))
                    .with_tag(tag(r#"json:"refs""#)),
                Field::new("Title", TypeDescriptor::Nullable(NullableKind::String)).with_tag(tag(r#"json:"title""#)),
                Field::sentinel(tag(r#"json:"-" validate:"requiredAnyOf=url;refs,requiredIfAny=title;url;refs""#)),
            ],
        )])
        .unwrap();
        let out = run(&graph, "Page", true).unwrap();
        assert!(out.contains(
            "\tif !val.URL.IsSet() && len(val.Refs) == 0 {\n\t\treturn fmt.Errorf(\"requires at least one of the fields 'url;refs'\")\n"
        ));
        assert!(out.contains("\tif !val.Title.IsSet() {\n\t\tif val.URL.IsSet() || len(val.Refs) > 0 {\n"));
        assert!(out.contains("'title' required when one of the fields 'url;refs' is present"));
    }

    #[test]
    fn struct_level_labels_ignore_list_spacing() {
        let graph = SchemaGraph::from_records([RecordType::new(
            "Page",
            vec![
                Field::new("URL", TypeDescriptor::Nullable(NullableKind::String)).with_tag(tag(r#"json:"url""#)),
                Field::new("Refs", TypeDescriptor::sequence_of(TypeDescriptor::primitive("string")))
                    .with_tag(tag(r#"json:"refs""#)),
                Field::new("Title", TypeDescriptor::Nullable(NullableKind::String)).with_tag(tag(r#"json:"title""#)),
                Field::sentinel(tag(r#"json:"-" validate:"requiredAnyOf=url; refs,requiredIfAny=title; url ;refs""#)),
            ],
        )])
        .unwrap();
        let out = run(&graph, "Page", true).unwrap();
        assert!(out.contains("requires at least one of the fields 'url;refs'"), "{out}");
        assert!(out.contains("'title' required when one of the fields 'url;refs' is present"), "{out}");
    }

    #[test]
    fn sentinel_unknown_sibling_rejected() {
        let graph = SchemaGraph::from_records([RecordType::new(
            "Page",
            vec![
                Field::new("URL", TypeDescriptor::Nullable(NullableKind::String)).with_tag(tag(r#"json:"url""#)),
                Field::sentinel(tag(r#"json:"-" validate:"requiredAnyOf=url;path""#)),
            ],
        )])
        .unwrap();
        assert_eq!(
            run(&graph, "Page", true).unwrap_err(),
            CodegenError::UnknownSibling {
                key: "ctx".into(),
                rule: "requiredAnyOf".into(),
                field: "path".into()
            }
        );
    }

    #[test]
    fn unexported_fields_are_skipped() {
        let graph = SchemaGraph::from_records([RecordType::new(
            "R",
            vec![
                Field::new("Name", TypeDescriptor::Nullable(NullableKind::String)),
                Field::new("handler", TypeDescriptor::primitive("func()")),
            ],
        )])
        .unwrap();
        assert!(run(&graph, "R", true).is_ok());
    }

    #[test]
    fn primitive_field_unsupported_with_flattened_key() {
        let graph = SchemaGraph::from_records([RecordType::new(
            "R",
            vec![Field::new("Handler", TypeDescriptor::primitive("func()"))],
        )])
        .unwrap();
        assert_eq!(
            run(&graph, "R", true).unwrap_err(),
            CodegenError::UnsupportedFieldType {
                key: "ctx.handler".into(),
                descriptor: "func()".into(),
                method: Method::Validate,
            }
        );
    }

    #[test]
    fn embedded_exclusion_policy() {
        let sentinel = Field::sentinel(tag(r#"json:"-""#));
        assert!(participates(&sentinel, EmbeddedExclusion::Include));
        assert!(!participates(&sentinel, EmbeddedExclusion::Skip));
        let named = Field::new("base", TypeDescriptor::record("Base")).embedded();
        assert!(participates(&named, EmbeddedExclusion::Skip));
        let hidden = Field::new("cache", TypeDescriptor::record("Cache"));
        assert!(!participates(&hidden, EmbeddedExclusion::Include));
    }
}
