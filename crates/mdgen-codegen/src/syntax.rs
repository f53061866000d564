//! # Target Syntax
//!
//! Every literal template of the generated language lives behind
//! [`TargetSyntax`]. Traversal and rule selection decide *what* to emit and
//! call into this trait with plain names and limits; the implementation
//! decides *how* it is spelled. [`GoSyntax`] renders Go methods on pointer
//! receivers.
//!
//! Methods append to the output buffer and never read it back.

use std::fmt::{self, Write};

/// How a field reports non-default state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Containers: non-empty length.
    Len,
    /// Records and nullable wrappers: their own presence check.
    Call,
}

/// Direction of a numeric or length bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Value must not be below the limit.
    Min,
    /// Value must not exceed the limit.
    Max,
}

/// Dynamic payload types accepted by `inputTypes` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InputType {
    /// A string.
    String,
    /// An integral number.
    Int,
    /// Any number.
    Float64,
    /// A boolean.
    Bool,
    /// A string-keyed object.
    Object,
}

impl InputType {
    /// Parse the name used in tags.
    pub fn from_tag(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "float64" => Some(Self::Float64),
            "bool" => Some(Self::Bool),
            "object" => Some(Self::Object),
            _ => None,
        }
    }
}

/// A check on a string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringCheck<'a> {
    /// Rune count bound.
    Length {
        /// Direction.
        bound: Bound,
        /// Limit in runes.
        limit: u64,
        /// Rule label used in the violation message.
        label: String,
    },
    /// Non-empty values must match a compiled pattern variable.
    Pattern {
        /// Pattern variable name.
        pattern: &'a str,
        /// Rule label.
        label: String,
    },
    /// Value must be one of the entries of an enumeration variable.
    Enum {
        /// Enumeration variable name.
        variable: &'a str,
        /// Rule label.
        label: String,
    },
}

/// A check on a numeric value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberCheck<'a> {
    /// Direction.
    pub bound: Bound,
    /// Numeric literal as written in the tag.
    pub literal: &'a str,
    /// Rule label.
    pub label: String,
}

/// Checks on a dynamically typed value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicCheck {
    /// Maximum rune count for string payloads, with its label.
    pub max_length: Option<(u64, String)>,
    /// Accepted payload types, with its label.
    pub input_types: Option<(Vec<InputType>, String)>,
}

impl DynamicCheck {
    /// Returns true if nothing would be emitted.
    pub fn is_empty(&self) -> bool {
        self.max_length.is_none() && self.input_types.is_none()
    }
}

/// Checks on mapping values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueChecks<'a> {
    /// No value checks.
    None,
    /// String values.
    String(Vec<StringCheck<'a>>),
    /// Dynamically typed values.
    Dynamic(DynamicCheck),
}

/// Checks on the entries of a primitive-valued mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapCheck<'a> {
    /// Non-empty keys must match this pattern variable, with its label.
    pub pattern_keys: Option<(&'a str, String)>,
    /// Value checks.
    pub values: ValueChecks<'a>,
}

/// A sibling field referenced by a struct-level rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sibling<'a> {
    /// Identifier in generated code.
    pub field: &'a str,
    /// How the sibling reports presence.
    pub presence: Presence,
}

/// Literal templates of a target language.
pub trait TargetSyntax {
    /// Package declaration, fixed imports, and one compiled variable per
    /// pattern name (names arrive sorted).
    fn header(
        &self,
        out: &mut String,
        generator: &str,
        package: &str,
        patterns: &[&str],
    ) -> fmt::Result;

    /// Opens the presence check of `record`.
    fn presence_open(&self, out: &mut String, record: &str) -> fmt::Result;
    /// One OR-ed term of the presence check.
    fn presence_term(&self, out: &mut String, first: bool, field: &str, presence: Presence) -> fmt::Result;
    /// Closes the presence check.
    fn presence_close(&self, out: &mut String) -> fmt::Result;

    /// Opens the reset of `record`.
    fn reset_open(&self, out: &mut String, record: &str) -> fmt::Result;
    /// Resets every element of a sequence of records in place.
    fn reset_elements(&self, out: &mut String, field: &str) -> fmt::Result;
    /// Truncates a sequence to zero length, keeping its capacity.
    fn reset_truncate(&self, out: &mut String, field: &str) -> fmt::Result;
    /// Removes every key of a mapping in place.
    fn reset_drain(&self, out: &mut String, field: &str) -> fmt::Result;
    /// Delegates to the field's own reset.
    fn reset_delegate(&self, out: &mut String, field: &str) -> fmt::Result;
    /// Closes the reset.
    fn reset_close(&self, out: &mut String) -> fmt::Result;

    /// Opens the validator of `record`.
    fn validate_open(&self, out: &mut String, record: &str) -> fmt::Result;
    /// Absent value is valid: return success when the presence check fails.
    fn validate_short_circuit(&self, out: &mut String) -> fmt::Result;
    /// Closes the validator with success.
    fn validate_close(&self, out: &mut String) -> fmt::Result;

    /// Field must be present.
    fn required(&self, out: &mut String, field: &str, name: &str, presence: Presence) -> fmt::Result;
    /// Checks on a set nullable string.
    fn nullable_string(&self, out: &mut String, field: &str, name: &str, checks: &[StringCheck<'_>]) -> fmt::Result;
    /// Checks on a set nullable number.
    fn nullable_number(&self, out: &mut String, field: &str, name: &str, checks: &[NumberCheck<'_>]) -> fmt::Result;
    /// Checks on a set nullable dynamic value.
    fn nullable_dynamic(&self, out: &mut String, field: &str, name: &str, check: &DynamicCheck) -> fmt::Result;
    /// Recurse into the validator of every element of a container of records.
    fn element_validate(&self, out: &mut String, field: &str, name: &str) -> fmt::Result;
    /// Checks on every string element of a sequence.
    fn string_elements(&self, out: &mut String, field: &str, name: &str, checks: &[StringCheck<'_>]) -> fmt::Result;
    /// Checks on every entry of a primitive-valued mapping.
    fn map_entries(&self, out: &mut String, field: &str, name: &str, check: &MapCheck<'_>) -> fmt::Result;
    /// Recurse into the validator of a nested record.
    fn record_validate(&self, out: &mut String, field: &str, name: &str) -> fmt::Result;
    /// At least one of `siblings` must be present.
    fn required_any_of(&self, out: &mut String, siblings: &[Sibling<'_>], label: &str) -> fmt::Result;
    /// `target` must be present when any of `others` is.
    fn required_if_any(
        &self,
        out: &mut String,
        target: Sibling<'_>,
        target_name: &str,
        others: &[Sibling<'_>],
        label: &str,
    ) -> fmt::Result;
}

/// Go rendering: methods on pointer receivers named `val`, errors built with
/// `fmt.Errorf` and wrapped with `errors.Wrapf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoSyntax;

/// Shared instance used when no syntax is configured.
pub static GO: GoSyntax = GoSyntax;

/// Go interpreted string literal.
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Go format string literal with `%` escaped.
fn format_literal(s: &str) -> String {
    quote(&s.replace('%', "%%"))
}

fn violated(name: &str, label: &str) -> String {
    format!(
        "fmt.Errorf({})",
        format_literal(&format!("'{name}': validation rule '{label}' violated"))
    )
}

fn absent(field: &str, presence: Presence) -> String {
    match presence {
        Presence::Len => format!("len(val.{field}) == 0"),
        Presence::Call => format!("!val.{field}.IsSet()"),
    }
}

fn present(field: &str, presence: Presence) -> String {
    match presence {
        Presence::Len => format!("len(val.{field}) > 0"),
        Presence::Call => format!("val.{field}.IsSet()"),
    }
}

impl GoSyntax {
    fn string_check(out: &mut String, indent: &str, subject: &str, name: &str, check: &StringCheck<'_>) -> fmt::Result {
        match check {
            StringCheck::Length { bound, limit, label } => {
                let op = match bound {
                    Bound::Min => "<",
                    Bound::Max => ">",
                };
                writeln!(out, "{indent}if utf8.RuneCountInString({subject}) {op} {limit} {{")?;
                writeln!(out, "{indent}\treturn {}", violated(name, label))?;
                writeln!(out, "{indent}}}")
            }
            StringCheck::Pattern { pattern, label } => {
                writeln!(
                    out,
                    "{indent}if {subject} != \"\" && !{pattern}Regexp.MatchString({subject}) {{"
                )?;
                writeln!(out, "{indent}\treturn {}", violated(name, label))?;
                writeln!(out, "{indent}}}")
            }
            StringCheck::Enum { variable, label } => {
                writeln!(out, "{indent}var matchEnum bool")?;
                writeln!(out, "{indent}for _, s := range {variable} {{")?;
                writeln!(out, "{indent}\tif {subject} == s {{")?;
                writeln!(out, "{indent}\t\tmatchEnum = true")?;
                writeln!(out, "{indent}\t\tbreak")?;
                writeln!(out, "{indent}\t}}")?;
                writeln!(out, "{indent}}}")?;
                writeln!(out, "{indent}if !matchEnum {{")?;
                writeln!(out, "{indent}\treturn {}", violated(name, label))?;
                writeln!(out, "{indent}}}")
            }
        }
    }

    fn dynamic_check(out: &mut String, indent: &str, subject: &str, name: &str, check: &DynamicCheck) -> fmt::Result {
        let Some((types, types_label)) = &check.input_types else {
            if let Some((limit, label)) = &check.max_length {
                writeln!(
                    out,
                    "{indent}if s, ok := {subject}.(string); ok && utf8.RuneCountInString(s) > {limit} {{"
                )?;
                writeln!(out, "{indent}\treturn {}", violated(name, label))?;
                writeln!(out, "{indent}}}")?;
            }
            return Ok(());
        };
        let accepts = |t: InputType| types.contains(&t);
        let number = if accepts(InputType::Float64) {
            Some("Float64")
        } else if accepts(InputType::Int) {
            Some("Int64")
        } else {
            None
        };
        let string_limit = check.max_length.as_ref().filter(|_| accepts(InputType::String));
        if number.is_some() || string_limit.is_some() {
            writeln!(out, "{indent}switch t := {subject}.(type) {{")?;
        } else {
            writeln!(out, "{indent}switch {subject}.(type) {{")?;
        }
        if accepts(InputType::String) {
            writeln!(out, "{indent}case string:")?;
            if let Some((limit, label)) = string_limit {
                writeln!(out, "{indent}\tif utf8.RuneCountInString(t) > {limit} {{")?;
                writeln!(out, "{indent}\t\treturn {}", violated(name, label))?;
                writeln!(out, "{indent}\t}}")?;
            }
        }
        if let Some(conversion) = number {
            writeln!(out, "{indent}case json.Number:")?;
            writeln!(out, "{indent}\tif _, err := t.{conversion}(); err != nil {{")?;
            writeln!(out, "{indent}\t\treturn {}", violated(name, types_label))?;
            writeln!(out, "{indent}\t}}")?;
        }
        if accepts(InputType::Bool) {
            writeln!(out, "{indent}case bool:")?;
        }
        if accepts(InputType::Object) {
            writeln!(out, "{indent}case map[string]interface{{}}:")?;
        }
        writeln!(out, "{indent}default:")?;
        writeln!(out, "{indent}\treturn {}", violated(name, types_label))?;
        writeln!(out, "{indent}}}")
    }
}

impl TargetSyntax for GoSyntax {
    fn header(&self, out: &mut String, generator: &str, package: &str, patterns: &[&str]) -> fmt::Result {
        writeln!(out, "// Code generated by {}. DO NOT EDIT.", quote(generator))?;
        writeln!(out)?;
        writeln!(out, "package {package}")?;
        writeln!(out)?;
        writeln!(out, "import (")?;
        writeln!(out, "\t\"encoding/json\"")?;
        writeln!(out, "\t\"fmt\"")?;
        writeln!(out, "\t\"regexp\"")?;
        writeln!(out, "\t\"unicode/utf8\"")?;
        writeln!(out)?;
        writeln!(out, "\t\"github.com/pkg/errors\"")?;
        writeln!(out, ")")?;
        writeln!(out)?;
        writeln!(out, "var (")?;
        for name in patterns {
            writeln!(out, "\t{name}Regexp = regexp.MustCompile({name})")?;
        }
        writeln!(out, ")")
    }

    fn presence_open(&self, out: &mut String, record: &str) -> fmt::Result {
        writeln!(out)?;
        writeln!(out, "func (val *{record}) IsSet() bool {{")?;
        write!(out, "\treturn")
    }

    fn presence_term(&self, out: &mut String, first: bool, field: &str, presence: Presence) -> fmt::Result {
        let separator = if first { " " } else { " || " };
        write!(out, "{separator}{}", present(field, presence))
    }

    fn presence_close(&self, out: &mut String) -> fmt::Result {
        writeln!(out)?;
        writeln!(out, "}}")
    }

    fn reset_open(&self, out: &mut String, record: &str) -> fmt::Result {
        writeln!(out)?;
        writeln!(out, "func (val *{record}) Reset() {{")
    }

    fn reset_elements(&self, out: &mut String, field: &str) -> fmt::Result {
        writeln!(out, "\tfor i := range val.{field} {{")?;
        writeln!(out, "\t\tval.{field}[i].Reset()")?;
        writeln!(out, "\t}}")
    }

    fn reset_truncate(&self, out: &mut String, field: &str) -> fmt::Result {
        writeln!(out, "\tval.{field} = val.{field}[:0]")
    }

    fn reset_drain(&self, out: &mut String, field: &str) -> fmt::Result {
        writeln!(out, "\tfor k := range val.{field} {{")?;
        writeln!(out, "\t\tdelete(val.{field}, k)")?;
        writeln!(out, "\t}}")
    }

    fn reset_delegate(&self, out: &mut String, field: &str) -> fmt::Result {
        writeln!(out, "\tval.{field}.Reset()")
    }

    fn reset_close(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "}}")
    }

    fn validate_open(&self, out: &mut String, record: &str) -> fmt::Result {
        writeln!(out)?;
        writeln!(out, "func (val *{record}) validate() error {{")
    }

    fn validate_short_circuit(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "\tif !val.IsSet() {{")?;
        writeln!(out, "\t\treturn nil")?;
        writeln!(out, "\t}}")
    }

    fn validate_close(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "\treturn nil")?;
        writeln!(out, "}}")
    }

    fn required(&self, out: &mut String, field: &str, name: &str, presence: Presence) -> fmt::Result {
        writeln!(out, "\tif {} {{", absent(field, presence))?;
        writeln!(
            out,
            "\t\treturn fmt.Errorf({})",
            format_literal(&format!("'{name}' required"))
        )?;
        writeln!(out, "\t}}")
    }

    fn nullable_string(&self, out: &mut String, field: &str, name: &str, checks: &[StringCheck<'_>]) -> fmt::Result {
        writeln!(out, "\tif val.{field}.IsSet() {{")?;
        let subject = format!("val.{field}.Val");
        for check in checks {
            Self::string_check(out, "\t\t", &subject, name, check)?;
        }
        writeln!(out, "\t}}")
    }

    fn nullable_number(&self, out: &mut String, field: &str, name: &str, checks: &[NumberCheck<'_>]) -> fmt::Result {
        for check in checks {
            let op = match check.bound {
                Bound::Min => "<",
                Bound::Max => ">",
            };
            writeln!(
                out,
                "\tif val.{field}.IsSet() && val.{field}.Val {op} {} {{",
                check.literal
            )?;
            writeln!(out, "\t\treturn {}", violated(name, &check.label))?;
            writeln!(out, "\t}}")?;
        }
        Ok(())
    }

    fn nullable_dynamic(&self, out: &mut String, field: &str, name: &str, check: &DynamicCheck) -> fmt::Result {
        writeln!(out, "\tif val.{field}.IsSet() {{")?;
        Self::dynamic_check(out, "\t\t", &format!("val.{field}.Val"), name, check)?;
        writeln!(out, "\t}}")
    }

    fn element_validate(&self, out: &mut String, field: &str, name: &str) -> fmt::Result {
        writeln!(out, "\tfor _, elem := range val.{field} {{")?;
        writeln!(out, "\t\tif err := elem.validate(); err != nil {{")?;
        writeln!(out, "\t\t\treturn errors.Wrapf(err, {})", format_literal(name))?;
        writeln!(out, "\t\t}}")?;
        writeln!(out, "\t}}")
    }

    fn string_elements(&self, out: &mut String, field: &str, name: &str, checks: &[StringCheck<'_>]) -> fmt::Result {
        writeln!(out, "\tfor _, elem := range val.{field} {{")?;
        for check in checks {
            Self::string_check(out, "\t\t", "elem", name, check)?;
        }
        writeln!(out, "\t}}")
    }

    fn map_entries(&self, out: &mut String, field: &str, name: &str, check: &MapCheck<'_>) -> fmt::Result {
        let key = if check.pattern_keys.is_some() { "k" } else { "_" };
        let value = if check.values == ValueChecks::None { "_" } else { "v" };
        if value == "_" {
            writeln!(out, "\tfor {key} := range val.{field} {{")?;
        } else {
            writeln!(out, "\tfor {key}, {value} := range val.{field} {{")?;
        }
        if let Some((pattern, label)) = &check.pattern_keys {
            let pattern_check = StringCheck::Pattern {
                pattern: *pattern,
                label: label.clone(),
            };
            Self::string_check(out, "\t\t", "k", name, &pattern_check)?;
        }
        match &check.values {
            ValueChecks::None => {}
            ValueChecks::String(checks) => {
                for c in checks {
                    Self::string_check(out, "\t\t", "v", name, c)?;
                }
            }
            ValueChecks::Dynamic(dynamic) => Self::dynamic_check(out, "\t\t", "v", name, dynamic)?,
        }
        writeln!(out, "\t}}")
    }

    fn record_validate(&self, out: &mut String, field: &str, name: &str) -> fmt::Result {
        writeln!(out, "\tif err := val.{field}.validate(); err != nil {{")?;
        writeln!(out, "\t\treturn errors.Wrapf(err, {})", format_literal(name))?;
        writeln!(out, "\t}}")
    }

    fn required_any_of(&self, out: &mut String, siblings: &[Sibling<'_>], label: &str) -> fmt::Result {
        let condition = siblings
            .iter()
            .map(|s| absent(s.field, s.presence))
            .collect::<Vec<_>>()
            .join(" && ");
        writeln!(out, "\tif {condition} {{")?;
        writeln!(
            out,
            "\t\treturn fmt.Errorf({})",
            format_literal(&format!("requires at least one of the fields '{label}'"))
        )?;
        writeln!(out, "\t}}")
    }

    fn required_if_any(
        &self,
        out: &mut String,
        target: Sibling<'_>,
        target_name: &str,
        others: &[Sibling<'_>],
        label: &str,
    ) -> fmt::Result {
        let condition = others
            .iter()
            .map(|s| present(s.field, s.presence))
            .collect::<Vec<_>>()
            .join(" || ");
        writeln!(out, "\tif {} {{", absent(target.field, target.presence))?;
        writeln!(out, "\t\tif {condition} {{")?;
        writeln!(
            out,
            "\t\t\treturn fmt.Errorf({})",
            format_literal(&format!(
                "'{target_name}' required when one of the fields '{label}' is present"
            ))
        )?;
        writeln!(out, "\t\t}}")?;
        writeln!(out, "\t}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lists_patterns_in_given_order() {
        let mut out = String::new();
        GO.header(&mut out, "mdgen", "model", &["a", "b"]).unwrap();
        assert!(out.starts_with("// Code generated by \"mdgen\". DO NOT EDIT.\n\npackage model\n"));
        let a = out.find("\taRegexp = regexp.MustCompile(a)").unwrap();
        let b = out.find("\tbRegexp = regexp.MustCompile(b)").unwrap();
        assert!(a < b);
    }

    #[test]
    fn empty_pattern_block_is_still_emitted() {
        let mut out = String::new();
        GO.header(&mut out, "mdgen", "model", &[]).unwrap();
        assert!(out.ends_with("var (\n)\n"));
    }

    #[test]
    fn presence_terms_are_or_joined() {
        let mut out = String::new();
        GO.presence_open(&mut out, "Root").unwrap();
        GO.presence_term(&mut out, true, "Name", Presence::Call).unwrap();
        GO.presence_term(&mut out, false, "Tags", Presence::Len).unwrap();
        GO.presence_close(&mut out).unwrap();
        assert_eq!(
            out,
            "\nfunc (val *Root) IsSet() bool {\n\treturn val.Name.IsSet() || len(val.Tags) > 0\n}\n"
        );
    }

    #[test]
    fn messages_escape_quotes_and_percent() {
        assert_eq!(
            violated("a\"b", "max(100%)"),
            r#"fmt.Errorf("'a\"b': validation rule 'max(100%%)' violated")"#
        );
    }

    #[test]
    fn dynamic_switch_binds_only_when_used() {
        let mut out = String::new();
        let check = DynamicCheck {
            max_length: None,
            input_types: Some((vec![InputType::String, InputType::Bool], "inputTypes(string;bool)".into())),
        };
        GoSyntax::dynamic_check(&mut out, "\t", "v", "x", &check).unwrap();
        assert!(out.starts_with("\tswitch v.(type) {\n"), "{out}");
        assert!(out.contains("\tcase string:\n\tcase bool:\n\tdefault:\n"));
    }

    #[test]
    fn dynamic_switch_prefers_float_conversion() {
        let mut out = String::new();
        let check = DynamicCheck {
            max_length: Some((10, "maxLength(10)".into())),
            input_types: Some((
                vec![InputType::String, InputType::Int, InputType::Float64],
                "inputTypes(string;int;float64)".into(),
            )),
        };
        GoSyntax::dynamic_check(&mut out, "", "v", "x", &check).unwrap();
        assert!(out.starts_with("switch t := v.(type) {\n"));
        assert!(out.contains("if _, err := t.Float64(); err != nil {"));
        assert!(!out.contains("Int64"));
        assert_eq!(out.matches("case json.Number:").count(), 1);
        assert!(out.contains("\tif utf8.RuneCountInString(t) > 10 {"));
    }

    #[test]
    fn map_entries_without_value_checks_ranges_keys_only() {
        let mut out = String::new();
        let check = MapCheck {
            pattern_keys: Some(("patternNoDot", "patternKeys(patternNoDot)".into())),
            values: ValueChecks::None,
        };
        GO.map_entries(&mut out, "Labels", "labels", &check).unwrap();
        assert!(out.starts_with("\tfor k := range val.Labels {\n"), "{out}");
        assert!(out.contains("!patternNoDotRegexp.MatchString(k)"));
    }
}
