//! Parsing of `validate` tag entries (`rule` or `rule=value`) and their values.

use mdgen_core::{Field, PatternPool};

use crate::error::CodegenError;
use crate::syntax::InputType;

/// One `rule[=value]` entry of a `validate` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rule<'t> {
    pub name: &'t str,
    pub value: Option<&'t str>,
}

impl Rule<'_> {
    /// Label used in violation messages: `maxLength(1024)`, `required`.
    pub fn label(&self) -> String {
        match self.value {
            Some(value) => format!("{}({value})", self.name),
            None => self.name.to_string(),
        }
    }
}

/// Validation rules of one field, bound to the field's flattened key for
/// error reporting.
pub(crate) struct FieldRules<'f> {
    pub field: &'f Field,
    pub key: String,
    pub rules: Vec<Rule<'f>>,
}

impl<'f> FieldRules<'f> {
    /// Parse the rules of `field`.
    ///
    /// # Errors
    ///
    /// A rule named twice is rejected with [`CodegenError::InvalidRuleValue`].
    pub fn parse(field: &'f Field, key: String) -> Result<Self, CodegenError> {
        let mut rules: Vec<Rule<'f>> = Vec::new();
        for entry in field.tag.validation_rules() {
            let (name, value) = match entry.split_once('=') {
                Some((name, value)) => (name.trim(), Some(value.trim())),
                None => (entry, None),
            };
            if rules.iter().any(|r| r.name == name) {
                return Err(CodegenError::InvalidRuleValue {
                    key,
                    rule: name.to_string(),
                    value: value.unwrap_or_default().to_string(),
                    reason: "rule declared more than once".to_string(),
                });
            }
            rules.push(Rule { name, value });
        }
        Ok(Self { field, key, rules })
    }

    /// Rule does not apply to this field's shape.
    pub fn unsupported(&self, rule: &Rule<'_>) -> CodegenError {
        CodegenError::UnsupportedRule {
            key: self.key.clone(),
            rule: rule.name.to_string(),
            descriptor: self.field.ty.to_string(),
        }
    }

    /// Rule value is unusable.
    pub fn invalid(&self, rule: &Rule<'_>, reason: impl Into<String>) -> CodegenError {
        CodegenError::InvalidRuleValue {
            key: self.key.clone(),
            rule: rule.name.to_string(),
            value: rule.value.unwrap_or_default().to_string(),
            reason: reason.into(),
        }
    }

    /// Value of a rule that requires one.
    pub fn value<'r>(&self, rule: &Rule<'r>) -> Result<&'r str, CodegenError> {
        match rule.value {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(self.invalid(rule, "missing value")),
        }
    }

    /// Flag rules (`required`) take no value.
    pub fn flag(&self, rule: &Rule<'_>) -> Result<(), CodegenError> {
        match rule.value {
            None => Ok(()),
            Some(_) => Err(self.invalid(rule, "rule takes no value")),
        }
    }

    /// Non-negative length limit.
    pub fn limit(&self, rule: &Rule<'_>) -> Result<u64, CodegenError> {
        self.value(rule)?
            .parse()
            .map_err(|_| self.invalid(rule, "expected a non-negative integer"))
    }

    /// Numeric literal, passed through verbatim.
    pub fn number<'r>(&self, rule: &Rule<'r>) -> Result<&'r str, CodegenError> {
        let value = self.value(rule)?;
        match value.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(value),
            _ => Err(self.invalid(rule, "expected a number")),
        }
    }

    /// Identifier of a variable in the generated package.
    pub fn identifier<'r>(&self, rule: &Rule<'r>) -> Result<&'r str, CodegenError> {
        let value = self.value(rule)?;
        let mut chars = value.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_');
        if valid_start && chars.all(|c| c.is_alphanumeric() || c == '_') {
            Ok(value)
        } else {
            Err(self.invalid(rule, "expected an identifier"))
        }
    }

    /// Pattern variable declared in the pool.
    pub fn pattern<'r>(&self, rule: &Rule<'r>, patterns: &PatternPool) -> Result<&'r str, CodegenError> {
        let name = self.identifier(rule)?;
        if patterns.contains(name) {
            Ok(name)
        } else {
            Err(CodegenError::UnknownPattern {
                key: self.key.clone(),
                pattern: name.to_string(),
            })
        }
    }

    /// `;`-separated list.
    pub fn list<'r>(&self, rule: &Rule<'r>) -> Result<Vec<&'r str>, CodegenError> {
        let items: Vec<&str> = self
            .value(rule)?
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            return Err(self.invalid(rule, "expected a ';'-separated list"));
        }
        Ok(items)
    }

    /// `;`-separated list of dynamic payload types, deduplicated and sorted.
    pub fn input_types(&self, rule: &Rule<'_>) -> Result<Vec<InputType>, CodegenError> {
        let mut types = self
            .list(rule)?
            .into_iter()
            .map(|name| {
                InputType::from_tag(name)
                    .ok_or_else(|| self.invalid(rule, format!("unknown input type '{name}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        types.sort();
        types.dedup();
        Ok(types)
    }
}
