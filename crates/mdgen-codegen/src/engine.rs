//! # Traversal and Dedup Engine
//!
//! [`CodeGenerator`] resolves the root records up front, then walks the
//! schema graph depth-first from each root in order. Every record reached
//! through a field (directly, or as the element of a sequence or mapping) is
//! synthesized exactly once: the visited set is created per run, so shared
//! and cyclic references terminate and separate runs never influence each
//! other.
//!
//! The key path carried along the walk is diagnostic only. A record reached
//! under several parents reports errors with the first path that reached it.

use std::collections::{BTreeSet, HashSet};
use std::convert::Infallible;

use mdgen_core::{GeneratorOptions, PatternPool, RecordType, SchemaLookup};

use crate::classify::nested_record;
use crate::emit::Emitter;
use crate::error::CodegenError;
use crate::syntax::{TargetSyntax, GO};
use crate::{presence, reset, validation};

/// Read-only inputs shared by the synthesizers during one run.
pub(crate) struct Context<'a, L: ?Sized> {
    pub schema: &'a L,
    pub syntax: &'a dyn TargetSyntax,
    pub patterns: &'a PatternPool,
    pub options: &'a GeneratorOptions,
}

/// Generator for one package: a schema, its resolved roots, and run options.
///
/// # Example
///
/// ```
/// use mdgen_codegen::CodeGenerator;
/// use mdgen_core::{Field, NullableKind, RecordType, SchemaGraph, TypeDescriptor};
///
/// let graph = SchemaGraph::from_records([RecordType::new(
///     "Service",
///     vec![Field::new("Name", TypeDescriptor::Nullable(NullableKind::String))],
/// )])
/// .unwrap();
/// let code = CodeGenerator::new(&graph, &["Service"], "model")
///     .unwrap()
///     .generate()
///     .unwrap();
/// assert!(code.contains("func (val *Service) IsSet() bool"));
/// ```
pub struct CodeGenerator<'a, L: SchemaLookup + ?Sized> {
    schema: &'a L,
    roots: Vec<&'a RecordType>,
    root_names: BTreeSet<&'a str>,
    package: String,
    patterns: PatternPool,
    options: GeneratorOptions,
    syntax: &'a dyn TargetSyntax,
}

impl<'a, L: SchemaLookup + ?Sized> CodeGenerator<'a, L> {
    /// Resolve `roots` in `schema`.
    ///
    /// # Errors
    ///
    /// [`CodegenError::UnknownRootType`] naming the first root that does not
    /// resolve.
    pub fn new<S: AsRef<str>>(schema: &'a L, roots: &[S], package: impl Into<String>) -> Result<Self, CodegenError> {
        let roots = roots
            .iter()
            .map(|name| {
                let name = name.as_ref();
                schema
                    .record(name)
                    .ok_or_else(|| CodegenError::UnknownRootType(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let root_names = roots.iter().map(|r| r.name.as_str()).collect();
        Ok(Self {
            schema,
            roots,
            root_names,
            package: package.into(),
            patterns: PatternPool::new(),
            options: GeneratorOptions::default(),
            syntax: &GO,
        })
    }

    /// Pattern variables declared in the header.
    pub fn with_patterns(mut self, patterns: PatternPool) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Render with a different target syntax.
    pub fn with_syntax(mut self, syntax: &'a dyn TargetSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Produce the complete generated file.
    ///
    /// # Errors
    ///
    /// The first [`CodegenError`] raised by any synthesizer. No partial
    /// output is returned.
    pub fn generate(&self) -> Result<String, CodegenError> {
        let ctx = Context {
            schema: self.schema,
            syntax: self.syntax,
            patterns: &self.patterns,
            options: &self.options,
        };
        let mut emitter = Emitter::with_header(
            self.syntax,
            &self.options.generator_name,
            &self.package,
            &self.patterns,
        )?;
        self.walk(|record, key| {
            let is_root = self.root_names.contains(record.name.as_str());
            let mut block = String::new();
            presence::synthesize(&ctx, &mut block, record, key)?;
            reset::synthesize(&ctx, &mut block, record, key)?;
            validation::synthesize(&ctx, &mut block, record, key, is_root)?;
            emitter.push_record(&block);
            tracing::debug!(record = %record.name, key, is_root, "synthesized record methods");
            Ok::<_, CodegenError>(())
        })?;
        tracing::info!(
            package = %self.package,
            records = emitter.records(),
            "generated model methods"
        );
        Ok(emitter.finish())
    }

    /// Names of every record a run would synthesize, in visitation order.
    pub fn reachable(&self) -> Vec<String> {
        let mut names = Vec::new();
        let walked = self.walk(|record, _| {
            names.push(record.name.clone());
            Ok::<_, Infallible>(())
        });
        match walked {
            Ok(()) => names,
            Err(never) => match never {},
        }
    }

    /// Depth-first walk from each root, calling `visit` once per distinct
    /// record. Children are taken in field order, so the explicit stack
    /// reproduces recursive visitation order.
    fn walk<E>(&self, mut visit: impl FnMut(&'a RecordType, &str) -> Result<(), E>) -> Result<(), E> {
        let mut visited: HashSet<&'a str> = HashSet::new();
        for &root in &self.roots {
            let mut stack = vec![(root, String::new())];
            while let Some((record, key)) = stack.pop() {
                if !visited.insert(record.name.as_str()) {
                    tracing::trace!(record = %record.name, key = %key, "already synthesized");
                    continue;
                }
                visit(record, &key)?;
                for field in record.fields.iter().rev() {
                    if let Some(child) = nested_record(&field.ty, self.schema) {
                        stack.push((child, field.flattened_key(&key)));
                    }
                }
            }
        }
        Ok(())
    }
}
