//! # Schema Warden
//!
//! Drives required-path, unknown-field, type, validation and sanitize checks
//! over one data instance, using the query engine to find values and the
//! rule collaborators to judge and rewrite them.
//!
//! ## Mutation
//!
//! The warden holds the data mutably for its whole life. Type coercion and
//! sanitization write through the [`NodePointer`]s returned by queries, so
//! later steps observe earlier rewrites. Executed queries are cached by path
//! and the cache is dropped after any step that may have rewritten data.
//!
//! ## Required Paths
//!
//! A required path whose query is not fully hit fails on the first miss that
//! belongs to it: with list indices erased (`items[2].sku` becomes
//! `items[].sku`), the miss is either the declared path itself or an
//! ancestor of it (`do` for `do.foo`). A null ancestor counts as present.
//!
//! [`NodePointer`]: warden_core::NodePointer

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use warden_core::{qualified, Node, QueryError, RuleError, SchemaError, SchemaPath};
use warden_query::{map_paths, Query, QueryMatch};
use warden_rules::{RuleEvaluator, RuleRegistry, SanitizeTransforms, TypeName};

use crate::document::SchemaDocument;
use crate::rules::{RuleSchema, TypeSchema, REQUIRED};

/// Applies schemas to one data instance.
pub struct SchemaWarden<'a> {
    data: &'a mut Node,
    name: String,
    rules: &'a dyn RuleEvaluator,
    transforms: &'a dyn SanitizeTransforms,
    cache: HashMap<String, Query>,
}

impl<'a> SchemaWarden<'a> {
    /// Bind a warden to `data` with separate rule and transform collaborators.
    pub fn new(
        data: &'a mut Node,
        name: &str,
        rules: &'a dyn RuleEvaluator,
        transforms: &'a dyn SanitizeTransforms,
    ) -> Self {
        Self {
            data,
            name: name.to_string(),
            rules,
            transforms,
            cache: HashMap::new(),
        }
    }

    /// Bind a warden to `data` using one registry for both collaborators.
    pub fn with_registry(data: &'a mut Node, name: &str, registry: &'a RuleRegistry) -> Self {
        Self::new(data, name, registry, registry)
    }

    /// The data, as rewritten so far.
    pub fn data(&self) -> &Node {
        self.data
    }

    /// Debug name used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run (or reuse) the query for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Query`] if the path does not compile or a
    /// `"[]"` segment lands on something other than a list.
    pub fn query(&mut self, path: &str) -> Result<&Query, SchemaError> {
        let compiled = SchemaPath::compile_named(path, &self.name).map_err(QueryError::from)?;
        match self.cache.entry(compiled.as_str().to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(Query::run(&compiled, self.data, &self.name)?)),
        }
    }

    fn cached(&mut self, path: &SchemaPath) -> Result<Query, QueryError> {
        if let Some(query) = self.cache.get(path.as_str()) {
            return Ok(query.clone());
        }
        let query = Query::run(path, self.data, &self.name)?;
        self.cache.insert(path.as_str().to_string(), query.clone());
        Ok(query)
    }

    fn invalidate(&mut self) {
        if !self.cache.is_empty() {
            trace!(entries = self.cache.len(), "query cache dropped");
            self.cache.clear();
        }
    }

    /// Fail if any required path is missing from the data.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::RequiredFieldMissing`] for the first missing
    /// path, naming the concrete path at which the data ran out.
    pub fn test_required(&mut self, paths: &[SchemaPath]) -> Result<(), SchemaError> {
        debug!(name = %self.name, count = paths.len(), "checking required paths");
        for path in paths {
            let query = self.cached(path)?;
            if query.has_hit_all() {
                continue;
            }
            if let Some(concrete) = query
                .missed_paths()
                .into_iter()
                .find(|missed| covers(path.as_str(), missed))
            {
                return Err(SchemaError::RequiredFieldMissing {
                    path: path.as_str().to_string(),
                    concrete: concrete.to_string(),
                    name: self.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Fail if the data holds a path outside `declared`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownField`] for the first undeclared path,
    /// in mapper order.
    pub fn test_new_schema<I, S>(&self, declared: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let declared: HashSet<String> = declared
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        debug!(name = %self.name, declared = declared.len(), "checking for unknown paths");
        match map_paths(self.data).into_iter().find(|p| !declared.contains(p)) {
            Some(path) => Err(SchemaError::UnknownField {
                name: self.name.clone(),
                path,
            }),
            None => Ok(()),
        }
    }

    /// Check, and optionally coerce, every value against its declared type.
    ///
    /// Nulls satisfy every type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaParse`] for an unrecognized type name or a
    /// path whose list segments do not fit the data, and
    /// [`SchemaError::TypeMismatch`] for a value of the wrong type.
    pub fn test_types(&mut self, schema: &TypeSchema, coerce_numerics: bool) -> Result<(), SchemaError> {
        debug!(name = %self.name, paths = schema.len(), coerce_numerics, "checking types");
        let result = self.check_types(schema, coerce_numerics);
        self.invalidate();
        result
    }

    fn check_types(&mut self, schema: &TypeSchema, coerce_numerics: bool) -> Result<(), SchemaError> {
        for (path, type_name) in schema.iter() {
            let parse_error = |reason: String| SchemaError::SchemaParse {
                path: path.as_str().to_string(),
                name: self.name.clone(),
                reason,
            };

            if !self.rules.recognized_type_name(type_name) {
                return Err(parse_error(format!("unrecognized type \"{type_name}\"")));
            }
            let query = Query::run(path, self.data, &self.name).map_err(|e| parse_error(e.to_string()))?;
            if query.has_type_mismatch() {
                return Err(parse_error(format!(
                    "data does not fit the list segments of \"{path}\""
                )));
            }

            let coercion = TypeName::parse(type_name).filter(|_| coerce_numerics);
            for pointer in query.results().iter().filter_map(QueryMatch::pointer) {
                let Some(slot) = self.data.resolve_mut(pointer) else {
                    continue;
                };
                if slot.is_null() {
                    continue;
                }
                if let Some(coerced) = coercion.and_then(|t| t.coerce(&*slot)) {
                    trace!(%pointer, from = slot.type_name(), to = coerced.type_name(), "coerced");
                    *slot = coerced;
                }
                if !slot.is_null() && !self.rules.value_matches_type(slot, type_name) {
                    return Err(SchemaError::TypeMismatch {
                        path: qualified(&self.name, path.as_str()),
                        expected: type_name.clone(),
                        actual: slot.type_name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Run every validation rule against every value its path matches.
    ///
    /// `required` is skipped; use [`SchemaWarden::test_required`]. Values
    /// missing from an object list are validated as null.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ValidationFailed`] for the first failing rule,
    /// [`SchemaError::UnknownRule`] for an unregistered rule, and
    /// [`SchemaError::Rule`] for unusable options.
    pub fn validate(&mut self, schema: &RuleSchema) -> Result<(), SchemaError> {
        debug!(name = %self.name, paths = schema.len(), "validating");
        for (path, rules) in schema.iter() {
            let query = self.cached(path)?;
            let at = qualified(&self.name, path.as_str());
            for value in query.values(self.data) {
                for (rule, spec) in rules.iter() {
                    if rule == REQUIRED {
                        continue;
                    }
                    let Some(options) = spec.validation_options() else {
                        continue;
                    };
                    match self.rules.evaluate(rule, value, &options) {
                        Ok(true) => {}
                        Ok(false) => {
                            return Err(SchemaError::ValidationFailed {
                                path: at,
                                rule: rule.to_string(),
                            })
                        }
                        Err(RuleError::UnknownRule(_)) => {
                            return Err(SchemaError::UnknownRule {
                                path: at,
                                rule: rule.to_string(),
                            })
                        }
                        Err(source) => return Err(SchemaError::Rule { path: at, source }),
                    }
                }
            }
        }
        Ok(())
    }

    /// Rewrite every value its path matches with each listed transform, in
    /// written order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SanitizeFailed`] when a rule names no known
    /// transform (checked before any value is touched) and
    /// [`SchemaError::Rule`] when a transform fails.
    pub fn sanitize(&mut self, schema: &RuleSchema) -> Result<(), SchemaError> {
        debug!(name = %self.name, paths = schema.len(), "sanitizing");
        let result = self.apply_transforms(schema);
        self.invalidate();
        result
    }

    fn apply_transforms(&mut self, schema: &RuleSchema) -> Result<(), SchemaError> {
        for (path, rules) in schema.iter() {
            let at = qualified(&self.name, path.as_str());
            let steps: Vec<(&str, _)> = rules
                .iter()
                .filter_map(|(rule, spec)| spec.sanitize_options().map(|opts| (rule, opts)))
                .collect();
            if let Some((rule, _)) = steps.iter().find(|(rule, _)| !self.transforms.has_transform(rule)) {
                return Err(SchemaError::SanitizeFailed {
                    path: at,
                    rule: rule.to_string(),
                });
            }

            let query = Query::run(path, self.data, &self.name)?;
            for pointer in query.results().iter().filter_map(QueryMatch::pointer) {
                let Some(slot) = self.data.resolve_mut(pointer) else {
                    continue;
                };
                for (rule, options) in &steps {
                    let rewritten = self
                        .transforms
                        .apply_transform(rule, slot, options)
                        .map_err(|source| SchemaError::Rule {
                            path: at.clone(),
                            source,
                        })?;
                    trace!(%pointer, rule, "transformed");
                    *slot = rewritten;
                }
            }
        }
        Ok(())
    }

    /// Run a whole document: required, unknown fields (when strict), types,
    /// validation, then sanitize. Stops at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] raised by any step.
    pub fn run(&mut self, document: &SchemaDocument) -> Result<(), SchemaError> {
        self.test_required(&document.required_paths())?;
        if document.strict {
            self.test_new_schema(document.declared_paths())?;
        }
        self.test_types(&document.types, document.coerce_numerics)?;
        self.validate(&document.validate)?;
        self.sanitize(&document.sanitize)?;
        debug!(name = %self.name, "document passed");
        Ok(())
    }

    /// Paths whose validation rules carry a truthy `required`.
    pub fn determine_required_paths(schema: &RuleSchema) -> Vec<SchemaPath> {
        schema
            .iter()
            .filter(|(_, rules)| rules.is_required())
            .map(|(path, _)| path.clone())
            .collect()
    }
}

/// True when `missed`, with list indices erased, is `declared` or an
/// ancestor of it.
fn covers(declared: &str, missed: &str) -> bool {
    let erased = erase_indices(missed);
    if erased == declared {
        return true;
    }
    match declared.strip_prefix(erased.as_str()) {
        Some(rest) => erased.ends_with('.') || rest.starts_with('.') || rest.starts_with('['),
        None => false,
    }
}

/// `a[3].b[10]` becomes `a[].b[]`.
fn erase_indices(concrete: &str) -> String {
    let mut out = String::with_capacity(concrete.len());
    let mut chars = concrete.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '[' {
            while chars.peek().is_some_and(char::is_ascii_digit) {
                chars.next();
            }
        }
    }
    out
}
