//! # Schema Documents
//!
//! A schema document bundles everything the warden needs for one kind of
//! payload into a single YAML or JSON file:
//!
//! ```yaml
//! name: order
//! strict: true
//! coerce_numerics: true
//! required: [id]
//! types:    { id: int, items[].qty: int }
//! validate: { id: { required: true, range: { lower: 1 } } }
//! sanitize: { items[].sku: { trim: true, uppercase: true } }
//! ```
//!
//! ## Loading
//!
//! Documents are checked against the bundled
//! `schemas/schema-document.schema.json` (Draft 2020-12) before they are
//! deserialized. A document that fails the check is rejected with every
//! violation listed. Deserialization then compiles every path and keeps the
//! written order of paths and rules.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use warden_core::{ConversionError, Node, SchemaPath};

use crate::rules::{RuleSchema, TypeSchema};

/// The bundled JSON Schema every document must satisfy.
pub const DOCUMENT_SCHEMA: &str = include_str!("../schemas/schema-document.schema.json");

/// Error while loading a schema document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("cannot read schema document '{path}': {source}")]
    Io {
        /// Path of the document.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The text is not well-formed YAML or JSON.
    #[error("schema document is not valid {format}: {reason}")]
    Syntax {
        /// Format the text was parsed as.
        format: DocumentFormat,
        /// Parser message.
        reason: String,
    },

    /// The YAML holds values with no JSON counterpart.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The bundled document schema could not be compiled.
    #[error("document schema could not be built: {0}")]
    SchemaBuild(String),

    /// The document does not conform to the document schema.
    #[error("schema document failed validation:\n{0}")]
    Invalid(ValidationViolations),

    /// The document passed the schema check but could not be deserialized.
    #[error("schema document could not be read: {0}")]
    Shape(String),
}

/// Text format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Pick a format from a file extension. Anything but `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        })
    }
}

/// One document-schema violation.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer to the offending value in the document.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Validator message.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Every violation found in one document.
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// True if there are none.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violations, in validator order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

/// Everything the warden applies to one kind of payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Debug name used in error messages.
    #[serde(default)]
    pub name: String,
    /// Run the unknown-field check.
    #[serde(default)]
    pub strict: bool,
    /// Coerce values toward their declared type before the type check.
    #[serde(default = "default_true")]
    pub coerce_numerics: bool,
    /// Explicit required paths. `None` derives them from `validate`.
    #[serde(default)]
    pub required: Option<Vec<SchemaPath>>,
    /// Explicit declared paths. `None` declares every mentioned path.
    #[serde(default)]
    pub paths: Option<Vec<SchemaPath>>,
    /// Declared type per path.
    #[serde(default)]
    pub types: TypeSchema,
    /// Validation rules per path.
    #[serde(default)]
    pub validate: RuleSchema,
    /// Sanitize transforms per path.
    #[serde(default)]
    pub sanitize: RuleSchema,
}

impl SchemaDocument {
    /// Read and load a document, picking the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the file cannot be read, parsed, or
    /// does not conform to the document schema.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, DocumentFormat::from_path(path))
    }

    /// Load a document from text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the text cannot be parsed or does not
    /// conform to the document schema.
    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, DocumentError> {
        let syntax = |reason: String| DocumentError::Syntax { format, reason };
        let shape = |e: &dyn fmt::Display| DocumentError::Shape(e.to_string());

        match format {
            DocumentFormat::Json => {
                let value: Value = serde_json::from_str(text).map_err(|e| syntax(e.to_string()))?;
                check_document(&value)?;
                serde_json::from_str(text).map_err(|e| shape(&e))
            }
            DocumentFormat::Yaml => {
                let yaml: serde_yaml::Value =
                    serde_yaml::from_str(text).map_err(|e| syntax(e.to_string()))?;
                check_document(&Node::from_yaml(&yaml)?.to_json())?;
                serde_yaml::from_value(yaml).map_err(|e| shape(&e))
            }
        }
    }

    /// Required paths: the explicit list, or every path whose validation
    /// rules carry a truthy `required`.
    pub fn required_paths(&self) -> Vec<SchemaPath> {
        match &self.required {
            Some(paths) => paths.clone(),
            None => crate::SchemaWarden::determine_required_paths(&self.validate),
        }
    }

    /// Declared paths for the unknown-field check: the explicit list, or
    /// every path mentioned anywhere in the document.
    pub fn declared_paths(&self) -> BTreeSet<String> {
        if let Some(paths) = &self.paths {
            return paths.iter().map(|p| p.as_str().to_string()).collect();
        }
        self.required
            .iter()
            .flatten()
            .chain(self.types.paths())
            .chain(self.validate.paths())
            .chain(self.sanitize.paths())
            .map(|p| p.as_str().to_string())
            .collect()
    }
}

/// Validate a document, as JSON, against the bundled document schema.
///
/// # Errors
///
/// Returns [`DocumentError::Invalid`] listing every violation, or
/// [`DocumentError::SchemaBuild`] if the bundled schema is unusable.
pub fn check_document(instance: &Value) -> Result<(), DocumentError> {
    let schema: Value = serde_json::from_str(DOCUMENT_SCHEMA)
        .map_err(|e| DocumentError::SchemaBuild(format!("invalid JSON: {e}")))?;

    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    let validator = opts
        .build(&schema)
        .map_err(|e| DocumentError::SchemaBuild(e.to_string()))?;

    let violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(DocumentError::Invalid(ValidationViolations { violations }))
    }
}
