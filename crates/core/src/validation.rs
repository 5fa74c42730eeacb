//! Schema validation of resource documents.
//!
//! The runner feeds documents through an injected [`SchemaOracle`] and aggregates the
//! outcome into a [`ValidationReport`]. Validation never returns an error:
//!
//! - a list of resources is checked element by element and one bad element never stops
//!   the rest from being checked;
//! - a single bundle is checked once, as a unit;
//! - a file that cannot be read or is not a JSON array/object becomes a report with one
//!   "File processing error" entry.

use crate::{BridgeError, BridgeResult};
use fhir::{ResourceKind, SchemaOracle};
use serde_json::Value;
use std::path::Path;

/// Outcome of a validation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid_count: usize,
    pub error_count: usize,
    pub error_messages: Vec<String>,
}

impl ValidationReport {
    /// Report for input that could not be processed at all.
    pub fn file_error(error: &BridgeError) -> Self {
        Self {
            valid_count: 0,
            error_count: 1,
            error_messages: vec![format!("File processing error: {error}")],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }
}

/// Documents to validate, distinguished by the top-level JSON shape.
#[derive(Clone, Debug, PartialEq)]
pub enum DocumentSource {
    /// An array of individual resources.
    List(Vec<Value>),
    /// A single bundle document.
    Collection(Value),
}

impl DocumentSource {
    /// Classify a parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MalformedDocument`] unless the value is an array or an object.
    pub fn from_value(value: Value) -> BridgeResult<Self> {
        match value {
            Value::Array(items) => Ok(DocumentSource::List(items)),
            Value::Object(_) => Ok(DocumentSource::Collection(value)),
            other => Err(BridgeError::MalformedDocument(format!(
                "expected an array of resources or a bundle object, found {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Runs documents through a schema oracle.
#[derive(Clone, Debug, Default)]
pub struct ValidationRunner<O> {
    oracle: O,
}

impl<O: SchemaOracle> ValidationRunner<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Validate an already-classified document source.
    ///
    /// List elements are checked against `kind`. A collection is always checked as a
    /// [`ResourceKind::Bundle`], whatever `kind` says.
    pub fn validate(&self, source: &DocumentSource, kind: ResourceKind) -> ValidationReport {
        let mut report = ValidationReport::default();

        match source {
            DocumentSource::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    match self.oracle.check(item, kind) {
                        Ok(_) => report.valid_count += 1,
                        Err(violations) => {
                            report.error_count += 1;
                            report
                                .error_messages
                                .push(format!("Source #{} validation error: {violations}", i + 1));
                        }
                    }
                }
            }
            DocumentSource::Collection(document) => {
                if kind != ResourceKind::Bundle {
                    tracing::debug!(%kind, "single document validated as a bundle");
                }
                match self.oracle.check(document, ResourceKind::Bundle) {
                    Ok(_) => report.valid_count = 1,
                    Err(violations) => {
                        report.error_count = 1;
                        report
                            .error_messages
                            .push(format!("Bundle validation error: {violations}"));
                    }
                }
            }
        }

        tracing::info!(
            %kind,
            valid = report.valid_count,
            errors = report.error_count,
            "validation finished"
        );
        report
    }

    /// Validate JSON text. Unparseable text yields a single file-level error.
    pub fn validate_str(&self, json_text: &str, kind: ResourceKind) -> ValidationReport {
        let source = serde_json::from_str::<Value>(json_text)
            .map_err(BridgeError::from)
            .and_then(DocumentSource::from_value);

        match source {
            Ok(source) => self.validate(&source, kind),
            Err(err) => {
                tracing::warn!(error = %err, "could not process document");
                ValidationReport::file_error(&err)
            }
        }
    }

    /// Validate a JSON file. Unreadable or malformed files yield a single file-level error.
    pub fn validate_file(&self, path: &Path, kind: ResourceKind) -> ValidationReport {
        match std::fs::read_to_string(path) {
            Ok(text) => self.validate_str(&text, kind),
            Err(source) => {
                let err = BridgeError::file_access(path, source);
                tracing::warn!(error = %err, "could not read document");
                ValidationReport::file_error(&err)
            }
        }
    }
}
