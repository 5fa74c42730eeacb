//! Schema conformance checking.
//!
//! The [`SchemaOracle`] trait is the seam between the bridge and whatever decides whether
//! a raw JSON document is an acceptable resource. Callers inject it, so tests can swap in
//! a deterministic fake. [`FhirSchema`] is the real implementation backed by this crate's
//! strict wire models.
//!
//! Checking never fails with an error: a document either converts to a typed
//! [`Resource`] or yields the [`Violations`] found in it.

use crate::resource::{Resource, ResourceKind};
use crate::{Bundle, Observation, Patient};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A single schema violation, located by a field path such as `name[0].family`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Dotted field path; empty for the document root.
    pub path: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Ordered collection of violations found in one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a document with exactly one problem.
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![Violation::new(path, message)])
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(Violation::new(path, message));
    }

    pub fn extend(&mut self, other: Violations) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Re-root every violation under `prefix` (used for resources nested in a bundle).
    pub fn prefixed(self, prefix: &str) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|v| Violation {
                    path: join_path(prefix, &v.path),
                    message: v.message,
                })
                .collect(),
        )
    }

    /// Return `value` when nothing was recorded, otherwise the collected violations.
    pub fn into_result<T>(self, value: T) -> Result<T, Violations> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) if path.starts_with('[') => format!("{prefix}{path}"),
        (false, false) => format!("{prefix}.{path}"),
    }
}

/// Capability that accepts or rejects a raw document as a given resource kind.
pub trait SchemaOracle {
    /// Check `raw` against the schema for `kind`.
    ///
    /// # Errors
    ///
    /// Returns every [`Violation`] found when the document does not conform.
    fn check(&self, raw: &Value, kind: ResourceKind) -> Result<Resource, Violations>;
}

impl<O: SchemaOracle + ?Sized> SchemaOracle for &O {
    fn check(&self, raw: &Value, kind: ResourceKind) -> Result<Resource, Violations> {
        (**self).check(raw, kind)
    }
}

/// Schema oracle backed by this crate's strict wire models.
#[derive(Clone, Copy, Debug, Default)]
pub struct FhirSchema;

impl SchemaOracle for FhirSchema {
    fn check(&self, raw: &Value, kind: ResourceKind) -> Result<Resource, Violations> {
        match kind {
            ResourceKind::Patient => Patient::from_value(raw).map(Resource::Patient),
            ResourceKind::Observation => Observation::from_value(raw).map(Resource::Observation),
            ResourceKind::Bundle => Bundle::from_value(raw).map(Resource::Bundle),
        }
    }
}

/// Deserialize a wire struct from a JSON value, reporting the failing field path.
///
/// Structural decoding stops at the first mismatch, so this yields exactly one violation.
pub(crate) fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, Violations> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        // serde_path_to_error renders the root as "."
        let path = if path == "." { String::new() } else { path };
        Violations::single(path, source.to_string())
    })
}

/// Record a violation unless `resource_type` matches the expected kind.
pub(crate) fn expect_resource_type(
    violations: &mut Violations,
    resource_type: &str,
    expected: ResourceKind,
) {
    if resource_type != expected.as_str() {
        violations.push(
            "resourceType",
            format!(
                "expected resourceType '{}', got '{resource_type}'",
                expected.as_str()
            ),
        );
    }
}
