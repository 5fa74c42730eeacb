//! FHIR wire/boundary support for the tabular bridge.
//!
//! This crate provides **typed resource models** and **JSON translation helpers** for the
//! resources the bridge exchanges with tabular data:
//! - `Patient` (demographics)
//! - `Observation` (a single coded measurement)
//! - `Bundle` of type `collection` carrying both
//!
//! This crate focuses on:
//! - FHIR-aligned JSON shapes (`resourceType`, camelCase keys, ISO-8601 dates)
//! - strict deserialisation with field paths for every schema mismatch
//! - the [`SchemaOracle`] capability used to gate untrusted documents
//!
//! Only the parts of each resource that the bridge maps are modelled. Unknown keys are
//! rejected rather than silently dropped.

pub mod bundle;
pub mod observation;
pub mod patient;
pub mod primitives;
pub mod resource;
pub mod schema;

// Re-export facades
pub use bundle::Bundle;
pub use observation::Observation;
pub use patient::Patient;

// Re-export public domain-level types
pub use bundle::{BundleData, BundleEntry, BundleType};
pub use observation::{
    CodeableConcept, Coding, ObservationData, ObservationStatus, Quantity, Reference,
    UNITS_OF_MEASURE_SYSTEM,
};
pub use patient::{
    Address, AdministrativeGender, ContactPoint, ContactPointSystem, HumanName, PatientData,
};
pub use resource::{Resource, ResourceKind};
pub use schema::{FhirSchema, SchemaOracle, Violation, Violations};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("schema violation: {0}")]
    Schema(Violations),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
