//! Resource kinds and the typed resource sum type.

use crate::{Bundle, BundleData, FhirError, FhirResult, Observation, ObservationData, Patient, PatientData};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The resource types the bridge understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Patient,
    Observation,
    Bundle,
}

impl ResourceKind {
    /// The FHIR `resourceType` string, also used as the locator prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Patient => "Patient",
            ResourceKind::Observation => "Observation",
            ResourceKind::Bundle => "Bundle",
        }
    }

    /// Build a locator of the form `<Kind>/<id>`.
    pub fn locator(self, id: &str) -> String {
        format!("{}/{id}", self.as_str())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = FhirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Patient" => Ok(ResourceKind::Patient),
            "Observation" => Ok(ResourceKind::Observation),
            "Bundle" => Ok(ResourceKind::Bundle),
            other => Err(FhirError::InvalidInput(format!(
                "unsupported resource type: {other}"
            ))),
        }
    }
}

/// A typed resource produced by the schema oracle or carried in a bundle entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Resource {
    Patient(PatientData),
    Observation(ObservationData),
    Bundle(BundleData),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Patient(_) => ResourceKind::Patient,
            Resource::Observation(_) => ResourceKind::Observation,
            Resource::Bundle(_) => ResourceKind::Bundle,
        }
    }

    /// Logical id of the resource, if it carries one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Resource::Patient(p) => Some(p.id.as_str()),
            Resource::Observation(o) => Some(o.id.as_str()),
            Resource::Bundle(_) => None,
        }
    }

    /// Render the resource in canonical FHIR JSON form.
    pub fn to_value(&self) -> FhirResult<Value> {
        match self {
            Resource::Patient(p) => Patient::to_value(p),
            Resource::Observation(o) => Observation::to_value(o),
            Resource::Bundle(b) => Bundle::to_value(b),
        }
    }
}

impl From<PatientData> for Resource {
    fn from(value: PatientData) -> Self {
        Resource::Patient(value)
    }
}

impl From<ObservationData> for Resource {
    fn from(value: ObservationData) -> Self {
        Resource::Observation(value)
    }
}
