//! FHIR-aligned observation models and translation helpers.
//!
//! An observation here is a single coded, quantitative measurement about one patient.
//!
//! Responsibilities:
//! - Define public domain-level types for codes, references and quantities
//! - Define a strict wire model for JSON serialisation/deserialisation
//! - Provide translation helpers between domain types and the wire model
//! - Validate observation structure and report every violation found

use crate::primitives::{is_valid_date_time, is_valid_id};
use crate::resource::ResourceKind;
use crate::schema::{decode, expect_resource_type, Violations};
use crate::{FhirError, FhirResult};
use bridge_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coding system used for quantity units (UCUM).
pub const UNITS_OF_MEASURE_SYSTEM: &str = "http://unitsofmeasure.org";

// ============================================================================
// Public domain-level types
// ============================================================================

/// Status of an observation result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservationStatus {
    Registered,
    Preliminary,
    Final,
    Amended,
    Corrected,
    Cancelled,
    EnteredInError,
    Unknown,
}

impl ObservationStatus {
    pub fn code(self) -> &'static str {
        match self {
            ObservationStatus::Registered => "registered",
            ObservationStatus::Preliminary => "preliminary",
            ObservationStatus::Final => "final",
            ObservationStatus::Amended => "amended",
            ObservationStatus::Corrected => "corrected",
            ObservationStatus::Cancelled => "cancelled",
            ObservationStatus::EnteredInError => "entered-in-error",
            ObservationStatus::Unknown => "unknown",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "registered" => Some(ObservationStatus::Registered),
            "preliminary" => Some(ObservationStatus::Preliminary),
            "final" => Some(ObservationStatus::Final),
            "amended" => Some(ObservationStatus::Amended),
            "corrected" => Some(ObservationStatus::Corrected),
            "cancelled" => Some(ObservationStatus::Cancelled),
            "entered-in-error" => Some(ObservationStatus::EnteredInError),
            "unknown" => Some(ObservationStatus::Unknown),
            _ => None,
        }
    }
}

/// A code from a terminology system.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coding {
    pub system: Option<String>,
    pub code: Option<String>,
    pub display: Option<String>,
}

/// A concept expressed as codings plus free text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
    pub text: Option<String>,
}

/// Literal reference to another resource, e.g. `Patient/42`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reference {
    pub reference: Option<String>,
}

impl Reference {
    /// Reference to the resource of `kind` with logical id `id`.
    pub fn to(kind: ResourceKind, id: &str) -> Self {
        Self {
            reference: Some(kind.locator(id)),
        }
    }

    /// Second `/`-separated segment of the reference, or `""` if there is none.
    pub fn target_id(&self) -> &str {
        self.reference
            .as_deref()
            .and_then(|r| r.split('/').nth(1))
            .unwrap_or_default()
    }
}

/// A measured amount with its unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Quantity {
    pub value: Option<f64>,
    /// Unit as displayed.
    pub unit: Option<String>,
    /// System that defines the coded unit.
    pub system: Option<String>,
    /// Coded form of the unit.
    pub code: Option<String>,
}

/// Domain-level carrier for an observation resource.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationData {
    pub id: NonEmptyText,
    pub status: ObservationStatus,
    /// What was observed.
    pub code: CodeableConcept,
    /// Who the observation is about.
    pub subject: Option<Reference>,
    /// Clinically relevant time, as a FHIR `dateTime` string.
    pub effective_date_time: Option<String>,
    pub value_quantity: Option<Quantity>,
}

impl ObservationData {
    /// An observation with only the required elements.
    pub fn new(id: NonEmptyText, status: ObservationStatus) -> Self {
        Self {
            id,
            status,
            code: CodeableConcept::default(),
            subject: None,
            effective_date_time: None,
            value_quantity: None,
        }
    }

    pub fn primary_coding(&self) -> Option<&Coding> {
        self.code.coding.first()
    }

    /// Id of the referenced subject, or `""`.
    pub fn patient_id(&self) -> &str {
        self.subject
            .as_ref()
            .map(Reference::target_id)
            .unwrap_or_default()
    }

    pub fn code_system(&self) -> &str {
        self.primary_coding()
            .and_then(|c| c.system.as_deref())
            .unwrap_or_default()
    }

    pub fn code_value(&self) -> &str {
        self.primary_coding()
            .and_then(|c| c.code.as_deref())
            .unwrap_or_default()
    }

    pub fn display(&self) -> &str {
        self.primary_coding()
            .and_then(|c| c.display.as_deref())
            .unwrap_or_default()
    }

    /// Numeric value rendered with the shortest round-trip representation, or `""`.
    pub fn value_text(&self) -> String {
        self.value_quantity
            .as_ref()
            .and_then(|q| q.value)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    pub fn unit(&self) -> &str {
        self.value_quantity
            .as_ref()
            .and_then(|q| q.unit.as_deref())
            .unwrap_or_default()
    }

    pub fn effective(&self) -> &str {
        self.effective_date_time.as_deref().unwrap_or_default()
    }
}

// ============================================================================
// Public Observation operations
// ============================================================================

/// Observation resource operations.
///
/// This is a zero-sized type used for namespacing observation-related operations.
pub struct Observation;

impl Observation {
    /// Parse an observation resource from JSON text.
    pub fn parse(json_text: &str) -> FhirResult<ObservationData> {
        let value: Value = serde_json::from_str(json_text)?;
        Self::from_value(&value).map_err(FhirError::Schema)
    }

    /// Check a JSON value against the observation schema and convert it.
    pub fn from_value(value: &Value) -> Result<ObservationData, Violations> {
        let wire: ObservationWire = decode(value)?;
        wire_to_domain(wire)
    }

    pub fn to_value(data: &ObservationData) -> FhirResult<Value> {
        serde_json::to_value(domain_to_wire(data))
            .map_err(|e| FhirError::Translation(format!("Failed to serialise observation: {e}")))
    }

    pub fn render(data: &ObservationData) -> FhirResult<String> {
        serde_json::to_string_pretty(&domain_to_wire(data))
            .map_err(|e| FhirError::Translation(format!("Failed to serialise observation: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ObservationWire {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    pub id: String,

    pub status: String,

    pub code: CodeableConceptWire,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<ReferenceWire>,

    #[serde(rename = "effectiveDateTime", default, skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<String>,

    #[serde(rename = "valueQuantity", default, skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<QuantityWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct CodeableConceptWire {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<CodingWire>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct CodingWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ReferenceWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct QuantityWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: ObservationWire) -> Result<ObservationData, Violations> {
    let mut violations = Violations::new();

    expect_resource_type(&mut violations, &wire.resource_type, ResourceKind::Observation);

    if !is_valid_id(&wire.id) {
        violations.push("id", format!("invalid resource id '{}'", wire.id));
    }

    let status = ObservationStatus::from_code(&wire.status);
    if status.is_none() {
        violations.push(
            "status",
            format!("unknown observation status '{}'", wire.status),
        );
    }

    if let Some(effective) = wire.effective_date_time.as_deref() {
        if !is_valid_date_time(effective) {
            violations.push(
                "effectiveDateTime",
                format!("invalid dateTime '{effective}'"),
            );
        }
    }

    let code = CodeableConcept {
        coding: wire
            .code
            .coding
            .into_iter()
            .map(|c| Coding {
                system: c.system,
                code: c.code,
                display: c.display,
            })
            .collect(),
        text: wire.code.text,
    };

    let subject = wire.subject.map(|s| Reference {
        reference: s.reference,
    });

    let value_quantity = wire.value_quantity.map(|q| Quantity {
        value: q.value,
        unit: q.unit,
        system: q.system,
        code: q.code,
    });

    let (Ok(id), Some(status)) = (NonEmptyText::new(&wire.id), status) else {
        return Err(violations);
    };

    violations.into_result(ObservationData {
        id,
        status,
        code,
        subject,
        effective_date_time: wire.effective_date_time,
        value_quantity,
    })
}

fn domain_to_wire(data: &ObservationData) -> ObservationWire {
    ObservationWire {
        resource_type: ResourceKind::Observation.as_str().to_string(),
        id: data.id.to_string(),
        status: data.status.code().to_string(),
        code: CodeableConceptWire {
            coding: data
                .code
                .coding
                .iter()
                .map(|c| CodingWire {
                    system: c.system.clone(),
                    code: c.code.clone(),
                    display: c.display.clone(),
                })
                .collect(),
            text: data.code.text.clone(),
        },
        subject: data.subject.as_ref().map(|s| ReferenceWire {
            reference: s.reference.clone(),
        }),
        effective_date_time: data.effective_date_time.clone(),
        value_quantity: data.value_quantity.as_ref().map(|q| QuantityWire {
            value: q.value,
            unit: q.unit.clone(),
            system: q.system.clone(),
            code: q.code.clone(),
        }),
    }
}
