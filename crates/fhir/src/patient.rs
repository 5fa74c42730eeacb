//! FHIR-aligned patient models and translation helpers.
//!
//! This module provides both domain-level types and wire models for patient resources,
//! which carry the demographics read from a patient CSV row.
//!
//! Responsibilities:
//! - Define public domain-level types with explicit optional structure
//! - Define a strict wire model for JSON serialisation/deserialisation
//! - Provide translation helpers between domain types and the wire model
//! - Validate patient structure and report every violation found
//!
//! Notes:
//! - FHIR allows many names, addresses and telecom entries; the accessors on
//!   [`PatientData`] pick the first match and fall back to an empty string

use crate::primitives::{format_date, is_valid_id, parse_date};
use crate::resource::ResourceKind;
use crate::schema::{decode, expect_resource_type, Violations};
use crate::{FhirError, FhirResult};
use bridge_types::NonEmptyText;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Administrative gender of a patient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

impl AdministrativeGender {
    /// FHIR code for this gender.
    pub fn code(self) -> &'static str {
        match self {
            AdministrativeGender::Male => "male",
            AdministrativeGender::Female => "female",
            AdministrativeGender::Other => "other",
            AdministrativeGender::Unknown => "unknown",
        }
    }

    /// Parse from a FHIR code.
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "male" => Some(AdministrativeGender::Male),
            "female" => Some(AdministrativeGender::Female),
            "other" => Some(AdministrativeGender::Other),
            "unknown" => Some(AdministrativeGender::Unknown),
            _ => None,
        }
    }
}

/// Telecommunications form of a contact point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactPointSystem {
    Phone,
    Fax,
    Email,
    Pager,
    Url,
    Sms,
    Other,
}

impl ContactPointSystem {
    fn to_wire(self) -> &'static str {
        match self {
            ContactPointSystem::Phone => "phone",
            ContactPointSystem::Fax => "fax",
            ContactPointSystem::Email => "email",
            ContactPointSystem::Pager => "pager",
            ContactPointSystem::Url => "url",
            ContactPointSystem::Sms => "sms",
            ContactPointSystem::Other => "other",
        }
    }

    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "phone" => Some(ContactPointSystem::Phone),
            "fax" => Some(ContactPointSystem::Fax),
            "email" => Some(ContactPointSystem::Email),
            "pager" => Some(ContactPointSystem::Pager),
            "url" => Some(ContactPointSystem::Url),
            "sms" => Some(ContactPointSystem::Sms),
            "other" => Some(ContactPointSystem::Other),
            _ => None,
        }
    }
}

/// Structured human name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HumanName {
    /// Family name (surname).
    pub family: Option<String>,
    /// Given names, first name first.
    pub given: Vec<String>,
}

/// Phone number, email address or other contact detail.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactPoint {
    pub system: Option<ContactPointSystem>,
    pub value: Option<String>,
}

/// Postal address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    /// Street lines, most significant first.
    pub line: Vec<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Domain-level carrier for a patient resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientData {
    /// Logical id of the resource.
    pub id: NonEmptyText,

    /// Names; the first is treated as primary.
    pub name: Vec<HumanName>,

    /// Contact details.
    pub telecom: Vec<ContactPoint>,

    pub gender: Option<AdministrativeGender>,

    /// Date of birth (ISO 8601 date: YYYY-MM-DD).
    pub birth_date: Option<NaiveDate>,

    /// Addresses; the first is treated as primary.
    pub address: Vec<Address>,
}

impl PatientData {
    /// A patient with only an id.
    pub fn new(id: NonEmptyText) -> Self {
        Self {
            id,
            name: Vec::new(),
            telecom: Vec::new(),
            gender: None,
            birth_date: None,
            address: Vec::new(),
        }
    }

    pub fn primary_name(&self) -> Option<&HumanName> {
        self.name.first()
    }

    pub fn primary_address(&self) -> Option<&Address> {
        self.address.first()
    }

    /// Family name of the first name, or `""`.
    pub fn family_name(&self) -> &str {
        self.primary_name()
            .and_then(|n| n.family.as_deref())
            .unwrap_or_default()
    }

    /// First given name of the first name, or `""`.
    pub fn given_name(&self) -> &str {
        self.primary_name()
            .and_then(|n| n.given.first())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Value of the first telecom entry whose system is `phone`, or `""`.
    pub fn phone(&self) -> &str {
        self.telecom
            .iter()
            .find(|t| t.system == Some(ContactPointSystem::Phone))
            .and_then(|t| t.value.as_deref())
            .unwrap_or_default()
    }

    /// First line of the first address, or `""`.
    pub fn address_line(&self) -> &str {
        self.primary_address()
            .and_then(|a| a.line.first())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn city(&self) -> &str {
        self.primary_address()
            .and_then(|a| a.city.as_deref())
            .unwrap_or_default()
    }

    pub fn country(&self) -> &str {
        self.primary_address()
            .and_then(|a| a.country.as_deref())
            .unwrap_or_default()
    }

    /// Gender code, or `""`.
    pub fn gender_code(&self) -> &str {
        self.gender.map(AdministrativeGender::code).unwrap_or_default()
    }

    /// Birth date in `YYYY-MM-DD` form, or `""`.
    pub fn birth_date_text(&self) -> String {
        self.birth_date.map(format_date).unwrap_or_default()
    }
}

// ============================================================================
// Public Patient operations
// ============================================================================

/// Patient resource operations.
///
/// This is a zero-sized type used for namespacing patient-related operations.
/// All methods are associated functions.
pub struct Patient;

impl Patient {
    /// Parse a patient resource from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidJson`] if the text is not JSON, or
    /// [`FhirError::Schema`] with every violation found in the document.
    pub fn parse(json_text: &str) -> FhirResult<PatientData> {
        let value: Value = serde_json::from_str(json_text)?;
        Self::from_value(&value).map_err(FhirError::Schema)
    }

    /// Check a JSON value against the patient schema and convert it.
    ///
    /// Structural problems (unknown keys, wrong types, missing `id`) are reported with the
    /// failing path. Once the structure decodes, all semantic problems are collected.
    pub fn from_value(value: &Value) -> Result<PatientData, Violations> {
        let wire: PatientWire = decode(value)?;
        wire_to_domain(wire)
    }

    /// Convert a patient to its canonical JSON value.
    pub fn to_value(data: &PatientData) -> FhirResult<Value> {
        serde_json::to_value(domain_to_wire(data))
            .map_err(|e| FhirError::Translation(format!("Failed to serialise patient: {e}")))
    }

    /// Render a patient as pretty-printed JSON text.
    pub fn render(data: &PatientData) -> FhirResult<String> {
        serde_json::to_string_pretty(&domain_to_wire(data))
            .map_err(|e| FhirError::Translation(format!("Failed to serialise patient: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of a patient resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct PatientWire {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanNameWire>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPointWire>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(rename = "birthDate", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<AddressWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct HumanNameWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ContactPointWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct AddressWire {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

/// Convert wire format to the domain type, collecting every semantic violation.
fn wire_to_domain(wire: PatientWire) -> Result<PatientData, Violations> {
    let mut violations = Violations::new();

    expect_resource_type(&mut violations, &wire.resource_type, ResourceKind::Patient);

    if !is_valid_id(&wire.id) {
        violations.push("id", format!("invalid resource id '{}'", wire.id));
    }

    let gender = wire.gender.as_deref().and_then(|code| {
        let parsed = AdministrativeGender::from_code(code);
        if parsed.is_none() {
            violations.push("gender", format!("unknown administrative gender '{code}'"));
        }
        parsed
    });

    let birth_date = wire.birth_date.as_deref().and_then(|text| {
        let parsed = parse_date(text);
        if parsed.is_none() {
            violations.push("birthDate", format!("invalid date '{text}', expected YYYY-MM-DD"));
        }
        parsed
    });

    let telecom = wire
        .telecom
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            let system = t.system.as_deref().and_then(|s| {
                let parsed = ContactPointSystem::from_wire(s);
                if parsed.is_none() {
                    violations.push(
                        format!("telecom[{i}].system"),
                        format!("unknown contact point system '{s}'"),
                    );
                }
                parsed
            });
            ContactPoint {
                system,
                value: t.value,
            }
        })
        .collect();

    let name = wire
        .name
        .into_iter()
        .map(|n| HumanName {
            family: n.family,
            given: n.given,
        })
        .collect();

    let address = wire
        .address
        .into_iter()
        .map(|a| Address {
            line: a.line,
            city: a.city,
            country: a.country,
        })
        .collect();

    // Only reached with a valid id when no violation was recorded for it.
    let Ok(id) = NonEmptyText::new(&wire.id) else {
        return Err(violations);
    };

    violations.into_result(PatientData {
        id,
        name,
        telecom,
        gender,
        birth_date,
        address,
    })
}

/// Convert the domain type to wire format.
fn domain_to_wire(data: &PatientData) -> PatientWire {
    PatientWire {
        resource_type: ResourceKind::Patient.as_str().to_string(),
        id: data.id.to_string(),
        name: data
            .name
            .iter()
            .map(|n| HumanNameWire {
                family: n.family.clone(),
                given: n.given.clone(),
            })
            .collect(),
        telecom: data
            .telecom
            .iter()
            .map(|t| ContactPointWire {
                system: t.system.map(|s| s.to_wire().to_string()),
                value: t.value.clone(),
            })
            .collect(),
        gender: data.gender.map(|g| g.code().to_string()),
        birth_date: data.birth_date.map(format_date),
        address: data
            .address
            .iter()
            .map(|a| AddressWire {
                line: a.line.clone(),
                city: a.city.clone(),
                country: a.country.clone(),
            })
            .collect(),
    }
}
