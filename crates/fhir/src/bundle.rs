//! FHIR-aligned bundle models and translation helpers.
//!
//! A bundle is an ordered list of entries, each pairing a locator (`fullUrl`) with a
//! resource. Entry resources are dispatched on their own `resourceType`; only patients
//! and observations may appear inside a bundle.
//!
//! Entry order is preserved exactly. Duplicate locators are neither detected nor rejected.

use crate::resource::{Resource, ResourceKind};
use crate::schema::{decode, expect_resource_type, Violations};
use crate::{FhirError, FhirResult, Observation, Patient};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Purpose of a bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BundleType {
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    History,
    Searchset,
    Collection,
}

impl BundleType {
    pub fn code(self) -> &'static str {
        match self {
            BundleType::Document => "document",
            BundleType::Message => "message",
            BundleType::Transaction => "transaction",
            BundleType::TransactionResponse => "transaction-response",
            BundleType::Batch => "batch",
            BundleType::BatchResponse => "batch-response",
            BundleType::History => "history",
            BundleType::Searchset => "searchset",
            BundleType::Collection => "collection",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "document" => Some(BundleType::Document),
            "message" => Some(BundleType::Message),
            "transaction" => Some(BundleType::Transaction),
            "transaction-response" => Some(BundleType::TransactionResponse),
            "batch" => Some(BundleType::Batch),
            "batch-response" => Some(BundleType::BatchResponse),
            "history" => Some(BundleType::History),
            "searchset" => Some(BundleType::Searchset),
            "collection" => Some(BundleType::Collection),
            _ => None,
        }
    }
}

/// One locator/resource pair.
#[derive(Clone, Debug, PartialEq)]
pub struct BundleEntry {
    /// Locator of the form `<Kind>/<id>`.
    pub full_url: Option<String>,
    pub resource: Resource,
}

impl BundleEntry {
    /// Wrap a resource, deriving its locator from its own kind and id.
    pub fn new(resource: Resource) -> Self {
        let full_url = resource.id().map(|id| resource.kind().locator(id));
        Self { full_url, resource }
    }

    /// Locator, or `""` when the entry has none.
    pub fn locator(&self) -> &str {
        self.full_url.as_deref().unwrap_or_default()
    }
}

/// Domain-level carrier for a bundle.
#[derive(Clone, Debug, PartialEq)]
pub struct BundleData {
    pub bundle_type: BundleType,
    pub entries: Vec<BundleEntry>,
}

impl BundleData {
    /// A `collection` bundle over the given entries.
    pub fn collection(entries: Vec<BundleEntry>) -> Self {
        Self {
            bundle_type: BundleType::Collection,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Public Bundle operations
// ============================================================================

/// Bundle resource operations.
pub struct Bundle;

impl Bundle {
    /// Parse a bundle from JSON text.
    pub fn parse(json_text: &str) -> FhirResult<BundleData> {
        let value: Value = serde_json::from_str(json_text)?;
        Self::from_value(&value).map_err(FhirError::Schema)
    }

    /// Check a JSON value against the bundle schema and convert it.
    ///
    /// Violations inside entry resources are reported under `entry[i].resource`.
    pub fn from_value(value: &Value) -> Result<BundleData, Violations> {
        let wire: BundleWire = decode(value)?;
        wire_to_domain(wire)
    }

    pub fn to_value(data: &BundleData) -> FhirResult<Value> {
        let wire = domain_to_wire(data)?;
        serde_json::to_value(wire)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise bundle: {e}")))
    }

    pub fn render(data: &BundleData) -> FhirResult<String> {
        let wire = domain_to_wire(data)?;
        serde_json::to_string_pretty(&wire)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise bundle: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct BundleWire {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(rename = "type")]
    pub bundle_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntryWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct BundleEntryWire {
    #[serde(rename = "fullUrl", default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: BundleWire) -> Result<BundleData, Violations> {
    let mut violations = Violations::new();

    expect_resource_type(&mut violations, &wire.resource_type, ResourceKind::Bundle);

    let bundle_type = BundleType::from_code(&wire.bundle_type);
    if bundle_type.is_none() {
        violations.push("type", format!("unknown bundle type '{}'", wire.bundle_type));
    }

    let mut entries = Vec::with_capacity(wire.entry.len());
    for (i, entry) in wire.entry.into_iter().enumerate() {
        let Some(raw) = entry.resource else {
            violations.push(format!("entry[{i}]"), "entry has no resource");
            continue;
        };
        match entry_resource(&raw) {
            Ok(resource) => entries.push(BundleEntry {
                full_url: entry.full_url,
                resource,
            }),
            Err(errs) => violations.extend(errs.prefixed(&format!("entry[{i}].resource"))),
        }
    }

    let Some(bundle_type) = bundle_type else {
        return Err(violations);
    };

    violations.into_result(BundleData {
        bundle_type,
        entries,
    })
}

/// Decode an entry resource according to its own `resourceType`.
fn entry_resource(raw: &Value) -> Result<Resource, Violations> {
    match raw.get("resourceType").and_then(Value::as_str) {
        Some("Patient") => Patient::from_value(raw).map(Resource::Patient),
        Some("Observation") => Observation::from_value(raw).map(Resource::Observation),
        Some(other) => Err(Violations::single(
            "resourceType",
            format!("unsupported resourceType '{other}' in bundle entry"),
        )),
        None => Err(Violations::single("", "missing field `resourceType`")),
    }
}

fn domain_to_wire(data: &BundleData) -> FhirResult<BundleWire> {
    let entry = data
        .entries
        .iter()
        .map(|e| {
            Ok(BundleEntryWire {
                full_url: e.full_url.clone(),
                resource: Some(e.resource.to_value()?),
            })
        })
        .collect::<FhirResult<Vec<_>>>()?;

    Ok(BundleWire {
        resource_type: ResourceKind::Bundle.as_str().to_string(),
        bundle_type: data.bundle_type.code().to_string(),
        entry,
    })
}
