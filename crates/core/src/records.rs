//! Tabular row types.
//!
//! Rows are kept as raw strings exactly as they appear in the CSV file; all typing happens
//! in the forward mapper. Field order defines the column order when writing, and serde
//! names match the header row (case-sensitive). Columns absent from an input file read as
//! empty strings.

use serde::{Deserialize, Serialize};

/// One row of a patient CSV file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientRecord {
    pub id: String,
    pub family_name: String,
    pub given_name: String,
    pub gender: String,
    pub birth_date: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub phone: String,
}

/// One row of an observation CSV file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationRecord {
    pub id: String,
    /// Foreign key to [`PatientRecord::id`].
    pub patient_id: String,
    pub code_system: String,
    pub code: String,
    pub display: String,
    pub value: String,
    pub unit: String,
    pub observation_date: String,
}
