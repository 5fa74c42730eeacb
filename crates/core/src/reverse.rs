//! Reverse mapping: bundle entries back to CSV rows.
//!
//! Extraction keeps the bundle's relative order. Row reconstruction never fails: every
//! absent element (no name, no address, no phone, no coding, no value) becomes an empty
//! cell. The first-match rules live in the accessors on [`PatientData`] and
//! [`ObservationData`].

use crate::records::{ObservationRecord, PatientRecord};
use fhir::{BundleData, ObservationData, PatientData, Resource};

/// Patients in the bundle, in entry order.
pub fn extract_patients(bundle: &BundleData) -> Vec<PatientData> {
    bundle
        .entries
        .iter()
        .filter_map(|entry| match &entry.resource {
            Resource::Patient(p) => Some(p.clone()),
            _ => None,
        })
        .collect()
}

/// Observations in the bundle, in entry order.
pub fn extract_observations(bundle: &BundleData) -> Vec<ObservationData> {
    bundle
        .entries
        .iter()
        .filter_map(|entry| match &entry.resource {
            Resource::Observation(o) => Some(o.clone()),
            _ => None,
        })
        .collect()
}

pub fn patients_to_rows(patients: &[PatientData]) -> Vec<PatientRecord> {
    patients.iter().map(patient_to_row).collect()
}

pub fn observations_to_rows(observations: &[ObservationData]) -> Vec<ObservationRecord> {
    observations.iter().map(observation_to_row).collect()
}

pub fn patient_to_row(patient: &PatientData) -> PatientRecord {
    PatientRecord {
        id: patient.id.to_string(),
        family_name: patient.family_name().to_string(),
        given_name: patient.given_name().to_string(),
        gender: patient.gender_code().to_string(),
        birth_date: patient.birth_date_text(),
        address: patient.address_line().to_string(),
        city: patient.city().to_string(),
        country: patient.country().to_string(),
        phone: patient.phone().to_string(),
    }
}

pub fn observation_to_row(observation: &ObservationData) -> ObservationRecord {
    ObservationRecord {
        id: observation.id.to_string(),
        patient_id: observation.patient_id().to_string(),
        code_system: observation.code_system().to_string(),
        code: observation.code_value().to_string(),
        display: observation.display().to_string(),
        value: observation.value_text(),
        unit: observation.unit().to_string(),
        observation_date: observation.effective().to_string(),
    }
}
