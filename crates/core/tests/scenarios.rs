//! End-to-end scenarios through the public API.

use bridge_core::{
    assemble, extract_observations, extract_patients, map_observations, map_patients,
    observations_to_rows, patients_to_rows, DocumentSource, ObservationRecord, PatientRecord,
    ValidationRunner,
};
use fhir::{ContactPointSystem, FhirSchema, Patient, ResourceKind};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn lee_row() -> PatientRecord {
    PatientRecord {
        id: "1".into(),
        family_name: "Lee".into(),
        given_name: "Ana".into(),
        gender: "female".into(),
        birth_date: "1980-01-01".into(),
        address: "1 Main St".into(),
        city: "Springfield".into(),
        country: "US".into(),
        phone: "555-1234".into(),
    }
}

#[test]
fn lee_row_maps_to_expected_patient_and_back() {
    let patients = map_patients(&[lee_row()]).expect("valid row");
    let patient = &patients[0];

    let name = patient.primary_name().expect("one name");
    assert_eq!(name.family.as_deref(), Some("Lee"));
    assert_eq!(name.given, vec!["Ana".to_string()]);
    assert_eq!(patient.telecom.len(), 1);
    assert_eq!(patient.telecom[0].system, Some(ContactPointSystem::Phone));
    assert_eq!(patient.telecom[0].value.as_deref(), Some("555-1234"));

    let value = Patient::to_value(patient).expect("renders");
    assert_eq!(
        value,
        json!({
            "resourceType": "Patient",
            "id": "1",
            "name": [{"family": "Lee", "given": ["Ana"]}],
            "telecom": [{"system": "phone", "value": "555-1234"}],
            "gender": "female",
            "birthDate": "1980-01-01",
            "address": [{"line": ["1 Main St"], "city": "Springfield", "country": "US"}]
        })
    );

    let rows = patients_to_rows(&extract_patients(&assemble(&patients, &[])));
    assert_eq!(rows, vec![lee_row()]);
}

#[test]
fn observation_reference_uses_patient_locator() {
    let row = ObservationRecord {
        id: "o1".into(),
        patient_id: "42".into(),
        code_system: "http://loinc.org".into(),
        code: "8480-6".into(),
        display: "Systolic blood pressure".into(),
        value: "120".into(),
        unit: "mm[Hg]".into(),
        observation_date: "2024-01-02".into(),
    };

    let observations = map_observations(std::slice::from_ref(&row)).expect("valid row");
    let reference = observations[0]
        .subject
        .as_ref()
        .and_then(|s| s.reference.as_deref());
    assert_eq!(reference, Some("Patient/42"));

    let rows = observations_to_rows(&extract_observations(&assemble(&[], &observations)));
    assert_eq!(rows[0].patient_id, "42");
    assert_eq!(rows, vec![row]);
}

#[test]
fn second_of_three_documents_malformed() {
    let runner = ValidationRunner::new(FhirSchema);
    let source = DocumentSource::List(vec![
        json!({"resourceType": "Patient", "id": "1"}),
        json!({"resourceType": "Patient", "id": "2", "gender": 7}),
        json!({"resourceType": "Patient", "id": "3"}),
    ]);

    let report = runner.validate(&source, ResourceKind::Patient);

    assert_eq!(report.valid_count, 2);
    assert_eq!(report.error_count, 1);
    assert!(report.error_messages[0].starts_with("Source #2 validation error: gender:"));
}

#[test]
fn missing_identifier_in_file_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("patients.json");
    fs::write(
        &path,
        r#"[{"resourceType": "Patient", "name": [{"family": "Lee", "given": ["Ana"]}]}]"#,
    )
    .expect("write");

    let report = ValidationRunner::new(FhirSchema).validate_file(&path, ResourceKind::Patient);

    assert_eq!(report.error_count, 1);
    assert_eq!(report.valid_count, 0);
    assert!(report.error_messages[0].contains("`id`"));
}

#[test]
fn bundle_with_a_bad_entry_fails_as_a_unit() {
    let patients = map_patients(&[lee_row()]).expect("valid row");
    let mut value = fhir::Bundle::to_value(&assemble(&patients, &[])).expect("renders");
    value["entry"][0]["resource"]["birthDate"] = json!("yesterday");

    let report =
        ValidationRunner::new(FhirSchema).validate(&DocumentSource::Collection(value), ResourceKind::Bundle);

    assert_eq!((report.valid_count, report.error_count), (0, 1));
    assert!(report.error_messages[0].contains("entry[0].resource.birthDate"));
}
