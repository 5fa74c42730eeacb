//! Forward mapping: CSV rows to typed FHIR resources.
//!
//! Mapping is pure and all-or-nothing: the first malformed row aborts the batch with
//! [`BridgeError::MalformedRow`] and no resources are returned.
//!
//! The telecom and address structures are always built, even when their cells are blank,
//! so the reverse mapper finds every field in the same place.

use crate::records::{ObservationRecord, PatientRecord};
use crate::{BridgeError, BridgeResult};
use bridge_types::{optional_text, NonEmptyText};
use fhir::primitives::{is_valid_date_time, is_valid_id, parse_date};
use fhir::{
    Address, AdministrativeGender, CodeableConcept, Coding, ContactPoint, ContactPointSystem,
    HumanName, ObservationData, ObservationStatus, PatientData, Quantity, Reference,
    ResourceKind, UNITS_OF_MEASURE_SYSTEM,
};

/// Map every patient row, preserving order.
///
/// # Errors
///
/// Returns [`BridgeError::MalformedRow`] for the first row that is missing `id`,
/// `family_name` or `given_name`, or whose `gender` or `birth_date` cannot be read.
pub fn map_patients(rows: &[PatientRecord]) -> BridgeResult<Vec<PatientData>> {
    let patients = rows
        .iter()
        .enumerate()
        .map(|(i, row)| map_patient(i + 1, row))
        .collect::<BridgeResult<Vec<_>>>()?;

    tracing::debug!(count = patients.len(), "mapped patient rows");
    Ok(patients)
}

/// Map a single patient row. `row_number` is 1-based and only used in errors.
pub fn map_patient(row_number: usize, row: &PatientRecord) -> BridgeResult<PatientData> {
    let id = required_id(row_number, "id", &row.id)?;
    let family = required(row_number, "family_name", &row.family_name)?;
    let given = required(row_number, "given_name", &row.given_name)?;

    let gender = optional_text(&row.gender)
        .map(|code| {
            AdministrativeGender::from_code(code).ok_or_else(|| {
                BridgeError::malformed_row(
                    row_number,
                    "gender",
                    format!("has unknown code '{code}' (expected male, female, other or unknown)"),
                )
            })
        })
        .transpose()?;

    let birth_date = optional_text(&row.birth_date)
        .map(|text| {
            parse_date(text).ok_or_else(|| {
                BridgeError::malformed_row(
                    row_number,
                    "birth_date",
                    format!("is not a YYYY-MM-DD date: '{text}'"),
                )
            })
        })
        .transpose()?;

    Ok(PatientData {
        id,
        name: vec![HumanName {
            family: Some(family.into_string()),
            given: vec![given.into_string()],
        }],
        telecom: vec![ContactPoint {
            system: Some(ContactPointSystem::Phone),
            value: Some(row.phone.clone()),
        }],
        gender,
        birth_date,
        address: vec![Address {
            line: vec![row.address.clone()],
            city: Some(row.city.clone()),
            country: Some(row.country.clone()),
        }],
    })
}

/// Map every observation row, preserving order.
///
/// # Errors
///
/// Returns [`BridgeError::MalformedRow`] for the first row that is missing `id`,
/// `patient_id` or `code`, whose `value` is not a finite number, or whose
/// `observation_date` is not a FHIR dateTime.
pub fn map_observations(rows: &[ObservationRecord]) -> BridgeResult<Vec<ObservationData>> {
    let observations = rows
        .iter()
        .enumerate()
        .map(|(i, row)| map_observation(i + 1, row))
        .collect::<BridgeResult<Vec<_>>>()?;

    tracing::debug!(count = observations.len(), "mapped observation rows");
    Ok(observations)
}

/// Map a single observation row. `row_number` is 1-based and only used in errors.
pub fn map_observation(row_number: usize, row: &ObservationRecord) -> BridgeResult<ObservationData> {
    let id = required_id(row_number, "id", &row.id)?;
    let patient_id = required_id(row_number, "patient_id", &row.patient_id)?;
    let code = required(row_number, "code", &row.code)?;

    let value = optional_text(&row.value)
        .map(|text| parse_value(row_number, text))
        .transpose()?;

    let effective_date_time = optional_text(&row.observation_date)
        .map(|text| {
            if is_valid_date_time(text) {
                Ok(text.to_string())
            } else {
                Err(BridgeError::malformed_row(
                    row_number,
                    "observation_date",
                    format!("is not a date or timestamp: '{text}'"),
                ))
            }
        })
        .transpose()?;

    Ok(ObservationData {
        id,
        status: ObservationStatus::Final,
        code: CodeableConcept {
            coding: vec![Coding {
                system: Some(row.code_system.clone()),
                code: Some(code.into_string()),
                display: Some(row.display.clone()),
            }],
            text: Some(row.display.clone()),
        },
        subject: Some(Reference::to(ResourceKind::Patient, patient_id.as_str())),
        effective_date_time,
        value_quantity: Some(Quantity {
            value,
            unit: Some(row.unit.clone()),
            system: Some(UNITS_OF_MEASURE_SYSTEM.to_string()),
            code: Some(row.unit.clone()),
        }),
    })
}

fn required(row: usize, field: &'static str, value: &str) -> BridgeResult<NonEmptyText> {
    NonEmptyText::new(value).map_err(|_| BridgeError::malformed_row(row, field, "is required"))
}

fn required_id(row: usize, field: &'static str, value: &str) -> BridgeResult<NonEmptyText> {
    let id = required(row, field, value)?;
    if !is_valid_id(id.as_str()) {
        return Err(BridgeError::malformed_row(
            row,
            field,
            format!("is not a valid resource id: '{id}'"),
        ));
    }
    Ok(id)
}

fn parse_value(row: usize, text: &str) -> BridgeResult<f64> {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(BridgeError::malformed_row(
            row,
            "value",
            format!("is not a valid number: '{text}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lee() -> PatientRecord {
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

    fn heart_rate() -> ObservationRecord {
        ObservationRecord {
            id: "obs-1".into(),
            patient_id: "42".into(),
            code_system: "http://loinc.org".into(),
            code: "8867-4".into(),
            display: "Heart rate".into(),
            value: "72.5".into(),
            unit: "beats/min".into(),
            observation_date: "2024-03-05".into(),
        }
    }

    #[test]
    fn maps_patient_structure() {
        let patient = map_patient(1, &lee()).expect("valid row");

        assert_eq!(patient.id.as_str(), "1");
        assert_eq!(patient.name.len(), 1);
        assert_eq!(patient.name[0].family.as_deref(), Some("Lee"));
        assert_eq!(patient.name[0].given, vec!["Ana"]);
        assert_eq!(patient.telecom.len(), 1);
        assert_eq!(patient.telecom[0].system, Some(ContactPointSystem::Phone));
        assert_eq!(patient.telecom[0].value.as_deref(), Some("555-1234"));
        assert_eq!(patient.gender, Some(AdministrativeGender::Female));
        assert_eq!(patient.birth_date_text(), "1980-01-01");
        assert_eq!(patient.address[0].line, vec!["1 Main St"]);
    }

    #[test]
    fn blank_optional_cells_still_build_substructures() {
        let row = PatientRecord {
            id: "2".into(),
            family_name: "Kim".into(),
            given_name: "Jo".into(),
            ..Default::default()
        };
        let patient = map_patient(1, &row).expect("valid row");

        assert_eq!(patient.telecom[0].value.as_deref(), Some(""));
        assert_eq!(patient.address[0].line, vec![""]);
        assert_eq!(patient.address[0].city.as_deref(), Some(""));
        assert!(patient.gender.is_none());
        assert!(patient.birth_date.is_none());
    }

    #[test]
    fn missing_required_field_names_row_and_field() {
        let rows = vec![lee(), PatientRecord {
            given_name: String::new(),
            ..lee()
        }];
        let err = map_patients(&rows).expect_err("second row lacks given name");
        match err {
            BridgeError::MalformedRow { row, field, .. } => {
                assert_eq!(row, 2);
                assert_eq!(field, "given_name");
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_gender_and_bad_birth_date() {
        let err = map_patient(1, &PatientRecord { gender: "F".into(), ..lee() })
            .expect_err("unknown gender");
        assert!(matches!(err, BridgeError::MalformedRow { field: "gender", .. }));

        let err = map_patient(1, &PatientRecord { birth_date: "01/01/1980".into(), ..lee() })
            .expect_err("bad date");
        assert!(matches!(err, BridgeError::MalformedRow { field: "birth_date", .. }));
    }

    #[test]
    fn birth_date_must_be_zero_padded_and_unsigned() {
        for bad in ["1980-1-1", "+1980-01-01"] {
            let rows = [PatientRecord { birth_date: bad.into(), ..lee() }];
            let err = map_patients(&rows).expect_err("not YYYY-MM-DD");
            assert!(
                matches!(err, BridgeError::MalformedRow { row: 1, field: "birth_date", .. }),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn rejects_ids_that_cannot_be_resource_ids() {
        let err = map_patient(3, &PatientRecord { id: "a b".into(), ..lee() })
            .expect_err("space in id");
        assert!(err.to_string().contains("malformed row 3: field 'id'"));
    }

    #[test]
    fn maps_observation_structure() {
        let obs = map_observation(1, &heart_rate()).expect("valid row");

        assert_eq!(obs.status, ObservationStatus::Final);
        assert_eq!(obs.code.text.as_deref(), Some("Heart rate"));
        assert_eq!(obs.code.coding[0].display.as_deref(), Some("Heart rate"));
        assert_eq!(
            obs.subject.as_ref().and_then(|s| s.reference.as_deref()),
            Some("Patient/42")
        );
        let quantity = obs.value_quantity.as_ref().expect("quantity");
        assert_eq!(quantity.value, Some(72.5));
        assert_eq!(quantity.unit.as_deref(), Some("beats/min"));
        assert_eq!(quantity.code.as_deref(), Some("beats/min"));
        assert_eq!(quantity.system.as_deref(), Some(UNITS_OF_MEASURE_SYSTEM));
    }

    #[test]
    fn non_numeric_value_is_malformed() {
        for bad in ["seventy", "NaN", "inf"] {
            let row = ObservationRecord {
                value: bad.into(),
                ..heart_rate()
            };
            let err = map_observations(&[row]).expect_err("not a number");
            assert!(matches!(err, BridgeError::MalformedRow { row: 1, field: "value", .. }));
        }
    }

    #[test]
    fn blank_value_maps_to_absent_number() {
        let row = ObservationRecord {
            value: String::new(),
            ..heart_rate()
        };
        let obs = map_observation(1, &row).expect("valid row");
        assert_eq!(obs.value_quantity.and_then(|q| q.value), None);
    }

    #[test]
    fn observation_requires_patient_and_code() {
        let err = map_observation(1, &ObservationRecord { patient_id: " ".into(), ..heart_rate() })
            .expect_err("no patient");
        assert!(matches!(err, BridgeError::MalformedRow { field: "patient_id", .. }));

        let err = map_observation(1, &ObservationRecord { code: String::new(), ..heart_rate() })
            .expect_err("no code");
        assert!(matches!(err, BridgeError::MalformedRow { field: "code", .. }));
    }

    #[test]
    fn rejects_unreadable_observation_date() {
        let row = ObservationRecord {
            observation_date: "last week".into(),
            ..heart_rate()
        };
        let err = map_observation(1, &row).expect_err("bad date");
        assert!(matches!(err, BridgeError::MalformedRow { field: "observation_date", .. }));

        let row = ObservationRecord {
            observation_date: "2024-3-5".into(),
            ..heart_rate()
        };
        let err = map_observation(1, &row).expect_err("unpadded date");
        assert!(matches!(err, BridgeError::MalformedRow { field: "observation_date", .. }));
    }
}
