//! Property-based tests for the forward/reverse mapping.
//!
//! Properties verified:
//! 1. **Identity**: a fully-populated row survives map → assemble → JSON → extract → row
//! 2. **Order**: bundle entry order and extraction order follow input row order
//!
//! ```bash
//! cargo test -p bridge-core --test round_trip_properties
//! PROPTEST_CASES=10000 cargo test -p bridge-core --test round_trip_properties
//! ```

use bridge_core::{
    assemble, extract_observations, extract_patients, map_observations, map_patients,
    observations_to_rows, patients_to_rows, ObservationRecord, PatientRecord,
};
use fhir::{Bundle, BundleData};
use proptest::prelude::*;

// =============================================================================
// Test Strategies
// =============================================================================

fn resource_id() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9.\\-]{0,15}"
}

fn name_part() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,12}"
}

fn free_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ,.\\-]{1,24}"
}

fn gender() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["male", "female", "other", "unknown"]).prop_map(String::from)
}

fn iso_date() -> impl Strategy<Value = String> {
    (1900i32..2030, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}"))
}

/// Decimal strings that print back identically after a trip through `f64`.
fn decimal() -> impl Strategy<Value = String> {
    (0u32..100_000, 0u32..10).prop_map(|(whole, tenth)| {
        if tenth == 0 {
            whole.to_string()
        } else {
            format!("{whole}.{tenth}")
        }
    })
}

fn patient_record() -> impl Strategy<Value = PatientRecord> {
    (
        resource_id(),
        name_part(),
        name_part(),
        gender(),
        iso_date(),
        free_text(),
        free_text(),
        "[A-Z]{2}",
        "[0-9]{3}-[0-9]{4}",
    )
        .prop_map(
            |(id, family_name, given_name, gender, birth_date, address, city, country, phone)| {
                PatientRecord {
                    id,
                    family_name,
                    given_name,
                    gender,
                    birth_date,
                    address,
                    city,
                    country,
                    phone,
                }
            },
        )
}

fn observation_record() -> impl Strategy<Value = ObservationRecord> {
    (
        resource_id(),
        resource_id(),
        "http://[a-z]{3,10}\\.org",
        "[0-9]{1,5}-[0-9]",
        free_text(),
        decimal(),
        "[A-Za-z/%]{1,8}",
        iso_date(),
    )
        .prop_map(
            |(id, patient_id, code_system, code, display, value, unit, observation_date)| {
                ObservationRecord {
                    id,
                    patient_id,
                    code_system,
                    code,
                    display,
                    value,
                    unit,
                    observation_date,
                }
            },
        )
}

/// Serialise and re-check the bundle so the wire format is part of every round trip.
fn through_json(bundle: &BundleData) -> BundleData {
    let value = Bundle::to_value(bundle).expect("bundle renders");
    Bundle::from_value(&value).expect("rendered bundle conforms")
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn patient_row_round_trips(row in patient_record()) {
        let patients = map_patients(std::slice::from_ref(&row)).expect("fully populated row maps");
        let bundle = through_json(&assemble(&patients, &[]));
        let rows = patients_to_rows(&extract_patients(&bundle));
        prop_assert_eq!(rows, vec![row]);
    }

    #[test]
    fn observation_row_round_trips(row in observation_record()) {
        let observations = map_observations(std::slice::from_ref(&row)).expect("fully populated row maps");
        let bundle = through_json(&assemble(&[], &observations));
        let rows = observations_to_rows(&extract_observations(&bundle));
        prop_assert_eq!(rows, vec![row]);
    }

    #[test]
    fn bundle_order_follows_row_order(rows in prop::collection::vec(patient_record(), 0..20)) {
        let rows: Vec<PatientRecord> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| PatientRecord { id: format!("p{i}"), ..row })
            .collect();

        let bundle = assemble(&map_patients(&rows).expect("rows map"), &[]);
        let locators: Vec<String> = bundle.entries.iter().map(|e| e.locator().to_string()).collect();
        let expected: Vec<String> = rows.iter().map(|r| format!("Patient/{}", r.id)).collect();
        prop_assert_eq!(locators, expected);

        let recovered = patients_to_rows(&extract_patients(&through_json(&bundle)));
        prop_assert_eq!(recovered, rows);
    }
}
