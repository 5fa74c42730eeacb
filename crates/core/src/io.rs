//! CSV and JSON file I/O.
//!
//! CSV files carry a header row whose names match the record fields exactly. Output files
//! always get a header, even when there are no rows. JSON output is canonical FHIR JSON,
//! optionally pretty-printed.

use crate::constants::{OBSERVATION_COLUMNS, PATIENT_COLUMNS};
use crate::records::{ObservationRecord, PatientRecord};
use crate::{BridgeError, BridgeResult};
use fhir::{Bundle, BundleData, FhirResult, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn read_patient_csv(path: &Path, delimiter: u8) -> BridgeResult<Vec<PatientRecord>> {
    read_csv(path, delimiter)
}

pub fn read_observation_csv(path: &Path, delimiter: u8) -> BridgeResult<Vec<ObservationRecord>> {
    read_csv(path, delimiter)
}

/// Write patient rows, returning the number of rows written.
pub fn write_patient_csv(path: &Path, rows: &[PatientRecord], delimiter: u8) -> BridgeResult<usize> {
    write_csv(path, &PATIENT_COLUMNS, rows, delimiter)
}

/// Write observation rows, returning the number of rows written.
pub fn write_observation_csv(
    path: &Path,
    rows: &[ObservationRecord],
    delimiter: u8,
) -> BridgeResult<usize> {
    write_csv(path, &OBSERVATION_COLUMNS, rows, delimiter)
}

fn read_csv<T: DeserializeOwned>(path: &Path, delimiter: u8) -> BridgeResult<Vec<T>> {
    let file = File::open(path).map_err(|e| BridgeError::file_access(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(file);

    let rows = reader.deserialize().collect::<Result<Vec<T>, csv::Error>>()?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "read CSV");
    Ok(rows)
}

fn write_csv<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: &[T],
    delimiter: u8,
) -> BridgeResult<usize> {
    let file = File::create(path).map_err(|e| BridgeError::file_access(path, e))?;

    // Header is written explicitly so that an empty batch still yields a usable file.
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(file);

    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| BridgeError::file_access(path, e))?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "wrote CSV");
    Ok(rows.len())
}

/// Write resources as a JSON array, returning the number written.
pub fn write_resources_json(path: &Path, resources: &[Resource], pretty: bool) -> BridgeResult<usize> {
    let values = resources
        .iter()
        .map(Resource::to_value)
        .collect::<FhirResult<Vec<_>>>()?;
    write_json(path, &Value::Array(values), pretty)?;
    Ok(resources.len())
}

pub fn write_bundle_json(path: &Path, bundle: &BundleData, pretty: bool) -> BridgeResult<()> {
    let value = Bundle::to_value(bundle)?;
    write_json(path, &value, pretty)
}

/// Read a bundle file and check it against the bundle schema.
///
/// # Errors
///
/// - [`BridgeError::FileAccess`] if the file cannot be read
/// - [`BridgeError::Json`] if it is not JSON
/// - [`BridgeError::MalformedDocument`] if it is not a conforming bundle
pub fn read_bundle_json(path: &Path) -> BridgeResult<BundleData> {
    let text = std::fs::read_to_string(path).map_err(|e| BridgeError::file_access(path, e))?;
    let value: Value = serde_json::from_str(&text)?;
    Bundle::from_value(&value).map_err(|violations| {
        BridgeError::MalformedDocument(format!("{}: {violations}", path.display()))
    })
}

fn write_json(path: &Path, value: &Value, pretty: bool) -> BridgeResult<()> {
    let file = File::create(path).map_err(|e| BridgeError::file_access(path, e))?;
    let mut writer = BufWriter::new(file);

    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| BridgeError::file_access(path, e))?;

    tracing::debug!(path = %path.display(), "wrote JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn lee() -> PatientRecord {
        PatientRecord {
            id: "1".into(),
            family_name: "Lee".into(),
            given_name: "Ana".into(),
            gender: "female".into(),
            birth_date: "1980-01-01".into(),
            address: "1 Main St, Apt 2".into(),
            city: "Springfield".into(),
            country: "US".into(),
            phone: "555-1234".into(),
        }
    }

    #[test]
    fn reads_patient_csv_by_header_name() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("patients.csv");
        fs::write(
            &path,
            "phone,id,family_name,given_name\n555-1234,1,Lee,Ana\n,2,Kim,Jo\n",
        )
        .expect("write csv");

        let rows = read_patient_csv(&path, b',').expect("read csv");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[0].phone, "555-1234");
        assert_eq!(rows[1].family_name, "Kim");
        assert_eq!(rows[1].city, "");
    }

    #[test]
    fn patient_csv_round_trips_with_quoting() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("out.csv");

        let written = write_patient_csv(&path, &[lee()], b',').expect("write");
        assert_eq!(written, 1);

        let text = fs::read_to_string(&path).expect("read back");
        assert!(text.starts_with(
            "id,family_name,given_name,gender,birth_date,address,city,country,phone\n"
        ));
        assert!(text.contains("\"1 Main St, Apt 2\""));

        let rows = read_patient_csv(&path, b',').expect("reparse");
        assert_eq!(rows, vec![lee()]);
    }

    #[test]
    fn empty_observation_csv_still_has_header() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("obs.csv");

        write_observation_csv(&path, &[], b';').expect("write");
        let text = fs::read_to_string(&path).expect("read back");
        assert_eq!(
            text,
            "id;patient_id;code_system;code;display;value;unit;observation_date\n"
        );
    }

    #[test]
    fn missing_csv_is_a_file_access_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = read_observation_csv(&dir.path().join("nope.csv"), b',').expect_err("missing");
        assert!(matches!(err, BridgeError::FileAccess { .. }));
    }

    #[test]
    fn bundle_json_round_trips() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("bundle.json");

        let patients = crate::forward::map_patients(&[lee()]).expect("valid");
        let bundle = crate::bundle::assemble(&patients, &[]);
        write_bundle_json(&path, &bundle, true).expect("write");

        let reread = read_bundle_json(&path).expect("read");
        assert_eq!(reread, bundle);
    }

    #[test]
    fn nonconforming_bundle_is_malformed_document() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("bundle.json");
        fs::write(&path, r#"{"resourceType": "Bundle", "type": "stack"}"#).expect("write");

        let err = read_bundle_json(&path).expect_err("bad bundle");
        assert!(matches!(err, BridgeError::MalformedDocument(msg) if msg.contains("stack")));
    }

    #[test]
    fn resources_json_is_an_array() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("patients.json");

        let patients = crate::forward::map_patients(&[lee()]).expect("valid");
        let resources: Vec<Resource> = patients.into_iter().map(Resource::from).collect();
        let count = write_resources_json(&path, &resources, false).expect("write");
        assert_eq!(count, 1);

        let value: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(value[0]["resourceType"], "Patient");
        assert_eq!(value[0]["name"][0]["family"], "Lee");
    }
}
