//! File-level conversion workflows.
//!
//! [`ConversionService`] ties the pure mapping stages to the file system. Each method reads
//! its inputs, runs the mapping to completion and writes its outputs. No state is kept
//! between calls.

use crate::bundle::assemble;
use crate::config::BridgeConfig;
use crate::constants::{OBSERVATIONS_JSON_FILENAME, PATIENTS_JSON_FILENAME};
use crate::forward::{map_observations, map_patients};
use crate::io::{
    read_bundle_json, read_observation_csv, read_patient_csv, write_bundle_json,
    write_observation_csv, write_patient_csv, write_resources_json,
};
use crate::reverse::{extract_observations, extract_patients, observations_to_rows, patients_to_rows};
use crate::validation::{ValidationReport, ValidationRunner};
use crate::BridgeResult;
use fhir::{FhirSchema, ObservationData, PatientData, Resource, ResourceKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Counts reported after converting CSV input to a bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToFhirSummary {
    pub patients: usize,
    pub observations: usize,
    pub entries: usize,
}

/// Counts and paths reported after converting a bundle back to CSV.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToCsvSummary {
    pub patients: usize,
    pub patients_path: PathBuf,
    pub observations: usize,
    pub observations_path: PathBuf,
}

/// Paths written by [`ConversionService::export_resources`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    pub patients: Option<(usize, PathBuf)>,
    pub observations: Option<(usize, PathBuf)>,
}

/// Pure conversion operations over files.
#[derive(Clone, Debug)]
pub struct ConversionService {
    cfg: Arc<BridgeConfig>,
}

impl ConversionService {
    pub fn new(cfg: Arc<BridgeConfig>) -> Self {
        Self { cfg }
    }

    /// Convert patient and/or observation CSV files into one collection bundle.
    ///
    /// Either input may be omitted; the bundle is written regardless.
    ///
    /// # Errors
    ///
    /// Fails on unreadable input, a malformed row anywhere in either file, or an
    /// unwritable output path. Nothing is written when mapping fails.
    pub fn to_fhir(
        &self,
        patients_csv: Option<&Path>,
        observations_csv: Option<&Path>,
        output: &Path,
    ) -> BridgeResult<ToFhirSummary> {
        let (patients, observations) = self.map_inputs(patients_csv, observations_csv)?;

        let bundle = assemble(&patients, &observations);
        write_bundle_json(output, &bundle, self.cfg.pretty_json())?;

        tracing::info!(
            patients = patients.len(),
            observations = observations.len(),
            entries = bundle.len(),
            output = %output.display(),
            "wrote bundle"
        );

        Ok(ToFhirSummary {
            patients: patients.len(),
            observations: observations.len(),
            entries: bundle.len(),
        })
    }

    /// Convert a bundle file back to patient and observation CSV files in `output_dir`.
    pub fn to_csv(&self, bundle_path: &Path, output_dir: &Path) -> BridgeResult<ToCsvSummary> {
        let bundle = read_bundle_json(bundle_path)?;

        let patient_rows = patients_to_rows(&extract_patients(&bundle));
        let observation_rows = observations_to_rows(&extract_observations(&bundle));

        let patients_path = output_dir.join(self.cfg.patients_output_filename());
        let observations_path = output_dir.join(self.cfg.observations_output_filename());

        let delimiter = self.cfg.csv_delimiter();
        let patients = write_patient_csv(&patients_path, &patient_rows, delimiter)?;
        let observations = write_observation_csv(&observations_path, &observation_rows, delimiter)?;

        tracing::info!(patients, observations, bundle = %bundle_path.display(), "recovered rows");

        Ok(ToCsvSummary {
            patients,
            patients_path,
            observations,
            observations_path,
        })
    }

    /// Write per-kind JSON arrays of resources for later list validation.
    pub fn export_resources(
        &self,
        patients_csv: Option<&Path>,
        observations_csv: Option<&Path>,
        output_dir: &Path,
    ) -> BridgeResult<ExportSummary> {
        let (patients, observations) = self.map_inputs(patients_csv, observations_csv)?;
        let pretty = self.cfg.pretty_json();

        let patients = match patients_csv {
            Some(_) => {
                let path = output_dir.join(PATIENTS_JSON_FILENAME);
                let resources: Vec<Resource> = patients.into_iter().map(Resource::from).collect();
                Some((write_resources_json(&path, &resources, pretty)?, path))
            }
            None => None,
        };

        let observations = match observations_csv {
            Some(_) => {
                let path = output_dir.join(OBSERVATIONS_JSON_FILENAME);
                let resources: Vec<Resource> =
                    observations.into_iter().map(Resource::from).collect();
                Some((write_resources_json(&path, &resources, pretty)?, path))
            }
            None => None,
        };

        Ok(ExportSummary {
            patients,
            observations,
        })
    }

    /// Validate a JSON file against the FHIR schema.
    pub fn validate(&self, path: &Path, kind: ResourceKind) -> ValidationReport {
        ValidationRunner::new(FhirSchema).validate_file(path, kind)
    }

    fn map_inputs(
        &self,
        patients_csv: Option<&Path>,
        observations_csv: Option<&Path>,
    ) -> BridgeResult<(Vec<PatientData>, Vec<ObservationData>)> {
        let delimiter = self.cfg.csv_delimiter();

        let patients = match patients_csv {
            Some(path) => map_patients(&read_patient_csv(path, delimiter)?)?,
            None => Vec::new(),
        };
        let observations = match observations_csv {
            Some(path) => map_observations(&read_observation_csv(path, delimiter)?)?,
            None => Vec::new(),
        };

        Ok((patients, observations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BridgeError;
    use std::fs;
    use tempfile::TempDir;

    const PATIENTS: &str = "id,family_name,given_name,gender,birth_date,address,city,country,phone\n\
        1,Lee,Ana,female,1980-01-01,1 Main St,Springfield,US,555-1234\n\
        2,Kim,Jo,male,1975-06-30,2 High St,Shelbyville,US,\n";

    const OBSERVATIONS: &str = "id,patient_id,code_system,code,display,value,unit,observation_date\n\
        o1,1,http://loinc.org,8867-4,Heart rate,72,beats/min,2024-03-05\n";

    fn service() -> ConversionService {
        ConversionService::new(Arc::new(BridgeConfig::default()))
    }

    fn write_inputs(dir: &TempDir) -> (PathBuf, PathBuf) {
        let patients = dir.path().join("patients.csv");
        let observations = dir.path().join("observations.csv");
        fs::write(&patients, PATIENTS).expect("write patients");
        fs::write(&observations, OBSERVATIONS).expect("write observations");
        (patients, observations)
    }

    #[test]
    fn to_fhir_then_to_csv_reproduces_input() {
        let dir = TempDir::new().expect("tempdir");
        let (patients, observations) = write_inputs(&dir);
        let bundle = dir.path().join("bundle.json");

        let summary = service()
            .to_fhir(Some(&patients), Some(&observations), &bundle)
            .expect("to_fhir");
        assert_eq!(
            summary,
            ToFhirSummary {
                patients: 2,
                observations: 1,
                entries: 3
            }
        );

        let out = dir.path().join("out");
        fs::create_dir(&out).expect("mkdir");
        let summary = service().to_csv(&bundle, &out).expect("to_csv");
        assert_eq!(summary.patients, 2);
        assert_eq!(summary.observations, 1);

        assert_eq!(fs::read_to_string(summary.patients_path).unwrap(), PATIENTS);
        assert_eq!(fs::read_to_string(summary.observations_path).unwrap(), OBSERVATIONS);
    }

    #[test]
    fn to_fhir_accepts_a_single_input() {
        let dir = TempDir::new().expect("tempdir");
        let (_, observations) = write_inputs(&dir);
        let bundle = dir.path().join("bundle.json");

        let summary = service()
            .to_fhir(None, Some(&observations), &bundle)
            .expect("to_fhir");
        assert_eq!(summary.patients, 0);
        assert_eq!(summary.entries, 1);
    }

    #[test]
    fn malformed_row_writes_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let patients = dir.path().join("patients.csv");
        fs::write(&patients, "id,family_name,given_name\n1,Lee,\n").expect("write");
        let bundle = dir.path().join("bundle.json");

        let err = service()
            .to_fhir(Some(&patients), None, &bundle)
            .expect_err("missing given name");
        assert!(matches!(err, BridgeError::MalformedRow { row: 1, field: "given_name", .. }));
        assert!(!bundle.exists());
    }

    #[test]
    fn written_bundle_validates() {
        let dir = TempDir::new().expect("tempdir");
        let (patients, observations) = write_inputs(&dir);
        let bundle = dir.path().join("bundle.json");
        service()
            .to_fhir(Some(&patients), Some(&observations), &bundle)
            .expect("to_fhir");

        let report = service().validate(&bundle, ResourceKind::Bundle);
        assert_eq!(report.valid_count, 1);
        assert!(report.is_valid());
    }

    #[test]
    fn exported_resources_validate_as_lists() {
        let dir = TempDir::new().expect("tempdir");
        let (patients, observations) = write_inputs(&dir);

        let summary = service()
            .export_resources(Some(&patients), Some(&observations), dir.path())
            .expect("export");
        let (count, path) = summary.patients.expect("patients exported");
        assert_eq!(count, 2);

        let report = service().validate(&path, ResourceKind::Patient);
        assert_eq!((report.valid_count, report.error_count), (2, 0));

        let (_, path) = summary.observations.expect("observations exported");
        let report = service().validate(&path, ResourceKind::Observation);
        assert_eq!((report.valid_count, report.error_count), (1, 0));
    }
}
