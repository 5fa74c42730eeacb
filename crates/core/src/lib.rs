//! # Bridge Core
//!
//! Mapping engine between flat patient/observation CSV rows and FHIR resources.
//!
//! This crate contains the data operations of the bridge:
//! - [`forward`]: CSV rows to typed `Patient` / `Observation` resources
//! - [`bundle`]: packaging resources into a `collection` bundle
//! - [`reverse`]: bundle entries back to CSV rows
//! - [`validation`]: running documents through a schema oracle and reporting
//! - [`io`] and [`service`]: reading and writing the files around those steps
//!
//! **No CLI concerns**: argument parsing, environment handling and printing belong in the
//! `fhir-bridge` binary.

pub mod bundle;
pub mod config;
pub mod constants;
pub mod error;
pub mod forward;
pub mod io;
pub mod records;
pub mod reverse;
pub mod service;
pub mod validation;

pub use bundle::assemble;
pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use forward::{map_observations, map_patients};
pub use records::{ObservationRecord, PatientRecord};
pub use reverse::{extract_observations, extract_patients, observations_to_rows, patients_to_rows};
pub use service::{ConversionService, ExportSummary, ToCsvSummary, ToFhirSummary};
pub use validation::{DocumentSource, ValidationReport, ValidationRunner};
