//! Constants used throughout the bridge core crate.
//!
//! File names and defaults live here so the CLI, the service and the tests agree.

/// Default CSV field delimiter.
pub const DEFAULT_CSV_DELIMITER: u8 = b',';

/// File name written by `to-csv` for recovered patient rows.
pub const PATIENTS_OUTPUT_FILENAME: &str = "patients_output.csv";

/// File name written by `to-csv` for recovered observation rows.
pub const OBSERVATIONS_OUTPUT_FILENAME: &str = "observations_output.csv";

/// File name for exported patient resources (JSON array).
pub const PATIENTS_JSON_FILENAME: &str = "patients.json";

/// File name for exported observation resources (JSON array).
pub const OBSERVATIONS_JSON_FILENAME: &str = "observations.json";

/// Column order of a patient CSV file.
pub const PATIENT_COLUMNS: [&str; 9] = [
    "id",
    "family_name",
    "given_name",
    "gender",
    "birth_date",
    "address",
    "city",
    "country",
    "phone",
];

/// Column order of an observation CSV file.
pub const OBSERVATION_COLUMNS: [&str; 8] = [
    "id",
    "patient_id",
    "code_system",
    "code",
    "display",
    "value",
    "unit",
    "observation_date",
];
