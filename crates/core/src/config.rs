//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! [`ConversionService`](crate::service::ConversionService). Library code never reads
//! environment variables itself; the binary reads them and hands the raw values to the
//! `*_from_env_value` helpers below.

use crate::constants::{
    DEFAULT_CSV_DELIMITER, OBSERVATIONS_OUTPUT_FILENAME, PATIENTS_OUTPUT_FILENAME,
};
use crate::{BridgeError, BridgeResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    csv_delimiter: u8,
    patients_output_filename: String,
    observations_output_filename: String,
    pretty_json: bool,
}

impl BridgeConfig {
    /// Create a new `BridgeConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidInput`] if the delimiter is a quote or line break, or
    /// if an output file name is empty or contains a path separator.
    pub fn new(
        csv_delimiter: u8,
        patients_output_filename: String,
        observations_output_filename: String,
        pretty_json: bool,
    ) -> BridgeResult<Self> {
        if matches!(csv_delimiter, b'"' | b'\n' | b'\r') || !csv_delimiter.is_ascii() {
            return Err(BridgeError::InvalidInput(format!(
                "CSV delimiter {:?} is not usable",
                csv_delimiter as char
            )));
        }

        for name in [&patients_output_filename, &observations_output_filename] {
            validate_output_filename(name)?;
        }

        Ok(Self {
            csv_delimiter,
            patients_output_filename,
            observations_output_filename,
            pretty_json,
        })
    }

    pub fn csv_delimiter(&self) -> u8 {
        self.csv_delimiter
    }

    pub fn patients_output_filename(&self) -> &str {
        &self.patients_output_filename
    }

    pub fn observations_output_filename(&self) -> &str {
        &self.observations_output_filename
    }

    pub fn pretty_json(&self) -> bool {
        self.pretty_json
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            csv_delimiter: DEFAULT_CSV_DELIMITER,
            patients_output_filename: PATIENTS_OUTPUT_FILENAME.to_string(),
            observations_output_filename: OBSERVATIONS_OUTPUT_FILENAME.to_string(),
            pretty_json: true,
        }
    }
}

fn validate_output_filename(name: &str) -> BridgeResult<()> {
    if name.trim().is_empty() {
        return Err(BridgeError::InvalidInput(
            "output file name cannot be empty".into(),
        ));
    }
    if name.contains(['/', '\\']) {
        return Err(BridgeError::InvalidInput(format!(
            "output file name '{name}' must not contain path separators"
        )));
    }
    Ok(())
}

/// Parse the CSV delimiter from an optional string value.
///
/// If `value` is `None` or empty, returns the default `,`. The words `tab`
/// and `\t` select a tab.
pub fn csv_delimiter_from_env_value(value: Option<String>) -> BridgeResult<u8> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Ok(DEFAULT_CSV_DELIMITER);
    };

    match value.as_str() {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
        v => Err(BridgeError::InvalidInput(format!(
            "CSV delimiter must be a single ASCII character, got '{v}'"
        ))),
    }
}

/// Parse a boolean flag from an optional string value, falling back to `default`.
pub fn flag_from_env_value(value: Option<String>, default: bool) -> BridgeResult<bool> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(BridgeError::InvalidInput(format!(
            "expected a boolean flag, got '{other}'"
        ))),
    }
}
