//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use fhir::ResourceKind;
use std::path::PathBuf;

/// Convert patient and observation CSV files to FHIR resources and back.
#[derive(Parser, Debug)]
#[command(name = "fhir-bridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert CSV files to a FHIR collection bundle
    ToFhir {
        /// Patient CSV file
        #[arg(long)]
        patients: Option<PathBuf>,

        /// Observation CSV file
        #[arg(long)]
        observations: Option<PathBuf>,

        /// Output bundle JSON file
        #[arg(long)]
        output: PathBuf,
    },

    /// Validate FHIR resources in a JSON file
    Validate {
        /// JSON file holding an array of resources or a single bundle
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Resource type to validate against
        #[arg(long = "type", value_enum)]
        kind: KindArg,
    },

    /// Convert a FHIR bundle back to CSV files
    ToCsv {
        /// Bundle JSON file
        #[arg(value_name = "BUNDLE")]
        bundle: PathBuf,

        /// Directory for the output CSV files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Write patients and observations as separate JSON resource arrays
    Export {
        /// Patient CSV file
        #[arg(long)]
        patients: Option<PathBuf>,

        /// Observation CSV file
        #[arg(long)]
        observations: Option<PathBuf>,

        /// Directory for patients.json / observations.json
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

/// Resource type choices accepted by `validate --type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[value(name = "Patient")]
    Patient,
    #[value(name = "Observation")]
    Observation,
    #[value(name = "Bundle")]
    Bundle,
}

impl From<KindArg> for ResourceKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Patient => ResourceKind::Patient,
            KindArg::Observation => ResourceKind::Observation,
            KindArg::Bundle => ResourceKind::Bundle,
        }
    }
}
