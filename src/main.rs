mod cli;

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bridge_core::config::{csv_delimiter_from_env_value, flag_from_env_value};
use bridge_core::constants::{OBSERVATIONS_OUTPUT_FILENAME, PATIENTS_OUTPUT_FILENAME};
use bridge_core::{BridgeConfig, ConversionService, ValidationReport};
use cli::{Cli, Commands};

/// Main entry point for the fhir-bridge command line tool
///
/// Resolves configuration from the environment once, then runs a single conversion
/// subcommand. Any error is printed to stderr and the process exits with status 1.
///
/// # Environment Variables
/// - `FHIR_BRIDGE_CSV_DELIMITER`: CSV field delimiter (default: ",", "tab" for a tab)
/// - `FHIR_BRIDGE_PRETTY_JSON`: Pretty-print written JSON (default: "true")
/// - `FHIR_BRIDGE_PATIENTS_OUTPUT`: Patient CSV name for `to-csv` (default: "patients_output.csv")
/// - `FHIR_BRIDGE_OBSERVATIONS_OUTPUT`: Observation CSV name for `to-csv` (default: "observations_output.csv")
/// - `RUST_LOG`: Log filter (default: "fhir_bridge=info,bridge_core=info")
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fhir_bridge=info".parse()?)
                .add_directive("bridge_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let service = ConversionService::new(Arc::new(config_from_env()?));

    match cli.command {
        Commands::ToFhir {
            patients,
            observations,
            output,
        } => {
            if patients.is_none() && observations.is_none() {
                tracing::warn!("no CSV inputs given; writing an empty bundle");
            }

            let summary =
                service.to_fhir(patients.as_deref(), observations.as_deref(), &output)?;

            if patients.is_some() {
                println!("Converted {} patient records", summary.patients);
            }
            if observations.is_some() {
                println!("Converted {} observation records", summary.observations);
            }
            println!(
                "Created a Bundle with {} entries and saved to {}",
                summary.entries,
                output.display()
            );
        }
        Commands::Validate { file, kind } => {
            let report = service.validate(&file, kind.into());
            print_report(&report);
        }
        Commands::ToCsv { bundle, output_dir } => {
            let summary = service.to_csv(&bundle, &output_dir)?;
            println!(
                "Converted {} patient records to {}",
                summary.patients,
                summary.patients_path.display()
            );
            println!(
                "Converted {} observation records to {}",
                summary.observations,
                summary.observations_path.display()
            );
        }
        Commands::Export {
            patients,
            observations,
            output_dir,
        } => {
            let summary = service.export_resources(
                patients.as_deref(),
                observations.as_deref(),
                &output_dir,
            )?;
            if let Some((count, path)) = summary.patients {
                println!("Saved {count} Patient resources to {}", path.display());
            }
            if let Some((count, path)) = summary.observations {
                println!("Saved {count} Observation resources to {}", path.display());
            }
        }
    }

    Ok(())
}

fn config_from_env() -> anyhow::Result<BridgeConfig> {
    let delimiter = csv_delimiter_from_env_value(std::env::var("FHIR_BRIDGE_CSV_DELIMITER").ok())?;
    let pretty_json = flag_from_env_value(std::env::var("FHIR_BRIDGE_PRETTY_JSON").ok(), true)?;
    let patients_output = std::env::var("FHIR_BRIDGE_PATIENTS_OUTPUT")
        .unwrap_or_else(|_| PATIENTS_OUTPUT_FILENAME.into());
    let observations_output = std::env::var("FHIR_BRIDGE_OBSERVATIONS_OUTPUT")
        .unwrap_or_else(|_| OBSERVATIONS_OUTPUT_FILENAME.into());

    Ok(BridgeConfig::new(
        delimiter,
        patients_output,
        observations_output,
        pretty_json,
    )?)
}

fn print_report(report: &ValidationReport) {
    println!("Validation results:");
    println!("- Valid resources: {}", report.valid_count);
    println!("- Error resources: {}", report.error_count);

    if !report.error_messages.is_empty() {
        println!("\nErrors:");
        for message in &report.error_messages {
            println!("  * {message}");
        }
    }
}
