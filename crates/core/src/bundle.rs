//! Bundle assembly.
//!
//! Packages mapped resources into a single `collection` bundle: patients first in their
//! given order, then observations in theirs. Each entry's locator is derived from the
//! resource's own kind and id.

use fhir::{BundleData, BundleEntry, ObservationData, PatientData, Resource};
use std::collections::HashSet;

/// Assemble patients and observations into a collection bundle.
///
/// Duplicate locators are kept as-is. They are logged at `warn` level so that an operator
/// notices, but the bundle still contains one entry per input resource.
pub fn assemble(patients: &[PatientData], observations: &[ObservationData]) -> BundleData {
    let entries: Vec<BundleEntry> = patients
        .iter()
        .cloned()
        .map(Resource::Patient)
        .chain(observations.iter().cloned().map(Resource::Observation))
        .map(BundleEntry::new)
        .collect();

    warn_on_duplicate_locators(&entries);

    tracing::debug!(
        patients = patients.len(),
        observations = observations.len(),
        "assembled collection bundle"
    );

    BundleData::collection(entries)
}

fn warn_on_duplicate_locators(entries: &[BundleEntry]) {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.locator()) {
            tracing::warn!(locator = entry.locator(), "duplicate locator in bundle");
        }
    }
}
