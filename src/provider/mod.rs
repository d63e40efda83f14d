//! Translation provider - parses Maki analysis results into an ordered
//! macro -> translation mapping
//!
//! This module is the boundary to the upstream analysis stage. It reads a
//! results file (a JSON array of entries tagged by `Kind`), reassembles the
//! macro map the analysis saw, and decides which macros can be replaced by
//! ordinary C declarations. The patch engine consumes the resulting
//! [`TranslationMap`] as an opaque, fully-materialized mapping.

pub mod schema;
mod translate;

pub use schema::{AnalysisEntry, IncludeRecord, InspectedRecord, InvocationRecord, Macro};
pub use translate::{interface_equivalent_translations, TranslationEntry, TranslationMap};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The reassembled output of one analysis run: macros in definition order,
/// each with its recorded invocations, plus the set of names the
/// preprocessor inspected.
#[derive(Debug, Default)]
pub struct AnalysisData {
    macros: Vec<(Macro, Vec<InvocationRecord>)>,
    inspected_names: HashSet<String>,
}

impl AnalysisData {
    /// Macros in the order their definitions appeared in the results file.
    pub fn macros(&self) -> &[(Macro, Vec<InvocationRecord>)] {
        &self.macros
    }

    /// Whether the preprocessor inspected `name` (e.g. via `#ifdef`).
    pub fn is_inspected(&self, name: &str) -> bool {
        self.inspected_names.contains(name)
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to read analysis results from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse analysis results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invocation of '{name}' references unknown definition location {location}")]
    UnknownDefinition { name: String, location: String },
}

/// Parse a results file from disk.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<AnalysisData, ProviderError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ProviderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

/// Parse results from a string.
///
/// Definitions are keyed by their full identity, so a repeated definition
/// entry folds into one macro. Invocations attach to the macro most
/// recently defined at their `DefinitionLocation`; invocations of compiler
/// built-ins carry no valid location and are dropped. Two invocations may
/// report the same location when one expansion nests inside another, so
/// each location is recorded once per macro.
pub fn load_from_str(input: &str) -> Result<AnalysisData, ProviderError> {
    let entries: Vec<AnalysisEntry> = serde_json::from_str(input)?;

    let mut macros: Vec<(Macro, Vec<InvocationRecord>)> = Vec::new();
    let mut by_identity: HashMap<Macro, usize> = HashMap::new();
    let mut by_location: HashMap<String, usize> = HashMap::new();
    let mut inspected_names = HashSet::new();

    for entry in entries {
        match entry {
            AnalysisEntry::Definition(mac) => {
                let idx = match by_identity.get(&mac) {
                    Some(&idx) => idx,
                    None => {
                        let idx = macros.len();
                        by_identity.insert(mac.clone(), idx);
                        macros.push((mac.clone(), Vec::new()));
                        idx
                    }
                };
                if mac.is_definition_location_valid {
                    by_location.insert(mac.definition_location.clone(), idx);
                }
            }
            AnalysisEntry::Invocation(inv) => {
                if !inv.is_definition_location_valid {
                    continue;
                }
                let idx = by_location
                    .get(&inv.definition_location)
                    .copied()
                    .ok_or_else(|| ProviderError::UnknownDefinition {
                        name: inv.name.clone(),
                        location: inv.definition_location.clone(),
                    })?;
                let invocations = &mut macros[idx].1;
                if invocations
                    .iter()
                    .all(|seen| seen.invocation_location != inv.invocation_location)
                {
                    invocations.push(*inv);
                }
            }
            AnalysisEntry::InspectedByCpp(record) => {
                inspected_names.insert(record.name);
            }
            AnalysisEntry::Include(_) => {}
        }
    }

    Ok(AnalysisData {
        macros,
        inspected_names,
    })
}
