use serde::Deserialize;
use std::path::Path;

/// One entry of a Maki results file, discriminated by its `Kind` field.
///
/// A results file is a JSON array mixing definitions, invocations, and
/// preprocessor facts in the order the analysis encountered them. Fields
/// this crate does not consume are ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "Kind")]
pub enum AnalysisEntry {
    Definition(Macro),
    Invocation(Box<InvocationRecord>),
    #[serde(rename = "InspectedByCPP")]
    InspectedByCpp(InspectedRecord),
    Include(IncludeRecord),
}

/// A macro definition as recorded by the analysis.
///
/// Identity for mapping purposes is the definition location: no two
/// distinct macros share a span in the same file.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub struct Macro {
    pub name: String,
    pub is_object_like: bool,
    /// False for compiler built-ins and command-line definitions, which
    /// have no file to patch
    pub is_definition_location_valid: bool,
    /// Macro body text, verbatim
    pub body: String,
    /// `path:line:col` of the definition's first line
    pub definition_location: String,
    /// `path:line:col` of the definition's last line, inclusive
    pub end_definition_location: String,
}

impl Macro {
    pub fn is_function_like(&self) -> bool {
        !self.is_object_like
    }

    /// Whether the definition location names a file under `dir`.
    ///
    /// The comparison is lexical, on the path exactly as the analysis
    /// emitted it.
    pub fn defined_in(&self, dir: &Path) -> bool {
        let file = self
            .definition_location
            .split(':')
            .next()
            .unwrap_or_default();
        Path::new(file).starts_with(dir)
    }
}

/// A single expansion site of some macro.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationRecord {
    pub name: String,
    /// Ties the invocation back to its defining macro
    pub definition_location: String,
    pub is_definition_location_valid: bool,
    pub invocation_location: String,
    /// C type signature the expansion would have as a declaration,
    /// e.g. `int MAX(int a, int b)`; empty when the analysis could not
    /// type the expansion
    #[serde(default)]
    pub type_signature: String,
    /// True when the expansion is a complete top-level construct and not
    /// an argument to another macro
    #[serde(default)]
    pub is_top_level_non_argument: bool,
}

/// A macro name the preprocessor itself inspected (`#ifdef` and friends).
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InspectedRecord {
    pub name: String,
}

/// An `#include` directive seen during preprocessing. Parsed so results
/// files round-trip, but not needed to translate definitions.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct IncludeRecord {
    pub is_include_location_valid: bool,
    #[serde(default)]
    pub include_name: String,
}
