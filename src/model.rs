//! Data model for scanned sources and parsed annotations.

use serde::Serialize;
use std::path::PathBuf;

/// Kind of syntactic unit a docstring can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Module,
    Class,
    Function,
}

/// A module, class or function found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub kind: UnitKind,
    /// Module name (file stem) or definition identifier
    pub name: String,
    /// Path relative to the scan root
    pub file_path: PathBuf,
    /// 1-based line where the unit starts
    pub line: usize,
    /// Cleaned docstring, if the unit has one
    pub docstring: Option<String>,
}

/// All units extracted from one source file, in source order.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub units: Vec<SourceUnit>,
}

/// The six-field maturity breakdown nested in every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaturityDetails {
    pub api_stability: String,
    pub implementation_completeness: String,
    pub unit_test_coverage: String,
    pub integration_infrastructure_test_coverage: String,
    pub documentation_completeness: String,
    pub bug_risk: String,
}

/// One feature-maturity record parsed out of a docstring.
///
/// Field order here is the key order of the emitted JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationRecord {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub short_description: String,
    pub description: String,
    pub how_to_guide_url: String,
    pub maturity: String,
    pub maturity_details: MaturityDetails,
}
