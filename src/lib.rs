//! maturity-toc: pull feature-maturity annotations out of Python docstrings
//! and merge them into the table of contents of a status grid.
//!
//! The pipeline runs in strict sequence:
//!
//! 1. [`scanner`] lists `.py` files under a root and parses their docstrings.
//! 2. [`annotation`] turns each docstring into records; [`registry`] keys them
//!    by id, later files overriding earlier ones.
//! 3. [`toc`] swaps matching TOC cases for the full records.

pub mod annotation;
pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod scanner;
pub mod toc;

pub use annotation::{AnnotationParser, DEFAULT_ICON_BASE_URL};
pub use config::{ParseErrorPolicy, ScanOptions};
pub use error::{Error, Result};
pub use model::{AnnotationRecord, MaturityDetails, ParsedFile, SourceUnit, UnitKind};
pub use registry::{build_registry, AnnotationRegistry};
pub use scanner::SourceTree;

use serde_json::Value;
use std::path::Path;

/// Collect the annotations under `root`.
pub fn scan_annotations(root: &Path, options: &ScanOptions) -> Result<AnnotationRegistry> {
    let tree = SourceTree::open(root)?;
    let registry = build_registry(&tree, options)?;
    tracing::info!(annotations = registry.len(), "scan complete");
    Ok(registry)
}

/// Scan `root`, then merge the result into the TOC stored at `toc_path`.
///
/// The registry is complete before the TOC is read, since any case may refer
/// to an id defined in any file.
pub fn build_annotations(root: &Path, toc_path: &Path, options: &ScanOptions) -> Result<Value> {
    let registry = scan_annotations(root, options)?;

    let mut toc = toc::load_toc(toc_path)?;
    let summary = toc::merge_toc(&mut toc, &registry)?;
    tracing::info!(
        cases = summary.cases,
        replaced = summary.replaced.len(),
        unmatched = summary.unmatched.len(),
        "merged annotations into TOC"
    );
    for id in &summary.unmatched {
        tracing::debug!(id = %id, "no annotation for TOC case");
    }

    Ok(toc)
}
