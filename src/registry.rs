//! Annotation registry: every record found in a source tree, keyed by id.

use crate::annotation::AnnotationParser;
use crate::config::{ParseErrorPolicy, ScanOptions};
use crate::error::{Error, Result};
use crate::model::{AnnotationRecord, SourceUnit};
use crate::scanner::SourceTree;
use serde::Serialize;
use std::collections::BTreeMap;

/// Records by id. Later inserts replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnnotationRegistry {
    records: BTreeMap<String, AnnotationRecord>,
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the one it replaced.
    pub fn insert(&mut self, record: AnnotationRecord) -> Option<AnnotationRecord> {
        self.records.insert(record.id.clone(), record)
    }

    pub fn get(&self, id: &str) -> Option<&AnnotationRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse a unit's docstring and insert every record it holds.
    ///
    /// Returns how many records the docstring contained.
    pub fn add_unit(&mut self, unit: &SourceUnit, parser: &AnnotationParser) -> usize {
        let Some(docstring) = unit.docstring.as_deref() else {
            return 0;
        };

        let records = parser.parse(docstring);
        let count = records.len();
        for record in records {
            if let Some(previous) = self.insert(record) {
                tracing::debug!(
                    id = %previous.id,
                    file = %unit.file_path.display(),
                    unit = %unit.name,
                    "annotation overwritten"
                );
            }
        }
        count
    }
}

/// Scan every file of `tree` and collect its annotations.
///
/// Files are visited in the tree's path order, so for a duplicated id the
/// lexicographically last file wins.
pub fn build_registry(tree: &SourceTree, options: &ScanOptions) -> Result<AnnotationRegistry> {
    let parser = options.annotation_parser();
    let mut registry = AnnotationRegistry::new();

    for parsed in tree.files() {
        let file = match parsed {
            Ok(file) => file,
            Err(err @ Error::Parse { .. }) if options.on_parse_error == ParseErrorPolicy::Skip => {
                tracing::warn!(%err, "skipping unparseable file");
                continue;
            }
            Err(err) => return Err(err),
        };

        let found: usize = file
            .units
            .iter()
            .map(|unit| registry.add_unit(unit, &parser))
            .sum();
        if found > 0 {
            tracing::info!(file = %file.path.display(), annotations = found, "collected annotations");
        }
    }

    Ok(registry)
}
