//! Source scanner: find Python files under a root and parse them one by one.
//!
//! Listing is separate from parsing so the parse step can be driven from
//! literal text in tests.

pub mod python;

use crate::error::{Error, Result};
use crate::model::ParsedFile;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions recognized as source files.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["py"];

/// A source root and the files found beneath it, in lexicographic order.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl SourceTree {
    /// List the source files under `root`. Nothing is parsed yet.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let files = list_source_files(&root)?;
        tracing::info!(root = %root.display(), files = files.len(), "listed source files");
        Ok(Self { root, files })
    }

    /// Read and parse each file lazily, one per iteration step.
    pub fn files(&self) -> impl Iterator<Item = Result<ParsedFile>> + '_ {
        self.files.iter().map(move |path| {
            let relative = self.relative(path);
            tracing::info!(file = %relative.display(), "parsing file");
            let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            python::parse_source(&relative, &source)
        })
    }

    fn relative(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            // Root is the file itself
            _ => path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.to_path_buf()),
        }
    }
}

/// Recursively collect source files under `root`, sorted by path.
///
/// Non-source files are logged and skipped. Sorting makes the scan order,
/// and so the winner among duplicate annotation ids, deterministic.
pub fn list_source_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(Error::MissingRoot(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if is_source_file(path) {
            files.push(path.to_path_buf());
        } else {
            tracing::info!(file = %path.display(), "skipping non-source file");
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}
