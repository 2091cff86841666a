//! Error type for scanning, extraction and TOC merging.

use std::path::PathBuf;

/// Input errors that abort an invocation.
///
/// Missing annotations are not errors and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("source root does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to parse {}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("malformed TOC JSON in {}: {source}", path.display())]
    TocJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected TOC shape at {location}: {message}")]
    TocShape { location: String, message: String },

    #[error("failed to serialize output: {0}")]
    Render(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn toc_shape(location: impl Into<String>, message: impl Into<String>) -> Self {
        Error::TocShape {
            location: location.into(),
            message: message.into(),
        }
    }
}
