//! Scan configuration.

use crate::annotation::{AnnotationParser, DEFAULT_ICON_BASE_URL};

/// What to do when a source file fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ParseErrorPolicy {
    /// Fail the whole run on the first unparseable file
    #[default]
    Abort,
    /// Log a warning and continue with the next file
    Skip,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Base URL for icons of records that leave `icon:` empty
    pub icon_base_url: String,
    pub on_parse_error: ParseErrorPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            icon_base_url: DEFAULT_ICON_BASE_URL.to_string(),
            on_parse_error: ParseErrorPolicy::default(),
        }
    }
}

impl ScanOptions {
    pub fn annotation_parser(&self) -> AnnotationParser {
        AnnotationParser::new(self.icon_base_url.clone())
    }
}
