//! Feature-maturity annotation parser: fixed-order line matcher.
//!
//! An annotation is a run of 14 consecutive `key: value` lines:
//!
//! ```text
//! id: expectations_store_git
//! title: Expectation Store - Git
//! icon:
//! short_description:
//! description:
//! how_to_guide_url:
//! maturity: Production
//! maturity_details:
//!     api_stability: Stable
//!     implementation_completeness: Complete
//!     unit_test_coverage: Complete
//!     integration_infrastructure_test_coverage: N/A
//!     documentation_completeness: Complete
//!     bug_risk: Low
//! ```
//!
//! Keys must appear in exactly this order with nothing in between. Records can
//! be stacked back-to-back; prose around them is ignored.

use crate::model::{AnnotationRecord, MaturityDetails};
use regex::Regex;
use std::sync::LazyLock;

/// Where feature icons live when a record leaves `icon:` empty.
pub const DEFAULT_ICON_BASE_URL: &str =
    "https://great-expectations-web-assets.s3.us-east-2.amazonaws.com/feature_maturity_icons";

const FIELD_COUNT: usize = 14;

/// Record keys in the only order the grammar accepts.
const FIELD_KEYS: [&str; FIELD_COUNT] = [
    "id",
    "title",
    "icon",
    "short_description",
    "description",
    "how_to_guide_url",
    "maturity",
    "maturity_details",
    "api_stability",
    "implementation_completeness",
    "unit_test_coverage",
    "integration_infrastructure_test_coverage",
    "documentation_completeness",
    "bug_risk",
];

// Key runs up to the first colon; everything after it is the value.
static RE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*([A-Za-z_]+):(.*)$").unwrap());

/// Parses annotation records out of docstring text.
#[derive(Debug, Clone)]
pub struct AnnotationParser {
    icon_base_url: String,
}

impl Default for AnnotationParser {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_BASE_URL)
    }
}

impl AnnotationParser {
    pub fn new(icon_base_url: impl Into<String>) -> Self {
        Self {
            icon_base_url: icon_base_url.into(),
        }
    }

    /// Extract every record in `text`, in the order they appear.
    pub fn parse(&self, text: &str) -> Vec<AnnotationRecord> {
        let lines: Vec<&str> = text.lines().collect();
        let mut records = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            match match_window(&lines[i..]) {
                Some(values) => {
                    if let Some(record) = self.build_record(values) {
                        records.push(record);
                    }
                    // Windows never overlap
                    i += FIELD_COUNT;
                }
                None => i += 1,
            }
        }

        records
    }

    fn build_record(&self, values: [&str; FIELD_COUNT]) -> Option<AnnotationRecord> {
        let [
            id,
            title,
            icon,
            short_description,
            description,
            how_to_guide_url,
            maturity,
            // Label line only; its value is not kept
            _maturity_details,
            api_stability,
            implementation_completeness,
            unit_test_coverage,
            integration_infrastructure_test_coverage,
            documentation_completeness,
            bug_risk,
        ] = values;

        if id.is_empty() {
            tracing::warn!(title = %title, "dropping annotation with an empty id");
            return None;
        }

        let icon = if icon.is_empty() {
            self.default_icon(id)
        } else {
            icon.to_string()
        };

        tracing::debug!(id = %id, "parsed annotation");

        Some(AnnotationRecord {
            id: id.to_string(),
            title: title.to_string(),
            icon,
            short_description: short_description.to_string(),
            description: description.to_string(),
            how_to_guide_url: how_to_guide_url.to_string(),
            maturity: maturity.to_string(),
            maturity_details: MaturityDetails {
                api_stability: api_stability.to_string(),
                implementation_completeness: implementation_completeness.to_string(),
                unit_test_coverage: unit_test_coverage.to_string(),
                integration_infrastructure_test_coverage: integration_infrastructure_test_coverage
                    .to_string(),
                documentation_completeness: documentation_completeness.to_string(),
                bug_risk: bug_risk.to_string(),
            },
        })
    }

    fn default_icon(&self, id: &str) -> String {
        format!("{}/{}.png", self.icon_base_url.trim_end_matches('/'), id)
    }
}

/// Match the 14 fields at the head of `lines`, returning their trimmed values.
fn match_window<'a>(lines: &[&'a str]) -> Option<[&'a str; FIELD_COUNT]> {
    if lines.len() < FIELD_COUNT {
        return None;
    }
    let mut values = [""; FIELD_COUNT];
    for (slot, (line, key)) in values.iter_mut().zip(lines.iter().zip(FIELD_KEYS)) {
        *slot = field_value(*line, key)?;
    }
    Some(values)
}

/// Value of `line` if it is `<key>:<value>` for exactly this key.
fn field_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let caps = RE_FIELD.captures(line)?;
    if caps.get(1)?.as_str() != key {
        return None;
    }
    Some(caps.get(2)?.as_str().trim())
}
