//! Status-grid table of contents: load it and merge annotations into it.
//!
//! The TOC is a list of titles, each with `section_features`, each with
//! `cases`. A case is a stub carrying at least an `id`:
//!
//! ```json
//! [{"section_features": [{"cases": [{"id": "expectations_store_git"}]}]}]
//! ```
//!
//! The document is kept as a generic JSON value so keys this tool does not
//! know about survive the round trip in their original order.

use crate::error::{Error, Result};
use crate::registry::AnnotationRegistry;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// What a merge did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Number of cases visited
    pub cases: usize,
    /// Ids of cases replaced by an annotation
    pub replaced: Vec<String>,
    /// Ids of cases with no annotation, left as they were
    pub unmatched: Vec<String>,
}

/// Read and parse a TOC document.
pub fn load_toc(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| Error::TocJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace every case whose id has an annotation with that annotation.
///
/// Replacement is wholesale: fields of the stub other than `id` are dropped.
/// Cases without a matching annotation are not touched, and nothing is
/// added, removed or reordered.
pub fn merge_toc(toc: &mut Value, registry: &AnnotationRegistry) -> Result<MergeSummary> {
    let mut summary = MergeSummary::default();

    let titles = toc
        .as_array_mut()
        .ok_or_else(|| Error::toc_shape("$", "expected an array of titles"))?;

    for (t, title) in titles.iter_mut().enumerate() {
        let title_at = format!("[{}]", t);
        let sections = title
            .get_mut("section_features")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| Error::toc_shape(&title_at, "expected a `section_features` array"))?;

        for (s, section) in sections.iter_mut().enumerate() {
            let section_at = format!("{}.section_features[{}]", title_at, s);
            let cases = section
                .get_mut("cases")
                .and_then(Value::as_array_mut)
                .ok_or_else(|| Error::toc_shape(&section_at, "expected a `cases` array"))?;

            for (c, case) in cases.iter_mut().enumerate() {
                let id = case
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        Error::toc_shape(
                            format!("{}.cases[{}]", section_at, c),
                            "expected a string `id`",
                        )
                    })?
                    .to_string();

                summary.cases += 1;
                match registry.get(&id) {
                    Some(record) => {
                        *case = serde_json::to_value(record)?;
                        summary.replaced.push(id);
                    }
                    None => summary.unmatched.push(id),
                }
            }
        }
    }

    Ok(summary)
}

/// Pretty-print with two-space indentation and a trailing newline.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationRecord, MaturityDetails};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(id: &str) -> AnnotationRecord {
        AnnotationRecord {
            id: id.to_string(),
            title: format!("Title {}", id),
            icon: format!("{}.png", id),
            maturity: "Beta".to_string(),
            maturity_details: MaturityDetails {
                bug_risk: "Low".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn registry(ids: &[&str]) -> AnnotationRegistry {
        let mut registry = AnnotationRegistry::new();
        for id in ids {
            registry.insert(record(id));
        }
        registry
    }

    #[test]
    fn matching_case_is_replaced_wholesale() {
        let mut toc = json!([
            {
                "title": "Stores",
                "section_features": [
                    {"section": "Expectation stores", "cases": [
                        {"id": "x", "extra": "stub"},
                        {"id": "y"}
                    ]}
                ]
            }
        ]);

        let summary = merge_toc(&mut toc, &registry(&["x"])).unwrap();

        let cases = &toc[0]["section_features"][0]["cases"];
        assert_eq!(cases[0], serde_json::to_value(record("x")).unwrap());
        assert!(cases[0].get("extra").is_none());
        assert_eq!(cases[1], json!({"id": "y"}));
        assert_eq!(toc[0]["title"], "Stores");
        assert_eq!(toc[0]["section_features"][0]["section"], "Expectation stores");
        assert_eq!(
            summary,
            MergeSummary {
                cases: 2,
                replaced: vec!["x".to_string()],
                unmatched: vec!["y".to_string()],
            }
        );
    }

    #[test]
    fn order_is_preserved_across_titles_and_sections() {
        let mut toc = json!([
            {"section_features": [{"cases": [{"id": "b"}, {"id": "a"}]}]},
            {"section_features": [{"cases": []}, {"cases": [{"id": "c"}]}]}
        ]);

        merge_toc(&mut toc, &registry(&["a", "b", "c"])).unwrap();

        let ids: Vec<_> = [
            &toc[0]["section_features"][0]["cases"][0],
            &toc[0]["section_features"][0]["cases"][1],
            &toc[1]["section_features"][1]["cases"][0],
        ]
        .iter()
        .map(|case| case["id"].as_str().unwrap().to_string())
        .collect();
        assert_eq!(ids, ["b", "a", "c"]);
        assert_eq!(toc[1]["section_features"][0]["cases"], json!([]));
    }

    #[test]
    fn unmatched_stub_keeps_key_order() {
        let text = r#"[{"section_features":[{"cases":[{"zeta":1,"id":"q","alpha":2}]}]}]"#;
        let mut toc: Value = serde_json::from_str(text).unwrap();
        merge_toc(&mut toc, &AnnotationRegistry::new()).unwrap();
        assert_eq!(serde_json::to_string(&toc).unwrap(), text);
    }

    #[test]
    fn shape_errors_name_their_location() {
        let cases = [
            (json!({"section_features": []}), "$"),
            (json!([{"title": "no sections"}]), "[0]"),
            (json!([{"section_features": [{}]}]), "[0].section_features[0]"),
            (
                json!([{"section_features": [{"cases": [{"id": "a"}, {"name": "b"}]}]}]),
                "[0].section_features[0].cases[1]",
            ),
        ];

        for (mut toc, expected) in cases {
            match merge_toc(&mut toc, &AnnotationRegistry::new()) {
                Err(Error::TocShape { location, .. }) => assert_eq!(location, expected),
                other => panic!("expected shape error at {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn render_json_is_pretty_with_newline() {
        let out = render_json(&json!([{"id": "a"}])).unwrap();
        assert_eq!(out, "[\n  {\n    \"id\": \"a\"\n  }\n]\n");
    }
}
