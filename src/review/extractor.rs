//! Annotation extraction from a partially streamed buffer
//!
//! The model answers with a JSON array of flat objects. While the answer is
//! still streaming the array is never valid JSON, so each complete `{...}`
//! record is located with a non-nested brace scan and parsed on its own.
//! Incomplete or malformed records are skipped until more text arrives.
//!
//! Extraction is a pure function of the buffer: callers re-run it on the
//! whole buffer after every delta and compare the result length with the
//! previous pass to detect new annotations.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use super::types::Annotation;

/// Flat record with no nested braces
fn record_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{[^{}]*\}").expect("record pattern is valid"))
}

/// Wire shape of a record; every field is optional so a malformed record
/// degrades to an empty excerpt instead of failing the pass
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    excerpt: Option<String>,
    replace: Option<String>,
    comment: Option<String>,
}

impl RawRecord {
    fn parse(record: &str) -> Self {
        serde_json::from_str(record).unwrap_or_default()
    }

    fn into_annotation(self) -> Option<Annotation> {
        let excerpt = self.excerpt.filter(|e| !e.is_empty())?;
        Some(Annotation {
            excerpt,
            replace: self.replace,
            comment: self.comment,
        })
    }
}

/// Return every complete, valid annotation found in `buffer`
pub fn extract(buffer: &str) -> Vec<Annotation> {
    record_pattern()
        .find_iter(buffer)
        .filter_map(|m| RawRecord::parse(m.as_str()).into_annotation())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"[{"excerpt":"foo bar","replace":"foo baz","comment":"typo"}]"#;

    #[test]
    fn test_partial_record_yields_nothing() {
        assert!(extract(r#"[{"excerpt":"foo b"#).is_empty());
    }

    #[test]
    fn test_completed_record_is_extracted() {
        let annotations = extract(FULL);
        assert_eq!(
            annotations,
            vec![Annotation::new("foo bar")
                .with_replace("foo baz")
                .with_comment("typo")]
        );
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let buffer = r#"[{"excerpt":"a","replace":"b"},{"excerpt":"c"#;
        assert_eq!(extract(buffer), extract(buffer));
    }

    #[test]
    fn test_count_never_decreases_as_buffer_grows() {
        let stream = r#"[{"excerpt":"one","replace":"1"},{"excerpt":"two","comment":"x"},{"bad":},{"excerpt":"three"}]"#;
        let mut previous = 0;
        for end in 0..=stream.len() {
            let count = extract(&stream[..end]).len();
            assert!(count >= previous, "count dropped at prefix {}", end);
            previous = count;
        }
        assert_eq!(previous, 3);
    }

    #[test]
    fn test_malformed_and_empty_records_are_dropped() {
        let buffer = r#"[{"excerpt":}, {"excerpt":""}, {"replace":"x"}, {"excerpt":"ok"}]"#;
        let annotations = extract(buffer);
        assert_eq!(annotations, vec![Annotation::new("ok")]);
    }

    #[test]
    fn test_wrong_field_type_is_dropped() {
        let buffer = r#"{"excerpt":42}{"excerpt":"kept","replace":null}"#;
        assert_eq!(extract(buffer), vec![Annotation::new("kept")]);
    }

    #[test]
    fn test_nested_object_does_not_produce_annotation() {
        let buffer = r#"{"excerpt":"outer","meta":{"k":"v"}}"#;
        assert!(extract(buffer).is_empty());
    }

    #[test]
    fn test_surrounding_prose_is_ignored() {
        let buffer = "Here are my notes:\n```json\n[{\"excerpt\":\"teh\",\"replace\":\"the\"}]\n```";
        assert_eq!(extract(buffer), vec![Annotation::new("teh").with_replace("the")]);
    }

    #[test]
    fn test_duplicate_excerpts_are_kept() {
        let buffer = r#"[{"excerpt":"foo bar"},{"excerpt":"foo bar","comment":"again"}]"#;
        assert_eq!(extract(buffer).len(), 2);
    }
}
