//! Text anchor resolution
//!
//! Locates an excerpt in a document snapshot and maps each match back to the
//! document's position space. The snapshot's fragments are flattened into
//! one linear string together with a table that gives, for every byte of
//! that string, the document position of the character it belongs to.
//!
//! Matching is literal except for whitespace: any whitespace run in the
//! excerpt matches any (possibly empty) whitespace run in the document, so
//! an excerpt quoted from a reflowed paragraph still finds the original
//! line breaks. Both sides are folded with [`normalize_char`] before
//! matching.

use regex::{Regex, RegexBuilder};

use super::normalize::normalize_char;
use super::types::{DocumentSnapshot, TextAnchor};

/// Compiled patterns larger than this are rejected as unresolvable
const MAX_PATTERN_SIZE: usize = 1 << 20;

/// Flattened snapshot text with its offset-to-position table
#[derive(Debug, Clone)]
pub struct LinearText {
    text: String,
    positions: Vec<usize>,
}

impl LinearText {
    /// Flatten a snapshot, folding every character
    pub fn from_snapshot(snapshot: &DocumentSnapshot) -> Self {
        let mut text = String::new();
        let mut positions = Vec::new();

        for fragment in &snapshot.fragments {
            for (index, c) in fragment.text.chars().enumerate() {
                let folded = normalize_char(c);
                text.push(folded);
                positions.extend(std::iter::repeat(fragment.position + index).take(folded.len_utf8()));
            }
        }

        Self { text, positions }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Translate a byte span of the linear text into a document anchor
    fn anchor(&self, start: usize, end: usize) -> Option<TextAnchor> {
        if start >= end {
            return None;
        }
        let first = *self.positions.get(start)?;
        let last = *self.positions.get(end - 1)?;
        Some(TextAnchor::new(first, last + 1))
    }
}

/// Build the whitespace-relaxed pattern for an excerpt
///
/// Returns `None` for an excerpt with no visible text.
pub fn excerpt_pattern(excerpt: &str) -> Option<Regex> {
    let folded: String = excerpt.chars().map(normalize_char).collect();
    let pieces: Vec<String> = folded.split_whitespace().map(regex::escape).collect();
    if pieces.is_empty() {
        return None;
    }

    RegexBuilder::new(&pieces.join(r"[\s\n]*"))
        .size_limit(MAX_PATTERN_SIZE)
        .build()
        .map_err(|e| tracing::warn!("Excerpt pattern rejected: {}", e))
        .ok()
}

/// Find every occurrence of `excerpt` in the snapshot, in document order
pub fn find_text_position(excerpt: &str, snapshot: &DocumentSnapshot) -> Vec<TextAnchor> {
    let Some(pattern) = excerpt_pattern(excerpt) else {
        return Vec::new();
    };
    let linear = LinearText::from_snapshot(snapshot);
    find_in_linear(&pattern, &linear)
}

/// Same as [`find_text_position`] with a precompiled pattern and text
pub fn find_in_linear(pattern: &Regex, linear: &LinearText) -> Vec<TextAnchor> {
    pattern
        .find_iter(linear.as_str())
        .filter_map(|m| linear.anchor(m.start(), m.end()))
        .collect()
}

/// First occurrence only, used by replace and focus
pub fn find_first(excerpt: &str, snapshot: &DocumentSnapshot) -> Option<TextAnchor> {
    find_text_position(excerpt, snapshot).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::types::SnapshotFragment;

    /// Paragraphs laid out the way a rich-text tree numbers them: each
    /// paragraph opens at one position and closes at the next.
    fn snapshot(paragraphs: &[&str]) -> DocumentSnapshot {
        let mut fragments = Vec::new();
        let mut position = 0;
        for (i, text) in paragraphs.iter().enumerate() {
            if i > 0 {
                fragments.push(SnapshotFragment::boundary(position));
            }
            fragments.push(SnapshotFragment::text(*text, position + 1));
            position += text.chars().count() + 2;
        }
        DocumentSnapshot::new(fragments)
    }

    fn slice(paragraphs: &[&str], anchor: TextAnchor) -> String {
        let mut out = String::new();
        let mut position = 0;
        for (i, text) in paragraphs.iter().enumerate() {
            if i > 0 && anchor.contains(position) {
                out.push('\n');
            }
            for (offset, c) in text.chars().enumerate() {
                if anchor.contains(position + 1 + offset) {
                    out.push(c);
                }
            }
            position += text.chars().count() + 2;
        }
        out
    }

    #[test]
    fn test_single_match_reproduces_excerpt() {
        let doc = ["The foo bar is broken."];
        let anchors = find_text_position("foo bar", &snapshot(&doc));
        assert_eq!(anchors, vec![TextAnchor::new(5, 12)]);
        assert_eq!(slice(&doc, anchors[0]), "foo bar");
    }

    #[test]
    fn test_whitespace_run_matches_newline_and_space() {
        let snapshot = DocumentSnapshot::new(vec![SnapshotFragment::text("a\n b", 0)]);
        let anchors = find_text_position("a b", &snapshot);
        assert_eq!(anchors, vec![TextAnchor::new(0, 4)]);
    }

    #[test]
    fn test_excerpt_spanning_paragraph_boundary() {
        let doc = ["first line", "second line"];
        let anchors = find_text_position("line\nsecond", &snapshot(&doc));
        assert_eq!(anchors.len(), 1);
        assert_eq!(slice(&doc, anchors[0]), "line\nsecond");
    }

    #[test]
    fn test_multiple_occurrences_in_order() {
        let doc = ["foo bar and foo bar", "foo bar"];
        let anchors = find_text_position("foo bar", &snapshot(&doc));
        assert_eq!(anchors.len(), 3);
        assert!(anchors.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn test_fragmented_leaves_are_joined() {
        // "foo " in plain text, "bar" in bold: two leaves, contiguous positions
        let snapshot = DocumentSnapshot::new(vec![
            SnapshotFragment::text("The foo ", 1),
            SnapshotFragment::text("bar", 9),
            SnapshotFragment::text(" is broken.", 12),
        ]);
        assert_eq!(
            find_text_position("foo bar", &snapshot),
            vec![TextAnchor::new(5, 12)]
        );
    }

    #[test]
    fn test_missing_excerpt_resolves_to_nothing() {
        assert!(find_text_position("absent", &snapshot(&["some text"])).is_empty());
        assert!(find_first("absent", &snapshot(&["some text"])).is_none());
    }

    #[test]
    fn test_blank_excerpt_resolves_to_nothing() {
        assert!(find_text_position("  \n ", &snapshot(&["  text  "])).is_empty());
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let doc = ["cost (approx.) $5.00 [sic]"];
        let anchors = find_text_position("(approx.) $5.00 [sic]", &snapshot(&doc));
        assert_eq!(anchors.len(), 1);
        assert_eq!(slice(&doc, anchors[0]), "(approx.) $5.00 [sic]");
    }

    #[test]
    fn test_fullwidth_document_matches_normalized_excerpt() {
        let doc = ["価格は１００円〜２００円です"];
        let anchors = find_text_position("100円~200円", &snapshot(&doc));
        assert_eq!(anchors.len(), 1);
        assert_eq!(slice(&doc, anchors[0]), "１００円〜２００円");
    }

    #[test]
    fn test_multibyte_positions_count_characters() {
        let doc = ["日本語の文章"];
        let anchors = find_text_position("文章", &snapshot(&doc));
        assert_eq!(anchors, vec![TextAnchor::new(5, 7)]);
    }
}
