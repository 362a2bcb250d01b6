//! In-memory rich-text document
//!
//! A flat list of paragraphs numbered the way a rich-text tree numbers
//! positions: paragraph `i` opens at position `o_i`, its characters sit at
//! `o_i + 1 ..= o_i + len`, it closes at `o_i + len + 1`, and the next
//! paragraph opens right after. The snapshot exposes each paragraph as one
//! text leaf and each paragraph break as a `"\n"` boundary leaf at the
//! closing position.

use serde::Serialize;

use crate::review::{DocumentEditor, DocumentSnapshot, SnapshotFragment, TextAnchor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    paragraphs: Vec<String>,
    highlights: Vec<TextAnchor>,
    selection: Option<TextAnchor>,
}

/// Positions taken by the text of a replacement (breaks close and reopen)
fn position_len(text: &str) -> usize {
    text.chars().count() + text.matches('\n').count()
}

/// Byte index of the `n`th character, clamped to the end
fn byte_index(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map(|(i, _)| i).unwrap_or(text.len())
}

impl Document {
    /// One paragraph per line of `text`
    pub fn from_text(text: &str) -> Self {
        Self::from_paragraphs(text.split('\n').map(str::to_string).collect())
    }

    pub fn from_paragraphs(paragraphs: Vec<String>) -> Self {
        let paragraphs = if paragraphs.is_empty() {
            vec![String::new()]
        } else {
            paragraphs
        };
        Self {
            paragraphs,
            highlights: Vec::new(),
            selection: None,
        }
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Linear text with paragraphs joined by newlines
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    pub fn highlights(&self) -> &[TextAnchor] {
        &self.highlights
    }

    pub fn selection(&self) -> Option<TextAnchor> {
        self.selection
    }

    /// Total number of positions, one past the last closing position
    pub fn size(&self) -> usize {
        self.paragraphs.iter().map(|p| p.chars().count() + 2).sum()
    }

    /// Opening position of each paragraph
    fn openings(&self) -> Vec<usize> {
        let mut open = 0;
        self.paragraphs
            .iter()
            .map(|p| {
                let current = open;
                open += p.chars().count() + 2;
                current
            })
            .collect()
    }

    /// Map a position to (paragraph, character offset)
    ///
    /// Opening positions map to the start of their paragraph and closing
    /// positions to its end. Positions past the end clamp to the end.
    pub fn locate(&self, position: usize) -> (usize, usize) {
        let openings = self.openings();
        for (index, (open, paragraph)) in openings.iter().zip(&self.paragraphs).enumerate() {
            let len = paragraph.chars().count();
            let close = open + len + 1;
            if position <= close {
                return (index, position.saturating_sub(open + 1).min(len));
            }
        }
        let last = self.paragraphs.len() - 1;
        (last, self.paragraphs[last].chars().count())
    }

    /// Position of a character offset within a paragraph
    pub fn position_of(&self, paragraph: usize, offset: usize) -> Option<usize> {
        let open = *self.openings().get(paragraph)?;
        let len = self.paragraphs[paragraph].chars().count();
        (offset <= len).then_some(open + 1 + offset)
    }

    /// Text covered by an anchor, with breaks rendered as newlines
    pub fn slice(&self, anchor: TextAnchor) -> String {
        let (start_para, start_off) = self.locate(anchor.start);
        let (end_para, end_off) = self.locate(anchor.end);

        let mut out = String::new();
        for index in start_para..=end_para {
            let paragraph = &self.paragraphs[index];
            let from = if index == start_para { start_off } else { 0 };
            let to = if index == end_para {
                end_off
            } else {
                paragraph.chars().count()
            };
            if index > start_para {
                out.push('\n');
            }
            if from < to {
                out.push_str(&paragraph[byte_index(paragraph, from)..byte_index(paragraph, to)]);
            }
        }
        out
    }

    /// Replace the covered range; newlines in `text` split paragraphs
    pub fn replace_range(&mut self, anchor: TextAnchor, text: &str) {
        let (start, end) = if anchor.start <= anchor.end {
            (anchor.start, anchor.end)
        } else {
            (anchor.end, anchor.start)
        };
        let (start_para, start_off) = self.locate(start);
        let (end_para, end_off) = self.locate(end);

        let head = {
            let p = &self.paragraphs[start_para];
            p[..byte_index(p, start_off)].to_string()
        };
        let tail = {
            let p = &self.paragraphs[end_para];
            p[byte_index(p, end_off)..].to_string()
        };

        let merged = format!("{}{}{}", head, text, tail);
        let replacement: Vec<String> = merged.split('\n').map(str::to_string).collect();
        self.paragraphs.splice(start_para..=end_para, replacement);

        let removed = (end - start) as isize;
        self.shift_marks(start, end, position_len(text) as isize - removed);
    }

    /// Drop marks overlapping the edited range and shift those after it
    fn shift_marks(&mut self, start: usize, end: usize, delta: isize) {
        let shift = |anchor: TextAnchor| -> Option<TextAnchor> {
            if anchor.end <= start {
                Some(anchor)
            } else if anchor.start >= end {
                Some(TextAnchor::new(
                    (anchor.start as isize + delta).max(0) as usize,
                    (anchor.end as isize + delta).max(0) as usize,
                ))
            } else {
                None
            }
        };
        self.highlights = self.highlights.iter().copied().filter_map(shift).collect();
        self.selection = self.selection.and_then(shift);
    }
}

impl DocumentEditor for Document {
    fn snapshot(&self) -> DocumentSnapshot {
        let mut fragments = Vec::with_capacity(self.paragraphs.len() * 2);
        for (index, (open, paragraph)) in self.openings().into_iter().zip(&self.paragraphs).enumerate() {
            if index > 0 {
                // Closing position of the previous paragraph
                fragments.push(SnapshotFragment::boundary(open - 1));
            }
            fragments.push(SnapshotFragment::text(paragraph.clone(), open + 1));
        }
        DocumentSnapshot::new(fragments)
    }

    fn apply_highlight(&mut self, anchor: TextAnchor) {
        if !anchor.is_empty() && !self.highlights.contains(&anchor) {
            self.highlights.push(anchor);
        }
    }

    fn clear_all_highlights(&mut self) {
        self.highlights.clear();
    }

    fn replace_range(&mut self, anchor: TextAnchor, text: &str) {
        Document::replace_range(self, anchor, text);
    }

    fn set_selection(&mut self, anchor: TextAnchor) {
        self.selection = Some(anchor);
    }
}
