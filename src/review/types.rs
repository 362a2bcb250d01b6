//! Review data types
//!
//! Annotations are keyed by their excerpt, anchors live in the document's
//! position space, and snapshots are the read-only view of the document the
//! resolver works from.

use serde::{Deserialize, Serialize};

/// A structured edit suggestion produced by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// The quoted text this annotation refers to (its identity)
    pub excerpt: String,
    /// Suggested substitution for the excerpt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
    /// Free-text rationale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Annotation {
    /// Create an annotation with only an excerpt
    pub fn new(excerpt: impl Into<String>) -> Self {
        Self {
            excerpt: excerpt.into(),
            replace: None,
            comment: None,
        }
    }

    /// Set the suggested replacement
    pub fn with_replace(mut self, replace: impl Into<String>) -> Self {
        self.replace = Some(replace.into());
        self
    }

    /// Set the comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether the suggestion would actually change the text
    pub fn proposes_change(&self) -> bool {
        self.replace.as_deref() != Some(self.excerpt.as_str())
    }
}

/// Lifecycle state of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationState {
    /// Shown and highlighted
    Pending,
    /// Hidden, highlight removed (terminal)
    Dismissed,
}

impl AnnotationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationState::Pending => "pending",
            AnnotationState::Dismissed => "dismissed",
        }
    }
}

/// Half-open range in the document's position space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextAnchor {
    pub start: usize,
    pub end: usize,
}

impl TextAnchor {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether `position` falls inside this range
    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.end
    }
}

/// One text-bearing leaf of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFragment {
    /// Text content of the leaf
    pub text: String,
    /// Document position of the first character of `text`
    pub position: usize,
}

impl SnapshotFragment {
    /// A run of text starting at `position`
    pub fn text(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }

    /// A block boundary, matched by a literal newline
    pub fn boundary(position: usize) -> Self {
        Self {
            text: "\n".to_string(),
            position,
        }
    }
}

/// Point-in-time view of all text-bearing leaves of a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub fragments: Vec<SnapshotFragment>,
}

impl DocumentSnapshot {
    pub fn new(fragments: Vec<SnapshotFragment>) -> Self {
        Self { fragments }
    }

    /// Concatenated text of all fragments
    pub fn linear_text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| f.text.is_empty())
    }
}

/// Result reported when a review stream completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    /// Generation of the finished run
    pub generation: u64,
    /// Number of annotations left visible
    pub annotation_count: usize,
}

impl ReviewOutcome {
    /// No issues were found
    pub fn is_clean(&self) -> bool {
        self.annotation_count == 0
    }
}
