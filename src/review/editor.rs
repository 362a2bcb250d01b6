//! Capabilities the review engine needs from the document it annotates,
//! and the notifications it sends back to the UI.

use super::types::{Annotation, DocumentSnapshot, ReviewOutcome, TextAnchor};

/// Read and write access to the live document
///
/// The engine never mutates the document except through these calls.
pub trait DocumentEditor {
    /// Current text-bearing leaves, including edits made mid-review
    fn snapshot(&self) -> DocumentSnapshot;

    /// Mark a range as highlighted
    fn apply_highlight(&mut self, anchor: TextAnchor);

    /// Remove every highlight previously applied
    fn clear_all_highlights(&mut self);

    /// Replace the text covered by `anchor`
    fn replace_range(&mut self, anchor: TextAnchor, text: &str);

    /// Move the selection to `anchor`
    fn set_selection(&mut self, anchor: TextAnchor);
}

/// Receives review progress
pub trait ReviewObserver {
    /// The visible annotation list changed
    fn annotations_changed(&mut self, visible: &[Annotation]);

    /// A review stream completed
    fn review_finished(&mut self, outcome: ReviewOutcome);
}

impl ReviewObserver for () {
    fn annotations_changed(&mut self, _visible: &[Annotation]) {}

    fn review_finished(&mut self, _outcome: ReviewOutcome) {}
}

/// Observer that keeps the latest notifications for later inspection
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    /// Visible list from the most recent notification
    pub visible: Vec<Annotation>,
    /// Number of change notifications received
    pub changes: usize,
    /// Outcome of the most recent finished review
    pub finished: Option<ReviewOutcome>,
}

impl ReviewObserver for RecordingObserver {
    fn annotations_changed(&mut self, visible: &[Annotation]) {
        self.visible = visible.to_vec();
        self.changes += 1;
    }

    fn review_finished(&mut self, outcome: ReviewOutcome) {
        self.finished = Some(outcome);
    }
}
