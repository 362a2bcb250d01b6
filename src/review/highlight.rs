//! Highlight reconciliation
//!
//! Keeps the editor's highlights equal to the anchors of the visible
//! annotations. Every pass clears and reapplies all highlights; passes only
//! run when the visible set grows or shrinks.

use super::editor::DocumentEditor;
use super::resolver::{excerpt_pattern, find_in_linear, LinearText};
use super::types::{Annotation, TextAnchor};

/// Result of one reconciliation pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Highlights applied to the editor
    pub applied: usize,
    /// Excerpts that could not be located in the document
    pub unresolved: Vec<String>,
}

#[derive(Debug, Default)]
pub struct HighlightSynchronizer {
    applied: Vec<TextAnchor>,
}

impl HighlightSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchors currently highlighted
    pub fn applied(&self) -> &[TextAnchor] {
        &self.applied
    }

    /// Reset highlights to exactly the anchors of `visible`
    pub fn reconcile<E: DocumentEditor + ?Sized>(
        &mut self,
        visible: &[Annotation],
        editor: &mut E,
    ) -> ReconcileReport {
        editor.clear_all_highlights();
        self.applied.clear();

        let mut report = ReconcileReport::default();
        if visible.is_empty() {
            return report;
        }

        let linear = LinearText::from_snapshot(&editor.snapshot());
        for annotation in visible {
            let anchors = excerpt_pattern(&annotation.excerpt)
                .map(|pattern| find_in_linear(&pattern, &linear))
                .unwrap_or_default();

            if anchors.is_empty() {
                report.unresolved.push(annotation.excerpt.clone());
                continue;
            }

            for anchor in anchors {
                editor.apply_highlight(anchor);
                self.applied.push(anchor);
                report.applied += 1;
            }
        }

        tracing::debug!(
            applied = report.applied,
            unresolved = report.unresolved.len(),
            "Reconciled highlights"
        );
        report
    }

    /// Drop all highlights
    pub fn clear<E: DocumentEditor + ?Sized>(&mut self, editor: &mut E) {
        editor.clear_all_highlights();
        self.applied.clear();
    }
}
