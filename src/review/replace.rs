//! User actions on a single annotation: replace, dismiss and focus.
//!
//! None of these fail. Acting on a dismissed or unresolvable annotation is
//! reported through the outcome and leaves the document untouched.

use serde::Serialize;

use super::editor::DocumentEditor;
use super::highlight::HighlightSynchronizer;
use super::resolver::find_first;
use super::store::AnnotationStore;
use super::types::{Annotation, TextAnchor};

/// What a replace or dismiss call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ActionOutcome {
    /// The suggestion was written into the document and the annotation dismissed
    Replaced { anchor: TextAnchor },
    /// The annotation was dismissed without changing the document
    Dismissed,
    /// The annotation was already dismissed
    AlreadyDismissed,
    /// The excerpt is no longer present in the document
    Unresolved,
    /// The annotation carries no replacement text
    NoSuggestion,
}

impl ActionOutcome {
    /// Whether the call changed session state
    pub fn changed(&self) -> bool {
        matches!(self, ActionOutcome::Replaced { .. } | ActionOutcome::Dismissed)
    }
}

/// Applies suggestions and dismissals against the store and the editor
pub struct ReplacementEngine<'a, E: DocumentEditor + ?Sized> {
    store: &'a mut AnnotationStore,
    highlights: &'a mut HighlightSynchronizer,
    editor: &'a mut E,
}

impl<'a, E: DocumentEditor + ?Sized> ReplacementEngine<'a, E> {
    pub fn new(
        store: &'a mut AnnotationStore,
        highlights: &'a mut HighlightSynchronizer,
        editor: &'a mut E,
    ) -> Self {
        Self {
            store,
            highlights,
            editor,
        }
    }

    /// Write the suggested replacement over the first anchor of the excerpt
    pub fn replace(&mut self, annotation: &Annotation) -> ActionOutcome {
        if self.store.is_dismissed(&annotation.excerpt) {
            return ActionOutcome::AlreadyDismissed;
        }
        let Some(replacement) = annotation.replace.as_deref() else {
            return ActionOutcome::NoSuggestion;
        };
        let Some(anchor) = find_first(&annotation.excerpt, &self.editor.snapshot()) else {
            tracing::debug!(excerpt = %annotation.excerpt, "Replace skipped, excerpt not found");
            return ActionOutcome::Unresolved;
        };

        self.editor.replace_range(anchor, replacement);
        self.store.dismiss(&annotation.excerpt);
        self.highlights.reconcile(&self.store.visible(), self.editor);

        ActionOutcome::Replaced { anchor }
    }

    /// Hide the annotation and drop its highlights
    ///
    /// An excerpt that no longer resolves is left pending.
    pub fn dismiss(&mut self, annotation: &Annotation) -> ActionOutcome {
        if self.store.is_dismissed(&annotation.excerpt) {
            return ActionOutcome::AlreadyDismissed;
        }
        if find_first(&annotation.excerpt, &self.editor.snapshot()).is_none() {
            tracing::debug!(excerpt = %annotation.excerpt, "Dismiss skipped, excerpt not found");
            return ActionOutcome::Unresolved;
        }

        self.store.dismiss(&annotation.excerpt);
        self.highlights.reconcile(&self.store.visible(), self.editor);
        ActionOutcome::Dismissed
    }

    /// Select the first occurrence of the excerpt
    pub fn focus(&mut self, annotation: &Annotation) -> Option<TextAnchor> {
        if self.store.is_dismissed(&annotation.excerpt) {
            return None;
        }
        let anchor = find_first(&annotation.excerpt, &self.editor.snapshot())?;
        self.editor.set_selection(anchor);
        Some(anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn setup(text: &str, annotations: Vec<Annotation>) -> (AnnotationStore, HighlightSynchronizer, Document) {
        let mut store = AnnotationStore::new();
        store.set_all(annotations);
        let mut highlights = HighlightSynchronizer::new();
        let mut doc = Document::from_text(text);
        highlights.reconcile(&store.visible(), &mut doc);
        (store, highlights, doc)
    }

    #[test]
    fn test_replace_rewrites_document_and_drops_highlight() {
        let annotation = Annotation::new("foo bar").with_replace("foo baz");
        let (mut store, mut highlights, mut doc) =
            setup("The foo bar is broken.", vec![annotation.clone()]);
        assert_eq!(doc.highlights().len(), 1);

        let outcome = ReplacementEngine::new(&mut store, &mut highlights, &mut doc).replace(&annotation);

        assert!(matches!(outcome, ActionOutcome::Replaced { .. }));
        assert_eq!(doc.text(), "The foo baz is broken.");
        assert!(doc.highlights().is_empty());
        assert!(store.visible().is_empty());
    }

    #[test]
    fn test_replace_on_missing_excerpt_is_noop() {
        let annotation = Annotation::new("gone").with_replace("here");
        let (mut store, mut highlights, mut doc) = setup("Nothing matches.", vec![annotation.clone()]);

        let outcome = ReplacementEngine::new(&mut store, &mut highlights, &mut doc).replace(&annotation);

        assert_eq!(outcome, ActionOutcome::Unresolved);
        assert_eq!(doc.text(), "Nothing matches.");
        assert_eq!(store.visible().len(), 1);
    }

    #[test]
    fn test_repeated_actions_are_noops() {
        let annotation = Annotation::new("teh").with_replace("the");
        let (mut store, mut highlights, mut doc) = setup("teh cat and teh dog", vec![annotation.clone()]);

        let mut engine = ReplacementEngine::new(&mut store, &mut highlights, &mut doc);
        assert!(engine.replace(&annotation).changed());
        assert_eq!(engine.replace(&annotation), ActionOutcome::AlreadyDismissed);
        assert_eq!(engine.dismiss(&annotation), ActionOutcome::AlreadyDismissed);

        // Only the first occurrence is replaced
        assert_eq!(doc.text(), "the cat and teh dog");
    }

    #[test]
    fn test_dismiss_unresolved_annotation_is_noop() {
        let annotation = Annotation::new("elsewhere").with_replace("x");
        let (mut store, mut highlights, mut doc) = setup("text", vec![annotation.clone()]);

        let outcome = ReplacementEngine::new(&mut store, &mut highlights, &mut doc).dismiss(&annotation);

        assert_eq!(outcome, ActionOutcome::Unresolved);
        assert!(!store.is_dismissed("elsewhere"));
        assert_eq!(store.visible().len(), 1);
        assert_eq!(doc.text(), "text");
    }

    #[test]
    fn test_dismiss_resolved_annotation() {
        let annotation = Annotation::new("text").with_comment("vague");
        let (mut store, mut highlights, mut doc) = setup("some text", vec![annotation.clone()]);
        assert_eq!(doc.highlights().len(), 1);

        let outcome = ReplacementEngine::new(&mut store, &mut highlights, &mut doc).dismiss(&annotation);

        assert_eq!(outcome, ActionOutcome::Dismissed);
        assert!(store.visible().is_empty());
        assert!(doc.highlights().is_empty());
        assert_eq!(doc.text(), "some text");
    }

    #[test]
    fn test_replace_without_suggestion() {
        let annotation = Annotation::new("text").with_comment("vague");
        let (mut store, mut highlights, mut doc) = setup("some text", vec![annotation.clone()]);

        let outcome = ReplacementEngine::new(&mut store, &mut highlights, &mut doc).replace(&annotation);

        assert_eq!(outcome, ActionOutcome::NoSuggestion);
        assert_eq!(doc.text(), "some text");
    }

    #[test]
    fn test_focus_selects_first_occurrence() {
        let annotation = Annotation::new("dog");
        let (mut store, mut highlights, mut doc) = setup("dog eat dog", vec![annotation.clone()]);

        let anchor = ReplacementEngine::new(&mut store, &mut highlights, &mut doc).focus(&annotation);

        assert_eq!(anchor, Some(TextAnchor::new(1, 4)));
        assert_eq!(doc.selection(), Some(TextAnchor::new(1, 4)));
    }
}
