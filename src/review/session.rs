//! Review session
//!
//! One session per document. A session runs at most one review at a time;
//! each run is identified by a generation number handed out in a
//! [`ReviewTicket`]. Deltas, completion and failure for any generation other
//! than the current in-flight one are ignored, which is how a cancelled run
//! is prevented from touching the store after a new run starts.

use serde::Serialize;

use super::editor::{DocumentEditor, ReviewObserver};
use super::extractor::extract;
use super::highlight::{HighlightSynchronizer, ReconcileReport};
use super::normalize::normalize;
use super::replace::{ActionOutcome, ReplacementEngine};
use super::resolver::find_text_position;
use super::store::AnnotationStore;
use super::stream::StreamAssembler;
use super::types::{Annotation, AnnotationState, ReviewOutcome, TextAnchor};
use super::ReviewError;

/// Handle for one review run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewTicket {
    pub generation: u64,
    /// Normalized document text to send to the model
    pub prompt_text: String,
}

impl ReviewTicket {
    /// Ticket for a run known only by its generation, e.g. from a request path
    pub fn for_generation(generation: u64) -> Self {
        Self {
            generation,
            prompt_text: String::new(),
        }
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewPhase {
    /// No review has produced visible annotations
    Idle,
    /// A review stream is in flight
    Streaming,
    /// Annotations from a finished review are on display
    Reviewed,
}

/// Result of feeding one delta
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaOutcome {
    /// The delta belonged to a cancelled or finished run and was dropped
    pub stale: bool,
    /// New complete annotations appeared in this delta
    pub extracted: bool,
    /// Annotations currently visible
    pub visible: usize,
}

/// An annotation together with where it currently sits in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchoredAnnotation {
    #[serde(flatten)]
    pub annotation: Annotation,
    pub state: AnnotationState,
    pub anchors: Vec<TextAnchor>,
}

pub struct ReviewSession<E, O = ()> {
    editor: E,
    observer: O,
    store: AnnotationStore,
    highlights: HighlightSynchronizer,
    assembler: StreamAssembler,
    generation: u64,
    in_flight: bool,
    extracted_len: usize,
    visible_len: usize,
}

impl<E: DocumentEditor> ReviewSession<E, ()> {
    /// Create a session with no observer
    pub fn new(editor: E) -> Self {
        Self::with_observer(editor, ())
    }
}

impl<E: DocumentEditor, O: ReviewObserver> ReviewSession<E, O> {
    pub fn with_observer(editor: E, observer: O) -> Self {
        Self {
            editor,
            observer,
            store: AnnotationStore::new(),
            highlights: HighlightSynchronizer::new(),
            assembler: StreamAssembler::new(),
            generation: 0,
            in_flight: false,
            extracted_len: 0,
            visible_len: 0,
        }
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn phase(&self) -> ReviewPhase {
        if self.in_flight {
            ReviewPhase::Streaming
        } else if self.visible_len > 0 {
            ReviewPhase::Reviewed
        } else {
            ReviewPhase::Idle
        }
    }

    /// Raw stream buffer of the current or last run
    pub fn buffer(&self) -> &str {
        self.assembler.current()
    }

    pub fn visible(&self) -> Vec<Annotation> {
        self.store.visible()
    }

    /// Visible annotations with their current anchors
    pub fn anchored(&self) -> Vec<AnchoredAnnotation> {
        let snapshot = self.editor.snapshot();
        self.store
            .visible()
            .into_iter()
            .map(|annotation| {
                let anchors = find_text_position(&annotation.excerpt, &snapshot);
                AnchoredAnnotation {
                    state: self.store.state(&annotation.excerpt),
                    annotation,
                    anchors,
                }
            })
            .collect()
    }

    fn is_current(&self, ticket: &ReviewTicket) -> bool {
        self.in_flight && ticket.generation == self.generation
    }

    /// Start a new review run
    ///
    /// Clears the previous run's annotations and highlights and returns the
    /// normalized document text to send upstream.
    pub fn begin_review(&mut self) -> Result<ReviewTicket, ReviewError> {
        if self.in_flight {
            return Err(ReviewError::ReviewInProgress(self.generation));
        }

        self.generation += 1;
        self.in_flight = true;
        self.store.clear();
        self.assembler.reset();
        self.extracted_len = 0;
        self.highlights.clear(&mut self.editor);
        if self.visible_len > 0 {
            self.visible_len = 0;
            self.observer.annotations_changed(&[]);
        }

        let prompt_text = normalize(&self.editor.snapshot().linear_text());
        tracing::info!(generation = self.generation, chars = prompt_text.chars().count(), "Review started");

        Ok(ReviewTicket {
            generation: self.generation,
            prompt_text,
        })
    }

    /// Feed one streamed delta
    pub fn push_delta(&mut self, ticket: &ReviewTicket, delta: &str) -> DeltaOutcome {
        if !self.is_current(ticket) {
            tracing::warn!(
                generation = ticket.generation,
                current = self.generation,
                "Dropping delta for stale review"
            );
            return DeltaOutcome {
                stale: true,
                extracted: false,
                visible: self.visible_len,
            };
        }

        self.assembler.append(delta);
        let annotations = extract(self.assembler.current());
        let extracted = annotations.len() != self.extracted_len;
        if extracted {
            tracing::debug!(
                generation = self.generation,
                total = annotations.len(),
                new = annotations.len().saturating_sub(self.extracted_len),
                "Extracted annotations"
            );
            self.extracted_len = annotations.len();
            self.store.set_all(annotations);
            self.sync_visible();
        }

        DeltaOutcome {
            stale: false,
            extracted,
            visible: self.visible_len,
        }
    }

    /// Complete the run and report how many annotations are on display
    pub fn finish_review(&mut self, ticket: &ReviewTicket) -> Result<ReviewOutcome, ReviewError> {
        if !self.is_current(ticket) {
            return Err(ReviewError::StaleGeneration {
                requested: ticket.generation,
                current: self.generation,
            });
        }

        self.in_flight = false;
        let outcome = ReviewOutcome {
            generation: self.generation,
            annotation_count: self.visible_len,
        };
        if outcome.is_clean() {
            tracing::info!(generation = self.generation, "Review finished, no issues found");
        } else {
            tracing::info!(
                generation = self.generation,
                annotations = outcome.annotation_count,
                "Review finished"
            );
        }
        self.observer.review_finished(outcome);
        Ok(outcome)
    }

    /// End a run whose stream failed, keeping what was already extracted
    pub fn fail_review(&mut self, ticket: &ReviewTicket, reason: &str) {
        if !self.is_current(ticket) {
            return;
        }
        tracing::warn!(
            generation = self.generation,
            kept = self.visible_len,
            "Review stream failed: {}",
            reason
        );
        self.in_flight = false;
    }

    /// Abandon the in-flight run so a new one can start
    ///
    /// Returns the cancelled generation, if any.
    pub fn cancel_review(&mut self) -> Option<u64> {
        if !self.in_flight {
            return None;
        }
        let cancelled = self.generation;
        self.generation += 1;
        self.in_flight = false;
        tracing::info!(generation = cancelled, "Review cancelled");
        Some(cancelled)
    }

    /// Drop every annotation and highlight
    pub fn clear(&mut self) {
        self.store.clear();
        self.assembler.reset();
        self.extracted_len = 0;
        self.sync_visible();
    }

    /// Apply the annotation's suggestion at its first anchor
    pub fn replace(&mut self, excerpt: &str) -> ActionOutcome {
        let Some(annotation) = self.store.get_with_suggestion(excerpt).cloned() else {
            return ActionOutcome::Unresolved;
        };
        let outcome =
            ReplacementEngine::new(&mut self.store, &mut self.highlights, &mut self.editor)
                .replace(&annotation);
        if outcome.changed() {
            self.notify_visible();
        }
        outcome
    }

    /// Dismiss every annotation with this excerpt
    pub fn dismiss(&mut self, excerpt: &str) -> ActionOutcome {
        let Some(annotation) = self.store.get(excerpt).cloned() else {
            return ActionOutcome::Unresolved;
        };
        let outcome =
            ReplacementEngine::new(&mut self.store, &mut self.highlights, &mut self.editor)
                .dismiss(&annotation);
        if outcome.changed() {
            self.notify_visible();
        }
        outcome
    }

    /// Select the first occurrence of the annotation's excerpt
    pub fn focus(&mut self, excerpt: &str) -> Option<TextAnchor> {
        let annotation = self.store.get(excerpt).cloned()?;
        ReplacementEngine::new(&mut self.store, &mut self.highlights, &mut self.editor)
            .focus(&annotation)
    }

    /// Re-run highlighting against the live document, e.g. after user edits
    pub fn refresh_highlights(&mut self) -> ReconcileReport {
        let visible = self.store.visible();
        self.highlights.reconcile(&visible, &mut self.editor)
    }

    /// Reconcile highlights when the visible set changed size
    fn sync_visible(&mut self) {
        let visible = self.store.visible();
        if visible.len() == self.visible_len {
            return;
        }
        self.highlights.reconcile(&visible, &mut self.editor);
        self.visible_len = visible.len();
        self.observer.annotations_changed(&visible);
    }

    /// Highlights were already reconciled by the action; only notify
    fn notify_visible(&mut self) {
        let visible = self.store.visible();
        self.visible_len = visible.len();
        self.observer.annotations_changed(&visible);
    }
}
