//! Annotation store for one review session
//!
//! Holds the extracted annotations in arrival order plus the set of
//! dismissed excerpts. Dismissal is keyed by excerpt, so every annotation
//! sharing that excerpt disappears at once and stays gone even if a later
//! extraction pass reports it again.

use std::collections::HashSet;

use super::types::{Annotation, AnnotationState};

#[derive(Debug, Default, Clone)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    dismissed: HashSet<String>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored list with a fresh extraction result
    ///
    /// Returns `false` without touching the store when the length matches
    /// the stored list, signalling that nothing new arrived.
    pub fn set_all(&mut self, annotations: Vec<Annotation>) -> bool {
        if annotations.len() == self.annotations.len() {
            return false;
        }
        self.annotations = annotations;
        true
    }

    /// Dismiss every annotation with this excerpt
    ///
    /// Returns `false` if the excerpt was already dismissed.
    pub fn dismiss(&mut self, excerpt: &str) -> bool {
        self.dismissed.insert(excerpt.to_string())
    }

    pub fn is_dismissed(&self, excerpt: &str) -> bool {
        self.dismissed.contains(excerpt)
    }

    pub fn state(&self, excerpt: &str) -> AnnotationState {
        if self.is_dismissed(excerpt) {
            AnnotationState::Dismissed
        } else {
            AnnotationState::Pending
        }
    }

    /// Look up the first stored annotation with this excerpt
    pub fn get(&self, excerpt: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.excerpt == excerpt)
    }

    /// First annotation with this excerpt that carries a replacement,
    /// falling back to the first one with the excerpt
    pub fn get_with_suggestion(&self, excerpt: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.excerpt == excerpt && a.replace.is_some())
            .or_else(|| self.get(excerpt))
    }

    /// Annotations still pending that propose an actual change
    pub fn visible(&self) -> Vec<Annotation> {
        self.annotations
            .iter()
            .filter(|a| !self.dismissed.contains(&a.excerpt) && a.proposes_change())
            .cloned()
            .collect()
    }

    /// Everything extracted so far, including dismissed annotations
    pub fn all(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Forget everything for a new review run
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.dismissed.clear();
    }
}
