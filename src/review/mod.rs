//! Streamed review engine
//!
//! Turns a streamed model answer into annotations on a live document.
//!
//! # Pipeline
//!
//! ```text
//! stream deltas ─► StreamAssembler ─► extract() ─► AnnotationStore
//!                                                     │
//!                          HighlightSynchronizer ◄────┘
//!                                  │ find_text_position()
//!                                  ▼
//!                           DocumentEditor
//! ```
//!
//! Extraction re-scans the whole buffer on every delta; highlighting only
//! runs when the number of extracted annotations changes. User actions
//! (dismiss, replace, focus) go through [`ReviewSession`], which resolves
//! the excerpt against a fresh snapshot each time.

mod editor;
mod extractor;
mod highlight;
mod normalize;
mod pump;
mod replace;
mod resolver;
mod session;
mod store;
mod stream;
mod types;

pub use editor::{DocumentEditor, RecordingObserver, ReviewObserver};
pub use extractor::extract;
pub use highlight::{HighlightSynchronizer, ReconcileReport};
pub use normalize::{normalize, normalize_char};
pub use pump::{drive_review, drive_review_bytes};
pub use replace::{ActionOutcome, ReplacementEngine};
pub use resolver::{excerpt_pattern, find_first, find_text_position, LinearText};
pub use session::{AnchoredAnnotation, DeltaOutcome, ReviewPhase, ReviewSession, ReviewTicket};
pub use store::AnnotationStore;
pub use stream::{StreamAssembler, Utf8Deltas};
pub use types::{
    Annotation, AnnotationState, DocumentSnapshot, ReviewOutcome, SnapshotFragment, TextAnchor,
};

/// Review engine errors
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Review {0} is still in progress")]
    ReviewInProgress(u64),

    #[error("Review {requested} is not the current review ({current})")]
    StaleGeneration { requested: u64, current: u64 },

    #[error("Review stream failed: {0}")]
    Stream(String),
}
