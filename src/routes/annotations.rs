//! Annotation action API routes

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::ReviewRepository;
use crate::error::{AppError, Result};
use crate::review::{ActionOutcome, AnnotationState, TextAnchor};
use crate::state::AppState;

/// Create the annotations router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/annotations/dismiss", post(dismiss_annotation))
        .route("/:id/annotations/replace", post(replace_annotation))
        .route("/:id/annotations/focus", post(focus_annotation))
}

/// Identifies an annotation by its excerpt
#[derive(Debug, Deserialize)]
pub struct AnnotationAction {
    pub excerpt: String,
}

#[derive(Debug, Serialize)]
pub struct FocusResponse {
    pub anchor: TextAnchor,
}

/// Record a dismissal against the run that produced the annotation
async fn persist(
    state: &AppState,
    id: &str,
    generation: u64,
    excerpt: &str,
    outcome: ActionOutcome,
) -> Result<()> {
    if outcome.changed() {
        let updated = ReviewRepository::new(state.db())
            .mark_state(id, generation, excerpt, AnnotationState::Dismissed)
            .await?;
        tracing::debug!(
            session_id = id,
            generation,
            excerpt,
            updated,
            "Recorded annotation dismissal"
        );
    }
    Ok(())
}

/// Dismiss an annotation without touching the document
async fn dismiss_annotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(action): Json<AnnotationAction>,
) -> Result<Json<ActionOutcome>> {
    let session = state.session(&id).await?;
    let (outcome, generation) = {
        let mut session = session.lock().await;
        (session.dismiss(&action.excerpt), session.generation())
    };
    persist(&state, &id, generation, &action.excerpt, outcome).await?;
    Ok(Json(outcome))
}

/// Write an annotation's suggestion into the document
async fn replace_annotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(action): Json<AnnotationAction>,
) -> Result<Json<ActionOutcome>> {
    let session = state.session(&id).await?;
    let (outcome, generation) = {
        let mut session = session.lock().await;
        (session.replace(&action.excerpt), session.generation())
    };
    persist(&state, &id, generation, &action.excerpt, outcome).await?;
    Ok(Json(outcome))
}

/// Select the first occurrence of an annotation's excerpt
async fn focus_annotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(action): Json<AnnotationAction>,
) -> Result<Json<FocusResponse>> {
    let session = state.session(&id).await?;
    let anchor = session
        .lock()
        .await
        .focus(&action.excerpt)
        .ok_or_else(|| {
            AppError::NotFound(format!("Excerpt not found in document: {}", action.excerpt))
        })?;
    Ok(Json(FocusResponse { anchor }))
}
