//! Review session API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{ReviewRepository, ReviewRun, StoredAnnotation};
use crate::document::{Document, DocumentError};
use crate::error::{AppError, Result};
use crate::review::{AnchoredAnnotation, ReviewPhase, TextAnchor};
use crate::state::AppState;

/// Create the sessions router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", get(get_session).delete(delete_session))
        .route("/:id/html", get(render_session))
        .route("/:id/history", get(session_history))
}

/// Document to review, as plain text or HTML
#[derive(Debug, Deserialize)]
pub struct CreateSession {
    pub text: Option<String>,
    pub html: Option<String>,
}

/// Current state of a session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub generation: u64,
    pub phase: ReviewPhase,
    pub loading: bool,
    pub paragraphs: Vec<String>,
    pub highlights: Vec<TextAnchor>,
    pub selection: Option<TextAnchor>,
    pub annotations: Vec<AnchoredAnnotation>,
}

/// A past run with the recorded fate of its annotations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunHistory {
    #[serde(flatten)]
    pub run: ReviewRun,
    pub annotations: Vec<StoredAnnotation>,
}

async fn view(state: &AppState, id: &str) -> Result<SessionView> {
    let session = state.session(id).await?;
    let session = session.lock().await;
    let document = session.editor();

    Ok(SessionView {
        id: id.to_string(),
        generation: session.generation(),
        phase: session.phase(),
        loading: session.is_loading(),
        paragraphs: document.paragraphs().to_vec(),
        highlights: document.highlights().to_vec(),
        selection: document.selection(),
        annotations: session.anchored(),
    })
}

/// Open a session over a new document
async fn create_session(
    State(state): State<AppState>,
    Json(data): Json<CreateSession>,
) -> Result<(StatusCode, Json<SessionView>)> {
    let document = match (data.text, data.html) {
        (Some(text), None) => Document::from_text(&text),
        (None, Some(html)) => Document::from_html(&html)?,
        _ => {
            return Err(AppError::BadRequest(
                "Exactly one of `text` or `html` is required".to_string(),
            ))
        }
    };

    let chars = document.text().chars().count();
    let limit = state.config().review.max_document_chars;
    if chars > limit {
        return Err(DocumentError::TooLarge(chars, limit).into());
    }

    let id = state.open_session(document).await?;
    tracing::info!(session_id = %id, chars, "Created review session");

    Ok((StatusCode::CREATED, Json(view(&state, &id).await?)))
}

/// Get a session's document and annotations
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>> {
    Ok(Json(view(&state, &id).await?))
}

/// Close a session and forget its history
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if !state.close_session(&id).await {
        return Err(AppError::NotFound(format!("Session not found: {}", id)));
    }

    let removed = ReviewRepository::new(state.db()).delete_session(&id).await?;
    tracing::debug!(session_id = %id, runs = removed, "Deleted session history");

    Ok(StatusCode::NO_CONTENT)
}

/// Render the document with highlights as HTML
async fn render_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let session = state.session(&id).await?;
    let config = state.config().review.highlight_config();
    let html = session.lock().await.editor().to_html(&config);
    Ok(Html(html))
}

/// List finished runs for a session, newest first
async fn session_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RunHistory>>> {
    let repo = ReviewRepository::new(state.db());
    let mut history = Vec::new();
    for run in repo.list_runs(&id).await? {
        let annotations = repo.list_annotations(&run.id).await?;
        history.push(RunHistory { run, annotations });
    }
    Ok(Json(history))
}
