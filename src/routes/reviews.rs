//! Review run API routes
//!
//! A run is started with `POST /:id/reviews`, fed either delta by delta or
//! as one streamed request body, and completed with `finish`. Only the run
//! whose generation is current may feed or finish.

use axum::{
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::ReviewRepository;
use crate::error::Result;
use crate::review::{drive_review_bytes, DeltaOutcome, ReviewOutcome, ReviewTicket};
use crate::state::{AppState, SharedSession};

/// Create the reviews router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/reviews", post(begin_review))
        .route("/:id/reviews/current", delete(cancel_review))
        .route("/:id/reviews/:generation/deltas", post(push_delta))
        .route("/:id/reviews/:generation/stream", post(stream_review))
        .route("/:id/reviews/:generation/finish", post(finish_review))
}

/// A completed run and where it was recorded
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishResponse {
    #[serde(flatten)]
    pub outcome: ReviewOutcome,
    pub run_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub cancelled: Option<u64>,
    pub generation: u64,
}

/// Store the run and the annotations left on display
async fn record(
    state: &AppState,
    id: &str,
    session: &SharedSession,
    outcome: ReviewOutcome,
) -> Result<FinishResponse> {
    let visible = session.lock().await.visible();
    let run = ReviewRepository::new(state.db())
        .record_run(id, &outcome, &visible)
        .await?;

    Ok(FinishResponse {
        outcome,
        run_id: run.id,
    })
}

/// Start a new run
async fn begin_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ReviewTicket>)> {
    let session = state.session(&id).await?;
    let ticket = session.lock().await.begin_review()?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Feed one delta of model output
async fn push_delta(
    State(state): State<AppState>,
    Path((id, generation)): Path<(String, u64)>,
    delta: String,
) -> Result<Json<DeltaOutcome>> {
    let session = state.session(&id).await?;
    let ticket = ReviewTicket::for_generation(generation);
    let outcome = session.lock().await.push_delta(&ticket, &delta);
    Ok(Json(outcome))
}

/// Feed the whole request body as a stream of deltas, then finish
async fn stream_review(
    State(state): State<AppState>,
    Path((id, generation)): Path<(String, u64)>,
    body: Body,
) -> Result<Json<FinishResponse>> {
    let session = state.session(&id).await?;
    let ticket = ReviewTicket::for_generation(generation);

    let outcome = drive_review_bytes(&*session, &ticket, body.into_data_stream()).await?;
    Ok(Json(record(&state, &id, &session, outcome).await?))
}

/// Complete a run fed through `deltas`
async fn finish_review(
    State(state): State<AppState>,
    Path((id, generation)): Path<(String, u64)>,
) -> Result<Json<FinishResponse>> {
    let session = state.session(&id).await?;
    let ticket = ReviewTicket::for_generation(generation);

    let outcome = session.lock().await.finish_review(&ticket)?;
    Ok(Json(record(&state, &id, &session, outcome).await?))
}

/// Abandon the in-flight run
async fn cancel_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    let cancelled = session.cancel_review();

    Ok(Json(CancelResponse {
        cancelled,
        generation: session.generation(),
    }))
}
