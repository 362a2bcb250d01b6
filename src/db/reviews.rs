//! Review run database operations

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::review::{Annotation, AnnotationState, ReviewOutcome};

/// A finished review run
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRun {
    pub id: String,
    pub session_id: String,
    pub generation: i64,
    pub annotation_count: i64,
    pub finished_at: String,
}

/// An annotation as recorded for a run
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnnotation {
    pub id: String,
    pub run_id: String,
    pub excerpt: String,
    pub replace_text: Option<String>,
    pub comment: Option<String>,
    pub state: String,
    pub updated_at: String,
}

/// Review run repository
pub struct ReviewRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReviewRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a finished run together with its annotations
    pub async fn record_run(
        &self,
        session_id: &str,
        outcome: &ReviewOutcome,
        annotations: &[Annotation],
    ) -> Result<ReviewRun> {
        let now = Utc::now().to_rfc3339();
        let run = ReviewRun {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            generation: outcome.generation as i64,
            annotation_count: outcome.annotation_count as i64,
            finished_at: now.clone(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO review_runs (id, session_id, generation, annotation_count, finished_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&run.id)
        .bind(&run.session_id)
        .bind(run.generation)
        .bind(run.annotation_count)
        .bind(&run.finished_at)
        .execute(&mut *tx)
        .await?;

        for annotation in annotations {
            sqlx::query(
                r#"
                INSERT INTO review_annotations (
                    id, run_id, session_id, excerpt, replace_text, comment, state, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&run.id)
            .bind(session_id)
            .bind(&annotation.excerpt)
            .bind(&annotation.replace)
            .bind(&annotation.comment)
            .bind(AnnotationState::Pending.as_str())
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            run_id = %run.id,
            session_id = session_id,
            annotations = annotations.len(),
            "Recorded review run"
        );

        Ok(run)
    }

    /// Update the recorded state of annotations with this excerpt in one run
    ///
    /// Other runs of the session keep their history. A run that has not
    /// been recorded yet matches nothing.
    pub async fn mark_state(
        &self,
        session_id: &str,
        generation: u64,
        excerpt: &str,
        state: AnnotationState,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE review_annotations
            SET state = ?, updated_at = ?
            WHERE excerpt = ? AND run_id IN (
                SELECT id FROM review_runs
                WHERE session_id = ? AND generation = ?
            )
            "#,
        )
        .bind(state.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(excerpt)
        .bind(session_id)
        .bind(generation as i64)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Runs for a session, newest first
    pub async fn list_runs(&self, session_id: &str) -> Result<Vec<ReviewRun>> {
        let runs = sqlx::query_as::<_, ReviewRun>(
            r#"
            SELECT id, session_id, generation, annotation_count, finished_at
            FROM review_runs
            WHERE session_id = ?
            ORDER BY generation DESC
            "#,
        )
        .bind(session_id)
        .fetch_all(self.pool)
        .await?;

        Ok(runs)
    }

    /// Annotations recorded for a run, in extraction order
    pub async fn list_annotations(&self, run_id: &str) -> Result<Vec<StoredAnnotation>> {
        let annotations = sqlx::query_as::<_, StoredAnnotation>(
            r#"
            SELECT id, run_id, excerpt, replace_text, comment, state, updated_at
            FROM review_annotations
            WHERE run_id = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(run_id)
        .fetch_all(self.pool)
        .await?;

        Ok(annotations)
    }

    /// Delete every run recorded for a session
    pub async fn delete_session(&self, session_id: &str) -> Result<u64> {
        sqlx::query("DELETE FROM review_annotations WHERE session_id = ?")
            .bind(session_id)
            .execute(self.pool)
            .await?;

        let result = sqlx::query("DELETE FROM review_runs WHERE session_id = ?")
            .bind(session_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
