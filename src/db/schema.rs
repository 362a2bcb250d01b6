//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- One row per finished review run
CREATE TABLE IF NOT EXISTS review_runs (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    generation INTEGER NOT NULL,
    annotation_count INTEGER NOT NULL,
    finished_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_review_runs_session ON review_runs(session_id);

-- Annotations produced by a run and what the user did with them
CREATE TABLE IF NOT EXISTS review_annotations (
    id TEXT PRIMARY KEY,
    run_id TEXT NOT NULL REFERENCES review_runs(id) ON DELETE CASCADE,
    session_id TEXT NOT NULL,
    excerpt TEXT NOT NULL,
    replace_text TEXT,
    comment TEXT,
    state TEXT NOT NULL DEFAULT 'pending',
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_review_annotations_run ON review_annotations(run_id);
CREATE INDEX IF NOT EXISTS idx_review_annotations_excerpt ON review_annotations(session_id, excerpt);
"#;
