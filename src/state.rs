//! Application state management

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::Config;
use crate::document::Document;
use crate::error::{AppError, Result};
use crate::review::{RecordingObserver, ReviewSession};

/// A live review session shared between requests
pub type SharedSession = Arc<Mutex<ReviewSession<Document, RecordingObserver>>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config, db: SqlitePool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Register a session for `document` and return its id
    pub async fn open_session(&self, document: Document) -> Result<String> {
        let mut sessions = self.inner.sessions.write().await;
        let limit = self.inner.config.review.max_sessions;
        if sessions.len() >= limit {
            return Err(AppError::BadRequest(format!(
                "Session limit reached ({})",
                limit
            )));
        }

        let id = Uuid::new_v4().to_string();
        let session = ReviewSession::with_observer(document, RecordingObserver::default());
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        tracing::debug!(session_id = %id, open = sessions.len(), "Opened review session");

        Ok(id)
    }

    /// Look up a live session
    pub async fn session(&self, id: &str) -> Result<SharedSession> {
        self.inner
            .sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session not found: {}", id)))
    }

    /// Drop a session, returning whether it existed
    pub async fn close_session(&self, id: &str) -> bool {
        let removed = self.inner.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::debug!(session_id = id, "Closed review session");
        }
        removed
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }
}
