//! Route modules for Tensaku Server

pub mod annotations;
pub mod health;
pub mod reviews;
pub mod sessions;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Build the application router
///
/// Middleware layers (tracing, CORS) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1/health", health::router())
        .nest(
            "/api/v1/sessions",
            sessions::router()
                .merge(reviews::router())
                .merge(annotations::router()),
        )
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use super::testing;

    #[tokio::test]
    async fn test_health() {
        let (server, _) = testing::server().await;

        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["sessions"], 0);

        server.get("/api/v1/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (server, _) = testing::server().await;

        let response = server.get("/api/v1/sessions/missing").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "not_found");
    }
}
