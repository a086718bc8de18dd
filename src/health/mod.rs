//! Health check endpoint used by deployment tooling

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::{routing::get, Router};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::error;

use crate::common::AppState;

pub fn health_routes() -> Router {
    Router::new().route("/api/health", get(health_check))
}

/// GET /api/health - Verify database connectivity
async fn health_check(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> impl IntoResponse {
    let state = state_lock.read().await.clone();

    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "timestamp": Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => {
            error!(error = %e, "Health check database probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "error",
                    "message": "Database unavailable",
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{migrations::run_migrations, Config};
    use crate::services::{GoogleClient, SessionService};
    use crate::users::UserDirectory;
    use axum::body::Body;
    use axum::http::Request;
    use sqlx::sqlite::SqlitePoolOptions;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_ok_with_reachable_database() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool, false).await.unwrap();

        let config = Config::for_tests();
        let state = AppState {
            db: pool.clone(),
            google: Arc::new(GoogleClient::new(&config)),
            sessions: Arc::new(SessionService::new(config.jwt_secret.clone())),
            users: UserDirectory::new(pool),
            config,
        };
        let app = health_routes().layer(Extension(Arc::new(RwLock::new(state))));

        let resp = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
