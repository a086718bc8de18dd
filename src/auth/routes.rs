//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /auth/google` - Redirect to Google's authorization page
/// - `GET /auth/google/callback` - OAuth callback, sets the session cookie
/// - `GET /auth/me` - Current user from the session claims
/// - `POST /auth/logout` - Clear the session cookie
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/google", get(handlers::google_oauth_start))
        .route("/auth/google/callback", get(handlers::google_oauth_callback))
        .route("/auth/me", get(handlers::me_handler))
        .route("/auth/logout", post(handlers::logout_handler))
}
