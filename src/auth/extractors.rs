//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::COOKIE, request::Parts},
};
use cookie::Cookie;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::common::{ApiError, AppState};
use crate::services::Claims;

/// Name of the session cookie set on a successful callback
pub const SESSION_COOKIE: &str = "session";

/// Authenticated user extractor
///
/// Verifies the session cookie and exposes the decoded claims. Claims are
/// self-contained, so this never touches the database.
#[derive(Debug)]
pub struct AuthedUser {
    pub claims: Claims,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let token = parts
            .headers
            .get(COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|raw| {
                Cookie::split_parse(raw.to_owned())
                    .filter_map(|c| c.ok())
                    .find(|c| c.name() == SESSION_COOKIE)
                    .map(|c| c.value().to_string())
            });

        let token = match token {
            Some(t) => t,
            None => {
                warn!("Authentication failed: no session cookie");
                return Err(ApiError::Unauthorized("no token provided".into()));
            }
        };

        match app_state.sessions.verify(&token) {
            Ok(claims) => Ok(AuthedUser { claims }),
            Err(_) => {
                warn!("Session token verification failed");
                Err(ApiError::Unauthorized("invalid or expired token".into()))
            }
        }
    }
}
