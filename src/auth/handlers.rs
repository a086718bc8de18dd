//! Authentication handlers

use axum::extract::{Extension, Query};
use axum::http::header;
use axum::response::{IntoResponse, Json, Redirect, Response};
use cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::extractors::{AuthedUser, SESSION_COOKIE};
use super::models::{AuthUser, CallbackParams, LogoutResponse, MeResponse};
use crate::common::helpers::safe_token_log;
use crate::common::{safe_email_log, ApiError, AppState};
use crate::services::{google::GoogleError, session::SESSION_TTL_DAYS};

/// GET /auth/google - Start the Google sign-in flow
///
/// Redirects the browser to Google's authorization page. No local state is
/// created.
pub async fn google_oauth_start(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Redirect {
    let state = state_lock.read().await.clone();
    let auth_url = state.google.authorization_url();

    info!("Redirecting to Google authorization endpoint");
    Redirect::to(&auth_url)
}

/// GET /auth/google/callback - Handle the redirect back from Google
///
/// Verifies the authorization code, resolves the user, mints a session token
/// and delivers it as an HTTP-only cookie before redirecting to the front end.
pub async fn google_oauth_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();

    if let Some(provider_error) = params.error {
        warn!(oauth_error = %provider_error, "Google returned an error on callback");
        return Err(ApiError::BadRequest("authorization was denied".to_string()));
    }

    let code = params.code.filter(|c| !c.is_empty()).ok_or_else(|| {
        warn!("OAuth callback missing authorization code");
        ApiError::BadRequest("no authorization code provided".to_string())
    })?;

    let identity = state.google.verify_code(&code).await.map_err(|e| match e {
        GoogleError::RequestFailed(msg) => {
            error!(error = %msg, "Google unreachable during code verification");
            ApiError::ServiceUnavailable("google sign-in unavailable".to_string())
        }
        GoogleError::MissingEmail => {
            warn!("Provider profile has no email address");
            ApiError::BadRequest("google account has no email address".to_string())
        }
        other => {
            warn!(error = %other, "Authorization code verification failed");
            ApiError::BadRequest("invalid authorization code".to_string())
        }
    })?;

    // All-or-nothing: a storage failure here leaves no partial user behind
    let user = state
        .users
        .upsert_from_identity(&identity)
        .await
        .map_err(ApiError::DatabaseError)?;

    let token = state
        .sessions
        .issue(&user)
        .map_err(|e| internal_error(&state, e))?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User authentication successful via Google OAuth"
    );
    debug!(token = %safe_token_log(&token), "Session token minted");

    let cookie = session_cookie(&token, state.config.is_production());
    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::to(&state.config.frontend_url),
    )
        .into_response())
}

/// GET /auth/me - Return the current user from the session claims
///
/// Claims are self-contained; no directory lookup happens here.
pub async fn me_handler(authed: AuthedUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: AuthUser::from(authed.claims),
    })
}

/// POST /auth/logout - Clear the session cookie
///
/// There is no server-side session state to invalidate, so this always
/// succeeds.
pub async fn logout_handler() -> impl IntoResponse {
    info!("User logout");
    (
        [(header::SET_COOKIE, clear_session_cookie().to_string())],
        Json(LogoutResponse { success: true }),
    )
}

// ---- Helper Functions ----

fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::days(SESSION_TTL_DAYS))
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::ZERO)
        .build()
}

fn internal_error(state: &AppState, err: impl std::fmt::Display) -> ApiError {
    error!(error = %err, "Unexpected failure in auth flow");
    if state.config.is_development() {
        ApiError::InternalServer(err.to_string())
    } else {
        ApiError::InternalServer("something went wrong".to_string())
    }
}
