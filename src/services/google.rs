// src/services/google.rs
//! Google OAuth client
//!
//! Wraps the authorization-code exchange and userinfo lookup. The only thing
//! that leaves this module is a fully-populated [`GoogleIdentity`]; malformed
//! or incomplete provider payloads are rejected at this boundary.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::common::Config;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("authorization code rejected: {0}")]
    ExchangeRejected(String),

    #[error("provider profile has no email address")]
    MissingEmail,

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("HTTP request to Google failed: {0}")]
    RequestFailed(String),
}

/// Verified identity assertion produced by a successful code exchange
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    pub subject: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[allow(dead_code)]
    pub token_type: Option<String>,
    #[allow(dead_code)]
    pub expires_in: Option<i64>,
}

/// Raw userinfo payload as Google returns it
#[derive(Debug, Deserialize)]
struct UserInfo {
    id: String,
    email: Option<String>,
    verified_email: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleClient {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    http: Client,
}

impl GoogleClient {
    pub fn new(config: &Config) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.oauth_redirect_url.clone(),
            http,
        }
    }

    /// Build the Google authorization URL for the sign-in redirect
    ///
    /// Scopes: openid, email, profile - basic identity only.
    pub fn authorization_url(&self) -> String {
        let scope_param = ["openid", "email", "profile"].join(" ");

        // State is sent but not round-trip validated; the flow keeps no
        // server-side request state.
        let state = Uuid::new_v4().to_string();

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            AUTHORIZATION_ENDPOINT,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode(&scope_param),
            state
        )
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, GoogleError> {
        let params = [
            ("code", code),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_url),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, error = %error_text, "Token exchange failed");
            return Err(GoogleError::ExchangeRejected(format!("HTTP {}", status)));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GoogleError::MalformedResponse(e.to_string()))
    }

    /// Fetch the user's profile with an access token
    pub async fn fetch_identity(&self, access_token: &str) -> Result<GoogleIdentity, GoogleError> {
        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Userinfo request rejected");
            return Err(GoogleError::ExchangeRejected(format!("HTTP {}", status)));
        }

        let info = response
            .json::<UserInfo>()
            .await
            .map_err(|e| GoogleError::MalformedResponse(e.to_string()))?;

        GoogleIdentity::from_userinfo(info)
    }

    /// Full callback-side verification: code -> tokens -> identity
    pub async fn verify_code(&self, code: &str) -> Result<GoogleIdentity, GoogleError> {
        let tokens = self.exchange_code(code).await?;
        self.fetch_identity(&tokens.access_token).await
    }
}

impl GoogleIdentity {
    fn from_userinfo(info: UserInfo) -> Result<Self, GoogleError> {
        let email = match info.email {
            Some(e) if !e.trim().is_empty() => e,
            _ => return Err(GoogleError::MissingEmail),
        };

        Ok(Self {
            subject: info.id,
            email,
            email_verified: info.verified_email.unwrap_or(false),
            name: info.name.filter(|n| !n.is_empty()),
            avatar_url: info.picture.filter(|p| !p.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GoogleClient {
        GoogleClient::new(&Config::for_tests())
    }

    #[test]
    fn test_authorization_url_contains_required_params() {
        let url = test_client().authorization_url();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("redirect_uri=http"));
        assert!(url.contains("state="));
    }

    #[test]
    fn test_identity_from_complete_userinfo() {
        let info: UserInfo = serde_json::from_str(
            r#"{
                "id": "117000000000000000001",
                "email": "jane@example.com",
                "verified_email": true,
                "name": "Jane Doe",
                "picture": "https://lh3.googleusercontent.com/a/photo"
            }"#,
        )
        .unwrap();

        let identity = GoogleIdentity::from_userinfo(info).unwrap();
        assert_eq!(identity.subject, "117000000000000000001");
        assert_eq!(identity.email, "jane@example.com");
        assert!(identity.email_verified);
        assert_eq!(identity.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_identity_rejects_missing_email() {
        let info: UserInfo =
            serde_json::from_str(r#"{"id": "123", "name": "No Email"}"#).unwrap();

        assert!(matches!(
            GoogleIdentity::from_userinfo(info),
            Err(GoogleError::MissingEmail)
        ));
    }

    #[test]
    fn test_identity_rejects_empty_email() {
        let info: UserInfo =
            serde_json::from_str(r#"{"id": "123", "email": "  "}"#).unwrap();

        assert!(matches!(
            GoogleIdentity::from_userinfo(info),
            Err(GoogleError::MissingEmail)
        ));
    }

    #[test]
    fn test_identity_defaults_unverified_email() {
        let info: UserInfo =
            serde_json::from_str(r#"{"id": "123", "email": "a@b.co"}"#).unwrap();

        let identity = GoogleIdentity::from_userinfo(info).unwrap();
        assert!(!identity.email_verified);
        assert!(identity.name.is_none());
        assert!(identity.avatar_url.is_none());
    }
}
