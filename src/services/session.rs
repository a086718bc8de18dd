// src/services/session.rs
//! Session token service
//!
//! Issues and verifies the signed bearer credential handed to the browser
//! after a successful sign-in. Verification is a pure function of the token,
//! the signing secret and the clock; there is no server-side session state
//! and no revocation list.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::users::User;

/// Fixed session lifetime
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Deliberately uniform: expired, malformed and forged tokens are not
    /// distinguished to the caller.
    #[error("invalid or expired token")]
    Invalid,

    #[error("token signing failed")]
    Signing,
}

/// JWT claims structure
///
/// Self-contained identity for the session; `/auth/me` answers from these
/// claims without a directory lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct SessionService {
    secret: String,
}

impl SessionService {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Mint a session token for a resolved user
    pub fn issue(&self, user: &User) -> Result<String, SessionError> {
        let iat = Utc::now().timestamp() as usize;
        let exp = (Utc::now() + Duration::days(SESSION_TTL_DAYS)).timestamp() as usize;

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            iat,
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            warn!(error = %e, "JWT encoding failed");
            SessionError::Signing
        })
    }

    /// Check signature and expiry, returning the claim set
    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| SessionError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: "a2b6d1de-9161-4c5f-a9c8-000000000001".to_string(),
            email: "jane@example.com".to_string(),
            name: Some("Jane Doe".to_string()),
            avatar_url: Some("https://lh3.googleusercontent.com/a/photo".to_string()),
            google_id: Some("117000000000000000001".to_string()),
            email_verified: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_verify_roundtrip_matches_issuing_user() {
        let sessions = SessionService::new("test-secret");
        let user = test_user();

        let token = sessions.issue(&user).unwrap();
        let claims = sessions.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.name, user.name);
        assert_eq!(claims.avatar_url, user.avatar_url);
        assert_eq!(claims.exp as i64 - claims.iat as i64, SESSION_TTL_DAYS * 86_400);
    }

    #[test]
    fn test_expired_token_fails_uniformly() {
        let sessions = SessionService::new("test-secret");

        // Well-formed, correctly signed, but past expiry
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "user-1".to_string(),
            email: "jane@example.com".to_string(),
            name: None,
            avatar_url: None,
            iat: now - 8 * 86_400,
            exp: now - 86_400,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(sessions.verify(&token), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_garbage_token_fails_uniformly() {
        let sessions = SessionService::new("test-secret");
        assert!(matches!(
            sessions.verify("not.a.jwt"),
            Err(SessionError::Invalid)
        ));
        assert!(matches!(sessions.verify(""), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_wrong_secret_fails_uniformly() {
        let issuing = SessionService::new("secret-a");
        let verifying = SessionService::new("secret-b");

        let token = issuing.issue(&test_user()).unwrap();
        assert!(matches!(
            verifying.verify(&token),
            Err(SessionError::Invalid)
        ));
    }

    #[test]
    fn test_tampered_token_fails_uniformly() {
        let sessions = SessionService::new("test-secret");
        let mut token = sessions.issue(&test_user()).unwrap();
        token.push('x');

        assert!(matches!(sessions.verify(&token), Err(SessionError::Invalid)));
    }
}
