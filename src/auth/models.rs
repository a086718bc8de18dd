//! Authentication request/response types

use serde::{Deserialize, Serialize};

use crate::services::Claims;

/// Query parameters Google appends to the callback redirect
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    #[allow(dead_code)]
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Public shape of the signed-in user, built from session claims
#[derive(Debug, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            avatar_url: claims.avatar_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AuthUser,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}
