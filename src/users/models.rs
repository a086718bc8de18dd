//! User data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub google_id: Option<String>,
    pub email_verified: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
