//! Application configuration
//!
//! All external configuration is collected into one validated struct built
//! once at startup. Required secrets (Google credentials, JWT signing secret)
//! are fatal when absent; nothing reads the environment after this point.

use anyhow::{Context, Result};
use std::env;

/// Deployment environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub google_client_id: String,
    pub google_client_secret: String,
    /// Callback URL registered with Google, e.g.
    /// `http://localhost:8080/auth/google/callback`
    pub oauth_redirect_url: String,
    pub jwt_secret: String,
    /// Where the browser is sent after a successful callback
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
    pub environment: Environment,
    /// Drop and recreate tables on startup (development only)
    pub reset_db: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let environment = match env::var("ENVIRONMENT").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        let api_url = env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:8080".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://auth_api.db".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .context("GOOGLE_CLIENT_ID must be set")?,
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .context("GOOGLE_CLIENT_SECRET must be set")?,
            oauth_redirect_url: env::var("GOOGLE_OAUTH_REDIRECT_URI")
                .unwrap_or_else(|_| format!("{}/auth/google/callback", api_url)),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            cors_origins,
            environment,
            reset_db: env::var("RESET_DB").as_deref() == Ok("true"),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for tests; never touches the environment.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            google_client_id: "test-client-id".to_string(),
            google_client_secret: "test-client-secret".to_string(),
            oauth_redirect_url: "http://localhost:8080/auth/google/callback".to_string(),
            jwt_secret: "test-jwt-secret".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            environment: Environment::Development,
            reset_db: false,
        }
    }
}
