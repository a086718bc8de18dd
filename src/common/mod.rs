// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod migrations;
pub mod state;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::ApiError;
pub use helpers::safe_email_log;
pub use state::AppState;
