// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::common::config::Config;
use crate::services::{GoogleClient, SessionService};
use crate::users::UserDirectory;

/// Application state containing the database pool, adapters, and configuration
///
/// All external clients are constructed once in `main` and injected here;
/// nothing else reads the environment or builds its own clients.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub google: Arc<GoogleClient>,
    pub sessions: Arc<SessionService>,
    pub users: UserDirectory,
}
