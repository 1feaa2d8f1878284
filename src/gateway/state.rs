use std::sync::Arc;

use crate::auth::AuthService;
use crate::db::Database;

/// Shared gateway application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL card/user storage
    pub db: Arc<Database>,
    /// Token service (login, registration, verification)
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(db: Arc<Database>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }
}
