use std::sync::Arc;

use sqlx::SqlitePool;

use crate::services::RosterService;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub roster: Arc<RosterService>,
}
