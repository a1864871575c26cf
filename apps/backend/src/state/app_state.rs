use sea_orm::DatabaseConnection;

use crate::config::game::GameConfig;
use crate::config::retention::RetentionConfig;

/// Shared resources handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection (absent in health-only test setups)
    pub db: Option<DatabaseConnection>,
    pub game: GameConfig,
    pub retention: RetentionConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, game: GameConfig, retention: RetentionConfig) -> Self {
        Self {
            db: Some(db),
            game,
            retention,
        }
    }

    pub fn without_db(game: GameConfig, retention: RetentionConfig) -> Self {
        Self {
            db: None,
            game,
            retention,
        }
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }
}
