use crate::config::db::DbProfile;
use crate::config::game::GameConfig;
use crate::config::retention::RetentionConfig;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::state::app_state::AppState;

/// Builder for [`AppState`], shared by `main`, the retention binary and tests.
pub struct StateBuilder {
    db_profile: Option<DbProfile>,
    game: GameConfig,
    retention: RetentionConfig,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            db_profile: None,
            game: GameConfig::default(),
            retention: RetentionConfig::default(),
        }
    }

    pub fn with_db(mut self, profile: DbProfile) -> Self {
        self.db_profile = Some(profile);
        self
    }

    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    pub fn with_retention(mut self, retention: RetentionConfig) -> Self {
        self.retention = retention;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        match self.db_profile {
            Some(profile) => {
                let conn = bootstrap_db(profile).await?;
                Ok(AppState::new(conn, self.game, self.retention))
            }
            None => Ok(AppState::without_db(self.game, self.retention)),
        }
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_without_db() {
        let state = build_state().build().await.unwrap();
        assert!(state.db().is_none());
        assert_eq!(state.game, GameConfig::default());
    }

    #[tokio::test]
    async fn builds_with_in_memory_db() {
        let state = build_state()
            .with_db(DbProfile::InMemory)
            .build()
            .await
            .unwrap();
        assert!(state.db().is_some());
    }
}
