use super::parse_var;
use crate::error::AppError;

/// Rules that shape a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Cards dealt per session
    pub deck_size: usize,
    /// Player cap for matchmade sessions
    pub max_players: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            deck_size: 20,
            max_players: 4,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let d = Self::default();
        let cfg = Self {
            deck_size: parse_var("GAME_DECK_SIZE", d.deck_size)?,
            max_players: parse_var("GAME_MAX_PLAYERS", d.max_players)?,
        };
        if cfg.deck_size == 0 {
            return Err(AppError::config("GAME_DECK_SIZE must be at least 1"));
        }
        if !(2..=8).contains(&cfg.max_players) {
            return Err(AppError::config("GAME_MAX_PLAYERS must be between 2 and 8"));
        }
        Ok(cfg)
    }
}
