//! Game session state and the pure transitions applied to it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use time::OffsetDateTime;

use super::catalog::Car;
use super::direction::{Direction, DirectionMap};
use super::scoring::{game_result, judge_swipe, progress_percent, SwipeOutcome};
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Single,
    Multi,
    Custom,
}

impl SessionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            SessionMode::Single => "single",
            SessionMode::Multi => "multi",
            SessionMode::Custom => "custom",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(SessionMode::Single),
            "multi" => Ok(SessionMode::Multi),
            "custom" => Ok(SessionMode::Custom),
            other => Err(DomainError::validation_other(format!(
                "Unknown session mode: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlayer {
    pub uid: String,
    pub display_name: String,
    pub score: u32,
    pub progress: u8,
    pub card_index: u32,
    pub is_complete: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
}

impl SessionPlayer {
    pub fn new(uid: impl Into<String>, display_name: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            uid: uid.into(),
            display_name: display_name.into(),
            score: 0,
            progress: 0,
            card_index: 0,
            is_complete: false,
            joined_at: now,
            finished_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: String,
    pub mode: SessionMode,
    pub players: Vec<SessionPlayer>,
    pub direction_map: DirectionMap,
    pub cars: Vec<Car>,
    #[serde(skip)]
    pub rng_seed: i64,
    pub max_players: u8,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_active_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    pub lock_version: i32,
}

impl GameSession {
    pub fn player(&self, uid: &str) -> Option<&SessionPlayer> {
        self.players.iter().find(|p| p.uid == uid)
    }

    pub fn has_player(&self, uid: &str) -> bool {
        self.player(uid).is_some()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= usize::from(self.max_players)
    }

    /// True once there is at least one player and every player is complete.
    pub fn all_complete(&self) -> bool {
        !self.players.is_empty() && self.players.iter().all(|p| p.is_complete)
    }
}

/// `name` trimmed, or `Guest-<first five chars of uid>` when blank or absent.
pub fn display_name_or_guest(uid: &str, name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => n.to_string(),
        None => {
            let prefix: String = uid.chars().take(5).collect();
            format!("Guest-{prefix}")
        }
    }
}

/// Judge `uid`'s current card and return the player's next state.
///
/// Rejects inactive sessions, non-members and players who already finished.
pub fn apply_swipe(
    session: &GameSession,
    uid: &str,
    direction: Direction,
    now: OffsetDateTime,
) -> Result<(SessionPlayer, SwipeOutcome), DomainError> {
    if !session.is_active {
        return Err(DomainError::validation(
            ValidationKind::SessionInactive,
            format!("Session {} is no longer active", session.id),
        ));
    }
    let player = session.player(uid).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::NotInSession,
            format!("Player is not part of session {}", session.id),
        )
    })?;

    let total = session.cars.len();
    let index = player.card_index as usize;
    let card = match session.cars.get(index) {
        Some(card) if !player.is_complete => card,
        _ => {
            return Err(DomainError::validation(
                ValidationKind::PlayerAlreadyComplete,
                "Player has already finished this deck",
            ))
        }
    };

    let correct = judge_swipe(&session.direction_map, card, direction);
    let mut next = player.clone();
    next.score += u32::from(correct);
    next.card_index = (index + 1) as u32;
    next.progress = progress_percent(index + 1, total);

    let completed = index + 1 >= total;
    let result = if completed {
        next.is_complete = true;
        next.finished_at = Some(now);
        Some(game_result(next.score, total as u32, session.started_at, now))
    } else {
        None
    };

    let outcome = SwipeOutcome {
        correct,
        score: next.score,
        next_index: next.card_index,
        progress: next.progress,
        completed,
        result,
    };
    Ok((next, outcome))
}
