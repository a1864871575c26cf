//! DTOs for sessions_sea adapter.

use time::OffsetDateTime;

use crate::domain::session::SessionMode;

/// DTO for inserting a new session row.
#[derive(Debug, Clone)]
pub struct SessionCreate {
    pub id: String,
    pub mode: SessionMode,
    pub direction_map_json: String,
    pub cards_json: String,
    pub rng_seed: i64,
    pub max_players: u8,
    pub started_at: OffsetDateTime,
}

/// Optimistic update of a session row.
///
/// Every update bumps `lock_version` and `last_active_at`; the row must still
/// carry `expected_version`.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub id: String,
    pub expected_version: i32,
    pub last_active_at: OffsetDateTime,
    pub is_active: Option<bool>,
    /// Three-state: None = no change, Some(Some(ts)) = set, Some(None) = clear.
    pub ended_at: Option<Option<OffsetDateTime>>,
}

impl SessionUpdate {
    pub fn touch(id: impl Into<String>, expected_version: i32, now: OffsetDateTime) -> Self {
        Self {
            id: id.into(),
            expected_version,
            last_active_at: now,
            is_active: None,
            ended_at: None,
        }
    }

    /// Mark the session finished at `now`.
    pub fn ended(mut self, now: OffsetDateTime) -> Self {
        self.is_active = Some(false);
        self.ended_at = Some(Some(now));
        self
    }
}

/// New per-player progress for one session member.
#[derive(Debug, Clone)]
pub struct PlayerProgressUpdate {
    pub session_id: String,
    pub uid: String,
    pub score: u32,
    pub progress: u8,
    pub card_index: u32,
    pub is_complete: bool,
    pub finished_at: Option<OffsetDateTime>,
}
