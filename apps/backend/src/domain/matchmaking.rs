//! Matchmaking queue entries and custom rooms.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use time::OffsetDateTime;

use crate::errors::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Waiting,
    Starting,
}

impl MatchStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Waiting => "waiting",
            MatchStatus::Starting => "starting",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(MatchStatus::Waiting),
            "starting" => Ok(MatchStatus::Starting),
            other => Err(DomainError::validation_other(format!(
                "Unknown matchmaking status: {other}"
            ))),
        }
    }
}

/// Open multiplayer session advertised to joiners; keyed by session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchmakingEntry {
    pub session_id: String,
    pub creator_id: String,
    pub player_count: u8,
    pub max_players: u8,
    pub status: MatchStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MatchmakingEntry {
    /// Can `uid` be matched into this entry?
    pub fn accepts(&self, uid: &str) -> bool {
        self.status == MatchStatus::Waiting
            && self.player_count < self.max_players
            && self.creator_id != uid
    }

    /// Entry after one more player joined.
    pub fn with_joined_player(&self) -> Self {
        let player_count = self.player_count.saturating_add(1).min(self.max_players);
        Self {
            player_count,
            status: if player_count >= self.max_players {
                MatchStatus::Starting
            } else {
                self.status
            },
            ..self.clone()
        }
    }
}

/// Oldest entry `uid` may join, if any.
pub fn pick_entry<'a>(entries: &'a [MatchmakingEntry], uid: &str) -> Option<&'a MatchmakingEntry> {
    entries
        .iter()
        .filter(|e| e.accepts(uid))
        .min_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Active,
    Closed,
}

impl RoomStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Active => "active",
            RoomStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(RoomStatus::Waiting),
            "active" => Ok(RoomStatus::Active),
            "closed" => Ok(RoomStatus::Closed),
            other => Err(DomainError::validation_other(format!(
                "Unknown room status: {other}"
            ))),
        }
    }
}

/// Host-created room; shares its id with the session it wraps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRoom {
    pub id: String,
    pub code: String,
    pub host_id: String,
    pub max_players: u8,
    pub status: RoomStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub const MIN_ROOM_PLAYERS: u8 = 2;
pub const MAX_ROOM_PLAYERS: u8 = 4;

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::Duration;

    use super::*;

    fn entry(id: &str, creator: &str, count: u8, mins: i64) -> MatchmakingEntry {
        MatchmakingEntry {
            session_id: id.into(),
            creator_id: creator.into(),
            player_count: count,
            max_players: 4,
            status: MatchStatus::Waiting,
            created_at: datetime!(2026-10-01 09:00 UTC) + Duration::minutes(mins),
        }
    }

    #[test]
    fn picks_oldest_open_entry_not_own() {
        let entries = vec![
            entry("own", "me", 1, 0),
            entry("newer", "x", 1, 10),
            entry("older", "y", 2, 5),
            entry("full", "z", 4, 1),
        ];
        assert_eq!(pick_entry(&entries, "me").unwrap().session_id, "older");
    }

    #[test]
    fn none_when_nothing_fits() {
        let entries = vec![entry("own", "me", 1, 0)];
        assert!(pick_entry(&entries, "me").is_none());
    }

    #[test]
    fn joining_last_seat_starts() {
        let e = entry("s", "x", 3, 0).with_joined_player();
        assert_eq!(e.player_count, 4);
        assert_eq!(e.status, MatchStatus::Starting);
        let e = entry("s", "x", 1, 0).with_joined_player();
        assert_eq!(e.status, MatchStatus::Waiting);
    }
}
