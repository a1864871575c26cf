//! Custom room and matchmaking repository functions for domain layer.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::{matchmaking_sea, rooms_sea};
use crate::domain::matchmaking::{CustomRoom, MatchmakingEntry, RoomStatus};
use crate::domain::time_util::{from_millis, to_millis};
use crate::entities::{custom_rooms, matchmaking};
use crate::errors::domain::{DomainError, NotFoundKind};

impl TryFrom<custom_rooms::Model> for CustomRoom {
    type Error = DomainError;

    fn try_from(m: custom_rooms::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            status: m.status.parse()?,
            id: m.id,
            code: m.code,
            host_id: m.host_id,
            max_players: u8::try_from(m.max_players).unwrap_or(u8::MAX),
            created_at: from_millis(m.created_at),
        })
    }
}

impl TryFrom<matchmaking::Model> for MatchmakingEntry {
    type Error = DomainError;

    fn try_from(m: matchmaking::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            status: m.status.parse()?,
            session_id: m.session_id,
            creator_id: m.creator_id,
            player_count: u8::try_from(m.player_count).unwrap_or(0),
            max_players: u8::try_from(m.max_players).unwrap_or(u8::MAX),
            created_at: from_millis(m.created_at),
        })
    }
}

fn room_not_found(what: &str) -> DomainError {
    DomainError::not_found(NotFoundKind::Room, format!("Room {what} not found"))
}

pub async fn create_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room: &CustomRoom,
) -> Result<(), DomainError> {
    rooms_sea::create_room(
        conn,
        &room.id,
        &room.code,
        &room.host_id,
        room.max_players,
        room.created_at,
    )
    .await?;
    Ok(())
}

pub async fn require_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: &str,
) -> Result<CustomRoom, DomainError> {
    rooms_sea::find_by_id(conn, room_id)
        .await?
        .ok_or_else(|| room_not_found(room_id))?
        .try_into()
}

/// Look up by an already normalized join code.
pub async fn require_room_by_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<CustomRoom, DomainError> {
    rooms_sea::find_by_code(conn, code)
        .await?
        .ok_or_else(|| room_not_found(code))?
        .try_into()
}

pub async fn code_taken<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<bool, DomainError> {
    Ok(rooms_sea::find_by_code(conn, code).await?.is_some())
}

pub async fn set_room_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: &str,
    status: RoomStatus,
) -> Result<(), DomainError> {
    match rooms_sea::update_status(conn, room_id, status).await {
        Ok(()) => Ok(()),
        Err(sea_orm::DbErr::RecordNotFound(_)) => Err(room_not_found(room_id)),
        Err(e) => Err(e.into()),
    }
}

pub async fn rooms_created_before<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cutoff: OffsetDateTime,
) -> Result<Vec<CustomRoom>, DomainError> {
    rooms_sea::find_created_before(conn, to_millis(cutoff))
        .await?
        .into_iter()
        .map(CustomRoom::try_from)
        .collect()
}

pub async fn delete_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: &str,
) -> Result<u64, DomainError> {
    Ok(rooms_sea::delete_by_id(conn, room_id).await?)
}

pub async fn create_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    entry: &MatchmakingEntry,
) -> Result<(), DomainError> {
    matchmaking_sea::create_entry(
        conn,
        &entry.session_id,
        &entry.creator_id,
        entry.max_players,
        entry.created_at,
    )
    .await?;
    Ok(())
}

pub async fn find_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<MatchmakingEntry>, DomainError> {
    matchmaking_sea::find_by_session(conn, session_id)
        .await?
        .map(MatchmakingEntry::try_from)
        .transpose()
}

/// Waiting entries `uid` did not create, oldest first.
pub async fn open_entries<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    uid: &str,
) -> Result<Vec<MatchmakingEntry>, DomainError> {
    matchmaking_sea::find_open(conn, uid)
        .await?
        .into_iter()
        .map(MatchmakingEntry::try_from)
        .collect()
}

/// Persist `next` as the successor of `previous`; fails if another join got there first.
pub async fn advance_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    previous: &MatchmakingEntry,
    next: &MatchmakingEntry,
) -> Result<(), DomainError> {
    matchmaking_sea::update_count(
        conn,
        &previous.session_id,
        previous.player_count,
        next.player_count,
        next.status,
    )
    .await?;
    Ok(())
}

pub async fn entries_created_before<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cutoff: OffsetDateTime,
) -> Result<Vec<MatchmakingEntry>, DomainError> {
    matchmaking_sea::find_created_before(conn, to_millis(cutoff))
        .await?
        .into_iter()
        .map(MatchmakingEntry::try_from)
        .collect()
}

pub async fn delete_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<u64, DomainError> {
    Ok(matchmaking_sea::delete_by_session(conn, session_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matchmaking::MatchStatus;

    #[test]
    fn unknown_status_is_rejected() {
        let model = matchmaking::Model {
            session_id: "s".into(),
            creator_id: "c".into(),
            player_count: 1,
            max_players: 4,
            status: "paused".into(),
            created_at: 0,
        };
        assert!(MatchmakingEntry::try_from(model).is_err());
    }

    #[test]
    fn status_round_trips_through_row() {
        let model = matchmaking::Model {
            session_id: "s".into(),
            creator_id: "c".into(),
            player_count: 4,
            max_players: 4,
            status: MatchStatus::Starting.as_str().into(),
            created_at: 1_700_000_000_000,
        };
        let entry = MatchmakingEntry::try_from(model).unwrap();
        assert_eq!(entry.status, MatchStatus::Starting);
        assert_eq!(to_millis(entry.created_at), 1_700_000_000_000);
    }
}
