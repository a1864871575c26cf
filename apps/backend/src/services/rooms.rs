//! Host-run custom rooms, each wrapping one custom-mode session.

use sea_orm::DatabaseTransaction;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::sessions::SessionService;
use crate::domain::matchmaking::{CustomRoom, RoomStatus, MAX_ROOM_PLAYERS, MIN_ROOM_PLAYERS};
use crate::domain::session::{GameSession, SessionMode};
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::logging::pii::player_tag;
use crate::repos::{rooms, sessions};
use crate::utils::room_code::{generate_room_code, normalize_room_code};

/// Fresh codes tried before giving up on a collision streak.
const MAX_CODE_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct RoomView {
    pub room: CustomRoom,
    pub session: GameSession,
}

#[derive(Debug, Clone, Copy)]
pub struct RoomService {
    sessions: SessionService,
}

impl RoomService {
    pub fn new(sessions: SessionService) -> Self {
        Self { sessions }
    }

    async fn unused_code(&self, txn: &DatabaseTransaction) -> Result<String, AppError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_room_code();
            if !rooms::code_taken(txn, &code).await? {
                return Ok(code);
            }
            warn!("room code collision, retrying");
        }
        Err(DomainError::conflict(
            ConflictKind::RoomCodeConflict,
            "Could not allocate a unique room code",
        )
        .into())
    }

    fn require_host(room: &CustomRoom, uid: &str) -> Result<(), AppError> {
        if room.host_id != uid {
            return Err(DomainError::validation(
                ValidationKind::NotRoomHost,
                format!("Only the host can manage room {}", room.code),
            )
            .into());
        }
        Ok(())
    }

    pub async fn create_room(
        &self,
        txn: &DatabaseTransaction,
        host_id: &str,
        display_name: &str,
        max_players: u8,
        now: OffsetDateTime,
    ) -> Result<RoomView, AppError> {
        if !(MIN_ROOM_PLAYERS..=MAX_ROOM_PLAYERS).contains(&max_players) {
            return Err(DomainError::validation(
                ValidationKind::InvalidMaxPlayers,
                format!("max_players must be between {MIN_ROOM_PLAYERS} and {MAX_ROOM_PLAYERS}"),
            )
            .into());
        }

        let session = self
            .sessions
            .insert_session(txn, SessionMode::Custom, max_players, host_id, display_name, now)
            .await?;
        let room = CustomRoom {
            id: session.id.clone(),
            code: self.unused_code(txn).await?,
            host_id: host_id.to_owned(),
            max_players,
            status: RoomStatus::Waiting,
            created_at: now,
        };
        rooms::create_room(txn, &room).await?;
        info!(room_id = %room.id, code = %room.code, host = %player_tag(host_id), "room created");
        Ok(RoomView { room, session })
    }

    /// Join by code. Accepts codes in any case, with spaces, dashes or full-width characters.
    pub async fn join_room(
        &self,
        txn: &DatabaseTransaction,
        uid: &str,
        display_name: &str,
        raw_code: &str,
        now: OffsetDateTime,
    ) -> Result<RoomView, AppError> {
        let code = normalize_room_code(raw_code).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Room, format!("Room {raw_code} not found"))
        })?;
        let room = rooms::require_room_by_code(txn, &code).await?;
        let session = sessions::require_session(txn, &room.id).await?;

        if session.has_player(uid) {
            return Ok(RoomView { room, session });
        }
        if room.status != RoomStatus::Waiting {
            return Err(DomainError::validation(
                ValidationKind::RoomNotJoinable,
                format!("Room {} is {}", room.code, room.status),
            )
            .into());
        }

        let session = self
            .sessions
            .add_player(txn, session, uid, display_name, now)
            .await?;
        Ok(RoomView { room, session })
    }

    pub async fn start_room(
        &self,
        txn: &DatabaseTransaction,
        uid: &str,
        room_id: &str,
    ) -> Result<RoomView, AppError> {
        let mut room = rooms::require_room(txn, room_id).await?;
        Self::require_host(&room, uid)?;
        let session = sessions::require_session(txn, room_id).await?;

        match room.status {
            RoomStatus::Active => return Ok(RoomView { room, session }),
            RoomStatus::Closed => {
                return Err(DomainError::validation(
                    ValidationKind::RoomNotJoinable,
                    format!("Room {} is closed", room.code),
                )
                .into())
            }
            RoomStatus::Waiting => {}
        }
        if session.players.len() < usize::from(MIN_ROOM_PLAYERS) {
            return Err(DomainError::validation_other(format!(
                "At least {MIN_ROOM_PLAYERS} players are needed to start"
            ))
            .into());
        }

        rooms::set_room_status(txn, room_id, RoomStatus::Active).await?;
        room.status = RoomStatus::Active;
        info!(room_id, players = session.players.len(), "room started");
        Ok(RoomView { room, session })
    }

    /// Close the room and end its session if it is still running.
    pub async fn close_room(
        &self,
        txn: &DatabaseTransaction,
        uid: &str,
        room_id: &str,
        now: OffsetDateTime,
    ) -> Result<RoomView, AppError> {
        let mut room = rooms::require_room(txn, room_id).await?;
        Self::require_host(&room, uid)?;
        let session = sessions::require_session(txn, room_id).await?;

        if room.status == RoomStatus::Closed {
            return Ok(RoomView { room, session });
        }
        rooms::set_room_status(txn, room_id, RoomStatus::Closed).await?;
        room.status = RoomStatus::Closed;

        let session = if session.is_active {
            sessions::update_session(
                txn,
                sessions::SessionUpdate::touch(room_id, session.lock_version, now).ended(now),
            )
            .await?;
            sessions::require_session(txn, room_id).await?
        } else {
            session
        };
        info!(room_id, "room closed");
        Ok(RoomView { room, session })
    }
}
