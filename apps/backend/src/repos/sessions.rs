//! Session repository functions for domain layer.

use sea_orm::{ConnectionTrait, TransactionTrait};
use time::OffsetDateTime;

use crate::adapters::sessions_sea as sessions_adapter;
use crate::domain::session::{GameSession, SessionMode, SessionPlayer};
use crate::domain::time_util::{from_millis, to_millis};
use crate::entities::{game_sessions, session_players};
use crate::errors::domain::{DomainError, NotFoundKind};

pub use sessions_adapter::{PlayerProgressUpdate, SessionCreate, SessionUpdate};

impl From<session_players::Model> for SessionPlayer {
    fn from(p: session_players::Model) -> Self {
        Self {
            uid: p.uid,
            display_name: p.display_name,
            score: u32::try_from(p.score).unwrap_or(0),
            progress: u8::try_from(p.progress).unwrap_or(0),
            card_index: u32::try_from(p.card_index).unwrap_or(0),
            is_complete: p.is_complete,
            joined_at: from_millis(p.joined_at),
            finished_at: p.finished_at.map(from_millis),
        }
    }
}

fn assemble(
    model: game_sessions::Model,
    players: Vec<session_players::Model>,
) -> Result<GameSession, DomainError> {
    let (direction_map, cars) = sessions_adapter::decode_layout(&model)?;
    let mode: SessionMode = model.mode.parse()?;
    Ok(GameSession {
        id: model.id,
        mode,
        players: players.into_iter().map(SessionPlayer::from).collect(),
        direction_map,
        cars,
        rng_seed: model.rng_seed,
        max_players: u8::try_from(model.max_players).unwrap_or(u8::MAX),
        is_active: model.is_active,
        started_at: from_millis(model.started_at),
        last_active_at: from_millis(model.last_active_at),
        ended_at: model.ended_at.map(from_millis),
        lock_version: model.lock_version,
    })
}

fn session_not_found(session_id: &str) -> DomainError {
    DomainError::not_found(
        NotFoundKind::Session,
        format!("Session {session_id} not found"),
    )
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<GameSession>, DomainError> {
    let Some(model) = sessions_adapter::find_by_id(conn, session_id).await? else {
        return Ok(None);
    };
    let players = sessions_adapter::list_players(conn, session_id).await?;
    assemble(model, players).map(Some)
}

/// Load a session with its players, or `SESSION_NOT_FOUND`.
pub async fn require_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<GameSession, DomainError> {
    find_by_id(conn, session_id)
        .await?
        .ok_or_else(|| session_not_found(session_id))
}

/// Insert a session together with its first player.
pub async fn create_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: SessionCreate,
    first_player: &SessionPlayer,
) -> Result<GameSession, DomainError> {
    let id = dto.id.clone();
    sessions_adapter::create_session(conn, dto).await?;
    sessions_adapter::insert_player(
        conn,
        &id,
        &first_player.uid,
        &first_player.display_name,
        first_player.joined_at,
    )
    .await?;
    require_session(conn, &id).await
}

pub async fn add_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    player: &SessionPlayer,
) -> Result<(), DomainError> {
    sessions_adapter::insert_player(
        conn,
        session_id,
        &player.uid,
        &player.display_name,
        player.joined_at,
    )
    .await?;
    Ok(())
}

pub async fn save_player_progress<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    player: &SessionPlayer,
) -> Result<(), DomainError> {
    sessions_adapter::update_player_progress(
        conn,
        PlayerProgressUpdate {
            session_id: session_id.to_owned(),
            uid: player.uid.clone(),
            score: player.score,
            progress: player.progress,
            card_index: player.card_index,
            is_complete: player.is_complete,
            finished_at: player.finished_at,
        },
    )
    .await?;
    Ok(())
}

/// Optimistically bump the session row; fails with `OPTIMISTIC_LOCK` if stale.
pub async fn update_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: SessionUpdate,
) -> Result<i32, DomainError> {
    let id = dto.id.clone();
    match sessions_adapter::update_session(conn, dto).await {
        Ok(model) => Ok(model.lock_version),
        Err(sea_orm::DbErr::RecordNotFound(_)) => Err(session_not_found(&id)),
        Err(e) => Err(e.into()),
    }
}

/// Sessions idle at or before `cutoff`, players not loaded.
pub async fn find_idle_since<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cutoff: OffsetDateTime,
) -> Result<Vec<game_sessions::Model>, DomainError> {
    Ok(sessions_adapter::find_idle_since(conn, to_millis(cutoff)).await?)
}

/// Full session for archival, including players.
pub async fn load_for_archive<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    model: game_sessions::Model,
) -> Result<GameSession, DomainError> {
    let players = sessions_adapter::list_players(conn, &model.id).await?;
    assemble(model, players)
}

pub async fn delete_session<C: ConnectionTrait + TransactionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<u64, DomainError> {
    Ok(sessions_adapter::delete_by_id(conn, session_id).await?)
}

pub async fn sessions_with_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    uid: &str,
    session_ids: &[String],
) -> Result<Vec<String>, DomainError> {
    Ok(sessions_adapter::sessions_with_player(conn, uid, session_ids).await?)
}
