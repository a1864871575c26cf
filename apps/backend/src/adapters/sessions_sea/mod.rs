//! SeaORM adapter for game sessions and their players - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::de::DeserializeOwned;

use crate::domain::catalog::Car;
use crate::domain::direction::DirectionMap;
use crate::domain::time_util::to_millis;
use crate::entities::{game_sessions, session_players};
use crate::infra::db_errors::{CORRUPT_PREFIX, OPTIMISTIC_LOCK_PREFIX};

pub mod dto;

pub use dto::{PlayerProgressUpdate, SessionCreate, SessionUpdate};

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

fn decode_column<T: DeserializeOwned>(session_id: &str, column: &str, raw: &str) -> Result<T, DbErr> {
    serde_json::from_str(raw).map_err(|e| {
        DbErr::Custom(format!(
            "{CORRUPT_PREFIX}game_sessions.{column} of {session_id}: {e}"
        ))
    })
}

/// Decode the stored direction map and deck of a session row.
pub fn decode_layout(model: &game_sessions::Model) -> Result<(DirectionMap, Vec<Car>), DbErr> {
    let map = decode_column(&model.id, "direction_map", &model.direction_map)?;
    let cars = decode_column(&model.id, "cards", &model.cards)?;
    Ok((map, cars))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<game_sessions::Model>, DbErr> {
    game_sessions::Entity::find_by_id(session_id.to_owned())
        .one(conn)
        .await
}

pub async fn create_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: SessionCreate,
) -> Result<game_sessions::Model, DbErr> {
    let started = to_millis(dto.started_at);
    game_sessions::ActiveModel {
        id: Set(dto.id),
        mode: Set(dto.mode.as_str().to_owned()),
        direction_map: Set(dto.direction_map_json),
        cards: Set(dto.cards_json),
        rng_seed: Set(dto.rng_seed),
        max_players: Set(i16::from(dto.max_players)),
        is_active: Set(true),
        started_at: Set(started),
        last_active_at: Set(started),
        ended_at: Set(None),
        lock_version: Set(1),
    }
    .insert(conn)
    .await
}

/// Apply an optimistic update, then refetch.
///
/// Zero affected rows means the session is gone (`RecordNotFound`) or was
/// bumped by someone else (`OPTIMISTIC_LOCK` payload).
pub async fn update_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: SessionUpdate,
) -> Result<game_sessions::Model, DbErr> {
    let mut update = game_sessions::Entity::update_many()
        .col_expr(
            game_sessions::Column::LastActiveAt,
            Expr::value(to_millis(dto.last_active_at)),
        )
        .col_expr(
            game_sessions::Column::LockVersion,
            Expr::col(game_sessions::Column::LockVersion).add(1),
        );
    if let Some(active) = dto.is_active {
        update = update.col_expr(game_sessions::Column::IsActive, Expr::value(active));
    }
    if let Some(ended) = dto.ended_at {
        update = update.col_expr(
            game_sessions::Column::EndedAt,
            Expr::value(ended.map(to_millis)),
        );
    }

    let result = update
        .filter(game_sessions::Column::Id.eq(dto.id.as_str()))
        .filter(game_sessions::Column::LockVersion.eq(dto.expected_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match find_by_id(conn, &dto.id).await? {
            Some(current) => Err(DbErr::Custom(format!(
                "{OPTIMISTIC_LOCK_PREFIX}{{\"expected\":{},\"actual\":{}}}",
                dto.expected_version, current.lock_version
            ))),
            None => Err(DbErr::RecordNotFound(format!("game_sessions {}", dto.id))),
        };
    }

    find_by_id(conn, &dto.id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("game_sessions {}", dto.id)))
}

/// Sessions idle since at or before `cutoff_ms`, oldest first.
pub async fn find_idle_since<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cutoff_ms: i64,
) -> Result<Vec<game_sessions::Model>, DbErr> {
    game_sessions::Entity::find()
        .filter(game_sessions::Column::LastActiveAt.lte(cutoff_ms))
        .order_by_asc(game_sessions::Column::LastActiveAt)
        .all(conn)
        .await
}

/// Delete a session and its players in one transaction.
///
/// Returns the number of session rows removed. Players are deleted
/// explicitly so backends without FK enforcement agree.
pub async fn delete_by_id<C: ConnectionTrait + TransactionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<u64, DbErr> {
    let txn = conn.begin().await?;
    session_players::Entity::delete_many()
        .filter(session_players::Column::SessionId.eq(session_id))
        .exec(&txn)
        .await?;
    let res = game_sessions::Entity::delete_by_id(session_id.to_owned())
        .exec(&txn)
        .await?;
    txn.commit().await?;
    Ok(res.rows_affected)
}

pub async fn list_players<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<session_players::Model>, DbErr> {
    session_players::Entity::find()
        .filter(session_players::Column::SessionId.eq(session_id))
        .order_by_asc(session_players::Column::JoinedAt)
        .order_by_asc(session_players::Column::Id)
        .all(conn)
        .await
}

pub async fn insert_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    uid: &str,
    display_name: &str,
    joined_at: time::OffsetDateTime,
) -> Result<session_players::Model, DbErr> {
    session_players::ActiveModel {
        id: NotSet,
        session_id: Set(session_id.to_owned()),
        uid: Set(uid.to_owned()),
        display_name: Set(display_name.to_owned()),
        score: Set(0),
        progress: Set(0),
        card_index: Set(0),
        is_complete: Set(false),
        joined_at: Set(to_millis(joined_at)),
        finished_at: Set(None),
    }
    .insert(conn)
    .await
}

/// Write one player's progress. Guarded by the caller's session version bump.
pub async fn update_player_progress<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PlayerProgressUpdate,
) -> Result<(), DbErr> {
    let result = session_players::Entity::update_many()
        .col_expr(session_players::Column::Score, Expr::value(dto.score as i32))
        .col_expr(
            session_players::Column::Progress,
            Expr::value(i16::from(dto.progress)),
        )
        .col_expr(
            session_players::Column::CardIndex,
            Expr::value(dto.card_index as i32),
        )
        .col_expr(
            session_players::Column::IsComplete,
            Expr::value(dto.is_complete),
        )
        .col_expr(
            session_players::Column::FinishedAt,
            Expr::value(dto.finished_at.map(to_millis)),
        )
        .filter(session_players::Column::SessionId.eq(dto.session_id.as_str()))
        .filter(session_players::Column::Uid.eq(dto.uid.as_str()))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(DbErr::RecordNotFound(format!(
            "session_players {}",
            dto.session_id
        )));
    }
    Ok(())
}

/// Which of `session_ids` already list `uid` as a player.
pub async fn sessions_with_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    uid: &str,
    session_ids: &[String],
) -> Result<Vec<String>, DbErr> {
    use sea_orm::QuerySelect;

    if session_ids.is_empty() {
        return Ok(Vec::new());
    }
    session_players::Entity::find()
        .select_only()
        .column(session_players::Column::SessionId)
        .filter(session_players::Column::Uid.eq(uid))
        .filter(session_players::Column::SessionId.is_in(session_ids.iter().cloned()))
        .into_tuple::<String>()
        .all(conn)
        .await
}
