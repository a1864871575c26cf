//! SeaORM adapter for the matchmaking queue.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use time::OffsetDateTime;

use crate::domain::matchmaking::MatchStatus;
use crate::domain::time_util::to_millis;
use crate::entities::matchmaking;
use crate::infra::db_errors::OPTIMISTIC_LOCK_PREFIX;

/// Upper bound on queue rows considered per join.
const OPEN_SCAN_LIMIT: u64 = 50;

pub async fn create_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    creator_id: &str,
    max_players: u8,
    created_at: OffsetDateTime,
) -> Result<matchmaking::Model, DbErr> {
    matchmaking::ActiveModel {
        session_id: Set(session_id.to_owned()),
        creator_id: Set(creator_id.to_owned()),
        player_count: Set(1),
        max_players: Set(i16::from(max_players)),
        status: Set(MatchStatus::Waiting.as_str().to_owned()),
        created_at: Set(to_millis(created_at)),
    }
    .insert(conn)
    .await
}

pub async fn find_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<matchmaking::Model>, DbErr> {
    matchmaking::Entity::find_by_id(session_id.to_owned())
        .one(conn)
        .await
}

/// Waiting entries not created by `uid`, oldest first.
pub async fn find_open<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    uid: &str,
) -> Result<Vec<matchmaking::Model>, DbErr> {
    matchmaking::Entity::find()
        .filter(matchmaking::Column::Status.eq(MatchStatus::Waiting.as_str()))
        .filter(matchmaking::Column::CreatorId.ne(uid))
        .filter(Expr::col(matchmaking::Column::PlayerCount).lt(Expr::col(matchmaking::Column::MaxPlayers)))
        .order_by_asc(matchmaking::Column::CreatedAt)
        .order_by_asc(matchmaking::Column::SessionId)
        .limit(OPEN_SCAN_LIMIT)
        .all(conn)
        .await
}

/// Store a new count and status, but only if the count is still `expected_count`.
pub async fn update_count<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    expected_count: u8,
    player_count: u8,
    status: MatchStatus,
) -> Result<(), DbErr> {
    let result = matchmaking::Entity::update_many()
        .col_expr(
            matchmaking::Column::PlayerCount,
            Expr::value(i16::from(player_count)),
        )
        .col_expr(matchmaking::Column::Status, Expr::value(status.as_str()))
        .filter(matchmaking::Column::SessionId.eq(session_id))
        .filter(matchmaking::Column::PlayerCount.eq(i16::from(expected_count)))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match find_by_session(conn, session_id).await? {
            Some(current) => Err(DbErr::Custom(format!(
                "{OPTIMISTIC_LOCK_PREFIX}{{\"expected\":{},\"actual\":{}}}",
                expected_count, current.player_count
            ))),
            None => Err(DbErr::RecordNotFound(format!("matchmaking {session_id}"))),
        };
    }
    Ok(())
}

/// Entries created at or before `cutoff_ms`.
pub async fn find_created_before<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cutoff_ms: i64,
) -> Result<Vec<matchmaking::Model>, DbErr> {
    matchmaking::Entity::find()
        .filter(matchmaking::Column::CreatedAt.lte(cutoff_ms))
        .all(conn)
        .await
}

pub async fn delete_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<u64, DbErr> {
    let res = matchmaking::Entity::delete_by_id(session_id.to_owned())
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}
