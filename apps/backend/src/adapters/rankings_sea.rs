//! SeaORM adapter for rankings and their per-day statistics.

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use time::OffsetDateTime;

use crate::domain::ranking::{RankingType, RetentionLevel};
use crate::domain::time_util::to_millis;
use crate::entities::{ranking_statistics, rankings};

/// Insert payload for a new ranking row.
#[derive(Debug, Clone)]
pub struct RankingCreate {
    pub id: String,
    pub user_id: String,
    pub display_name: String,
    pub score: u32,
    pub correct_answers: u32,
    pub total_cards: u32,
    pub time_elapsed: u32,
    pub ranking_type: RankingType,
    pub created_at: OffsetDateTime,
}

/// Entries of one type in ranking order.
fn ordered(kind: RankingType) -> Select<rankings::Entity> {
    rankings::Entity::find()
        .filter(rankings::Column::RankingType.eq(kind.as_str()))
        .order_by_desc(rankings::Column::Score)
        .order_by_asc(rankings::Column::TimeElapsed)
        .order_by_asc(rankings::Column::CreatedAt)
        .order_by_asc(rankings::Column::Id)
}

fn as_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

pub async fn insert_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RankingCreate,
) -> Result<rankings::Model, DbErr> {
    rankings::ActiveModel {
        id: Set(dto.id),
        user_id: Set(dto.user_id),
        display_name: Set(dto.display_name),
        score: Set(as_i32(dto.score)),
        correct_answers: Set(as_i32(dto.correct_answers)),
        total_cards: Set(as_i32(dto.total_cards)),
        time_elapsed: Set(as_i32(dto.time_elapsed)),
        ranking_type: Set(dto.ranking_type.as_str().to_owned()),
        created_at: Set(to_millis(dto.created_at)),
        retention_level: Set(RetentionLevel::Candidate.as_str().to_owned()),
        rank: Set(None),
    }
    .insert(conn)
    .await
}

pub async fn count_by_type<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
) -> Result<u64, DbErr> {
    rankings::Entity::find()
        .filter(rankings::Column::RankingType.eq(kind.as_str()))
        .count(conn)
        .await
}

/// Up to `limit` entries starting at `offset`, in ranking order.
pub async fn list_ordered<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
    offset: u64,
    limit: u64,
) -> Result<Vec<rankings::Model>, DbErr> {
    ordered(kind).offset(offset).limit(limit).all(conn).await
}

/// Every entry of one type; used by the scheduled prune.
pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
) -> Result<Vec<rankings::Model>, DbErr> {
    ordered(kind).all(conn).await
}

/// Ids of entries of one type created at or after `since`.
pub async fn ids_created_since<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
    since: OffsetDateTime,
) -> Result<Vec<String>, DbErr> {
    rankings::Entity::find()
        .select_only()
        .column(rankings::Column::Id)
        .filter(rankings::Column::RankingType.eq(kind.as_str()))
        .filter(rankings::Column::CreatedAt.gte(to_millis(since)))
        .into_tuple::<String>()
        .all(conn)
        .await
}

pub async fn set_rank_and_level<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: &str,
    rank: u32,
    level: RetentionLevel,
) -> Result<u64, DbErr> {
    let result = rankings::Entity::update_many()
        .col_expr(rankings::Column::Rank, Expr::value(Some(as_i32(rank))))
        .col_expr(rankings::Column::RetentionLevel, Expr::value(level.as_str()))
        .filter(rankings::Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Delete entries one by one; returns (rows deleted, score sum of deleted rows).
///
/// Rows already gone are skipped, so the totals only count real deletes.
pub async fn delete_counted<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    entries: &[(String, u32)],
) -> Result<(u64, u64), DbErr> {
    let mut deleted = 0u64;
    let mut score_sum = 0u64;
    for (id, score) in entries {
        let res = rankings::Entity::delete_by_id(id.clone()).exec(conn).await?;
        if res.rows_affected > 0 {
            deleted += res.rows_affected;
            score_sum += u64::from(*score);
        }
    }
    Ok((deleted, score_sum))
}

/// Merge increments into the `<type>_<day>` statistics row.
pub async fn increment_statistics<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
    day: &str,
    deleted_entries: u64,
    deleted_score_sum: u64,
    now: OffsetDateTime,
) -> Result<(), DbErr> {
    let deleted = i64::try_from(deleted_entries).unwrap_or(i64::MAX);
    let score_sum = i64::try_from(deleted_score_sum).unwrap_or(i64::MAX);
    let now_ms = to_millis(now);

    let row = ranking_statistics::ActiveModel {
        id: Set(statistics_id(kind, day)),
        ranking_type: Set(kind.as_str().to_owned()),
        date: Set(day.to_owned()),
        deleted_entries: Set(deleted),
        deleted_score_sum: Set(score_sum),
        runs: Set(1),
        last_cleanup_at: Set(now_ms),
    };

    ranking_statistics::Entity::insert(row)
        .on_conflict(
            OnConflict::column(ranking_statistics::Column::Id)
                .value(
                    ranking_statistics::Column::DeletedEntries,
                    Expr::col((
                        ranking_statistics::Entity,
                        ranking_statistics::Column::DeletedEntries,
                    ))
                    .add(deleted),
                )
                .value(
                    ranking_statistics::Column::DeletedScoreSum,
                    Expr::col((
                        ranking_statistics::Entity,
                        ranking_statistics::Column::DeletedScoreSum,
                    ))
                    .add(score_sum),
                )
                .value(
                    ranking_statistics::Column::Runs,
                    Expr::col((ranking_statistics::Entity, ranking_statistics::Column::Runs))
                        .add(1),
                )
                .value(ranking_statistics::Column::LastCleanupAt, Expr::value(now_ms))
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

pub fn statistics_id(kind: RankingType, day: &str) -> String {
    format!("{}_{day}", kind.as_str())
}

pub async fn find_statistics<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
    day: &str,
) -> Result<Option<ranking_statistics::Model>, DbErr> {
    ranking_statistics::Entity::find_by_id(statistics_id(kind, day))
        .one(conn)
        .await
}
