//! Ranking repository functions for domain layer.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::rankings_sea;
use crate::domain::periods::day_key;
use crate::domain::ranking::{RankingEntry, RankingType, RetentionLevel};
use crate::domain::time_util::from_millis;
use crate::entities::{ranking_statistics, rankings};
use crate::errors::domain::DomainError;

pub use rankings_sea::RankingCreate;

fn as_u32(v: i32) -> u32 {
    u32::try_from(v).unwrap_or(0)
}

impl TryFrom<rankings::Model> for RankingEntry {
    type Error = DomainError;

    fn try_from(m: rankings::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            ranking_type: m.ranking_type.parse()?,
            retention_level: m.retention_level.parse()?,
            id: m.id,
            user_id: m.user_id,
            display_name: m.display_name,
            score: as_u32(m.score),
            correct_answers: as_u32(m.correct_answers),
            total_cards: as_u32(m.total_cards),
            time_elapsed: as_u32(m.time_elapsed),
            created_at: from_millis(m.created_at),
            rank: m.rank.and_then(|r| u32::try_from(r).ok()),
        })
    }
}

fn to_entries(models: Vec<rankings::Model>) -> Result<Vec<RankingEntry>, DomainError> {
    models.into_iter().map(RankingEntry::try_from).collect()
}

pub async fn insert_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RankingCreate,
) -> Result<RankingEntry, DomainError> {
    rankings_sea::insert_entry(conn, dto).await?.try_into()
}

pub async fn count_by_type<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
) -> Result<u64, DomainError> {
    Ok(rankings_sea::count_by_type(conn, kind).await?)
}

pub async fn list_ordered<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
    offset: u64,
    limit: u64,
) -> Result<Vec<RankingEntry>, DomainError> {
    to_entries(rankings_sea::list_ordered(conn, kind, offset, limit).await?)
}

pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
) -> Result<Vec<RankingEntry>, DomainError> {
    to_entries(rankings_sea::list_all(conn, kind).await?)
}

pub async fn ids_created_since<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
    since: OffsetDateTime,
) -> Result<Vec<String>, DomainError> {
    Ok(rankings_sea::ids_created_since(conn, kind, since).await?)
}

pub async fn set_rank_and_level<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: &str,
    rank: u32,
    level: RetentionLevel,
) -> Result<(), DomainError> {
    rankings_sea::set_rank_and_level(conn, id, rank, level).await?;
    Ok(())
}

/// Delete entries and return (deleted, deleted score sum) over rows that existed.
pub async fn delete_entries<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    entries: &[(String, u32)],
) -> Result<(u64, u64), DomainError> {
    Ok(rankings_sea::delete_counted(conn, entries).await?)
}

/// Add to the statistics row for `now`'s UTC day. No-op when nothing was deleted.
pub async fn record_deletions<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
    deleted: u64,
    score_sum: u64,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    if deleted == 0 {
        return Ok(());
    }
    rankings_sea::increment_statistics(conn, kind, &day_key(now), deleted, score_sum, now)
        .await?;
    Ok(())
}

pub async fn find_statistics<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    kind: RankingType,
    day: &str,
) -> Result<Option<ranking_statistics::Model>, DomainError> {
    Ok(rankings_sea::find_statistics(conn, kind, day).await?)
}
