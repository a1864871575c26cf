//! Scheduled retention: session expiry, analytics archival and ranking pruning.
//!
//! Expiry and archival issue one independent delete per record and run them
//! concurrently; a failed delete is logged and retried on the next run.
//! Ranking pruning runs one transaction per ranking type.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::config::retention::RetentionConfig;
use crate::db::txn::with_txn;
use crate::domain::periods::windows;
use crate::domain::ranking::{RankingType, RetentionLevel};
use crate::domain::retention::{
    analytics_for, matchmaking_expired, plan_prune, room_expired, session_expired, ArchiveReport,
    CleanupReport, CollectionReport, PruneLimits, TypePruneReport,
};
use crate::domain::time_util::from_millis;
use crate::entities::game_sessions;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::repos::{analytics, rankings, rooms, sessions};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypePruned {
    pub ranking_type: RankingType,
    #[serde(flatten)]
    pub report: TypePruneReport,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneReport {
    pub pruned: Vec<TypePruned>,
    pub failed_types: Vec<RankingType>,
}

/// Tally per-record delete results; a row already gone counts as neither.
fn tally(results: Vec<Result<u64, DomainError>>, collection: &str) -> CollectionReport {
    let mut report = CollectionReport::default();
    for result in results {
        match result {
            Ok(rows) => report.deleted += rows,
            Err(e) => {
                report.failed += 1;
                warn!(collection, error = %e, "delete failed, left for next run");
            }
        }
    }
    report
}

#[derive(Debug, Clone)]
pub struct RetentionService {
    cfg: RetentionConfig,
}

impl RetentionService {
    pub fn new(cfg: RetentionConfig) -> Self {
        Self { cfg }
    }

    pub fn cutoff(&self, now: OffsetDateTime) -> OffsetDateTime {
        now - self.cfg.session_ttl
    }

    async fn expired_sessions(
        &self,
        db: &DatabaseConnection,
        cutoff: OffsetDateTime,
    ) -> Result<Vec<game_sessions::Model>, AppError> {
        let idle = sessions::find_idle_since(db, cutoff).await?;
        Ok(idle
            .into_iter()
            .filter(|s| {
                session_expired(
                    s.is_active,
                    from_millis(s.started_at),
                    from_millis(s.last_active_at),
                    cutoff,
                )
            })
            .collect())
    }

    /// Delete expired sessions, rooms and matchmaking entries.
    pub async fn cleanup_old_rooms(
        &self,
        db: &DatabaseConnection,
        now: OffsetDateTime,
    ) -> Result<CleanupReport, AppError> {
        let cutoff = self.cutoff(now);
        let expired_sessions = self.expired_sessions(db, cutoff).await?;
        let expired_rooms: Vec<_> = rooms::rooms_created_before(db, cutoff)
            .await?
            .into_iter()
            .filter(|r| room_expired(r, cutoff))
            .collect();
        let expired_entries: Vec<_> = rooms::entries_created_before(db, cutoff)
            .await?
            .into_iter()
            .filter(|e| matchmaking_expired(e, cutoff))
            .collect();

        let (session_results, room_results, entry_results) = futures::join!(
            join_all(
                expired_sessions
                    .iter()
                    .map(|s| sessions::delete_session(db, &s.id))
            ),
            join_all(expired_rooms.iter().map(|r| rooms::delete_room(db, &r.id))),
            join_all(
                expired_entries
                    .iter()
                    .map(|e| rooms::delete_entry(db, &e.session_id))
            ),
        );

        let report = CleanupReport {
            sessions: tally(session_results, "game_sessions"),
            rooms: tally(room_results, "custom_rooms"),
            matchmaking: tally(entry_results, "matchmaking"),
        };
        info!(
            job = "cleanup",
            sessions_deleted = report.sessions.deleted,
            rooms_deleted = report.rooms.deleted,
            matchmaking_deleted = report.matchmaking.deleted,
            failed = report.sessions.failed + report.rooms.failed + report.matchmaking.failed,
            "cleanup finished"
        );
        Ok(report)
    }

    /// Archive one session, then delete it with its room and queue entry.
    ///
    /// Returns `(archived, deleted)`; the delete is skipped when the archive fails.
    async fn archive_one(
        &self,
        db: &DatabaseConnection,
        model: game_sessions::Model,
        now: OffsetDateTime,
    ) -> (bool, Option<bool>) {
        let id = model.id.clone();
        let archived = async {
            let session = sessions::load_for_archive(db, model).await?;
            analytics::archive(db, &analytics_for(&session, now)).await
        }
        .await;
        if let Err(e) = archived {
            warn!(session_id = %id, error = %e, "archive failed, session kept");
            return (false, None);
        }

        let deleted = async {
            sessions::delete_session(db, &id).await?;
            rooms::delete_room(db, &id).await?;
            rooms::delete_entry(db, &id).await?;
            Ok::<_, DomainError>(())
        }
        .await;
        match deleted {
            Ok(()) => (true, Some(true)),
            Err(e) => {
                warn!(session_id = %id, error = %e, "delete after archive failed");
                (true, Some(false))
            }
        }
    }

    /// Write `game_analytics` for every expired session, then delete it.
    pub async fn archive_and_clean(
        &self,
        db: &DatabaseConnection,
        now: OffsetDateTime,
    ) -> Result<ArchiveReport, AppError> {
        let cutoff = self.cutoff(now);
        let expired = self.expired_sessions(db, cutoff).await?;
        let results = join_all(expired.into_iter().map(|m| self.archive_one(db, m, now))).await;

        let mut report = ArchiveReport::default();
        for (archived, deleted) in results {
            if archived {
                report.archived += 1;
            } else {
                report.archive_failed += 1;
            }
            match deleted {
                Some(true) => report.deleted += 1,
                Some(false) => report.delete_failed += 1,
                None => {}
            }
        }
        info!(
            job = "archive",
            archived = report.archived,
            archive_failed = report.archive_failed,
            deleted = report.deleted,
            delete_failed = report.delete_failed,
            "archive finished"
        );
        Ok(report)
    }

    /// Entries created within `pin_recent` of `now`, across all ranking types.
    pub async fn recent_pins(
        &self,
        db: &DatabaseConnection,
        now: OffsetDateTime,
    ) -> Result<HashSet<String>, AppError> {
        let since = now - self.cfg.ranking.pin_recent;
        let mut pinned = HashSet::new();
        for kind in RankingType::ALL {
            pinned.extend(rankings::ids_created_since(db, kind, since).await?);
        }
        Ok(pinned)
    }

    fn limits(&self) -> PruneLimits {
        let r = &self.cfg.ranking;
        PruneLimits {
            keep_top: r.keep_top,
            context_range: r.context_range,
            older_keep_top: r.older_keep_top,
            archive_keep_top: r.archive_keep_top,
        }
    }

    /// Prune one ranking type in a single transaction.
    pub async fn prune_type(
        &self,
        db: &DatabaseConnection,
        kind: RankingType,
        now: OffsetDateTime,
        pinned: &HashSet<String>,
    ) -> Result<TypePruneReport, AppError> {
        let limits = self.limits();
        let periods = windows(kind, now, self.cfg.ranking.older_periods);
        let pinned = pinned.clone();

        with_txn(db, move |txn| {
            Box::pin(async move {
                let entries = rankings::list_all(txn, kind).await?;
                let before: HashMap<String, (Option<u32>, RetentionLevel)> = entries
                    .iter()
                    .map(|e| (e.id.clone(), (e.rank, e.retention_level)))
                    .collect();
                let plan = plan_prune(entries, &periods, &limits, &pinned);

                for kept in &plan.keep {
                    let unchanged = before
                        .get(&kept.id)
                        .is_some_and(|&(rank, level)| rank == Some(kept.rank) && level == kept.level);
                    if !unchanged {
                        rankings::set_rank_and_level(txn, &kept.id, kept.rank, kept.level).await?;
                    }
                }

                let victims: Vec<(String, u32)> =
                    plan.remove.into_iter().map(|r| (r.id, r.score)).collect();
                let (deleted, deleted_score_sum) = rankings::delete_entries(txn, &victims).await?;
                rankings::record_deletions(txn, kind, deleted, deleted_score_sum, now).await?;

                Ok(TypePruneReport {
                    kept: plan.keep.len() as u64,
                    deleted,
                    deleted_score_sum,
                })
            })
        })
        .await
    }

    /// Prune every ranking type; a failing type is logged and skipped.
    pub async fn prune_rankings(
        &self,
        db: &DatabaseConnection,
        now: OffsetDateTime,
        pinned: &HashSet<String>,
    ) -> PruneReport {
        let mut report = PruneReport::default();
        for kind in RankingType::ALL {
            match self.prune_type(db, kind, now, pinned).await {
                Ok(counts) => {
                    info!(
                        job = "rankings",
                        ranking_type = %kind,
                        kept = counts.kept,
                        deleted = counts.deleted,
                        deleted_score_sum = counts.deleted_score_sum,
                        "ranking prune finished"
                    );
                    report.pruned.push(TypePruned {
                        ranking_type: kind,
                        report: counts,
                    });
                }
                Err(e) => {
                    warn!(job = "rankings", ranking_type = %kind, error = %e, "ranking prune failed");
                    report.failed_types.push(kind);
                }
            }
        }
        report
    }
}
