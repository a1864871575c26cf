//! Score submission with opportunistic trimming, and ranked views.

use rand::Rng;
use sea_orm::{ConnectionTrait, DatabaseTransaction};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};
use ulid::Ulid;

use crate::config::retention::RankingConfig;
use crate::domain::ranking::{
    build_view, trim_offset, RankingEntry, RankingType, RankingView, ScoreSubmission,
};
use crate::error::AppError;
use crate::logging::pii::player_tag;
use crate::repos::rankings;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub entry: RankingEntry,
    /// Entries removed by the on-submit trim, usually zero.
    pub trimmed: u64,
}

#[derive(Debug, Clone)]
pub struct RankingService {
    cfg: RankingConfig,
}

impl RankingService {
    pub fn new(cfg: RankingConfig) -> Self {
        Self { cfg }
    }

    /// Record a finished game, then maybe trim the tail of its ranking type.
    ///
    /// The trim only runs on a `cleanup_probability` roll and only when the
    /// type holds more than `cleanup_threshold` entries. It shares the
    /// insert's transaction.
    pub async fn submit_score(
        &self,
        txn: &DatabaseTransaction,
        uid: &str,
        display_name: &str,
        submission: ScoreSubmission,
        now: OffsetDateTime,
    ) -> Result<SubmitOutcome, AppError> {
        submission.validate()?;
        let kind = submission.ranking_type;
        let entry = rankings::insert_entry(
            txn,
            rankings::RankingCreate {
                id: Ulid::new().to_string(),
                user_id: uid.to_owned(),
                display_name: display_name.to_owned(),
                score: submission.score,
                correct_answers: submission.correct_answers,
                total_cards: submission.total_cards,
                time_elapsed: submission.time_elapsed,
                ranking_type: kind,
                created_at: now,
            },
        )
        .await?;
        debug!(ranking_type = %kind, player = %player_tag(uid), score = entry.score, "score submitted");

        let roll = rand::rng().random_bool(self.cfg.cleanup_probability);
        let trimmed = if roll {
            self.trim_tail(txn, kind, now).await?
        } else {
            0
        };
        Ok(SubmitOutcome { entry, trimmed })
    }

    async fn trim_tail(
        &self,
        txn: &DatabaseTransaction,
        kind: RankingType,
        now: OffsetDateTime,
    ) -> Result<u64, AppError> {
        let total = rankings::count_by_type(txn, kind).await?;
        if total <= self.cfg.cleanup_threshold {
            return Ok(0);
        }

        let offset = trim_offset(self.cfg.keep_top, self.cfg.context_range) as u64;
        let tail = rankings::list_ordered(txn, kind, offset, self.cfg.cleanup_batch_size).await?;
        let victims: Vec<(String, u32)> = tail.into_iter().map(|e| (e.id, e.score)).collect();
        let (deleted, score_sum) = rankings::delete_entries(txn, &victims).await?;
        rankings::record_deletions(txn, kind, deleted, score_sum, now).await?;

        info!(ranking_type = %kind, total, deleted, score_sum, "on-submit trim");
        Ok(deleted)
    }

    pub async fn ranking_view<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        kind: RankingType,
        user_id: Option<&str>,
    ) -> Result<RankingView, AppError> {
        let entries = rankings::list_ordered(conn, kind, 0, self.cfg.fetch_limit).await?;
        let total = rankings::count_by_type(conn, kind).await?;
        Ok(build_view(
            entries,
            user_id,
            self.cfg.keep_top,
            self.cfg.context_range,
            total,
        ))
    }
}
