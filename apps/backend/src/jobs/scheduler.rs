use std::time::Duration as StdDuration;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::retention::RetentionConfig;
use crate::domain::retention::{ArchiveReport, CleanupReport};
use crate::domain::time_util::now_millis;
use crate::error::AppError;
use crate::services::retention::PruneReport;
use crate::services::RetentionService;

/// Which retention step to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Archive,
    Cleanup,
    Rankings,
    All,
}

impl Job {
    fn includes(self, step: Job) -> bool {
        self == Job::All || self == step
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rankings: Option<PruneReport>,
}

/// Run `job` once against `db`.
///
/// Archival runs before cleanup so expired sessions reach `game_analytics`
/// before anything deletes them. A failing step is logged and the remaining
/// steps still run; the first failure is returned after all of them.
pub async fn run_once(
    db: &DatabaseConnection,
    cfg: &RetentionConfig,
    job: Job,
) -> Result<JobReport, AppError> {
    let service = RetentionService::new(cfg.clone());
    let now = now_millis();
    let mut report = JobReport::default();
    let mut first_err: Option<AppError> = None;

    if job.includes(Job::Archive) {
        match service.archive_and_clean(db, now).await {
            Ok(r) => report.archive = Some(r),
            Err(e) => {
                error!(job = "archive", error = %e, "archive step failed");
                first_err = first_err.or(Some(e));
            }
        }
    }
    if job.includes(Job::Cleanup) {
        match service.cleanup_old_rooms(db, now).await {
            Ok(r) => report.cleanup = Some(r),
            Err(e) => {
                error!(job = "cleanup", error = %e, "cleanup step failed");
                first_err = first_err.or(Some(e));
            }
        }
    }
    if job.includes(Job::Rankings) {
        match service.recent_pins(db, now).await {
            Ok(pinned) => report.rankings = Some(service.prune_rankings(db, now, &pinned).await),
            Err(e) => {
                error!(job = "rankings", error = %e, "loading recent entries failed");
                first_err = first_err.or(Some(e));
            }
        }
    }

    match first_err {
        Some(e) => Err(e),
        None => Ok(report),
    }
}

/// Run every job once at start, then each `cfg.interval`, until `shutdown` is cancelled.
pub fn spawn_scheduler(
    db: DatabaseConnection,
    cfg: RetentionConfig,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let period = StdDuration::try_from(cfg.interval).unwrap_or(StdDuration::from_secs(86_400));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(interval_secs = period.as_secs(), "retention scheduler started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = run_once(&db, &cfg, Job::All).await {
                        warn!(error = %e, "retention run incomplete, retrying next interval");
                    }
                }
            }
        }
        info!("retention scheduler stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_includes_every_step() {
        for step in [Job::Archive, Job::Cleanup, Job::Rankings] {
            assert!(Job::All.includes(step));
            assert!(step.includes(step));
        }
        assert!(!Job::Archive.includes(Job::Rankings));
    }

    #[tokio::test]
    async fn scheduler_stops_on_cancel() {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        let token = CancellationToken::new();
        let handle = spawn_scheduler(db, RetentionConfig::default(), token.clone());
        token.cancel();
        tokio::time::timeout(StdDuration::from_secs(5), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
