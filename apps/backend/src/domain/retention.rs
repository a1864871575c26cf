//! Pure retention rules: what is expired, what an archived session looks
//! like, and which ranking entries survive a prune.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use time::OffsetDateTime;

use super::matchmaking::{CustomRoom, MatchmakingEntry, RoomStatus};
use super::periods::PeriodWindow;
use super::ranking::{sort_entries, RankingEntry, RetentionLevel};
use super::session::GameSession;

/// A session is expired once idle past `cutoff` and either finished or
/// started before `cutoff`.
pub fn session_expired(
    is_active: bool,
    started_at: OffsetDateTime,
    last_active_at: OffsetDateTime,
    cutoff: OffsetDateTime,
) -> bool {
    last_active_at <= cutoff && (!is_active || started_at < cutoff)
}

/// Rooms still being played are never expired, however old.
pub fn room_expired(room: &CustomRoom, cutoff: OffsetDateTime) -> bool {
    room.created_at <= cutoff && room.status != RoomStatus::Active
}

pub fn matchmaking_expired(entry: &MatchmakingEntry, cutoff: OffsetDateTime) -> bool {
    entry.created_at <= cutoff
}

/// Summary written to `game_analytics` before a session is deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnalytics {
    pub session_id: String,
    pub player_count: u32,
    pub max_players: u8,
    pub game_completed: bool,
    pub duration_seconds: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub archived_at: OffsetDateTime,
}

pub fn analytics_for(session: &GameSession, now: OffsetDateTime) -> SessionAnalytics {
    SessionAnalytics {
        session_id: session.id.clone(),
        player_count: session.players.len() as u32,
        max_players: session.max_players,
        game_completed: !session.is_active,
        duration_seconds: session
            .ended_at
            .map(|end| (end - session.started_at).as_seconds_f64()),
        created_at: session.started_at,
        archived_at: now,
    }
}

/// Per-tier keep limits for a prune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneLimits {
    pub keep_top: usize,
    pub context_range: usize,
    pub older_keep_top: usize,
    pub archive_keep_top: usize,
}

impl PruneLimits {
    fn keep_for(&self, level: RetentionLevel) -> usize {
        match level {
            RetentionLevel::Candidate | RetentionLevel::Current | RetentionLevel::Previous => {
                self.keep_top
            }
            RetentionLevel::Older => self.older_keep_top,
            RetentionLevel::Archive => self.archive_keep_top,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeptEntry {
    pub id: String,
    pub rank: u32,
    pub level: RetentionLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEntry {
    pub id: String,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrunePlan {
    pub keep: Vec<KeptEntry>,
    pub remove: Vec<RemovedEntry>,
}

/// Indices kept in one period: the top `keep` plus, for current and
/// previous, `context_range` places on either side of every pinned entry.
fn kept_indices(
    ranked: &[RankingEntry],
    level: RetentionLevel,
    limits: &PruneLimits,
    pinned: &HashSet<String>,
) -> BTreeSet<usize> {
    let mut keep: BTreeSet<usize> = (0..limits.keep_for(level).min(ranked.len())).collect();

    if matches!(level, RetentionLevel::Current | RetentionLevel::Previous) {
        for (idx, entry) in ranked.iter().enumerate() {
            if pinned.contains(&entry.id) {
                let start = idx.saturating_sub(limits.context_range);
                let end = (idx + limits.context_range + 1).min(ranked.len());
                keep.extend(start..end);
            }
        }
    }
    keep
}

/// Split one ranking type's entries into kept (with rank and tier) and removed.
///
/// Every entry lands in exactly one window; entries outside all windows
/// cannot exist because the newest window is open ended and the archive has
/// no lower bound.
pub fn plan_prune(
    entries: Vec<RankingEntry>,
    windows: &[PeriodWindow],
    limits: &PruneLimits,
    pinned: &HashSet<String>,
) -> PrunePlan {
    let mut buckets: Vec<Vec<RankingEntry>> = vec![Vec::new(); windows.len()];
    let mut plan = PrunePlan::default();

    for entry in entries {
        match windows.iter().position(|w| w.contains(entry.created_at)) {
            Some(i) => buckets[i].push(entry),
            // Unreachable with well-formed windows; keep rather than lose data
            None => plan.keep.push(KeptEntry {
                rank: entry.rank.unwrap_or(0),
                level: entry.retention_level,
                id: entry.id,
            }),
        }
    }

    for (window, mut ranked) in windows.iter().zip(buckets) {
        sort_entries(&mut ranked);
        let keep = kept_indices(&ranked, window.level, limits, pinned);
        for (idx, entry) in ranked.into_iter().enumerate() {
            if keep.contains(&idx) {
                plan.keep.push(KeptEntry {
                    id: entry.id,
                    rank: idx as u32 + 1,
                    level: window.level,
                });
            } else {
                plan.remove.push(RemovedEntry {
                    id: entry.id,
                    score: entry.score,
                });
            }
        }
    }
    plan
}

/// Outcome counts for one collection in a cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub deleted: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub sessions: CollectionReport,
    pub rooms: CollectionReport,
    pub matchmaking: CollectionReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub archived: u64,
    pub archive_failed: u64,
    pub deleted: u64,
    pub delete_failed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypePruneReport {
    pub kept: u64,
    pub deleted: u64,
    pub deleted_score_sum: u64,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::Duration;

    use super::*;
    use crate::domain::periods::windows;
    use crate::domain::ranking::RankingType;

    const NOW: OffsetDateTime = datetime!(2026-10-16 12:00 UTC);

    fn entry(id: &str, score: u32, created: OffsetDateTime) -> RankingEntry {
        RankingEntry {
            id: id.into(),
            user_id: format!("u-{id}"),
            display_name: id.into(),
            score,
            correct_answers: score,
            total_cards: 1000,
            time_elapsed: 60,
            ranking_type: RankingType::Daily,
            created_at: created,
            retention_level: RetentionLevel::Candidate,
            rank: None,
        }
    }

    fn limits() -> PruneLimits {
        PruneLimits {
            keep_top: 3,
            context_range: 1,
            older_keep_top: 2,
            archive_keep_top: 1,
        }
    }

    #[test]
    fn expiry_rule() {
        let cutoff = NOW - Duration::hours(24);
        let old = cutoff - Duration::hours(1);
        // idle, finished
        assert!(session_expired(false, cutoff, cutoff, cutoff));
        // idle, still active, started before cutoff
        assert!(session_expired(true, old, old, cutoff));
        // idle but started exactly at cutoff and still active
        assert!(!session_expired(true, cutoff, cutoff, cutoff));
        // recently active
        assert!(!session_expired(false, old, NOW, cutoff));
    }

    #[test]
    fn analytics_duration() {
        let start = NOW - Duration::minutes(5);
        let session = GameSession {
            id: "s".into(),
            mode: crate::domain::session::SessionMode::Single,
            players: vec![],
            direction_map: crate::domain::direction::DirectionMap::try_new([
                crate::domain::catalog::CarCategory::Suv,
                crate::domain::catalog::CarCategory::Kei,
                crate::domain::catalog::CarCategory::Coupe,
                crate::domain::catalog::CarCategory::Sedan,
            ])
            .unwrap(),
            cars: vec![],
            rng_seed: 0,
            max_players: 1,
            is_active: false,
            started_at: start,
            last_active_at: start,
            ended_at: Some(start + Duration::seconds(90)),
            lock_version: 1,
        };
        let a = analytics_for(&session, NOW);
        assert!(a.game_completed);
        assert_eq!(a.duration_seconds, Some(90.0));
        assert_eq!(a.created_at, start);

        let open = GameSession {
            ended_at: None,
            is_active: true,
            ..session
        };
        assert_eq!(analytics_for(&open, NOW).duration_seconds, None);
    }

    #[test]
    fn prune_keeps_top_per_tier() {
        let w = windows(RankingType::Daily, NOW, 2);
        let today = NOW - Duration::hours(1);
        let older = NOW - Duration::days(2);
        let ancient = NOW - Duration::days(30);

        let mut entries = Vec::new();
        for i in 0..5 {
            entries.push(entry(&format!("t{i}"), 100 - i, today));
            entries.push(entry(&format!("o{i}"), 100 - i, older));
            entries.push(entry(&format!("a{i}"), 100 - i, ancient));
        }

        let plan = plan_prune(entries, &w, &limits(), &HashSet::new());
        let kept: Vec<_> = plan.keep.iter().map(|k| k.id.as_str()).collect();
        assert_eq!(kept, ["t0", "t1", "t2", "o0", "o1", "a0"]);
        assert_eq!(plan.remove.len(), 9);
        let a0 = plan.keep.iter().find(|k| k.id == "a0").unwrap();
        assert_eq!((a0.rank, a0.level), (1, RetentionLevel::Archive));
    }

    #[test]
    fn pinned_entry_keeps_neighbourhood() {
        let w = windows(RankingType::Daily, NOW, 2);
        let t = NOW - Duration::hours(1);
        let entries: Vec<_> = (0..10)
            .map(|i| entry(&format!("e{i}"), 100 - i, t))
            .collect();
        let pinned: HashSet<String> = ["e7".to_string()].into_iter().collect();

        let plan = plan_prune(entries, &w, &limits(), &pinned);
        let kept: Vec<_> = plan.keep.iter().map(|k| k.id.as_str()).collect();
        assert_eq!(kept, ["e0", "e1", "e2", "e6", "e7", "e8"]);
        let e7 = plan.keep.iter().find(|k| k.id == "e7").unwrap();
        assert_eq!(e7.rank, 8);
    }

    #[test]
    fn pins_do_not_protect_older_tiers() {
        let w = windows(RankingType::Daily, NOW, 2);
        let t = NOW - Duration::days(3);
        let entries: Vec<_> = (0..5)
            .map(|i| entry(&format!("e{i}"), 100 - i, t))
            .collect();
        let pinned: HashSet<String> = ["e4".to_string()].into_iter().collect();
        let plan = plan_prune(entries, &w, &limits(), &pinned);
        assert_eq!(plan.keep.len(), 2);
        assert!(plan.remove.iter().any(|r| r.id == "e4"));
    }
}
