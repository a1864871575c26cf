mod common;

use std::collections::HashSet;

use common::{db, small_ranking, test_state};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use sorter_backend::config::retention::RetentionConfig;
use sorter_backend::domain::matchmaking::RoomStatus;
use sorter_backend::domain::periods::day_key;
use sorter_backend::domain::ranking::{RankingType, RetentionLevel, ScoreSubmission};
use sorter_backend::domain::time_util::{now_millis, to_millis};
use sorter_backend::entities::{game_sessions, session_players};
use sorter_backend::errors::ErrorCode;
use sorter_backend::jobs::{run_once, spawn_scheduler, Job};
use sorter_backend::repos::{analytics, rankings, rooms, sessions};
use sorter_backend::services::{RankingService, RetentionService, RoomService, SessionService};
use time::Duration;
use tokio_util::sync::CancellationToken;

fn retention_cfg() -> RetentionConfig {
    RetentionConfig {
        ranking: small_ranking(0.0),
        ..RetentionConfig::default()
    }
}

#[tokio::test]
async fn cleanup_removes_only_expired_records() {
    let state = test_state().await;
    let conn = db(&state);
    let sessions_svc = SessionService::new(state.game);
    let rooms_svc = RoomService::new(sessions_svc);
    let now = now_millis();
    let old = now - Duration::hours(48);

    let txn = conn.begin().await.unwrap();
    let stale_single = sessions_svc.start_single(&txn, "a", "A", old).await.unwrap();
    let fresh_single = sessions_svc.start_single(&txn, "b", "B", now).await.unwrap();
    let stale_multi = sessions_svc.join_multi(&txn, "c", "C", old).await.unwrap();
    let waiting_room = rooms_svc.create_room(&txn, "h1", "H1", 2, old).await.unwrap();
    let active_room = rooms_svc.create_room(&txn, "h2", "H2", 2, old).await.unwrap();
    rooms_svc
        .join_room(&txn, "g2", "G2", &active_room.room.code, old)
        .await
        .unwrap();
    rooms_svc
        .start_room(&txn, "h2", &active_room.room.id)
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let report = RetentionService::new(retention_cfg())
        .cleanup_old_rooms(conn, now)
        .await
        .unwrap();
    assert_eq!(report.sessions.deleted, 4);
    assert_eq!(report.rooms.deleted, 1);
    assert_eq!(report.matchmaking.deleted, 1);
    assert_eq!(
        report.sessions.failed + report.rooms.failed + report.matchmaking.failed,
        0
    );

    assert!(sessions::find_by_id(conn, &stale_single.id).await.unwrap().is_none());
    assert!(sessions::find_by_id(conn, &fresh_single.id).await.unwrap().is_some());
    assert!(rooms::find_entry(conn, &stale_multi.id).await.unwrap().is_none());

    let err = rooms::require_room(conn, &waiting_room.room.id).await.unwrap_err();
    assert_eq!(sorter_backend::AppError::from(err).code(), ErrorCode::RoomNotFound);
    let kept = rooms::require_room(conn, &active_room.room.id).await.unwrap();
    assert_eq!(kept.status, RoomStatus::Active);
}

#[tokio::test]
async fn archive_writes_analytics_before_delete() {
    let state = test_state().await;
    let conn = db(&state);
    let service = SessionService::new(state.game);
    let now = now_millis();
    let old = now - Duration::hours(30);

    let txn = conn.begin().await.unwrap();
    let finished = service.start_single(&txn, "done", "D", old).await.unwrap();
    service
        .leave(&txn, &finished.id, "done", old + Duration::seconds(45))
        .await
        .unwrap();
    let fresh = service.start_single(&txn, "busy", "B", now).await.unwrap();
    txn.commit().await.unwrap();

    let report = RetentionService::new(retention_cfg())
        .archive_and_clean(conn, now)
        .await
        .unwrap();
    assert_eq!((report.archived, report.deleted), (1, 1));
    assert_eq!((report.archive_failed, report.delete_failed), (0, 0));

    let row = analytics::find_archived(conn, &finished.id)
        .await
        .unwrap()
        .expect("analytics row");
    assert!(row.game_completed);
    assert_eq!(row.player_count, 1);
    assert_eq!(row.max_players, 1);
    assert_eq!(row.duration_seconds, Some(45.0));
    assert_eq!(row.created_at, old);

    assert!(sessions::find_by_id(conn, &finished.id).await.unwrap().is_none());
    assert!(sessions::find_by_id(conn, &fresh.id).await.unwrap().is_some());
    assert!(analytics::find_archived(conn, &fresh.id).await.unwrap().is_none());

    // Nothing left to archive
    let again = RetentionService::new(retention_cfg())
        .archive_and_clean(conn, now)
        .await
        .unwrap();
    assert_eq!(again.archived, 0);
}

async fn seed_scores(state: &sorter_backend::AppState, scores: &[u32], at: time::OffsetDateTime) {
    let conn = db(state);
    let service = RankingService::new(small_ranking(0.0));
    let txn = conn.begin().await.unwrap();
    for (i, &score) in scores.iter().enumerate() {
        let submission = ScoreSubmission {
            score,
            correct_answers: score,
            total_cards: 100,
            time_elapsed: 30,
            ranking_type: RankingType::Daily,
        };
        service
            .submit_score(&txn, &format!("seed-{score}-{i}"), "Seed", submission, at)
            .await
            .unwrap();
    }
    txn.commit().await.unwrap();
}

#[tokio::test]
async fn prune_keeps_top_per_tier_and_records_stats() {
    let state = test_state().await;
    let conn = db(&state);
    let now = now_millis();
    seed_scores(&state, &[90, 80, 70, 60, 50, 40], now).await;
    seed_scores(&state, &[30, 20, 10], now - Duration::days(40)).await;

    let service = RetentionService::new(retention_cfg());
    let report = service
        .prune_type(conn, RankingType::Daily, now, &HashSet::new())
        .await
        .unwrap();
    // 3 current kept, 1 archive kept
    assert_eq!(report.kept, 4);
    assert_eq!(report.deleted, 5);
    assert_eq!(report.deleted_score_sum, 60 + 50 + 40 + 20 + 10);

    let left = rankings::list_all(conn, RankingType::Daily).await.unwrap();
    let top = left.iter().find(|e| e.score == 90).unwrap();
    assert_eq!((top.rank, top.retention_level), (Some(1), RetentionLevel::Current));
    let archived = left.iter().find(|e| e.score == 30).unwrap();
    assert_eq!(
        (archived.rank, archived.retention_level),
        (Some(1), RetentionLevel::Archive)
    );

    let stats = rankings::find_statistics(conn, RankingType::Daily, &day_key(now))
        .await
        .unwrap()
        .unwrap();
    assert_eq!((stats.deleted_entries, stats.runs), (5, 1));

    // A second run finds nothing to delete and leaves the statistics alone
    let rerun = service
        .prune_type(conn, RankingType::Daily, now, &HashSet::new())
        .await
        .unwrap();
    assert_eq!(rerun.deleted, 0);
    let stats = rankings::find_statistics(conn, RankingType::Daily, &day_key(now))
        .await
        .unwrap()
        .unwrap();
    assert_eq!((stats.deleted_entries, stats.runs), (5, 1));
}

#[tokio::test]
async fn recent_entries_are_pinned_with_neighbours() {
    let state = test_state().await;
    let conn = db(&state);
    let now = now_millis();
    seed_scores(&state, &[90, 80, 70, 60, 50, 40, 30], now - Duration::hours(2)).await;

    let service = RetentionService::new(retention_cfg());
    let pinned = service.recent_pins(conn, now).await.unwrap();
    assert_eq!(pinned.len(), 7);

    let report = service.prune_rankings(conn, now, &pinned).await;
    assert!(report.failed_types.is_empty());
    assert_eq!(report.pruned.len(), RankingType::ALL.len());
    let daily = report
        .pruned
        .iter()
        .find(|p| p.ranking_type == RankingType::Daily)
        .unwrap();
    assert_eq!((daily.report.kept, daily.report.deleted), (7, 0));
}

#[tokio::test]
async fn run_once_all_reports_every_step() {
    let state = test_state().await;
    let conn = db(&state);
    let old = now_millis() - Duration::hours(48);

    let txn = conn.begin().await.unwrap();
    SessionService::new(state.game)
        .start_single(&txn, "old", "Old", old)
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let report = run_once(conn, &retention_cfg(), Job::All).await.unwrap();
    assert_eq!(report.archive.unwrap().archived, 1);
    // Archival already removed the session
    assert_eq!(report.cleanup.unwrap().sessions.deleted, 0);
    assert!(report.rankings.unwrap().failed_types.is_empty());

    let only = run_once(conn, &retention_cfg(), Job::Cleanup).await.unwrap();
    assert!(only.archive.is_none() && only.rankings.is_none());
}

#[tokio::test]
async fn undecodable_session_is_kept_when_archive_fails() {
    let state = test_state().await;
    let conn = db(&state);
    let now = now_millis();
    let old = now - Duration::hours(30);

    let txn = conn.begin().await.unwrap();
    let healthy = SessionService::new(state.game)
        .start_single(&txn, "ok", "Ok", old)
        .await
        .unwrap();
    txn.commit().await.unwrap();

    game_sessions::ActiveModel {
        id: Set("corrupt-session".to_owned()),
        mode: Set("single".to_owned()),
        direction_map: Set("{not json".to_owned()),
        cards: Set("[]".to_owned()),
        rng_seed: Set(7),
        max_players: Set(1),
        is_active: Set(false),
        started_at: Set(to_millis(old)),
        last_active_at: Set(to_millis(old)),
        ended_at: Set(Some(to_millis(old))),
        lock_version: Set(1),
    }
    .insert(conn)
    .await
    .unwrap();

    let report = RetentionService::new(retention_cfg())
        .archive_and_clean(conn, now)
        .await
        .unwrap();
    assert_eq!((report.archived, report.deleted), (1, 1));
    assert_eq!((report.archive_failed, report.delete_failed), (1, 0));

    assert!(sessions::find_by_id(conn, &healthy.id).await.unwrap().is_none());
    assert!(analytics::find_archived(conn, "corrupt-session")
        .await
        .unwrap()
        .is_none());
    let kept = game_sessions::Entity::find_by_id("corrupt-session".to_owned())
        .one(conn)
        .await
        .unwrap();
    assert!(kept.is_some(), "session left for the next run");
}

#[tokio::test]
async fn scheduler_runs_once_at_startup() {
    let state = test_state().await;
    let conn = db(&state);
    let old = now_millis() - Duration::hours(48);

    let txn = conn.begin().await.unwrap();
    let stale = SessionService::new(state.game)
        .start_single(&txn, "old", "Old", old)
        .await
        .unwrap();
    txn.commit().await.unwrap();

    // Default interval is a day; only a run at startup can archive this in time
    let shutdown = CancellationToken::new();
    let handle = spawn_scheduler(conn.clone(), retention_cfg(), shutdown.clone());

    let archived = tokio::time::timeout(std::time::Duration::from_secs(10), async {
        loop {
            if analytics::find_archived(conn, &stale.id).await.unwrap().is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    })
    .await;

    shutdown.cancel();
    handle.await.unwrap();
    assert!(archived.is_ok(), "scheduler did not run at startup");
    assert!(sessions::find_by_id(conn, &stale.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_session_takes_its_players() {
    let state = test_state().await;
    let conn = db(&state);
    let service = SessionService::new(state.game);

    let txn = conn.begin().await.unwrap();
    let session = service.join_multi(&txn, "p1", "P1", now_millis()).await.unwrap();
    service.join_multi(&txn, "p2", "P2", now_millis()).await.unwrap();
    txn.commit().await.unwrap();

    let players = || {
        session_players::Entity::find()
            .filter(session_players::Column::SessionId.eq(session.id.as_str()))
            .count(conn)
    };
    assert_eq!(players().await.unwrap(), 2);

    assert_eq!(sessions::delete_session(conn, &session.id).await.unwrap(), 1);
    assert_eq!(players().await.unwrap(), 0);
    assert!(sessions::find_by_id(conn, &session.id).await.unwrap().is_none());

    // Already gone: nothing to delete, not an error
    assert_eq!(sessions::delete_session(conn, &session.id).await.unwrap(), 0);
}
