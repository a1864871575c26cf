mod common;

use common::{db, small_ranking, test_state};
use sea_orm::TransactionTrait;
use sorter_backend::domain::periods::day_key;
use sorter_backend::domain::ranking::{RankingType, ScoreSubmission};
use sorter_backend::domain::time_util::now_millis;
use sorter_backend::errors::ErrorCode;
use sorter_backend::repos::rankings;
use sorter_backend::services::RankingService;

fn submission(score: u32) -> ScoreSubmission {
    ScoreSubmission {
        score,
        correct_answers: score,
        total_cards: 100,
        time_elapsed: 60,
        ranking_type: RankingType::Daily,
    }
}

#[tokio::test]
async fn inconsistent_score_is_rejected() {
    let state = test_state().await;
    let service = RankingService::new(small_ranking(0.0));
    let txn = db(&state).begin().await.unwrap();

    let bad = ScoreSubmission {
        correct_answers: 101,
        ..submission(10)
    };
    let err = service
        .submit_score(&txn, "u", "U", bad, now_millis())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidScore);
}

#[tokio::test]
async fn submit_trims_tail_past_threshold() {
    let state = test_state().await;
    let conn = db(&state);
    let service = RankingService::new(small_ranking(1.0));
    let now = now_millis();

    // keep_top 3 + 2 * context_range 1 = 5 protected places; threshold 6
    let mut trimmed = Vec::new();
    for (i, score) in [70, 60, 50, 40, 30, 20, 10].into_iter().enumerate() {
        let txn = conn.begin().await.unwrap();
        let outcome = service
            .submit_score(&txn, &format!("u{i}"), "P", submission(score), now)
            .await
            .unwrap();
        txn.commit().await.unwrap();
        trimmed.push(outcome.trimmed);
    }
    assert_eq!(trimmed, [0, 0, 0, 0, 0, 0, 2]);

    let left = rankings::list_all(conn, RankingType::Daily).await.unwrap();
    let mut scores: Vec<u32> = left.iter().map(|e| e.score).collect();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(scores, [70, 60, 50, 40, 30]);

    let stats = rankings::find_statistics(conn, RankingType::Daily, &day_key(now))
        .await
        .unwrap()
        .expect("statistics row");
    assert_eq!(stats.deleted_entries, 2);
    assert_eq!(stats.deleted_score_sum, 30);
    assert_eq!(stats.runs, 1);
}

#[tokio::test]
async fn view_shows_top_and_caller_context() {
    let state = test_state().await;
    let conn = db(&state);
    let service = RankingService::new(small_ranking(0.0));
    let now = now_millis();

    let txn = conn.begin().await.unwrap();
    for (i, score) in [90, 80, 70, 60, 50, 40].into_iter().enumerate() {
        service
            .submit_score(&txn, &format!("u{i}"), &format!("Player {i}"), submission(score), now)
            .await
            .unwrap();
    }
    txn.commit().await.unwrap();

    let anon = service.ranking_view(conn, RankingType::Daily, None).await.unwrap();
    assert_eq!(anon.top.len(), 3);
    assert_eq!(anon.total_count, 6);
    assert_eq!(anon.user_rank, None);
    assert!(anon.user_context.is_empty());
    let ranks: Vec<_> = anon.top.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, [Some(1), Some(2), Some(3)]);

    let mine = service
        .ranking_view(conn, RankingType::Daily, Some("u4"))
        .await
        .unwrap();
    assert_eq!(mine.user_rank, Some(5));
    let context: Vec<_> = mine.user_context.iter().map(|e| e.score).collect();
    assert_eq!(context, [60, 50, 40]);

    // Inside the top list there is no separate context
    let top = service
        .ranking_view(conn, RankingType::Daily, Some("u1"))
        .await
        .unwrap();
    assert_eq!(top.user_rank, Some(2));
    assert!(top.user_context.is_empty());

    let other = service.ranking_view(conn, RankingType::Weekly, None).await.unwrap();
    assert_eq!(other.total_count, 0);
}

#[tokio::test]
async fn ties_break_on_time_then_submission_order() {
    let state = test_state().await;
    let conn = db(&state);
    let service = RankingService::new(small_ranking(0.0));
    let now = now_millis();

    let txn = conn.begin().await.unwrap();
    let slow = ScoreSubmission {
        time_elapsed: 90,
        ..submission(50)
    };
    service.submit_score(&txn, "slow", "S", slow, now).await.unwrap();
    service
        .submit_score(&txn, "early", "E", submission(50), now)
        .await
        .unwrap();
    service
        .submit_score(&txn, "late", "L", submission(50), now + time::Duration::seconds(1))
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let view = service.ranking_view(conn, RankingType::Daily, None).await.unwrap();
    let order: Vec<_> = view.top.iter().map(|e| e.user_id.as_str()).collect();
    assert_eq!(order, ["early", "late", "slow"]);
}
