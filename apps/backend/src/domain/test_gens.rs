// Proptest generators for domain types.

use proptest::prelude::*;
use time::{Duration, OffsetDateTime};

use crate::domain::ranking::{RankingEntry, RankingType, RetentionLevel};
use crate::domain::{CarCategory, Direction};

pub fn category() -> impl Strategy<Value = CarCategory> {
    (0..CarCategory::ALL.len()).prop_map(|i| CarCategory::ALL[i])
}

pub fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Right),
        Just(Direction::Down),
        Just(Direction::Left),
    ]
}

/// Instants within `days_back` days before `now`.
pub fn instant_before(now: OffsetDateTime, days_back: i64) -> impl Strategy<Value = OffsetDateTime> {
    (0..days_back * 24 * 60).prop_map(move |mins| now - Duration::minutes(mins))
}

/// Ranking entries with unique ids, spread over the last `days_back` days.
pub fn ranking_entries(
    now: OffsetDateTime,
    max_len: usize,
    days_back: i64,
) -> impl Strategy<Value = Vec<RankingEntry>> {
    prop::collection::vec((0u32..50, 0u32..300, instant_before(now, days_back)), 0..max_len)
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (score, time_elapsed, created_at))| RankingEntry {
                    id: format!("r{i:04}"),
                    user_id: format!("u{}", i % 7),
                    display_name: format!("P{i}"),
                    score,
                    correct_answers: score,
                    total_cards: 50,
                    time_elapsed,
                    ranking_type: RankingType::Daily,
                    created_at,
                    retention_level: RetentionLevel::Candidate,
                    rank: None,
                })
                .collect()
        })
}
