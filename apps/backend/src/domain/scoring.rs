//! Swipe judgement, progress and final results.

use serde::Serialize;
use time::OffsetDateTime;

use super::catalog::Car;
use super::direction::{Direction, DirectionMap};

/// A swipe is correct iff the card's category is the one mapped to `direction`.
pub fn judge_swipe(map: &DirectionMap, card: &Car, direction: Direction) -> bool {
    map.category(direction) == card.category
}

/// `floor(next_index * 100 / total)`; 0 for an empty deck.
pub fn progress_percent(next_index: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = next_index.min(total) * 100 / total;
    pct as u8
}

/// Whole seconds between `start` and `end`, never negative.
pub fn elapsed_seconds(start: OffsetDateTime, end: OffsetDateTime) -> u32 {
    let secs = (end - start).whole_seconds();
    secs.clamp(0, i64::from(u32::MAX)) as u32
}

/// Final result shown to a player who finished the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub score: u32,
    pub correct_answers: u32,
    pub total_answers: u32,
    pub time_in_seconds: u32,
}

pub fn game_result(score: u32, total: u32, start: OffsetDateTime, end: OffsetDateTime) -> GameResult {
    GameResult {
        score,
        correct_answers: score,
        total_answers: total,
        time_in_seconds: elapsed_seconds(start, end),
    }
}

/// What one swipe did to the swiping player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeOutcome {
    pub correct: bool,
    pub score: u32,
    pub next_index: u32,
    pub progress: u8,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::domain::catalog::CarCategory;

    fn map() -> DirectionMap {
        DirectionMap::try_new([
            CarCategory::Suv,
            CarCategory::Kei,
            CarCategory::Coupe,
            CarCategory::Sedan,
        ])
        .unwrap()
    }

    fn card(category: CarCategory) -> Car {
        Car {
            id: "x_0".into(),
            image_url: "/images/cars/x.png".into(),
            category,
        }
    }

    #[test]
    fn judge() {
        assert!(judge_swipe(&map(), &card(CarCategory::Kei), Direction::Right));
        assert!(!judge_swipe(&map(), &card(CarCategory::Kei), Direction::Up));
    }

    #[test]
    fn progress_floors() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 66);
        assert_eq!(progress_percent(20, 20), 100);
        assert_eq!(progress_percent(5, 0), 0);
    }

    #[test]
    fn elapsed_never_negative() {
        let a = datetime!(2026-10-01 12:00:00 UTC);
        let b = datetime!(2026-10-01 12:01:05.900 UTC);
        assert_eq!(elapsed_seconds(a, b), 65);
        assert_eq!(elapsed_seconds(b, a), 0);
    }

    #[test]
    fn result_counts_correct_as_score() {
        let a = datetime!(2026-10-01 12:00:00 UTC);
        let r = game_result(14, 20, a, a + time::Duration::seconds(42));
        assert_eq!(r.correct_answers, 14);
        assert_eq!(r.total_answers, 20);
        assert_eq!(r.time_in_seconds, 42);
    }
}
