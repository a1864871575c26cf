//! Domain layer: pure game and retention rules, no I/O.

pub mod catalog;
pub mod deck;
pub mod direction;
pub mod matchmaking;
pub mod periods;
pub mod ranking;
pub mod retention;
pub mod scoring;
pub mod seed_derivation;
pub mod session;
pub mod time_util;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_props_deck;
#[cfg(test)]
mod tests_props_retention;

pub use catalog::{Car, CarCategory};
pub use deck::{deal_deck, layout_for_seed, DEFAULT_DECK_SIZE};
pub use direction::{ensure_reachable, generate_direction_map, Direction, DirectionMap};
pub use ranking::{RankingEntry, RankingType, RetentionLevel};
pub use scoring::{GameResult, SwipeOutcome};
pub use seed_derivation::{derive_deck_seed, derive_direction_seed};
pub use session::{GameSession, SessionMode, SessionPlayer};
