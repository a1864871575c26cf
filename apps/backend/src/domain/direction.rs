//! Swipe directions and the per-session direction → category map.

use std::fmt;
use std::str::FromStr;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog::CarCategory;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Assignment order used when generating a map.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }

    const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::InvalidDirection,
                    format!("Unknown direction: {s}"),
                )
            })
    }
}

/// Total map from the four directions to four distinct categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionMap {
    pub up: CarCategory,
    pub right: CarCategory,
    pub down: CarCategory,
    pub left: CarCategory,
}

impl DirectionMap {
    /// Build a map from categories in `Direction::ALL` order, rejecting duplicates.
    pub fn try_new(categories: [CarCategory; 4]) -> Result<Self, DomainError> {
        for (i, c) in categories.iter().enumerate() {
            if categories[..i].contains(c) {
                return Err(DomainError::validation_other(format!(
                    "Direction map repeats category {c}"
                )));
            }
        }
        let [up, right, down, left] = categories;
        Ok(Self {
            up,
            right,
            down,
            left,
        })
    }

    fn as_array(&self) -> [CarCategory; 4] {
        [self.up, self.right, self.down, self.left]
    }

    fn slot_mut(&mut self, direction: Direction) -> &mut CarCategory {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Right => &mut self.right,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
        }
    }

    pub fn category(&self, direction: Direction) -> CarCategory {
        self.as_array()[direction.index()]
    }

    pub fn direction_for(&self, category: CarCategory) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.category(*d) == category)
    }

    pub fn contains(&self, category: CarCategory) -> bool {
        self.direction_for(category).is_some()
    }

    pub fn categories(&self) -> [CarCategory; 4] {
        self.as_array()
    }
}

/// Shuffle all categories and assign the first four to up, right, down, left.
pub fn generate_direction_map<R: Rng + ?Sized>(rng: &mut R) -> DirectionMap {
    let mut pool = CarCategory::ALL;
    pool.shuffle(rng);
    DirectionMap {
        up: pool[0],
        right: pool[1],
        down: pool[2],
        left: pool[3],
    }
}

/// Make `category` reachable by overwriting one random direction if needed.
pub fn ensure_reachable<R: Rng + ?Sized>(
    map: DirectionMap,
    category: CarCategory,
    rng: &mut R,
) -> DirectionMap {
    if map.contains(category) {
        return map;
    }
    let mut out = map;
    // Direction::ALL is non-empty, so choose always yields
    if let Some(direction) = Direction::ALL.choose(rng) {
        *out.slot_mut(*direction) = category;
    }
    out
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn parse_directions() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!(" LEFT ".parse::<Direction>().unwrap(), Direction::Left);
        let err = "diagonal".parse::<Direction>().unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::InvalidDirection, _)
        ));
    }

    #[test]
    fn try_new_rejects_duplicates() {
        let dup = [
            CarCategory::Suv,
            CarCategory::Kei,
            CarCategory::Suv,
            CarCategory::Sedan,
        ];
        assert!(DirectionMap::try_new(dup).is_err());
    }

    #[test]
    fn lookup_both_ways() {
        let map = DirectionMap::try_new([
            CarCategory::Suv,
            CarCategory::Kei,
            CarCategory::Coupe,
            CarCategory::Sedan,
        ])
        .unwrap();
        assert_eq!(map.category(Direction::Down), CarCategory::Coupe);
        assert_eq!(map.direction_for(CarCategory::Sedan), Some(Direction::Left));
        assert_eq!(map.direction_for(CarCategory::Minivan), None);
    }

    #[test]
    fn same_seed_same_map() {
        let a = generate_direction_map(&mut ChaCha8Rng::seed_from_u64(42));
        let b = generate_direction_map(&mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn ensure_reachable_is_noop_when_mapped() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let map = generate_direction_map(&mut rng);
        assert_eq!(ensure_reachable(map, map.up, &mut rng), map);
    }

    #[test]
    fn serde_shape() {
        let map = DirectionMap::try_new([
            CarCategory::Suv,
            CarCategory::Kei,
            CarCategory::Coupe,
            CarCategory::Sedan,
        ])
        .unwrap();
        let v = serde_json::to_value(map).unwrap();
        assert_eq!(v["up"], "SUV");
        assert_eq!(v["left"], "セダン");
    }
}
