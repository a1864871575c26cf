//! Property tests for direction maps, dealing and swipe judgement.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::scoring::{judge_swipe, progress_percent};
use crate::domain::test_gens::{category, direction};
use crate::domain::{deal_deck, ensure_reachable, generate_direction_map, layout_for_seed};

proptest! {
    /// Generated maps always hold four distinct categories.
    #[test]
    fn prop_map_categories_distinct(seed in any::<u64>()) {
        let map = generate_direction_map(&mut ChaCha8Rng::seed_from_u64(seed));
        let set: HashSet<_> = map.categories().into_iter().collect();
        prop_assert_eq!(set.len(), 4);
    }

    /// ensure_reachable maps the category and keeps the map injective.
    #[test]
    fn prop_ensure_reachable(seed in any::<u64>(), cat in category()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let map = generate_direction_map(&mut rng);
        let fixed = ensure_reachable(map, cat, &mut rng);
        prop_assert!(fixed.contains(cat));
        let set: HashSet<_> = fixed.categories().into_iter().collect();
        prop_assert_eq!(set.len(), 4);
        if map.contains(cat) {
            prop_assert_eq!(fixed, map);
        }
    }

    /// Every dealt card can be answered correctly by exactly one direction.
    #[test]
    fn prop_every_card_reachable(seed in any::<i64>(), size in 0usize..60) {
        let (map, deck) = layout_for_seed(seed, size);
        prop_assert_eq!(deck.len(), size);
        for card in &deck {
            let hits = crate::domain::Direction::ALL
                .into_iter()
                .filter(|d| judge_swipe(&map, card, *d))
                .count();
            prop_assert_eq!(hits, 1);
        }
        let ids: HashSet<_> = deck.iter().map(|c| c.id.clone()).collect();
        prop_assert_eq!(ids.len(), deck.len());
    }

    /// A correct swipe is always the mapped direction of the card's category.
    #[test]
    fn prop_judge_matches_lookup(seed in any::<u64>(), dir in direction()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let map = generate_direction_map(&mut rng);
        let deck = deal_deck(&map, 1, &mut rng);
        let card = &deck[0];
        prop_assert_eq!(judge_swipe(&map, card, dir), map.direction_for(card.category) == Some(dir));
    }

    /// Progress is monotone and hits 100 exactly at the end.
    #[test]
    fn prop_progress_monotone(total in 1usize..200) {
        let mut last = 0;
        for i in 0..=total {
            let p = progress_percent(i, total);
            prop_assert!(p >= last);
            prop_assert!(p <= 100);
            last = p;
        }
        prop_assert_eq!(progress_percent(total, total), 100);
    }
}
