//! Dealing a session's deck.

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::catalog::{random_image, Car};
use super::direction::{generate_direction_map, DirectionMap};
use super::seed_derivation::{derive_deck_seed, derive_direction_seed};

pub const DEFAULT_DECK_SIZE: usize = 20;

/// Deal `count` cards whose categories are all reachable from `map`.
///
/// Each card picks one of the four mapped categories uniformly, then a random
/// image of it. Ids are `<image id>_<index>` and therefore unique per deck.
pub fn deal_deck<R: Rng + ?Sized>(map: &DirectionMap, count: usize, rng: &mut R) -> Vec<Car> {
    let categories = map.categories();
    let mut cards = Vec::with_capacity(count);

    for index in 0..count {
        let Some(category) = categories.choose(rng).copied() else {
            break;
        };
        if let Some(image) = random_image(category, rng) {
            cards.push(Car {
                id: format!("{}_{index}", image.id),
                image_url: image.image_url(),
                category,
            });
        }
    }
    cards
}

/// Regenerate a session's map and deck from its stored seed.
pub fn layout_for_seed(session_seed: i64, deck_size: usize) -> (DirectionMap, Vec<Car>) {
    let map = generate_direction_map(&mut ChaCha8Rng::seed_from_u64(derive_direction_seed(
        session_seed,
    )));
    let deck = deal_deck(
        &map,
        deck_size,
        &mut ChaCha8Rng::seed_from_u64(derive_deck_seed(session_seed)),
    );
    (map, deck)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn default_deck_has_twenty_unique_cards() {
        let (map, deck) = layout_for_seed(99, DEFAULT_DECK_SIZE);
        assert_eq!(deck.len(), 20);
        let ids: HashSet<_> = deck.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 20);
        assert!(deck.iter().all(|c| map.contains(c.category)));
    }

    #[test]
    fn card_ids_carry_image_and_index() {
        let (_, deck) = layout_for_seed(5, 3);
        for (i, card) in deck.iter().enumerate() {
            assert!(card.id.ends_with(&format!("_{i}")));
            assert!(card.id.starts_with(card.category.slug()));
            assert!(card.image_url.starts_with("/images/cars/"));
        }
    }

    #[test]
    fn layout_is_reproducible() {
        assert_eq!(layout_for_seed(77, 20), layout_for_seed(77, 20));
    }

    #[test]
    fn empty_deck() {
        let (map, _) = layout_for_seed(1, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(deal_deck(&map, 0, &mut rng).is_empty());
    }
}
