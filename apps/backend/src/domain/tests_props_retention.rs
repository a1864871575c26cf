//! Property tests for ranking pruning plans.

use std::collections::HashSet;

use proptest::prelude::*;
use time::macros::datetime;
use time::OffsetDateTime;

use crate::domain::periods::windows;
use crate::domain::ranking::RankingType;
use crate::domain::retention::{plan_prune, PruneLimits};
use crate::domain::test_gens::ranking_entries;

const NOW: OffsetDateTime = datetime!(2026-10-16 12:00 UTC);

fn limits() -> PruneLimits {
    PruneLimits {
        keep_top: 5,
        context_range: 2,
        older_keep_top: 3,
        archive_keep_top: 1,
    }
}

proptest! {
    /// Every entry is either kept or removed, never both, never lost.
    #[test]
    fn prop_plan_partitions_entries(entries in ranking_entries(NOW, 80, 40)) {
        let ids: HashSet<_> = entries.iter().map(|e| e.id.clone()).collect();
        let plan = plan_prune(entries, &windows(RankingType::Daily, NOW, 2), &limits(), &HashSet::new());

        let kept: HashSet<_> = plan.keep.iter().map(|k| k.id.clone()).collect();
        let removed: HashSet<_> = plan.remove.iter().map(|r| r.id.clone()).collect();
        prop_assert!(kept.is_disjoint(&removed));
        prop_assert_eq!(kept.union(&removed).cloned().collect::<HashSet<_>>(), ids);
    }

    /// Re-planning the survivors removes nothing: pruning is idempotent.
    #[test]
    fn prop_plan_idempotent(entries in ranking_entries(NOW, 80, 40)) {
        let w = windows(RankingType::Weekly, NOW, 2);
        let first = plan_prune(entries.clone(), &w, &limits(), &HashSet::new());
        let kept: HashSet<_> = first.keep.iter().map(|k| k.id.clone()).collect();
        let survivors: Vec<_> = entries.into_iter().filter(|e| kept.contains(&e.id)).collect();

        let second = plan_prune(survivors, &w, &limits(), &HashSet::new());
        prop_assert!(second.remove.is_empty());
        prop_assert_eq!(second.keep, first.keep);
    }

    /// Pinning can only keep more, never less.
    #[test]
    fn prop_pins_only_add(entries in ranking_entries(NOW, 60, 10), pick in any::<prop::sample::Index>()) {
        prop_assume!(!entries.is_empty());
        let w = windows(RankingType::Daily, NOW, 2);
        let pinned: HashSet<String> = [entries[pick.index(entries.len())].id.clone()].into_iter().collect();

        let plain = plan_prune(entries.clone(), &w, &limits(), &HashSet::new());
        let with_pin = plan_prune(entries, &w, &limits(), &pinned);
        prop_assert!(with_pin.keep.len() >= plain.keep.len());
    }
}
