//! Seeded randomness used to break ties between otherwise equal requests.
//!
//! Submission order never matters: equal requests are shuffled with an
//! explicit generator so that a run can be replayed from its seed.

use core::cmp::Reverse;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct FairnessRng {
    seed: u64,
    rng: StdRng,
}

impl FairnessRng {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A fresh seed for production runs. Log [`Self::seed`] to replay it.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }
}

/// Sorts `items` by descending `key`. Items with equal keys end up in a
/// uniformly random order.
pub fn priority_order<T, K, F>(items: &mut [T], rng: &mut FairnessRng, mut key: F)
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    rng.shuffle(items);
    // stable, so the shuffle survives within equal keys
    items.sort_by_key(|item| Reverse(key(item)));
}

/// The candidate with the largest `key`, chosen at random among ties.
pub fn pick_max_by_key<T, K, I, F>(candidates: I, rng: &mut FairnessRng, key: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    K: Ord,
    F: FnMut(&T) -> K,
{
    let mut best = candidates.into_iter().max_set_by_key(key);
    if best.len() > 1 {
        rng.shuffle(&mut best);
    }
    best.into_iter().next()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn same_seed_same_permutation() {
        let mut left: Vec<u32> = (0..32).collect();
        let mut right = left.clone();
        FairnessRng::from_seed(7).shuffle(&mut left);
        FairnessRng::from_seed(7).shuffle(&mut right);
        assert_eq!(left, right);
    }

    #[test]
    fn seed_is_reported() {
        assert_eq!(FairnessRng::from_seed(1234).seed(), 1234);
    }

    #[test]
    fn pick_stays_in_bounds() {
        let mut rng = FairnessRng::from_seed(21);
        let items = ['x', 'y', 'z'];
        for _ in 0..10 {
            assert!(items.contains(rng.pick(&items).unwrap()));
        }
        assert_eq!(rng.pick::<char>(&[]), None);
    }

    #[test]
    fn priority_order_is_strict_on_keys() {
        let mut items = vec![(3, 'a'), (6, 'b'), (4, 'c'), (6, 'd'), (3, 'e')];
        for seed in 0..20 {
            priority_order(&mut items, &mut FairnessRng::from_seed(seed), |item| item.0);
            let keys: Vec<u32> = items.iter().map(|item| item.0).collect();
            assert_eq!(keys, vec![6, 6, 4, 3, 3]);
        }
    }

    #[test]
    fn priority_order_shuffles_ties() {
        let orders: BTreeSet<Vec<u32>> = (0..20)
            .map(|seed| {
                let mut items: Vec<u32> = (0..8).collect();
                priority_order(&mut items, &mut FairnessRng::from_seed(seed), |_| 1);
                items
            })
            .collect();
        assert!(orders.len() > 1);
    }

    #[test]
    fn pick_max_prefers_largest_key() {
        let mut rng = FairnessRng::from_seed(3);
        let picked = pick_max_by_key([1, 9, 4, 7], &mut rng, |value| *value);
        assert_eq!(picked, Some(9));
    }

    #[test]
    fn pick_max_breaks_ties_randomly() {
        let picks: BTreeSet<char> = (0..40)
            .filter_map(|seed| {
                pick_max_by_key(
                    [('a', 2), ('b', 2), ('c', 1), ('d', 2)],
                    &mut FairnessRng::from_seed(seed),
                    |candidate| candidate.1,
                )
            })
            .map(|candidate| candidate.0)
            .collect();
        assert_eq!(picks, BTreeSet::from(['a', 'b', 'd']));
    }

    #[test]
    fn pick_max_of_nothing() {
        let mut rng = FairnessRng::from_seed(0);
        assert_eq!(pick_max_by_key(Vec::<u8>::new(), &mut rng, |v| *v), None);
    }
}
