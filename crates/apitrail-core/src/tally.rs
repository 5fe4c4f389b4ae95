//! Tallies - additive statistics that fold in any order.
//!
//! A tally (T, ⊕, ∅) satisfies:
//!  - Commutativity: a ⊕ b = b ⊕ a
//!  - Associativity: (a ⊕ b) ⊕ c = a ⊕ (b ⊕ c)
//!  - Identity:      a ⊕ ∅ = a
//!
//! Per-submodule results can therefore be combined in any order, and a
//! version range can be split and recombined without changing totals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Additive statistic.
pub trait Tally: Clone + PartialEq {
    /// The identity element.
    fn empty() -> Self;

    /// Sum of two tallies.
    fn combine(&self, other: &Self) -> Self;

    /// self = self ⊕ other
    fn absorb(&mut self, other: &Self) {
        *self = self.combine(other);
    }

    fn is_empty_tally(&self) -> bool {
        *self == Self::empty()
    }
}

/// Fold an iterator of tallies.
pub fn sum<'a, T, I>(items: I) -> T
where
    T: Tally + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().fold(T::empty(), |acc, item| acc.combine(item))
}

/// Occurrence counts keyed by `K`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountMap<K: Ord> {
    counts: BTreeMap<K, u64>,
}

impl<K: Ord + Clone> CountMap<K> {
    pub fn new() -> Self {
        CountMap {
            counts: BTreeMap::new(),
        }
    }

    pub fn increment(&mut self, key: K) {
        self.add(key, 1);
    }

    /// Add `count` occurrences of `key`. Zero counts are not stored.
    pub fn add(&mut self, key: K, count: u64) {
        if count > 0 {
            *self.counts.entry(key).or_insert(0) += count;
        }
    }

    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum over all keys.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &u64)> {
        self.counts.iter()
    }

    /// Keys ordered by descending count, ties by key.
    pub fn ranked(&self) -> Vec<(&K, u64)> {
        let mut ranked: Vec<(&K, u64)> = self.counts.iter().map(|(k, &v)| (k, v)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<K: Ord + Clone> Default for CountMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone> FromIterator<K> for CountMap<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut map = CountMap::new();
        for key in iter {
            map.increment(key);
        }
        map
    }
}

impl<K: Ord + Clone> Tally for CountMap<K> {
    fn empty() -> Self {
        Self::new()
    }

    fn combine(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (key, &count) in &other.counts {
            result.add(key.clone(), count);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn count_map(keys: Vec<u8>) -> CountMap<u8> {
        keys.into_iter().collect()
    }

    #[test]
    fn test_count_map_basics() {
        let mut map = CountMap::new();
        map.increment("Methods".to_string());
        map.increment("Methods".to_string());
        map.add("Variants".to_string(), 3);
        map.add("Fields".to_string(), 0);

        assert_eq!(map.get(&"Methods".to_string()), 2);
        assert_eq!(map.get(&"Fields".to_string()), 0);
        assert_eq!(map.len(), 2);
        assert_eq!(map.total(), 5);
        assert_eq!(map.ranked()[0].0, "Variants");
    }

    #[test]
    fn test_sum() {
        let parts = vec![count_map(vec![1, 2]), count_map(vec![2, 3])];
        let total: CountMap<u8> = sum(&parts);
        assert_eq!(total.get(&2), 2);
        assert_eq!(total.total(), 4);
    }

    #[test]
    fn test_serde_transparent() {
        let map = count_map(vec![3, 3, 7]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"3":2,"7":1}"#);
        let back: CountMap<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    proptest! {
        #[test]
        fn count_map_combine_is_commutative(
            a in prop::collection::vec(0u8..10, 0..20),
            b in prop::collection::vec(0u8..10, 0..20)
        ) {
            let (a, b) = (count_map(a), count_map(b));
            prop_assert_eq!(a.combine(&b), b.combine(&a));
        }

        #[test]
        fn count_map_combine_is_associative(
            a in prop::collection::vec(0u8..10, 0..10),
            b in prop::collection::vec(0u8..10, 0..10),
            c in prop::collection::vec(0u8..10, 0..10)
        ) {
            let (a, b, c) = (count_map(a), count_map(b), count_map(c));
            prop_assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
        }

        #[test]
        fn count_map_empty_is_identity(a in prop::collection::vec(0u8..10, 0..20)) {
            let a = count_map(a);
            prop_assert_eq!(a.combine(&CountMap::empty()), a.clone());
            prop_assert!(CountMap::<u8>::empty().is_empty_tally());
        }
    }
}
