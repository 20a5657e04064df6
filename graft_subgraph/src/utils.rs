//! Utility functions for the subgraph matcher.

use std::collections::HashSet;
use std::hash::Hash;

/// Intersection of borrowed sets; empty when no sets are given.
pub(crate) fn intersect_sets_ref<T: Eq + Hash + Copy>(mut items: Vec<&HashSet<T>>) -> HashSet<T> {
    // Smallest first keeps the fold cheap.
    items.sort_by_key(|s| s.len());
    let mut rest = items.into_iter();
    let Some(first) = rest.next() else {
        return HashSet::new();
    };
    let others: Vec<&HashSet<T>> = rest.collect();
    first
        .iter()
        .copied()
        .filter(|item| others.iter().all(|s| s.contains(item)))
        .collect()
}
