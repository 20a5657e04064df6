//! Detection and resolution of overlapping sub-pattern embeddings.
//!
//! Two embeddings overlap when they consume a common host node. The strict
//! check fails on the first overlap; the selection keeps a maximum set of
//! pairwise disjoint embeddings and defers the rest.

use graft_graph::NodeId;
use graft_subgraph::Embedding;
use indexmap::IndexMap;
use itertools::Itertools;

use crate::error::RewriteError;

/// Fail on the first pair of overlapping embeddings.
///
/// Pairs are visited per pair of sub-pattern ids, a sub-pattern paired with
/// itself included, in declaration order. An embedding is never compared
/// with itself.
///
/// # Errors
///
/// [`RewriteError::OverlapConflict`] naming both sub-pattern ids and both
/// embeddings.
pub fn check_disjoint(found: &IndexMap<NodeId, Vec<Embedding>>) -> Result<(), RewriteError> {
    for pair in found.iter().combinations_with_replacement(2) {
        let [(first, a), (second, b)] = pair.as_slice() else {
            continue;
        };
        let (first, second) = (**first, **second);
        let same = first == second;
        for ((i, x), (j, y)) in a.iter().enumerate().cartesian_product(b.iter().enumerate()) {
            if same && i >= j {
                continue;
            }
            if !x.is_disjoint(y) {
                tracing::debug!(
                    "overlap between {} and {} on {:?}",
                    first,
                    second,
                    x.overlap(y)
                );
                return Err(RewriteError::overlap(first, second, x, y));
            }
        }
    }
    Ok(())
}

/// Embeddings split into those to rewrite now and those left for later.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Pairwise disjoint embeddings, in input order.
    pub accepted: Vec<(NodeId, Embedding)>,
    /// Embeddings overlapping an accepted one, in input order.
    pub deferred: Vec<(NodeId, Embedding)>,
}

/// Keep a maximum set of pairwise disjoint embeddings.
///
/// Each connected component of the overlap graph is solved on its own:
/// exactly when it has at most `exact_limit` vertices and greedily (minimum
/// degree first) above that. Ties favour embeddings that come first in
/// `found`.
#[must_use]
pub fn select_disjoint(found: &IndexMap<NodeId, Vec<Embedding>>, exact_limit: usize) -> Selection {
    let all: Vec<(NodeId, &Embedding)> = found
        .iter()
        .flat_map(|(&id, list)| list.iter().map(move |e| (id, e)))
        .collect();

    let n = all.len();
    let mut conflicts = vec![vec![false; n]; n];
    for (i, j) in (0..n).tuple_combinations() {
        if !all[i].1.is_disjoint(all[j].1) {
            conflicts[i][j] = true;
            conflicts[j][i] = true;
        }
    }

    let mut keep = vec![false; n];
    for component in components(&conflicts) {
        let chosen = if component.len() <= exact_limit {
            exact_independent_set(&conflicts, &component)
        } else {
            tracing::debug!(
                "overlap component has {} vertices, above the exact limit of {}; selecting greedily",
                component.len(),
                exact_limit
            );
            greedy_independent_set(&conflicts, &component)
        };
        for v in chosen {
            keep[v] = true;
        }
    }

    let mut selection = Selection::default();
    for (i, (id, e)) in all.into_iter().enumerate() {
        if keep[i] {
            selection.accepted.push((id, e.clone()));
        } else {
            selection.deferred.push((id, e.clone()));
        }
    }
    tracing::debug!(
        "selected {} disjoint embeddings, deferred {}",
        selection.accepted.len(),
        selection.deferred.len()
    );
    selection
}

/// Connected components of the overlap graph, each in ascending order.
fn components(conflicts: &[Vec<bool>]) -> Vec<Vec<usize>> {
    let n = conflicts.len();
    let mut seen = vec![false; n];
    let mut out = Vec::new();
    for root in 0..n {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        let mut component = vec![root];
        let mut stack = vec![root];
        while let Some(v) = stack.pop() {
            for (u, &hit) in conflicts[v].iter().enumerate() {
                if hit && !seen[u] {
                    seen[u] = true;
                    component.push(u);
                    stack.push(u);
                }
            }
        }
        component.sort_unstable();
        out.push(component);
    }
    out
}

/// Number of cliques in a greedy clique cover of `vertices`.
///
/// An independent set holds at most one vertex per clique, so this bounds
/// the best completion from above.
fn clique_cover(conflicts: &[Vec<bool>], vertices: &[usize]) -> usize {
    let mut cliques: Vec<Vec<usize>> = Vec::new();
    for &v in vertices {
        match cliques
            .iter_mut()
            .find(|clique| clique.iter().all(|&u| conflicts[v][u]))
        {
            Some(clique) => clique.push(v),
            None => cliques.push(vec![v]),
        }
    }
    cliques.len()
}

/// Branch and bound search for a maximum independent set among `vertices`.
fn exact_independent_set(conflicts: &[Vec<bool>], vertices: &[usize]) -> Vec<usize> {
    fn branch(
        conflicts: &[Vec<bool>],
        candidates: &[usize],
        current: &mut Vec<usize>,
        best: &mut Vec<usize>,
    ) {
        if current.len() + candidates.len() <= best.len() {
            return;
        }
        let Some((&v, rest)) = candidates.split_first() else {
            *best = current.clone();
            return;
        };
        if current.len() + clique_cover(conflicts, candidates) <= best.len() {
            return;
        }

        // Take v.
        let compatible: Vec<usize> = rest.iter().copied().filter(|&u| !conflicts[v][u]).collect();
        current.push(v);
        branch(conflicts, &compatible, current, best);
        current.pop();

        // Leave v, which only helps if v has a neighbour left.
        if compatible.len() < rest.len() {
            branch(conflicts, rest, current, best);
        }
    }

    let mut best = Vec::new();
    branch(conflicts, vertices, &mut Vec::new(), &mut best);
    best
}

/// Repeatedly take the live vertex with the fewest live neighbours.
fn greedy_independent_set(conflicts: &[Vec<bool>], vertices: &[usize]) -> Vec<usize> {
    let mut live = vertices.to_vec();
    let mut keep = Vec::new();
    loop {
        let Some(v) = live
            .iter()
            .copied()
            .min_by_key(|&v| (live.iter().filter(|&&u| conflicts[v][u]).count(), v))
        else {
            break;
        };
        keep.push(v);
        live.retain(|&u| u != v && !conflicts[v][u]);
    }
    keep
}
