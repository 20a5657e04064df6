//! Subgraph isomorphism matching implementation.
//!
//! This module provides the engine that finds every embedding of a pattern
//! skeleton inside a host graph. It uses a backtracking search with a fixed,
//! connectivity-first mapping order, type compatibility from a
//! [`TypeHierarchy`], and exact `(out, in)` port checks on every skeleton edge.

use std::collections::{HashMap, HashSet};

use graft_common::Config;
use graft_graph::{Graph, NodeId, TypeHierarchy};

use crate::embedding::Embedding;
use crate::index::{GraphIndex, NodeIdx};
use crate::profiling::Timer;
use crate::search::{Embeddings, search_order};
use crate::state::State;
use crate::utils::intersect_sets_ref;

/// Port pair -> number of skeleton edges carrying it.
type PortProfile<'p> = HashMap<(&'p str, &'p str), usize>;

/// Prepared search of one skeleton inside one host graph.
///
/// Construction indexes both graphs and computes per-node candidate lists;
/// [`SubgraphMatcher::embeddings`] then starts an independent lazy search
/// every time it is called.
pub struct SubgraphMatcher<'p, 'h, 'cfg> {
    /// The skeleton searched for.
    skeleton: &'p Graph,
    /// Structural index for the skeleton.
    skeleton_index: GraphIndex<'p>,
    /// Structural index for the host.
    host_index: GraphIndex<'h>,
    /// Configuration settings for the matcher.
    config: &'cfg Config,
    /// Skeleton node -> type- and degree-compatible host nodes, host order.
    base: Vec<Vec<NodeIdx>>,
    /// Skeleton node -> membership mask over host nodes for `base`.
    allowed: Vec<Vec<bool>>,
    /// Fixed mapping order.
    order: Vec<NodeIdx>,
    /// Required port pairs per ordered skeleton node pair.
    profiles: HashMap<(NodeIdx, NodeIdx), PortProfile<'p>>,
}

impl<'p, 'h, 'cfg> SubgraphMatcher<'p, 'h, 'cfg> {
    /// Index `skeleton` and `host` and prepare the search.
    pub fn new(
        skeleton: &'p Graph,
        host: &'h Graph,
        hierarchy: &TypeHierarchy,
        config: &'cfg Config,
    ) -> Self {
        let _t = Timer::new("SubgraphMatcher::new");
        let skeleton_index = GraphIndex::build(skeleton);
        let host_index = GraphIndex::build(host);

        let (base, allowed) = Self::base_candidates(&skeleton_index, &host_index, hierarchy);
        let order = search_order(&skeleton_index, &base);

        let mut profiles = HashMap::new();
        for a in 0..skeleton_index.node_count() {
            for b in skeleton_index.fanout_set(a) {
                profiles.insert((a, *b), skeleton_index.port_profile(a, *b));
            }
        }

        tracing::debug!(
            "prepared search: skeleton nodes: {}, host nodes: {}, order: {:?}",
            skeleton_index.node_count(),
            host_index.node_count(),
            order
        );

        Self {
            skeleton,
            skeleton_index,
            host_index,
            config,
            base,
            allowed,
            order,
            profiles,
        }
    }

    /// Collect every embedding of `skeleton` in `host`.
    pub fn enumerate_all(
        skeleton: &'p Graph,
        host: &'h Graph,
        hierarchy: &TypeHierarchy,
        config: &'cfg Config,
    ) -> Vec<Embedding> {
        let matcher = Self::new(skeleton, host, hierarchy, config);

        tracing::info!(
            "starting subgraph search: skeleton nodes: {}, host nodes: {}",
            matcher.skeleton_len(),
            matcher.host_len()
        );

        let results: Vec<Embedding> = matcher.embeddings().collect();

        tracing::info!("search complete: found {} embeddings", results.len());
        results
    }

    /// Start a fresh lazy search.
    pub fn embeddings(&self) -> Embeddings<'_> {
        Embeddings::new(self)
    }

    /// Skeleton node ids in the order the search maps them.
    pub fn search_order(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .map(|&p| self.skeleton_index.id(p))
            .collect()
    }

    pub(crate) const fn config(&self) -> &Config {
        self.config
    }

    pub(crate) fn order(&self) -> &[NodeIdx] {
        &self.order
    }

    pub(crate) fn skeleton_len(&self) -> usize {
        self.skeleton_index.node_count()
    }

    pub(crate) fn host_len(&self) -> usize {
        self.host_index.node_count()
    }

    /// Some skeleton node has no compatible host node at all.
    pub(crate) fn has_unmatchable_node(&self) -> bool {
        self.base.iter().any(Vec::is_empty)
    }

    /// Type and degree filter, independent of any partial assignment.
    fn base_candidates(
        skeleton: &GraphIndex<'p>,
        host: &GraphIndex<'h>,
        hierarchy: &TypeHierarchy,
    ) -> (Vec<Vec<NodeIdx>>, Vec<Vec<bool>>) {
        let _t = Timer::new("SubgraphMatcher::base_candidates");
        let mut base = Vec::with_capacity(skeleton.node_count());
        let mut allowed = Vec::with_capacity(skeleton.node_count());

        for p in 0..skeleton.node_count() {
            let p_ty = &skeleton.data(p).ty;
            let mut mask = vec![false; host.node_count()];
            let list: Vec<NodeIdx> = (0..host.node_count())
                .filter(|&h| hierarchy.compatible(&host.data(h).ty, p_ty))
                .filter(|&h| {
                    host.out_degree(h) >= skeleton.out_degree(p)
                        && host.in_degree(h) >= skeleton.in_degree(p)
                })
                .collect();
            for &h in &list {
                mask[h] = true;
            }
            tracing::trace!(
                "skeleton node {} ({}): {} base candidates",
                skeleton.id(p),
                p_ty,
                list.len()
            );
            base.push(list);
            allowed.push(mask);
        }

        (base, allowed)
    }

    /// Host nodes that can extend the partial assignment with skeleton node `p`.
    pub(crate) fn candidates_for(&self, st: &State, p: NodeIdx) -> Vec<NodeIdx> {
        let _t = Timer::new("SubgraphMatcher::candidates_for");

        let mut adjacent_sets: Vec<&HashSet<NodeIdx>> = Vec::new();
        for q in self.skeleton_index.neighbours(p) {
            let Some(g) = st.mapped_to(q) else {
                continue;
            };
            if !self.skeleton_index.link(q, p).is_empty() {
                adjacent_sets.push(self.host_index.fanout_set(g));
            }
            if !self.skeleton_index.link(p, q).is_empty() {
                adjacent_sets.push(self.host_index.fanin_set(g));
            }
        }

        let pool: Vec<NodeIdx> = if adjacent_sets.is_empty() {
            // Nothing adjacent is mapped yet: every compatible host node.
            self.base[p].clone()
        } else {
            // Restrict to nodes wired to all mapped neighbours.
            let mut pool: Vec<NodeIdx> = intersect_sets_ref(adjacent_sets)
                .into_iter()
                .filter(|&h| self.allowed[p][h])
                .collect();
            pool.sort_unstable();
            pool
        };

        let candidates: Vec<NodeIdx> = pool
            .into_iter()
            .filter(|&h| !st.is_used_host(h))
            .filter(|&h| self.feasible(st, p, h))
            .collect();

        if candidates.is_empty() {
            tracing::trace!(
                "backtracking: no candidates for skeleton node {} at depth {}",
                self.skeleton_index.id(p),
                st.depth()
            );
        } else {
            tracing::debug!(
                "skeleton node {} ({}): found {} candidates",
                self.skeleton_index.id(p),
                self.skeleton_index.data(p).ty,
                candidates.len()
            );
        }
        candidates
    }

    /// Every skeleton edge between `p` and an already mapped node (and every
    /// self-loop on `p`) has a distinct host edge with the same ports between
    /// the corresponding host nodes.
    fn feasible(&self, st: &State, p: NodeIdx, h: NodeIdx) -> bool {
        self.ports_covered(p, p, h, h)
            && st
                .mappings()
                .all(|(q, g)| self.ports_covered(p, q, h, g) && self.ports_covered(q, p, g, h))
    }

    /// Host edges `h_src -> h_dst` can realise skeleton edges `p_src -> p_dst`.
    fn ports_covered(
        &self,
        p_src: NodeIdx,
        p_dst: NodeIdx,
        h_src: NodeIdx,
        h_dst: NodeIdx,
    ) -> bool {
        let Some(required) = self.profiles.get(&(p_src, p_dst)) else {
            return true;
        };
        let available = self.host_index.port_profile(h_src, h_dst);
        required
            .iter()
            .all(|(ports, &count)| available.get(ports).is_some_and(|&have| have >= count))
    }

    /// Turn a complete assignment into an [`Embedding`], choosing the
    /// lowest-id unused host edge for each skeleton edge.
    pub(crate) fn build_embedding(&self, found: &[NodeIdx]) -> Embedding {
        let mut embedding = Embedding::default();
        for (p, &h) in found.iter().enumerate() {
            embedding.assign(self.skeleton_index.id(p), self.host_index.id(h));
        }

        let mut used = HashSet::new();
        for (p_edge, edge) in self.skeleton.edges() {
            let (Some(a), Some(b)) = (
                self.skeleton_index.try_idx(edge.src),
                self.skeleton_index.try_idx(edge.dst),
            ) else {
                continue;
            };
            let chosen = self
                .host_index
                .link(found[a], found[b])
                .iter()
                .find(|(h_edge, h)| {
                    !used.contains(h_edge) && h.has_ports(&edge.out_port, &edge.in_port)
                })
                .map(|(h_edge, _)| *h_edge);
            if let Some(h_edge) = chosen {
                used.insert(h_edge);
                embedding.assign_edge(p_edge, h_edge);
            }
        }
        embedding
    }
}
