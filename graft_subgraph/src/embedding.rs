//! A complete assignment of a skeleton onto host nodes and edges.

use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};

use graft_graph::{EdgeId, NodeId};
use indexmap::IndexMap;
use itertools::Itertools;

/// Bijection between a subset of host nodes and the skeleton's nodes, plus
/// the distinct host edge chosen for every skeleton edge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Embedding {
    /// Skeleton node -> host node, in skeleton order.
    pattern_to_host: IndexMap<NodeId, NodeId>,
    /// Host node -> skeleton node.
    host_to_pattern: HashMap<NodeId, NodeId>,
    /// Skeleton edge -> host edge.
    edges: IndexMap<EdgeId, EdgeId>,
}

impl Embedding {
    /// Build an embedding from `(host, pattern)` node pairs and
    /// `(pattern edge, host edge)` pairs.
    ///
    /// Later pairs overwrite earlier ones that reuse a node.
    pub fn from_pairs<N, E>(nodes: N, edges: E) -> Self
    where
        N: IntoIterator<Item = (NodeId, NodeId)>,
        E: IntoIterator<Item = (EdgeId, EdgeId)>,
    {
        let mut embedding = Self::default();
        for (host, pattern) in nodes {
            embedding.assign(pattern, host);
        }
        embedding.edges = edges.into_iter().collect();
        embedding
    }

    pub(crate) fn assign(&mut self, pattern: NodeId, host: NodeId) {
        if let Some(old_host) = self.pattern_to_host.insert(pattern, host) {
            self.host_to_pattern.remove(&old_host);
        }
        if let Some(old_pattern) = self.host_to_pattern.insert(host, pattern) {
            if old_pattern != pattern {
                self.pattern_to_host.shift_remove(&old_pattern);
            }
        }
    }

    pub(crate) fn assign_edge(&mut self, pattern: EdgeId, host: EdgeId) {
        self.edges.insert(pattern, host);
    }

    /// Number of embedded nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.pattern_to_host.len(), self.host_to_pattern.len());
        self.pattern_to_host.len()
    }

    /// Whether nothing is embedded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pattern_to_host.is_empty()
    }

    /// Host node playing the given skeleton node.
    #[must_use]
    pub fn host_of(&self, pattern: NodeId) -> Option<NodeId> {
        self.pattern_to_host.get(&pattern).copied()
    }

    /// Skeleton node played by the given host node.
    #[must_use]
    pub fn pattern_of(&self, host: NodeId) -> Option<NodeId> {
        self.host_to_pattern.get(&host).copied()
    }

    /// Whether the host node is consumed by this embedding.
    #[must_use]
    pub fn contains_host(&self, host: NodeId) -> bool {
        self.host_to_pattern.contains_key(&host)
    }

    /// `(host, pattern)` pairs in skeleton order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.pattern_to_host.iter().map(|(&p, &h)| (h, p))
    }

    /// Consumed host nodes in skeleton order.
    pub fn host_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pattern_to_host.values().copied()
    }

    /// `(pattern edge, host edge)` pairs in skeleton edge order.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (EdgeId, EdgeId)> + '_ {
        self.edges.iter().map(|(&p, &h)| (p, h))
    }

    /// Host edge realising the given skeleton edge.
    #[must_use]
    pub fn host_edge(&self, pattern: EdgeId) -> Option<EdgeId> {
        self.edges.get(&pattern).copied()
    }

    /// Whether the two embeddings consume no common host node.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.host_nodes().all(|h| !large.contains_host(h))
    }

    /// Host nodes consumed by both embeddings, sorted.
    #[must_use]
    pub fn overlap(&self, other: &Self) -> BTreeSet<NodeId> {
        self.host_nodes().filter(|&h| other.contains_host(h)).collect()
    }

    /// Sorted host node ids; equal for embeddings consuming the same nodes.
    #[must_use]
    pub fn signature(&self) -> Vec<usize> {
        let mut sig: Vec<usize> = self.host_nodes().map(|h| h.0).collect();
        sig.sort_unstable();
        sig
    }
}

impl Display for Embedding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.iter().map(|(h, p)| format!("{h}->{p}")).join(", ")
        )
    }
}
