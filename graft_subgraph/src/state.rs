//! Partial assignment of skeleton nodes to host nodes during the search.

use crate::index::NodeIdx;

pub(crate) struct State {
    /// Skeleton node -> host node.
    mapping: Vec<Option<NodeIdx>>,
    /// Host nodes taken by the current partial assignment.
    used_h: Vec<bool>,
    /// Skeleton nodes in the order they were mapped.
    trail: Vec<NodeIdx>,
}

impl State {
    pub(crate) fn new(skeleton_nodes: usize, host_nodes: usize) -> Self {
        State {
            mapping: vec![None; skeleton_nodes],
            used_h: vec![false; host_nodes],
            trail: Vec::with_capacity(skeleton_nodes),
        }
    }

    pub(crate) fn is_mapped(&self, p: NodeIdx) -> bool {
        self.mapping[p].is_some()
    }

    pub(crate) fn mapped_to(&self, p: NodeIdx) -> Option<NodeIdx> {
        self.mapping[p]
    }

    pub(crate) fn is_used_host(&self, h: NodeIdx) -> bool {
        self.used_h[h]
    }

    /// Number of mapped skeleton nodes.
    pub(crate) fn depth(&self) -> usize {
        self.trail.len()
    }

    /// Mapped `(skeleton, host)` pairs in mapping order.
    pub(crate) fn mappings(&self) -> impl Iterator<Item = (NodeIdx, NodeIdx)> + '_ {
        self.trail
            .iter()
            .filter_map(|&p| self.mapping[p].map(|h| (p, h)))
    }

    #[contracts::debug_requires(!self.is_mapped(p))]
    #[contracts::debug_requires(!self.is_used_host(h))]
    #[contracts::debug_ensures(self.is_mapped(p) && self.is_used_host(h))]
    pub(crate) fn map(&mut self, p: NodeIdx, h: NodeIdx) {
        self.mapping[p] = Some(h);
        self.used_h[h] = true;
        self.trail.push(p);
    }

    /// Undo the most recent [`State::map`].
    #[contracts::debug_ensures(ret.is_none() || self.depth() + 1 == old(self.depth()))]
    pub(crate) fn unmap_last(&mut self) -> Option<(NodeIdx, NodeIdx)> {
        let p = self.trail.pop()?;
        let h = self.mapping[p].take()?;
        self.used_h[h] = false;
        Some((p, h))
    }

    pub(crate) fn done(&self) -> bool {
        self.trail.len() == self.mapping.len()
    }
}
