//! Dense structural index over a [`Graph`].
//!
//! Nodes are renumbered `0..n` in insertion order so the search can use
//! vectors instead of maps. Edges are grouped per ordered node pair.

use std::collections::{HashMap, HashSet};

use graft_graph::{Edge, EdgeId, Graph, NodeData, NodeId};

use crate::profiling::Timer;

/// Dense node index.
pub(crate) type NodeIdx = usize;

/// Edges between one ordered pair of nodes, in id order.
pub(crate) type Link<'a> = Vec<(EdgeId, &'a Edge)>;

#[derive(Clone, Debug)]
pub(crate) struct GraphIndex<'a> {
    /// Dense index -> node id.
    ids: Vec<NodeId>,
    /// Dense index -> node data.
    data: Vec<&'a NodeData>,
    /// Node id -> dense index.
    idx_of: HashMap<NodeId, NodeIdx>,
    /// (src, dst) -> edges from src to dst.
    links: HashMap<(NodeIdx, NodeIdx), Link<'a>>,
    /// Successors of each node.
    fanout: Vec<HashSet<NodeIdx>>,
    /// Predecessors of each node.
    fanin: Vec<HashSet<NodeIdx>>,
    /// Number of outgoing edges per node.
    out_degree: Vec<usize>,
    /// Number of incoming edges per node.
    in_degree: Vec<usize>,
}

impl<'a> GraphIndex<'a> {
    pub(crate) fn build(graph: &'a Graph) -> Self {
        let _t = Timer::new("GraphIndex::build");

        let (ids, data): (Vec<NodeId>, Vec<&'a NodeData>) = graph.nodes().unzip();
        let idx_of: HashMap<NodeId, NodeIdx> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let n = ids.len();
        let mut links: HashMap<(NodeIdx, NodeIdx), Link<'a>> = HashMap::new();
        let mut fanout = vec![HashSet::new(); n];
        let mut fanin = vec![HashSet::new(); n];
        let mut out_degree = vec![0; n];
        let mut in_degree = vec![0; n];

        for (edge_id, edge) in graph.edges() {
            // Graph invariant: endpoints exist.
            let (Some(&s), Some(&d)) = (idx_of.get(&edge.src), idx_of.get(&edge.dst)) else {
                continue;
            };
            links.entry((s, d)).or_default().push((edge_id, edge));
            fanout[s].insert(d);
            fanin[d].insert(s);
            out_degree[s] += 1;
            in_degree[d] += 1;
        }

        GraphIndex {
            ids,
            data,
            idx_of,
            links,
            fanout,
            fanin,
            out_degree,
            in_degree,
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn id(&self, idx: NodeIdx) -> NodeId {
        self.ids[idx]
    }

    pub(crate) fn data(&self, idx: NodeIdx) -> &'a NodeData {
        self.data[idx]
    }

    pub(crate) fn try_idx(&self, id: NodeId) -> Option<NodeIdx> {
        self.idx_of.get(&id).copied()
    }

    /// Edges from `src` to `dst`.
    pub(crate) fn link(&self, src: NodeIdx, dst: NodeIdx) -> &[(EdgeId, &'a Edge)] {
        self.links.get(&(src, dst)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn fanout_set(&self, idx: NodeIdx) -> &HashSet<NodeIdx> {
        &self.fanout[idx]
    }

    pub(crate) fn fanin_set(&self, idx: NodeIdx) -> &HashSet<NodeIdx> {
        &self.fanin[idx]
    }

    /// Distinct nodes adjacent to `idx` in either direction, self excluded.
    pub(crate) fn neighbours(&self, idx: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        self.fanout[idx]
            .union(&self.fanin[idx])
            .copied()
            .filter(move |&other| other != idx)
    }

    pub(crate) fn out_degree(&self, idx: NodeIdx) -> usize {
        self.out_degree[idx]
    }

    pub(crate) fn in_degree(&self, idx: NodeIdx) -> usize {
        self.in_degree[idx]
    }

    /// Count of each `(out, in)` port pair on the edges from `src` to `dst`.
    pub(crate) fn port_profile(
        &self,
        src: NodeIdx,
        dst: NodeIdx,
    ) -> HashMap<(&'a str, &'a str), usize> {
        let mut profile = HashMap::new();
        for (_, edge) in self.link(src, dst) {
            *profile
                .entry((edge.out_port.as_str(), edge.in_port.as_str()))
                .or_insert(0) += 1;
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Graph {
        let mut g = Graph::new();
        for (i, ty) in [(10, "In"), (20, "Add"), (30, "Mul"), (40, "Out")] {
            g.add_node(NodeId(i), NodeData::new(ty)).unwrap();
        }
        g.add_edge(NodeId(10), NodeId(20), "v", "a").unwrap();
        g.add_edge(NodeId(10), NodeId(30), "v", "a").unwrap();
        g.add_edge(NodeId(20), NodeId(40), "r", "x").unwrap();
        g.add_edge(NodeId(30), NodeId(40), "r", "y").unwrap();
        g.add_edge(NodeId(30), NodeId(40), "r", "y").unwrap();
        g
    }

    #[test]
    fn renumbers_in_insertion_order() {
        let g = diamond();
        let idx = GraphIndex::build(&g);
        assert_eq!(idx.node_count(), 4);
        assert_eq!(idx.id(0), NodeId(10));
        assert_eq!(idx.try_idx(NodeId(40)), Some(3));
        assert_eq!(idx.data(1).ty.as_str(), "Add");
    }

    #[test]
    fn links_and_degrees() {
        let g = diamond();
        let idx = GraphIndex::build(&g);
        assert_eq!(idx.link(2, 3).len(), 2);
        assert_eq!(idx.link(3, 2).len(), 0);
        assert_eq!(idx.in_degree(3), 3);
        assert_eq!(idx.out_degree(0), 2);
        assert!(idx.fanout_set(0).contains(&1));
        assert!(idx.fanin_set(3).contains(&2));

        let mut around: Vec<_> = idx.neighbours(3).collect();
        around.sort_unstable();
        assert_eq!(around, vec![1, 2]);
    }

    #[test]
    fn port_profile_counts_parallel_edges() {
        let g = diamond();
        let idx = GraphIndex::build(&g);
        let profile = idx.port_profile(2, 3);
        assert_eq!(profile.get(&("r", "y")), Some(&2));
        assert_eq!(profile.len(), 1);
    }
}
