//! Arena-backed multigraph.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;

use crate::error::GraphError;
use crate::node::{EdgeId, NodeData, NodeId};

/// A directed edge from an `out` port of `src` to an `in` port of `dst`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Source node.
    pub src: NodeId,
    /// Destination node.
    pub dst: NodeId,
    /// Port name on the source side.
    pub out_port: String,
    /// Port name on the destination side.
    pub in_port: String,
}

impl Edge {
    /// Build an edge description.
    pub fn new(
        src: NodeId,
        dst: NodeId,
        out_port: impl Into<String>,
        in_port: impl Into<String>,
    ) -> Self {
        Self {
            src,
            dst,
            out_port: out_port.into(),
            in_port: in_port.into(),
        }
    }

    /// Whether the edge carries the given `(out, in)` port pair.
    #[must_use]
    pub fn has_ports(&self, out_port: &str, in_port: &str) -> bool {
        self.out_port == out_port && self.in_port == in_port
    }
}

/// Directed multigraph owning its nodes and edges.
///
/// Invariant: every edge's endpoints exist.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    /// Nodes in insertion order.
    nodes: IndexMap<NodeId, NodeData>,
    /// Edge arena.
    edges: BTreeMap<EdgeId, Edge>,
    /// Node -> ids of edges ending at it.
    incoming: HashMap<NodeId, BTreeSet<EdgeId>>,
    /// Node -> ids of edges starting at it.
    outgoing: HashMap<NodeId, BTreeSet<EdgeId>>,
    /// Next edge key to hand out.
    next_edge: usize,
    /// Largest node id ever inserted.
    max_node: Option<NodeId>,
}

impl Graph {
    /// An empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateNode`] if `id` is taken.
    pub fn add_node(&mut self, id: NodeId, data: NodeData) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.nodes.insert(id, data);
        self.incoming.insert(id, BTreeSet::new());
        self.outgoing.insert(id, BTreeSet::new());
        self.max_node = self.max_node.max(Some(id));
        Ok(())
    }

    /// The smallest id above every id ever inserted into this graph.
    ///
    /// Nothing is reserved: the id is taken once it is passed to
    /// [`Graph::add_node`], and until then repeated calls return the same id.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeIdsExhausted`] if `NodeId(usize::MAX)` was inserted.
    pub fn fresh_node_id(&self) -> Result<NodeId, GraphError> {
        match self.max_node {
            None => Ok(NodeId(0)),
            Some(NodeId(max)) => max
                .checked_add(1)
                .map(NodeId)
                .ok_or(GraphError::NodeIdsExhausted),
        }
    }

    /// Insert an edge between existing nodes.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`] if either endpoint is absent.
    pub fn add_edge(
        &mut self,
        src: NodeId,
        dst: NodeId,
        out_port: impl Into<String>,
        in_port: impl Into<String>,
    ) -> Result<EdgeId, GraphError> {
        self.insert_edge(Edge::new(src, dst, out_port, in_port))
    }

    /// Insert a prepared edge.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`] if either endpoint is absent.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<EdgeId, GraphError> {
        self.require_node(edge.src)?;
        self.require_node(edge.dst)?;
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.link(id, edge);
        Ok(id)
    }

    /// Remove one edge and return it.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingEdge`] if `id` is absent.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge, GraphError> {
        let edge = self.unlink(id).ok_or(GraphError::MissingEdge(id))?;
        Ok(edge)
    }

    /// Move an existing edge to new endpoints and ports, keeping its id.
    ///
    /// Returns the edge as it was before.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingEdge`] if `id` is absent, [`GraphError::MissingNode`]
    /// if a new endpoint is absent. The graph is unchanged on error.
    pub fn retarget_edge(&mut self, id: EdgeId, edge: Edge) -> Result<Edge, GraphError> {
        if !self.edges.contains_key(&id) {
            return Err(GraphError::MissingEdge(id));
        }
        self.require_node(edge.src)?;
        self.require_node(edge.dst)?;
        let previous = self.unlink(id).ok_or(GraphError::MissingEdge(id))?;
        self.link(id, edge);
        Ok(previous)
    }

    /// Remove a set of nodes together with every edge incident to them.
    ///
    /// Returns the removed edges in id order.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`] if any id is absent; nothing is removed then.
    pub fn remove_nodes<I>(&mut self, ids: I) -> Result<Vec<(EdgeId, Edge)>, GraphError>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let ids: Vec<NodeId> = ids.into_iter().collect();
        for &id in &ids {
            self.require_node(id)?;
        }

        let incident: BTreeSet<EdgeId> = ids
            .iter()
            .flat_map(|id| {
                self.incoming
                    .get(id)
                    .into_iter()
                    .chain(self.outgoing.get(id))
                    .flatten()
                    .copied()
            })
            .collect();

        let removed = incident
            .into_iter()
            .filter_map(|e| self.unlink(e).map(|edge| (e, edge)))
            .collect();

        for id in ids {
            self.nodes.shift_remove(&id);
            self.incoming.remove(&id);
            self.outgoing.remove(&id);
        }
        Ok(removed)
    }

    /// Remove one node and its incident edges.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`] if `id` is absent.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<(EdgeId, Edge)>, GraphError> {
        self.remove_nodes([id])
    }

    /// Data of a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(&id)
    }

    /// Whether the node exists.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// An edge by id.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData)> + '_ {
        self.nodes.iter().map(|(&id, data)| (id, data))
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// All edges in id order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter().map(|(&id, edge)| (id, edge))
    }

    /// Edges ending at `id`, in id order. Empty for unknown nodes.
    pub fn in_edges(&self, id: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.adjacent(self.incoming.get(&id))
    }

    /// Edges starting at `id`, in id order. Empty for unknown nodes.
    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.adjacent(self.outgoing.get(&id))
    }

    /// Edges from `src` to `dst`, in id order.
    pub fn edges_between(
        &self,
        src: NodeId,
        dst: NodeId,
    ) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.out_edges(src).filter(move |(_, e)| e.dst == dst)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The subgraph induced by `ids`: those nodes plus every edge with both
    /// endpoints among them. Edge ids are preserved; unknown ids are skipped.
    #[must_use]
    pub fn restricted_to<I>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut region = Self::new();
        for id in ids {
            if let Some(data) = self.nodes.get(&id) {
                // Ids come from a map, so a clash can only be a repeated input id.
                let _ = region.add_node(id, data.clone());
            }
        }
        for (&id, edge) in &self.edges {
            if region.contains_node(edge.src) && region.contains_node(edge.dst) {
                region.link(id, edge.clone());
            }
        }
        region.next_edge = self.next_edge;
        region
    }

    /// Fail unless `id` exists.
    fn require_node(&self, id: NodeId) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            Ok(())
        } else {
            Err(GraphError::MissingNode(id))
        }
    }

    /// Store an edge under `id` and index it. Endpoints must exist.
    fn link(&mut self, id: EdgeId, edge: Edge) {
        self.outgoing.entry(edge.src).or_default().insert(id);
        self.incoming.entry(edge.dst).or_default().insert(id);
        self.edges.insert(id, edge);
    }

    /// Drop an edge from the arena and the adjacency index.
    fn unlink(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        if let Some(out) = self.outgoing.get_mut(&edge.src) {
            out.remove(&id);
        }
        if let Some(inc) = self.incoming.get_mut(&edge.dst) {
            inc.remove(&id);
        }
        Some(edge)
    }

    /// Resolve an adjacency set into edges.
    fn adjacent<'a>(
        &'a self,
        ids: Option<&'a BTreeSet<EdgeId>>,
    ) -> impl Iterator<Item = (EdgeId, &'a Edge)> + 'a {
        ids.into_iter()
            .flatten()
            .filter_map(move |id| self.edges.get(id).map(|edge| (*id, edge)))
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (id, data) in &self.nodes {
            writeln!(f, "{id}: {data}")?;
        }
        for (id, edge) in &self.edges {
            writeln!(
                f,
                "{id}: {} .{} -> {} .{}",
                edge.src, edge.out_port, edge.dst, edge.in_port
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;

    fn n(id: usize) -> NodeId {
        NodeId(id)
    }

    fn chain() -> Graph {
        let mut g = Graph::new();
        g.add_node(n(1), NodeData::new("Const")).unwrap();
        g.add_node(n(2), NodeData::new("Add")).unwrap();
        g.add_node(n(3), NodeData::new("Print")).unwrap();
        g.add_edge(n(1), n(2), "val", "lhs").unwrap();
        g.add_edge(n(2), n(3), "res", "x").unwrap();
        g
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut g = chain();
        assert_eq!(
            g.add_node(n(2), NodeData::new("Mul")),
            Err(GraphError::DuplicateNode(n(2)))
        );
        assert_eq!(g.node(n(2)).unwrap().ty.as_str(), "Add");
    }

    #[test]
    fn edge_requires_endpoints() {
        let mut g = chain();
        assert_eq!(
            g.add_edge(n(1), n(9), "a", "b"),
            Err(GraphError::MissingNode(n(9)))
        );
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn parallel_edges_are_distinct() {
        let mut g = chain();
        let a = g.add_edge(n(1), n(2), "val", "rhs").unwrap();
        let b = g.add_edge(n(1), n(2), "val", "rhs").unwrap();
        assert_ne!(a, b);
        assert_eq!(g.edges_between(n(1), n(2)).count(), 3);
        assert_eq!(g.in_edges(n(2)).count(), 3);
    }

    #[test]
    fn remove_nodes_drops_incident_edges() {
        let mut g = chain();
        let removed = g.remove_nodes([n(2)]).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.out_edges(n(1)).count(), 0);
        assert!(!g.contains_node(n(2)));
    }

    #[test]
    fn remove_nodes_is_checked() {
        let mut g = chain();
        assert_eq!(
            g.remove_nodes([n(1), n(7)]),
            Err(GraphError::MissingNode(n(7)))
        );
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn retarget_keeps_id_and_indexes() {
        let mut g = chain();
        g.add_node(n(4), NodeData::new("Sink")).unwrap();
        let (id, _) = g.out_edges(n(2)).next().unwrap();
        let before = g
            .retarget_edge(id, Edge::new(n(2), n(4), "res", "y"))
            .unwrap();
        assert_eq!(before.dst, n(3));
        assert_eq!(g.in_edges(n(3)).count(), 0);
        let (moved, edge) = g.in_edges(n(4)).next().unwrap();
        assert_eq!(moved, id);
        assert!(edge.has_ports("res", "y"));
    }

    #[test]
    fn fresh_ids_never_repeat() {
        let mut g = chain();
        let a = g.fresh_node_id().unwrap();
        assert_eq!(a, n(4));
        assert_eq!(g.fresh_node_id().unwrap(), a);
        g.add_node(a, NodeData::new("Print")).unwrap();
        assert_eq!(g.fresh_node_id().unwrap(), n(5));
        g.remove_node(a).unwrap();
        assert_eq!(g.fresh_node_id().unwrap(), n(5));
    }

    #[test]
    fn largest_id_is_accepted_and_exhausts_fresh_ids() {
        let mut g = Graph::new();
        assert_eq!(g.fresh_node_id().unwrap(), n(0));
        g.add_node(n(usize::MAX), NodeData::new("Const")).unwrap();
        g.add_node(n(7), NodeData::new("Const")).unwrap();
        assert!(g.contains_node(n(usize::MAX)));
        assert_eq!(g.fresh_node_id(), Err(GraphError::NodeIdsExhausted));
    }

    #[test]
    fn restriction_is_induced() {
        let g = chain();
        let region = g.restricted_to([n(1), n(2)]);
        assert_eq!(region.node_count(), 2);
        assert_eq!(region.edge_count(), 1);
        let (_, edge) = region.edges().next().unwrap();
        assert!(edge.has_ports("val", "lhs"));
    }

    quickcheck! {
        fn every_edge_has_endpoints(links: Vec<(u8, u8)>, drop: Vec<u8>) -> bool {
            let mut g = Graph::new();
            for i in 0..8 {
                g.add_node(n(i), NodeData::new("T")).unwrap();
            }
            for (a, b) in links {
                g.add_edge(n(usize::from(a % 8)), n(usize::from(b % 8)), "o", "i").unwrap();
            }
            let mut drop: Vec<NodeId> = drop.into_iter().map(|d| n(usize::from(d % 8))).collect();
            drop.sort_unstable();
            drop.dedup();
            g.remove_nodes(drop).unwrap();
            let ok = g.edges().all(|(_, e)| g.contains_node(e.src) && g.contains_node(e.dst));
            ok
        }
    }
}
