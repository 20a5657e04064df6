//! Collapsing an embedding into a single node.

use std::collections::HashSet;

use graft_graph::{Edge, EdgeId, Graph, GraphError, NodeData, NodeId};
use graft_subgraph::Embedding;

use crate::error::{PortDirection, RewriteError};
use crate::pattern::Skeleton;

/// Outcome of one [`replace`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
    /// The node the embedding collapsed into.
    pub result_node: NodeId,
    /// Host nodes removed, in skeleton order.
    pub nodes: Vec<NodeId>,
    /// Boundary edges moved onto `result_node`, in processing order.
    pub rewired: Vec<EdgeId>,
    /// Edges deleted with the subsumed nodes, in id order.
    pub removed_edges: Vec<(EdgeId, Edge)>,
}

/// Collapse `embedding` into a new node `new_id` holding `data`.
///
/// Boundary edges entering the region keep their source and `out` port; their
/// `in` port is renamed through the skeleton's in-edge table and they are
/// redirected to `new_id`. Edges leaving a node listed in the out-edge table
/// get their `out` port renamed and start at `new_id`. Every other edge
/// touching the region is removed with it. Edges keep their ids.
///
/// The call is atomic: every lookup is checked before the graph is touched.
///
/// # Errors
///
/// - [`GraphError::DuplicateNode`] if `new_id` is taken.
/// - [`RewriteError::StaleEmbedding`] if an embedded host node is gone.
/// - [`RewriteError::UnmappedPort`] if a boundary port has no table entry.
pub fn replace(
    new_id: NodeId,
    graph: &mut Graph,
    embedding: &Embedding,
    skeleton: &Skeleton,
    data: NodeData,
) -> Result<Replacement, RewriteError> {
    let plan = plan(new_id, graph, embedding, skeleton)?;

    graph.add_node(new_id, data)?;
    let mut rewired = Vec::with_capacity(plan.len());
    for (id, edge) in plan {
        graph.retarget_edge(id, edge)?;
        rewired.push(id);
    }
    let nodes: Vec<NodeId> = embedding.iter().map(|(host, _)| host).collect();
    let removed_edges = graph.remove_nodes(nodes.iter().copied())?;

    tracing::debug!(
        "collapsed {} nodes into {}: {} edges rewired, {} removed",
        nodes.len(),
        new_id,
        rewired.len(),
        removed_edges.len()
    );

    Ok(Replacement {
        result_node: new_id,
        nodes,
        rewired,
        removed_edges,
    })
}

/// Compute the new shape of every boundary edge without touching the graph.
fn plan(
    new_id: NodeId,
    graph: &Graph,
    embedding: &Embedding,
    skeleton: &Skeleton,
) -> Result<Vec<(EdgeId, Edge)>, RewriteError> {
    if graph.contains_node(new_id) {
        return Err(GraphError::DuplicateNode(new_id).into());
    }
    if let Some(host) = embedding.host_nodes().find(|h| !graph.contains_node(*h)) {
        return Err(RewriteError::StaleEmbedding(host));
    }

    let region: HashSet<NodeId> = embedding.host_nodes().collect();
    let mut plan = Vec::new();

    for (host, pattern) in embedding.iter() {
        for (id, edge) in graph.in_edges(host) {
            if region.contains(&edge.src) {
                continue;
            }
            let port = skeleton
                .in_port(pattern, &edge.in_port)
                .ok_or_else(|| RewriteError::UnmappedPort {
                    host,
                    pattern,
                    port: edge.in_port.clone(),
                    direction: PortDirection::In,
                })?;
            plan.push((id, Edge::new(edge.src, new_id, edge.out_port.clone(), port)));
        }
    }

    for (&pattern, ports) in &skeleton.out_edge_mapping {
        let Some(host) = embedding.host_of(pattern) else {
            tracing::trace!("pattern node {} is not embedded", pattern);
            continue;
        };
        for (id, edge) in graph.out_edges(host) {
            if region.contains(&edge.dst) {
                continue;
            }
            let port = ports
                .get(&edge.out_port)
                .ok_or_else(|| RewriteError::UnmappedPort {
                    host,
                    pattern,
                    port: edge.out_port.clone(),
                    direction: PortDirection::Out,
                })?;
            plan.push((id, Edge::new(new_id, edge.dst, port.clone(), edge.in_port.clone())));
        }
    }

    Ok(plan)
}
