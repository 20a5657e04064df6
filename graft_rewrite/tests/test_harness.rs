#![allow(dead_code)]

use graft_common::logging;
use graft_graph::{Graph, NodeData, NodeId, Param, TypeHierarchy};

lazy_static::lazy_static! {
    pub static ref HIERARCHY: TypeHierarchy = {
        let mut h = TypeHierarchy::new();
        for root in ["Const", "Print", "Lit", "Neg", "NegLit", "Printed", "Op"] {
            h.declare_root(root).unwrap();
        }
        h.declare("Add", ["Op"]).unwrap();
        h.declare("Mul", ["Op"]).unwrap();
        h
    };
}

pub fn setup_test_logging() {
    logging::setup_test_logging();
}

pub fn n(id: usize) -> NodeId {
    NodeId(id)
}

pub fn int(k: i64) -> NodeData {
    NodeData::with_params("Const", [Param::Int(k)])
}

/// Build a graph from `(id, data)` nodes and `(src, dst, out, in)` edges.
pub fn graph(nodes: Vec<(usize, NodeData)>, edges: &[(usize, usize, &str, &str)]) -> Graph {
    let mut g = Graph::new();
    for (id, data) in nodes {
        g.add_node(n(id), data).unwrap();
    }
    for &(s, d, o, i) in edges {
        g.add_edge(n(s), n(d), o, i).unwrap();
    }
    g
}

/// `1:Const -val/lhs-> 2:<ty> -res/x-> 3:Print`
pub fn single_op_chain(ty: &str) -> Graph {
    graph(
        vec![(1, int(1)), (2, NodeData::new(ty)), (3, NodeData::new("Print"))],
        &[(1, 2, "val", "lhs"), (2, 3, "res", "x")],
    )
}

/// Edges as `(src, out, dst, in)`, in id order.
pub fn wiring(g: &Graph) -> Vec<(NodeId, String, NodeId, String)> {
    g.edges()
        .map(|(_, e)| (e.src, e.out_port.clone(), e.dst, e.in_port.clone()))
        .collect()
}

/// Integer parameters of every node of type `ty` in `region`.
pub fn ints(region: &Graph, ty: &str) -> Vec<i64> {
    region
        .nodes()
        .filter(|(_, d)| d.ty.as_str() == ty)
        .flat_map(|(_, d)| d.params.iter())
        .filter_map(|p| match p {
            Param::Int(k) => Some(*k),
            _ => None,
        })
        .collect()
}
