//! The constant-folding rewrite system run by the binary.

use std::sync::Arc;

use graft_graph::{Graph, GraphError, NodeData, Param, TypeHierarchy};
use graft_rewrite::{Pattern, RewriteError, Validator};

/// Types used by the demo graphs.
pub fn hierarchy() -> Result<TypeHierarchy, GraphError> {
    let mut h = TypeHierarchy::new();
    for root in ["Const", "Lit", "Print", "Op"] {
        h.declare_root(root)?;
    }
    h.declare("Add", ["Op"])?;
    Ok(h)
}

/// `Const(1) + Const(2) + ... + Const(length + 1) -> Print`, left to right.
pub fn sum_chain(length: usize) -> Result<Graph, GraphError> {
    let mut g = Graph::new();

    let mut acc = g.fresh_node_id()?;
    g.add_node(acc, constant(1))?;
    let mut acc_port = "val";

    for k in 2..=length + 1 {
        let add = g.fresh_node_id()?;
        g.add_node(add, NodeData::new("Add"))?;
        let rhs = g.fresh_node_id()?;
        g.add_node(rhs, constant(k))?;
        g.add_edge(acc, add, acc_port, "lhs")?;
        g.add_edge(rhs, add, "val", "rhs")?;
        acc = add;
        acc_port = "res";
    }

    let print = g.fresh_node_id()?;
    g.add_node(print, NodeData::new("Print"))?;
    g.add_edge(acc, print, acc_port, "x")?;
    Ok(g)
}

fn constant(k: usize) -> NodeData {
    let k = i64::try_from(k).unwrap_or(i64::MAX);
    NodeData::with_params("Const", [Param::Int(k)])
}

fn int_params<'g>(region: &'g Graph, ty: &'g str) -> impl Iterator<Item = i64> + 'g {
    region
        .nodes()
        .filter(move |(_, d)| d.ty.as_str() == ty)
        .flat_map(|(_, d)| d.params.iter())
        .filter_map(|p| match p {
            Param::Int(k) => Some(*k),
            _ => None,
        })
}

/// `Lit(a) -> Add <- Lit(b)` folds to `Lit(a + b)`, where each `Lit` is a
/// collapsed `Const`.
pub fn fold() -> Result<Pattern, RewriteError> {
    let lit = Arc::new(
        Pattern::builder("lit", NodeData::new("Lit"))
            .concrete(0, NodeData::new("Const"))
            .map_out(0, "val", "val")
            .extractor(|region| int_params(region, "Const").map(Param::Int).collect())
            .build()?,
    );

    Pattern::builder("fold", NodeData::new("Lit"))
        .nested(0, Arc::clone(&lit))
        .concrete(1, NodeData::new("Add"))
        .nested(2, lit)
        .edge(0, 1, "val", "lhs")
        .edge(2, 1, "val", "rhs")
        .map_out(1, "res", "val")
        .validator(Validator::predicate(|region| {
            int_params(region, "Lit")
                .try_fold(0i64, i64::checked_add)
                .is_some()
        }))
        .extractor(|region| {
            let sum = int_params(region, "Lit").fold(0i64, i64::saturating_add);
            vec![Param::Int(sum)]
        })
        .build()
}
