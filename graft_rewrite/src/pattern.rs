//! Pattern model: skeleton, boundary port tables, validator and nested
//! sub-patterns.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use graft_common::Config;
use graft_graph::{Graph, NodeData, NodeId, Param, TypeHierarchy};
use graft_subgraph::SubgraphMatcher;
use indexmap::IndexMap;

use crate::error::{BoxError, RewriteError};

/// Old port name -> new port name.
pub type PortMap = IndexMap<String, String>;

/// Lifts parameters of the result node out of a matched region.
type Extractor = Arc<dyn Fn(&Graph) -> Vec<Param> + Send + Sync>;

/// The graph searched for, plus how its boundary is rewired on replace.
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    /// The graph fragment to match.
    pub graph: Graph,
    /// Pattern node -> renaming of the `in` ports of edges entering it.
    pub in_edge_mapping: IndexMap<NodeId, PortMap>,
    /// Pattern node -> renaming of the `out` ports of edges leaving it.
    pub out_edge_mapping: IndexMap<NodeId, PortMap>,
}

impl Skeleton {
    /// A skeleton with empty mapping tables.
    #[must_use]
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    /// Add an entry to the in-edge table.
    #[must_use]
    pub fn with_in(mut self, node: NodeId, old: &str, new: &str) -> Self {
        self.map_in(node, old, new);
        self
    }

    /// Add an entry to the out-edge table.
    #[must_use]
    pub fn with_out(mut self, node: NodeId, old: &str, new: &str) -> Self {
        self.map_out(node, old, new);
        self
    }

    fn map_in(&mut self, node: NodeId, old: &str, new: &str) {
        self.in_edge_mapping
            .entry(node)
            .or_default()
            .insert(old.to_owned(), new.to_owned());
    }

    fn map_out(&mut self, node: NodeId, old: &str, new: &str) {
        self.out_edge_mapping
            .entry(node)
            .or_default()
            .insert(old.to_owned(), new.to_owned());
    }

    /// New name for `port` on an edge entering `node`.
    #[must_use]
    pub fn in_port(&self, node: NodeId, port: &str) -> Option<&str> {
        self.in_edge_mapping
            .get(&node)
            .and_then(|m| m.get(port))
            .map(String::as_str)
    }

    /// New name for `port` on an edge leaving `node`.
    #[must_use]
    pub fn out_port(&self, node: NodeId, port: &str) -> Option<&str> {
        self.out_edge_mapping
            .get(&node)
            .and_then(|m| m.get(port))
            .map(String::as_str)
    }

    /// Every node named by a mapping table exists in the graph.
    fn check_tables(&self) -> Result<(), RewriteError> {
        match self
            .in_edge_mapping
            .keys()
            .chain(self.out_edge_mapping.keys())
            .find(|id| !self.graph.contains_node(**id))
        {
            Some(&id) => Err(RewriteError::UnknownSkeletonNode(id)),
            None => Ok(()),
        }
    }
}

/// Predicate over the host region an embedding covers.
#[derive(Clone)]
pub struct Validator(Arc<dyn Fn(&Graph) -> Result<bool, BoxError> + Send + Sync>);

impl Validator {
    /// Accepts every region.
    #[must_use]
    pub fn always() -> Self {
        Self::fallible(|_| Ok(true))
    }

    /// Wrap an infallible predicate.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Graph) -> bool + Send + Sync + 'static,
    {
        Self::fallible(move |g| Ok(f(g)))
    }

    /// Wrap a predicate whose errors are propagated to the caller.
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(&Graph) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run the predicate on `region`.
    ///
    /// # Errors
    ///
    /// Whatever the wrapped predicate returns.
    pub fn check(&self, region: &Graph) -> Result<bool, BoxError> {
        (self.0)(region)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::always()
    }
}

impl Debug for Validator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// What a skeleton node stands for.
#[derive(Clone, Copy, Debug)]
pub enum SkeletonNode<'a> {
    /// A host node of (a specialization of) this type.
    Concrete(&'a NodeData),
    /// The collapsed result of a nested pattern.
    Nested(&'a Pattern),
}

/// A rewrite rule. Immutable once built.
///
/// Terminal patterns match their skeleton directly. Non-terminal patterns
/// carry sub-patterns on some skeleton nodes; those are collapsed into
/// their result nodes first, and the skeleton node stands for that result.
#[derive(Clone)]
pub struct Pattern {
    name: String,
    skeleton: Skeleton,
    result: NodeData,
    validator: Validator,
    extractor: Option<Extractor>,
    sub_patterns: IndexMap<NodeId, Arc<Pattern>>,
}

impl Pattern {
    /// Start a pattern whose matches collapse into a node holding `result`.
    pub fn builder(name: impl Into<String>, result: NodeData) -> PatternBuilder {
        PatternBuilder::new(name.into(), result)
    }

    /// Name used in logs and reports.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The skeleton and its port tables.
    #[must_use]
    pub const fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Template for the node each match collapses into.
    #[must_use]
    pub const fn result(&self) -> &NodeData {
        &self.result
    }

    /// Sub-pattern annotations, in declaration order.
    #[must_use]
    pub const fn sub_patterns(&self) -> &IndexMap<NodeId, Arc<Pattern>> {
        &self.sub_patterns
    }

    /// Whether the pattern has no sub-patterns.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.sub_patterns.is_empty()
    }

    /// Kind of a skeleton node, `None` if the skeleton has no such node.
    #[must_use]
    pub fn node_kind(&self, id: NodeId) -> Option<SkeletonNode<'_>> {
        if let Some(sub) = self.sub_patterns.get(&id) {
            return Some(SkeletonNode::Nested(sub));
        }
        self.skeleton.graph.node(id).map(SkeletonNode::Concrete)
    }

    /// Prepare a search for this pattern's skeleton in `host`.
    pub fn matcher<'p, 'h, 'c>(
        &'p self,
        host: &'h Graph,
        hierarchy: &TypeHierarchy,
        config: &'c Config,
    ) -> SubgraphMatcher<'p, 'h, 'c> {
        SubgraphMatcher::new(&self.skeleton.graph, host, hierarchy, config)
    }

    /// Run the validator on a matched region.
    ///
    /// # Errors
    ///
    /// [`RewriteError::Validator`] if the predicate fails.
    pub fn accepts(&self, region: &Graph) -> Result<bool, RewriteError> {
        self.validator.check(region).map_err(RewriteError::Validator)
    }

    /// Data for the node a match over `region` collapses into.
    #[must_use]
    pub fn result_data(&self, region: &Graph) -> NodeData {
        match &self.extractor {
            Some(extract) => NodeData::with_params(self.result.ty.clone(), extract(region)),
            None => self.result.clone(),
        }
    }
}

impl Debug for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("name", &self.name)
            .field("result", &self.result)
            .field("nodes", &self.skeleton.graph.node_count())
            .field("sub_patterns", &self.sub_patterns.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Fluent construction of a [`Pattern`].
///
/// Graph errors are held until [`PatternBuilder::build`].
pub struct PatternBuilder {
    name: String,
    result: NodeData,
    skeleton: Skeleton,
    validator: Validator,
    extractor: Option<Extractor>,
    sub_patterns: IndexMap<NodeId, Arc<Pattern>>,
    error: Option<RewriteError>,
}

impl PatternBuilder {
    fn new(name: String, result: NodeData) -> Self {
        Self {
            name,
            result,
            skeleton: Skeleton::default(),
            validator: Validator::always(),
            extractor: None,
            sub_patterns: IndexMap::new(),
            error: None,
        }
    }

    fn record<T>(&mut self, outcome: Result<T, graft_graph::GraphError>) {
        if let Err(e) = outcome {
            self.error = self.error.take().or(Some(e.into()));
        }
    }

    /// Add a node matched against host nodes of `data`'s type.
    #[must_use]
    pub fn concrete(mut self, id: impl Into<NodeId>, data: NodeData) -> Self {
        let outcome = self.skeleton.graph.add_node(id.into(), data);
        self.record(outcome);
        self
    }

    /// Add a node standing for a match of `sub`, typed as its result.
    #[must_use]
    pub fn nested(mut self, id: impl Into<NodeId>, sub: Arc<Pattern>) -> Self {
        let id = id.into();
        let outcome = self
            .skeleton
            .graph
            .add_node(id, NodeData::new(sub.result.ty.clone()));
        if outcome.is_ok() {
            self.sub_patterns.insert(id, sub);
        }
        self.record(outcome);
        self
    }

    /// Add a skeleton edge.
    #[must_use]
    pub fn edge(
        mut self,
        src: impl Into<NodeId>,
        dst: impl Into<NodeId>,
        out_port: &str,
        in_port: &str,
    ) -> Self {
        let outcome = self
            .skeleton
            .graph
            .add_edge(src.into(), dst.into(), out_port, in_port);
        self.record(outcome);
        self
    }

    /// Rename port `old` to `new` on edges entering `node`.
    #[must_use]
    pub fn map_in(mut self, node: impl Into<NodeId>, old: &str, new: &str) -> Self {
        self.skeleton.map_in(node.into(), old, new);
        self
    }

    /// Rename port `old` to `new` on edges leaving `node`.
    #[must_use]
    pub fn map_out(mut self, node: impl Into<NodeId>, old: &str, new: &str) -> Self {
        self.skeleton.map_out(node.into(), old, new);
        self
    }

    /// Set the validator.
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Derive the result node's parameters from the matched region.
    #[must_use]
    pub fn extractor<F>(mut self, f: F) -> Self
    where
        F: Fn(&Graph) -> Vec<Param> + Send + Sync + 'static,
    {
        self.extractor = Some(Arc::new(f));
        self
    }

    /// Finish the pattern.
    ///
    /// # Errors
    ///
    /// The first graph error met while adding nodes or edges, or
    /// [`RewriteError::UnknownSkeletonNode`] if a mapping table names a node
    /// outside the skeleton.
    pub fn build(self) -> Result<Pattern, RewriteError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        self.skeleton.check_tables()?;
        tracing::debug!(
            "built pattern '{}': {} nodes, {} edges, {} sub-patterns",
            self.name,
            self.skeleton.graph.node_count(),
            self.skeleton.graph.edge_count(),
            self.sub_patterns.len()
        );
        Ok(Pattern {
            name: self.name,
            skeleton: self.skeleton,
            result: self.result,
            validator: self.validator,
            extractor: self.extractor,
            sub_patterns: self.sub_patterns,
        })
    }
}

#[cfg(test)]
mod tests {
    use graft_graph::GraphError;

    use super::*;

    fn add_pattern() -> Pattern {
        Pattern::builder("add", NodeData::new("AddExpr"))
            .concrete(0, NodeData::new("Add"))
            .map_in(0, "lhs", "input")
            .map_out(0, "res", "result")
            .build()
            .unwrap()
    }

    #[test]
    fn tables_are_looked_up_by_node_and_port() {
        let p = add_pattern();
        assert!(p.is_terminal());
        assert_eq!(p.skeleton().in_port(NodeId(0), "lhs"), Some("input"));
        assert_eq!(p.skeleton().out_port(NodeId(0), "res"), Some("result"));
        assert_eq!(p.skeleton().in_port(NodeId(0), "rhs"), None);
        assert_eq!(p.skeleton().out_port(NodeId(1), "res"), None);
    }

    #[test]
    fn nested_nodes_take_the_sub_result_type() {
        let sub = Arc::new(add_pattern());
        let outer = Pattern::builder("outer", NodeData::new("Sum"))
            .nested(0, Arc::clone(&sub))
            .concrete(1, NodeData::new("Print"))
            .edge(0, 1, "result", "x")
            .build()
            .unwrap();

        assert!(!outer.is_terminal());
        assert_eq!(
            outer.skeleton().graph.node(NodeId(0)).unwrap().ty.as_str(),
            "AddExpr"
        );
        assert!(matches!(outer.node_kind(NodeId(0)), Some(SkeletonNode::Nested(p)) if p.name() == "add"));
        assert!(matches!(outer.node_kind(NodeId(1)), Some(SkeletonNode::Concrete(d)) if d.ty.as_str() == "Print"));
        assert!(outer.node_kind(NodeId(7)).is_none());
    }

    #[test]
    fn build_reports_graph_errors() {
        let err = Pattern::builder("bad", NodeData::new("X"))
            .concrete(0, NodeData::new("A"))
            .concrete(0, NodeData::new("B"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RewriteError::Graph(GraphError::DuplicateNode(NodeId(0)))
        ));

        let err = Pattern::builder("bad", NodeData::new("X"))
            .concrete(0, NodeData::new("A"))
            .edge(0, 3, "o", "i")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RewriteError::Graph(GraphError::MissingNode(NodeId(3)))
        ));
    }

    #[test]
    fn build_rejects_tables_outside_the_skeleton() {
        let err = Pattern::builder("bad", NodeData::new("X"))
            .concrete(0, NodeData::new("A"))
            .map_out(4, "o", "p")
            .build()
            .unwrap_err();
        assert!(matches!(err, RewriteError::UnknownSkeletonNode(NodeId(4))));
    }

    #[test]
    fn extractor_replaces_template_params() {
        let p = Pattern::builder("lift", NodeData::with_params("Lit", [Param::Int(0)]))
            .concrete(0, NodeData::new("Const"))
            .extractor(|region| {
                region
                    .nodes()
                    .flat_map(|(_, d)| d.params.iter().cloned())
                    .collect()
            })
            .build()
            .unwrap();

        let mut region = Graph::new();
        region
            .add_node(NodeId(5), NodeData::with_params("Const", [Param::Int(7)]))
            .unwrap();
        let data = p.result_data(&region);
        assert_eq!(data.ty.as_str(), "Lit");
        assert_eq!(data.params, vec![Param::Int(7)]);

        assert_eq!(add_pattern().result_data(&region), NodeData::new("AddExpr"));
    }

    #[test]
    fn validator_errors_propagate() {
        let p = Pattern::builder("v", NodeData::new("X"))
            .concrete(0, NodeData::new("A"))
            .validator(Validator::fallible(|_| Err("boom".into())))
            .build()
            .unwrap();
        let err = p.accepts(&Graph::new()).unwrap_err();
        assert!(matches!(err, RewriteError::Validator(ref e) if e.to_string() == "boom"));

        let small = Validator::predicate(|g| g.node_count() < 2);
        assert!(small.check(&Graph::new()).unwrap());
    }
}
