//! Backtracking subgraph isomorphism search over `graft_graph` graphs.
//!
//! A skeleton is embedded into a host graph when every skeleton node maps to
//! a distinct, type-compatible host node and every skeleton edge maps to a
//! distinct host edge with the same direction and `(out, in)` ports. The
//! search is lazy: [`SubgraphMatcher::embeddings`] yields embeddings on demand
//! and each call starts a fresh, independent search.
//!
//! ```
//! use graft_common::Config;
//! use graft_graph::{Graph, NodeData, NodeId, TypeHierarchy};
//! use graft_subgraph::SubgraphMatcher;
//!
//! let mut hierarchy = TypeHierarchy::new();
//! hierarchy.declare_root("Add").unwrap();
//!
//! let mut host = Graph::new();
//! host.add_node(NodeId(1), NodeData::new("Add")).unwrap();
//!
//! let mut skeleton = Graph::new();
//! skeleton.add_node(NodeId(0), NodeData::new("Add")).unwrap();
//!
//! let config = Config::default();
//! let matcher = SubgraphMatcher::new(&skeleton, &host, &hierarchy, &config);
//! let first = matcher.embeddings().next().unwrap();
//! assert_eq!(first.host_of(NodeId(0)), Some(NodeId(1)));
//! ```

mod embedding;
mod index;
mod matcher;
pub mod profiling;
mod search;
mod state;
mod utils;

pub use embedding::Embedding;
pub use matcher::SubgraphMatcher;
pub use search::Embeddings;

#[cfg(test)]
mod tests;
