//! Error types for rewriting.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};

use graft_graph::{GraphError, NodeId};
use graft_subgraph::Embedding;
use thiserror::Error;

/// Boxed error returned by fallible validators.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Side of the matched region a boundary edge crosses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// The edge enters the region.
    In,
    /// The edge leaves the region.
    Out,
}

impl Display for PortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => f.write_str("in"),
            Self::Out => f.write_str("out"),
        }
    }
}

/// Errors raised while building patterns, resolving overlaps or replacing.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// A graph operation failed.
    #[error("Graph operation failed: {0}")]
    Graph(#[from] GraphError),

    /// A boundary edge uses a port the pattern's mapping table does not name.
    #[error("No {direction}-port mapping for '{port}' on pattern node {pattern} (host node {host})")]
    UnmappedPort {
        /// Host node the edge is attached to.
        host: NodeId,
        /// Pattern node `host` plays.
        pattern: NodeId,
        /// The unmapped port name.
        port: String,
        /// Which table was consulted.
        direction: PortDirection,
    },

    /// Embeddings of two sub-patterns share a host node.
    #[error("Patterns not disjoint: {first} and {second} overlap with embeddings {first_embedding} and {second_embedding}")]
    OverlapConflict {
        /// Sub-pattern annotation of the first embedding.
        first: NodeId,
        /// Sub-pattern annotation of the second embedding.
        second: NodeId,
        /// First embedding.
        first_embedding: Box<Embedding>,
        /// Second embedding.
        second_embedding: Box<Embedding>,
    },

    /// The embedding names a host node the graph no longer has.
    #[error("Embedding refers to missing host node {0}")]
    StaleEmbedding(NodeId),

    /// A pattern table names a node outside the skeleton.
    #[error("Mapping table names node {0}, which is not in the skeleton")]
    UnknownSkeletonNode(NodeId),

    /// A caller-supplied validator failed.
    #[error("Validator failed: {0}")]
    Validator(#[source] BoxError),
}

impl RewriteError {
    /// Create an overlap conflict error.
    pub fn overlap(first: NodeId, second: NodeId, a: &Embedding, b: &Embedding) -> Self {
        Self::OverlapConflict {
            first,
            second,
            first_embedding: Box::new(a.clone()),
            second_embedding: Box::new(b.clone()),
        }
    }
}
