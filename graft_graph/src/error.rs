use thiserror::Error;

use crate::node::{EdgeId, NodeId, TypeTag};

/// Errors raised by graph and type hierarchy operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    /// A node with this id is already present.
    #[error("Node {0} already exists")]
    DuplicateNode(NodeId),

    /// The node is not part of the graph.
    #[error("Node {0} does not exist")]
    MissingNode(NodeId),

    /// The edge is not part of the graph.
    #[error("Edge {0} does not exist")]
    MissingEdge(EdgeId),

    /// `NodeId(usize::MAX)` is in use, so no larger id is left.
    #[error("No node id above the largest one in use is left")]
    NodeIdsExhausted,

    /// A parent type was used before being declared.
    #[error("Type '{0}' has not been declared")]
    UnknownType(TypeTag),

    /// The type was declared twice.
    #[error("Type '{0}' is already declared")]
    DuplicateType(TypeTag),
}
