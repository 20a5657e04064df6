//! Typed directed multigraph with named ports and an is-a type hierarchy.
//!
//! Nodes are addressed by caller-chosen [`NodeId`]s and carry a [`NodeData`]
//! (a [`TypeTag`] plus opaque parameters). Edges live in an arena keyed by
//! [`EdgeId`] and connect an `out` port on their source to an `in` port on
//! their destination; parallel edges are distinguished by port names and,
//! when those collide, by their id.

mod error;
mod graph;
mod hierarchy;
mod node;

pub use error::GraphError;
pub use graph::{Edge, Graph};
pub use hierarchy::TypeHierarchy;
pub use node::{EdgeId, NodeData, NodeId, Param, TypeTag};
