//! Pattern-directed graph rewriting.
//!
//! A [`Pattern`] is a skeleton graph plus the port tables used to rewire the
//! boundary of every match. [`replace`] collapses one embedding into a single
//! node; [`Driver`] composes matching, overlap resolution and replacement into
//! rounds, recursing through nested sub-patterns deepest first.

mod driver;
mod error;
mod overlap;
mod pattern;
mod replace;

pub use driver::{Driver, RewriteReport, RoundOutcome};
pub use error::{BoxError, PortDirection, RewriteError};
pub use overlap::{Selection, check_disjoint, select_disjoint};
pub use pattern::{Pattern, PatternBuilder, PortMap, Skeleton, SkeletonNode, Validator};
pub use replace::{Replacement, replace};

pub use graft_subgraph::Embedding;
