//! Configuration for subgraph search and pattern rewriting.
//!
//! The three main concepts are:
//! - dedupe: how repeated embeddings are collapsed while the search runs.
//! - overlap: what the composition driver does when embeddings of different
//!   sub-patterns consume the same host node.
//! - bounds: optional caps on enumeration and on driver rounds.
//!
//! Quick examples
//!
//! Defaults (abort on overlap, collapse automorphisms):
//! ```
//! use graft_common::{Config, DedupeMode, OverlapPolicy};
//! let cfg = Config::default();
//! assert_eq!(cfg.dedupe, DedupeMode::NodeSet);
//! assert_eq!(cfg.overlap, OverlapPolicy::Abort);
//! ```
//!
//! Keep a maximum disjoint subset and stop after ten rounds:
//! ```
//! use graft_common::{Config, OverlapPolicy};
//! let cfg = Config::builder().maximum_disjoint().max_rounds(10).build();
//! assert_eq!(cfg.overlap, OverlapPolicy::MaximumDisjoint);
//! assert_eq!(cfg.max_rounds, Some(10));
//! ```

use serde::{Deserialize, Serialize};

/// Overlap components larger than this are resolved greedily instead of exactly.
pub const DEFAULT_EXACT_INDEPENDENT_SET_LIMIT: usize = 64;

/// Global search and rewrite configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// How embeddings are deduplicated during the search.
    pub dedupe: DedupeMode,
    /// How overlapping sub-pattern embeddings are handled.
    pub overlap: OverlapPolicy,
    /// Stop enumerating after this many embeddings per search.
    pub max_embeddings: Option<usize>,
    /// Stop a fixpoint run after this many rounds.
    pub max_rounds: Option<usize>,
    /// Largest overlap component solved exactly under [`OverlapPolicy::MaximumDisjoint`].
    pub exact_independent_set_limit: usize,
}

impl Config {
    /// Start building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl Default for Config {
    /// Abort on overlap, no bounds, and node-set dedupe.
    ///
    /// Node-set dedupe reports each consumed host node set once, so
    /// automorphic permutations of one match are dropped. Use
    /// [`DedupeMode::None`] to enumerate every isomorphism.
    fn default() -> Self {
        Self {
            dedupe: DedupeMode::NodeSet,
            overlap: OverlapPolicy::Abort,
            max_embeddings: None,
            max_rounds: None,
            exact_independent_set_limit: DEFAULT_EXACT_INDEPENDENT_SET_LIMIT,
        }
    }
}

/// Control how embeddings are deduplicated.
///
/// - None:
///     Report every embedding, including automorphic permutations of the same
///     host nodes.
/// - Full:
///     Drop an embedding only if the exact same host to pattern mapping was
///     already reported.
/// - NodeSet:
///     Collapse embeddings that consume the same SET of host nodes, regardless
///     of which pattern node each host node plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DedupeMode {
    /// No deduplication.
    None,
    /// Deduplicate on the full mapping.
    Full,
    /// Deduplicate on the consumed host node set.
    NodeSet,
}

impl DedupeMode {
    /// Whether any deduplication happens at all.
    #[must_use]
    pub const fn enabled(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// What to do when embeddings of sub-patterns share host nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// Fail the round with an overlap conflict on the first shared node.
    Abort,
    /// Rewrite a maximum set of pairwise disjoint embeddings, defer the rest.
    MaximumDisjoint,
}

/// Fluent builder for [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    /// Configuration under construction.
    config: Config,
}

impl ConfigBuilder {
    /// Set the dedupe mode.
    #[must_use]
    pub const fn dedupe(mut self, dedupe: DedupeMode) -> Self {
        self.config.dedupe = dedupe;
        self
    }

    /// Report every embedding.
    #[must_use]
    pub const fn no_dedupe(self) -> Self {
        self.dedupe(DedupeMode::None)
    }

    /// Set the overlap policy.
    #[must_use]
    pub const fn overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.config.overlap = overlap;
        self
    }

    /// Abort on overlapping sub-pattern embeddings.
    #[must_use]
    pub const fn abort_on_overlap(self) -> Self {
        self.overlap(OverlapPolicy::Abort)
    }

    /// Keep a maximum disjoint subset of overlapping embeddings.
    #[must_use]
    pub const fn maximum_disjoint(self) -> Self {
        self.overlap(OverlapPolicy::MaximumDisjoint)
    }

    /// Cap the number of embeddings a single search reports.
    #[must_use]
    pub const fn max_embeddings(mut self, limit: usize) -> Self {
        self.config.max_embeddings = Some(limit);
        self
    }

    /// Cap the number of rounds a fixpoint run performs.
    #[must_use]
    pub const fn max_rounds(mut self, rounds: usize) -> Self {
        self.config.max_rounds = Some(rounds);
        self
    }

    /// Set the exact independent set threshold.
    #[must_use]
    pub const fn exact_independent_set_limit(mut self, limit: usize) -> Self {
        self.config.exact_independent_set_limit = limit;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}
