//! Rounds of matching, overlap resolution and replacement.

use std::sync::Arc;

use graft_common::{Config, OverlapPolicy};
use graft_graph::{Graph, NodeId, TypeHierarchy};
use graft_subgraph::Embedding;
use indexmap::IndexMap;

use crate::error::RewriteError;
use crate::overlap::{check_disjoint, select_disjoint};
use crate::pattern::Pattern;
use crate::replace::{Replacement, replace};

/// Result of one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    /// At least one embedding was collapsed.
    Rewritten(Vec<Replacement>),
    /// Nothing matched; the graph is unchanged.
    Exhausted,
}

/// Summary of [`Driver::run_to_fixpoint`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Rounds that rewrote something.
    pub rounds: usize,
    /// Every replacement, in the order performed.
    pub replacements: Vec<Replacement>,
    /// The run stopped at `max_rounds` rather than at a fixpoint.
    pub hit_round_limit: bool,
}

/// Applies patterns to a host graph.
#[derive(Clone, Debug)]
pub struct Driver {
    hierarchy: TypeHierarchy,
    config: Config,
}

impl Driver {
    /// Create a driver over `hierarchy` with `config`.
    #[must_use]
    pub const fn new(hierarchy: TypeHierarchy, config: Config) -> Self {
        Self { hierarchy, config }
    }

    /// The type hierarchy used for matching.
    #[must_use]
    pub const fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Every embedding of `pattern`'s skeleton in `graph` its validator accepts.
    ///
    /// # Errors
    ///
    /// [`RewriteError::Validator`] if the validator fails.
    pub fn matches(
        &self,
        pattern: &Pattern,
        graph: &Graph,
    ) -> Result<Vec<Embedding>, RewriteError> {
        let matcher = pattern.matcher(graph, &self.hierarchy, &self.config);
        let mut accepted = Vec::new();
        for embedding in matcher.embeddings() {
            if self.validates(pattern, graph, &embedding)? {
                accepted.push(embedding);
            }
        }
        Ok(accepted)
    }

    /// Run one round.
    ///
    /// Sub-patterns are collapsed level by level, deepest first, then the
    /// first accepted embedding of `pattern`'s own skeleton is replaced. On
    /// error the graph is restored to its state before the round.
    ///
    /// # Errors
    ///
    /// Any [`RewriteError`] raised while matching, resolving overlaps or
    /// replacing.
    pub fn apply_once(
        &self,
        pattern: &Pattern,
        graph: &mut Graph,
    ) -> Result<RoundOutcome, RewriteError> {
        let snapshot = (!pattern.is_terminal()).then(|| graph.clone());
        let mut replacements = Vec::new();

        let outcome = self
            .collapse_sub_patterns(pattern, graph, &mut replacements)
            .and_then(|()| self.rewrite_first(pattern, graph));

        match outcome {
            Ok(Some(r)) => replacements.push(r),
            Ok(None) => {}
            Err(e) => {
                if let Some(before) = snapshot {
                    *graph = before;
                }
                tracing::debug!("round for '{}' failed: {}", pattern.name(), e);
                return Err(e);
            }
        }

        if replacements.is_empty() {
            tracing::info!("pattern '{}': no embeddings", pattern.name());
            Ok(RoundOutcome::Exhausted)
        } else {
            tracing::info!(
                "pattern '{}': {} replacements this round",
                pattern.name(),
                replacements.len()
            );
            Ok(RoundOutcome::Rewritten(replacements))
        }
    }

    /// Run rounds until one is exhausted or `max_rounds` is reached.
    ///
    /// # Errors
    ///
    /// The first error of any round; earlier rounds stay applied.
    pub fn run_to_fixpoint(
        &self,
        pattern: &Pattern,
        graph: &mut Graph,
    ) -> Result<RewriteReport, RewriteError> {
        let mut report = RewriteReport::default();
        loop {
            if self.config.max_rounds.is_some_and(|limit| report.rounds >= limit) {
                tracing::warn!(
                    "pattern '{}': stopped after {} rounds without reaching a fixpoint",
                    pattern.name(),
                    report.rounds
                );
                report.hit_round_limit = true;
                break;
            }
            match self.apply_once(pattern, graph)? {
                RoundOutcome::Rewritten(done) => {
                    report.rounds += 1;
                    report.replacements.extend(done);
                }
                RoundOutcome::Exhausted => break,
            }
        }
        tracing::info!(
            "pattern '{}': {} rounds, {} replacements",
            pattern.name(),
            report.rounds,
            report.replacements.len()
        );
        Ok(report)
    }

    /// Collapse every accepted embedding of `pattern`'s sub-patterns, after
    /// recursively doing the same for theirs.
    fn collapse_sub_patterns(
        &self,
        pattern: &Pattern,
        graph: &mut Graph,
        out: &mut Vec<Replacement>,
    ) -> Result<(), RewriteError> {
        let subs = pattern.sub_patterns();
        if subs.is_empty() {
            return Ok(());
        }

        for (i, sub) in subs.values().enumerate() {
            if !is_repeat(subs, i, sub) {
                self.collapse_sub_patterns(sub, graph, out)?;
            }
        }

        // Holes filled by the same pattern share one search.
        let mut found: IndexMap<NodeId, Vec<Embedding>> = IndexMap::new();
        for (i, (&id, sub)) in subs.iter().enumerate() {
            if is_repeat(subs, i, sub) {
                tracing::trace!("sub-pattern at {} repeats an earlier one", id);
                continue;
            }
            let embeddings = self.matches(sub, graph)?;
            tracing::debug!(
                "sub-pattern '{}' at {}: {} embeddings",
                sub.name(),
                id,
                embeddings.len()
            );
            found.insert(id, embeddings);
        }

        let accepted: Vec<(NodeId, Embedding)> = match self.config.overlap {
            OverlapPolicy::Abort => {
                check_disjoint(&found)?;
                found
                    .into_iter()
                    .flat_map(|(id, list)| list.into_iter().map(move |e| (id, e)))
                    .collect()
            }
            OverlapPolicy::MaximumDisjoint => {
                select_disjoint(&found, self.config.exact_independent_set_limit).accepted
            }
        };

        for (id, embedding) in accepted {
            let Some(sub) = subs.get(&id) else {
                continue;
            };
            out.push(self.collapse(sub, graph, &embedding)?);
        }
        Ok(())
    }

    /// Replace the first embedding of `pattern`'s own skeleton that the
    /// validator accepts.
    fn rewrite_first(
        &self,
        pattern: &Pattern,
        graph: &mut Graph,
    ) -> Result<Option<Replacement>, RewriteError> {
        let chosen = {
            let matcher = pattern.matcher(graph, &self.hierarchy, &self.config);
            let mut chosen = None;
            for embedding in matcher.embeddings() {
                if self.validates(pattern, graph, &embedding)? {
                    chosen = Some(embedding);
                    break;
                }
            }
            chosen
        };
        chosen
            .map(|embedding| self.collapse(pattern, graph, &embedding))
            .transpose()
    }

    fn validates(
        &self,
        pattern: &Pattern,
        graph: &Graph,
        embedding: &Embedding,
    ) -> Result<bool, RewriteError> {
        let region = graph.restricted_to(embedding.host_nodes());
        let ok = pattern.accepts(&region)?;
        if !ok {
            tracing::trace!("pattern '{}': validator rejected {}", pattern.name(), embedding);
        }
        Ok(ok)
    }

    fn collapse(
        &self,
        pattern: &Pattern,
        graph: &mut Graph,
        embedding: &Embedding,
    ) -> Result<Replacement, RewriteError> {
        let region = graph.restricted_to(embedding.host_nodes());
        let data = pattern.result_data(&region);
        let id = graph.fresh_node_id()?;
        tracing::debug!("pattern '{}': {} -> {} {}", pattern.name(), embedding, id, data);
        replace(id, graph, embedding, pattern.skeleton(), data)
    }
}

/// Whether the sub-pattern at position `i` is the same pattern as an
/// earlier annotation.
fn is_repeat(subs: &IndexMap<NodeId, Arc<Pattern>>, i: usize, sub: &Arc<Pattern>) -> bool {
    subs.values().take(i).any(|other| Arc::ptr_eq(other, sub))
}
