//! Depth-first enumeration of embeddings.
//!
//! The search is an explicit stack of frames, one per mapped skeleton node,
//! so it can stop after any embedding and resume on the next call to
//! [`Iterator::next`].

use std::cmp::Reverse;
use std::collections::HashSet;

use graft_common::DedupeMode;

use crate::embedding::Embedding;
use crate::index::{GraphIndex, NodeIdx};
use crate::matcher::SubgraphMatcher;
use crate::state::State;

/// Fixed mapping order for the skeleton.
///
/// The first node is the one with the fewest host candidates. Every later
/// pick prefers the node with the most already-ordered neighbours, so that
/// connectivity prunes candidates as early as possible; ties go to the rarer
/// node, then to the higher degree, then to the lower index.
pub(crate) fn search_order(skeleton: &GraphIndex<'_>, base: &[Vec<NodeIdx>]) -> Vec<NodeIdx> {
    let n = skeleton.node_count();
    let mut order = Vec::with_capacity(n);
    let mut placed = vec![false; n];
    let mut links_to_placed = vec![0usize; n];

    while order.len() < n {
        let Some(next) = (0..n).filter(|&p| !placed[p]).min_by_key(|&p| {
            (
                Reverse(links_to_placed[p]),
                base[p].len(),
                Reverse(skeleton.in_degree(p) + skeleton.out_degree(p)),
                p,
            )
        }) else {
            break;
        };

        placed[next] = true;
        order.push(next);
        for q in skeleton.neighbours(next) {
            links_to_placed[q] += 1;
        }
    }

    order
}

/// Candidates for one skeleton node and how far they have been tried.
struct Frame {
    candidates: Vec<NodeIdx>,
    cursor: usize,
}

/// Lazy, finite sequence of embeddings produced by
/// [`SubgraphMatcher::embeddings`].
///
/// Each iterator owns its own search state; dropping it early abandons the
/// remaining search.
pub struct Embeddings<'m> {
    matcher: &'m SubgraphMatcher<'m, 'm, 'm>,
    state: State,
    frames: Vec<Frame>,
    /// Signatures already reported, when deduplicating.
    seen: HashSet<Vec<usize>>,
    emitted: usize,
    exhausted: bool,
}

impl<'m> Embeddings<'m> {
    pub(crate) fn new(matcher: &'m SubgraphMatcher<'m, 'm, 'm>) -> Self {
        let exhausted = matcher.skeleton_len() == 0
            || matcher.has_unmatchable_node()
            || matcher.config().max_embeddings == Some(0);
        if exhausted {
            tracing::trace!("search skipped: empty skeleton, a node without candidates or a zero limit");
        }
        Self {
            state: State::new(matcher.skeleton_len(), matcher.host_len()),
            matcher,
            frames: Vec::new(),
            seen: HashSet::new(),
            emitted: 0,
            exhausted,
        }
    }

    /// Number of embeddings reported so far.
    #[must_use]
    pub const fn emitted(&self) -> usize {
        self.emitted
    }

    /// Advance the raw search to the next complete assignment.
    ///
    /// Returns the host node of every skeleton node, by skeleton index.
    fn advance(&mut self) -> Option<Vec<NodeIdx>> {
        if self.exhausted {
            return None;
        }
        let matcher = self.matcher;
        let order = matcher.order();

        loop {
            if self.state.done() {
                let found = (0..order.len())
                    .map(|p| self.state.mapped_to(p))
                    .collect::<Option<Vec<_>>>();
                self.state.unmap_last();
                if found.is_some() {
                    return found;
                }
                continue;
            }

            let depth = self.state.depth();
            let p = order[depth];
            if self.frames.len() == depth {
                let candidates = matcher.candidates_for(&self.state, p);
                self.frames.push(Frame {
                    candidates,
                    cursor: 0,
                });
            }

            let Some(frame) = self.frames.last_mut() else {
                self.exhausted = true;
                return None;
            };

            if let Some(&h) = frame.candidates.get(frame.cursor) {
                frame.cursor += 1;
                self.state.map(p, h);
            } else {
                self.frames.pop();
                if self.state.unmap_last().is_none() {
                    tracing::trace!("search space exhausted");
                    self.exhausted = true;
                    return None;
                }
                tracing::trace!("backtracking from depth {}", depth);
            }
        }
    }

    fn signature(&self, found: &[NodeIdx]) -> Vec<usize> {
        match self.matcher.config().dedupe {
            DedupeMode::NodeSet => {
                let mut sig = found.to_vec();
                sig.sort_unstable();
                sig
            }
            DedupeMode::Full | DedupeMode::None => found.to_vec(),
        }
    }
}

impl Iterator for Embeddings<'_> {
    type Item = Embedding;

    fn next(&mut self) -> Option<Embedding> {
        loop {
            let found = self.advance()?;

            if self.matcher.config().dedupe.enabled() {
                let sig = self.signature(&found);
                if !self.seen.insert(sig) {
                    continue;
                }
            }

            self.emitted += 1;
            if self
                .matcher
                .config()
                .max_embeddings
                .is_some_and(|limit| self.emitted >= limit)
            {
                tracing::debug!("embedding limit of {} reached", self.emitted);
                self.exhausted = true;
            }

            return Some(self.matcher.build_embedding(&found));
        }
    }
}
