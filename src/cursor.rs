//! The dual-cursor contract every structural operator speaks.
//!
//! A [`NodeCursor`] walks two nested streams in lock-step: an outer stream
//! of *candidate documents* and, inside each candidate, an inner stream of
//! *node positions* matching the cursor's criterion. Separating the two is
//! the central optimization of the engine: document alignment is cheap, so
//! a composite cursor only pays for node-path comparison once all of its
//! operands already agree on a document. A candidate is therefore not yet a
//! match: a conjunction may align on a document whose node streams never
//! meet, and that document simply yields no node.
//!
//! Cursors are single-use and forward-only. They are created per evaluation,
//! never rewound, and never shared between threads.

use crate::error::{Result, SylvaError};
use crate::node::{DocId, DocMark, NodeMark};

/// A sorted stream of (document, node path) positions.
///
/// The document stream is ascending in document id; within one document,
/// successive [`next_node`](NodeCursor::next_node) calls yield strictly
/// increasing node paths (lexicographic order). Implementations must uphold
/// both orderings; every merge operator in this crate depends on them.
pub trait NodeCursor {
    /// Advances to the next document id for which a match is conceivable.
    /// Returns false once the stream is exhausted, after which `doc()`
    /// reports [`DocMark::Done`] and `node()` reports [`NodeMark::Done`].
    ///
    /// Must be called (or [`skip_to_candidate`](NodeCursor::skip_to_candidate))
    /// before any node-level operation.
    fn next_candidate(&mut self) -> Result<bool>;

    /// Advances the candidate cursor to the first document id >= `target`.
    /// Does not move when the cursor already sits at or past `target`.
    /// Returns false at exhaustion.
    fn skip_to_candidate(&mut self, target: DocId) -> Result<bool>;

    /// Advances to the next node in the current candidate document that
    /// satisfies this cursor's criterion. Returns false when the document
    /// has no further such node; this exhausts the node stream of the
    /// document, not the cursor itself.
    fn next_node(&mut self) -> Result<bool>;

    /// Current candidate document.
    fn doc(&self) -> DocMark;

    /// Current node position within the candidate document.
    fn node(&self) -> &NodeMark;

    /// Number of matching leaves at the current node.
    ///
    /// Errors unless the cursor is positioned on a real node.
    fn term_freq_in_node(&self) -> Result<u32>;

    /// Combined relevance contribution of the current node.
    ///
    /// Takes `&mut self` because lazily synchronized operands (the optional
    /// side of a required-optional composition) are only advanced here.
    /// Errors unless the cursor is positioned on a real node.
    fn score_in_node(&mut self) -> Result<f32>;

    /// How many coordination units agreed on the current node, as
    /// established by the latest successful `next_node` (or `score_in_node`
    /// for operators that sync lazily while scoring). Leaf cursors count as
    /// a single unit.
    fn nr_matchers(&self) -> usize {
        1
    }
}

// Shared guard for node-level calls: the structural protocol requires a
// candidate position first, and fails fast rather than serving stale state.
pub(crate) fn require_started(doc: DocMark) -> Result<()> {
    if doc == DocMark::Unstarted {
        Err(SylvaError::InvalidCall(
            "node operation before the candidate cursor was started",
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn require_positioned(node: &NodeMark) -> Result<()> {
    if node.is_at() {
        Ok(())
    } else {
        Err(SylvaError::InvalidCall(
            "scoring requires a cursor positioned on a node",
        ))
    }
}
