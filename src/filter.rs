//! Filtering wrappers over a single cursor.
//!
//! [`AncestorFilter`] projects every node a cursor reports onto its
//! ancestor at a fixed depth. This is what lets a descendant-level match be
//! merged against a root-level match inside a twig or tuple composition:
//! once every operand is projected to the common ancestor level they all
//! share one coordinate system and the ordinary boolean merge-join applies.
//!
//! [`ConstraintFilter`] enforces a query's level and node-range constraints
//! on a primitive stream, so index implementations never need to know about
//! constraints at all.

use crate::cursor::NodeCursor;
use crate::error::Result;
use crate::node::{DocId, DocMark, NodeMark, NodePath};

// ------------- AncestorFilter -------------
pub struct AncestorFilter<'a> {
    inner: Box<dyn NodeCursor + 'a>,
    ancestor_level: usize,
    node: NodeMark,
}

impl<'a> AncestorFilter<'a> {
    pub fn new(inner: Box<dyn NodeCursor + 'a>, ancestor_level: usize) -> Self {
        Self {
            inner,
            ancestor_level,
            node: NodeMark::Pending,
        }
    }

    pub fn ancestor_level(&self) -> usize {
        self.ancestor_level
    }

    // Sentinels pass through untouched, real paths deeper than the
    // ancestor level are truncated to it.
    fn project(&self, mark: &NodeMark) -> NodeMark {
        match mark {
            NodeMark::At(p) => NodeMark::At(p.ancestor(self.ancestor_level)),
            other => other.clone(),
        }
    }
}

impl NodeCursor for AncestorFilter<'_> {
    fn next_candidate(&mut self) -> Result<bool> {
        let advanced = self.inner.next_candidate()?;
        self.node = self.project(self.inner.node());
        Ok(advanced)
    }

    fn skip_to_candidate(&mut self, target: DocId) -> Result<bool> {
        let advanced = self.inner.skip_to_candidate(target)?;
        self.node = self.project(self.inner.node());
        Ok(advanced)
    }

    fn next_node(&mut self) -> Result<bool> {
        // a run of descendants under one ancestor projects to a run of
        // equal paths; collapse it so downstream merge-joins still see
        // strictly increasing node paths
        loop {
            if !self.inner.next_node()? {
                self.node = NodeMark::Done;
                return Ok(false);
            }
            let projected = self.project(self.inner.node());
            if projected != self.node {
                self.node = projected;
                return Ok(true);
            }
        }
    }

    fn doc(&self) -> DocMark {
        self.inner.doc()
    }

    fn node(&self) -> &NodeMark {
        &self.node
    }

    fn term_freq_in_node(&self) -> Result<u32> {
        self.inner.term_freq_in_node()
    }

    fn score_in_node(&mut self) -> Result<f32> {
        self.inner.score_in_node()
    }

    fn nr_matchers(&self) -> usize {
        self.inner.nr_matchers()
    }
}

// ------------- ConstraintFilter -------------
/// Drops nodes that fall outside a level constraint or an inclusive
/// lexicographic `[lower, upper]` node-range. Candidate documents pass
/// through unchanged; a document whose nodes all get filtered away is a
/// candidate that yields no node, which the merge operators already handle.
pub struct ConstraintFilter<'a> {
    inner: Box<dyn NodeCursor + 'a>,
    level: Option<usize>,
    lower: Option<NodePath>,
    upper: Option<NodePath>,
}

impl<'a> ConstraintFilter<'a> {
    pub fn new(
        inner: Box<dyn NodeCursor + 'a>,
        level: Option<usize>,
        lower: Option<NodePath>,
        upper: Option<NodePath>,
    ) -> Self {
        Self {
            inner,
            level,
            lower,
            upper,
        }
    }

    fn admits(&self, path: &NodePath) -> bool {
        if let Some(level) = self.level
            && path.len() != level
        {
            return false;
        }
        if let Some(lower) = &self.lower
            && path < lower
        {
            return false;
        }
        if let Some(upper) = &self.upper
            && path > upper
        {
            return false;
        }
        true
    }
}

impl NodeCursor for ConstraintFilter<'_> {
    fn next_candidate(&mut self) -> Result<bool> {
        self.inner.next_candidate()
    }

    fn skip_to_candidate(&mut self, target: DocId) -> Result<bool> {
        self.inner.skip_to_candidate(target)
    }

    fn next_node(&mut self) -> Result<bool> {
        loop {
            if !self.inner.next_node()? {
                return Ok(false);
            }
            if let NodeMark::At(p) = self.inner.node()
                && self.admits(p)
            {
                return Ok(true);
            }
        }
    }

    fn doc(&self) -> DocMark {
        self.inner.doc()
    }

    fn node(&self) -> &NodeMark {
        self.inner.node()
    }

    fn term_freq_in_node(&self) -> Result<u32> {
        self.inner.term_freq_in_node()
    }

    fn score_in_node(&mut self) -> Result<f32> {
        self.inner.score_in_node()
    }

    fn nr_matchers(&self) -> usize {
        self.inner.nr_matchers()
    }
}
