//! Refining operators: required-exclude (AND NOT) and required-optional.
//!
//! Both wrap one required cursor that fully determines the structural
//! result, plus a second cursor that is synchronized lazily: the
//! prohibited side only when a required node needs vetting, the optional
//! side only while scoring. Neither secondary cursor is ever forced to
//! document alignment on its own; once it is exhausted it is dropped and
//! the operator degrades to a plain pass-through.

use std::cmp::Ordering;

use crate::cursor::NodeCursor;
use crate::error::Result;
use crate::node::{DocId, DocMark, NodeMark, NodePath};

// Lazily drags `secondary` to the required cursor's position. Returns true
// when the secondary cursor reports exactly (doc, node); sets the slot to
// None once the secondary stream is exhausted at document granularity.
fn aligns_with<'a>(
    slot: &mut Option<Box<dyn NodeCursor + 'a>>,
    doc: DocId,
    node: &NodePath,
) -> Result<bool> {
    let Some(secondary) = slot.as_mut() else {
        return Ok(false);
    };
    if secondary.doc() < DocMark::At(doc) && !secondary.skip_to_candidate(doc)? {
        *slot = None;
        return Ok(false);
    }
    if secondary.doc() != DocMark::At(doc) {
        return Ok(false);
    }
    while secondary.node().cmp_path(node) == Ordering::Less {
        if !secondary.next_node()? {
            return Ok(false);
        }
    }
    Ok(secondary.node().cmp_path(node) == Ordering::Equal)
}

// ------------- RequiredExclude -------------
/// Yields every node of the required cursor that the prohibited cursor does
/// not also report. Prohibited-side document alignment happens lazily, only
/// when the required side actually produced a node.
pub struct RequiredExclude<'a> {
    required: Box<dyn NodeCursor + 'a>,
    excluded: Option<Box<dyn NodeCursor + 'a>>,
}

impl<'a> RequiredExclude<'a> {
    pub fn new(required: Box<dyn NodeCursor + 'a>, excluded: Box<dyn NodeCursor + 'a>) -> Self {
        Self {
            required,
            excluded: Some(excluded),
        }
    }
}

impl NodeCursor for RequiredExclude<'_> {
    fn next_candidate(&mut self) -> Result<bool> {
        self.required.next_candidate()
    }

    fn skip_to_candidate(&mut self, target: DocId) -> Result<bool> {
        self.required.skip_to_candidate(target)
    }

    fn next_node(&mut self) -> Result<bool> {
        loop {
            if !self.required.next_node()? {
                return Ok(false);
            }
            let Some(doc) = self.required.doc().id() else {
                return Ok(false);
            };
            let Some(node) = self.required.node().path().cloned() else {
                return Ok(false);
            };
            if !aligns_with(&mut self.excluded, doc, &node)? {
                return Ok(true);
            }
            // the node is prohibited, skip past it and retry
        }
    }

    fn doc(&self) -> DocMark {
        self.required.doc()
    }

    fn node(&self) -> &NodeMark {
        self.required.node()
    }

    fn term_freq_in_node(&self) -> Result<u32> {
        self.required.term_freq_in_node()
    }

    fn score_in_node(&mut self) -> Result<f32> {
        self.required.score_in_node()
    }

    fn nr_matchers(&self) -> usize {
        self.required.nr_matchers()
    }
}

// ------------- RequiredOptional -------------
/// Structural pass-through for the required cursor; the optional cursor
/// exists purely to raise the score (and the coordination count) of nodes
/// it happens to coincide with. It is only advanced during scoring, so a
/// caller that never scores never pays for it.
pub struct RequiredOptional<'a> {
    required: Box<dyn NodeCursor + 'a>,
    optional: Option<Box<dyn NodeCursor + 'a>>,
    matchers: usize,
}

impl<'a> RequiredOptional<'a> {
    pub fn new(required: Box<dyn NodeCursor + 'a>, optional: Box<dyn NodeCursor + 'a>) -> Self {
        Self {
            required,
            optional: Some(optional),
            matchers: 0,
        }
    }
}

impl NodeCursor for RequiredOptional<'_> {
    fn next_candidate(&mut self) -> Result<bool> {
        self.matchers = 0;
        self.required.next_candidate()
    }

    fn skip_to_candidate(&mut self, target: DocId) -> Result<bool> {
        self.matchers = 0;
        self.required.skip_to_candidate(target)
    }

    fn next_node(&mut self) -> Result<bool> {
        let advanced = self.required.next_node()?;
        self.matchers = if advanced {
            self.required.nr_matchers()
        } else {
            0
        };
        Ok(advanced)
    }

    fn doc(&self) -> DocMark {
        self.required.doc()
    }

    fn node(&self) -> &NodeMark {
        self.required.node()
    }

    fn term_freq_in_node(&self) -> Result<u32> {
        // no lazy sync here: only count the optional side when it already
        // sits on the current node
        let mut freq = self.required.term_freq_in_node()?;
        if let Some(opt) = self.optional.as_ref()
            && opt.doc() == self.required.doc()
            && opt.node() == self.required.node()
        {
            freq += opt.term_freq_in_node()?;
        }
        Ok(freq)
    }

    fn score_in_node(&mut self) -> Result<f32> {
        let mut score = self.required.score_in_node()?;
        self.matchers = self.required.nr_matchers();
        let Some(doc) = self.required.doc().id() else {
            return Ok(score);
        };
        let Some(node) = self.required.node().path().cloned() else {
            return Ok(score);
        };
        if aligns_with(&mut self.optional, doc, &node)? {
            let Some(opt) = self.optional.as_mut() else {
                return Ok(score);
            };
            score += opt.score_in_node()?;
            self.matchers += opt.nr_matchers();
        }
        Ok(score)
    }

    fn nr_matchers(&self) -> usize {
        self.matchers
    }
}
