//! Structural merge operators: conjunction (AND) and disjunction (OR).
//!
//! Both operators merge N sub-cursors at two granularities. Documents are
//! aligned first, cheaply, by id. Only once a candidate document is
//! established do the operators start comparing node paths inside it. A
//! conjunction candidate can therefore still turn out to be a non-match
//! when its node streams never meet; that is intended, the caller simply
//! gets an empty node stream for the document.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::cursor::{NodeCursor, require_positioned, require_started};
use crate::error::{Result, SylvaError};
use crate::node::{DocId, DocMark, NodeMark, NodePath};

// ------------- Conjunction -------------
/// Matches a node iff every sub-cursor reports that exact node.
///
/// Candidate advancement takes the maximum document id over all sub-cursors
/// and skips every other sub-cursor to it, repeating until all agree. Node
/// advancement is a merge-join on the per-document node streams: the
/// cursors reporting the smallest path are advanced until all paths are
/// equal or any stream runs dry.
pub struct Conjunction<'a> {
    cursors: Vec<Box<dyn NodeCursor + 'a>>,
    doc: DocMark,
    node: NodeMark,
}

impl<'a> Conjunction<'a> {
    pub fn new(cursors: Vec<Box<dyn NodeCursor + 'a>>) -> Result<Self> {
        if cursors.len() < 2 {
            return Err(SylvaError::Invariant(format!(
                "conjunction requires at least two cursors, got {}",
                cursors.len()
            )));
        }
        Ok(Self {
            cursors,
            doc: DocMark::Unstarted,
            node: NodeMark::Pending,
        })
    }

    fn exhaust(&mut self) -> Result<bool> {
        self.doc = DocMark::Done;
        self.node = NodeMark::Done;
        Ok(false)
    }

    // Drags every cursor up to the current maximum document id until all
    // report the same id. Every cursor is positioned on a real document on
    // entry; overshooting while skipping just raises the bar for the rest.
    fn align_docs(&mut self) -> Result<bool> {
        loop {
            let mut target: DocId = 0;
            let mut all_equal = true;
            for (i, c) in self.cursors.iter().enumerate() {
                let Some(d) = c.doc().id() else {
                    return Err(SylvaError::Invariant(
                        "conjunction alignment over an unpositioned cursor".into(),
                    ));
                };
                if i == 0 {
                    target = d;
                } else if d != target {
                    all_equal = false;
                    if d > target {
                        target = d;
                    }
                }
            }
            if all_equal {
                self.doc = DocMark::At(target);
                self.node = NodeMark::Pending;
                return Ok(true);
            }
            for c in &mut self.cursors {
                if c.doc() < DocMark::At(target) && !c.skip_to_candidate(target)? {
                    return self.exhaust();
                }
            }
        }
    }

    // Merge-join inside the candidate document. Every sub-cursor already
    // sits on a real node on entry.
    fn align_nodes(&mut self) -> Result<bool> {
        loop {
            let mut max: Option<NodePath> = None;
            let mut all_equal = true;
            for c in &self.cursors {
                match c.node() {
                    NodeMark::At(p) => match &max {
                        None => max = Some(p.clone()),
                        Some(m) => match p.cmp(m) {
                            Ordering::Greater => {
                                all_equal = false;
                                max = Some(p.clone());
                            }
                            Ordering::Less => all_equal = false,
                            Ordering::Equal => (),
                        },
                    },
                    _ => {
                        self.node = NodeMark::Done;
                        return Ok(false);
                    }
                }
            }
            let Some(target) = max else {
                return Err(SylvaError::Invariant(
                    "conjunction node alignment without cursors".into(),
                ));
            };
            if all_equal {
                self.node = NodeMark::At(target);
                return Ok(true);
            }
            for c in &mut self.cursors {
                while c.node().cmp_path(&target) == Ordering::Less {
                    if !c.next_node()? {
                        self.node = NodeMark::Done;
                        return Ok(false);
                    }
                }
            }
        }
    }
}

impl NodeCursor for Conjunction<'_> {
    fn next_candidate(&mut self) -> Result<bool> {
        if self.doc == DocMark::Done {
            return Ok(false);
        }
        if self.doc == DocMark::Unstarted {
            for c in &mut self.cursors {
                if !c.next_candidate()? {
                    return self.exhaust();
                }
            }
        } else if !self.cursors[0].next_candidate()? {
            // one cursor past the current document is enough, alignment
            // drags the others along
            return self.exhaust();
        }
        self.align_docs()
    }

    fn skip_to_candidate(&mut self, target: DocId) -> Result<bool> {
        match self.doc {
            DocMark::At(d) if d >= target => return Ok(true),
            DocMark::Done => return Ok(false),
            _ => (),
        }
        for c in &mut self.cursors {
            if !c.skip_to_candidate(target)? {
                return self.exhaust();
            }
        }
        self.align_docs()
    }

    fn next_node(&mut self) -> Result<bool> {
        require_started(self.doc)?;
        if self.doc == DocMark::Done || self.node == NodeMark::Done {
            return Ok(false);
        }
        if self.node == NodeMark::Pending {
            for c in &mut self.cursors {
                if !c.next_node()? {
                    self.node = NodeMark::Done;
                    return Ok(false);
                }
            }
        } else if !self.cursors[0].next_node()? {
            self.node = NodeMark::Done;
            return Ok(false);
        }
        self.align_nodes()
    }

    fn doc(&self) -> DocMark {
        self.doc
    }

    fn node(&self) -> &NodeMark {
        &self.node
    }

    fn term_freq_in_node(&self) -> Result<u32> {
        require_positioned(&self.node)?;
        let mut freq = 0;
        for c in &self.cursors {
            freq += c.term_freq_in_node()?;
        }
        Ok(freq)
    }

    fn score_in_node(&mut self) -> Result<f32> {
        require_positioned(&self.node)?;
        let mut score = 0.0;
        for c in &mut self.cursors {
            score += c.score_in_node()?;
        }
        Ok(score)
    }

    fn nr_matchers(&self) -> usize {
        self.cursors.len()
    }
}

// ------------- Disjunction -------------
// Heap entries order by (document, node) ascending; the comparison is
// reversed so std's max-heap behaves as the min-heap the pop-adjust
// algorithm wants. Entries are always popped before being advanced, since
// mutating a cursor in place would invalidate the heap ordering.
struct HeapEntry<'a>(Box<dyn NodeCursor + 'a>);

impl Ord for HeapEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.0.doc(), other.0.node()).cmp(&(self.0.doc(), self.0.node()))
    }
}
impl PartialOrd for HeapEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for HeapEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for HeapEntry<'_> {}

/// Matches a node iff at least one sub-cursor reports that node, and
/// remembers how many of them did (`nr_matchers`) for coordination scoring.
///
/// All sub-cursors live in a priority structure keyed by (document, node).
/// Advancing pops every entry at the current position, advances it, and
/// reinserts it unless exhausted; the new top is the next result.
pub struct Disjunction<'a> {
    heap: BinaryHeap<HeapEntry<'a>>,
    doc: DocMark,
    node: NodeMark,
    matchers: usize,
}

impl<'a> Disjunction<'a> {
    /// A disjunction of fewer than two cursors is a construction bug: the
    /// composition layer collapses one-element disjunctions to the element
    /// itself before ever building one.
    pub fn new(cursors: Vec<Box<dyn NodeCursor + 'a>>) -> Result<Self> {
        if cursors.len() < 2 {
            return Err(SylvaError::Invariant(format!(
                "disjunction requires at least two cursors, got {}",
                cursors.len()
            )));
        }
        Ok(Self {
            heap: cursors.into_iter().map(HeapEntry).collect(),
            doc: DocMark::Unstarted,
            node: NodeMark::Pending,
            matchers: 0,
        })
    }

    fn exhaust(&mut self) -> Result<bool> {
        self.doc = DocMark::Done;
        self.node = NodeMark::Done;
        self.matchers = 0;
        Ok(false)
    }

    fn settle_on_top_doc(&mut self) -> Result<bool> {
        match self.heap.peek() {
            Some(top) => {
                self.doc = top.0.doc();
                self.node = NodeMark::Pending;
                self.matchers = 0;
                Ok(true)
            }
            None => self.exhaust(),
        }
    }
}

impl NodeCursor for Disjunction<'_> {
    fn next_candidate(&mut self) -> Result<bool> {
        if self.doc == DocMark::Done {
            return Ok(false);
        }
        // pop-adjust every entry still at the current document (or, on the
        // first call, still unstarted)
        loop {
            let at_current = match self.heap.peek() {
                Some(top) => top.0.doc() == self.doc,
                None => false,
            };
            if !at_current {
                break;
            }
            let Some(mut e) = self.heap.pop() else { break };
            if e.0.next_candidate()? {
                self.heap.push(e);
            }
        }
        self.settle_on_top_doc()
    }

    fn skip_to_candidate(&mut self, target: DocId) -> Result<bool> {
        match self.doc {
            DocMark::At(d) if d >= target => return Ok(true),
            DocMark::Done => return Ok(false),
            _ => (),
        }
        loop {
            let below = match self.heap.peek() {
                Some(top) => top.0.doc() < DocMark::At(target),
                None => false,
            };
            if !below {
                break;
            }
            let Some(mut e) = self.heap.pop() else { break };
            if e.0.skip_to_candidate(target)? {
                self.heap.push(e);
            }
        }
        self.settle_on_top_doc()
    }

    fn next_node(&mut self) -> Result<bool> {
        require_started(self.doc)?;
        if !self.doc.is_at() || self.node == NodeMark::Done {
            return Ok(false);
        }
        // advance every in-document entry at or below the current node;
        // entries whose node stream runs dry stay in the heap with an
        // exhausted node mark and sort behind every real path
        loop {
            let behind = match self.heap.peek() {
                Some(top) => top.0.doc() == self.doc && top.0.node() <= &self.node,
                None => false,
            };
            if !behind {
                break;
            }
            let Some(mut e) = self.heap.pop() else { break };
            e.0.next_node()?;
            self.heap.push(e);
        }
        let path = match self.heap.peek() {
            Some(top) if top.0.doc() == self.doc => top.0.node().path().cloned(),
            _ => None,
        };
        let Some(path) = path else {
            self.node = NodeMark::Done;
            self.matchers = 0;
            return Ok(false);
        };
        // count the sub-cursors agreeing on this node; each direct operand
        // counts once
        let mut agreeing = Vec::new();
        loop {
            let matches = match self.heap.peek() {
                Some(top) => {
                    top.0.doc() == self.doc && top.0.node().cmp_path(&path) == Ordering::Equal
                }
                None => false,
            };
            if !matches {
                break;
            }
            let Some(e) = self.heap.pop() else { break };
            agreeing.push(e);
        }
        self.matchers = agreeing.len();
        for e in agreeing {
            self.heap.push(e);
        }
        self.node = NodeMark::At(path);
        Ok(true)
    }

    fn doc(&self) -> DocMark {
        self.doc
    }

    fn node(&self) -> &NodeMark {
        &self.node
    }

    fn term_freq_in_node(&self) -> Result<u32> {
        require_positioned(&self.node)?;
        let mut freq = 0;
        for e in self.heap.iter() {
            if e.0.doc() == self.doc && e.0.node() == &self.node {
                freq += e.0.term_freq_in_node()?;
            }
        }
        Ok(freq)
    }

    fn score_in_node(&mut self) -> Result<f32> {
        require_positioned(&self.node)?;
        // BinaryHeap has no mutable iteration; rebuild it around the pass
        let entries = std::mem::take(&mut self.heap).into_vec();
        let mut score = 0.0;
        let mut restored = Vec::with_capacity(entries.len());
        let mut failed = None;
        for mut e in entries {
            if failed.is_none() && e.0.doc() == self.doc && e.0.node() == &self.node {
                match e.0.score_in_node() {
                    Ok(s) => score += s,
                    Err(err) => failed = Some(err),
                }
            }
            restored.push(e);
        }
        self.heap = BinaryHeap::from(restored);
        match failed {
            Some(err) => Err(err),
            None => Ok(score),
        }
    }

    fn nr_matchers(&self) -> usize {
        self.matchers
    }
}
