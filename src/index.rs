//! In-memory node index: the reference implementation of the read-only
//! index view the engine evaluates against.
//!
//! The engine itself never stores anything; it consumes primitive per-term
//! (document, node path) streams through the [`crate::cursor::NodeCursor`]
//! contract and leaves storage formats to whatever supplies them. This
//! module provides the simplest faithful supplier: every term keeps its
//! document ids in a roaring treemap (ordered iteration and rank/select
//! skipping for free) and, per document, a sorted list of node postings
//! with term frequencies. It is what the tests, the benchmark and the demo
//! binary index into.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use roaring::RoaringTreemap;
use seahash::SeaHasher;

use crate::cursor::{NodeCursor, require_positioned, require_started};
use crate::error::{Result, SylvaError};
use crate::node::{DocId, DocMark, NodeMark, NodePath};

pub type TermHasher = BuildHasherDefault<SeaHasher>;
pub type DocHasher = BuildHasherDefault<SeaHasher>;

// ------------- IndexView -------------
/// Read-only per-segment view the engine builds cursor trees against.
///
/// `term_cursor` returns `None` when the term has no postings at all,
/// which lets query planning drop impossible compositions early.
pub trait IndexView {
    fn doc_count(&self) -> u64;
    fn term_cursor<'a>(&'a self, term: &str, boost: f32) -> Option<Box<dyn NodeCursor + 'a>>;
}

// ------------- MemoryIndex -------------
#[derive(Debug, Default)]
struct NodeEntry {
    path: NodePath,
    freq: u32,
}

#[derive(Debug, Default)]
struct TermPostings {
    docs: RoaringTreemap,
    nodes: HashMap<DocId, Vec<NodeEntry>, DocHasher>,
}

/// Simple in-memory index over tree-shaped documents.
///
/// Text handed to [`index_node`](MemoryIndex::index_node) is tokenized on
/// whitespace and lowercased; query terms are normalized the same way, so
/// lookups are case-insensitive.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    docs: RoaringTreemap,
    terms: HashMap<String, TermPostings, TermHasher>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes the text content of one node of a document.
    pub fn index_node(&mut self, doc: DocId, path: impl Into<NodePath>, text: &str) {
        self.docs.insert(doc);
        let path = path.into();
        for token in text.split_whitespace() {
            let term = token.to_lowercase();
            let postings = self.terms.entry(term).or_default();
            postings.docs.insert(doc);
            let nodes = postings.nodes.entry(doc).or_default();
            match nodes.binary_search_by(|e| e.path.cmp(&path)) {
                Ok(i) => nodes[i].freq += 1,
                Err(i) => nodes.insert(
                    i,
                    NodeEntry {
                        path: path.clone(),
                        freq: 1,
                    },
                ),
            }
        }
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}

impl IndexView for MemoryIndex {
    fn doc_count(&self) -> u64 {
        self.docs.len()
    }

    fn term_cursor<'a>(&'a self, term: &str, boost: f32) -> Option<Box<dyn NodeCursor + 'a>> {
        let postings = self.terms.get(&term.to_lowercase())?;
        Some(Box::new(TermCursor::new(postings, boost)))
    }
}

// ------------- TermCursor -------------
/// Primitive cursor over one term's postings. Document skipping uses the
/// treemap's rank/select pair, so `skip_to_candidate` costs a lookup
/// instead of a scan.
pub struct TermCursor<'a> {
    postings: &'a TermPostings,
    weight: f32,
    ord: Option<u64>,
    doc: DocMark,
    nodes: &'a [NodeEntry],
    node_ord: Option<usize>,
    node: NodeMark,
}

impl<'a> TermCursor<'a> {
    fn new(postings: &'a TermPostings, weight: f32) -> Self {
        Self {
            postings,
            weight,
            ord: None,
            doc: DocMark::Unstarted,
            nodes: &[],
            node_ord: None,
            node: NodeMark::Pending,
        }
    }

    fn exhaust(&mut self) -> Result<bool> {
        self.doc = DocMark::Done;
        self.nodes = &[];
        self.node_ord = None;
        self.node = NodeMark::Done;
        Ok(false)
    }

    fn position_at(&mut self, ord: u64) -> Result<bool> {
        let Some(doc) = self.postings.docs.select(ord) else {
            return self.exhaust();
        };
        let Some(nodes) = self.postings.nodes.get(&doc) else {
            return Err(SylvaError::Invariant(format!(
                "document {} is in the posting set but has no node list",
                doc
            )));
        };
        self.ord = Some(ord);
        self.doc = DocMark::At(doc);
        self.nodes = nodes;
        self.node_ord = None;
        self.node = NodeMark::Pending;
        Ok(true)
    }

    fn entry(&self) -> Result<&NodeEntry> {
        require_positioned(&self.node)?;
        match self.node_ord.and_then(|i| self.nodes.get(i)) {
            Some(e) => Ok(e),
            None => Err(SylvaError::Invariant(
                "positioned term cursor without a posting entry".into(),
            )),
        }
    }
}

impl NodeCursor for TermCursor<'_> {
    fn next_candidate(&mut self) -> Result<bool> {
        if self.doc == DocMark::Done {
            return Ok(false);
        }
        let ord = match self.ord {
            Some(o) => o + 1,
            None => 0,
        };
        self.position_at(ord)
    }

    fn skip_to_candidate(&mut self, target: DocId) -> Result<bool> {
        match self.doc {
            DocMark::At(d) if d >= target => return Ok(true),
            DocMark::Done => return Ok(false),
            _ => (),
        }
        let ord = if target == 0 {
            0
        } else {
            // number of postings strictly below the target
            self.postings.docs.rank(target - 1)
        };
        self.position_at(ord)
    }

    fn next_node(&mut self) -> Result<bool> {
        require_started(self.doc)?;
        if self.doc == DocMark::Done || self.node == NodeMark::Done {
            return Ok(false);
        }
        let ord = match self.node_ord {
            Some(o) => o + 1,
            None => 0,
        };
        match self.nodes.get(ord) {
            Some(entry) => {
                self.node_ord = Some(ord);
                self.node = NodeMark::At(entry.path.clone());
                Ok(true)
            }
            None => {
                self.node_ord = None;
                self.node = NodeMark::Done;
                Ok(false)
            }
        }
    }

    fn doc(&self) -> DocMark {
        self.doc
    }

    fn node(&self) -> &NodeMark {
        &self.node
    }

    fn term_freq_in_node(&self) -> Result<u32> {
        Ok(self.entry()?.freq)
    }

    fn score_in_node(&mut self) -> Result<f32> {
        let freq = self.entry()?.freq;
        Ok(freq as f32 * self.weight)
    }
}
