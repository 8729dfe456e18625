//! Boolean composition: assembling required / prohibited / optional clause
//! cursors into a single scoring cursor.
//!
//! The assembly follows a fixed recipe. The required clauses collapse into
//! one cursor (a conjunction when there are several), optional clauses ride
//! along through a required-optional wrapper (or stand in for the required
//! side when there are none, so that at least one of them must match), and
//! prohibited clauses are applied last through a required-exclude wrapper.
//! The result is wrapped in a coordination cursor that multiplies every
//! node score by a factor proportional to how many clauses agreed on the
//! node. Queries whose clauses were generated mechanically (wildcard
//! expansions and the like) disable coordination, fixing the factor at 1.

use tracing::debug;

use crate::cursor::NodeCursor;
use crate::error::{Result, SylvaError};
use crate::merge::{Conjunction, Disjunction};
use crate::node::{DocId, DocMark, NodeMark};
use crate::refine::{RequiredExclude, RequiredOptional};

// ------------- Coordination -------------
/// Clause counts and the enable flag the coordination factor is derived
/// from. Counts come from the query, not from the cursors that could be
/// built for it: a clause without postings still widens the denominator.
#[derive(Clone, Copy, Debug)]
pub struct Coordination {
    pub enabled: bool,
    pub required_count: usize,
    pub optional_count: usize,
}

impl Coordination {
    fn max_coord(&self) -> usize {
        self.required_count + self.optional_count
    }

    // Table sized optional + required + 1 so every achievable matcher
    // count, zero included, indexes directly.
    fn table(&self) -> Vec<f32> {
        let max_coord = self.max_coord();
        (0..=max_coord)
            .map(|m| {
                if !self.enabled || max_coord == 0 {
                    1.0
                } else {
                    m as f32 / max_coord as f32
                }
            })
            .collect()
    }
}

// ------------- RequiredUnits -------------
// The required side of a composition counts as one coordination unit per
// required clause, no matter how many leaves inside those clauses agreed.
struct RequiredUnits<'a> {
    inner: Box<dyn NodeCursor + 'a>,
    units: usize,
}

impl NodeCursor for RequiredUnits<'_> {
    fn next_candidate(&mut self) -> Result<bool> {
        self.inner.next_candidate()
    }
    fn skip_to_candidate(&mut self, target: DocId) -> Result<bool> {
        self.inner.skip_to_candidate(target)
    }
    fn next_node(&mut self) -> Result<bool> {
        self.inner.next_node()
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
        self.units
    }
}

// ------------- CoordCursor -------------
/// Top of every boolean composition: multiplies node scores by the
/// precomputed coordination factor for the current matcher count.
pub struct CoordCursor<'a> {
    inner: Box<dyn NodeCursor + 'a>,
    table: Vec<f32>,
}

impl<'a> CoordCursor<'a> {
    fn new(inner: Box<dyn NodeCursor + 'a>, coordination: Coordination) -> Self {
        Self {
            inner,
            table: coordination.table(),
        }
    }
}

impl NodeCursor for CoordCursor<'_> {
    fn next_candidate(&mut self) -> Result<bool> {
        self.inner.next_candidate()
    }
    fn skip_to_candidate(&mut self, target: DocId) -> Result<bool> {
        self.inner.skip_to_candidate(target)
    }
    fn next_node(&mut self) -> Result<bool> {
        self.inner.next_node()
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
        let raw = self.inner.score_in_node()?;
        let matchers = self.inner.nr_matchers();
        let Some(factor) = self.table.get(matchers) else {
            return Err(SylvaError::Invariant(format!(
                "matcher count {} exceeds the coordination table of {}",
                matchers,
                self.table.len()
            )));
        };
        let score = raw * factor;
        if score.is_nan() || score < 0.0 {
            return Err(SylvaError::Invariant(format!(
                "coordination produced an unexpected score {} (raw {}, factor {})",
                score, raw, factor
            )));
        }
        Ok(score)
    }
    fn nr_matchers(&self) -> usize {
        self.inner.nr_matchers()
    }
}

fn one_or_disjunction<'a>(
    mut cursors: Vec<Box<dyn NodeCursor + 'a>>,
) -> Result<Box<dyn NodeCursor + 'a>> {
    if cursors.len() == 1 {
        match cursors.pop() {
            Some(c) => Ok(c),
            None => Err(SylvaError::Invariant("cursor vector emptied underfoot".into())),
        }
    } else {
        Ok(Box::new(Disjunction::new(cursors)?))
    }
}

/// Assembles clause cursors into one composition cursor.
///
/// Returns `None` when the composition cannot match anything: no required
/// and no optional clause. Callers are expected to have dropped the whole
/// composition already when a required clause had no cursor at all.
pub fn assemble<'a>(
    required: Vec<Box<dyn NodeCursor + 'a>>,
    prohibited: Vec<Box<dyn NodeCursor + 'a>>,
    optional: Vec<Box<dyn NodeCursor + 'a>>,
    coordination: Coordination,
) -> Result<Option<Box<dyn NodeCursor + 'a>>> {
    if required.is_empty() && optional.is_empty() {
        return Ok(None);
    }
    debug!(
        required = required.len(),
        prohibited = prohibited.len(),
        optional = optional.len(),
        "assembling boolean composition"
    );
    let required_units = required.len();
    let main: Box<dyn NodeCursor + 'a> = if !required.is_empty() {
        let sum: Box<dyn NodeCursor + 'a> = if required.len() == 1 {
            one_or_disjunction(required)?
        } else {
            Box::new(Conjunction::new(required)?)
        };
        let sum: Box<dyn NodeCursor + 'a> = Box::new(RequiredUnits {
            inner: sum,
            units: required_units,
        });
        if optional.is_empty() {
            sum
        } else {
            Box::new(RequiredOptional::new(sum, one_or_disjunction(optional)?))
        }
    } else {
        // no required clauses: at least one optional clause must match, so
        // the optional side becomes the required input
        one_or_disjunction(optional)?
    };
    let main: Box<dyn NodeCursor + 'a> = if prohibited.is_empty() {
        main
    } else {
        Box::new(RequiredExclude::new(main, one_or_disjunction(prohibited)?))
    };
    Ok(Some(Box::new(CoordCursor::new(main, coordination))))
}
