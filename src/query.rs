//! Query model: immutable query values, constraints, rewriting and cursor
//! creation.
//!
//! Queries are plain values. Builder-style methods consume a query and
//! return a new, fully constrained one; adding a clause immediately pushes
//! the parent's constraints onto the clause's query (recursively), and
//! changing a constraint afterwards re-derives every existing clause. There
//! is no shared mutable query tree and no setter-based propagation.
//!
//! The ancestor back-reference that keeps constraints consistent across a
//! twig is an opaque [`AncestorId`], compared for equality and carried
//! through rewrites but never dereferenced. It is bookkeeping, not a
//! lifetime.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::boolean::{Coordination, assemble};
use crate::config::EngineConfig;
use crate::cursor::NodeCursor;
use crate::error::{Result, SylvaError};
use crate::filter::{AncestorFilter, ConstraintFilter};
use crate::index::IndexView;
use crate::node::NodePath;
use crate::twig::assemble_twig;

// ------------- Occur -------------
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Occur {
    Must,
    Should,
    MustNot,
}

// ------------- AncestorId -------------
/// Opaque label of an enclosing structural query. Uniqueness is all that
/// matters, so ids come from a plain process-wide counter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct AncestorId(u64);

impl AncestorId {
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

// ------------- Constraints -------------
/// Structural constraints attached to a query node: an exact depth, an
/// inclusive lexicographic node-path range, and the enclosing structural
/// query, if any.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Constraints {
    level: Option<usize>,
    lower: Option<NodePath>,
    upper: Option<NodePath>,
    ancestor: Option<AncestorId>,
}

impl Constraints {
    pub fn level(&self) -> Option<usize> {
        self.level
    }
    pub fn lower(&self) -> Option<&NodePath> {
        self.lower.as_ref()
    }
    pub fn upper(&self) -> Option<&NodePath> {
        self.upper.as_ref()
    }
    pub fn ancestor(&self) -> Option<AncestorId> {
        self.ancestor
    }
    pub fn range_unconstrained(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
    fn constrains_nodes(&self) -> bool {
        self.level.is_some() || self.lower.is_some() || self.upper.is_some()
    }

    fn check_interval(lower: &NodePath, upper: &NodePath) -> Result<()> {
        if lower > upper {
            return Err(SylvaError::Config(format!(
                "invalid node range: lower bound {} exceeds upper bound {}",
                lower, upper
            )));
        }
        Ok(())
    }

    // Parent constraints win over the child's own where both are set.
    fn overlaid(&self, parent: &Constraints) -> Constraints {
        Constraints {
            level: parent.level.or(self.level),
            lower: parent.lower.clone().or_else(|| self.lower.clone()),
            upper: parent.upper.clone().or_else(|| self.upper.clone()),
            ancestor: parent.ancestor.or(self.ancestor),
        }
    }
}

// ------------- Clause -------------
#[derive(Clone, PartialEq, Debug)]
pub struct Clause {
    occur: Occur,
    query: NodeQuery,
}

impl Clause {
    pub fn occur(&self) -> Occur {
        self.occur
    }
    pub fn query(&self) -> &NodeQuery {
        &self.query
    }
}

// ------------- TermQuery -------------
/// Matches every node containing the given term.
#[derive(Clone, PartialEq, Debug)]
pub struct TermQuery {
    term: String,
    boost: f32,
    constraints: Constraints,
}

impl TermQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            boost: 1.0,
            constraints: Constraints::default(),
        }
    }
    pub fn term(&self) -> &str {
        &self.term
    }
    pub fn boost(&self) -> f32 {
        self.boost
    }
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
    pub fn with_level(mut self, level: usize) -> Self {
        self.constraints.level = Some(level);
        self
    }
    pub fn with_interval(mut self, lower: NodePath, upper: NodePath) -> Result<Self> {
        Constraints::check_interval(&lower, &upper)?;
        self.constraints.lower = Some(lower);
        self.constraints.upper = Some(upper);
        Ok(self)
    }
}

// ------------- BooleanQuery -------------
/// MUST / SHOULD / MUST_NOT composition over node queries.
#[derive(Clone, PartialEq, Debug)]
pub struct BooleanQuery {
    clauses: Vec<Clause>,
    boost: f32,
    constraints: Constraints,
    coord_disabled: bool,
    max_clauses: usize,
}

impl BooleanQuery {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            clauses: Vec::new(),
            boost: 1.0,
            constraints: Constraints::default(),
            coord_disabled: false,
            max_clauses: config.max_clauses,
        }
    }
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
    pub fn boost(&self) -> f32 {
        self.boost
    }
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }
    pub fn coordination_disabled(&self) -> bool {
        self.coord_disabled
    }

    pub fn must(self, query: impl Into<NodeQuery>) -> Result<Self> {
        self.with_clause(Occur::Must, query)
    }
    pub fn should(self, query: impl Into<NodeQuery>) -> Result<Self> {
        self.with_clause(Occur::Should, query)
    }
    pub fn must_not(self, query: impl Into<NodeQuery>) -> Result<Self> {
        self.with_clause(Occur::MustNot, query)
    }
    pub fn with_clause(mut self, occur: Occur, query: impl Into<NodeQuery>) -> Result<Self> {
        let count = self.clauses.len() + 1;
        if count > self.max_clauses {
            return Err(SylvaError::TooManyClauses {
                count,
                max: self.max_clauses,
            });
        }
        let query = query.into().constrained(&self.constraints);
        self.clauses.push(Clause { occur, query });
        Ok(self)
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
    /// Fixes every coordination factor at 1. Meant for queries whose
    /// clauses were generated mechanically, where clause overlap carries
    /// no meaning.
    pub fn without_coordination(mut self) -> Self {
        self.coord_disabled = true;
        self
    }
    pub fn with_level(mut self, level: usize) -> Self {
        self.constraints.level = Some(level);
        self.repropagate()
    }
    pub fn with_interval(mut self, lower: NodePath, upper: NodePath) -> Result<Self> {
        Constraints::check_interval(&lower, &upper)?;
        self.constraints.lower = Some(lower);
        self.constraints.upper = Some(upper);
        Ok(self.repropagate())
    }
    pub fn with_ancestor(mut self, ancestor: AncestorId) -> Self {
        self.constraints.ancestor = Some(ancestor);
        self.repropagate()
    }

    // Changing a parent constraint re-derives every existing clause.
    fn repropagate(mut self) -> Self {
        let constraints = self.constraints.clone();
        self.clauses = self
            .clauses
            .into_iter()
            .map(|c| Clause {
                occur: c.occur,
                query: c.query.constrained(&constraints),
            })
            .collect();
        self
    }

    fn counts(&self) -> (usize, usize) {
        let required = self
            .clauses
            .iter()
            .filter(|c| c.occur == Occur::Must)
            .count();
        let optional = self
            .clauses
            .iter()
            .filter(|c| c.occur == Occur::Should)
            .count();
        (required, optional)
    }
}

// ------------- TwigQuery -------------
/// Tree-pattern query: a root node query at `root_level` plus child and
/// descendant clauses, all evaluated in the root's coordinate system.
#[derive(Clone, PartialEq, Debug)]
pub struct TwigQuery {
    id: AncestorId,
    root: Option<Box<NodeQuery>>,
    root_level: usize,
    clauses: Vec<Clause>,
    boost: f32,
    constraints: Constraints,
    coord_disabled: bool,
    max_clauses: usize,
}

impl TwigQuery {
    pub fn new(config: &EngineConfig, root_level: usize) -> Self {
        Self {
            id: AncestorId::fresh(),
            root: None,
            root_level,
            clauses: Vec::new(),
            boost: 1.0,
            constraints: Constraints::default(),
            coord_disabled: false,
            max_clauses: config.max_clauses,
        }
    }
    pub fn id(&self) -> AncestorId {
        self.id
    }
    pub fn root(&self) -> Option<&NodeQuery> {
        self.root.as_deref()
    }
    pub fn root_level(&self) -> usize {
        self.root_level
    }
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
    pub fn boost(&self) -> f32 {
        self.boost
    }
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    // Constraints pushed onto clause queries: the node range and this twig
    // as the enclosing ancestor. Levels are per clause and stay untouched.
    fn pushdown(&self) -> Constraints {
        Constraints {
            level: None,
            lower: self.constraints.lower.clone(),
            upper: self.constraints.upper.clone(),
            ancestor: Some(self.id),
        }
    }

    pub fn with_root(mut self, root: impl Into<NodeQuery>) -> Self {
        let pushdown = Constraints {
            level: Some(self.root_level),
            lower: self.constraints.lower.clone(),
            upper: self.constraints.upper.clone(),
            // the root is the ancestor itself; it answers to whatever
            // encloses the twig
            ancestor: self.constraints.ancestor,
        };
        let root = root.into().at_level(self.root_level).constrained(&pushdown);
        self.root = Some(Box::new(root));
        self
    }

    /// Adds a clause one level below the root (a direct child).
    pub fn child(self, occur: Occur, query: impl Into<NodeQuery>) -> Result<Self> {
        let level = self.root_level + 1;
        self.clause_at(occur, level, query)
    }

    /// Adds a clause at an explicit deeper level.
    pub fn descendant(
        self,
        occur: Occur,
        level: usize,
        query: impl Into<NodeQuery>,
    ) -> Result<Self> {
        if level <= self.root_level {
            return Err(SylvaError::Config(format!(
                "descendant level {} must lie below the root level {}",
                level, self.root_level
            )));
        }
        self.clause_at(occur, level, query)
    }

    fn clause_at(
        mut self,
        occur: Occur,
        level: usize,
        query: impl Into<NodeQuery>,
    ) -> Result<Self> {
        let count = self.clauses.len() + 1;
        if count > self.max_clauses {
            return Err(SylvaError::TooManyClauses {
                count,
                max: self.max_clauses,
            });
        }
        let query = query.into().at_level(level).constrained(&self.pushdown());
        self.clauses.push(Clause { occur, query });
        Ok(self)
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
    pub fn without_coordination(mut self) -> Self {
        self.coord_disabled = true;
        self
    }
    pub fn with_interval(mut self, lower: NodePath, upper: NodePath) -> Result<Self> {
        Constraints::check_interval(&lower, &upper)?;
        self.constraints.lower = Some(lower);
        self.constraints.upper = Some(upper);
        Ok(self.repropagate())
    }
    pub fn with_ancestor(mut self, ancestor: AncestorId) -> Self {
        self.constraints.ancestor = Some(ancestor);
        self.repropagate()
    }

    fn repropagate(mut self) -> Self {
        if let Some(root) = self.root.take() {
            let pushdown = Constraints {
                level: Some(self.root_level),
                lower: self.constraints.lower.clone(),
                upper: self.constraints.upper.clone(),
                ancestor: self.constraints.ancestor,
            };
            self.root = Some(Box::new(root.constrained(&pushdown)));
        }
        let pushdown = self.pushdown();
        self.clauses = self
            .clauses
            .into_iter()
            .map(|c| Clause {
                occur: c.occur,
                query: c.query.constrained(&pushdown),
            })
            .collect();
        self
    }

    // Re-roots the twig at another level, shifting the root and every
    // clause level by the same amount.
    fn shifted_to(mut self, level: usize) -> Self {
        let delta = level as i64 - self.root_level as i64;
        self.root_level = level;
        if let Some(root) = self.root.take() {
            self.root = Some(Box::new(root.at_level(level)));
        }
        self.clauses = self
            .clauses
            .into_iter()
            .map(|c| {
                let shifted = match c.query.constraints().level() {
                    Some(old) => (old as i64 + delta).max(0) as usize,
                    None => level + 1,
                };
                Clause {
                    occur: c.occur,
                    query: c.query.at_level(shifted),
                }
            })
            .collect();
        self
    }

    fn counts(&self) -> (usize, usize) {
        let required = self
            .clauses
            .iter()
            .filter(|c| c.occur == Occur::Must)
            .count();
        let optional = self
            .clauses
            .iter()
            .filter(|c| c.occur == Occur::Should)
            .count();
        (required + usize::from(self.root.is_some()), optional)
    }
}

// ------------- TupleQuery -------------
/// "Same parent node" grouping: the degenerate twig with no root query.
/// Clauses match one level below the tuple's level and are projected back
/// onto the shared parent.
#[derive(Clone, PartialEq, Debug)]
pub struct TupleQuery {
    twig: TwigQuery,
}

impl TupleQuery {
    pub fn new(config: &EngineConfig) -> Self {
        Self::new_at(config, 1)
    }
    pub fn new_at(config: &EngineConfig, level: usize) -> Self {
        Self {
            twig: TwigQuery::new(config, level),
        }
    }
    pub fn add(self, occur: Occur, query: impl Into<NodeQuery>) -> Result<Self> {
        Ok(Self {
            twig: self.twig.child(occur, query)?,
        })
    }
    pub fn with_interval(self, lower: NodePath, upper: NodePath) -> Result<Self> {
        Ok(Self {
            twig: self.twig.with_interval(lower, upper)?,
        })
    }
    pub fn with_boost(self, boost: f32) -> Self {
        Self {
            twig: self.twig.with_boost(boost),
        }
    }
    pub fn without_coordination(self) -> Self {
        Self {
            twig: self.twig.without_coordination(),
        }
    }
    pub fn as_twig(&self) -> &TwigQuery {
        &self.twig
    }
}

// ------------- ProjectionQuery -------------
/// A query whose matches are reported at an ancestor level rather than at
/// the level they occur. Produced by the single-clause twig rewrite, and
/// usable directly for "any descendant under level N" patterns.
#[derive(Clone, PartialEq, Debug)]
pub struct ProjectionQuery {
    inner: Box<NodeQuery>,
    ancestor_level: usize,
}

impl ProjectionQuery {
    pub fn new(inner: NodeQuery, ancestor_level: usize) -> Self {
        Self {
            inner: Box::new(inner),
            ancestor_level,
        }
    }
    pub fn inner(&self) -> &NodeQuery {
        &self.inner
    }
    pub fn ancestor_level(&self) -> usize {
        self.ancestor_level
    }
}

// ------------- NodeQuery -------------
#[derive(Clone, PartialEq, Debug)]
pub enum NodeQuery {
    Term(TermQuery),
    Boolean(BooleanQuery),
    Twig(TwigQuery),
    Projection(ProjectionQuery),
}

impl From<TermQuery> for NodeQuery {
    fn from(q: TermQuery) -> Self {
        NodeQuery::Term(q)
    }
}
impl From<BooleanQuery> for NodeQuery {
    fn from(q: BooleanQuery) -> Self {
        NodeQuery::Boolean(q)
    }
}
impl From<TwigQuery> for NodeQuery {
    fn from(q: TwigQuery) -> Self {
        NodeQuery::Twig(q)
    }
}
impl From<TupleQuery> for NodeQuery {
    fn from(q: TupleQuery) -> Self {
        NodeQuery::Twig(q.twig)
    }
}
impl From<ProjectionQuery> for NodeQuery {
    fn from(q: ProjectionQuery) -> Self {
        NodeQuery::Projection(q)
    }
}

impl NodeQuery {
    /// Shorthand for a plain term query.
    pub fn term(term: impl Into<String>) -> NodeQuery {
        NodeQuery::Term(TermQuery::new(term))
    }

    pub fn constraints(&self) -> &Constraints {
        match self {
            NodeQuery::Term(q) => &q.constraints,
            NodeQuery::Boolean(q) => &q.constraints,
            NodeQuery::Twig(q) => &q.constraints,
            NodeQuery::Projection(q) => q.inner.constraints(),
        }
    }

    /// Derives a copy with the parent's constraints pushed on, recursively
    /// into clause queries. Parent fields win where both sides are set.
    pub fn constrained(self, parent: &Constraints) -> NodeQuery {
        match self {
            NodeQuery::Term(mut q) => {
                q.constraints = q.constraints.overlaid(parent);
                NodeQuery::Term(q)
            }
            NodeQuery::Boolean(mut q) => {
                q.constraints = q.constraints.overlaid(parent);
                NodeQuery::Boolean(BooleanQuery::repropagate(q))
            }
            NodeQuery::Twig(mut q) => {
                // a level pushed onto a twig re-roots it
                if let Some(level) = parent.level
                    && level != q.root_level
                {
                    q = q.shifted_to(level);
                }
                q.constraints.lower = parent
                    .lower
                    .clone()
                    .or_else(|| q.constraints.lower.clone());
                q.constraints.upper = parent
                    .upper
                    .clone()
                    .or_else(|| q.constraints.upper.clone());
                q.constraints.ancestor = parent.ancestor.or(q.constraints.ancestor);
                NodeQuery::Twig(TwigQuery::repropagate(q))
            }
            NodeQuery::Projection(q) => {
                let mut q = q;
                if let Some(level) = parent.level
                    && level != q.ancestor_level
                {
                    return NodeQuery::Projection(q).at_level(level).constrained(&Constraints {
                        level: None,
                        lower: parent.lower.clone(),
                        upper: parent.upper.clone(),
                        ancestor: parent.ancestor,
                    });
                }
                let pushdown = Constraints {
                    level: None,
                    lower: parent.lower.clone(),
                    upper: parent.upper.clone(),
                    ancestor: parent.ancestor,
                };
                q.inner = Box::new(q.inner.constrained(&pushdown));
                NodeQuery::Projection(q)
            }
        }
    }

    /// Derives a copy matching at the given depth. For a twig this re-roots
    /// the whole pattern, shifting clause levels along.
    pub fn at_level(self, level: usize) -> NodeQuery {
        match self {
            NodeQuery::Term(mut q) => {
                q.constraints.level = Some(level);
                NodeQuery::Term(q)
            }
            NodeQuery::Boolean(mut q) => {
                q.constraints.level = Some(level);
                NodeQuery::Boolean(BooleanQuery::repropagate(q))
            }
            NodeQuery::Twig(q) => NodeQuery::Twig(q.shifted_to(level)),
            NodeQuery::Projection(mut q) => {
                let delta = level as i64 - q.ancestor_level as i64;
                q.ancestor_level = level;
                if let Some(old) = q.inner.constraints().level() {
                    let shifted = (old as i64 + delta).max(0) as usize;
                    q.inner = Box::new(q.inner.at_level(shifted));
                }
                NodeQuery::Projection(q)
            }
        }
    }

    // Multiplies the query's boost; used when a rewrite dissolves an
    // enclosing query whose boost would otherwise be lost.
    fn scaled(self, factor: f32) -> NodeQuery {
        match self {
            NodeQuery::Term(mut q) => {
                q.boost *= factor;
                NodeQuery::Term(q)
            }
            NodeQuery::Boolean(mut q) => {
                q.boost *= factor;
                NodeQuery::Boolean(q)
            }
            NodeQuery::Twig(mut q) => {
                q.boost *= factor;
                NodeQuery::Twig(q)
            }
            NodeQuery::Projection(mut q) => {
                q.inner = Box::new(q.inner.scaled(factor));
                NodeQuery::Projection(q)
            }
        }
    }

    /// Rewrites the query into its cheapest equivalent form. Rewriting an
    /// already rewritten query returns an equal query.
    ///
    /// Optimizations: a boolean query with a single non-prohibited clause
    /// collapses to that clause; a twig whose root is itself a twig is
    /// flattened; a twig without clauses collapses to its root; a rootless
    /// twig with one clause and no node range becomes a plain projection.
    pub fn rewrite(&self) -> NodeQuery {
        match self {
            NodeQuery::Term(q) => NodeQuery::Term(q.clone()),
            NodeQuery::Projection(q) => NodeQuery::Projection(ProjectionQuery {
                inner: Box::new(q.inner.rewrite()),
                ancestor_level: q.ancestor_level,
            }),
            NodeQuery::Boolean(b) => {
                let clauses: Vec<Clause> = b
                    .clauses
                    .iter()
                    .map(|c| Clause {
                        occur: c.occur,
                        query: c.query.rewrite(),
                    })
                    .collect();
                if clauses.len() == 1 && clauses[0].occur != Occur::MustNot {
                    debug!("collapsing single-clause boolean query");
                    let clause = clauses.into_iter().next();
                    let Some(clause) = clause else {
                        return NodeQuery::Boolean(b.clone());
                    };
                    return clause
                        .query
                        .constrained(&b.constraints)
                        .scaled(b.boost);
                }
                let mut b = b.clone();
                b.clauses = clauses;
                NodeQuery::Boolean(b)
            }
            NodeQuery::Twig(t) => {
                let mut t = t.clone();
                t.root = t.root.take().map(|r| Box::new(r.rewrite()));
                t.clauses = t
                    .clauses
                    .into_iter()
                    .map(|c| Clause {
                        occur: c.occur,
                        query: c.query.rewrite(),
                    })
                    .collect();
                // flatten a root that is itself a twig: its clauses join
                // ours, re-pointed at this twig
                loop {
                    let inner = match t.root.as_deref() {
                        Some(NodeQuery::Twig(inner)) => inner.clone(),
                        _ => break,
                    };
                    debug!("flattening nested twig root");
                    let pushdown = t.pushdown();
                    let mut merged: Vec<Clause> = inner
                        .clauses
                        .into_iter()
                        .map(|c| Clause {
                            occur: c.occur,
                            query: c.query.constrained(&pushdown),
                        })
                        .collect();
                    merged.extend(t.clauses);
                    t.clauses = merged;
                    t.root = inner.root;
                }
                if t.clauses.is_empty() {
                    if let Some(root) = t.root.take() {
                        debug!("collapsing clauseless twig to its root");
                        let pushdown = Constraints {
                            level: Some(t.root_level),
                            lower: t.constraints.lower.clone(),
                            upper: t.constraints.upper.clone(),
                            ancestor: t.constraints.ancestor,
                        };
                        return root.constrained(&pushdown).scaled(t.boost);
                    }
                    return NodeQuery::Twig(t);
                }
                if t.root.is_none()
                    && t.clauses.len() == 1
                    && t.constraints.range_unconstrained()
                    && t.clauses[0].occur != Occur::MustNot
                    && let Some(clause) = t.clauses.pop()
                {
                    debug!("collapsing single-clause twig to a projection");
                    return NodeQuery::Projection(ProjectionQuery {
                        inner: Box::new(clause.query.scaled(t.boost)),
                        ancestor_level: t.root_level,
                    });
                }
                NodeQuery::Twig(t)
            }
        }
    }

    /// Builds the cursor tree for this query against a read-only index
    /// view. `Ok(None)` means no document can possibly match.
    pub fn cursor<'a>(
        &self,
        view: &'a dyn IndexView,
        config: &EngineConfig,
    ) -> Result<Option<Box<dyn NodeCursor + 'a>>> {
        self.cursor_scaled(view, config, 1.0)
    }

    fn cursor_scaled<'a>(
        &self,
        view: &'a dyn IndexView,
        config: &EngineConfig,
        boost: f32,
    ) -> Result<Option<Box<dyn NodeCursor + 'a>>> {
        match self {
            NodeQuery::Term(t) => {
                let Some(cursor) = view.term_cursor(&t.term, t.boost * boost) else {
                    return Ok(None);
                };
                if t.constraints.constrains_nodes() {
                    Ok(Some(Box::new(ConstraintFilter::new(
                        cursor,
                        t.constraints.level,
                        t.constraints.lower.clone(),
                        t.constraints.upper.clone(),
                    ))))
                } else {
                    Ok(Some(cursor))
                }
            }
            NodeQuery::Boolean(b) => {
                let mut required = Vec::new();
                let mut prohibited = Vec::new();
                let mut optional = Vec::new();
                for clause in &b.clauses {
                    let cursor = clause.query.cursor_scaled(view, config, boost * b.boost)?;
                    match (clause.occur, cursor) {
                        (Occur::Must, None) => return Ok(None),
                        (Occur::Must, Some(c)) => required.push(c),
                        (Occur::Should, Some(c)) => optional.push(c),
                        (Occur::MustNot, Some(c)) => prohibited.push(c),
                        (_, None) => (),
                    }
                }
                let (required_count, optional_count) = b.counts();
                assemble(
                    required,
                    prohibited,
                    optional,
                    Coordination {
                        enabled: config.coordination && !b.coord_disabled,
                        required_count,
                        optional_count,
                    },
                )
            }
            NodeQuery::Twig(t) => {
                let root = match &t.root {
                    Some(r) => match r.cursor_scaled(view, config, boost * t.boost)? {
                        Some(c) => Some(c),
                        // a twig without a findable root matches nothing
                        None => return Ok(None),
                    },
                    None => None,
                };
                let mut required = Vec::new();
                let mut prohibited = Vec::new();
                let mut optional = Vec::new();
                for clause in &t.clauses {
                    let cursor = clause.query.cursor_scaled(view, config, boost * t.boost)?;
                    match (clause.occur, cursor) {
                        (Occur::Must, None) => return Ok(None),
                        (Occur::Must, Some(c)) => required.push(c),
                        (Occur::Should, Some(c)) => optional.push(c),
                        (Occur::MustNot, Some(c)) => prohibited.push(c),
                        (_, None) => (),
                    }
                }
                let (required_count, optional_count) = t.counts();
                assemble_twig(
                    root,
                    t.root_level,
                    required,
                    prohibited,
                    optional,
                    Coordination {
                        enabled: config.coordination && !t.coord_disabled,
                        required_count,
                        optional_count,
                    },
                )
            }
            NodeQuery::Projection(p) => {
                match p.inner.cursor_scaled(view, config, boost)? {
                    Some(c) => Ok(Some(Box::new(AncestorFilter::new(c, p.ancestor_level)))),
                    None => Ok(None),
                }
            }
        }
    }
}
