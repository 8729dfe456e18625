//! Twig and tuple composition.
//!
//! A twig matches a root node plus a boolean combination of constraints on
//! its children and descendants. No dedicated tree-matching algorithm is
//! needed: once every operand (each clause cursor and the root's own
//! cursor) has been projected to the root's level by an ancestor filter,
//! they all report positions in one coordinate system and the ordinary
//! boolean merge-join of [`crate::boolean`] does the rest. The root simply
//! becomes one more required operand.
//!
//! A tuple is the degenerate twig with no root cursor: its clauses, all
//! projected to the parent level, express "these must/should/must-not
//! match within the same parent node".

use tracing::debug;

use crate::boolean::{Coordination, assemble};
use crate::cursor::NodeCursor;
use crate::error::Result;
use crate::filter::AncestorFilter;

fn project<'a>(
    cursors: Vec<Box<dyn NodeCursor + 'a>>,
    root_level: usize,
) -> Vec<Box<dyn NodeCursor + 'a>> {
    cursors
        .into_iter()
        .map(|c| Box::new(AncestorFilter::new(c, root_level)) as Box<dyn NodeCursor + 'a>)
        .collect()
}

/// Assembles a twig (or, with `root` absent, a tuple) composition.
///
/// The coordination counts must already include the root as one required
/// clause when present; this function only wraps and delegates.
pub fn assemble_twig<'a>(
    root: Option<Box<dyn NodeCursor + 'a>>,
    root_level: usize,
    required: Vec<Box<dyn NodeCursor + 'a>>,
    prohibited: Vec<Box<dyn NodeCursor + 'a>>,
    optional: Vec<Box<dyn NodeCursor + 'a>>,
    coordination: Coordination,
) -> Result<Option<Box<dyn NodeCursor + 'a>>> {
    debug!(
        root = root.is_some(),
        root_level,
        clauses = required.len() + prohibited.len() + optional.len(),
        "assembling twig composition"
    );
    let mut required = project(required, root_level);
    let prohibited = project(prohibited, root_level);
    let optional = project(optional, root_level);
    if let Some(root) = root {
        // the root is filtered like everything else: its own matches may
        // sit deeper than the root level when the root query is composite
        required.push(Box::new(AncestorFilter::new(root, root_level)));
    }
    assemble(required, prohibited, optional, coordination)
}
