//! Sylva – a node-level structural search engine core.
//!
//! Sylva evaluates boolean and tree-pattern queries over *tree-shaped*
//! documents: every position inside a document carries a Dewey-style
//! [`node::NodePath`] address, and queries constrain not just which terms a
//! document contains but *where* in the document tree they sit. The engine
//! is a family of dual-cursor iterators that walk candidate documents and
//! node positions in lock-step, combined through boolean algebra and
//! structural projection.
//!
//! ## Modules
//! * [`node`] – node paths and the sentinel-bearing cursor marks.
//! * [`cursor`] – the [`cursor::NodeCursor`] contract every operator and
//!   every primitive stream implements.
//! * [`merge`] – conjunction (AND) and disjunction (OR) merge operators.
//! * [`refine`] – required-exclude (AND NOT) and required-optional
//!   operators.
//! * [`filter`] – ancestor projection and level/range constraint filters.
//! * [`boolean`] – composition of clause cursors with coordination scoring.
//! * [`twig`] – tree-pattern ("twig") and tuple composition.
//! * [`query`] – immutable query values, constraint propagation, rewriting
//!   and cursor creation.
//! * [`index`] – the read-only [`index::IndexView`] interface plus an
//!   in-memory reference index.
//! * [`config`] – engine configuration (clause limit, coordination).
//!
//! ## Quick Start
//! ```
//! use sylva::config::EngineConfig;
//! use sylva::cursor::NodeCursor;
//! use sylva::index::MemoryIndex;
//! use sylva::node::DocMark;
//! use sylva::query::{BooleanQuery, NodeQuery};
//!
//! let mut index = MemoryIndex::new();
//! index.index_node(1, [0, 0], "aaa bbb");
//! index.index_node(1, [0, 1], "aaa ccc");
//!
//! let config = EngineConfig::default();
//! let query = BooleanQuery::new(&config)
//!     .must(NodeQuery::term("aaa")).unwrap()
//!     .should(NodeQuery::term("bbb")).unwrap();
//! let query = NodeQuery::from(query).rewrite();
//!
//! let mut cursor = query.cursor(&index, &config).unwrap().unwrap();
//! assert!(cursor.next_candidate().unwrap());
//! assert_eq!(cursor.doc(), DocMark::At(1));
//! assert!(cursor.next_node().unwrap());
//! ```
//!
//! ## Evaluation model
//! Cursor trees are single-use, forward-only and single-threaded;
//! independent trees may evaluate concurrently against the same read-only
//! index view. Distinguishing *candidate* documents (all required operands
//! agree on the id) from *matches* (they also agree on a node) is what
//! keeps node-path comparison off the hot path.

pub mod boolean;
pub mod config;
pub mod cursor;
pub mod error;
pub mod filter;
pub mod index;
pub mod merge;
pub mod node;
pub mod query;
pub mod refine;
pub mod twig;
