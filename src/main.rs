//! Demo binary: indexes a handful of tree-shaped documents and runs a
//! boolean and a twig query through the public construction API.
//!
//! Each document is a small catalog record laid out as a tree: node `{b}`
//! is the record root, `{b, 0}` the title, `{b, 1}` the author and
//! `{b, 2}` the subject line.

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sylva::config::EngineConfig;
use sylva::cursor::NodeCursor;
use sylva::error::Result;
use sylva::index::{IndexView, MemoryIndex};
use sylva::query::{BooleanQuery, NodeQuery, Occur, TwigQuery};

fn drain(label: &str, mut cursor: Box<dyn NodeCursor + '_>) -> Result<()> {
    while cursor.next_candidate()? {
        let doc = cursor.doc();
        let mut any = false;
        while cursor.next_node()? {
            any = true;
            let score = cursor.score_in_node()?;
            info!(query = label, %doc, node = %cursor.node(), score, "match");
        }
        if !any {
            info!(query = label, %doc, "candidate without a node match");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match EngineConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("falling back to default configuration: {}", e);
            EngineConfig::default()
        }
    };

    let mut index = MemoryIndex::new();
    index.index_node(1, [0], "record");
    index.index_node(1, [0, 0], "the art of computer programming");
    index.index_node(1, [0, 1], "knuth");
    index.index_node(1, [0, 2], "algorithms analysis");
    index.index_node(2, [0], "record");
    index.index_node(2, [0, 0], "structure and interpretation of computer programs");
    index.index_node(2, [0, 1], "abelson sussman");
    index.index_node(2, [0, 2], "programming languages");
    index.index_node(3, [0], "record");
    index.index_node(3, [0, 0], "the c programming language");
    index.index_node(3, [0, 1], "kernighan ritchie");
    index.index_node(3, [0, 2], "c reference");
    info!(docs = index.doc_count(), terms = index.term_count(), "index built");

    // every node mentioning "programming", preferably about computers
    let boolean = BooleanQuery::new(&config)
        .must(NodeQuery::term("programming"))?
        .should(NodeQuery::term("computer"))?;
    let query = NodeQuery::from(boolean).rewrite();
    match query.cursor(&index, &config)? {
        Some(cursor) => drain("boolean", cursor)?,
        None => info!(query = "boolean", "no possible match"),
    }

    // records rooted at level 1 whose subtree mentions "knuth" but not "c"
    let twig = TwigQuery::new(&config, 1)
        .with_root(NodeQuery::term("record"))
        .child(Occur::Must, NodeQuery::term("knuth"))?
        .child(Occur::MustNot, NodeQuery::term("c"))?;
    let query = NodeQuery::from(twig).rewrite();
    match query.cursor(&index, &config)? {
        Some(cursor) => drain("twig", cursor)?,
        None => info!(query = "twig", "no possible match"),
    }

    Ok(())
}
