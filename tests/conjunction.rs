use sylva::config::EngineConfig;
use sylva::cursor::NodeCursor;
use sylva::index::MemoryIndex;
use sylva::node::{DocId, NodePath};
use sylva::query::{BooleanQuery, NodeQuery};

fn setup() -> MemoryIndex {
    let mut index = MemoryIndex::new();
    // doc 1: both terms share nodes {0,0} and {0,2}
    index.index_node(1, [0, 0], "alpha beta");
    index.index_node(1, [0, 1], "alpha");
    index.index_node(1, [0, 2], "beta alpha");
    // doc 2: both terms appear but never in the same node
    index.index_node(2, [0, 0], "alpha");
    index.index_node(2, [0, 1], "beta");
    // doc 3: only one of the terms
    index.index_node(3, [0, 0], "alpha");
    // doc 4: shared node again, deeper
    index.index_node(4, [1, 2, 3], "alpha beta gamma");
    index
}

// Collects every candidate document together with its matched nodes; a
// candidate that never agrees on a node shows up with an empty node list.
fn drain(mut cursor: Box<dyn NodeCursor + '_>) -> Vec<(DocId, Vec<NodePath>)> {
    let mut out = Vec::new();
    while cursor.next_candidate().expect("candidate advance") {
        let doc = cursor.doc().id().expect("candidate doc id");
        let mut nodes = Vec::new();
        while cursor.next_node().expect("node advance") {
            nodes.push(cursor.node().path().expect("real node").clone());
        }
        out.push((doc, nodes));
    }
    out
}

fn conjunction(index: &MemoryIndex, terms: &[&str]) -> Vec<(DocId, Vec<NodePath>)> {
    let config = EngineConfig::default();
    let mut query = BooleanQuery::new(&config);
    for term in terms {
        query = query.must(NodeQuery::term(*term)).expect("clause fits");
    }
    let cursor = NodeQuery::from(query)
        .cursor(index, &config)
        .expect("cursor creation")
        .expect("possible match");
    drain(cursor)
}

#[test]
fn yields_exactly_the_shared_nodes() {
    let index = setup();
    let matches = conjunction(&index, &["alpha", "beta"]);
    // doc 2 is a candidate (both terms present) but matches no node
    assert_eq!(
        matches,
        vec![
            (
                1,
                vec![NodePath::from([0, 0]), NodePath::from([0, 2])]
            ),
            (2, vec![]),
            (4, vec![NodePath::from([1, 2, 3])]),
        ]
    );
}

#[test]
fn candidate_is_not_a_match() {
    let index = setup();
    let matches = conjunction(&index, &["alpha", "beta"]);
    let doc2 = matches.iter().find(|(d, _)| *d == 2).expect("doc 2 candidate");
    assert!(doc2.1.is_empty(), "doc 2 must not produce a node match");
}

#[test]
fn missing_term_drops_every_document() {
    let index = setup();
    let config = EngineConfig::default();
    let query = BooleanQuery::new(&config)
        .must(NodeQuery::term("alpha"))
        .unwrap()
        .must(NodeQuery::term("nonexistent"))
        .unwrap();
    let cursor = NodeQuery::from(query).cursor(&index, &config).unwrap();
    assert!(cursor.is_none(), "a required term without postings means no possible match");
}

#[test]
fn skip_to_candidate_lands_on_first_at_or_after_target() {
    let index = setup();
    let config = EngineConfig::default();
    let query = NodeQuery::from(
        BooleanQuery::new(&config)
            .must(NodeQuery::term("alpha"))
            .unwrap()
            .must(NodeQuery::term("beta"))
            .unwrap(),
    );
    let mut cursor = query.cursor(&index, &config).unwrap().unwrap();
    assert!(cursor.skip_to_candidate(2).unwrap());
    assert_eq!(cursor.doc().id(), Some(2));
    // skipping backwards must not move the cursor
    assert!(cursor.skip_to_candidate(1).unwrap());
    assert_eq!(cursor.doc().id(), Some(2));
    assert!(cursor.skip_to_candidate(3).unwrap());
    assert_eq!(cursor.doc().id(), Some(4));
    assert!(!cursor.skip_to_candidate(5).unwrap());
}

#[test]
fn three_way_conjunction() {
    let index = setup();
    let matches = conjunction(&index, &["alpha", "beta", "gamma"]);
    assert_eq!(matches, vec![(4, vec![NodePath::from([1, 2, 3])])]);
}
