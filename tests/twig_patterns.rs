use sylva::config::EngineConfig;
use sylva::cursor::NodeCursor;
use sylva::index::MemoryIndex;
use sylva::node::{DocId, DocMark, NodePath};
use sylva::query::{NodeQuery, Occur, ProjectionQuery, TupleQuery, TwigQuery};

fn drain(mut cursor: Box<dyn NodeCursor + '_>) -> Vec<(DocId, Vec<NodePath>)> {
    let mut out = Vec::new();
    while cursor.next_candidate().unwrap() {
        let doc = cursor.doc().id().unwrap();
        let mut nodes = Vec::new();
        while cursor.next_node().unwrap() {
            nodes.push(cursor.node().path().unwrap().clone());
        }
        out.push((doc, nodes));
    }
    out
}

#[test]
fn descendant_match_projects_onto_the_root_node() {
    // root "book" at {1}, descendant "ccc" at {1,1}
    let mut index = MemoryIndex::new();
    index.index_node(5, [1], "book");
    index.index_node(5, [1, 1], "ccc");
    let config = EngineConfig::default();
    let twig = TwigQuery::new(&config, 1)
        .with_root(NodeQuery::term("book"))
        .descendant(Occur::Must, 2, NodeQuery::term("ccc"))
        .unwrap();
    let cursor = NodeQuery::from(twig)
        .cursor(&index, &config)
        .unwrap()
        .expect("both operands have postings");
    assert_eq!(drain(cursor), vec![(5, vec![NodePath::from([1])])]);
}

#[test]
fn descendant_under_a_different_root_does_not_match() {
    let mut index = MemoryIndex::new();
    index.index_node(5, [1], "book");
    index.index_node(5, [2, 1], "ccc");
    let config = EngineConfig::default();
    let twig = TwigQuery::new(&config, 1)
        .with_root(NodeQuery::term("book"))
        .descendant(Occur::Must, 2, NodeQuery::term("ccc"))
        .unwrap();
    let cursor = NodeQuery::from(twig)
        .cursor(&index, &config)
        .unwrap()
        .unwrap();
    // candidate document, but the projected node {2} never meets the root {1}
    assert_eq!(drain(cursor), vec![(5, vec![])]);
}

#[test]
fn twig_matches_where_the_descendant_clause_matches_below_the_root() {
    // twig(root = X, child = Y) matches iff Y matches a child of a node
    // where X matches
    let mut index = MemoryIndex::new();
    index.index_node(1, [0], "x");
    index.index_node(1, [0, 0], "y");
    index.index_node(2, [0], "x");
    index.index_node(2, [1, 0], "y");
    index.index_node(3, [0], "z");
    index.index_node(3, [0, 0], "y");
    let config = EngineConfig::default();
    let twig = TwigQuery::new(&config, 1)
        .with_root(NodeQuery::term("x"))
        .child(Occur::Must, NodeQuery::term("y"))
        .unwrap();
    let cursor = NodeQuery::from(twig)
        .cursor(&index, &config)
        .unwrap()
        .unwrap();
    assert_eq!(
        drain(cursor),
        vec![(1, vec![NodePath::from([0])]), (2, vec![])]
    );
}

#[test]
fn tuple_groups_clauses_under_the_same_parent() {
    let mut index = MemoryIndex::new();
    // doc 1: "name" and "value" under the same parent {0}
    index.index_node(1, [0, 0], "name");
    index.index_node(1, [0, 1], "value");
    // doc 2: same terms but under different parents
    index.index_node(2, [0, 0], "name");
    index.index_node(2, [1, 0], "value");
    let config = EngineConfig::default();
    let tuple = TupleQuery::new(&config)
        .add(Occur::Must, NodeQuery::term("name"))
        .unwrap()
        .add(Occur::Must, NodeQuery::term("value"))
        .unwrap();
    let cursor = NodeQuery::from(tuple)
        .cursor(&index, &config)
        .unwrap()
        .unwrap();
    assert_eq!(
        drain(cursor),
        vec![(1, vec![NodePath::from([0])]), (2, vec![])]
    );
}

#[test]
fn tuple_must_not_rejects_the_shared_parent() {
    let mut index = MemoryIndex::new();
    index.index_node(1, [0, 0], "name");
    index.index_node(1, [0, 1], "forbidden");
    index.index_node(1, [1, 0], "name");
    let config = EngineConfig::default();
    let tuple = TupleQuery::new(&config)
        .add(Occur::Must, NodeQuery::term("name"))
        .unwrap()
        .add(Occur::MustNot, NodeQuery::term("forbidden"))
        .unwrap();
    let cursor = NodeQuery::from(tuple)
        .cursor(&index, &config)
        .unwrap()
        .unwrap();
    // parent {0} contains a forbidden cell, parent {1} does not
    assert_eq!(drain(cursor), vec![(1, vec![NodePath::from([1])])]);
}

#[test]
fn optional_clause_raises_the_parents_score() {
    let mut index = MemoryIndex::new();
    index.index_node(1, [0, 0], "name");
    index.index_node(2, [0, 0], "name");
    index.index_node(2, [0, 1], "extra");
    let config = EngineConfig::default();
    let tuple = TupleQuery::new(&config)
        .add(Occur::Must, NodeQuery::term("name"))
        .unwrap()
        .add(Occur::Should, NodeQuery::term("extra"))
        .unwrap();
    let query = NodeQuery::from(tuple);
    let mut cursor = query.cursor(&index, &config).unwrap().unwrap();
    assert!(cursor.next_candidate().unwrap());
    assert_eq!(cursor.doc(), DocMark::At(1));
    assert!(cursor.next_node().unwrap());
    let plain = cursor.score_in_node().unwrap();
    assert!(cursor.next_candidate().unwrap());
    assert_eq!(cursor.doc(), DocMark::At(2));
    assert!(cursor.next_node().unwrap());
    let boosted = cursor.score_in_node().unwrap();
    assert!(boosted > plain, "{} should exceed {}", boosted, plain);
}

#[test]
fn projection_collapses_runs_of_descendants() {
    let mut index = MemoryIndex::new();
    index.index_node(1, [0, 0], "ccc");
    index.index_node(1, [0, 1], "ccc");
    index.index_node(1, [1, 0], "ccc");
    let config = EngineConfig::default();
    let query = NodeQuery::from(ProjectionQuery::new(NodeQuery::term("ccc"), 1));
    let cursor = query.cursor(&index, &config).unwrap().unwrap();
    // {0,0} and {0,1} collapse onto {0}; {1,0} projects onto {1}
    assert_eq!(
        drain(cursor),
        vec![(1, vec![NodePath::from([0]), NodePath::from([1])])]
    );
}

#[test]
fn rootless_single_clause_twig_equals_the_projected_clause() {
    let mut index = MemoryIndex::new();
    index.index_node(1, [0, 0], "ccc");
    index.index_node(2, [3, 1], "ccc");
    index.index_node(3, [0, 0], "other");
    let config = EngineConfig::default();

    let twig = TupleQuery::new(&config)
        .add(Occur::Must, NodeQuery::term("ccc"))
        .unwrap();
    let rewritten = NodeQuery::from(twig).rewrite();
    let via_twig = drain(rewritten.cursor(&index, &config).unwrap().unwrap());

    let projection = NodeQuery::from(ProjectionQuery::new(
        NodeQuery::Term(sylva::query::TermQuery::new("ccc").with_level(2)),
        1,
    ));
    let direct = drain(projection.cursor(&index, &config).unwrap().unwrap());

    assert_eq!(via_twig, direct);
    assert_eq!(
        via_twig,
        vec![
            (1, vec![NodePath::from([0])]),
            (2, vec![NodePath::from([3])]),
        ]
    );
}

#[test]
fn deeper_root_levels_work_the_same_way() {
    let mut index = MemoryIndex::new();
    index.index_node(9, [0, 4], "section");
    index.index_node(9, [0, 4, 2, 0], "needle");
    let config = EngineConfig::default();
    let twig = TwigQuery::new(&config, 2)
        .with_root(NodeQuery::term("section"))
        .descendant(Occur::Must, 4, NodeQuery::term("needle"))
        .unwrap();
    let cursor = NodeQuery::from(twig)
        .cursor(&index, &config)
        .unwrap()
        .unwrap();
    assert_eq!(drain(cursor), vec![(9, vec![NodePath::from([0, 4])])]);
}
