use sylva::config::EngineConfig;
use sylva::error::SylvaError;
use sylva::node::{DocMark, NodeMark, NodePath};
use sylva::query::{BooleanQuery, NodeQuery, Occur, TwigQuery};

#[test]
fn defaults_are_sensible() {
    let config = EngineConfig::default();
    assert_eq!(config.max_clauses, 1024);
    assert!(config.coordination);
    assert!(config.validate().is_ok());
}

#[test]
fn zero_clause_limit_is_rejected() {
    let config = EngineConfig {
        max_clauses: 0,
        coordination: true,
    };
    assert!(matches!(config.validate(), Err(SylvaError::Config(_))));
}

#[test]
fn load_without_any_source_falls_back_to_defaults() {
    // no sylva config file ships with the repository and the test
    // environment sets no SYLVA_* variables
    let config = EngineConfig::load().expect("defaults load");
    assert_eq!(config.max_clauses, EngineConfig::default().max_clauses);
}

#[test]
fn descendant_level_must_lie_below_the_root() {
    let config = EngineConfig::default();
    let twig = TwigQuery::new(&config, 2);
    let err = match twig.descendant(Occur::Must, 2, NodeQuery::term("x")) {
        Ok(_) => panic!("descendant at the root level must be refused"),
        Err(e) => e,
    };
    assert!(matches!(err, SylvaError::Config(_)));
}

#[test]
fn twig_clause_limit_matches_the_configuration() {
    let config = EngineConfig {
        max_clauses: 1,
        ..EngineConfig::default()
    };
    let twig = TwigQuery::new(&config, 1)
        .child(Occur::Must, NodeQuery::term("a"))
        .unwrap();
    assert!(matches!(
        twig.child(Occur::Must, NodeQuery::term("b")),
        Err(SylvaError::TooManyClauses { .. })
    ));
}

#[test]
fn boolean_constraint_changes_repropagate_to_existing_clauses() {
    let config = EngineConfig::default();
    let query = BooleanQuery::new(&config)
        .must(NodeQuery::term("alpha"))
        .unwrap()
        .with_level(4);
    for clause in query.clauses() {
        assert_eq!(clause.query().constraints().level(), Some(4));
    }
    let query = query
        .with_interval(NodePath::from([1]), NodePath::from([2]))
        .unwrap();
    for clause in query.clauses() {
        assert_eq!(clause.query().constraints().lower(), Some(&NodePath::from([1])));
        assert_eq!(clause.query().constraints().upper(), Some(&NodePath::from([2])));
    }
}

#[test]
fn node_path_ordering_is_lexicographic() {
    let a = NodePath::from([0]);
    let b = NodePath::from([0, 0]);
    let c = NodePath::from([0, 1]);
    let d = NodePath::from([1]);
    assert!(a < b && b < c && c < d);
    assert_eq!(NodePath::from([2, 3]).ancestor(1), NodePath::from([2]));
    assert_eq!(NodePath::from([2]).ancestor(3), NodePath::from([2]));
    assert!(NodePath::from([2, 3]).is_under(&NodePath::from([2])));
    assert!(!NodePath::from([3]).is_under(&NodePath::from([2])));
}

#[test]
fn cursor_marks_order_sentinels_around_real_positions() {
    assert!(DocMark::Unstarted < DocMark::At(0));
    assert!(DocMark::At(u64::MAX) < DocMark::Done);
    assert!(NodeMark::Pending < NodeMark::At(NodePath::from([0])));
    assert!(NodeMark::At(NodePath::from([9, 9])) < NodeMark::Done);
}
