use criterion::{Criterion, black_box, criterion_group, criterion_main};

use sylva::config::EngineConfig;
use sylva::cursor::NodeCursor;
use sylva::index::MemoryIndex;
use sylva::query::{BooleanQuery, NodeQuery, Occur, TwigQuery};

// Synthetic catalog: one root node per document, four children with
// overlapping vocabulary so merges actually have work to do.
fn build_index(docs: u64) -> MemoryIndex {
    let mut index = MemoryIndex::new();
    for doc in 0..docs {
        index.index_node(doc, [0], "record");
        for child in 0..4u32 {
            let text = match (doc + child as u64) % 3 {
                0 => "alpha beta",
                1 => "beta gamma",
                _ => "gamma alpha",
            };
            index.index_node(doc, [0, child], text);
        }
        if doc % 3 == 0 {
            index.index_node(doc, [0, 4], "flagged");
        }
    }
    index
}

fn count_matches(query: &NodeQuery, index: &MemoryIndex, config: &EngineConfig) -> usize {
    let mut matches = 0;
    if let Some(mut cursor) = query.cursor(index, config).unwrap() {
        while cursor.next_candidate().unwrap() {
            while cursor.next_node().unwrap() {
                matches += 1;
            }
        }
    }
    matches
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let config = EngineConfig::default();
    for &size in &[1_000u64, 10_000] {
        let index = build_index(size);

        let conjunction = NodeQuery::from(
            BooleanQuery::new(&config)
                .must(NodeQuery::term("alpha"))
                .unwrap()
                .must(NodeQuery::term("beta"))
                .unwrap(),
        );
        c.bench_function(&format!("conjunction {}", size), |b| {
            b.iter(|| black_box(count_matches(&conjunction, &index, &config)))
        });

        let disjunction = NodeQuery::from(
            BooleanQuery::new(&config)
                .should(NodeQuery::term("alpha"))
                .unwrap()
                .should(NodeQuery::term("gamma"))
                .unwrap(),
        );
        c.bench_function(&format!("disjunction {}", size), |b| {
            b.iter(|| black_box(count_matches(&disjunction, &index, &config)))
        });

        let twig = NodeQuery::from(
            TwigQuery::new(&config, 1)
                .with_root(NodeQuery::term("record"))
                .child(Occur::Must, NodeQuery::term("alpha"))
                .unwrap()
                .child(Occur::MustNot, NodeQuery::term("flagged"))
                .unwrap(),
        )
        .rewrite();
        c.bench_function(&format!("twig {}", size), |b| {
            b.iter(|| black_box(count_matches(&twig, &index, &config)))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
