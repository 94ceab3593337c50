//! Integration tests for shared access to one index from several threads.
//!
//! Each operation takes its own pooled connection, so a cloned `Store` (or a
//! shared `DocGraph`) may be used from any number of threads.

mod common;

use std::sync::Arc;
use std::thread;

use common::{foo_bar_batch, method_id, open_temp};
use docgraph::{CallGraphOps, ProjectBatch};

#[test]
fn concurrent_queries_return_consistent_results() {
    let (_dir, graph) = open_temp();
    graph.ingest(&foo_bar_batch()).expect("ingest");
    let bar = method_id(&graph, "P.C.Bar()");
    let graph = Arc::new(graph);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let graph = Arc::clone(&graph);
            thread::spawn(move || {
                let mut seen = Vec::new();
                for _ in 0..20 {
                    let used = graph.used_methods(bar).expect("callees");
                    seen.push(used.used_methods.len());
                    graph.graph().expect("full graph");
                }
                seen
            })
        })
        .collect();

    for handle in handles {
        let seen = handle.join().expect("query thread should not panic");
        assert!(seen.iter().all(|&n| n == 1));
    }
}

#[test]
fn concurrent_ingestion_of_distinct_documents_keeps_all_rows() {
    let (_dir, graph) = open_temp();
    let store = graph.store().clone();

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let store = store.clone();
            thread::spawn(move || {
                let class = format!("P.K{n}");
                let batch = ProjectBatch::new("P", format!("k{n}.cs"))
                    .class(class.clone())
                    .method(format!("{class}.Run()"), "Step();")
                    .method(format!("{class}.Step()"), "")
                    .call(format!("{class}.Run()"), format!("{class}.Step()"));
                store.ingest(&batch).expect("ingest from thread")
            })
        })
        .collect();

    for handle in handles {
        let report = handle.join().expect("ingest thread should not panic");
        assert!(report.skipped.is_empty());
    }

    let stats = graph.stats().expect("stats");
    assert_eq!(stats.projects, 1);
    assert_eq!(stats.documents, 4);
    assert_eq!(stats.methods, 8);
    assert_eq!(stats.method_calls, 4);
    assert_eq!(store.full_graph().expect("full graph").len(), 8);
}
