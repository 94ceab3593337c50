//! Shared helpers for docgraph integration tests.

#![allow(dead_code)]

use docgraph::{Config, DocGraph, MethodId, ProjectBatch};
use tempfile::TempDir;

/// Open a fresh index in a temporary directory.
///
/// The directory must outlive the returned graph.
pub fn open_temp() -> (TempDir, DocGraph) {
    let dir = TempDir::new().expect("create temp dir");
    let config = Config::with_database_path(dir.path().join("index.db"));
    let graph = DocGraph::open(&config).expect("open index");
    (dir, graph)
}

/// The `P` / `d.cs` batch: `Bar` calls `Foo`.
pub fn foo_bar_batch() -> ProjectBatch {
    ProjectBatch::new("P", "d.cs")
        .class("P.C")
        .method("P.C.Foo()", "return 1;")
        .method("P.C.Bar()", "Foo();")
        .call("P.C.Bar()", "P.C.Foo()")
}

/// Id of the method stored under `signature`.
pub fn method_id(graph: &DocGraph, signature: &str) -> MethodId {
    graph
        .store()
        .list_methods()
        .expect("list methods")
        .into_iter()
        .find(|m| m.signature == signature)
        .unwrap_or_else(|| panic!("method {signature} should be indexed"))
        .id
}
