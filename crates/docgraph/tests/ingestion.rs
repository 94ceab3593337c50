//! Tests for batch ingestion: idempotency, uniqueness and skip reporting.

mod common;

use common::{foo_bar_batch, method_id, open_temp};
use docgraph::{BatchStatus, DocGraph, IndexStats, ProjectBatch, SkipKind};
use proptest::prelude::*;

fn entity_counts(graph: &DocGraph) -> (usize, usize, usize, usize) {
    let IndexStats {
        projects,
        documents,
        classes,
        methods,
        ..
    } = graph.stats().expect("stats");
    (projects, documents, classes, methods)
}

// === Idempotency ===

#[test]
fn reingesting_same_batch_keeps_entity_counts() {
    let (_dir, graph) = open_temp();

    graph.ingest(&foo_bar_batch()).expect("first ingest");
    let once = entity_counts(&graph);
    graph.ingest(&foo_bar_batch()).expect("second ingest");

    assert_eq!(entity_counts(&graph), once);
    assert_eq!(once, (1, 1, 1, 2));
}

#[test]
fn reingesting_updates_body_in_place() {
    let (_dir, graph) = open_temp();
    graph.ingest(&foo_bar_batch()).expect("first ingest");
    let foo = method_id(&graph, "P.C.Foo()");

    let changed = ProjectBatch::new("P", "d.cs")
        .class("P.C")
        .method("P.C.Foo()", "return 2;");
    let report = graph.ingest(&changed).expect("second ingest");

    assert_eq!(report.methods_updated, 1);
    assert_eq!(report.methods_inserted, 0);
    let detail = graph.method_by_id(foo).expect("method by id");
    assert_eq!(detail.method_body, "return 2;");
}

#[test]
fn repeated_calls_are_stored_as_separate_edges() {
    let (_dir, graph) = open_temp();

    graph.ingest(&foo_bar_batch()).expect("first ingest");
    graph.ingest(&foo_bar_batch()).expect("second ingest");

    assert_eq!(graph.stats().expect("stats").method_calls, 2);
}

// === Uniqueness ===

#[test]
fn same_project_in_two_documents_shares_one_project_row() {
    let (_dir, graph) = open_temp();

    let first = graph
        .ingest(&ProjectBatch::new("P", "a.cs").class("P.A"))
        .expect("ingest a.cs");
    let second = graph
        .ingest(&ProjectBatch::new("P", "b.cs").class("P.B"))
        .expect("ingest b.cs");

    let stats = graph.stats().expect("stats");
    assert_eq!(stats.projects, 1);
    assert_eq!(stats.documents, 2);
    assert_eq!(first.project_id, second.project_id);
    assert_ne!(first.document_id, second.document_id);
}

#[test]
fn existing_class_is_reused_from_another_document() {
    let (_dir, graph) = open_temp();

    graph
        .ingest(&ProjectBatch::new("P", "a.cs").class("P.Partial"))
        .expect("ingest a.cs");
    graph
        .ingest(
            &ProjectBatch::new("P", "b.cs")
                .class("P.Partial")
                .method("P.Partial.Second()", ""),
        )
        .expect("ingest b.cs");

    let classes = graph.store().list_classes().expect("list classes");
    assert_eq!(classes.len(), 1);
    let methods = graph.store().list_methods().expect("list methods");
    assert_eq!(methods[0].class_id, classes[0].id);
}

// === Skips ===

#[test]
fn method_outside_batch_classes_is_skipped_not_fatal() {
    let (_dir, graph) = open_temp();

    let report = graph
        .ingest(
            &ProjectBatch::new("P", "d.cs")
                .class("P.C")
                .method("P.C.Kept()", "")
                .method("P.Other.Dropped()", ""),
        )
        .expect("ingest");

    assert_eq!(report.methods_inserted, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].kind, SkipKind::Method);
    assert_eq!(report.skipped[0].reference, "P.Other.Dropped()");
}

#[test]
fn call_to_unknown_method_is_skipped_not_fatal() {
    let (_dir, graph) = open_temp();

    let batch = foo_bar_batch().call("P.C.Bar()", "Console.WriteLine");
    let report = graph.ingest(&batch).expect("ingest");

    assert_eq!(report.calls_inserted, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].kind, SkipKind::Call);
    assert!(report.skipped[0].reference.contains("Console.WriteLine"));
}

#[test]
fn call_to_method_from_earlier_batch_resolves() {
    let (_dir, graph) = open_temp();
    graph
        .ingest(
            &ProjectBatch::new("P", "lib.cs")
                .class("P.Lib")
                .method("P.Lib.Helper(int)", ""),
        )
        .expect("ingest lib.cs");

    let report = graph
        .ingest(
            &ProjectBatch::new("P", "app.cs")
                .class("P.App")
                .method("P.App.Main()", "Lib.Helper(1);")
                .call("P.App.Main()", "P.Lib.Helper"),
        )
        .expect("ingest app.cs");

    assert_eq!(report.calls_inserted, 1);
    assert!(report.skipped.is_empty());
}

// === Validation and batch lists ===

#[test]
fn empty_document_is_rejected_before_writing() {
    let (_dir, graph) = open_temp();

    let err = graph
        .ingest(&ProjectBatch::new("P", "").class("P.C"))
        .expect_err("empty document should fail");

    assert!(err.is_validation());
    assert_eq!(graph.stats().expect("stats"), IndexStats::default());
}

#[test]
fn invalid_batch_in_list_prevents_any_write() {
    let (_dir, graph) = open_temp();

    let err = graph
        .ingest_all(&[foo_bar_batch(), ProjectBatch::new("", "x.cs")])
        .expect_err("second batch is invalid");

    assert!(err.is_validation());
    assert_eq!(graph.stats().expect("stats").projects, 0);
}

#[test]
fn store_failure_keeps_earlier_batches_and_skips_later_ones() {
    let (_dir, graph) = open_temp();
    let conn = rusqlite::Connection::open(graph.db_path()).expect("open raw connection");
    conn.execute_batch(
        "CREATE TRIGGER reject_calls BEFORE INSERT ON method_calls
         BEGIN SELECT RAISE(ABORT, 'calls are read-only'); END;",
    )
    .expect("install trigger");
    drop(conn);

    let first = ProjectBatch::new("P", "a.cs")
        .class("P.A")
        .method("P.A.Run()", "return;");
    let failing = ProjectBatch::new("P", "b.cs")
        .class("P.B")
        .method("P.B.Go()", "Run();")
        .call("P.B.Go()", "P.A.Run()");
    let later = ProjectBatch::new("P", "c.cs")
        .class("P.D")
        .method("P.D.Stop()", "return;");

    let err = graph
        .ingest_all(&[first, failing, later])
        .expect_err("trigger should abort the second batch");

    assert!(matches!(err, docgraph::Error::Database(_)));
    assert_eq!(
        graph.stats().expect("stats"),
        IndexStats {
            projects: 1,
            documents: 1,
            classes: 1,
            methods: 1,
            method_calls: 0,
        }
    );
    let paths: Vec<String> = graph
        .store()
        .list_documents()
        .expect("list documents")
        .into_iter()
        .map(|d| d.path)
        .collect();
    assert_eq!(paths, vec!["a.cs".to_string()]);
}

#[test]
fn batch_outcome_reports_project_id() {
    let (_dir, graph) = open_temp();

    let reports = graph.ingest_all(&[foo_bar_batch()]).expect("ingest");
    let outcome = reports[0].outcome();

    assert_eq!(outcome.status, BatchStatus::Success);
    let project = &graph.store().list_projects().expect("list projects")[0];
    assert_eq!(outcome.id, project.id.as_i64());
    assert_eq!(
        serde_json::to_value(outcome).expect("serialize"),
        serde_json::json!({"id": project.id.as_i64(), "status": "success"})
    );
}

#[test]
fn parser_json_with_pascal_case_fields_ingests() {
    let (_dir, graph) = open_temp();

    let reports = graph
        .ingest_json(
            r#"[{
                "Project": "P",
                "Document": "d.cs",
                "Classes": ["P.C"],
                "Methods": [{"Signature": "P.C.Foo()", "Body": "return 1;"}],
                "Calls": []
            }]"#,
        )
        .expect("ingest json");

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].methods_inserted, 1);
}

#[test]
fn parser_line_span_is_stored_and_refreshed() {
    let (_dir, graph) = open_temp();
    let batch = |start: u32, end: u32| {
        format!(
            r#"{{
                "Project": "P",
                "Document": "d.cs",
                "Classes": ["P.C"],
                "Methods": [{{
                    "Signature": "int P.C.Add(int a, int b)",
                    "Body": "return a + b;",
                    "StartLine": {start},
                    "EndLine": {end}
                }}]
            }}"#
        )
    };

    graph.ingest_json(&batch(10, 12)).expect("first ingest");
    graph.ingest_json(&batch(14, 16)).expect("second ingest");

    let methods = graph.store().list_methods().expect("list methods");
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].name, "Add(int a, int b)");
    assert_eq!(methods[0].start_line, Some(14));
    assert_eq!(methods[0].end_line, Some(16));
}

#[test]
fn line_span_is_optional() {
    let (_dir, graph) = open_temp();
    graph.ingest(&foo_bar_batch()).expect("ingest");

    let methods = graph.store().list_methods().expect("list methods");
    assert!(methods.iter().all(|m| m.start_line.is_none()));
    assert!(methods.iter().all(|m| m.end_line.is_none()));
}

#[test]
fn malformed_json_is_a_json_error() {
    let (_dir, graph) = open_temp();

    let err = graph.ingest_json("{not json").expect_err("should fail");

    assert!(matches!(err, docgraph::Error::Json(_)));
}

#[test]
fn clear_removes_every_row_and_index_stays_usable() {
    let (_dir, graph) = open_temp();
    graph.ingest(&foo_bar_batch()).expect("ingest");

    graph.clear().expect("clear");
    assert_eq!(graph.stats().expect("stats"), IndexStats::default());

    graph.ingest(&foo_bar_batch()).expect("ingest after clear");
    assert_eq!(graph.stats().expect("stats").methods, 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn ingestion_is_idempotent_for_generated_batches(
        names in prop::collection::btree_set("[A-Z][a-z]{1,6}", 1..6),
        repeats in 2usize..4,
    ) {
        let (_dir, graph) = open_temp();
        let mut batch = ProjectBatch::new("Gen", "gen.cs").class("Gen.K");
        for name in &names {
            batch = batch.method(format!("Gen.K.{name}()"), format!("// {name}"));
        }

        graph.ingest(&batch).expect("first ingest");
        let once = entity_counts(&graph);
        for _ in 1..repeats {
            graph.ingest(&batch).expect("repeat ingest");
        }

        prop_assert_eq!(entity_counts(&graph), once);
        prop_assert_eq!(once.3, names.len());
    }
}
