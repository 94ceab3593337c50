//! Graph queries and table listings implemented directly on `Store`.
//!
//! Every query acquires its own pooled connection and only reads.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::trace;

use super::Store;
use super::helpers::{
    CLASSES_COLUMNS, DOCUMENTS_COLUMNS, METHOD_CALLS_COLUMNS, METHODS_COLUMNS, PROJECTS_COLUMNS,
    parse_edge_list, row_to_class, row_to_document, row_to_method, row_to_method_call,
    row_to_method_ref, row_to_project,
};
use crate::batch::require;
use crate::error::{Error, Result};
use crate::graph::CallGraphOps;
use crate::types::{
    Class, ClassId, Document, DocumentId, GraphRow, Method, MethodCall, MethodDetail, MethodId,
    MethodRef, MethodSource, Project, ProjectId, method_text,
};

/// Direct callees: follow edges out of `?1`.
const CALLEES_SQL: &str = "
    SELECT m.id, m.signature, d.path
    FROM method_calls mc
    JOIN methods m ON m.id = mc.callee_id
    JOIN classes c ON c.id = m.class_id
    JOIN documents d ON d.id = c.document_id
    WHERE mc.caller_id = ?1
    GROUP BY m.id
    ORDER BY m.id";

/// Direct callers: follow edges into `?1`.
const CALLERS_SQL: &str = "
    SELECT m.id, m.signature, d.path
    FROM method_calls mc
    JOIN methods m ON m.id = mc.caller_id
    JOIN classes c ON c.id = m.class_id
    JOIN documents d ON d.id = c.document_id
    WHERE mc.callee_id = ?1
    GROUP BY m.id
    ORDER BY m.id";

/// Every method with its context and distinct neighbours.
///
/// The two LEFT JOIN chains multiply rows per method; `DISTINCT` inside each
/// aggregate collapses both the cross product and duplicate edges. Objects
/// are concatenated as text and wrapped in brackets, which yields `NULL` for
/// a method without edges.
const FULL_GRAPH_SQL: &str = "
    SELECT
        prj.id, prj.name,
        doc.id, doc.path,
        cls.id, cls.name,
        m.id, m.name, m.signature, m.body,
        '[' || group_concat(DISTINCT json_object('id', callee.id, 'signature', callee.signature))
            FILTER (WHERE callee.id IS NOT NULL) || ']' AS callees,
        '[' || group_concat(DISTINCT json_object('id', caller.id, 'signature', caller.signature))
            FILTER (WHERE caller.id IS NOT NULL) || ']' AS callers
    FROM methods m
        JOIN classes cls ON cls.id = m.class_id
        JOIN documents doc ON doc.id = cls.document_id
        JOIN projects prj ON prj.id = doc.project_id
        LEFT JOIN method_calls out_edge ON out_edge.caller_id = m.id
        LEFT JOIN methods callee ON callee.id = out_edge.callee_id
        LEFT JOIN method_calls in_edge ON in_edge.callee_id = m.id
        LEFT JOIN methods caller ON caller.id = in_edge.caller_id
    GROUP BY m.id
    ORDER BY m.id";

impl CallGraphOps for Store {
    fn callees(&self, method_id: MethodId) -> Result<Vec<MethodRef>> {
        trace!(method_id = %method_id, "Fetching callees");
        let conn = self.connection()?;
        ensure_method_exists(&conn, method_id)?;
        neighbours(&conn, CALLEES_SQL, method_id)
    }

    fn callers(&self, method_id: MethodId) -> Result<Vec<MethodRef>> {
        trace!(method_id = %method_id, "Fetching callers");
        let conn = self.connection()?;
        ensure_method_exists(&conn, method_id)?;
        neighbours(&conn, CALLERS_SQL, method_id)
    }

    fn full_graph(&self) -> Result<Vec<GraphRow>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(FULL_GRAPH_SQL)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(GraphRow {
                    project_id: ProjectId(row.get(0)?),
                    project_name: row.get(1)?,
                    document_id: DocumentId(row.get(2)?),
                    document_path: row.get(3)?,
                    class_id: ClassId(row.get(4)?),
                    class_name: row.get(5)?,
                    method_id: MethodId(row.get(6)?),
                    method_name: row.get(7)?,
                    method_signature: row.get(8)?,
                    method_body: row.get(9)?,
                    callees: parse_edge_list(10, row.get::<_, Option<String>>(10)?.as_deref())?,
                    callers: parse_edge_list(11, row.get::<_, Option<String>>(11)?.as_deref())?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        trace!(methods = rows.len(), "Built full graph");
        Ok(rows)
    }

    fn method_by_signature(&self, signature: &str, document_path: &str) -> Result<MethodSource> {
        require("signature", signature)?;
        require("document", document_path)?;

        let conn = self.connection()?;
        let found: Option<(i64, String, String)> = conn
            .query_row(
                "SELECT m.id, m.signature, m.body
                 FROM methods m
                 JOIN classes c ON c.id = m.class_id
                 JOIN documents d ON d.id = c.document_id
                 WHERE m.signature = ?1 AND d.path = ?2",
                params![signature, document_path],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let (id, signature, body) = found.ok_or_else(|| {
            Error::NotFound(format!("method {signature} in document {document_path}"))
        })?;
        Ok(MethodSource {
            method: method_text(&signature, &body),
            method_id: MethodId(id),
        })
    }

    fn method_by_id(&self, method_id: MethodId) -> Result<MethodDetail> {
        let conn = self.connection()?;
        conn.query_row(
            "SELECT id, signature, body FROM methods WHERE id = ?1",
            [method_id.as_i64()],
            |row| {
                Ok(MethodDetail {
                    method_id: MethodId(row.get(0)?),
                    method_signature: row.get(1)?,
                    method_body: row.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("method id {method_id}")))
    }
}

fn ensure_method_exists(conn: &Connection, method_id: MethodId) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM methods WHERE id = ?1)",
        [method_id.as_i64()],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(Error::NotFound(format!("method id {method_id}")))
    }
}

fn neighbours(conn: &Connection, sql: &str, method_id: MethodId) -> Result<Vec<MethodRef>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt
        .query_map([method_id.as_i64()], row_to_method_ref)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// === Table listings ===

impl Store {
    /// All projects in id order.
    ///
    /// # Errors
    ///
    /// Returns an error on store failure.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let conn = self.connection()?;
        list(&conn, "projects", PROJECTS_COLUMNS, row_to_project)
    }

    /// All documents in id order.
    ///
    /// # Errors
    ///
    /// Returns an error on store failure.
    pub fn list_documents(&self) -> Result<Vec<Document>> {
        let conn = self.connection()?;
        list(&conn, "documents", DOCUMENTS_COLUMNS, row_to_document)
    }

    /// All classes in id order.
    ///
    /// # Errors
    ///
    /// Returns an error on store failure.
    pub fn list_classes(&self) -> Result<Vec<Class>> {
        let conn = self.connection()?;
        list(&conn, "classes", CLASSES_COLUMNS, row_to_class)
    }

    /// All methods in id order.
    ///
    /// # Errors
    ///
    /// Returns an error on store failure.
    pub fn list_methods(&self) -> Result<Vec<Method>> {
        let conn = self.connection()?;
        list(&conn, "methods", METHODS_COLUMNS, row_to_method)
    }

    /// All call edges in id order, duplicates included.
    ///
    /// # Errors
    ///
    /// Returns an error on store failure.
    pub fn list_method_calls(&self) -> Result<Vec<MethodCall>> {
        let conn = self.connection()?;
        list(
            &conn,
            "method_calls",
            METHOD_CALLS_COLUMNS,
            row_to_method_call,
        )
    }
}

fn list<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    convert: fn(&rusqlite::Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(&format!("SELECT {columns} FROM {table} ORDER BY id"))?;
    let rows = stmt
        .query_map([], convert)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ProjectBatch;
    use crate::db::tests::temp_store;
    use crate::types::EdgeRef;

    fn id_of(store: &Store, signature: &str) -> MethodId {
        store
            .list_methods()
            .unwrap()
            .into_iter()
            .find(|m| m.signature == signature)
            .map(|m| m.id)
            .unwrap_or_else(|| panic!("{signature} should be stored"))
    }

    #[test]
    fn callees_of_unknown_method_is_not_found() {
        let (_dir, store) = temp_store();

        let err = store.callees(MethodId(99)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn callers_of_method_without_edges_is_empty() {
        let (_dir, store) = temp_store();
        store
            .ingest(
                &ProjectBatch::new("P", "d.cs")
                    .class("P.C")
                    .method("P.C.Lonely()", ""),
            )
            .unwrap();

        let callers = store.callers(id_of(&store, "P.C.Lonely()")).unwrap();
        assert!(callers.is_empty());
    }

    #[test]
    fn full_graph_collapses_cross_product_of_callees_and_callers() {
        let (_dir, store) = temp_store();
        store
            .ingest(
                &ProjectBatch::new("P", "d.cs")
                    .class("P.C")
                    .method("P.C.Mid()", "")
                    .method("P.C.Up1()", "")
                    .method("P.C.Up2()", "")
                    .method("P.C.Down1()", "")
                    .method("P.C.Down2()", "")
                    .call("P.C.Up1()", "P.C.Mid()")
                    .call("P.C.Up2()", "P.C.Mid()")
                    .call("P.C.Mid()", "P.C.Down1()")
                    .call("P.C.Mid()", "P.C.Down2()"),
            )
            .unwrap();

        let graph = store.full_graph().unwrap();
        let mid = graph
            .iter()
            .find(|r| r.method_signature == "P.C.Mid()")
            .unwrap();

        assert_eq!(mid.callees.len(), 2);
        assert_eq!(mid.callers.len(), 2);
        assert_eq!(
            mid.callers[0],
            EdgeRef {
                id: id_of(&store, "P.C.Up1()"),
                signature: "P.C.Up1()".to_string(),
            }
        );
    }

    #[test]
    fn full_graph_signature_with_quotes_round_trips() {
        let (_dir, store) = temp_store();
        store
            .ingest(
                &ProjectBatch::new("P", "d.cs")
                    .class("P.C")
                    .method("P.C.Say(string s = \"a,b\")", "")
                    .method("P.C.Main()", "")
                    .call("P.C.Main()", "P.C.Say"),
            )
            .unwrap();

        let graph = store.full_graph().unwrap();
        let main = graph
            .iter()
            .find(|r| r.method_signature == "P.C.Main()")
            .unwrap();
        assert_eq!(main.callees[0].signature, "P.C.Say(string s = \"a,b\")");
    }

    #[test]
    fn method_by_signature_requires_fields() {
        let (_dir, store) = temp_store();

        let err = store.method_by_signature("", "d.cs").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn method_by_signature_is_scoped_to_document() {
        let (_dir, store) = temp_store();
        store
            .ingest(
                &ProjectBatch::new("P", "a.cs")
                    .class("P.C")
                    .method("P.C.Foo()", "a"),
            )
            .unwrap();

        assert!(store.method_by_signature("P.C.Foo()", "a.cs").is_ok());
        let err = store.method_by_signature("P.C.Foo()", "b.cs").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn method_by_id_returns_body() {
        let (_dir, store) = temp_store();
        store
            .ingest(
                &ProjectBatch::new("P", "d.cs")
                    .class("P.C")
                    .method("P.C.Foo()", "return 1;"),
            )
            .unwrap();

        let id = id_of(&store, "P.C.Foo()");
        let detail = store.method_by_id(id).unwrap();
        assert_eq!(detail.method_body, "return 1;");
        let missing = store.method_by_id(MethodId(id.as_i64() + 100));
        assert!(missing.unwrap_err().is_not_found());
    }

    #[test]
    fn listings_return_rows_in_id_order() {
        let (_dir, store) = temp_store();
        store
            .ingest(
                &ProjectBatch::new("P", "d.cs")
                    .class("P.C")
                    .class("P.D")
                    .method("P.C.A()", "")
                    .method("P.D.B()", "")
                    .call("P.C.A()", "P.D.B()")
                    .call("P.C.A()", "P.D.B()"),
            )
            .unwrap();

        assert_eq!(store.list_projects().unwrap().len(), 1);
        let classes = store.list_classes().unwrap();
        assert_eq!(classes[0].name, "P.C");
        assert_eq!(classes[1].name, "P.D");
        assert_eq!(store.list_method_calls().unwrap().len(), 2);
    }
}
