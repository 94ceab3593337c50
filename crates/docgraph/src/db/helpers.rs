//! Helper functions for database row conversion.
//!
//! These utilities convert rows into domain types. Also provides SQL column
//! list constants so queries and converters agree on column order.

use rusqlite::Row;

use crate::types::{
    Class, ClassId, Document, DocumentId, EdgeRef, Method, MethodCall, MethodId, MethodRef,
    Project, ProjectId,
};

/// SQL column list for projects table.
pub(crate) const PROJECTS_COLUMNS: &str = "id, name";

/// SQL column list for documents table.
pub(crate) const DOCUMENTS_COLUMNS: &str = "id, project_id, path";

/// SQL column list for classes table.
pub(crate) const CLASSES_COLUMNS: &str = "id, document_id, name";

/// SQL column list for methods table.
///
/// Use with `row_to_method` for consistent column ordering.
pub(crate) const METHODS_COLUMNS: &str =
    "id, class_id, name, signature, body, start_line, end_line";

/// SQL column list for `method_calls` table.
pub(crate) const METHOD_CALLS_COLUMNS: &str = "id, caller_id, callee_id";

pub(crate) fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: ProjectId(row.get(0)?),
        name: row.get(1)?,
    })
}

pub(crate) fn row_to_document(row: &Row) -> rusqlite::Result<Document> {
    Ok(Document {
        id: DocumentId(row.get(0)?),
        project_id: ProjectId(row.get(1)?),
        path: row.get(2)?,
    })
}

pub(crate) fn row_to_class(row: &Row) -> rusqlite::Result<Class> {
    Ok(Class {
        id: ClassId(row.get(0)?),
        document_id: DocumentId(row.get(1)?),
        name: row.get(2)?,
    })
}

pub(crate) fn row_to_method(row: &Row) -> rusqlite::Result<Method> {
    Ok(Method {
        id: MethodId(row.get(0)?),
        class_id: ClassId(row.get(1)?),
        name: row.get(2)?,
        signature: row.get(3)?,
        body: row.get(4)?,
        start_line: row.get(5)?,
        end_line: row.get(6)?,
    })
}

pub(crate) fn row_to_method_call(row: &Row) -> rusqlite::Result<MethodCall> {
    Ok(MethodCall {
        id: row.get::<_, i64>(0)?.into(),
        caller_id: MethodId(row.get(1)?),
        callee_id: MethodId(row.get(2)?),
    })
}

/// Convert a `(method_id, method_signature, document_path)` row.
pub(crate) fn row_to_method_ref(row: &Row) -> rusqlite::Result<MethodRef> {
    Ok(MethodRef {
        method_id: MethodId(row.get(0)?),
        method_signature: row.get(1)?,
        document_path: row.get(2)?,
    })
}

/// Decode the bracketed `group_concat` of `{id, signature}` objects.
///
/// `NULL` (no edges) decodes to an empty list.
pub(crate) fn parse_edge_list(idx: usize, json: Option<&str>) -> rusqlite::Result<Vec<EdgeRef>> {
    let Some(json) = json else {
        return Ok(Vec::new());
    };
    let mut edges: Vec<EdgeRef> = serde_json::from_str(json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })?;
    edges.sort();
    Ok(edges)
}
