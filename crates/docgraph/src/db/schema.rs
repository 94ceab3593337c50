//! Database schema definition for docgraph.

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Tables in dependency order (parents first).
pub(crate) const TABLES: [&str; 5] = [
    "projects",
    "documents",
    "classes",
    "methods",
    "method_calls",
];

/// Database schema definition.
pub(crate) const SCHEMA: &str = r"
-- Projects, the root of the hierarchy
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

-- Source documents (absolute path, globally unique)
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL REFERENCES projects(id),
    path TEXT NOT NULL UNIQUE
);

CREATE INDEX IF NOT EXISTS idx_documents_project ON documents(project_id);

-- Classes (fully-qualified name, e.g. Project.Class)
CREATE TABLE IF NOT EXISTS classes (
    id INTEGER PRIMARY KEY,
    document_id INTEGER NOT NULL REFERENCES documents(id),
    name TEXT NOT NULL UNIQUE
);

CREATE INDEX IF NOT EXISTS idx_classes_document ON classes(document_id);

-- Methods (fully-qualified signature, e.g. Project.Class.Method(params))
CREATE TABLE IF NOT EXISTS methods (
    id INTEGER PRIMARY KEY,
    class_id INTEGER NOT NULL REFERENCES classes(id),
    name TEXT NOT NULL,
    signature TEXT NOT NULL UNIQUE,
    body TEXT NOT NULL DEFAULT '',
    start_line INTEGER,
    end_line INTEGER
);

CREATE INDEX IF NOT EXISTS idx_methods_class ON methods(class_id);

-- Call edges (caller invokes callee); duplicates are allowed
CREATE TABLE IF NOT EXISTS method_calls (
    id INTEGER PRIMARY KEY,
    caller_id INTEGER NOT NULL REFERENCES methods(id),
    callee_id INTEGER NOT NULL REFERENCES methods(id)
);

CREATE INDEX IF NOT EXISTS idx_method_calls_caller ON method_calls(caller_id);
CREATE INDEX IF NOT EXISTS idx_method_calls_callee ON method_calls(callee_id);
";

/// Create the five tables and their indexes if absent.
///
/// Safe to run on every start; existing rows are untouched.
pub(crate) fn ensure_schema(conn: &Connection) -> Result<()> {
    debug!("Ensuring schema");
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let tables = table_names(&conn);
        for table in TABLES {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn second_run_keeps_existing_rows() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO projects (name) VALUES ('P')", [])
            .unwrap();

        ensure_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn signature_uniqueness_is_enforced_by_the_store() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO projects (id, name) VALUES (1, 'P');
             INSERT INTO documents (id, project_id, path) VALUES (1, 1, 'd.cs');
             INSERT INTO classes (id, document_id, name) VALUES (1, 1, 'P.C');
             INSERT INTO methods (class_id, name, signature) VALUES (1, 'Foo()', 'P.C.Foo()');",
        )
        .unwrap();

        let duplicate = conn.execute(
            "INSERT INTO methods (class_id, name, signature) VALUES (1, 'Foo()', 'P.C.Foo()')",
            [],
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn foreign_keys_reject_dangling_document() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        ensure_schema(&conn).unwrap();

        let dangling = conn.execute(
            "INSERT INTO documents (project_id, path) VALUES (42, 'd.cs')",
            [],
        );
        assert!(dangling.is_err());
    }
}
