//! Batch ingestion for the call-graph store.
//!
//! A batch is written in five dependent steps (project, document, classes,
//! methods, calls) inside one transaction on one pooled connection. The
//! transaction commits only after every step succeeded; on error it is
//! dropped and rolls back, so readers never see half a batch.
//!
//! Items that cannot be linked (a method whose class is not in the batch, a
//! call whose endpoint is not stored) are skipped and reported, not raised.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::{debug, info, trace, warn};

use super::Store;
use crate::batch::{CallInput, MethodInput, ProjectBatch, split_signature};
use crate::error::{Result, SkippedItem};
use crate::types::{ClassId, DocumentId, IngestReport, MethodId, ProjectId};

impl Store {
    /// Ingest one batch.
    ///
    /// Re-ingesting the same batch updates method bodies in place and adds no
    /// new entity rows. Call edges are inserted unconditionally, so repeated
    /// ingestion may add duplicate edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) before touching
    /// the store if a required field is empty, and a store error if any write
    /// fails. Nothing from the batch is committed on error.
    pub fn ingest(&self, batch: &ProjectBatch) -> Result<IngestReport> {
        batch.validate()?;

        let mut conn = self.connection()?;
        // Take the write lock up front so concurrent writers wait on the busy
        // timeout instead of failing on lock upgrade.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let report = write_batch(&tx, batch)?;
        tx.commit()?;

        info!(
            project = %batch.project,
            document = %batch.document,
            classes = report.classes,
            methods_inserted = report.methods_inserted,
            methods_updated = report.methods_updated,
            calls = report.calls_inserted,
            skipped = report.skipped.len(),
            "Batch committed"
        );
        Ok(report)
    }

    /// Ingest a list of batches one at a time, stopping at the first failure.
    ///
    /// Every batch is validated before the first one is written. Batches
    /// committed before a store failure stay committed; later batches are not
    /// attempted.
    ///
    /// # Errors
    ///
    /// Returns the first validation or store error.
    pub fn ingest_all(&self, batches: &[ProjectBatch]) -> Result<Vec<IngestReport>> {
        for batch in batches {
            batch.validate()?;
        }

        let mut reports = Vec::with_capacity(batches.len());
        for (index, batch) in batches.iter().enumerate() {
            match self.ingest(batch) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(
                        index,
                        document = %batch.document,
                        committed = reports.len(),
                        error = %e,
                        "Batch failed; remaining batches not attempted"
                    );
                    return Err(e);
                }
            }
        }
        Ok(reports)
    }
}

/// Run the five ingestion steps on an open transaction.
fn write_batch(conn: &Connection, batch: &ProjectBatch) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    let project_id = resolve_or_create_project(conn, &batch.project)?;
    let document_id = resolve_or_create_document(conn, project_id, &batch.document)?;
    let class_ids = resolve_or_create_classes(conn, document_id, &batch.classes)?;

    report.project_id = Some(project_id);
    report.document_id = Some(document_id);
    report.classes = class_ids.len();

    for method in &batch.methods {
        upsert_method(conn, method, &class_ids, &mut report)?;
    }
    for call in &batch.calls {
        insert_call(conn, call, &mut report)?;
    }

    Ok(report)
}

fn resolve_or_create_project(conn: &Connection, name: &str) -> Result<ProjectId> {
    let existing: Option<i64> = conn
        .prepare_cached("SELECT id FROM projects WHERE name = ?1")?
        .query_row([name], |row| row.get(0))
        .optional()?;

    if let Some(id) = existing {
        return Ok(ProjectId(id));
    }

    trace!(project = %name, "Inserting project");
    conn.prepare_cached("INSERT INTO projects (name) VALUES (?1)")?
        .execute([name])?;
    Ok(ProjectId(conn.last_insert_rowid()))
}

/// An existing document keeps its original project, whatever the batch claims.
fn resolve_or_create_document(
    conn: &Connection,
    project_id: ProjectId,
    path: &str,
) -> Result<DocumentId> {
    let existing: Option<(i64, i64)> = conn
        .prepare_cached("SELECT id, project_id FROM documents WHERE path = ?1")?
        .query_row([path], |row| Ok((row.get(0)?, row.get(1)?)))
        .optional()?;

    if let Some((id, owner)) = existing {
        if owner != project_id.as_i64() {
            debug!(
                document = %path,
                stored_project = owner,
                batch_project = %project_id,
                "Document already belongs to another project; keeping stored link"
            );
        }
        return Ok(DocumentId(id));
    }

    trace!(document = %path, "Inserting document");
    conn.prepare_cached("INSERT INTO documents (project_id, path) VALUES (?1, ?2)")?
        .execute(params![project_id.as_i64(), path])?;
    Ok(DocumentId(conn.last_insert_rowid()))
}

fn resolve_or_create_classes<'a>(
    conn: &Connection,
    document_id: DocumentId,
    names: &'a [String],
) -> Result<HashMap<&'a str, ClassId>> {
    let mut ids = HashMap::with_capacity(names.len());

    for name in names {
        let existing: Option<i64> = conn
            .prepare_cached("SELECT id FROM classes WHERE name = ?1")?
            .query_row([name], |row| row.get(0))
            .optional()?;

        let id = if let Some(id) = existing {
            trace!(class = %name, "Class already exists");
            id
        } else {
            trace!(class = %name, "Inserting class");
            conn.prepare_cached("INSERT INTO classes (document_id, name) VALUES (?1, ?2)")?
                .execute(params![document_id.as_i64(), name])?;
            conn.last_insert_rowid()
        };
        ids.insert(name.as_str(), ClassId(id));
    }

    Ok(ids)
}

fn upsert_method(
    conn: &Connection,
    method: &MethodInput,
    class_ids: &HashMap<&str, ClassId>,
    report: &mut IngestReport,
) -> Result<()> {
    if let Some(id) = method_id_by_signature(conn, &method.signature)? {
        trace!(signature = %method.signature, "Method exists, updating body");
        conn.prepare_cached(
            "UPDATE methods SET body = ?1, start_line = ?2, end_line = ?3 WHERE id = ?4",
        )?
        .execute(params![method.body, method.start_line, method.end_line, id.as_i64()])?;
        report.methods_updated += 1;
        return Ok(());
    }

    let Some((class_name, method_name)) = split_signature(&method.signature) else {
        skip(
            report,
            SkippedItem::method(&method.signature, "signature has no class part"),
        );
        return Ok(());
    };
    let Some(class_id) = class_ids.get(class_name) else {
        skip(
            report,
            SkippedItem::method(
                &method.signature,
                format!("class {class_name} is not part of this batch"),
            ),
        );
        return Ok(());
    };

    trace!(signature = %method.signature, "Inserting method");
    conn.prepare_cached(
        "INSERT INTO methods (class_id, name, signature, body, start_line, end_line)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?
    .execute(params![
        class_id.as_i64(),
        method_name,
        method.signature,
        method.body,
        method.start_line,
        method.end_line
    ])?;
    report.methods_inserted += 1;
    Ok(())
}

fn insert_call(conn: &Connection, call: &CallInput, report: &mut IngestReport) -> Result<()> {
    let Some(source) = method_id_by_signature(conn, &call.caller)? else {
        skip(
            report,
            SkippedItem::call(&call.caller, &call.callee, "caller is not indexed"),
        );
        return Ok(());
    };
    let Some(target) = resolve_callee(conn, &call.callee)? else {
        skip(
            report,
            SkippedItem::call(&call.caller, &call.callee, "no method matches callee"),
        );
        return Ok(());
    };

    conn.prepare_cached("INSERT INTO method_calls (caller_id, callee_id) VALUES (?1, ?2)")?
        .execute(params![source.as_i64(), target.as_i64()])?;
    report.calls_inserted += 1;
    Ok(())
}

fn method_id_by_signature(conn: &Connection, signature: &str) -> Result<Option<MethodId>> {
    let id = conn
        .prepare_cached("SELECT id FROM methods WHERE signature = ?1")?
        .query_row([signature], |row| row.get(0))
        .optional()?;
    Ok(id.map(MethodId))
}

/// Resolve a callee signature that may lack its parameter list.
///
/// Any stored signature starting with `callee` is a candidate. An exact match
/// wins; otherwise the candidate with the lowest id is chosen, so overloads
/// resolve to exactly one method.
pub(crate) fn resolve_callee(conn: &Connection, callee: &str) -> Result<Option<MethodId>> {
    let id = conn
        .prepare_cached(
            "SELECT id FROM methods
             WHERE substr(signature, 1, length(?1)) = ?1
             ORDER BY signature = ?1 DESC, id
             LIMIT 1",
        )?
        .query_row([callee], |row| row.get(0))
        .optional()?;
    Ok(id.map(MethodId))
}

fn skip(report: &mut IngestReport, item: SkippedItem) {
    warn!(
        kind = %item.kind,
        reference = %item.reference,
        reason = %item.reason,
        "Skipping unresolved reference"
    );
    report.skipped.push(item);
}
