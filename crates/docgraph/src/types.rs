//! Domain types for the call-graph index.
//!
//! These types represent the core domain model:
//! - **Entities**: `Project`, `Document`, `Class`, `Method`, `MethodCall` (one per table)
//! - **Query results**: `MethodRef`, `EdgeRef`, `GraphRow`, `MethodSource`, `MethodDetail`
//! - **Responses**: `UsedMethods`, `RelatedMethods`, `GraphData`, `BatchOutcome`
//!
//! Response types serialize to the JSON shapes consumed by the generation
//! layer, so field names follow those shapes rather than Rust naming.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SkippedItem;

// ============================================================================
// Strongly-typed ID wrappers
// ============================================================================

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Extract the raw i64 value.
            #[must_use]
            pub fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Store-assigned id of a project row.
    ProjectId
);
row_id!(
    /// Store-assigned id of a document row.
    DocumentId
);
row_id!(
    /// Store-assigned id of a class row.
    ClassId
);
row_id!(
    /// Store-assigned id of a method row.
    MethodId
);
row_id!(
    /// Store-assigned id of a call edge row.
    CallId
);

// ============================================================================
// Entities
// ============================================================================

/// A project, the root of the hierarchy. `name` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Row id
    pub id: ProjectId,
    /// Project name
    pub name: String,
}

/// A source document. `path` is unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Row id
    pub id: DocumentId,
    /// Owning project
    pub project_id: ProjectId,
    /// Document path as given by the parser
    pub path: String,
}

/// A class, keyed by its fully-qualified name (`Project.Class`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    /// Row id
    pub id: ClassId,
    /// Document the class was first seen in
    pub document_id: DocumentId,
    /// Fully-qualified class name
    pub name: String,
}

/// A method, keyed by its fully-qualified signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    /// Row id
    pub id: MethodId,
    /// Owning class
    pub class_id: ClassId,
    /// Last signature segment, e.g. `Foo(int)`
    pub name: String,
    /// Fully-qualified signature, e.g. `Project.Class.Foo(int)`
    pub signature: String,
    /// Method body text
    pub body: String,
    /// First source line (1-based), if the parser reported it
    pub start_line: Option<u32>,
    /// Last source line (1-based), if the parser reported it
    pub end_line: Option<u32>,
}

/// A directed "caller invokes callee" edge.
///
/// Several edges between the same pair may exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Row id
    pub id: CallId,
    /// Method making the call
    pub caller_id: MethodId,
    /// Method being called
    pub callee_id: MethodId,
}

// ============================================================================
// Query results
// ============================================================================

/// A neighbouring method located by its document.
///
/// Returned by `callees` and `callers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRef {
    /// Neighbour's id
    pub method_id: MethodId,
    /// Neighbour's signature
    pub method_signature: String,
    /// Document the neighbour is defined in
    pub document_path: String,
}

/// Element of the aggregated callee/caller lists in the full graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeRef {
    /// Neighbour's id
    pub id: MethodId,
    /// Neighbour's signature
    pub signature: String,
}

/// One method of the full graph with its surrounding context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRow {
    /// Project of the method's document
    pub project_id: ProjectId,
    /// Name of that project
    pub project_name: String,
    /// Document of the method's class
    pub document_id: DocumentId,
    /// Path of that document
    pub document_path: String,
    /// Class owning the method
    pub class_id: ClassId,
    /// Fully-qualified class name
    pub class_name: String,
    /// Method id
    pub method_id: MethodId,
    /// Last signature segment
    pub method_name: String,
    /// Full signature
    pub method_signature: String,
    /// Method body text
    pub method_body: String,
    /// Distinct methods this method calls
    pub callees: Vec<EdgeRef>,
    /// Distinct methods that call this method
    pub callers: Vec<EdgeRef>,
}

/// A method resolved by `(signature, document)`.
///
/// `method` is the signature followed by a newline and the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSource {
    /// Signature and body, newline separated
    pub method: String,
    /// Method id
    pub method_id: MethodId,
}

/// A method resolved by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDetail {
    /// Method id
    pub method_id: MethodId,
    /// Full signature
    pub method_signature: String,
    /// Method body text
    pub method_body: String,
}

/// Format a method as source text: signature, newline, body.
#[must_use]
pub fn method_text(signature: &str, body: &str) -> String {
    format!("{signature}\n{body}")
}

// ============================================================================
// Responses
// ============================================================================

/// `{"used_methods": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedMethods {
    /// Distinct callees
    pub used_methods: Vec<MethodRef>,
}

/// `{"related_methods": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedMethods {
    /// Distinct callers
    pub related_methods: Vec<MethodRef>,
}

/// `{"data": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    /// One row per method, ordered by id
    pub data: Vec<GraphRow>,
}

/// Status of a committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// The batch was committed
    Success,
}

/// `{"id": ..., "status": "success"}` for one committed batch.
///
/// `id` is the id of the batch's project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Project id of the batch
    pub id: i64,
    /// Always `success`; failures are reported as [`BatchFailure`]
    pub status: BatchStatus,
}

/// `{"error": "..."}` for a batch list that stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Error message
    pub error: String,
}

/// Full account of one ingested batch.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Project the batch was written to
    pub project_id: Option<ProjectId>,
    /// Document the batch was written to
    pub document_id: Option<DocumentId>,
    /// Classes resolved or created
    pub classes: usize,
    /// New method rows
    pub methods_inserted: usize,
    /// Existing methods whose body was replaced
    pub methods_updated: usize,
    /// Call edges written
    pub calls_inserted: usize,
    /// Unresolved references that were skipped
    pub skipped: Vec<SkippedItem>,
}

impl IngestReport {
    /// The wire-level outcome of this batch.
    #[must_use]
    pub fn outcome(&self) -> BatchOutcome {
        BatchOutcome {
            id: self.project_id.map_or(0, ProjectId::as_i64),
            status: BatchStatus::Success,
        }
    }
}

/// Row counts for each table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Rows in `projects`
    pub projects: usize,
    /// Rows in `documents`
    pub documents: usize,
    /// Rows in `classes`
    pub classes: usize,
    /// Rows in `methods`
    pub methods: usize,
    /// Rows in `method_calls`
    pub method_calls: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_integers() {
        let row = MethodRef {
            method_id: MethodId(7),
            method_signature: "P.C.Foo()".to_string(),
            document_path: "d.cs".to_string(),
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "method_id": 7,
                "method_signature": "P.C.Foo()",
                "document_path": "d.cs"
            })
        );
    }

    #[test]
    fn batch_outcome_serializes_success_status() {
        let report = IngestReport {
            project_id: Some(ProjectId(3)),
            ..IngestReport::default()
        };

        let json = serde_json::to_string(&report.outcome()).unwrap();
        assert_eq!(json, r#"{"id":3,"status":"success"}"#);
    }

    #[test]
    fn method_text_joins_signature_and_body_with_newline() {
        assert_eq!(
            method_text("P.C.Foo()", "return 1;"),
            "P.C.Foo()\nreturn 1;"
        );
    }
}
