//! Error types for docgraph operations.
//!
//! Errors are split into two groups:
//!
//! - **`Error`**: failures that abort the current batch or query (store
//!   failures, invalid input, missing methods)
//! - **`SkippedItem`**: per-item problems inside an ingestion batch that are
//!   recorded and logged but never fail the batch
//!
//! ## Error Philosophy
//!
//! Parser output is often partial. A method whose class was not part of the
//! batch, or a call whose callee lives in another project, should not throw
//! away the rest of the batch. Only infrastructure failures and malformed
//! requests stop an operation.

use std::fmt;

use thiserror::Error;

/// Result type for docgraph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for docgraph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested method, signature or document did not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required field in a batch or query request was missing or empty.
    #[error("validation error: {0}")]
    Validation(String),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No connection could be acquired from the pool
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Batch input could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// The generation producer failed or panicked
    #[error("generation error: {0}")]
    Generation(String),

    /// Internal invariant violated
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns `true` for the "not found" outcome.
    ///
    /// Callers use this to tell a missing method apart from a method with
    /// no neighbours.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if the request itself was malformed.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// What kind of batch item was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipKind {
    /// A new method whose owning class is not in the batch.
    Method,
    /// A call edge whose caller or callee has no stored method.
    Call,
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method => write!(f, "method"),
            Self::Call => write!(f, "call"),
        }
    }
}

/// An unresolved reference encountered during ingestion.
///
/// These are collected in the batch report. The rest of the batch is still
/// committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// Category of the skipped item
    pub kind: SkipKind,
    /// Signature (or `caller -> callee` pair) that was skipped
    pub reference: String,
    /// Human-readable reason
    pub reason: String,
}

impl SkippedItem {
    /// A method that could not be linked to a class.
    #[must_use]
    pub fn method(signature: &str, reason: impl Into<String>) -> Self {
        Self {
            kind: SkipKind::Method,
            reference: signature.to_string(),
            reason: reason.into(),
        }
    }

    /// A call edge with an endpoint that did not resolve.
    #[must_use]
    pub fn call(caller: &str, callee: &str, reason: impl Into<String>) -> Self {
        Self {
            kind: SkipKind::Call,
            reference: format!("{caller} -> {callee}"),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SkippedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.reference, self.reason)
    }
}
