//! Graph queries over the call-graph store.
//!
//! `CallGraphOps` names the read-only query shapes. The `SQLite`
//! implementation lives on [`Store`](crate::Store); the context assembler
//! only depends on this trait.
//!
//! List results have set semantics. Implementations return them in a stable
//! order (ascending method id) but callers must not rely on position.

use crate::error::Result;
use crate::types::{GraphRow, MethodDetail, MethodId, MethodRef, MethodSource};

/// Read-only operations on the method call graph.
pub trait CallGraphOps: Send + Sync {
    /// Methods called by `method_id`, one entry per distinct callee.
    ///
    /// # Errors
    ///
    /// `NotFound` if `method_id` is not stored, or a store error.
    fn callees(&self, method_id: MethodId) -> Result<Vec<MethodRef>>;

    /// Methods that call `method_id`, one entry per distinct caller.
    ///
    /// # Errors
    ///
    /// `NotFound` if `method_id` is not stored, or a store error.
    fn callers(&self, method_id: MethodId) -> Result<Vec<MethodRef>>;

    /// Every method with its project/document/class context and its
    /// distinct callees and callers.
    ///
    /// # Errors
    ///
    /// Store errors.
    fn full_graph(&self) -> Result<Vec<GraphRow>>;

    /// Resolve a method by signature within one document.
    ///
    /// # Errors
    ///
    /// `NotFound` if no method matches, `Validation` for empty arguments, or
    /// a store error.
    fn method_by_signature(&self, signature: &str, document_path: &str) -> Result<MethodSource>;

    /// Resolve a method by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if `method_id` is not stored, or a store error.
    fn method_by_id(&self, method_id: MethodId) -> Result<MethodDetail>;
}
