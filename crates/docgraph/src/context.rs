//! Context assembly for generation requests.
//!
//! Turns a method and its one-hop call-graph neighbourhood into text:
//!
//! - **Usage context** (docstring / explain): the method plus the source of
//!   every method it calls.
//! - **Related usage** ("where is this used"): the source and location of
//!   every method that calls it.
//!
//! Both modes fail with `NotFound` when the method itself does not resolve.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::graph::CallGraphOps;
use crate::types::{MethodId, MethodRef, MethodSource};

/// A method with the source of the methods it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageContext {
    /// The requested method
    pub method: MethodSource,
    /// Its direct callees
    pub used_methods: Vec<MethodRef>,
    /// Callee sources (`signature\nbody`) joined by newlines; empty when the
    /// method calls nothing
    pub auxiliary: String,
}

impl UsageContext {
    /// Whether any callee source was collected.
    ///
    /// Prompt builders drop every "used methods" section when this is false.
    #[must_use]
    pub fn has_used_methods(&self) -> bool {
        !self.auxiliary.is_empty()
    }
}

/// One caller of a method: its own source and where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedUsage {
    /// Caller id
    pub method_id: MethodId,
    /// Caller source (`signature\nbody`)
    pub method_body: String,
    /// Document the caller is defined in
    pub document_path: String,
}

/// A method with every caller's source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedContext {
    /// The requested method
    pub method: MethodSource,
    /// One entry per distinct caller
    pub related: Vec<RelatedUsage>,
}

/// Build the usage context for `(signature, document_path)`.
///
/// # Errors
///
/// Returns `NotFound` if the method does not resolve in that document, or a
/// store error.
pub fn usage_context<G: CallGraphOps + ?Sized>(
    graph: &G,
    signature: &str,
    document_path: &str,
) -> Result<UsageContext> {
    let method = graph.method_by_signature(signature, document_path)?;
    let used_methods = graph.callees(method.method_id)?;

    let mut blocks = Vec::with_capacity(used_methods.len());
    for callee in &used_methods {
        if let Some(source) = resolve_source(graph, callee)? {
            blocks.push(source.method);
        }
    }

    debug!(
        signature = %signature,
        callees = used_methods.len(),
        resolved = blocks.len(),
        "Assembled usage context"
    );

    Ok(UsageContext {
        method,
        used_methods,
        auxiliary: blocks.join("\n"),
    })
}

/// Build the related-usage context for `(signature, document_path)`.
///
/// # Errors
///
/// Returns `NotFound` if the method does not resolve in that document, or a
/// store error.
pub fn related_usage<G: CallGraphOps + ?Sized>(
    graph: &G,
    signature: &str,
    document_path: &str,
) -> Result<RelatedContext> {
    let method = graph.method_by_signature(signature, document_path)?;
    let callers = graph.callers(method.method_id)?;

    let mut related = Vec::with_capacity(callers.len());
    for caller in callers {
        if let Some(source) = resolve_source(graph, &caller)? {
            related.push(RelatedUsage {
                method_id: source.method_id,
                method_body: source.method,
                document_path: caller.document_path,
            });
        }
    }

    debug!(signature = %signature, callers = related.len(), "Assembled related usage");
    Ok(RelatedContext { method, related })
}

/// Fetch a neighbour's source, tolerating a row that vanished since the
/// neighbour list was read.
fn resolve_source<G: CallGraphOps + ?Sized>(
    graph: &G,
    neighbour: &MethodRef,
) -> Result<Option<MethodSource>> {
    match graph.method_by_signature(&neighbour.method_signature, &neighbour.document_path) {
        Ok(source) => Ok(Some(source)),
        Err(e) if e.is_not_found() => {
            warn!(
                signature = %neighbour.method_signature,
                document = %neighbour.document_path,
                "Neighbour listed but no longer resolvable; omitting"
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
