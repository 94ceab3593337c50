//! # Docgraph: Call-Graph Index for Documentation Generation
//!
//! Docgraph stores the structural call graph of a codebase (projects,
//! documents, classes, methods and call edges) in `SQLite` and answers the
//! graph queries needed to give a language model bounded context about a
//! method: what it calls, and what calls it.
//!
//! ## Design Philosophy
//!
//! - **Parser-agnostic** - Ingests batches produced by an external source parser
//! - **Idempotent** - Re-ingesting a batch updates bodies in place, never duplicates entities
//! - **Best effort** - Unresolvable methods and calls are skipped and reported, not fatal
//! - **Model-agnostic** - Builds prompt text; generation is behind the [`Generator`] trait
//!
//! ## Quick Start
//!
//! ```no_run
//! use docgraph::{Config, DocGraph, ProjectBatch};
//!
//! let graph = DocGraph::open(&Config::with_database_path("index.db"))?;
//!
//! graph.ingest(
//!     &ProjectBatch::new("P", "/src/d.cs")
//!         .class("P.C")
//!         .method("P.C.Foo()", "return 1;")
//!         .method("P.C.Bar()", "Foo();")
//!         .call("P.C.Bar()", "P.C.Foo()"),
//! )?;
//!
//! let context = graph.usage_context("P.C.Bar()", "/src/d.cs")?;
//! assert!(context.auxiliary.contains("P.C.Foo()\nreturn 1;"));
//! # Ok::<(), docgraph::Error>(())
//! ```

mod batch;
mod config;
mod context;
mod db;
mod error;
mod generate;
mod graph;
mod types;

pub use batch::{CallInput, MethodInput, ProjectBatch, parse_batches, split_signature};
pub use config::{CONFIG_FILE_NAME, Config, DATABASE_FILE_NAME, DOCGRAPH_DIR_NAME, DatabaseConfig};
pub use context::{RelatedContext, RelatedUsage, UsageContext, related_usage, usage_context};
pub use db::Store;
pub use error::{Error, Result, SkipKind, SkippedItem};
pub use generate::{FragmentSink, FragmentStream, Generator, PromptPair, stream_generation};
pub use graph::CallGraphOps;
pub use types::{
    BatchFailure, BatchOutcome, BatchStatus, CallId, Class, ClassId, Document, DocumentId,
    EdgeRef, GraphData, GraphRow, IndexStats, IngestReport, Method, MethodCall, MethodDetail,
    MethodId, MethodRef, MethodSource, Project, ProjectId, RelatedMethods, UsedMethods,
    method_text,
};

use std::path::Path;

/// Kind of generation request a prompt pair is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Documentation comment, with the methods it uses as context
    Docstring,
    /// Plain-language explanation, with the methods it uses as context
    Explain,
    /// Where the method is used, with its callers as context
    Related,
}

/// Call-graph index and query interface.
///
/// `DocGraph` is the main entry point. It owns a [`Store`] and exposes the
/// ingestion, query and context-assembly operations on it.
pub struct DocGraph {
    store: Store,
}

impl DocGraph {
    /// Open (creating if needed) the index described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid settings, or a store error if
    /// the database cannot be opened or its schema created.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        let store = Store::open(&config.database)?;
        Ok(Self { store })
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Path of the database file.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.store.path()
    }

    // === Ingestion ===

    /// Ingest one batch. See [`Store::ingest`].
    ///
    /// # Errors
    ///
    /// Validation or store errors; nothing is committed on error.
    pub fn ingest(&self, batch: &ProjectBatch) -> Result<IngestReport> {
        self.store.ingest(batch)
    }

    /// Ingest batches in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// The first validation or store error.
    pub fn ingest_all(&self, batches: &[ProjectBatch]) -> Result<Vec<IngestReport>> {
        self.store.ingest_all(batches)
    }

    /// Decode parser JSON (one batch or a list) and ingest it.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] for undecodable input, otherwise as [`DocGraph::ingest_all`].
    pub fn ingest_json(&self, json: &str) -> Result<Vec<IngestReport>> {
        let batches = parse_batches(json)?;
        self.ingest_all(&batches)
    }

    // === Graph queries ===

    /// `{"used_methods": [...]}` for `method_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, or a store error.
    pub fn used_methods(&self, method_id: MethodId) -> Result<UsedMethods> {
        Ok(UsedMethods {
            used_methods: self.store.callees(method_id)?,
        })
    }

    /// `{"related_methods": [...]}` for `method_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, or a store error.
    pub fn related_methods(&self, method_id: MethodId) -> Result<RelatedMethods> {
        Ok(RelatedMethods {
            related_methods: self.store.callers(method_id)?,
        })
    }

    /// `{"data": [...]}` for the whole graph.
    ///
    /// # Errors
    ///
    /// Store errors.
    pub fn graph(&self) -> Result<GraphData> {
        Ok(GraphData {
            data: self.store.full_graph()?,
        })
    }

    /// Resolve a method by signature within a document.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Validation` for empty arguments, or a store error.
    pub fn method_by_signature(
        &self,
        signature: &str,
        document_path: &str,
    ) -> Result<MethodSource> {
        self.store.method_by_signature(signature, document_path)
    }

    /// Resolve a method by id.
    ///
    /// # Errors
    ///
    /// `NotFound` or a store error.
    pub fn method_by_id(&self, method_id: MethodId) -> Result<MethodDetail> {
        self.store.method_by_id(method_id)
    }

    // === Context assembly ===

    /// The method plus the source of every method it calls.
    ///
    /// # Errors
    ///
    /// `NotFound` if the method does not resolve, or a store error.
    pub fn usage_context(&self, signature: &str, document_path: &str) -> Result<UsageContext> {
        usage_context(&self.store, signature, document_path)
    }

    /// The method plus the source and location of every caller.
    ///
    /// # Errors
    ///
    /// `NotFound` if the method does not resolve, or a store error.
    pub fn related_usage(&self, signature: &str, document_path: &str) -> Result<RelatedContext> {
        related_usage(&self.store, signature, document_path)
    }

    /// Assemble context and build the prompt pair for a generation request.
    ///
    /// # Errors
    ///
    /// `NotFound` if the method does not resolve, or a store error.
    pub fn prompts(
        &self,
        kind: PromptKind,
        signature: &str,
        document_path: &str,
    ) -> Result<PromptPair> {
        Ok(match kind {
            PromptKind::Docstring => {
                PromptPair::docstring(&self.usage_context(signature, document_path)?)
            }
            PromptKind::Explain => {
                PromptPair::explain(&self.usage_context(signature, document_path)?)
            }
            PromptKind::Related => {
                PromptPair::related_usage(&self.related_usage(signature, document_path)?)
            }
        })
    }

    // === Administration ===

    /// Row counts per table.
    ///
    /// # Errors
    ///
    /// Store errors.
    pub fn stats(&self) -> Result<IndexStats> {
        self.store.stats()
    }

    /// Delete every row. The schema stays in place.
    ///
    /// # Errors
    ///
    /// Store errors.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}
