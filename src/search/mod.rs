//! Full-text search module
//!
//! This module provides full-text search over published weblog entries using
//! Tantivy's BM25 ranking. It contains:
//! - The index schema mapping entries to search documents
//! - Index mutation operations (add, reindex, remove, rebuild)
//! - The `IndexManager`, which owns the index and executes operations either
//!   immediately or through a background queue
//! - Query types and term preprocessing
//!
//! Mutations flow through `IndexOperation` jobs; queries run directly against
//! the shared reader. Scheduled operations become visible to searches once
//! the background worker commits them; `execute_now` commits before it
//! returns.

mod manager;
mod operations;
mod query;
mod schema;

pub use manager::{DocumentSource, IndexManager};
pub use operations::IndexOperation;
pub use query::{preprocess_term, SearchHit, SearchHits, SearchQuery};
pub use schema::{entry_schema, EntryDocument, SCHEMA_VERSION};

/// Error types for search operations
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Index storage failure (create, open, write, commit)
    #[error("Index storage error: {0}")]
    Storage(String),

    /// The query term is empty or cannot be parsed
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Query execution failure
    #[error("Search failed: {0}")]
    Failed(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
