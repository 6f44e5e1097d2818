//! Index mutation operations.
//!
//! Every change to the search index is expressed as an `IndexOperation` job.
//! Jobs are either scheduled on the index manager's background queue or
//! executed immediately; both paths apply the same mutation.

use super::schema::EntryDocument;

/// A mutation job for the entry index
#[derive(Debug, Clone)]
pub enum IndexOperation {
    /// Index a newly published entry
    AddEntry(EntryDocument),
    /// Replace the document of an already-indexed entry
    ReindexEntry(EntryDocument),
    /// Drop the document of an entry
    RemoveEntry {
        /// Store identifier of the entry
        entry_id: i64,
    },
    /// Drop every document of a weblog and re-add its published entries from
    /// the store. `None` rebuilds the whole index.
    RebuildWeblog {
        /// Weblog handle, or `None` for all weblogs
        handle: Option<String>,
    },
    /// Drop every document of a weblog
    RemoveWeblog {
        /// Weblog handle
        handle: String,
    },
}

impl IndexOperation {
    /// Short label for logging
    pub fn label(&self) -> &'static str {
        match self {
            IndexOperation::AddEntry(_) => "add-entry",
            IndexOperation::ReindexEntry(_) => "reindex-entry",
            IndexOperation::RemoveEntry { .. } => "remove-entry",
            IndexOperation::RebuildWeblog { .. } => "rebuild-weblog",
            IndexOperation::RemoveWeblog { .. } => "remove-weblog",
        }
    }
}
