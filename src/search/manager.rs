//! Index manager for the entry search index.
//!
//! The manager owns the Tantivy index, its single writer and a shared
//! reader. Mutations arrive as `IndexOperation` jobs and run on one of two
//! paths:
//! - `schedule` enqueues the job on an unbounded channel drained by a
//!   background task; the change becomes visible once that task commits.
//! - `execute_now` applies and commits the job before returning, so the
//!   change is immediately visible to searches.
//!
//! Searches run against the shared reader, which is reloaded after every
//! commit.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use anyhow::Context;
use async_trait::async_trait;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::mpsc;

use crate::config::SearchConfig;

use super::operations::IndexOperation;
use super::query::{preprocess_term, SearchHit, SearchHits, SearchQuery};
use super::schema::{entry_schema, to_document, EntryDocument, EntryFields};
use super::{Result, SearchError};

/// Writer heap size (50MB)
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Name of the schema version marker file inside the index directory
const VERSION_FILE: &str = "schema.version";

/// Source of indexable documents, implemented by the services layer.
///
/// Used by rebuild operations, which re-derive the index content from the
/// content store instead of trusting whatever is currently indexed.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Return the documents of every published entry, optionally restricted
    /// to one weblog handle.
    async fn published_documents(&self, handle: Option<&str>) -> anyhow::Result<Vec<EntryDocument>>;
}

/// Manager for the full-text entry index
pub struct IndexManager {
    index: Index,
    fields: EntryFields,
    writer: Mutex<IndexWriter>,
    reader: IndexReader,
    source: Arc<dyn DocumentSource>,
    tx: mpsc::UnboundedSender<IndexOperation>,
    default_limit: usize,
    max_limit: usize,
}

impl IndexManager {
    /// Open (or create) the index and start the background worker.
    ///
    /// If the index directory is missing, or was written with a different
    /// schema version, a fresh index is created and rebuilt from the
    /// document source before this function returns.
    pub async fn open(
        config: &SearchConfig,
        source: Arc<dyn DocumentSource>,
    ) -> Result<Arc<Self>> {
        let (index, needs_rebuild) = open_or_create_index(&config.index_path)?;

        let schema = index.schema();
        let fields = EntryFields::for_schema(&schema)?;

        let writer = index
            .writer(WRITER_HEAP_BYTES)
            .map_err(|e| SearchError::Storage(format!("Failed to create writer: {e}")))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::Storage(format!("Failed to create reader: {e}")))?;

        let (tx, rx) = mpsc::unbounded_channel();

        let manager = Arc::new(Self {
            index,
            fields,
            writer: Mutex::new(writer),
            reader,
            source,
            tx,
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        });

        spawn_worker(Arc::downgrade(&manager), rx);

        if needs_rebuild {
            tracing::info!("Rebuilding search index from the content store");
            manager
                .execute_now(IndexOperation::RebuildWeblog { handle: None })
                .await?;
        }

        Ok(manager)
    }

    /// Default number of hits per result page
    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Enqueue an operation for the background worker.
    ///
    /// The change becomes visible to searches eventually, once the worker
    /// has applied and committed it.
    pub fn schedule(&self, op: IndexOperation) -> Result<()> {
        self.tx
            .send(op)
            .map_err(|e| SearchError::Failed(format!("Index queue closed: {e}")))
    }

    /// Apply an operation and commit before returning.
    ///
    /// Searches issued after this returns observe the change.
    pub async fn execute_now(&self, op: IndexOperation) -> Result<()> {
        self.apply(op).await?;
        self.commit_and_reload()
    }

    /// Convenience wrapper scheduling the removal of an entry's document
    pub fn remove_entry(&self, entry_id: i64) -> Result<()> {
        self.schedule(IndexOperation::RemoveEntry { entry_id })
    }

    /// Execute a search against the index
    pub fn search(&self, query: &SearchQuery) -> Result<SearchHits> {
        let term = preprocess_term(&query.term);
        if term.is_empty() {
            return Err(SearchError::InvalidQuery(
                "Query term cannot be empty".to_string(),
            ));
        }

        let limit = if query.limit == 0 {
            self.default_limit
        } else {
            query.limit.min(self.max_limit)
        };

        let searcher = self.reader.searcher();

        let parser = QueryParser::for_index(
            &self.index,
            vec![self.fields.title, self.fields.text, self.fields.tags],
        );
        let parsed = parser
            .parse_query(&term)
            .map_err(|e| SearchError::InvalidQuery(format!("Failed to parse query: {e}")))?;

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, parsed)];
        if let Some(handle) = &query.weblog {
            clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(
                    Term::from_field_text(self.fields.weblog, handle),
                    IndexRecordOption::Basic,
                )),
            ));
        }
        if let Some(category) = &query.category {
            clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(
                    Term::from_field_text(self.fields.category, category),
                    IndexRecordOption::Basic,
                )),
            ));
        }
        let boolean = BooleanQuery::new(clauses);

        let (top_docs, total) = searcher
            .search(
                &boolean,
                &(TopDocs::with_limit(limit).and_offset(query.offset), Count),
            )
            .map_err(|e| SearchError::Failed(format!("Search failed: {e}")))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(doc_address)
                .map_err(|e| SearchError::Failed(format!("Failed to retrieve document: {e}")))?;

            hits.push(SearchHit {
                entry_id: extract_i64(&doc, self.fields.entry_id),
                weblog: extract_text(&doc, self.fields.weblog),
                anchor: extract_text(&doc, self.fields.anchor),
                title: extract_text(&doc, self.fields.title),
                category: extract_text(&doc, self.fields.category),
                score,
            });
        }

        Ok(SearchHits { hits, total })
    }

    /// Apply a mutation without committing
    async fn apply(&self, op: IndexOperation) -> Result<()> {
        match op {
            IndexOperation::AddEntry(doc) | IndexOperation::ReindexEntry(doc) => {
                let writer = self.lock_writer()?;
                writer.delete_term(Term::from_field_i64(self.fields.entry_id, doc.entry_id));
                writer
                    .add_document(to_document(&self.fields, &doc))
                    .map_err(|e| SearchError::Storage(format!("Failed to add document: {e}")))?;
            }
            IndexOperation::RemoveEntry { entry_id } => {
                let writer = self.lock_writer()?;
                writer.delete_term(Term::from_field_i64(self.fields.entry_id, entry_id));
            }
            IndexOperation::RebuildWeblog { handle } => {
                // Fetch from the store before taking the writer lock
                let docs = self
                    .source
                    .published_documents(handle.as_deref())
                    .await
                    .context("Failed to load documents for rebuild")?;

                let writer = self.lock_writer()?;
                match &handle {
                    Some(handle) => {
                        writer.delete_term(Term::from_field_text(self.fields.weblog, handle));
                    }
                    None => {
                        writer.delete_all_documents().map_err(|e| {
                            SearchError::Storage(format!("Failed to clear index: {e}"))
                        })?;
                    }
                }
                for doc in &docs {
                    writer
                        .add_document(to_document(&self.fields, doc))
                        .map_err(|e| {
                            SearchError::Storage(format!("Failed to add document: {e}"))
                        })?;
                }
            }
            IndexOperation::RemoveWeblog { handle } => {
                let writer = self.lock_writer()?;
                writer.delete_term(Term::from_field_text(self.fields.weblog, &handle));
            }
        }
        Ok(())
    }

    /// Commit pending mutations and reload the shared reader
    fn commit_and_reload(&self) -> Result<()> {
        {
            let mut writer = self.lock_writer()?;
            writer
                .commit()
                .map_err(|e| SearchError::Storage(format!("Failed to commit: {e}")))?;
        }
        self.reader
            .reload()
            .map_err(|e| SearchError::Storage(format!("Failed to reload reader: {e}")))
    }

    fn lock_writer(&self) -> Result<MutexGuard<'_, IndexWriter>> {
        self.writer
            .lock()
            .map_err(|_| SearchError::Storage("Index writer lock poisoned".to_string()))
    }
}

impl std::fmt::Debug for IndexManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexManager")
            .field("default_limit", &self.default_limit)
            .field("max_limit", &self.max_limit)
            .finish()
    }
}

/// Open the index at `path`, creating it fresh when missing or written with
/// a stale schema version. Returns the index and whether a rebuild from the
/// store is required.
fn open_or_create_index(path: &Path) -> Result<(Index, bool)> {
    let version_file = path.join(VERSION_FILE);

    let current_version = std::fs::read_to_string(&version_file)
        .ok()
        .and_then(|s| s.trim().parse::<u32>().ok());

    if path.join("meta.json").exists() && current_version == Some(super::SCHEMA_VERSION) {
        let index = Index::open_in_dir(path)
            .map_err(|e| SearchError::Storage(format!("Failed to open index: {e}")))?;
        return Ok((index, false));
    }

    if path.exists() {
        tracing::warn!(
            "Search index at {} is missing or stale, recreating",
            path.display()
        );
        std::fs::remove_dir_all(path)
            .map_err(|e| SearchError::Storage(format!("Failed to clear index dir: {e}")))?;
    }
    std::fs::create_dir_all(path)
        .map_err(|e| SearchError::Storage(format!("Failed to create index dir: {e}")))?;

    let index = Index::create_in_dir(path, entry_schema())
        .map_err(|e| SearchError::Storage(format!("Failed to create index: {e}")))?;

    std::fs::write(&version_file, super::SCHEMA_VERSION.to_string())
        .map_err(|e| SearchError::Storage(format!("Failed to write version file: {e}")))?;

    Ok((index, true))
}

/// Drain the operation queue in the background.
///
/// The worker holds only a weak reference; it stops when the manager is
/// dropped and the channel closes.
fn spawn_worker(manager: Weak<IndexManager>, mut rx: mpsc::UnboundedReceiver<IndexOperation>) {
    tokio::spawn(async move {
        while let Some(op) = rx.recv().await {
            let Some(manager) = manager.upgrade() else {
                break;
            };

            let label = op.label();
            if let Err(e) = manager.execute_now(op).await {
                tracing::error!("Scheduled index operation {} failed: {}", label, e);
            } else {
                tracing::debug!("Applied scheduled index operation {}", label);
            }
        }
    });
}

/// Extract a text field from a document
fn extract_text(doc: &TantivyDocument, field: tantivy::schema::Field) -> String {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Extract an i64 field from a document
fn extract_i64(doc: &TantivyDocument, field: tantivy::schema::Field) -> i64 {
    doc.get_first(field).and_then(|v| v.as_i64()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Fixed document source for manager tests
    struct StaticSource {
        docs: Vec<EntryDocument>,
    }

    #[async_trait]
    impl DocumentSource for StaticSource {
        async fn published_documents(
            &self,
            handle: Option<&str>,
        ) -> anyhow::Result<Vec<EntryDocument>> {
            Ok(self
                .docs
                .iter()
                .filter(|d| handle.map_or(true, |h| d.weblog_handle == h))
                .cloned()
                .collect())
        }
    }

    fn doc(entry_id: i64, handle: &str, title: &str, text: &str) -> EntryDocument {
        EntryDocument {
            entry_id,
            weblog_handle: handle.to_string(),
            anchor: format!("entry-{entry_id}"),
            title: title.to_string(),
            text: text.to_string(),
            category: "General".to_string(),
            tags: vec![],
            username: "testuser".to_string(),
            pub_time: 1_700_000_000,
        }
    }

    async fn open_manager(dir: &TempDir, docs: Vec<EntryDocument>) -> Arc<IndexManager> {
        let config = SearchConfig {
            index_path: dir.path().join("index"),
            default_limit: 10,
            max_limit: 100,
        };
        IndexManager::open(&config, Arc::new(StaticSource { docs }))
            .await
            .expect("Failed to open index manager")
    }

    #[tokio::test]
    async fn test_execute_now_is_immediately_visible() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir, vec![]).await;

        manager
            .execute_now(IndexOperation::AddEntry(doc(
                1,
                "captains-log",
                "The Tholian Web",
                "The Enterprise investigates the fate of the Defiant",
            )))
            .await
            .unwrap();

        let hits = manager
            .search(&SearchQuery::new("Enterprise"))
            .expect("Search failed");
        assert_eq!(hits.total, 1);
        assert_eq!(hits.hits[0].entry_id, 1);
        assert_eq!(hits.hits[0].title, "The Tholian Web");
        assert!(hits.hits[0].score > 0.0);
    }

    #[tokio::test]
    async fn test_scheduled_add_becomes_visible() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir, vec![]).await;

        manager
            .schedule(IndexOperation::AddEntry(doc(
                7,
                "captains-log",
                "A Piece of the Action",
                "The crew of the Enterprise attempts contact",
            )))
            .unwrap();

        // The queue is drained asynchronously; poll until the commit lands.
        let mut total = 0;
        for _ in 0..100 {
            total = manager.search(&SearchQuery::new("Enterprise")).unwrap().total;
            if total > 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_weblog_scope_filters_hits() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir, vec![]).await;

        manager
            .execute_now(IndexOperation::AddEntry(doc(1, "alpha", "One", "shared term")))
            .await
            .unwrap();
        manager
            .execute_now(IndexOperation::AddEntry(doc(2, "beta", "Two", "shared term")))
            .await
            .unwrap();

        let all = manager.search(&SearchQuery::new("shared")).unwrap();
        assert_eq!(all.total, 2);

        let scoped = manager
            .search(&SearchQuery::new("shared").with_weblog("alpha"))
            .unwrap();
        assert_eq!(scoped.total, 1);
        assert_eq!(scoped.hits[0].weblog, "alpha");
    }

    #[tokio::test]
    async fn test_category_scope_filters_hits() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir, vec![]).await;

        let mut starship_doc = doc(1, "alpha", "One", "shared term");
        starship_doc.category = "Starships".to_string();
        manager
            .execute_now(IndexOperation::AddEntry(starship_doc))
            .await
            .unwrap();
        manager
            .execute_now(IndexOperation::AddEntry(doc(2, "alpha", "Two", "shared term")))
            .await
            .unwrap();

        let scoped = manager
            .search(&SearchQuery::new("shared").with_category("Starships"))
            .unwrap();
        assert_eq!(scoped.total, 1);
        assert_eq!(scoped.hits[0].category, "Starships");
    }

    #[tokio::test]
    async fn test_remove_entry_drops_only_its_document() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir, vec![]).await;

        manager
            .execute_now(IndexOperation::AddEntry(doc(1, "alpha", "One", "kept term")))
            .await
            .unwrap();
        manager
            .execute_now(IndexOperation::AddEntry(doc(2, "alpha", "Two", "kept term")))
            .await
            .unwrap();

        manager
            .execute_now(IndexOperation::RemoveEntry { entry_id: 1 })
            .await
            .unwrap();

        let hits = manager.search(&SearchQuery::new("kept")).unwrap();
        assert_eq!(hits.total, 1);
        assert_eq!(hits.hits[0].entry_id, 2);
    }

    #[tokio::test]
    async fn test_reindex_replaces_document() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir, vec![]).await;

        manager
            .execute_now(IndexOperation::AddEntry(doc(1, "alpha", "Old", "original words")))
            .await
            .unwrap();
        manager
            .execute_now(IndexOperation::ReindexEntry(doc(
                1,
                "alpha",
                "New",
                "replacement words",
            )))
            .await
            .unwrap();

        assert_eq!(manager.search(&SearchQuery::new("original")).unwrap().total, 0);
        let hits = manager.search(&SearchQuery::new("replacement")).unwrap();
        assert_eq!(hits.total, 1);
        assert_eq!(hits.hits[0].title, "New");
    }

    #[tokio::test]
    async fn test_remove_weblog_drops_all_its_documents() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir, vec![]).await;

        manager
            .execute_now(IndexOperation::AddEntry(doc(1, "alpha", "One", "shared term")))
            .await
            .unwrap();
        manager
            .execute_now(IndexOperation::AddEntry(doc(2, "alpha", "Two", "shared term")))
            .await
            .unwrap();
        manager
            .execute_now(IndexOperation::AddEntry(doc(3, "beta", "Three", "shared term")))
            .await
            .unwrap();

        manager
            .execute_now(IndexOperation::RemoveWeblog {
                handle: "alpha".to_string(),
            })
            .await
            .unwrap();

        let hits = manager.search(&SearchQuery::new("shared")).unwrap();
        assert_eq!(hits.total, 1);
        assert_eq!(hits.hits[0].weblog, "beta");
    }

    #[tokio::test]
    async fn test_fresh_index_rebuilds_from_source() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(
            &dir,
            vec![
                doc(1, "alpha", "One", "seeded content"),
                doc(2, "beta", "Two", "seeded content"),
            ],
        )
        .await;

        let hits = manager.search(&SearchQuery::new("seeded")).unwrap();
        assert_eq!(hits.total, 2);
    }

    #[tokio::test]
    async fn test_rebuild_weblog_refreshes_from_source() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir, vec![doc(1, "alpha", "One", "canonical text")]).await;

        // Simulate drift: a stale extra document for the same weblog
        manager
            .execute_now(IndexOperation::AddEntry(doc(99, "alpha", "Stale", "canonical text")))
            .await
            .unwrap();
        assert_eq!(manager.search(&SearchQuery::new("canonical")).unwrap().total, 2);

        manager
            .execute_now(IndexOperation::RebuildWeblog {
                handle: Some("alpha".to_string()),
            })
            .await
            .unwrap();

        let hits = manager.search(&SearchQuery::new("canonical")).unwrap();
        assert_eq!(hits.total, 1);
        assert_eq!(hits.hits[0].entry_id, 1);
    }

    #[tokio::test]
    async fn test_empty_term_is_rejected() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir, vec![]).await;

        let result = manager.search(&SearchQuery::new("   "));
        assert!(matches!(result, Err(SearchError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn test_pagination_window() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir, vec![]).await;

        for i in 0..5 {
            manager
                .execute_now(IndexOperation::AddEntry(doc(
                    i,
                    "alpha",
                    &format!("Entry {i}"),
                    "repeated term",
                )))
                .await
                .unwrap();
        }

        let page = manager
            .search(&SearchQuery::new("repeated").with_page(2, 2))
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.hits.len(), 2);
    }

    #[tokio::test]
    async fn test_reopen_existing_index_keeps_documents() {
        let dir = TempDir::new().unwrap();

        {
            let manager = open_manager(&dir, vec![]).await;
            manager
                .execute_now(IndexOperation::AddEntry(doc(1, "alpha", "One", "durable term")))
                .await
                .unwrap();
        }

        // Reopen over the same directory with an empty source: no rebuild
        // happens, the committed document is still there.
        let manager = open_manager(&dir, vec![]).await;
        let hits = manager.search(&SearchQuery::new("durable")).unwrap();
        assert_eq!(hits.total, 1);
    }
}
