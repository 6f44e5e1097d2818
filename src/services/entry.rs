//! Weblog entry service
//!
//! Implements business logic for entry management:
//! - Create, read, update, delete entries
//! - Markdown rendering
//! - Cache invalidation
//! - Validation
//! - Search index maintenance
//!
//! The index follows publication state: saving a published entry schedules a
//! reindex of its document, unpublishing or deleting schedules its removal.
//! Draft entries are never indexed.

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::{
    CategoryRepository, EntryRepository, UserRepository, WeblogRepository,
};
use crate::models::{CreateEntryInput, ListParams, PagedResult, UpdateEntryInput, WeblogEntry};
use crate::search::{IndexManager, IndexOperation};
use crate::services::indexing::entry_document;
use crate::services::markdown::MarkdownRenderer;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

/// Default cache TTL for single entries (1 hour)
const ENTRY_CACHE_TTL_SECS: u64 = 3600;

/// Cache key prefixes
const CACHE_KEY_ENTRY_BY_ID: &str = "entry:id:";
const CACHE_KEY_ENTRY_LIST: &str = "entries:list";

/// Error types for entry service operations
#[derive(Debug, thiserror::Error)]
pub enum EntryServiceError {
    /// Entry not found
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate anchor within a weblog
    #[error("Entry anchor already exists: {0}")]
    DuplicateAnchor(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Entry service for managing weblog entries
///
/// Provides business logic for entry operations including:
/// - CRUD operations with validation
/// - Markdown rendering
/// - Cache management
/// - Search index maintenance
pub struct EntryService {
    repo: Arc<dyn EntryRepository>,
    weblog_repo: Arc<dyn WeblogRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    user_repo: Arc<dyn UserRepository>,
    cache: Arc<Cache>,
    renderer: MarkdownRenderer,
    index: Arc<IndexManager>,
    cache_ttl: Duration,
}

impl EntryService {
    /// Create a new entry service
    pub fn new(
        repo: Arc<dyn EntryRepository>,
        weblog_repo: Arc<dyn WeblogRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        user_repo: Arc<dyn UserRepository>,
        cache: Arc<Cache>,
        renderer: MarkdownRenderer,
        index: Arc<IndexManager>,
    ) -> Self {
        Self {
            repo,
            weblog_repo,
            category_repo,
            user_repo,
            cache,
            renderer,
            index,
            cache_ttl: Duration::from_secs(ENTRY_CACHE_TTL_SECS),
        }
    }

    /// Create a new entry.
    ///
    /// The anchor is generated from the title when not supplied; markdown is
    /// rendered to HTML before storage. A published entry is scheduled for
    /// indexing.
    ///
    /// # Errors
    /// - `ValidationError` if title or text is empty, or the category does
    ///   not belong to the entry's weblog
    /// - `DuplicateAnchor` if the anchor already exists in the weblog
    pub async fn create(&self, mut input: CreateEntryInput) -> Result<WeblogEntry, EntryServiceError> {
        self.validate_create_input(&input)?;
        self.validate_category(input.weblog_id, input.category_id).await?;

        if input.anchor.trim().is_empty() {
            input.anchor = generate_anchor(&input.title);
        }

        if self
            .repo
            .exists_by_anchor(input.weblog_id, &input.anchor)
            .await
            .context("Failed to check anchor uniqueness")?
        {
            return Err(EntryServiceError::DuplicateAnchor(input.anchor));
        }

        let text_html = self.renderer.render(&input.text);

        let entry = self
            .repo
            .create(&input, &text_html)
            .await
            .context("Failed to create entry")?;

        if entry.is_published() {
            self.schedule_reindex(&entry).await?;
        }

        self.invalidate_list_cache().await;

        tracing::debug!("Created entry {} in weblog {}", entry.anchor, entry.weblog_id);
        Ok(entry)
    }

    /// Get an entry by ID, with caching
    pub async fn get_by_id(&self, id: i64) -> Result<Option<WeblogEntry>, EntryServiceError> {
        let cache_key = format!("{CACHE_KEY_ENTRY_BY_ID}{id}");

        if let Ok(Some(entry)) = self.cache.get::<WeblogEntry>(&cache_key).await {
            return Ok(Some(entry));
        }

        let entry = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get entry")?;

        if let Some(ref entry) = entry {
            let _ = self.cache.set(&cache_key, entry, self.cache_ttl).await;
        }

        Ok(entry)
    }

    /// Get an entry by anchor within a weblog
    pub async fn get_by_anchor(
        &self,
        weblog_id: i64,
        anchor: &str,
    ) -> Result<Option<WeblogEntry>, EntryServiceError> {
        Ok(self
            .repo
            .get_by_anchor(weblog_id, anchor)
            .await
            .context("Failed to get entry by anchor")?)
    }

    /// List published entries of a weblog, newest first
    pub async fn list_published(
        &self,
        weblog_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<WeblogEntry>, EntryServiceError> {
        let cache_key = format!(
            "{CACHE_KEY_ENTRY_LIST}:{weblog_id}:{}:{}",
            params.page, params.per_page
        );

        if let Ok(Some(result)) = self.cache.get::<PagedResult<WeblogEntry>>(&cache_key).await {
            return Ok(result);
        }

        let items = self
            .repo
            .list_published(weblog_id, params.offset(), params.limit())
            .await
            .context("Failed to list entries")?;
        let total = self
            .repo
            .count_published(weblog_id)
            .await
            .context("Failed to count entries")?;

        let result = PagedResult::new(items, total, params);
        let _ = self.cache.set(&cache_key, &result, self.cache_ttl).await;

        Ok(result)
    }

    /// Update an entry.
    ///
    /// Index maintenance follows the publication state: a published result is
    /// reindexed; an entry leaving the published state is removed from the
    /// index.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateEntryInput,
    ) -> Result<WeblogEntry, EntryServiceError> {
        let existing = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get entry")?
            .ok_or_else(|| EntryServiceError::NotFound(id.to_string()))?;

        if !input.has_changes() {
            return Ok(existing);
        }

        if let Some(title) = &input.title {
            if title.trim().is_empty() {
                return Err(EntryServiceError::ValidationError(
                    "Entry title cannot be empty".to_string(),
                ));
            }
        }
        if let Some(text) = &input.text {
            if text.trim().is_empty() {
                return Err(EntryServiceError::ValidationError(
                    "Entry text cannot be empty".to_string(),
                ));
            }
        }
        if let Some(category_id) = input.category_id {
            self.validate_category(existing.weblog_id, category_id).await?;
        }
        if let Some(anchor) = &input.anchor {
            let taken = self
                .repo
                .get_by_anchor(existing.weblog_id, anchor)
                .await
                .context("Failed to check anchor uniqueness")?
                .map(|other| other.id != id)
                .unwrap_or(false);
            if taken {
                return Err(EntryServiceError::DuplicateAnchor(anchor.clone()));
            }
        }

        let text_html = input.text.as_deref().map(|text| self.renderer.render(text));

        let updated = self
            .repo
            .update(id, &input, text_html.as_deref())
            .await
            .context("Failed to update entry")?;

        if updated.is_published() {
            self.schedule_reindex(&updated).await?;
        } else if existing.is_published() {
            self.index
                .remove_entry(id)
                .context("Failed to schedule index removal")?;
        }

        self.invalidate_entry_cache(id).await;
        self.invalidate_list_cache().await;

        Ok(updated)
    }

    /// Delete an entry and schedule its removal from the index
    pub async fn delete(&self, id: i64) -> Result<(), EntryServiceError> {
        let entry = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get entry")?
            .ok_or_else(|| EntryServiceError::NotFound(id.to_string()))?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete entry")?;

        self.index
            .remove_entry(id)
            .context("Failed to schedule index removal")?;

        self.invalidate_entry_cache(id).await;
        self.invalidate_list_cache().await;

        tracing::debug!("Deleted entry {} from weblog {}", entry.anchor, entry.weblog_id);
        Ok(())
    }

    fn validate_create_input(&self, input: &CreateEntryInput) -> Result<(), EntryServiceError> {
        if input.title.trim().is_empty() {
            return Err(EntryServiceError::ValidationError(
                "Entry title cannot be empty".to_string(),
            ));
        }
        if input.text.trim().is_empty() {
            return Err(EntryServiceError::ValidationError(
                "Entry text cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    async fn validate_category(
        &self,
        weblog_id: i64,
        category_id: i64,
    ) -> Result<(), EntryServiceError> {
        let category = self
            .category_repo
            .get_by_id(category_id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| {
                EntryServiceError::ValidationError(format!("Category {} not found", category_id))
            })?;

        if category.weblog_id != weblog_id {
            return Err(EntryServiceError::ValidationError(format!(
                "Category {} does not belong to weblog {}",
                category_id, weblog_id
            )));
        }

        Ok(())
    }

    async fn schedule_reindex(&self, entry: &WeblogEntry) -> Result<(), EntryServiceError> {
        let document = entry_document(
            entry,
            &self.weblog_repo,
            &self.category_repo,
            &self.user_repo,
        )
        .await
        .context("Failed to build index document")?;

        self.index
            .schedule(IndexOperation::ReindexEntry(document))
            .context("Failed to schedule index update")?;

        Ok(())
    }

    async fn invalidate_entry_cache(&self, id: i64) {
        let _ = self
            .cache
            .delete(&format!("{CACHE_KEY_ENTRY_BY_ID}{id}"))
            .await;
    }

    async fn invalidate_list_cache(&self) {
        let _ = self
            .cache
            .delete_pattern(&format!("{CACHE_KEY_ENTRY_LIST}:*"))
            .await;
    }
}

/// Generate a URL-friendly anchor from an entry title.
///
/// Converts to lowercase, replaces separators and punctuation with hyphens,
/// and removes consecutive hyphens.
pub fn generate_anchor(title: &str) -> String {
    let anchor: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in anchor.chars() {
        if c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push(c);
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::{CacheConfig, SearchConfig};
    use crate::db::repositories::{
        SqlxCategoryRepository, SqlxEntryRepository, SqlxUserRepository, SqlxWeblogRepository,
        UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateWeblogInput, EntryStatus, UserRole};
    use crate::search::SearchQuery;
    use crate::services::indexing::RepositoryDocumentSource;
    use tempfile::TempDir;

    struct Fixture {
        service: EntryService,
        index: Arc<IndexManager>,
        weblog_id: i64,
        category_id: i64,
        author_id: i64,
        _temp: TempDir,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::boxed(pool.clone());
        let weblogs = SqlxWeblogRepository::boxed(pool.clone());
        let categories = SqlxCategoryRepository::boxed(pool.clone());
        let entries = SqlxEntryRepository::boxed(pool.clone());

        let author = users
            .create("kirk", "kirk@example.com", "h", UserRole::Author)
            .await
            .unwrap();
        let weblog = weblogs
            .create(&CreateWeblogInput::new("captains-log", "Captain's Log", author.id))
            .await
            .unwrap();
        let category = categories
            .create(weblog.id, "General", "general")
            .await
            .unwrap();

        let temp = TempDir::new().unwrap();
        let search_config = SearchConfig {
            index_path: temp.path().join("index"),
            default_limit: 10,
            max_limit: 100,
        };
        let source = Arc::new(RepositoryDocumentSource::new(
            entries.clone(),
            weblogs.clone(),
            categories.clone(),
            users.clone(),
        ));
        let index = IndexManager::open(&search_config, source)
            .await
            .expect("Failed to open index");

        let cache = create_cache(&CacheConfig::default());
        let service = EntryService::new(
            entries,
            weblogs,
            categories,
            users,
            cache,
            MarkdownRenderer::new(),
            index.clone(),
        );

        Fixture {
            service,
            index,
            weblog_id: weblog.id,
            category_id: category.id,
            author_id: author.id,
            _temp: temp,
        }
    }

    fn input(f: &Fixture, title: &str, text: &str) -> CreateEntryInput {
        CreateEntryInput::new(f.weblog_id, title, text, f.category_id, f.author_id)
    }

    /// Scheduled index operations land asynchronously; poll until the
    /// expected total shows up.
    async fn wait_for_total(index: &IndexManager, term: &str, expected: usize) -> usize {
        let mut total = usize::MAX;
        for _ in 0..200 {
            total = index
                .search(&SearchQuery::new(term))
                .map(|hits| hits.total)
                .unwrap_or(usize::MAX);
            if total == expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        total
    }

    #[tokio::test]
    async fn test_create_generates_anchor_and_renders_html() {
        let f = setup().await;

        let entry = f
            .service
            .create(input(&f, "The Tholian Web", "**Spock** reports strange readings."))
            .await
            .expect("Failed to create entry");

        assert_eq!(entry.anchor, "the-tholian-web");
        assert!(entry.text_html.contains("<strong>Spock</strong>"));
        assert_eq!(entry.status, EntryStatus::Draft);
    }

    #[tokio::test]
    async fn test_create_empty_title_fails() {
        let f = setup().await;

        let result = f.service.create(input(&f, "  ", "text")).await;
        assert!(matches!(result, Err(EntryServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_duplicate_anchor_fails() {
        let f = setup().await;

        f.service.create(input(&f, "Same Title", "one")).await.unwrap();
        let result = f.service.create(input(&f, "Same Title", "two")).await;
        assert!(matches!(result, Err(EntryServiceError::DuplicateAnchor(_))));
    }

    #[tokio::test]
    async fn test_create_unknown_category_fails() {
        let f = setup().await;

        let mut bad = input(&f, "Title", "text");
        bad.category_id = f.category_id + 100;
        let result = f.service.create(bad).await;
        assert!(matches!(result, Err(EntryServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_published_entry_is_indexed() {
        let f = setup().await;

        f.service
            .create(
                input(&f, "Tholian encounter", "The Enterprise investigates the Defiant")
                    .with_status(EntryStatus::Published),
            )
            .await
            .unwrap();

        assert_eq!(wait_for_total(&f.index, "Enterprise", 1).await, 1);
    }

    #[tokio::test]
    async fn test_draft_entry_is_not_indexed() {
        let f = setup().await;

        f.service
            .create(input(&f, "Secret draft", "The Enterprise must stay hidden"))
            .await
            .unwrap();

        // Give the worker a moment; the draft must never appear.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let hits = f.index.search(&SearchQuery::new("Enterprise")).unwrap();
        assert_eq!(hits.total, 0);
    }

    #[tokio::test]
    async fn test_unpublish_removes_from_index() {
        let f = setup().await;

        let entry = f
            .service
            .create(
                input(&f, "Visible", "The Enterprise on patrol")
                    .with_status(EntryStatus::Published),
            )
            .await
            .unwrap();
        assert_eq!(wait_for_total(&f.index, "Enterprise", 1).await, 1);

        f.service
            .update(entry.id, UpdateEntryInput::new().with_status(EntryStatus::Draft))
            .await
            .unwrap();
        assert_eq!(wait_for_total(&f.index, "Enterprise", 0).await, 0);
    }

    #[tokio::test]
    async fn test_update_republish_restores_index_state() {
        let f = setup().await;

        let entry = f
            .service
            .create(
                input(&f, "Cycle", "The Enterprise again")
                    .with_status(EntryStatus::Published),
            )
            .await
            .unwrap();
        assert_eq!(wait_for_total(&f.index, "Enterprise", 1).await, 1);

        f.service
            .update(entry.id, UpdateEntryInput::new().with_status(EntryStatus::Draft))
            .await
            .unwrap();
        assert_eq!(wait_for_total(&f.index, "Enterprise", 0).await, 0);

        f.service
            .update(
                entry.id,
                UpdateEntryInput::new().with_status(EntryStatus::Published),
            )
            .await
            .unwrap();
        assert_eq!(wait_for_total(&f.index, "Enterprise", 1).await, 1);
    }

    #[tokio::test]
    async fn test_update_text_reindexes_document() {
        let f = setup().await;

        let entry = f
            .service
            .create(
                input(&f, "Rewrite", "original wording here")
                    .with_status(EntryStatus::Published),
            )
            .await
            .unwrap();
        assert_eq!(wait_for_total(&f.index, "original", 1).await, 1);

        f.service
            .update(
                entry.id,
                UpdateEntryInput::new().with_text("replacement wording here"),
            )
            .await
            .unwrap();

        assert_eq!(wait_for_total(&f.index, "replacement", 1).await, 1);
        assert_eq!(wait_for_total(&f.index, "original", 0).await, 0);
    }

    #[tokio::test]
    async fn test_delete_removes_from_store_and_index() {
        let f = setup().await;

        let entry = f
            .service
            .create(
                input(&f, "Doomed", "The Enterprise will forget this")
                    .with_status(EntryStatus::Published),
            )
            .await
            .unwrap();
        assert_eq!(wait_for_total(&f.index, "Enterprise", 1).await, 1);

        f.service.delete(entry.id).await.unwrap();

        assert!(f.service.get_by_id(entry.id).await.unwrap().is_none());
        assert_eq!(wait_for_total(&f.index, "Enterprise", 0).await, 0);
    }

    #[tokio::test]
    async fn test_list_published_pagination() {
        let f = setup().await;

        for i in 0..5 {
            f.service
                .create(
                    input(&f, &format!("Entry {i}"), "listed text")
                        .with_status(EntryStatus::Published),
                )
                .await
                .unwrap();
        }
        f.service.create(input(&f, "Draft entry", "hidden")).await.unwrap();

        let page = f
            .service
            .list_published(f.weblog_id, &ListParams::new(1, 3))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total, 5);
        assert!(page.has_next());
    }

    #[test]
    fn test_generate_anchor() {
        assert_eq!(generate_anchor("The Tholian Web"), "the-tholian-web");
        assert_eq!(generate_anchor("A Piece of the Action!"), "a-piece-of-the-action");
        assert_eq!(generate_anchor("  spaced  out  "), "spaced-out");
    }
}
