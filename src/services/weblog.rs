//! Weblog service
//!
//! Implements business logic for weblog management:
//! - Weblog creation with a default "General" category
//! - Handle validation and lookup caching
//! - Category management within a weblog
//! - Index cleanup when a weblog is deleted

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::{CategoryRepository, WeblogRepository};
use crate::models::{
    is_valid_handle, CreateCategoryInput, CreateWeblogInput, Weblog, WeblogCategory,
};
use crate::search::{IndexManager, IndexOperation};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

/// Cache TTL for weblog lookups (1 hour)
const WEBLOG_CACHE_TTL_SECS: u64 = 3600;

/// Cache key prefix for handle lookups
const CACHE_KEY_WEBLOG_BY_HANDLE: &str = "weblog:handle:";

/// Error types for weblog service operations
#[derive(Debug, thiserror::Error)]
pub enum WeblogServiceError {
    /// Weblog not found
    #[error("Weblog not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate handle
    #[error("Weblog handle already exists: {0}")]
    DuplicateHandle(String),

    /// Duplicate category slug within a weblog
    #[error("Category slug already exists: {0}")]
    DuplicateCategory(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Weblog service for managing weblogs and their categories
pub struct WeblogService {
    repo: Arc<dyn WeblogRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    cache: Arc<Cache>,
    index: Arc<IndexManager>,
}

impl WeblogService {
    /// Create a new weblog service
    pub fn new(
        repo: Arc<dyn WeblogRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        cache: Arc<Cache>,
        index: Arc<IndexManager>,
    ) -> Self {
        Self {
            repo,
            category_repo,
            cache,
            index,
        }
    }

    /// Create a new weblog.
    ///
    /// Every weblog is provisioned with a default "General" category.
    ///
    /// # Errors
    /// - `ValidationError` if the handle is malformed or the name empty
    /// - `DuplicateHandle` if the handle is taken
    pub async fn create(&self, input: CreateWeblogInput) -> Result<Weblog, WeblogServiceError> {
        if !is_valid_handle(&input.handle) {
            return Err(WeblogServiceError::ValidationError(format!(
                "Invalid weblog handle: {}",
                input.handle
            )));
        }
        if input.name.trim().is_empty() {
            return Err(WeblogServiceError::ValidationError(
                "Weblog name cannot be empty".to_string(),
            ));
        }

        if self
            .repo
            .exists_by_handle(&input.handle)
            .await
            .context("Failed to check handle uniqueness")?
        {
            return Err(WeblogServiceError::DuplicateHandle(input.handle));
        }

        let weblog = self
            .repo
            .create(&input)
            .await
            .context("Failed to create weblog")?;

        self.category_repo
            .create(weblog.id, "General", "general")
            .await
            .context("Failed to create default category")?;

        tracing::info!("Created weblog {}", weblog.handle);
        Ok(weblog)
    }

    /// Get a weblog by handle, with caching
    pub async fn get_by_handle(&self, handle: &str) -> Result<Option<Weblog>, WeblogServiceError> {
        let cache_key = format!("{CACHE_KEY_WEBLOG_BY_HANDLE}{handle}");

        if let Ok(Some(weblog)) = self.cache.get::<Weblog>(&cache_key).await {
            return Ok(Some(weblog));
        }

        let weblog = self
            .repo
            .get_by_handle(handle)
            .await
            .context("Failed to get weblog")?;

        if let Some(ref weblog) = weblog {
            let _ = self
                .cache
                .set(&cache_key, weblog, Duration::from_secs(WEBLOG_CACHE_TTL_SECS))
                .await;
        }

        Ok(weblog)
    }

    /// List the categories of a weblog
    pub async fn categories(&self, weblog_id: i64) -> Result<Vec<WeblogCategory>, WeblogServiceError> {
        Ok(self
            .category_repo
            .list_by_weblog(weblog_id)
            .await
            .context("Failed to list categories")?)
    }

    /// Create a category within a weblog.
    ///
    /// # Errors
    /// - `ValidationError` if the name is empty
    /// - `DuplicateCategory` if the slug already exists in the weblog
    pub async fn create_category(
        &self,
        mut input: CreateCategoryInput,
    ) -> Result<WeblogCategory, WeblogServiceError> {
        if input.name.trim().is_empty() {
            return Err(WeblogServiceError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }

        let slug = input
            .slug
            .take()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| generate_slug(&input.name));

        if self
            .category_repo
            .exists_by_slug(input.weblog_id, &slug)
            .await
            .context("Failed to check category slug uniqueness")?
        {
            return Err(WeblogServiceError::DuplicateCategory(slug));
        }

        let category = self
            .category_repo
            .create(input.weblog_id, &input.name, &slug)
            .await
            .context("Failed to create category")?;

        Ok(category)
    }

    /// Delete a weblog by handle.
    ///
    /// Entries and categories cascade in the store; the weblog's documents
    /// are scheduled for removal from the search index.
    pub async fn delete(&self, handle: &str) -> Result<(), WeblogServiceError> {
        let weblog = self
            .repo
            .get_by_handle(handle)
            .await
            .context("Failed to get weblog")?
            .ok_or_else(|| WeblogServiceError::NotFound(handle.to_string()))?;

        self.repo
            .delete(weblog.id)
            .await
            .context("Failed to delete weblog")?;

        self.index
            .schedule(IndexOperation::RemoveWeblog {
                handle: handle.to_string(),
            })
            .context("Failed to schedule index cleanup")?;

        let _ = self
            .cache
            .delete(&format!("{CACHE_KEY_WEBLOG_BY_HANDLE}{handle}"))
            .await;

        tracing::info!("Deleted weblog {}", handle);
        Ok(())
    }
}

/// Generate a URL-friendly slug from a name.
///
/// Converts to lowercase, replaces separators and punctuation with hyphens,
/// and removes consecutive hyphens.
pub fn generate_slug(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in slug.chars() {
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
    use crate::models::UserRole;
    use crate::services::indexing::RepositoryDocumentSource;
    use tempfile::TempDir;

    async fn setup() -> (WeblogService, i64, TempDir) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::boxed(pool.clone());
        let owner = users
            .create("owner", "owner@example.com", "h", UserRole::Author)
            .await
            .unwrap();

        let weblogs = SqlxWeblogRepository::boxed(pool.clone());
        let categories = SqlxCategoryRepository::boxed(pool.clone());
        let entries = SqlxEntryRepository::boxed(pool.clone());

        let temp = TempDir::new().unwrap();
        let search_config = SearchConfig {
            index_path: temp.path().join("index"),
            default_limit: 10,
            max_limit: 100,
        };
        let source = Arc::new(RepositoryDocumentSource::new(
            entries,
            weblogs.clone(),
            categories.clone(),
            users,
        ));
        let index = IndexManager::open(&search_config, source)
            .await
            .expect("Failed to open index");

        let cache = create_cache(&CacheConfig::default());
        let service = WeblogService::new(weblogs, categories, cache, index);

        (service, owner.id, temp)
    }

    #[tokio::test]
    async fn test_create_weblog_provisions_default_category() {
        let (service, owner_id, _temp) = setup().await;

        let weblog = service
            .create(CreateWeblogInput::new("captains-log", "Captain's Log", owner_id))
            .await
            .expect("Failed to create weblog");

        let categories = service.categories(weblog.id).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].slug, "general");
        assert!(categories[0].is_default());
    }

    #[tokio::test]
    async fn test_create_weblog_invalid_handle_fails() {
        let (service, owner_id, _temp) = setup().await;

        let result = service
            .create(CreateWeblogInput::new("Not A Handle!", "Bad", owner_id))
            .await;
        assert!(matches!(result, Err(WeblogServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_weblog_duplicate_handle_fails() {
        let (service, owner_id, _temp) = setup().await;

        service
            .create(CreateWeblogInput::new("dup", "First", owner_id))
            .await
            .unwrap();
        let result = service
            .create(CreateWeblogInput::new("dup", "Second", owner_id))
            .await;
        assert!(matches!(result, Err(WeblogServiceError::DuplicateHandle(_))));
    }

    #[tokio::test]
    async fn test_get_by_handle_uses_cache() {
        let (service, owner_id, _temp) = setup().await;

        service
            .create(CreateWeblogInput::new("cached", "Cached", owner_id))
            .await
            .unwrap();

        let first = service.get_by_handle("cached").await.unwrap();
        assert!(first.is_some());
        let second = service.get_by_handle("cached").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_create_category_generates_slug() {
        let (service, owner_id, _temp) = setup().await;

        let weblog = service
            .create(CreateWeblogInput::new("cat-test", "Cat Test", owner_id))
            .await
            .unwrap();

        let category = service
            .create_category(CreateCategoryInput::new(weblog.id, "Away Missions"))
            .await
            .unwrap();
        assert_eq!(category.slug, "away-missions");

        let duplicate = service
            .create_category(CreateCategoryInput::new(weblog.id, "Away Missions"))
            .await;
        assert!(matches!(
            duplicate,
            Err(WeblogServiceError::DuplicateCategory(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_weblog_fails() {
        let (service, _owner_id, _temp) = setup().await;

        let result = service.delete("ghost").await;
        assert!(matches!(result, Err(WeblogServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_weblog_removes_from_store() {
        let (service, owner_id, _temp) = setup().await;

        service
            .create(CreateWeblogInput::new("doomed", "Doomed", owner_id))
            .await
            .unwrap();
        service.delete("doomed").await.unwrap();

        assert!(service.get_by_handle("doomed").await.unwrap().is_none());
    }

    #[test]
    fn test_generate_slug_simple() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
    }

    #[test]
    fn test_generate_slug_with_special_chars() {
        assert_eq!(generate_slug("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_generate_slug_with_multiple_spaces() {
        assert_eq!(generate_slug("Hello   World"), "hello-world");
    }
}
