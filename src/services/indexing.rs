//! Bridging between the content store and the search index.
//!
//! This module provides:
//! - `entry_document`, which denormalizes a stored entry into the flat
//!   document shape the index consumes (weblog handle, category name and
//!   author username instead of foreign keys)
//! - `RepositoryDocumentSource`, the `DocumentSource` implementation used by
//!   index rebuilds to re-derive the whole index from the repositories

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::db::repositories::{CategoryRepository, EntryRepository, UserRepository, WeblogRepository};
use crate::models::WeblogEntry;
use crate::search::{DocumentSource, EntryDocument};

/// Build the index document for a published entry.
///
/// Resolves the owning weblog, category and author; fails if any of them is
/// missing from the store.
pub async fn entry_document(
    entry: &WeblogEntry,
    weblogs: &Arc<dyn WeblogRepository>,
    categories: &Arc<dyn CategoryRepository>,
    users: &Arc<dyn UserRepository>,
) -> Result<EntryDocument> {
    let weblog = weblogs
        .get_by_id(entry.weblog_id)
        .await?
        .with_context(|| format!("Weblog {} not found for entry {}", entry.weblog_id, entry.id))?;

    let category = categories
        .get_by_id(entry.category_id)
        .await?
        .with_context(|| format!("Category {} not found for entry {}", entry.category_id, entry.id))?;

    let author = users
        .get_by_id(entry.author_id)
        .await?
        .with_context(|| format!("User {} not found for entry {}", entry.author_id, entry.id))?;

    Ok(EntryDocument {
        entry_id: entry.id,
        weblog_handle: weblog.handle,
        anchor: entry.anchor.clone(),
        title: entry.title.clone(),
        text: entry.text.clone(),
        category: category.name,
        tags: entry.tags.clone(),
        username: author.username,
        pub_time: entry
            .pub_time
            .unwrap_or(entry.updated_at)
            .timestamp(),
    })
}

/// `DocumentSource` backed by the SQL repositories.
///
/// Rebuild operations use this to list every published entry (optionally of
/// one weblog) and turn each into an `EntryDocument`. Category and author
/// names are memoized per call since entries of one weblog share few
/// distinct values.
pub struct RepositoryDocumentSource {
    entries: Arc<dyn EntryRepository>,
    weblogs: Arc<dyn WeblogRepository>,
    categories: Arc<dyn CategoryRepository>,
    users: Arc<dyn UserRepository>,
}

impl RepositoryDocumentSource {
    /// Create a new repository-backed document source
    pub fn new(
        entries: Arc<dyn EntryRepository>,
        weblogs: Arc<dyn WeblogRepository>,
        categories: Arc<dyn CategoryRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            entries,
            weblogs,
            categories,
            users,
        }
    }

    async fn weblog_handle(&self, cache: &mut HashMap<i64, String>, id: i64) -> Result<String> {
        if let Some(handle) = cache.get(&id) {
            return Ok(handle.clone());
        }
        let weblog = self
            .weblogs
            .get_by_id(id)
            .await?
            .with_context(|| format!("Weblog {} not found", id))?;
        cache.insert(id, weblog.handle.clone());
        Ok(weblog.handle)
    }

    async fn category_name(&self, cache: &mut HashMap<i64, String>, id: i64) -> Result<String> {
        if let Some(name) = cache.get(&id) {
            return Ok(name.clone());
        }
        let category = self
            .categories
            .get_by_id(id)
            .await?
            .with_context(|| format!("Category {} not found", id))?;
        cache.insert(id, category.name.clone());
        Ok(category.name)
    }

    async fn username(&self, cache: &mut HashMap<i64, String>, id: i64) -> Result<String> {
        if let Some(name) = cache.get(&id) {
            return Ok(name.clone());
        }
        let user = self
            .users
            .get_by_id(id)
            .await?
            .with_context(|| format!("User {} not found", id))?;
        cache.insert(id, user.username.clone());
        Ok(user.username)
    }
}

#[async_trait]
impl DocumentSource for RepositoryDocumentSource {
    async fn published_documents(&self, handle: Option<&str>) -> Result<Vec<EntryDocument>> {
        let entries = match handle {
            Some(handle) => match self.weblogs.get_by_handle(handle).await? {
                Some(weblog) => self.entries.list_published(weblog.id, 0, i64::MAX).await?,
                // Weblog gone from the store: nothing to index
                None => Vec::new(),
            },
            None => self.entries.list_all_published().await?,
        };

        let mut handles = HashMap::new();
        let mut category_names = HashMap::new();
        let mut usernames = HashMap::new();

        let mut documents = Vec::with_capacity(entries.len());
        for entry in &entries {
            documents.push(EntryDocument {
                entry_id: entry.id,
                weblog_handle: self.weblog_handle(&mut handles, entry.weblog_id).await?,
                anchor: entry.anchor.clone(),
                title: entry.title.clone(),
                text: entry.text.clone(),
                category: self.category_name(&mut category_names, entry.category_id).await?,
                tags: entry.tags.clone(),
                username: self.username(&mut usernames, entry.author_id).await?,
                pub_time: entry.pub_time.unwrap_or(entry.updated_at).timestamp(),
            });
        }

        Ok(documents)
    }
}
