//! Weblog entry repository
//!
//! Database operations for weblog entries.
//!
//! This module provides:
//! - `EntryRepository` trait defining the interface for entry data access
//! - `SqlxEntryRepository` implementing the trait for SQLite and MySQL
//!
//! Tags are stored in the `entry_tags` join table and loaded with each entry.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateEntryInput, EntryStatus, UpdateEntryInput, WeblogEntry};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Entry repository trait
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Create a new entry (anchor must already be resolved, HTML rendered)
    async fn create(&self, input: &CreateEntryInput, text_html: &str) -> Result<WeblogEntry>;

    /// Get entry by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<WeblogEntry>>;

    /// Get entry by anchor within a weblog
    async fn get_by_anchor(&self, weblog_id: i64, anchor: &str) -> Result<Option<WeblogEntry>>;

    /// Check if an anchor already exists within a weblog
    async fn exists_by_anchor(&self, weblog_id: i64, anchor: &str) -> Result<bool>;

    /// Update an entry; `text_html` accompanies a text change
    async fn update(
        &self,
        id: i64,
        input: &UpdateEntryInput,
        text_html: Option<&str>,
    ) -> Result<WeblogEntry>;

    /// Delete an entry
    async fn delete(&self, id: i64) -> Result<()>;

    /// List published entries of a weblog, newest first
    async fn list_published(
        &self,
        weblog_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<WeblogEntry>>;

    /// Count published entries of a weblog
    async fn count_published(&self, weblog_id: i64) -> Result<i64>;

    /// List every published entry across all weblogs (used for index rebuilds)
    async fn list_all_published(&self) -> Result<Vec<WeblogEntry>>;
}

/// SQLx-based entry repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxEntryRepository {
    pool: DynDatabasePool,
}

impl SqlxEntryRepository {
    /// Create a new SQLx entry repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn EntryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl EntryRepository for SqlxEntryRepository {
    async fn create(&self, input: &CreateEntryInput, text_html: &str) -> Result<WeblogEntry> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_entry_sqlite(self.pool.as_sqlite().unwrap(), input, text_html).await
            }
            DatabaseDriver::Mysql => {
                create_entry_mysql(self.pool.as_mysql().unwrap(), input, text_html).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<WeblogEntry>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_entry_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_entry_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_anchor(&self, weblog_id: i64, anchor: &str) -> Result<Option<WeblogEntry>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_entry_by_anchor_sqlite(self.pool.as_sqlite().unwrap(), weblog_id, anchor).await
            }
            DatabaseDriver::Mysql => {
                get_entry_by_anchor_mysql(self.pool.as_mysql().unwrap(), weblog_id, anchor).await
            }
        }
    }

    async fn exists_by_anchor(&self, weblog_id: i64, anchor: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_anchor_sqlite(self.pool.as_sqlite().unwrap(), weblog_id, anchor).await
            }
            DatabaseDriver::Mysql => {
                exists_by_anchor_mysql(self.pool.as_mysql().unwrap(), weblog_id, anchor).await
            }
        }
    }

    async fn update(
        &self,
        id: i64,
        input: &UpdateEntryInput,
        text_html: Option<&str>,
    ) -> Result<WeblogEntry> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_entry_sqlite(self.pool.as_sqlite().unwrap(), id, input, text_html).await
            }
            DatabaseDriver::Mysql => {
                update_entry_mysql(self.pool.as_mysql().unwrap(), id, input, text_html).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_entry_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_entry_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_published(
        &self,
        weblog_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<WeblogEntry>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_published_sqlite(self.pool.as_sqlite().unwrap(), weblog_id, offset, limit).await
            }
            DatabaseDriver::Mysql => {
                list_published_mysql(self.pool.as_mysql().unwrap(), weblog_id, offset, limit).await
            }
        }
    }

    async fn count_published(&self, weblog_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_published_sqlite(self.pool.as_sqlite().unwrap(), weblog_id).await
            }
            DatabaseDriver::Mysql => {
                count_published_mysql(self.pool.as_mysql().unwrap(), weblog_id).await
            }
        }
    }

    async fn list_all_published(&self) -> Result<Vec<WeblogEntry>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_all_published_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_all_published_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

const ENTRY_COLUMNS: &str = "id, weblog_id, anchor, title, text, text_html, category_id, author_id, status, pub_time, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_entry_sqlite(
    pool: &SqlitePool,
    input: &CreateEntryInput,
    text_html: &str,
) -> Result<WeblogEntry> {
    let now = Utc::now();
    let status = input.status.unwrap_or_default();
    let pub_time = if status == EntryStatus::Published {
        Some(now)
    } else {
        None
    };

    let result = sqlx::query(
        r#"
        INSERT INTO weblog_entries (weblog_id, anchor, title, text, text_html, category_id, author_id, status, pub_time, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.weblog_id)
    .bind(&input.anchor)
    .bind(&input.title)
    .bind(&input.text)
    .bind(text_html)
    .bind(input.category_id)
    .bind(input.author_id)
    .bind(status.as_str())
    .bind(pub_time)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create entry")?;

    let id = result.last_insert_rowid();

    replace_tags_sqlite(pool, id, &input.tags).await?;

    Ok(WeblogEntry {
        id,
        weblog_id: input.weblog_id,
        anchor: input.anchor.clone(),
        title: input.title.clone(),
        text: input.text.clone(),
        text_html: text_html.to_string(),
        category_id: input.category_id,
        author_id: input.author_id,
        status,
        pub_time,
        created_at: now,
        updated_at: now,
        tags: input.tags.clone(),
    })
}

async fn get_entry_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<WeblogEntry>> {
    let row = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM weblog_entries WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get entry by ID")?;

    match row {
        Some(row) => {
            let mut entry = row_to_entry_sqlite(&row)?;
            entry.tags = load_tags_sqlite(pool, entry.id).await?;
            Ok(Some(entry))
        }
        None => Ok(None),
    }
}

async fn get_entry_by_anchor_sqlite(
    pool: &SqlitePool,
    weblog_id: i64,
    anchor: &str,
) -> Result<Option<WeblogEntry>> {
    let row = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM weblog_entries WHERE weblog_id = ? AND anchor = ?"
    ))
    .bind(weblog_id)
    .bind(anchor)
    .fetch_optional(pool)
    .await
    .context("Failed to get entry by anchor")?;

    match row {
        Some(row) => {
            let mut entry = row_to_entry_sqlite(&row)?;
            entry.tags = load_tags_sqlite(pool, entry.id).await?;
            Ok(Some(entry))
        }
        None => Ok(None),
    }
}

async fn exists_by_anchor_sqlite(pool: &SqlitePool, weblog_id: i64, anchor: &str) -> Result<bool> {
    let row = sqlx::query(
        "SELECT COUNT(*) as count FROM weblog_entries WHERE weblog_id = ? AND anchor = ?",
    )
    .bind(weblog_id)
    .bind(anchor)
    .fetch_one(pool)
    .await
    .context("Failed to check anchor existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn update_entry_sqlite(
    pool: &SqlitePool,
    id: i64,
    input: &UpdateEntryInput,
    text_html: Option<&str>,
) -> Result<WeblogEntry> {
    let existing = get_entry_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Entry not found"))?;

    let now = Utc::now();
    let new_anchor = input.anchor.as_ref().unwrap_or(&existing.anchor);
    let new_title = input.title.as_ref().unwrap_or(&existing.title);
    let new_text = input.text.as_ref().unwrap_or(&existing.text);
    let new_text_html = text_html.unwrap_or(&existing.text_html);
    let new_category_id = input.category_id.unwrap_or(existing.category_id);
    let new_status = input.status.unwrap_or(existing.status);
    // First publication stamps pub_time; it survives a later unpublish.
    let new_pub_time = if new_status == EntryStatus::Published {
        existing.pub_time.or(Some(now))
    } else {
        existing.pub_time
    };

    sqlx::query(
        r#"
        UPDATE weblog_entries
        SET anchor = ?, title = ?, text = ?, text_html = ?, category_id = ?, status = ?, pub_time = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(new_anchor)
    .bind(new_title)
    .bind(new_text)
    .bind(new_text_html)
    .bind(new_category_id)
    .bind(new_status.as_str())
    .bind(new_pub_time)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update entry")?;

    let tags = match &input.tags {
        Some(tags) => {
            replace_tags_sqlite(pool, id, tags).await?;
            tags.clone()
        }
        None => existing.tags.clone(),
    };

    Ok(WeblogEntry {
        id,
        weblog_id: existing.weblog_id,
        anchor: new_anchor.clone(),
        title: new_title.clone(),
        text: new_text.clone(),
        text_html: new_text_html.to_string(),
        category_id: new_category_id,
        author_id: existing.author_id,
        status: new_status,
        pub_time: new_pub_time,
        created_at: existing.created_at,
        updated_at: now,
        tags,
    })
}

async fn delete_entry_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM weblog_entries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete entry")?;
    Ok(())
}

async fn list_published_sqlite(
    pool: &SqlitePool,
    weblog_id: i64,
    offset: i64,
    limit: i64,
) -> Result<Vec<WeblogEntry>> {
    let rows = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM weblog_entries WHERE weblog_id = ? AND status = 'published' ORDER BY pub_time DESC LIMIT ? OFFSET ?"
    ))
    .bind(weblog_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list published entries")?;

    let mut entries = Vec::new();
    for row in rows {
        let mut entry = row_to_entry_sqlite(&row)?;
        entry.tags = load_tags_sqlite(pool, entry.id).await?;
        entries.push(entry);
    }

    Ok(entries)
}

async fn count_published_sqlite(pool: &SqlitePool, weblog_id: i64) -> Result<i64> {
    let row = sqlx::query(
        "SELECT COUNT(*) as count FROM weblog_entries WHERE weblog_id = ? AND status = 'published'",
    )
    .bind(weblog_id)
    .fetch_one(pool)
    .await
    .context("Failed to count published entries")?;

    Ok(row.get("count"))
}

async fn list_all_published_sqlite(pool: &SqlitePool) -> Result<Vec<WeblogEntry>> {
    let rows = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM weblog_entries WHERE status = 'published' ORDER BY pub_time DESC"
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list published entries")?;

    let mut entries = Vec::new();
    for row in rows {
        let mut entry = row_to_entry_sqlite(&row)?;
        entry.tags = load_tags_sqlite(pool, entry.id).await?;
        entries.push(entry);
    }

    Ok(entries)
}

async fn load_tags_sqlite(pool: &SqlitePool, entry_id: i64) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT tag FROM entry_tags WHERE entry_id = ? ORDER BY tag")
        .bind(entry_id)
        .fetch_all(pool)
        .await
        .context("Failed to load entry tags")?;

    Ok(rows.iter().map(|row| row.get("tag")).collect())
}

async fn replace_tags_sqlite(pool: &SqlitePool, entry_id: i64, tags: &[String]) -> Result<()> {
    sqlx::query("DELETE FROM entry_tags WHERE entry_id = ?")
        .bind(entry_id)
        .execute(pool)
        .await
        .context("Failed to clear entry tags")?;

    for tag in tags {
        sqlx::query("INSERT OR IGNORE INTO entry_tags (entry_id, tag) VALUES (?, ?)")
            .bind(entry_id)
            .bind(tag)
            .execute(pool)
            .await
            .context("Failed to insert entry tag")?;
    }

    Ok(())
}

fn row_to_entry_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<WeblogEntry> {
    let status_str: String = row.get("status");
    let status = EntryStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid entry status: {}", status_str))?;

    Ok(WeblogEntry {
        id: row.get("id"),
        weblog_id: row.get("weblog_id"),
        anchor: row.get("anchor"),
        title: row.get("title"),
        text: row.get("text"),
        text_html: row.get("text_html"),
        category_id: row.get("category_id"),
        author_id: row.get("author_id"),
        status,
        pub_time: row.get("pub_time"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        tags: Vec::new(),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_entry_mysql(
    pool: &MySqlPool,
    input: &CreateEntryInput,
    text_html: &str,
) -> Result<WeblogEntry> {
    let now = Utc::now();
    let status = input.status.unwrap_or_default();
    let pub_time = if status == EntryStatus::Published {
        Some(now)
    } else {
        None
    };

    let result = sqlx::query(
        r#"
        INSERT INTO weblog_entries (weblog_id, anchor, title, text, text_html, category_id, author_id, status, pub_time, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.weblog_id)
    .bind(&input.anchor)
    .bind(&input.title)
    .bind(&input.text)
    .bind(text_html)
    .bind(input.category_id)
    .bind(input.author_id)
    .bind(status.as_str())
    .bind(pub_time)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create entry")?;

    let id = result.last_insert_id() as i64;

    replace_tags_mysql(pool, id, &input.tags).await?;

    Ok(WeblogEntry {
        id,
        weblog_id: input.weblog_id,
        anchor: input.anchor.clone(),
        title: input.title.clone(),
        text: input.text.clone(),
        text_html: text_html.to_string(),
        category_id: input.category_id,
        author_id: input.author_id,
        status,
        pub_time,
        created_at: now,
        updated_at: now,
        tags: input.tags.clone(),
    })
}

async fn get_entry_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<WeblogEntry>> {
    let row = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM weblog_entries WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get entry by ID")?;

    match row {
        Some(row) => {
            let mut entry = row_to_entry_mysql(&row)?;
            entry.tags = load_tags_mysql(pool, entry.id).await?;
            Ok(Some(entry))
        }
        None => Ok(None),
    }
}

async fn get_entry_by_anchor_mysql(
    pool: &MySqlPool,
    weblog_id: i64,
    anchor: &str,
) -> Result<Option<WeblogEntry>> {
    let row = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM weblog_entries WHERE weblog_id = ? AND anchor = ?"
    ))
    .bind(weblog_id)
    .bind(anchor)
    .fetch_optional(pool)
    .await
    .context("Failed to get entry by anchor")?;

    match row {
        Some(row) => {
            let mut entry = row_to_entry_mysql(&row)?;
            entry.tags = load_tags_mysql(pool, entry.id).await?;
            Ok(Some(entry))
        }
        None => Ok(None),
    }
}

async fn exists_by_anchor_mysql(pool: &MySqlPool, weblog_id: i64, anchor: &str) -> Result<bool> {
    let row = sqlx::query(
        "SELECT COUNT(*) as count FROM weblog_entries WHERE weblog_id = ? AND anchor = ?",
    )
    .bind(weblog_id)
    .bind(anchor)
    .fetch_one(pool)
    .await
    .context("Failed to check anchor existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn update_entry_mysql(
    pool: &MySqlPool,
    id: i64,
    input: &UpdateEntryInput,
    text_html: Option<&str>,
) -> Result<WeblogEntry> {
    let existing = get_entry_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Entry not found"))?;

    let now = Utc::now();
    let new_anchor = input.anchor.as_ref().unwrap_or(&existing.anchor);
    let new_title = input.title.as_ref().unwrap_or(&existing.title);
    let new_text = input.text.as_ref().unwrap_or(&existing.text);
    let new_text_html = text_html.unwrap_or(&existing.text_html);
    let new_category_id = input.category_id.unwrap_or(existing.category_id);
    let new_status = input.status.unwrap_or(existing.status);
    let new_pub_time = if new_status == EntryStatus::Published {
        existing.pub_time.or(Some(now))
    } else {
        existing.pub_time
    };

    sqlx::query(
        r#"
        UPDATE weblog_entries
        SET anchor = ?, title = ?, text = ?, text_html = ?, category_id = ?, status = ?, pub_time = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(new_anchor)
    .bind(new_title)
    .bind(new_text)
    .bind(new_text_html)
    .bind(new_category_id)
    .bind(new_status.as_str())
    .bind(new_pub_time)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update entry")?;

    let tags = match &input.tags {
        Some(tags) => {
            replace_tags_mysql(pool, id, tags).await?;
            tags.clone()
        }
        None => existing.tags.clone(),
    };

    Ok(WeblogEntry {
        id,
        weblog_id: existing.weblog_id,
        anchor: new_anchor.clone(),
        title: new_title.clone(),
        text: new_text.clone(),
        text_html: new_text_html.to_string(),
        category_id: new_category_id,
        author_id: existing.author_id,
        status: new_status,
        pub_time: new_pub_time,
        created_at: existing.created_at,
        updated_at: now,
        tags,
    })
}

async fn delete_entry_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM weblog_entries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete entry")?;
    Ok(())
}

async fn list_published_mysql(
    pool: &MySqlPool,
    weblog_id: i64,
    offset: i64,
    limit: i64,
) -> Result<Vec<WeblogEntry>> {
    let rows = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM weblog_entries WHERE weblog_id = ? AND status = 'published' ORDER BY pub_time DESC LIMIT ? OFFSET ?"
    ))
    .bind(weblog_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list published entries")?;

    let mut entries = Vec::new();
    for row in rows {
        let mut entry = row_to_entry_mysql(&row)?;
        entry.tags = load_tags_mysql(pool, entry.id).await?;
        entries.push(entry);
    }

    Ok(entries)
}

async fn count_published_mysql(pool: &MySqlPool, weblog_id: i64) -> Result<i64> {
    let row = sqlx::query(
        "SELECT COUNT(*) as count FROM weblog_entries WHERE weblog_id = ? AND status = 'published'",
    )
    .bind(weblog_id)
    .fetch_one(pool)
    .await
    .context("Failed to count published entries")?;

    Ok(row.get("count"))
}

async fn list_all_published_mysql(pool: &MySqlPool) -> Result<Vec<WeblogEntry>> {
    let rows = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM weblog_entries WHERE status = 'published' ORDER BY pub_time DESC"
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list published entries")?;

    let mut entries = Vec::new();
    for row in rows {
        let mut entry = row_to_entry_mysql(&row)?;
        entry.tags = load_tags_mysql(pool, entry.id).await?;
        entries.push(entry);
    }

    Ok(entries)
}

async fn load_tags_mysql(pool: &MySqlPool, entry_id: i64) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT tag FROM entry_tags WHERE entry_id = ? ORDER BY tag")
        .bind(entry_id)
        .fetch_all(pool)
        .await
        .context("Failed to load entry tags")?;

    Ok(rows.iter().map(|row| row.get("tag")).collect())
}

async fn replace_tags_mysql(pool: &MySqlPool, entry_id: i64, tags: &[String]) -> Result<()> {
    sqlx::query("DELETE FROM entry_tags WHERE entry_id = ?")
        .bind(entry_id)
        .execute(pool)
        .await
        .context("Failed to clear entry tags")?;

    for tag in tags {
        sqlx::query("INSERT IGNORE INTO entry_tags (entry_id, tag) VALUES (?, ?)")
            .bind(entry_id)
            .bind(tag)
            .execute(pool)
            .await
            .context("Failed to insert entry tag")?;
    }

    Ok(())
}

fn row_to_entry_mysql(row: &sqlx::mysql::MySqlRow) -> Result<WeblogEntry> {
    let status_str: String = row.get("status");
    let status = EntryStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid entry status: {}", status_str))?;

    Ok(WeblogEntry {
        id: row.get("id"),
        weblog_id: row.get("weblog_id"),
        anchor: row.get("anchor"),
        title: row.get("title"),
        text: row.get("text"),
        text_html: row.get("text_html"),
        category_id: row.get("category_id"),
        author_id: row.get("author_id"),
        status,
        pub_time: row.get("pub_time"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        tags: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CategoryRepository, SqlxCategoryRepository, SqlxUserRepository, SqlxWeblogRepository,
        UserRepository, WeblogRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateWeblogInput, UserRole};

    struct Fixture {
        entries: Arc<dyn EntryRepository>,
        weblog_id: i64,
        category_id: i64,
        author_id: i64,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::boxed(pool.clone());
        let author = users
            .create("author", "author@example.com", "h", UserRole::Author)
            .await
            .unwrap();

        let weblogs = SqlxWeblogRepository::boxed(pool.clone());
        let weblog = weblogs
            .create(&CreateWeblogInput::new("test", "Test", author.id))
            .await
            .unwrap();

        let categories = SqlxCategoryRepository::boxed(pool.clone());
        let category = categories
            .create(weblog.id, "General", "general")
            .await
            .unwrap();

        Fixture {
            entries: SqlxEntryRepository::boxed(pool),
            weblog_id: weblog.id,
            category_id: category.id,
            author_id: author.id,
        }
    }

    fn entry_input(f: &Fixture, anchor: &str, title: &str) -> CreateEntryInput {
        CreateEntryInput::new(f.weblog_id, title, "Some text", f.category_id, f.author_id)
            .with_anchor(anchor)
    }

    #[tokio::test]
    async fn test_create_draft_has_no_pub_time() {
        let f = setup().await;

        let entry = f
            .entries
            .create(&entry_input(&f, "draft-post", "Draft"), "<p>Some text</p>")
            .await
            .unwrap();

        assert!(entry.id > 0);
        assert_eq!(entry.status, EntryStatus::Draft);
        assert!(entry.pub_time.is_none());
    }

    #[tokio::test]
    async fn test_create_published_sets_pub_time() {
        let f = setup().await;

        let input =
            entry_input(&f, "live-post", "Live").with_status(EntryStatus::Published);
        let entry = f.entries.create(&input, "<p>Some text</p>").await.unwrap();

        assert_eq!(entry.status, EntryStatus::Published);
        assert!(entry.pub_time.is_some());
    }

    #[tokio::test]
    async fn test_tags_round_trip() {
        let f = setup().await;

        let input = entry_input(&f, "tagged", "Tagged")
            .with_tags(vec!["trek".to_string(), "space".to_string()]);
        let entry = f.entries.create(&input, "<p>t</p>").await.unwrap();

        let found = f
            .entries
            .get_by_id(entry.id)
            .await
            .unwrap()
            .expect("Entry not found");
        assert_eq!(found.tags, vec!["space".to_string(), "trek".to_string()]);
    }

    #[tokio::test]
    async fn test_update_status_keeps_pub_time() {
        let f = setup().await;

        let input = entry_input(&f, "pub-then-draft", "Post").with_status(EntryStatus::Published);
        let entry = f.entries.create(&input, "<p>t</p>").await.unwrap();
        let first_pub = entry.pub_time;

        let updated = f
            .entries
            .update(
                entry.id,
                &UpdateEntryInput::new().with_status(EntryStatus::Draft),
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.status, EntryStatus::Draft);
        assert_eq!(updated.pub_time, first_pub);

        let republished = f
            .entries
            .update(
                entry.id,
                &UpdateEntryInput::new().with_status(EntryStatus::Published),
                None,
            )
            .await
            .unwrap();
        assert_eq!(republished.pub_time, first_pub);
    }

    #[tokio::test]
    async fn test_list_and_count_published() {
        let f = setup().await;

        f.entries
            .create(&entry_input(&f, "one", "One").with_status(EntryStatus::Published), "<p>1</p>")
            .await
            .unwrap();
        f.entries
            .create(&entry_input(&f, "two", "Two").with_status(EntryStatus::Published), "<p>2</p>")
            .await
            .unwrap();
        f.entries
            .create(&entry_input(&f, "hidden", "Hidden"), "<p>3</p>")
            .await
            .unwrap();

        let listed = f.entries.list_published(f.weblog_id, 0, 10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(f.entries.count_published(f.weblog_id).await.unwrap(), 2);
        assert_eq!(f.entries.list_all_published().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_entry_and_tags() {
        let f = setup().await;

        let input = entry_input(&f, "doomed", "Doomed").with_tags(vec!["gone".to_string()]);
        let entry = f.entries.create(&input, "<p>t</p>").await.unwrap();

        f.entries.delete(entry.id).await.unwrap();
        assert!(f.entries.get_by_id(entry.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exists_by_anchor() {
        let f = setup().await;

        assert!(!f.entries.exists_by_anchor(f.weblog_id, "post").await.unwrap());
        f.entries
            .create(&entry_input(&f, "post", "Post"), "<p>t</p>")
            .await
            .unwrap();
        assert!(f.entries.exists_by_anchor(f.weblog_id, "post").await.unwrap());
    }
}
