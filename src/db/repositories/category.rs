//! Weblog category repository
//!
//! Database operations for weblog categories.
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::WeblogCategory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category (the slug must already be resolved)
    async fn create(&self, weblog_id: i64, name: &str, slug: &str) -> Result<WeblogCategory>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<WeblogCategory>>;

    /// Get category by slug within a weblog
    async fn get_by_slug(&self, weblog_id: i64, slug: &str) -> Result<Option<WeblogCategory>>;

    /// List all categories of a weblog
    async fn list_by_weblog(&self, weblog_id: i64) -> Result<Vec<WeblogCategory>>;

    /// Check if a slug already exists within a weblog
    async fn exists_by_slug(&self, weblog_id: i64, slug: &str) -> Result<bool>;

    /// Delete a category
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based category repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, weblog_id: i64, name: &str, slug: &str) -> Result<WeblogCategory> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_category_sqlite(self.pool.as_sqlite().unwrap(), weblog_id, name, slug).await
            }
            DatabaseDriver::Mysql => {
                create_category_mysql(self.pool.as_mysql().unwrap(), weblog_id, name, slug).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<WeblogCategory>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_category_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn get_by_slug(&self, weblog_id: i64, slug: &str) -> Result<Option<WeblogCategory>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_slug_sqlite(self.pool.as_sqlite().unwrap(), weblog_id, slug).await
            }
            DatabaseDriver::Mysql => {
                get_category_by_slug_mysql(self.pool.as_mysql().unwrap(), weblog_id, slug).await
            }
        }
    }

    async fn list_by_weblog(&self, weblog_id: i64) -> Result<Vec<WeblogCategory>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_categories_sqlite(self.pool.as_sqlite().unwrap(), weblog_id).await
            }
            DatabaseDriver::Mysql => {
                list_categories_mysql(self.pool.as_mysql().unwrap(), weblog_id).await
            }
        }
    }

    async fn exists_by_slug(&self, weblog_id: i64, slug: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_slug_sqlite(self.pool.as_sqlite().unwrap(), weblog_id, slug).await
            }
            DatabaseDriver::Mysql => {
                exists_by_slug_mysql(self.pool.as_mysql().unwrap(), weblog_id, slug).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_category_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => delete_category_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

const CATEGORY_COLUMNS: &str = "id, weblog_id, name, slug, created_at";

async fn create_category_sqlite(
    pool: &SqlitePool,
    weblog_id: i64,
    name: &str,
    slug: &str,
) -> Result<WeblogCategory> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO weblog_categories (weblog_id, name, slug, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(weblog_id)
    .bind(name)
    .bind(slug)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    Ok(WeblogCategory {
        id: result.last_insert_rowid(),
        weblog_id,
        name: name.to_string(),
        slug: slug.to_string(),
        created_at: now,
    })
}

async fn get_category_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<WeblogCategory>> {
    let row = sqlx::query(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM weblog_categories WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    Ok(row.map(|row| row_to_category_sqlite(&row)))
}

async fn get_category_by_slug_sqlite(
    pool: &SqlitePool,
    weblog_id: i64,
    slug: &str,
) -> Result<Option<WeblogCategory>> {
    let row = sqlx::query(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM weblog_categories WHERE weblog_id = ? AND slug = ?"
    ))
    .bind(weblog_id)
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by slug")?;

    Ok(row.map(|row| row_to_category_sqlite(&row)))
}

async fn list_categories_sqlite(pool: &SqlitePool, weblog_id: i64) -> Result<Vec<WeblogCategory>> {
    let rows = sqlx::query(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM weblog_categories WHERE weblog_id = ? ORDER BY name"
    ))
    .bind(weblog_id)
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    Ok(rows.iter().map(row_to_category_sqlite).collect())
}

async fn exists_by_slug_sqlite(pool: &SqlitePool, weblog_id: i64, slug: &str) -> Result<bool> {
    let row =
        sqlx::query("SELECT COUNT(*) as count FROM weblog_categories WHERE weblog_id = ? AND slug = ?")
            .bind(weblog_id)
            .bind(slug)
            .fetch_one(pool)
            .await
            .context("Failed to check category slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn delete_category_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM weblog_categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;
    Ok(())
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> WeblogCategory {
    WeblogCategory {
        id: row.get("id"),
        weblog_id: row.get("weblog_id"),
        name: row.get("name"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(
    pool: &MySqlPool,
    weblog_id: i64,
    name: &str,
    slug: &str,
) -> Result<WeblogCategory> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO weblog_categories (weblog_id, name, slug, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(weblog_id)
    .bind(name)
    .bind(slug)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    Ok(WeblogCategory {
        id: result.last_insert_id() as i64,
        weblog_id,
        name: name.to_string(),
        slug: slug.to_string(),
        created_at: now,
    })
}

async fn get_category_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<WeblogCategory>> {
    let row = sqlx::query(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM weblog_categories WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    Ok(row.map(|row| row_to_category_mysql(&row)))
}

async fn get_category_by_slug_mysql(
    pool: &MySqlPool,
    weblog_id: i64,
    slug: &str,
) -> Result<Option<WeblogCategory>> {
    let row = sqlx::query(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM weblog_categories WHERE weblog_id = ? AND slug = ?"
    ))
    .bind(weblog_id)
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by slug")?;

    Ok(row.map(|row| row_to_category_mysql(&row)))
}

async fn list_categories_mysql(pool: &MySqlPool, weblog_id: i64) -> Result<Vec<WeblogCategory>> {
    let rows = sqlx::query(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM weblog_categories WHERE weblog_id = ? ORDER BY name"
    ))
    .bind(weblog_id)
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    Ok(rows.iter().map(row_to_category_mysql).collect())
}

async fn exists_by_slug_mysql(pool: &MySqlPool, weblog_id: i64, slug: &str) -> Result<bool> {
    let row =
        sqlx::query("SELECT COUNT(*) as count FROM weblog_categories WHERE weblog_id = ? AND slug = ?")
            .bind(weblog_id)
            .bind(slug)
            .fetch_one(pool)
            .await
            .context("Failed to check category slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn delete_category_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM weblog_categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;
    Ok(())
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> WeblogCategory {
    WeblogCategory {
        id: row.get("id"),
        weblog_id: row.get("weblog_id"),
        name: row.get("name"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, SqlxWeblogRepository, UserRepository, WeblogRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateWeblogInput, UserRole};

    async fn setup() -> (Arc<dyn CategoryRepository>, i64) {
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
        let weblog = weblogs
            .create(&CreateWeblogInput::new("test", "Test", owner.id))
            .await
            .unwrap();

        (SqlxCategoryRepository::boxed(pool), weblog.id)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (repo, weblog_id) = setup().await;

        let category = repo
            .create(weblog_id, "General", "general")
            .await
            .expect("Failed to create category");

        assert!(category.id > 0);
        assert!(category.is_default());

        let found = repo
            .get_by_slug(weblog_id, "general")
            .await
            .unwrap()
            .expect("Category not found");
        assert_eq!(found.id, category.id);
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let (repo, weblog_id) = setup().await;

        repo.create(weblog_id, "Starships", "starships").await.unwrap();
        repo.create(weblog_id, "Away Missions", "away-missions")
            .await
            .unwrap();

        let list = repo.list_by_weblog(weblog_id).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Away Missions");
        assert_eq!(list[1].name, "Starships");
    }

    #[tokio::test]
    async fn test_exists_and_delete() {
        let (repo, weblog_id) = setup().await;

        let category = repo.create(weblog_id, "Temp", "temp").await.unwrap();
        assert!(repo.exists_by_slug(weblog_id, "temp").await.unwrap());

        repo.delete(category.id).await.unwrap();
        assert!(!repo.exists_by_slug(weblog_id, "temp").await.unwrap());
    }
}
