//! Weblog repository
//!
//! Database operations for weblogs.
//!
//! This module provides:
//! - `WeblogRepository` trait defining the interface for weblog data access
//! - `SqlxWeblogRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateWeblogInput, Weblog};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Weblog repository trait
#[async_trait]
pub trait WeblogRepository: Send + Sync {
    /// Create a new weblog
    async fn create(&self, input: &CreateWeblogInput) -> Result<Weblog>;

    /// Get weblog by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Weblog>>;

    /// Get weblog by handle
    async fn get_by_handle(&self, handle: &str) -> Result<Option<Weblog>>;

    /// Check if a handle already exists
    async fn exists_by_handle(&self, handle: &str) -> Result<bool>;

    /// List all weblog handles (used for full index rebuilds)
    async fn list_handles(&self) -> Result<Vec<String>>;

    /// List weblogs with pagination
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Weblog>>;

    /// Delete a weblog (entries and categories cascade)
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based weblog repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxWeblogRepository {
    pool: DynDatabasePool,
}

impl SqlxWeblogRepository {
    /// Create a new SQLx weblog repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn WeblogRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl WeblogRepository for SqlxWeblogRepository {
    async fn create(&self, input: &CreateWeblogInput) -> Result<Weblog> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_weblog_sqlite(self.pool.as_sqlite().unwrap(), input).await
            }
            DatabaseDriver::Mysql => {
                create_weblog_mysql(self.pool.as_mysql().unwrap(), input).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Weblog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_weblog_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_weblog_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn get_by_handle(&self, handle: &str) -> Result<Option<Weblog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_weblog_by_handle_sqlite(self.pool.as_sqlite().unwrap(), handle).await
            }
            DatabaseDriver::Mysql => {
                get_weblog_by_handle_mysql(self.pool.as_mysql().unwrap(), handle).await
            }
        }
    }

    async fn exists_by_handle(&self, handle: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_handle_sqlite(self.pool.as_sqlite().unwrap(), handle).await
            }
            DatabaseDriver::Mysql => {
                exists_by_handle_mysql(self.pool.as_mysql().unwrap(), handle).await
            }
        }
    }

    async fn list_handles(&self) -> Result<Vec<String>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_handles_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_handles_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Weblog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_weblogs_sqlite(self.pool.as_sqlite().unwrap(), offset, limit).await
            }
            DatabaseDriver::Mysql => {
                list_weblogs_mysql(self.pool.as_mysql().unwrap(), offset, limit).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_weblog_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_weblog_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

const WEBLOG_COLUMNS: &str = "id, handle, name, tagline, owner_id, created_at, updated_at";

async fn create_weblog_sqlite(pool: &SqlitePool, input: &CreateWeblogInput) -> Result<Weblog> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO weblogs (handle, name, tagline, owner_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.handle)
    .bind(&input.name)
    .bind(&input.tagline)
    .bind(input.owner_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create weblog")?;

    Ok(Weblog {
        id: result.last_insert_rowid(),
        handle: input.handle.clone(),
        name: input.name.clone(),
        tagline: input.tagline.clone(),
        owner_id: input.owner_id,
        created_at: now,
        updated_at: now,
    })
}

async fn get_weblog_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Weblog>> {
    let row = sqlx::query(&format!("SELECT {WEBLOG_COLUMNS} FROM weblogs WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get weblog by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_weblog_sqlite(&row))),
        None => Ok(None),
    }
}

async fn get_weblog_by_handle_sqlite(pool: &SqlitePool, handle: &str) -> Result<Option<Weblog>> {
    let row = sqlx::query(&format!(
        "SELECT {WEBLOG_COLUMNS} FROM weblogs WHERE handle = ?"
    ))
    .bind(handle)
    .fetch_optional(pool)
    .await
    .context("Failed to get weblog by handle")?;

    match row {
        Some(row) => Ok(Some(row_to_weblog_sqlite(&row))),
        None => Ok(None),
    }
}

async fn exists_by_handle_sqlite(pool: &SqlitePool, handle: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM weblogs WHERE handle = ?")
        .bind(handle)
        .fetch_one(pool)
        .await
        .context("Failed to check handle existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn list_handles_sqlite(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT handle FROM weblogs ORDER BY handle")
        .fetch_all(pool)
        .await
        .context("Failed to list weblog handles")?;

    Ok(rows.iter().map(|row| row.get("handle")).collect())
}

async fn list_weblogs_sqlite(pool: &SqlitePool, offset: i64, limit: i64) -> Result<Vec<Weblog>> {
    let rows = sqlx::query(&format!(
        "SELECT {WEBLOG_COLUMNS} FROM weblogs ORDER BY created_at DESC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list weblogs")?;

    Ok(rows.iter().map(row_to_weblog_sqlite).collect())
}

async fn delete_weblog_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM weblogs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete weblog")?;
    Ok(())
}

fn row_to_weblog_sqlite(row: &sqlx::sqlite::SqliteRow) -> Weblog {
    Weblog {
        id: row.get("id"),
        handle: row.get("handle"),
        name: row.get("name"),
        tagline: row.try_get("tagline").ok(),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_weblog_mysql(pool: &MySqlPool, input: &CreateWeblogInput) -> Result<Weblog> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO weblogs (handle, name, tagline, owner_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.handle)
    .bind(&input.name)
    .bind(&input.tagline)
    .bind(input.owner_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create weblog")?;

    Ok(Weblog {
        id: result.last_insert_id() as i64,
        handle: input.handle.clone(),
        name: input.name.clone(),
        tagline: input.tagline.clone(),
        owner_id: input.owner_id,
        created_at: now,
        updated_at: now,
    })
}

async fn get_weblog_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Weblog>> {
    let row = sqlx::query(&format!("SELECT {WEBLOG_COLUMNS} FROM weblogs WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get weblog by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_weblog_mysql(&row))),
        None => Ok(None),
    }
}

async fn get_weblog_by_handle_mysql(pool: &MySqlPool, handle: &str) -> Result<Option<Weblog>> {
    let row = sqlx::query(&format!(
        "SELECT {WEBLOG_COLUMNS} FROM weblogs WHERE handle = ?"
    ))
    .bind(handle)
    .fetch_optional(pool)
    .await
    .context("Failed to get weblog by handle")?;

    match row {
        Some(row) => Ok(Some(row_to_weblog_mysql(&row))),
        None => Ok(None),
    }
}

async fn exists_by_handle_mysql(pool: &MySqlPool, handle: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM weblogs WHERE handle = ?")
        .bind(handle)
        .fetch_one(pool)
        .await
        .context("Failed to check handle existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn list_handles_mysql(pool: &MySqlPool) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT handle FROM weblogs ORDER BY handle")
        .fetch_all(pool)
        .await
        .context("Failed to list weblog handles")?;

    Ok(rows.iter().map(|row| row.get("handle")).collect())
}

async fn list_weblogs_mysql(pool: &MySqlPool, offset: i64, limit: i64) -> Result<Vec<Weblog>> {
    let rows = sqlx::query(&format!(
        "SELECT {WEBLOG_COLUMNS} FROM weblogs ORDER BY created_at DESC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list weblogs")?;

    Ok(rows.iter().map(row_to_weblog_mysql).collect())
}

async fn delete_weblog_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM weblogs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete weblog")?;
    Ok(())
}

fn row_to_weblog_mysql(row: &sqlx::mysql::MySqlRow) -> Weblog {
    Weblog {
        id: row.get("id"),
        handle: row.get("handle"),
        name: row.get("name"),
        tagline: row.try_get("tagline").ok(),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
