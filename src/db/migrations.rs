//! Database migrations module
//!
//! This module provides code-based database migrations for the Folio weblog
//! system. All migrations are embedded directly in Rust code as SQL strings,
//! supporting both SQLite and MySQL databases for single-binary deployment.
//!
//! # Usage
//!
//! ```ignore
//! use folio::db::{create_pool, migrations};
//!
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! ```
//!
//! # Architecture
//!
//! Each migration is defined as a `Migration` struct containing:
//! - `version`: Unique version number for ordering
//! - `name`: Human-readable migration name
//! - `up_sqlite`: SQL for SQLite database
//! - `up_mysql`: SQL for MySQL database

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};

use super::DynDatabasePool;
use crate::config::DatabaseDriver;

/// A database migration with SQL for both SQLite and MySQL
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements for SQLite
    pub up_sqlite: &'static str,
    /// SQL statements for MySQL
    pub up_mysql: &'static str,
}

/// Migration record stored in the database
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    /// Migration version number
    pub version: i64,
    /// Migration name/description
    pub name: String,
    /// When the migration was applied
    pub applied_at: DateTime<Utc>,
}

/// All migrations for the Folio weblog system.
/// These are embedded in the binary for single-binary deployment.
pub const MIGRATIONS: &[Migration] = &[
    // Migration 1: Create users table
    Migration {
        version: 1,
        name: "create_users",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                role VARCHAR(20) NOT NULL DEFAULT 'author',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                role VARCHAR(20) NOT NULL DEFAULT 'author',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            );
            CREATE INDEX idx_users_username ON users(username);
        "#,
    },
    // Migration 2: Create weblogs table
    Migration {
        version: 2,
        name: "create_weblogs",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS weblogs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                handle VARCHAR(64) NOT NULL UNIQUE,
                name VARCHAR(255) NOT NULL,
                tagline TEXT,
                owner_id INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_weblogs_handle ON weblogs(handle);
            CREATE INDEX IF NOT EXISTS idx_weblogs_owner_id ON weblogs(owner_id);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS weblogs (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                handle VARCHAR(64) NOT NULL UNIQUE,
                name VARCHAR(255) NOT NULL,
                tagline TEXT,
                owner_id BIGINT NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_weblogs_handle ON weblogs(handle);
            CREATE INDEX idx_weblogs_owner_id ON weblogs(owner_id);
        "#,
    },
    // Migration 3: Create weblog_categories table
    Migration {
        version: 3,
        name: "create_weblog_categories",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS weblog_categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                weblog_id INTEGER NOT NULL,
                name VARCHAR(100) NOT NULL,
                slug VARCHAR(100) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (weblog_id) REFERENCES weblogs(id) ON DELETE CASCADE,
                UNIQUE (weblog_id, slug)
            );
            CREATE INDEX IF NOT EXISTS idx_weblog_categories_weblog_id ON weblog_categories(weblog_id);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS weblog_categories (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                weblog_id BIGINT NOT NULL,
                name VARCHAR(100) NOT NULL,
                slug VARCHAR(100) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (weblog_id) REFERENCES weblogs(id) ON DELETE CASCADE,
                UNIQUE KEY uniq_weblog_slug (weblog_id, slug)
            );
            CREATE INDEX idx_weblog_categories_weblog_id ON weblog_categories(weblog_id);
        "#,
    },
    // Migration 4: Create weblog_entries table
    Migration {
        version: 4,
        name: "create_weblog_entries",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS weblog_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                weblog_id INTEGER NOT NULL,
                anchor VARCHAR(255) NOT NULL,
                title VARCHAR(255) NOT NULL,
                text TEXT NOT NULL,
                text_html TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                author_id INTEGER NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'draft',
                pub_time TIMESTAMP,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (weblog_id) REFERENCES weblogs(id) ON DELETE CASCADE,
                FOREIGN KEY (category_id) REFERENCES weblog_categories(id),
                FOREIGN KEY (author_id) REFERENCES users(id),
                UNIQUE (weblog_id, anchor)
            );
            CREATE INDEX IF NOT EXISTS idx_weblog_entries_weblog_id ON weblog_entries(weblog_id);
            CREATE INDEX IF NOT EXISTS idx_weblog_entries_category_id ON weblog_entries(category_id);
            CREATE INDEX IF NOT EXISTS idx_weblog_entries_status ON weblog_entries(status);
            CREATE INDEX IF NOT EXISTS idx_weblog_entries_pub_time ON weblog_entries(pub_time);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS weblog_entries (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                weblog_id BIGINT NOT NULL,
                anchor VARCHAR(255) NOT NULL,
                title VARCHAR(255) NOT NULL,
                text TEXT NOT NULL,
                text_html TEXT NOT NULL,
                category_id BIGINT NOT NULL,
                author_id BIGINT NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'draft',
                pub_time TIMESTAMP NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                FOREIGN KEY (weblog_id) REFERENCES weblogs(id) ON DELETE CASCADE,
                FOREIGN KEY (category_id) REFERENCES weblog_categories(id),
                FOREIGN KEY (author_id) REFERENCES users(id),
                UNIQUE KEY uniq_weblog_anchor (weblog_id, anchor)
            );
            CREATE INDEX idx_weblog_entries_weblog_id ON weblog_entries(weblog_id);
            CREATE INDEX idx_weblog_entries_category_id ON weblog_entries(category_id);
            CREATE INDEX idx_weblog_entries_status ON weblog_entries(status);
            CREATE INDEX idx_weblog_entries_pub_time ON weblog_entries(pub_time);
        "#,
    },
    // Migration 5: Create entry_tags table
    Migration {
        version: 5,
        name: "create_entry_tags",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS entry_tags (
                entry_id INTEGER NOT NULL,
                tag VARCHAR(100) NOT NULL,
                PRIMARY KEY (entry_id, tag),
                FOREIGN KEY (entry_id) REFERENCES weblog_entries(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_entry_tags_tag ON entry_tags(tag);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS entry_tags (
                entry_id BIGINT NOT NULL,
                tag VARCHAR(100) NOT NULL,
                PRIMARY KEY (entry_id, tag),
                FOREIGN KEY (entry_id) REFERENCES weblog_entries(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_entry_tags_tag ON entry_tags(tag);
        "#,
    },
];

/// Get a migration by version number
pub fn get_migration(version: i32) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.version == version)
}

/// Get the total number of migrations
pub fn total_migrations() -> usize {
    MIGRATIONS.len()
}

/// Run all pending migrations.
///
/// This function:
/// 1. Creates the migrations tracking table if it doesn't exist
/// 2. Checks which migrations have already been applied
/// 3. Runs any pending migrations in order
///
/// # Returns
///
/// Number of migrations applied
///
/// # Errors
///
/// Returns an error if any migration fails to apply
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = get_applied_migrations(pool).await?;
    let applied_versions: Vec<i32> = applied.iter().map(|m| m.version as i32).collect();

    let mut count = 0;

    for migration in MIGRATIONS {
        if !applied_versions.contains(&migration.version) {
            tracing::info!(
                "Applying migration {}: {}",
                migration.version,
                migration.name
            );
            apply_migration(pool, migration)
                .await
                .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

/// Create the migrations tracking table if it doesn't exist
async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
        DatabaseDriver::Mysql => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INT PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
    };

    pool.execute(sql).await?;
    Ok(())
}

/// Get list of already applied migrations
async fn get_applied_migrations(pool: &DynDatabasePool) -> Result<Vec<MigrationRecord>> {
    match pool.driver() {
        DatabaseDriver::Sqlite => get_applied_migrations_sqlite(pool.as_sqlite().unwrap()).await,
        DatabaseDriver::Mysql => get_applied_migrations_mysql(pool.as_mysql().unwrap()).await,
    }
}

async fn get_applied_migrations_sqlite(pool: &SqlitePool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    let mut records = Vec::new();
    for row in rows {
        records.push(MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        });
    }

    Ok(records)
}

async fn get_applied_migrations_mysql(pool: &MySqlPool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    let mut records = Vec::new();
    for row in rows {
        records.push(MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        });
    }

    Ok(records)
}

/// Apply a single migration
async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    match pool.driver() {
        DatabaseDriver::Sqlite => apply_migration_sqlite(pool.as_sqlite().unwrap(), migration).await,
        DatabaseDriver::Mysql => apply_migration_mysql(pool.as_mysql().unwrap(), migration).await,
    }
}

async fn apply_migration_sqlite(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    for statement in split_sql_statements(migration.up_sqlite) {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
        }
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;

    Ok(())
}

async fn apply_migration_mysql(pool: &MySqlPool, migration: &Migration) -> Result<()> {
    for statement in split_sql_statements(migration.up_mysql) {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
        }
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Truncate SQL for error messages
fn truncate_sql(sql: &str) -> String {
    if sql.len() > 100 {
        format!("{}...", &sql[..100])
    } else {
        sql.to_string()
    }
}

/// Split SQL into individual statements, handling comments properly
fn split_sql_statements(sql: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut current_start = 0;
    let mut in_statement = false;

    for (i, c) in sql.char_indices() {
        match c {
            ';' => {
                if in_statement {
                    let stmt = sql[current_start..i].trim();
                    if !stmt.is_empty() && !is_comment_only(stmt) {
                        statements.push(stmt);
                    }
                    in_statement = false;
                }
                current_start = i + 1;
            }
            _ if !c.is_whitespace() && !in_statement => {
                current_start = i;
                in_statement = true;
            }
            _ => {}
        }
    }

    // Handle last statement without trailing semicolon
    if in_statement {
        let stmt = sql[current_start..].trim();
        if !stmt.is_empty() && !is_comment_only(stmt) {
            statements.push(stmt);
        }
    }

    statements
}

/// Check if a SQL fragment consists only of comment lines
fn is_comment_only(sql: &str) -> bool {
    sql.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .all(|l| l.starts_with("--"))
}
