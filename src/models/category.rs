//! Weblog category model
//!
//! Each weblog organizes its entries into categories. Every weblog receives
//! a default "General" category at creation time, and every entry belongs to
//! exactly one category of its weblog. Category names also appear as a facet
//! on search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity scoped to a single weblog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeblogCategory {
    /// Unique identifier
    pub id: i64,
    /// Owning weblog ID
    pub weblog_id: i64,
    /// Display name, unique within the weblog
    pub name: String,
    /// URL-friendly slug, unique within the weblog
    pub slug: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl WeblogCategory {
    /// Create a new WeblogCategory with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(weblog_id: i64, name: String, slug: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            weblog_id,
            name,
            slug,
            created_at: Utc::now(),
        }
    }

    /// Check if this category is the default category every weblog starts with
    pub fn is_default(&self) -> bool {
        self.slug == "general"
    }
}

/// Input for creating a new category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    /// Owning weblog ID
    pub weblog_id: i64,
    /// Display name
    pub name: String,
    /// URL-friendly slug (generated from the name when empty)
    #[serde(default)]
    pub slug: Option<String>,
}

impl CreateCategoryInput {
    /// Create a new CreateCategoryInput
    pub fn new(weblog_id: i64, name: impl Into<String>) -> Self {
        Self {
            weblog_id,
            name: name.into(),
            slug: None,
        }
    }

    /// Set the slug
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}
