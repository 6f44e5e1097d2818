//! Weblog entry model
//!
//! This module provides:
//! - `WeblogEntry` entity representing a single post in a weblog
//! - `EntryStatus` enum for publication states
//! - Input types for creating and updating entries
//! - Pagination types for list queries
//!
//! Only published entries are visible to readers and to the search index;
//! drafts live solely in the content store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weblog entry entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeblogEntry {
    /// Unique identifier
    pub id: i64,
    /// Owning weblog ID
    pub weblog_id: i64,
    /// URL-friendly anchor, unique within the weblog
    pub anchor: String,
    /// Entry title
    pub title: String,
    /// Markdown text
    pub text: String,
    /// Rendered HTML text
    pub text_html: String,
    /// Category ID (must belong to the same weblog)
    pub category_id: i64,
    /// Author user ID
    pub author_id: i64,
    /// Publication status
    pub status: EntryStatus,
    /// Publication timestamp (set when the entry is first published)
    pub pub_time: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl WeblogEntry {
    /// Check whether the entry is visible to readers and the search index
    pub fn is_published(&self) -> bool {
        self.status == EntryStatus::Published
    }
}

/// Entry publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Draft - not visible to readers, never indexed
    Draft,
    /// Published - visible and indexed
    Published,
}

impl Default for EntryStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl EntryStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Published => "published",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(EntryStatus::Draft),
            "published" => Some(EntryStatus::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new weblog entry
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntryInput {
    /// Owning weblog ID
    pub weblog_id: i64,
    /// URL-friendly anchor (generated from the title when empty)
    #[serde(default)]
    pub anchor: String,
    /// Entry title
    pub title: String,
    /// Markdown text
    pub text: String,
    /// Category ID
    pub category_id: i64,
    /// Author user ID
    pub author_id: i64,
    /// Publication status (defaults to Draft)
    #[serde(default)]
    pub status: Option<EntryStatus>,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateEntryInput {
    /// Create a new CreateEntryInput
    pub fn new(
        weblog_id: i64,
        title: impl Into<String>,
        text: impl Into<String>,
        category_id: i64,
        author_id: i64,
    ) -> Self {
        Self {
            weblog_id,
            anchor: String::new(),
            title: title.into(),
            text: text.into(),
            category_id,
            author_id,
            status: None,
            tags: Vec::new(),
        }
    }

    /// Set the anchor
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = anchor.into();
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Input for updating an existing weblog entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEntryInput {
    /// New anchor (optional)
    pub anchor: Option<String>,
    /// New title (optional)
    pub title: Option<String>,
    /// New markdown text (optional)
    pub text: Option<String>,
    /// New category ID (optional)
    pub category_id: Option<i64>,
    /// New status (optional)
    pub status: Option<EntryStatus>,
    /// Replacement tag set (optional)
    pub tags: Option<Vec<String>>,
}

impl UpdateEntryInput {
    /// Create a new empty UpdateEntryInput
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.anchor.is_some()
            || self.title.is_some()
            || self.text.is_some()
            || self.category_id.is_some()
            || self.status.is_some()
            || self.tags.is_some()
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.per_page) as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        ((self.total as u32) + self.per_page - 1) / self.per_page
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(EntryStatus::from_str("draft"), Some(EntryStatus::Draft));
        assert_eq!(
            EntryStatus::from_str("Published"),
            Some(EntryStatus::Published)
        );
        assert_eq!(EntryStatus::from_str("scheduled"), None);
    }

    #[test]
    fn test_update_input_has_changes() {
        assert!(!UpdateEntryInput::new().has_changes());
        assert!(UpdateEntryInput::new().with_title("New").has_changes());
        assert!(UpdateEntryInput {
            tags: Some(vec![]),
            ..Default::default()
        }
        .has_changes());
    }

    #[test]
    fn test_list_params_offset() {
        let params = ListParams::new(3, 10);
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_list_params_clamps() {
        let params = ListParams::new(0, 1000);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
    }

    #[test]
    fn test_paged_result_pagination() {
        let params = ListParams::new(2, 10);
        let result = PagedResult::new(vec![1, 2, 3], 25, &params);
        assert_eq!(result.total_pages(), 3);
        assert!(result.has_next());
        assert!(result.has_prev());
        assert_eq!(result.len(), 3);
    }
}
