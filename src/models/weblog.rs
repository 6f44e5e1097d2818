//! Weblog model
//!
//! This module defines the Weblog entity. The platform hosts many weblogs;
//! each is identified by a unique, URL-safe handle. The handle is also the
//! scope key for weblog-restricted searches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weblog entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Weblog {
    /// Unique identifier
    pub id: i64,
    /// Unique URL-safe handle, e.g. "captains-log"
    pub handle: String,
    /// Display name
    pub name: String,
    /// Short tagline shown under the name
    pub tagline: Option<String>,
    /// Owning user ID
    pub owner_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Weblog {
    /// Create a new Weblog with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(handle: String, name: String, tagline: Option<String>, owner_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            handle,
            name,
            tagline,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a new weblog
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWeblogInput {
    /// Unique URL-safe handle
    pub handle: String,
    /// Display name
    pub name: String,
    /// Short tagline (optional)
    #[serde(default)]
    pub tagline: Option<String>,
    /// Owning user ID
    pub owner_id: i64,
}

impl CreateWeblogInput {
    /// Create a new CreateWeblogInput
    pub fn new(handle: impl Into<String>, name: impl Into<String>, owner_id: i64) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
            tagline: None,
            owner_id,
        }
    }

    /// Set the tagline
    pub fn with_tagline(mut self, tagline: impl Into<String>) -> Self {
        self.tagline = Some(tagline.into());
        self
    }
}

/// Check whether a handle is valid: lowercase letters, digits and hyphens,
/// starting with a letter or digit.
pub fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty()
        && handle.len() <= 64
        && !handle.starts_with('-')
        && !handle.ends_with('-')
        && handle
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
