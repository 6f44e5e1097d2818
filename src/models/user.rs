//! User model
//!
//! This module defines the User entity and related types. Users own weblogs
//! and author weblog entries; they are referenced by the search index so a
//! hit can be attributed to its author.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Unique login name
    pub username: String,
    /// Contact email address
    pub email: String,
    /// Argon2 password hash (PHC string format)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role within the platform
    pub role: UserRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular author - may own weblogs and publish entries
    Author,
    /// Administrator - full access
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Author
    }
}

impl UserRole {
    /// Convert role to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Author => "author",
            UserRole::Admin => "admin",
        }
    }

    /// Parse role from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "author" => Some(UserRole::Author),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    /// Unique login name
    pub username: String,
    /// Contact email address
    pub email: String,
    /// Plaintext password (hashed by the user service before storage)
    pub password: String,
    /// Role (defaults to Author)
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl CreateUserInput {
    /// Create a new CreateUserInput
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role: None,
        }
    }

    /// Set the role
    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }
}
