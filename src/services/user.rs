//! User service
//!
//! Implements business logic for user management:
//! - User creation with Argon2 password hashing
//! - Credential verification
//! - Validation

use crate::db::repositories::UserRepository;
use crate::models::{CreateUserInput, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use std::sync::Arc;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// User not found
    #[error("User not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate username
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for managing platform users
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create a new user service
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Create a new user.
    ///
    /// # Errors
    /// - `ValidationError` if username, email or password is empty
    /// - `DuplicateUsername` if the username is taken
    pub async fn create(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        if input.username.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }
        if input.password.len() < 8 {
            return Err(UserServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self
            .repo
            .exists_by_username(&input.username)
            .await
            .context("Failed to check username uniqueness")?
        {
            return Err(UserServiceError::DuplicateUsername(input.username));
        }

        let password_hash = hash_password(&input.password)?;

        let user = self
            .repo
            .create(
                &input.username,
                &input.email,
                &password_hash,
                input.role.unwrap_or_default(),
            )
            .await
            .context("Failed to create user")?;

        tracing::info!("Created user {}", user.username);
        Ok(user)
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repo.get_by_id(id).await.context("Failed to get user")?)
    }

    /// Get a user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .repo
            .get_by_username(username)
            .await
            .context("Failed to get user")?)
    }

    /// Verify a username/password pair.
    ///
    /// Returns the user when the credentials match, `None` otherwise.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, UserServiceError> {
        let Some(user) = self
            .repo
            .get_by_username(username)
            .await
            .context("Failed to get user")?
        else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Delete a user
    pub async fn delete(&self, id: i64) -> Result<(), UserServiceError> {
        let user = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or_else(|| UserServiceError::NotFound(id.to_string()))?;

        self.repo.delete(id).await.context("Failed to delete user")?;
        tracing::info!("Deleted user {}", user.username);
        Ok(())
    }
}
