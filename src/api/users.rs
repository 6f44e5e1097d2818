//! User API endpoints
//!
//! Handles HTTP requests for user management:
//! - POST /api/v1/users - Create new user

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::common::ErrorResponse;
use crate::api::AppState;
use crate::models::{CreateUserInput, User};

/// Response for a single user; never exposes the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// POST /api/v1/users
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<UserResponse>), ErrorResponse> {
    let user = state.user_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}
