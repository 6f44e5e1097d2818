//! Weblog API endpoints
//!
//! Handles HTTP requests for weblog management:
//! - POST /api/v1/weblogs - Create new weblog
//! - GET /api/v1/weblogs/{handle} - Get weblog by handle
//! - DELETE /api/v1/weblogs/{handle} - Delete weblog
//! - GET /api/v1/weblogs/{handle}/categories - List categories
//! - POST /api/v1/weblogs/{handle}/categories - Create category

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::common::{not_found, ErrorResponse};
use crate::api::AppState;
use crate::models::{CreateCategoryInput, CreateWeblogInput, Weblog, WeblogCategory};

/// Response for a single weblog
#[derive(Debug, Serialize, Deserialize)]
pub struct WeblogResponse {
    pub id: i64,
    pub handle: String,
    pub name: String,
    pub tagline: Option<String>,
    pub owner_id: i64,
    pub created_at: String,
}

impl From<Weblog> for WeblogResponse {
    fn from(weblog: Weblog) -> Self {
        Self {
            id: weblog.id,
            handle: weblog.handle,
            name: weblog.name,
            tagline: weblog.tagline,
            owner_id: weblog.owner_id,
            created_at: weblog.created_at.to_rfc3339(),
        }
    }
}

/// Response for a single category
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub weblog_id: i64,
    pub name: String,
    pub slug: String,
}

impl From<WeblogCategory> for CategoryResponse {
    fn from(category: WeblogCategory) -> Self {
        Self {
            id: category.id,
            weblog_id: category.weblog_id,
            name: category.name,
            slug: category.slug,
        }
    }
}

/// Request body for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// POST /api/v1/weblogs
pub async fn create_weblog_handler(
    State(state): State<AppState>,
    Json(input): Json<CreateWeblogInput>,
) -> Result<(StatusCode, Json<WeblogResponse>), ErrorResponse> {
    let weblog = state.weblog_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(weblog.into())))
}

/// GET /api/v1/weblogs/{handle}
pub async fn get_weblog_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<WeblogResponse>, ErrorResponse> {
    let weblog = state
        .weblog_service
        .get_by_handle(&handle)
        .await?
        .ok_or_else(|| not_found(format!("Weblog not found: {}", handle)))?;

    Ok(Json(weblog.into()))
}

/// DELETE /api/v1/weblogs/{handle}
pub async fn delete_weblog_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    state.weblog_service.delete(&handle).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/weblogs/{handle}/categories
pub async fn list_categories_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Vec<CategoryResponse>>, ErrorResponse> {
    let weblog = state
        .weblog_service
        .get_by_handle(&handle)
        .await?
        .ok_or_else(|| not_found(format!("Weblog not found: {}", handle)))?;

    let categories = state.weblog_service.categories(weblog.id).await?;
    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// POST /api/v1/weblogs/{handle}/categories
pub async fn create_category_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ErrorResponse> {
    let weblog = state
        .weblog_service
        .get_by_handle(&handle)
        .await?
        .ok_or_else(|| not_found(format!("Weblog not found: {}", handle)))?;

    let mut input = CreateCategoryInput::new(weblog.id, request.name);
    input.slug = request.slug;

    let category = state.weblog_service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}
