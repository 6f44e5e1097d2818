//! Entry API endpoints
//!
//! Handles HTTP requests for entry management:
//! - POST /api/v1/entries - Create new entry
//! - PUT /api/v1/entries/{id} - Update entry
//! - DELETE /api/v1/entries/{id} - Delete entry
//! - GET /api/v1/weblogs/{handle}/entries - List published entries
//! - GET /api/v1/weblogs/{handle}/entries/{anchor} - Get entry by anchor

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::common::{bad_request, not_found, ErrorResponse};
use crate::api::AppState;
use crate::models::{
    CreateEntryInput, EntryStatus, ListParams, UpdateEntryInput, WeblogEntry,
};

/// Query parameters for listing entries
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    10
}

/// Response for a single entry
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryResponse {
    pub id: i64,
    pub weblog_id: i64,
    pub anchor: String,
    pub title: String,
    pub text: String,
    pub text_html: String,
    pub category_id: i64,
    pub author_id: i64,
    pub status: String,
    pub pub_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Vec<String>,
}

impl From<WeblogEntry> for EntryResponse {
    fn from(entry: WeblogEntry) -> Self {
        Self {
            id: entry.id,
            weblog_id: entry.weblog_id,
            anchor: entry.anchor,
            title: entry.title,
            text: entry.text,
            text_html: entry.text_html,
            category_id: entry.category_id,
            author_id: entry.author_id,
            status: entry.status.to_string(),
            pub_time: entry.pub_time.map(|dt| dt.to_rfc3339()),
            created_at: entry.created_at.to_rfc3339(),
            updated_at: entry.updated_at.to_rfc3339(),
            tags: entry.tags,
        }
    }
}

/// Response for an entry list
#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub entries: Vec<EntryResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Request body for creating an entry
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub weblog_handle: String,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub anchor: String,
    /// Category slug within the weblog; defaults to "general"
    #[serde(default)]
    pub category: Option<String>,
    pub author_id: i64,
    #[serde(default)]
    pub status: Option<EntryStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request body for updating an entry
#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub anchor: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<EntryStatus>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// POST /api/v1/entries
pub async fn create_entry_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ErrorResponse> {
    let weblog = state
        .weblog_service
        .get_by_handle(&request.weblog_handle)
        .await?
        .ok_or_else(|| not_found(format!("Weblog not found: {}", request.weblog_handle)))?;

    let category_slug = request.category.as_deref().unwrap_or("general");
    let category = state
        .weblog_service
        .categories(weblog.id)
        .await?
        .into_iter()
        .find(|c| c.slug == category_slug)
        .ok_or_else(|| bad_request(format!("Unknown category: {}", category_slug)))?;

    let mut input = CreateEntryInput::new(
        weblog.id,
        request.title,
        request.text,
        category.id,
        request.author_id,
    )
    .with_anchor(request.anchor)
    .with_tags(request.tags);
    input.status = request.status;

    let entry = state.entry_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// PUT /api/v1/entries/{id}
pub async fn update_entry_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, ErrorResponse> {
    let input = UpdateEntryInput {
        anchor: request.anchor,
        title: request.title,
        text: request.text,
        category_id: request.category_id,
        status: request.status,
        tags: request.tags,
    };

    let entry = state.entry_service.update(id, input).await?;
    Ok(Json(entry.into()))
}

/// DELETE /api/v1/entries/{id}
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ErrorResponse> {
    state.entry_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/weblogs/{handle}/entries
pub async fn list_entries_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<EntryListResponse>, ErrorResponse> {
    let weblog = state
        .weblog_service
        .get_by_handle(&handle)
        .await?
        .ok_or_else(|| not_found(format!("Weblog not found: {}", handle)))?;

    let params = ListParams::new(query.page, query.page_size);
    let result = state.entry_service.list_published(weblog.id, &params).await?;

    Ok(Json(EntryListResponse {
        total: result.total,
        page: result.page,
        page_size: result.per_page,
        total_pages: result.total_pages(),
        entries: result.items.into_iter().map(EntryResponse::from).collect(),
    }))
}

/// GET /api/v1/weblogs/{handle}/entries/{anchor}
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path((handle, anchor)): Path<(String, String)>,
) -> Result<Json<EntryResponse>, ErrorResponse> {
    let weblog = state
        .weblog_service
        .get_by_handle(&handle)
        .await?
        .ok_or_else(|| not_found(format!("Weblog not found: {}", handle)))?;

    let entry = state
        .entry_service
        .get_by_anchor(weblog.id, &anchor)
        .await?
        .ok_or_else(|| not_found(format!("Entry not found: {}", anchor)))?;

    Ok(Json(entry.into()))
}
