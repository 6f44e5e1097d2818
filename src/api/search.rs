//! Search API endpoints
//!
//! Handles HTTP search requests through the results rendering model:
//! - GET /api/v1/search - Site-wide search
//! - GET /api/v1/weblogs/{handle}/search - Weblog-scoped search
//!
//! Both endpoints parse the query parameters into a `WeblogSearchRequest`,
//! run it through `SearchResultsModel`, and serialize the model's view. A
//! rejected term is reported inside the body rather than as an HTTP error,
//! matching how the search page renders.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::api::common::{not_found, ErrorResponse};
use crate::api::entries::EntryResponse;
use crate::api::AppState;
use crate::rendering::{SearchParams, SearchResultsModel, WeblogSearchRequest};

/// One day of search results
#[derive(Debug, Serialize)]
pub struct DayGroupResponse {
    pub day: String,
    pub entries: Vec<EntryResponse>,
}

/// Response body for search requests
#[derive(Debug, Serialize)]
pub struct SearchResultsResponse {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weblog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub page: usize,
    pub limit: usize,
    pub offset: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_prev: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<String>,
    pub categories: Vec<String>,
    pub days: Vec<DayGroupResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResultsResponse {
    fn from_model(model: &SearchResultsModel) -> Self {
        Self {
            query: model.query().to_string(),
            weblog: model.weblog_handle().map(str::to_string),
            category: model.category().map(str::to_string),
            page: model.page(),
            limit: model.limit(),
            offset: model.offset(),
            total: model.results_count(),
            has_next: model.has_next(),
            has_prev: model.has_prev(),
            next_page: model.next_page_link(),
            prev_page: model.prev_page_link(),
            categories: model.categories().iter().cloned().collect(),
            days: model
                .results()
                .iter()
                .map(|group| DayGroupResponse {
                    day: group.day.to_string(),
                    entries: group
                        .entries
                        .iter()
                        .cloned()
                        .map(EntryResponse::from)
                        .collect(),
                })
                .collect(),
            error: model.error_message().map(str::to_string),
        }
    }
}

/// GET /api/v1/search
pub async fn site_search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResultsResponse>, ErrorResponse> {
    let request = WeblogSearchRequest::from_params(None, &params);
    let model = SearchResultsModel::init(request, &state.index_manager, &state.entry_repo).await;
    Ok(Json(SearchResultsResponse::from_model(&model)))
}

/// GET /api/v1/weblogs/{handle}/search
pub async fn weblog_search_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResultsResponse>, ErrorResponse> {
    // Searching an unknown weblog is a 404, not an empty result page
    state
        .weblog_service
        .get_by_handle(&handle)
        .await?
        .ok_or_else(|| not_found(format!("Weblog not found: {}", handle)))?;

    let request = WeblogSearchRequest::from_params(Some(handle), &params);
    let model = SearchResultsModel::init(request, &state.index_manager, &state.entry_repo).await;
    Ok(Json(SearchResultsResponse::from_model(&model)))
}
