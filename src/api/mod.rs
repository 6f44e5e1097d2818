//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the Folio weblog system.
//! It includes:
//! - Weblog and category endpoints
//! - Entry endpoints
//! - Search endpoints backed by the results rendering model
//! - User endpoints

pub mod common;
pub mod entries;
pub mod search;
pub mod users;
pub mod weblogs;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::repositories::EntryRepository;
use crate::db::DynDatabasePool;
use crate::search::IndexManager;
use crate::services::{EntryService, UserService, WeblogService};

pub use common::{ApiError, ApiErrorDetail};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub user_service: Arc<UserService>,
    pub weblog_service: Arc<WeblogService>,
    pub entry_service: Arc<EntryService>,
    pub entry_repo: Arc<dyn EntryRepository>,
    pub index_manager: Arc<IndexManager>,
}

/// Build the main API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .route("/users", axum::routing::post(users::create_user_handler))
        .route("/weblogs", axum::routing::post(weblogs::create_weblog_handler))
        .route(
            "/weblogs/{handle}",
            axum::routing::get(weblogs::get_weblog_handler),
        )
        .route(
            "/weblogs/{handle}",
            axum::routing::delete(weblogs::delete_weblog_handler),
        )
        .route(
            "/weblogs/{handle}/categories",
            axum::routing::get(weblogs::list_categories_handler),
        )
        .route(
            "/weblogs/{handle}/categories",
            axum::routing::post(weblogs::create_category_handler),
        )
        .route("/entries", axum::routing::post(entries::create_entry_handler))
        .route(
            "/entries/{id}",
            axum::routing::put(entries::update_entry_handler),
        )
        .route(
            "/entries/{id}",
            axum::routing::delete(entries::delete_entry_handler),
        )
        .route(
            "/weblogs/{handle}/entries",
            axum::routing::get(entries::list_entries_handler),
        )
        .route(
            "/weblogs/{handle}/entries/{anchor}",
            axum::routing::get(entries::get_entry_handler),
        )
        .route("/search", axum::routing::get(search::site_search_handler))
        .route(
            "/weblogs/{handle}/search",
            axum::routing::get(search::weblog_search_handler),
        )
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api/v1", build_api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
