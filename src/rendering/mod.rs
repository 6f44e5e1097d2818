//! Rendering models
//!
//! This module contains the page-model layer that sits between HTTP
//! requests and the view: structured request objects parsed from query
//! parameters, and result models that execute searches and shape the
//! outcome for rendering.

mod search_request;
mod search_results;

pub use search_request::{SearchParams, WeblogSearchRequest};
pub use search_results::{DayGroup, SearchResultsModel};
