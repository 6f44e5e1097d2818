//! Search request parsing.
//!
//! Converts raw HTTP query parameters into a structured search request. The
//! parser is total: malformed numbers fall back to defaults, blank values
//! count as absent. Whether a term is present is checked downstream by the
//! results model, not here.

use serde::Deserialize;

/// Raw query parameters accepted by the search endpoints.
///
/// `page` is taken as a string so a malformed value degrades to page 0
/// instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Search term
    #[serde(default)]
    pub q: Option<String>,
    /// Category name filter
    #[serde(default)]
    pub cat: Option<String>,
    /// Result page (0-based)
    #[serde(default)]
    pub page: Option<String>,
}

/// A parsed search request
#[derive(Debug, Clone, PartialEq)]
pub struct WeblogSearchRequest {
    /// Weblog handle scoping the search; `None` for site-wide search
    pub weblog_handle: Option<String>,
    /// Search term (may be empty; validated by the results model)
    pub query: String,
    /// Category name filter
    pub category: Option<String>,
    /// Result page (0-based)
    pub page: usize,
}

impl WeblogSearchRequest {
    /// Build a request from the route's weblog handle and query parameters
    pub fn from_params(weblog_handle: Option<String>, params: &SearchParams) -> Self {
        let query = params
            .q
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string();

        let category = params
            .cat
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let page = params
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(0);

        Self {
            weblog_handle,
            query,
            category,
            page,
        }
    }

    /// Whether the search spans all weblogs
    pub fn is_site_wide(&self) -> bool {
        self.weblog_handle.is_none()
    }
}
