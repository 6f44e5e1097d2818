//! Search query types and term preprocessing.
//!
//! Raw user terms are sanitized before they reach Tantivy's query parser:
//! syntax characters that readers plausibly paste (braces, brackets, colons,
//! boolean punctuation) are escaped so they search literally instead of
//! failing to parse. Double quotes are left alone so phrase queries keep
//! working.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// Collapses runs of whitespace so the parser never sees empty clauses.
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Preprocess a raw search term for the query parser.
///
/// Trims and collapses whitespace, then escapes Tantivy syntax characters:
/// `: { } [ ] ( ) ^ ~ * \ + - !`. Double quotes are preserved so phrase
/// queries remain possible.
///
/// # Examples
///
/// ```
/// use folio::search::preprocess_term;
///
/// assert_eq!(preprocess_term("  warp   drive "), "warp drive");
/// assert_eq!(preprocess_term("NCC-1701"), "NCC\\-1701");
/// assert_eq!(preprocess_term("\"exact phrase\""), "\"exact phrase\"");
/// ```
pub fn preprocess_term(raw: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw.trim(), " ");

    let mut result = String::with_capacity(collapsed.len() * 2);
    for ch in collapsed.chars() {
        match ch {
            ':' | '{' | '}' | '[' | ']' | '(' | ')' | '^' | '~' | '*' | '\\' | '+' | '-'
            | '!' => {
                result.push('\\');
                result.push(ch);
            }
            _ => result.push(ch),
        }
    }
    result
}

/// A structured search query against the entry index
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Raw search term (preprocessed before parsing)
    pub term: String,
    /// Restrict hits to this weblog handle
    pub weblog: Option<String>,
    /// Restrict hits to this category name
    pub category: Option<String>,
    /// Number of leading hits to skip
    pub offset: usize,
    /// Maximum hits to return; 0 means the manager's default
    pub limit: usize,
}

impl SearchQuery {
    /// Create a query for a term with default pagination
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            weblog: None,
            category: None,
            offset: 0,
            limit: 0,
        }
    }

    /// Restrict the query to a weblog handle
    pub fn with_weblog(mut self, handle: impl Into<String>) -> Self {
        self.weblog = Some(handle.into());
        self
    }

    /// Restrict the query to a category name
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the pagination window
    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}

/// A single search hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Store identifier of the entry
    pub entry_id: i64,
    /// Handle of the owning weblog
    pub weblog: String,
    /// URL anchor within the weblog
    pub anchor: String,
    /// Entry title
    pub title: String,
    /// Category name
    pub category: String,
    /// BM25 relevance score
    pub score: f32,
}

/// The outcome of a search
#[derive(Debug, Clone, Serialize)]
pub struct SearchHits {
    /// Hits within the requested pagination window, best first
    pub hits: Vec<SearchHit>,
    /// Total number of matching documents across all pages
    pub total: usize,
}
