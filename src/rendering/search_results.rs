//! Search results model.
//!
//! The page model behind the search views. Initialized from a parsed
//! `WeblogSearchRequest`, it executes the query against the index manager,
//! hydrates each hit back into the stored entry, and exposes the outcome
//! grouped by publication day with pagination helpers.
//!
//! The model never fails to build: an invalid or empty term, or an index
//! failure, becomes a user-visible error message while the rest of the page
//! renders normally. Hits whose entry has vanished from the store (a stale
//! index) are skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::repositories::EntryRepository;
use crate::models::WeblogEntry;
use crate::search::{IndexManager, SearchError, SearchQuery};

use super::search_request::WeblogSearchRequest;

/// Published entries of a single day, newest first
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    /// Publication day
    pub day: NaiveDate,
    /// Entries published that day, newest first
    pub entries: Vec<WeblogEntry>,
}

/// Page model for search results
#[derive(Debug)]
pub struct SearchResultsModel {
    request: WeblogSearchRequest,
    limit: usize,
    total: usize,
    days: Vec<DayGroup>,
    categories: BTreeSet<String>,
    error_message: Option<String>,
}

impl SearchResultsModel {
    /// Execute the request and build the model.
    ///
    /// `index` runs the query; `entries` hydrates hits back into stored
    /// entries for rendering.
    pub async fn init(
        request: WeblogSearchRequest,
        index: &IndexManager,
        entries: &Arc<dyn EntryRepository>,
    ) -> Self {
        let limit = index.default_limit();
        let mut model = Self {
            request,
            limit,
            total: 0,
            days: Vec::new(),
            categories: BTreeSet::new(),
            error_message: None,
        };

        let mut query = SearchQuery::new(&model.request.query)
            .with_page(model.request.page * limit, limit);
        if let Some(handle) = &model.request.weblog_handle {
            query = query.with_weblog(handle.clone());
        }
        if let Some(category) = &model.request.category {
            query = query.with_category(category.clone());
        }

        let hits = match index.search(&query) {
            Ok(hits) => hits,
            Err(SearchError::InvalidQuery(message)) => {
                model.error_message = Some(message);
                return model;
            }
            Err(e) => {
                tracing::error!("Search failed: {}", e);
                model.error_message = Some("Search is temporarily unavailable".to_string());
                return model;
            }
        };

        model.total = hits.total;

        let mut by_day: BTreeMap<NaiveDate, Vec<WeblogEntry>> = BTreeMap::new();
        for hit in hits.hits {
            let entry = match entries.get_by_id(hit.entry_id).await {
                Ok(Some(entry)) if entry.is_published() => entry,
                Ok(_) => {
                    // Stale index document; skip it
                    tracing::debug!("Search hit {} has no published entry", hit.entry_id);
                    continue;
                }
                Err(e) => {
                    tracing::error!("Failed to hydrate search hit {}: {}", hit.entry_id, e);
                    continue;
                }
            };

            model.categories.insert(hit.category);
            let day = entry.pub_time.unwrap_or(entry.updated_at).date_naive();
            by_day.entry(day).or_default().push(entry);
        }

        // Newest day first, newest entry first within a day
        model.days = by_day
            .into_iter()
            .rev()
            .map(|(day, mut entries)| {
                entries.sort_by(|a, b| {
                    b.pub_time
                        .unwrap_or(b.updated_at)
                        .cmp(&a.pub_time.unwrap_or(a.updated_at))
                });
                DayGroup { day, entries }
            })
            .collect();

        model
    }

    /// Search results grouped by publication day, newest day first
    pub fn results(&self) -> &[DayGroup] {
        &self.days
    }

    /// Total number of matching entries across all pages
    pub fn results_count(&self) -> usize {
        self.total
    }

    /// The search term as entered
    pub fn query(&self) -> &str {
        &self.request.query
    }

    /// The category filter, if any
    pub fn category(&self) -> Option<&str> {
        self.request.category.as_deref()
    }

    /// The weblog handle scoping the search, if any
    pub fn weblog_handle(&self) -> Option<&str> {
        self.request.weblog_handle.as_deref()
    }

    /// Current result page (0-based)
    pub fn page(&self) -> usize {
        self.request.page
    }

    /// Offset of the first hit on this page
    pub fn offset(&self) -> usize {
        self.request.page * self.limit
    }

    /// Hits per page
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether more results follow this page
    pub fn has_next(&self) -> bool {
        (self.request.page + 1) * self.limit < self.total
    }

    /// Whether a previous page exists
    pub fn has_prev(&self) -> bool {
        self.request.page > 0
    }

    /// Link to the next result page, when one exists
    pub fn next_page_link(&self) -> Option<String> {
        self.has_next().then(|| self.page_link(self.request.page + 1))
    }

    /// Link to the previous result page, when one exists
    pub fn prev_page_link(&self) -> Option<String> {
        self.has_prev().then(|| self.page_link(self.request.page - 1))
    }

    /// Distinct category names appearing in this page's hits
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// User-visible error, set when the term was rejected or search failed
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    fn page_link(&self, page: usize) -> String {
        let base = match &self.request.weblog_handle {
            Some(handle) => format!("/weblogs/{handle}/search"),
            None => "/search".to_string(),
        };

        let mut link = format!("{}?q={}", base, urlencoding::encode(&self.request.query));
        if let Some(category) = &self.request.category {
            link.push_str(&format!("&cat={}", urlencoding::encode(category)));
        }
        if page > 0 {
            link.push_str(&format!("&page={page}"));
        }
        link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::db::repositories::{
        CategoryRepository, SqlxCategoryRepository, SqlxEntryRepository, SqlxUserRepository,
        SqlxWeblogRepository, UserRepository, WeblogRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateEntryInput, CreateWeblogInput, EntryStatus, UserRole};
    use crate::rendering::search_request::SearchParams;
    use crate::search::IndexOperation;
    use crate::services::indexing::{entry_document, RepositoryDocumentSource};
    use tempfile::TempDir;

    struct Fixture {
        index: Arc<IndexManager>,
        entries: Arc<dyn EntryRepository>,
        weblogs: Arc<dyn WeblogRepository>,
        categories: Arc<dyn CategoryRepository>,
        users: Arc<dyn UserRepository>,
        weblog_id: i64,
        category_id: i64,
        author_id: i64,
        _temp: TempDir,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::boxed(pool.clone());
        let weblogs = SqlxWeblogRepository::boxed(pool.clone());
        let categories = SqlxCategoryRepository::boxed(pool.clone());
        let entries = SqlxEntryRepository::boxed(pool.clone());

        let author = users
            .create("entrytestuser", "entrytest@example.com", "h", UserRole::Author)
            .await
            .unwrap();
        let weblog = weblogs
            .create(&CreateWeblogInput::new("entrytestweblog", "Entry Test Weblog", author.id))
            .await
            .unwrap();
        let category = categories
            .create(weblog.id, "General", "general")
            .await
            .unwrap();

        let temp = TempDir::new().unwrap();
        let search_config = SearchConfig {
            index_path: temp.path().join("index"),
            default_limit: 10,
            max_limit: 100,
        };
        let source = Arc::new(RepositoryDocumentSource::new(
            entries.clone(),
            weblogs.clone(),
            categories.clone(),
            users.clone(),
        ));
        let index = IndexManager::open(&search_config, source)
            .await
            .expect("Failed to open index");

        Fixture {
            index,
            entries,
            weblogs,
            categories,
            users,
            weblog_id: weblog.id,
            category_id: category.id,
            author_id: author.id,
            _temp: temp,
        }
    }

    /// Create a published entry and index it immediately
    async fn index_entry(f: &Fixture, anchor: &str, title: &str, text: &str) {
        let input = CreateEntryInput::new(f.weblog_id, title, text, f.category_id, f.author_id)
            .with_anchor(anchor)
            .with_status(EntryStatus::Published);
        let entry = f.entries.create(&input, "<p>rendered</p>").await.unwrap();

        let document = entry_document(&entry, &f.weblogs, &f.categories, &f.users)
            .await
            .unwrap();
        f.index
            .execute_now(IndexOperation::AddEntry(document))
            .await
            .unwrap();
    }

    /// Seed the fixture with the canonical test entries: two mention the
    /// Enterprise, one of those mentions the Tholians, the rest are filler.
    async fn seed_entries(f: &Fixture) {
        index_entry(
            f,
            "the-tholian-web",
            "The Tholian Web",
            "When the Enterprise attempts to ascertain the fate of the \
             U.S.S. Defiant which vanished 3 weeks ago, the warp engines \
             begin to lose power, and Spock reports strange sensor readings.",
        )
        .await;
        index_entry(
            f,
            "a-piece-of-the-action",
            "A Piece of the Action",
            "The crew of the Enterprise attempts to make contact with \
             the inhabitants of planet Sigma Iotia II, and Uhura puts Kirk \
             in communication with Boss Oxmyx.",
        )
        .await;

        for i in 0..8 {
            index_entry(
                f,
                &format!("filler-{i}"),
                &format!("Filler entry {i}"),
                "Nothing notable happened on this stardate.",
            )
            .await;
        }
    }

    #[tokio::test]
    async fn test_search_counts_for_seeded_entries() {
        let f = setup().await;
        seed_entries(&f).await;

        let enterprise = f
            .index
            .search(&SearchQuery::new("Enterprise").with_weblog("entrytestweblog"))
            .unwrap();
        assert_eq!(enterprise.total, 2);

        let tholian = f
            .index
            .search(&SearchQuery::new("Tholian").with_weblog("entrytestweblog"))
            .unwrap();
        assert_eq!(tholian.total, 1);
    }

    #[tokio::test]
    async fn test_model_exposes_results_for_parsed_request() {
        let f = setup().await;
        seed_entries(&f).await;

        let params = SearchParams {
            q: Some("Enterprise".to_string()),
            cat: None,
            page: None,
        };
        let request =
            WeblogSearchRequest::from_params(Some("entrytestweblog".to_string()), &params);

        let model = SearchResultsModel::init(request, &f.index, &f.entries).await;

        assert!(model.error_message().is_none());
        assert_eq!(model.results_count(), 2);

        let entries: Vec<_> = model
            .results()
            .iter()
            .flat_map(|group| group.entries.iter())
            .collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.title == "The Tholian Web"));
        assert!(entries.iter().any(|e| e.title == "A Piece of the Action"));

        assert_eq!(model.query(), "Enterprise");
        assert_eq!(model.weblog_handle(), Some("entrytestweblog"));
        assert!(model.categories().contains("General"));
        assert!(!model.has_prev());
        assert!(!model.has_next());
    }

    #[tokio::test]
    async fn test_model_groups_results_by_day() {
        let f = setup().await;
        seed_entries(&f).await;

        let request = WeblogSearchRequest::from_params(
            Some("entrytestweblog".to_string()),
            &SearchParams {
                q: Some("Enterprise".to_string()),
                ..Default::default()
            },
        );
        let model = SearchResultsModel::init(request, &f.index, &f.entries).await;

        // Both seeded entries were published just now, so they share a day
        assert_eq!(model.results().len(), 1);
        let group = &model.results()[0];
        assert_eq!(group.entries.len(), 2);
        // Newest first within the day
        assert!(group.entries[0].pub_time >= group.entries[1].pub_time);
    }

    #[tokio::test]
    async fn test_empty_term_yields_error_message() {
        let f = setup().await;

        let request = WeblogSearchRequest::from_params(None, &SearchParams::default());
        let model = SearchResultsModel::init(request, &f.index, &f.entries).await;

        assert!(model.error_message().is_some());
        assert_eq!(model.results_count(), 0);
        assert!(model.results().is_empty());
    }

    #[tokio::test]
    async fn test_stale_hits_are_skipped() {
        let f = setup().await;
        seed_entries(&f).await;

        // Delete one Enterprise entry from the store but not from the index
        let stale = f
            .entries
            .get_by_anchor(f.weblog_id, "a-piece-of-the-action")
            .await
            .unwrap()
            .unwrap();
        f.entries.delete(stale.id).await.unwrap();

        let request = WeblogSearchRequest::from_params(
            Some("entrytestweblog".to_string()),
            &SearchParams {
                q: Some("Enterprise".to_string()),
                ..Default::default()
            },
        );
        let model = SearchResultsModel::init(request, &f.index, &f.entries).await;

        // The raw count still reflects the index; the rendered list does not
        // contain the vanished entry.
        assert_eq!(model.results_count(), 2);
        let entries: Vec<_> = model
            .results()
            .iter()
            .flat_map(|group| group.entries.iter())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "The Tholian Web");
    }

    #[tokio::test]
    async fn test_pagination_links() {
        let f = setup().await;

        // 25 matching entries across 3 pages of 10
        for i in 0..25 {
            index_entry(
                &f,
                &format!("match-{i}"),
                &format!("Match {i}"),
                "A recurring phenomenon appears",
            )
            .await;
        }

        let request = WeblogSearchRequest::from_params(
            Some("entrytestweblog".to_string()),
            &SearchParams {
                q: Some("phenomenon".to_string()),
                page: Some("1".to_string()),
                ..Default::default()
            },
        );
        let model = SearchResultsModel::init(request, &f.index, &f.entries).await;

        assert_eq!(model.results_count(), 25);
        assert_eq!(model.page(), 1);
        assert_eq!(model.offset(), 10);
        assert!(model.has_prev());
        assert!(model.has_next());

        assert_eq!(
            model.prev_page_link().as_deref(),
            Some("/weblogs/entrytestweblog/search?q=phenomenon")
        );
        assert_eq!(
            model.next_page_link().as_deref(),
            Some("/weblogs/entrytestweblog/search?q=phenomenon&page=2")
        );
    }

    #[tokio::test]
    async fn test_category_filter_narrows_results() {
        let f = setup().await;

        let starships = f
            .categories
            .create(f.weblog_id, "Starships", "starships")
            .await
            .unwrap();

        index_entry(&f, "general-post", "General post", "A common phrase").await;

        let input = CreateEntryInput::new(
            f.weblog_id,
            "Starship post",
            "A common phrase",
            starships.id,
            f.author_id,
        )
        .with_anchor("starship-post")
        .with_status(EntryStatus::Published);
        let entry = f.entries.create(&input, "<p>rendered</p>").await.unwrap();
        let document = entry_document(&entry, &f.weblogs, &f.categories, &f.users)
            .await
            .unwrap();
        f.index
            .execute_now(IndexOperation::AddEntry(document))
            .await
            .unwrap();

        let request = WeblogSearchRequest::from_params(
            Some("entrytestweblog".to_string()),
            &SearchParams {
                q: Some("common".to_string()),
                cat: Some("Starships".to_string()),
                ..Default::default()
            },
        );
        let model = SearchResultsModel::init(request, &f.index, &f.entries).await;

        assert_eq!(model.results_count(), 1);
        assert_eq!(model.category(), Some("Starships"));
        let entries: Vec<_> = model
            .results()
            .iter()
            .flat_map(|group| group.entries.iter())
            .collect();
        assert_eq!(entries[0].title, "Starship post");
    }
}
