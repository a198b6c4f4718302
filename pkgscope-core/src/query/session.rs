//! Search session: query parameters, URL sync and memoized result stages
//!
//! A session is created per search view from the current URL query string.
//! Parameters change only through the setters, and every setter re-encodes
//! the URL before returning. Derived stages are cached by the inputs they
//! depend on:
//!
//! ```text
//! selected index ──► latest-version catalog
//!                          │  + query, filters, sort
//!                          ▼
//!                    filtered + sorted ──► page slice (on demand)
//! ```

use std::sync::Arc;

use super::codec::{self, DecodedQuery};
use super::page::{total_pages, Page};
use super::params::{normalize_facet_values, FilterCategory, FilterValues, PerPage, QueryParams, SortOption};
use super::pipeline::{paginate, sort_items, PackageFilter};
use crate::catalog::{Catalogs, Dataset, Package, DEFAULT_CATALOG};

/// Inputs of the filter + sort stage
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResultsKey {
    selected_index: String,
    search_query: String,
    filters: FilterValues,
    sort_by: SortOption,
}

#[derive(Debug, Clone)]
pub struct SearchSession {
    dataset: Arc<Dataset>,
    catalogs: Arc<Catalogs>,
    selected_index: String,
    params: QueryParams,
    passthrough: Vec<(String, String)>,
    query_string: String,

    catalog_key: Option<String>,
    catalog_positions: Vec<usize>,
    results_key: Option<ResultsKey>,
    result_positions: Vec<usize>,
}

impl SearchSession {
    /// Start a session from a URL query string (leading `?` optional)
    pub fn new(
        dataset: Arc<Dataset>,
        catalogs: Arc<Catalogs>,
        selected_index: impl Into<String>,
        query_string: &str,
    ) -> Self {
        let DecodedQuery {
            params,
            passthrough,
        } = codec::decode(query_string);

        let mut session = Self {
            dataset,
            catalogs,
            selected_index: selected_index.into(),
            params,
            passthrough,
            query_string: String::new(),
            catalog_key: None,
            catalog_positions: Vec::new(),
            results_key: None,
            result_positions: Vec::new(),
        };
        session.sync_url();
        session.refresh();
        session
    }

    /// Session over the default catalog with default catalogs
    pub fn with_defaults(dataset: Arc<Dataset>, query_string: &str) -> Self {
        Self::new(dataset, Arc::new(Catalogs::default()), DEFAULT_CATALOG, query_string)
    }

    // ---------------------------------------------------------------------
    // Parameters
    // ---------------------------------------------------------------------

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn search_query(&self) -> &str {
        &self.params.search_query
    }

    pub fn sort_by(&self) -> SortOption {
        self.params.sort_by
    }

    pub fn page(&self) -> usize {
        self.params.page
    }

    pub fn per_page(&self) -> PerPage {
        self.params.per_page
    }

    pub fn filters(&self) -> &FilterValues {
        &self.params.filters
    }

    pub fn selected_index(&self) -> &str {
        &self.selected_index
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    /// Current URL query string, without the leading `?`
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// `path` with the current query string appended
    pub fn url_for(&self, path: &str) -> String {
        if self.query_string.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", self.query_string)
        }
    }

    // ---------------------------------------------------------------------
    // Setters
    // ---------------------------------------------------------------------

    /// Set the search text and return to the first page
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.params.search_query = query.into();
        self.params.page = 1;
        self.commit();
    }

    /// Change the ordering; the page is left alone
    pub fn set_sort_by(&mut self, sort_by: SortOption) {
        self.params.sort_by = sort_by;
        self.commit();
    }

    /// Jump to a page. Page 0 is raised to 1 so the URL always carries a
    /// valid `page`; a page past the end is kept and yields an empty result.
    pub fn set_page(&mut self, page: usize) {
        self.params.page = page.max(1);
        self.commit();
    }

    pub fn set_per_page(&mut self, per_page: PerPage) {
        self.params.per_page = per_page;
        self.params.page = 1;
        self.commit();
    }

    /// Replace every value of one facet
    pub fn set_filter<I, S>(&mut self, category: FilterCategory, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        *self.params.filters.get_mut(category) = normalize_facet_values(values);
        self.params.page = 1;
        self.commit();
    }

    /// Remove a single value from one facet
    pub fn delete_filter(&mut self, category: FilterCategory, value: &str) {
        self.params
            .filters
            .get_mut(category)
            .retain(|selected| selected != value);
        self.params.page = 1;
        self.commit();
    }

    pub fn clear_all_filters(&mut self) {
        self.params.filters.clear();
        self.params.page = 1;
        self.commit();
    }

    /// Switch catalog. Unknown keys select the full dataset.
    pub fn set_selected_index(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.catalogs.contains(&key) {
            tracing::warn!("Unknown catalog '{}', falling back to the full dataset", key);
        }
        self.selected_index = key;
        self.params.page = 1;
        self.commit();
    }

    // ---------------------------------------------------------------------
    // Results
    // ---------------------------------------------------------------------

    /// Size of the latest-version catalog, before filters
    pub fn total_item_count(&self) -> usize {
        self.catalog_positions.len()
    }

    /// Results after filtering, before pagination
    pub fn filtered_item_count(&self) -> usize {
        self.result_positions.len()
    }

    pub fn page_count(&self) -> usize {
        total_pages(self.filtered_item_count(), self.params.per_page.get())
    }

    /// The latest-version catalog in first-seen order
    pub fn catalog(&self) -> Vec<&Package> {
        self.resolve(&self.catalog_positions)
    }

    /// Every filtered result, sorted
    pub fn sorted_items(&self) -> Vec<&Package> {
        self.resolve(&self.result_positions)
    }

    pub fn current_page_items(&self) -> Vec<&Package> {
        let positions = paginate(
            &self.result_positions,
            self.params.page,
            self.params.per_page.get(),
        );
        self.resolve(positions)
    }

    pub fn current_page(&self) -> Page<&Package> {
        Page::new(
            self.current_page_items(),
            self.filtered_item_count(),
            self.params.page,
            self.params.per_page.get(),
        )
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn resolve(&self, positions: &[usize]) -> Vec<&Package> {
        let packages = self.dataset.packages();
        positions.iter().map(|&pos| &packages[pos]).collect()
    }

    fn commit(&mut self) {
        self.sync_url();
        self.refresh();
    }

    fn sync_url(&mut self) {
        self.query_string = codec::encode(&self.params, &self.passthrough);
        tracing::debug!("Search URL updated: ?{}", self.query_string);
    }

    /// Recompute stages whose inputs changed since the last run
    fn refresh(&mut self) {
        let packages = self.dataset.packages();

        let catalog_stale = self.catalog_key.as_deref() != Some(self.selected_index.as_str());
        if catalog_stale {
            self.catalog_positions = self.catalogs.select_positions(packages, &self.selected_index);
            self.catalog_key = Some(self.selected_index.clone());
            self.results_key = None;
        }

        let key = ResultsKey {
            selected_index: self.selected_index.clone(),
            search_query: self.params.search_query.clone(),
            filters: self.params.filters.clone(),
            sort_by: self.params.sort_by,
        };
        if self.results_key.as_ref() == Some(&key) {
            tracing::trace!("Result stage unchanged, reusing {} results", self.result_positions.len());
            return;
        }

        let filter = PackageFilter::new(&key.search_query, &key.filters);
        let mut positions: Vec<usize> = self
            .catalog_positions
            .iter()
            .copied()
            .filter(|&pos| filter.matches(&packages[pos]))
            .collect();
        sort_items(
            &mut positions,
            |&pos| &packages[pos],
            key.sort_by,
            &key.search_query,
        );

        tracing::debug!(
            "Filtered catalog '{}' to {} of {} packages (sort: {})",
            self.selected_index,
            positions.len(),
            self.catalog_positions.len(),
            key.sort_by
        );

        self.result_positions = positions;
        self.results_key = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dataset() -> Arc<Dataset> {
        let mut packages = Vec::new();
        for i in 0..25u64 {
            let mut pkg = Package::new(format!("pkg-{i:02}"), "1.0.0", 1000 - i);
            pkg.license = if i % 2 == 0 { "MIT" } else { "Apache-2.0" }.to_string();
            pkg.updated = format!("{} days ago", 25 - i);
            packages.push(pkg);
        }
        packages.push(Package::new("pkg-00", "0.9.0", 5000));
        Arc::new(Dataset::new(packages).unwrap())
    }

    #[test]
    fn test_initial_state_from_url() {
        let session = SearchSession::with_defaults(dataset(), "?license=MIT&page=2&perPage=10");
        assert_eq!(session.total_item_count(), 25);
        assert_eq!(session.filtered_item_count(), 13);
        assert_eq!(session.page(), 2);
        assert_eq!(session.current_page_items().len(), 3);
        assert_eq!(session.query_string(), "page=2&license=MIT");
    }

    #[test]
    fn test_latest_version_used_for_ranking() {
        let session = SearchSession::with_defaults(dataset(), "");
        // The 0.9.0 release has more downloads but is not the latest
        let first = session.current_page_items()[0];
        assert_eq!((first.name.as_str(), first.version.as_str()), ("pkg-00", "1.0.0"));
    }

    #[test]
    fn test_setters_reset_page() {
        let mut session = SearchSession::with_defaults(dataset(), "page=3");

        session.set_search_query("pkg");
        assert_eq!(session.page(), 1);

        session.set_page(2);
        session.set_filter(FilterCategory::License, ["MIT"]);
        assert_eq!(session.page(), 1);

        session.set_page(2);
        session.set_per_page(PerPage::Twenty);
        assert_eq!(session.page(), 1);

        session.set_page(2);
        session.delete_filter(FilterCategory::License, "MIT");
        assert_eq!(session.page(), 1);

        session.set_page(2);
        session.clear_all_filters();
        assert_eq!(session.page(), 1);
    }

    #[test]
    fn test_sort_and_page_do_not_touch_other_params() {
        let mut session = SearchSession::with_defaults(dataset(), "q=pkg&license=MIT&page=2");
        let before = session.params().clone();

        session.set_sort_by(SortOption::Date);
        assert_eq!(session.page(), 2);
        assert_eq!(session.search_query(), before.search_query);
        assert_eq!(session.filters(), &before.filters);

        session.set_page(1);
        assert_eq!(session.sort_by(), SortOption::Date);
        assert_eq!(session.filters(), &before.filters);
    }

    #[test]
    fn test_url_tracks_every_setter() {
        let mut session = SearchSession::with_defaults(dataset(), "activeTab=files");
        assert_eq!(session.query_string(), "activeTab=files");

        session.set_search_query("numpy");
        session.set_sort_by(SortOption::Downloads);
        session.set_filter(FilterCategory::Index, ["github", "nexus"]);
        session.set_page(4);
        assert_eq!(
            session.query_string(),
            "q=numpy&sort=downloads&page=4&index=github%2Cnexus&activeTab=files"
        );

        session.clear_all_filters();
        session.set_search_query("");
        assert_eq!(session.query_string(), "sort=downloads&activeTab=files");
        assert_eq!(session.url_for("/search"), "/search?sort=downloads&activeTab=files");
    }

    #[test]
    fn test_selected_index_switch() {
        let mut session = SearchSession::with_defaults(dataset(), "page=2");
        session.set_selected_index("aipcc");
        assert_eq!(session.page(), 1);
        // Rows 20..26: pkg-20..pkg-24 plus the old pkg-00 release
        assert_eq!(session.total_item_count(), 6);

        session.set_selected_index("unknown");
        assert_eq!(session.total_item_count(), 25);
    }

    #[test]
    fn test_set_page_zero_clamps_to_first() {
        let mut session = SearchSession::with_defaults(dataset(), "");
        session.set_page(0);
        assert_eq!(session.page(), 1);
        assert_eq!(session.current_page_items().len(), 10);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let mut session = SearchSession::with_defaults(dataset(), "");
        session.set_page(40);
        assert!(session.current_page_items().is_empty());
        assert_eq!(session.filtered_item_count(), 25);
        assert_eq!(session.page_count(), 3);
    }
}
