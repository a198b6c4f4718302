//! Filter, sort and paginate stages
//!
//! Every stage is a pure function of its inputs. The same predicate and
//! comparator back both the public slice-of-references API and the
//! position-based caches inside [`super::SearchSession`].

use std::cmp::Ordering;

use super::params::{FilterValues, SortOption};
use crate::catalog::Package;

/// Recency assigned to `updated` strings the heuristic cannot read
pub const UNKNOWN_RECENCY_DAYS: u32 = 999;

/// Search term plus facet selection, evaluated per package
#[derive(Debug)]
pub(crate) struct PackageFilter<'f> {
    query_lower: String,
    filters: &'f FilterValues,
    classification_lower: Vec<String>,
}

impl<'f> PackageFilter<'f> {
    pub(crate) fn new(search_query: &str, filters: &'f FilterValues) -> Self {
        Self {
            query_lower: search_query.to_lowercase(),
            filters,
            classification_lower: filters
                .classification
                .iter()
                .map(|c| c.to_lowercase())
                .collect(),
        }
    }

    fn matches_search(&self, pkg: &Package) -> bool {
        if self.query_lower.is_empty() {
            return true;
        }
        pkg.name.to_lowercase().contains(&self.query_lower)
            || pkg.description.to_lowercase().contains(&self.query_lower)
            || pkg.author.to_lowercase().contains(&self.query_lower)
    }

    fn matches_index(&self, pkg: &Package) -> bool {
        if self.filters.index.is_empty() {
            return true;
        }
        match &pkg.index {
            Some(index) => self.filters.index.contains(index),
            None => false,
        }
    }

    /// A tag and a selected classification match when either contains the
    /// other, ignoring case
    fn matches_classification(&self, pkg: &Package) -> bool {
        if self.classification_lower.is_empty() {
            return true;
        }
        let Some(tags) = &pkg.tags else {
            return false;
        };
        self.classification_lower.iter().any(|classification| {
            tags.iter().any(|tag| {
                let tag = tag.to_lowercase();
                tag.contains(classification.as_str()) || classification.contains(tag.as_str())
            })
        })
    }

    fn matches_license(&self, pkg: &Package) -> bool {
        self.filters.license.is_empty() || self.filters.license.contains(&pkg.license)
    }

    pub(crate) fn matches(&self, pkg: &Package) -> bool {
        self.matches_search(pkg)
            && self.matches_index(pkg)
            && self.matches_classification(pkg)
            && self.matches_license(pkg)
    }
}

/// Days since update, read from strings like "3 days ago" or "2 months ago".
///
/// Weeks count as 7 days and months as 30. A missing or zero count reads as
/// 1 ("yesterday", "a week ago"). Anything without a day/week/month unit is
/// [`UNKNOWN_RECENCY_DAYS`].
pub fn recency_days(updated: &str) -> u32 {
    let count = leading_integer(updated).filter(|n| *n != 0).unwrap_or(1);

    if updated.contains("day") {
        count
    } else if updated.contains("week") {
        count.saturating_mul(7)
    } else if updated.contains("month") {
        count.saturating_mul(30)
    } else {
        UNKNOWN_RECENCY_DAYS
    }
}

fn leading_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    // Absurdly large counts saturate rather than vanish
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}

/// Comparator for one sort mode; `sort_by` keeps equal keys in input order
pub(crate) fn compare(a: &Package, b: &Package, sort_by: SortOption, query_lower: &str) -> Ordering {
    match sort_by {
        SortOption::Date => recency_days(&a.updated).cmp(&recency_days(&b.updated)),
        SortOption::Downloads => b.downloads.cmp(&a.downloads),
        SortOption::Relevance => {
            if query_lower.is_empty() {
                return b.downloads.cmp(&a.downloads);
            }
            let a_name = a.name.to_lowercase().contains(query_lower);
            let b_name = b.name.to_lowercase().contains(query_lower);
            // Name matches first, then by downloads
            b_name
                .cmp(&a_name)
                .then_with(|| b.downloads.cmp(&a.downloads))
        }
    }
}

/// Stable sort of arbitrary items through an accessor
pub(crate) fn sort_items<'p, T, F>(
    items: &mut [T],
    package_of: F,
    sort_by: SortOption,
    search_query: &str,
) where
    F: Fn(&T) -> &'p Package,
{
    let query_lower = search_query.to_lowercase();
    items.sort_by(|a, b| compare(package_of(a), package_of(b), sort_by, &query_lower));
}

/// Keep packages matching the search term and every active facet, in input order
pub fn apply_filters<'a>(
    catalog: &[&'a Package],
    search_query: &str,
    filters: &FilterValues,
) -> Vec<&'a Package> {
    let filter = PackageFilter::new(search_query, filters);
    catalog
        .iter()
        .copied()
        .filter(|pkg| filter.matches(pkg))
        .collect()
}

/// Order filtered packages by the selected sort mode
pub fn sort_catalog<'a>(
    filtered: &[&'a Package],
    sort_by: SortOption,
    search_query: &str,
) -> Vec<&'a Package> {
    let mut sorted = filtered.to_vec();
    sort_items(&mut sorted, |pkg| *pkg, sort_by, search_query);
    sorted
}

/// Slice for a 1-based page. Pages past the end (or page 0) are empty.
pub fn paginate<T>(sorted: &[T], page: usize, per_page: usize) -> &[T] {
    let Some(start) = page
        .checked_sub(1)
        .and_then(|index| index.checked_mul(per_page))
    else {
        return &[];
    };
    if start >= sorted.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(sorted.len());
    &sorted[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pkg(name: &str, downloads: u64) -> Package {
        Package::new(name, "1.0.0", downloads)
    }

    fn names(packages: &[&Package]) -> Vec<String> {
        packages.iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_over_three_fields() {
        let mut by_name = pkg("Requests", 1);
        by_name.description = "HTTP".to_string();
        let mut by_desc = pkg("httpx", 1);
        by_desc.description = "A next-gen REQUESTS alternative".to_string();
        let mut by_author = pkg("urllib3", 1);
        by_author.author = "Andrey Petrov".to_string();
        let other = pkg("numpy", 1);

        let catalog = vec![&by_name, &by_desc, &by_author, &other];
        let filters = FilterValues::default();

        assert_eq!(
            names(&apply_filters(&catalog, "requests", &filters)),
            vec!["Requests", "httpx"]
        );
        assert_eq!(names(&apply_filters(&catalog, "petrov", &filters)), vec!["urllib3"]);
        assert_eq!(apply_filters(&catalog, "", &filters).len(), 4);
    }

    #[test]
    fn test_index_filter_excludes_missing_index() {
        let mut github = pkg("a", 1);
        github.index = Some("github".to_string());
        let mut nexus = pkg("b", 1);
        nexus.index = Some("nexus".to_string());
        let none = pkg("c", 1);

        let catalog = vec![&github, &nexus, &none];
        let filters = FilterValues {
            index: vec!["github".to_string()],
            ..FilterValues::default()
        };
        assert_eq!(names(&apply_filters(&catalog, "", &filters)), vec!["a"]);
    }

    #[test]
    fn test_classification_matches_in_either_direction() {
        let mut short_tag = pkg("a", 1);
        short_tag.tags = Some(vec!["web".to_string()]);
        let mut long_tag = pkg("b", 1);
        long_tag.tags = Some(vec!["Machine-Learning-Toolkit".to_string()]);
        let mut unrelated = pkg("c", 1);
        unrelated.tags = Some(vec!["db".to_string()]);
        let untagged = pkg("d", 1);

        let catalog = vec![&short_tag, &long_tag, &unrelated, &untagged];
        let filters = FilterValues {
            classification: vec!["web-development".to_string(), "machine-learning".to_string()],
            ..FilterValues::default()
        };
        assert_eq!(names(&apply_filters(&catalog, "", &filters)), vec!["a", "b"]);
    }

    #[test]
    fn test_license_is_exact() {
        let mut mit = pkg("a", 1);
        mit.license = "MIT".to_string();
        let mut mit_lower = pkg("b", 1);
        mit_lower.license = "mit".to_string();

        let catalog = vec![&mit, &mit_lower];
        let filters = FilterValues {
            license: vec!["MIT".to_string()],
            ..FilterValues::default()
        };
        assert_eq!(names(&apply_filters(&catalog, "", &filters)), vec!["a"]);
    }

    #[test]
    fn test_recency_days() {
        assert_eq!(recency_days("3 days ago"), 3);
        assert_eq!(recency_days("1 day ago"), 1);
        assert_eq!(recency_days("yesterday"), 1);
        assert_eq!(recency_days("today"), 1);
        assert_eq!(recency_days("0 days ago"), 1);
        assert_eq!(recency_days("2 weeks ago"), 14);
        assert_eq!(recency_days("a week ago"), 7);
        assert_eq!(recency_days("3 months ago"), 90);
        assert_eq!(recency_days("1 year ago"), UNKNOWN_RECENCY_DAYS);
        assert_eq!(recency_days("5 hours ago"), UNKNOWN_RECENCY_DAYS);
        assert_eq!(recency_days(""), UNKNOWN_RECENCY_DAYS);
    }

    #[test]
    fn test_sort_by_date_is_stable() {
        let mut a = pkg("a", 1);
        a.updated = "1 month ago".to_string();
        let mut b = pkg("b", 1);
        b.updated = "30 days ago".to_string();
        let mut c = pkg("c", 1);
        c.updated = "2 days ago".to_string();
        let mut d = pkg("d", 1);
        d.updated = "long ago".to_string();

        let filtered = vec![&d, &a, &b, &c];
        assert_eq!(
            names(&sort_catalog(&filtered, SortOption::Date, "")),
            vec!["c", "a", "b", "d"]
        );
    }

    #[test]
    fn test_sort_by_downloads() {
        let (a, b, c) = (pkg("a", 5), pkg("b", 50), pkg("c", 5));
        let filtered = vec![&a, &b, &c];
        assert_eq!(
            names(&sort_catalog(&filtered, SortOption::Downloads, "")),
            vec!["b", "a", "c"]
        );
    }

    #[test]
    fn test_relevance_prefers_name_matches() {
        let requests = pkg("requests", 500);
        let mut other = pkg("other", 9000);
        other.description = "wraps requests".to_string();
        let mut toolbelt = pkg("requests-toolbelt", 800);
        toolbelt.description = "utilities".to_string();

        let filtered = vec![&other, &requests, &toolbelt];
        assert_eq!(
            names(&sort_catalog(&filtered, SortOption::Relevance, "Requests")),
            vec!["requests-toolbelt", "requests", "other"]
        );
        assert_eq!(
            names(&sort_catalog(&filtered, SortOption::Relevance, "")),
            vec!["other", "requests-toolbelt", "requests"]
        );
    }

    #[test]
    fn test_paginate() {
        let items: Vec<usize> = (0..25).collect();
        assert_eq!(paginate(&items, 1, 10), &items[0..10]);
        assert_eq!(paginate(&items, 2, 10), &items[10..20]);
        assert_eq!(paginate(&items, 3, 10), &items[20..25]);
        assert!(paginate(&items, 4, 10).is_empty());
        assert!(paginate(&items, 0, 10).is_empty());
        assert!(paginate(&items, usize::MAX, 50).is_empty());
        assert!(paginate::<usize>(&[], 1, 10).is_empty());
    }
}
