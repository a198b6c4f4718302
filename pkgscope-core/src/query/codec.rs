//! URL query-string codec for search parameters
//!
//! Recognised parameters:
//!
//! | name             | meaning                          | omitted when     |
//! |------------------|----------------------------------|------------------|
//! | `q`              | raw search text                  | empty            |
//! | `sort`           | `relevance` / `date` / `downloads` | `relevance`    |
//! | `page`           | positive integer                 | `1`              |
//! | `perPage`        | `10` / `20` / `50`               | `10`             |
//! | `index`          | comma-joined facet values        | no values        |
//! | `classification` | comma-joined facet values        | no values        |
//! | `license`        | comma-joined facet values        | no values        |
//!
//! Decoding never fails. Malformed values fall back to their defaults and
//! unrecognised parameters are kept verbatim so they survive re-encoding.

use url::form_urlencoded;

use super::params::{normalize_facet_values, FilterCategory, PerPage, QueryParams, SortOption};

pub const PARAM_QUERY: &str = "q";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_PAGE: &str = "page";
pub const PARAM_PER_PAGE: &str = "perPage";

/// Parameters decoded from a query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedQuery {
    pub params: QueryParams,
    /// Unrecognised pairs, in their original order
    pub passthrough: Vec<(String, String)>,
}

fn is_recognized(name: &str) -> bool {
    matches!(name, PARAM_QUERY | PARAM_SORT | PARAM_PAGE | PARAM_PER_PAGE)
        || FilterCategory::from_param_name(name).is_some()
}

/// Split a query string (with or without leading `?`) into decoded pairs
pub fn parse_pairs(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Encode pairs as an `application/x-www-form-urlencoded` query string
pub fn serialize_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// First value for `name`, mirroring `URLSearchParams.get`
fn first<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn decode_page(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(page) if page >= 1 => page,
        _ => {
            tracing::warn!("Ignoring invalid page parameter '{}'", raw);
            1
        }
    }
}

/// Decode search parameters from a URL query string
pub fn decode(query: &str) -> DecodedQuery {
    let pairs = parse_pairs(query);
    let mut params = QueryParams::default();

    if let Some(q) = first(&pairs, PARAM_QUERY) {
        params.search_query = q.to_string();
    }

    if let Some(raw) = first(&pairs, PARAM_SORT).filter(|raw| !raw.is_empty()) {
        params.sort_by = raw.parse().unwrap_or_else(|err| {
            tracing::warn!("{}; using relevance", err);
            SortOption::Relevance
        });
    }

    if let Some(raw) = first(&pairs, PARAM_PAGE).filter(|raw| !raw.is_empty()) {
        params.page = decode_page(raw);
    }

    if let Some(raw) = first(&pairs, PARAM_PER_PAGE).filter(|raw| !raw.is_empty()) {
        params.per_page = raw.parse().unwrap_or_else(|err| {
            tracing::warn!("{}; using 10", err);
            PerPage::Ten
        });
    }

    for category in FilterCategory::ALL {
        if let Some(raw) = first(&pairs, category.param_name()) {
            *params.filters.get_mut(category) = normalize_facet_values([raw]);
        }
    }

    let passthrough = pairs
        .into_iter()
        .filter(|(key, _)| !is_recognized(key))
        .collect();

    DecodedQuery {
        params,
        passthrough,
    }
}

/// Encode search parameters, omitting every value that equals its default.
///
/// Recognised parameters come first in a fixed order, followed by the
/// passthrough pairs.
pub fn encode(params: &QueryParams, passthrough: &[(String, String)]) -> String {
    let page = params.page.to_string();
    let per_page = params.per_page.to_string();
    let facets: Vec<(FilterCategory, String)> = FilterCategory::ALL
        .into_iter()
        .filter(|category| !params.filters.get(*category).is_empty())
        .map(|category| (category, params.filters.get(category).join(",")))
        .collect();

    let mut pairs: Vec<(&str, &str)> = Vec::new();
    if !params.search_query.is_empty() {
        pairs.push((PARAM_QUERY, params.search_query.as_str()));
    }
    if params.sort_by != SortOption::Relevance {
        pairs.push((PARAM_SORT, params.sort_by.as_str()));
    }
    if params.page != 1 {
        pairs.push((PARAM_PAGE, page.as_str()));
    }
    if params.per_page != PerPage::Ten {
        pairs.push((PARAM_PER_PAGE, per_page.as_str()));
    }
    for (category, joined) in &facets {
        pairs.push((category.param_name(), joined.as_str()));
    }
    for (key, value) in passthrough {
        pairs.push((key.as_str(), value.as_str()));
    }

    serialize_pairs(pairs)
}
