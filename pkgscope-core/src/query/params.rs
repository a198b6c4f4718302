//! Search parameters mirrored into the URL

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    #[default]
    Relevance,
    Date,
    Downloads,
}

impl SortOption {
    pub const ALL: [SortOption; 3] = [SortOption::Relevance, SortOption::Date, SortOption::Downloads];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::Relevance => "relevance",
            SortOption::Date => "date",
            SortOption::Downloads => "downloads",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Relevance => "Relevance",
            SortOption::Date => "Date Updated",
            SortOption::Downloads => "Downloads",
        }
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevance" => Ok(SortOption::Relevance),
            "date" => Ok(SortOption::Date),
            "downloads" => Ok(SortOption::Downloads),
            other => Err(format!("Unknown sort option: {other}")),
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page size; only 10, 20 and 50 are offered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum PerPage {
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl PerPage {
    pub const ALL: [PerPage; 3] = [PerPage::Ten, PerPage::Twenty, PerPage::Fifty];

    pub fn get(self) -> usize {
        match self {
            PerPage::Ten => 10,
            PerPage::Twenty => 20,
            PerPage::Fifty => 50,
        }
    }

    pub fn from_value(value: usize) -> Option<Self> {
        match value {
            10 => Some(PerPage::Ten),
            20 => Some(PerPage::Twenty),
            50 => Some(PerPage::Fifty),
            _ => None,
        }
    }
}

impl TryFrom<usize> for PerPage {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        PerPage::from_value(value)
            .ok_or_else(|| format!("Page size must be 10, 20 or 50, got {value}"))
    }
}

impl From<PerPage> for usize {
    fn from(value: PerPage) -> Self {
        value.get()
    }
}

impl FromStr for PerPage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid page size: {s}"))?;
        PerPage::try_from(value)
    }
}

impl fmt::Display for PerPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// One of the three independent filter dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCategory {
    Index,
    Classification,
    License,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 3] = [
        FilterCategory::Index,
        FilterCategory::Classification,
        FilterCategory::License,
    ];

    /// URL query parameter carrying this facet
    pub fn param_name(self) -> &'static str {
        match self {
            FilterCategory::Index => "index",
            FilterCategory::Classification => "classification",
            FilterCategory::License => "license",
        }
    }

    pub fn from_param_name(name: &str) -> Option<Self> {
        FilterCategory::ALL
            .into_iter()
            .find(|category| category.param_name() == name)
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterCategory::Index => "Index",
            FilterCategory::Classification => "Classification",
            FilterCategory::License => "License",
        }
    }
}

impl FromStr for FilterCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterCategory::from_param_name(s).ok_or_else(|| format!("Unknown filter category: {s}"))
    }
}

/// Selected facet values; an empty list means no restriction
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterValues {
    #[serde(default)]
    pub index: Vec<String>,
    #[serde(default)]
    pub classification: Vec<String>,
    #[serde(default)]
    pub license: Vec<String>,
}

impl FilterValues {
    pub fn get(&self, category: FilterCategory) -> &[String] {
        match category {
            FilterCategory::Index => &self.index,
            FilterCategory::Classification => &self.classification,
            FilterCategory::License => &self.license,
        }
    }

    pub fn get_mut(&mut self, category: FilterCategory) -> &mut Vec<String> {
        match category {
            FilterCategory::Index => &mut self.index,
            FilterCategory::Classification => &mut self.classification,
            FilterCategory::License => &mut self.license,
        }
    }

    /// True when no facet restricts results
    pub fn is_empty(&self) -> bool {
        FilterCategory::ALL
            .into_iter()
            .all(|category| self.get(category).is_empty())
    }

    pub fn clear(&mut self) {
        for category in FilterCategory::ALL {
            self.get_mut(category).clear();
        }
    }

    /// Number of selected values across all facets
    pub fn active_count(&self) -> usize {
        FilterCategory::ALL
            .into_iter()
            .map(|category| self.get(category).len())
            .sum()
    }
}

/// Split facet values on the URL list separator, dropping empty entries.
///
/// Facets are serialized comma-joined, so a value containing a comma can
/// only survive a round trip as separate values.
pub fn normalize_facet_values<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .flat_map(|value| {
            value
                .as_ref()
                .split(',')
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Everything that shapes a result page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub search_query: String,
    pub sort_by: SortOption,
    pub filters: FilterValues,
    /// 1-based
    pub page: usize,
    pub per_page: PerPage,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            sort_by: SortOption::Relevance,
            filters: FilterValues::default(),
            page: 1,
            per_page: PerPage::Ten,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_option_parse() {
        assert_eq!("date".parse::<SortOption>().unwrap(), SortOption::Date);
        assert!("Date".parse::<SortOption>().is_err());
        assert_eq!(SortOption::default(), SortOption::Relevance);
        assert_eq!(SortOption::Date.label(), "Date Updated");
    }

    #[test]
    fn test_per_page_values() {
        assert_eq!("20".parse::<PerPage>().unwrap(), PerPage::Twenty);
        assert!("25".parse::<PerPage>().is_err());
        assert!("abc".parse::<PerPage>().is_err());
        assert_eq!(PerPage::Fifty.get(), 50);
        assert_eq!(serde_json::to_string(&PerPage::Twenty).unwrap(), "20");
        assert!(serde_json::from_str::<PerPage>("30").is_err());
    }

    #[test]
    fn test_filter_category_names() {
        for category in FilterCategory::ALL {
            assert_eq!(
                FilterCategory::from_param_name(category.param_name()),
                Some(category)
            );
        }
        assert!("arch".parse::<FilterCategory>().is_err());
    }

    #[test]
    fn test_filter_values_access() {
        let mut filters = FilterValues::default();
        assert!(filters.is_empty());

        filters
            .get_mut(FilterCategory::License)
            .push("MIT".to_string());
        assert_eq!(filters.get(FilterCategory::License), ["MIT".to_string()]);
        assert_eq!(filters.active_count(), 1);

        filters.clear();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_normalize_facet_values() {
        assert_eq!(
            normalize_facet_values(["MIT,Apache-2.0", "", "ISC"]),
            vec!["MIT", "Apache-2.0", "ISC"]
        );
        assert!(normalize_facet_values(Vec::<String>::new()).is_empty());
    }
}
