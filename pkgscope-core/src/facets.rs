//! Filter options offered to the user and per-value facet counts

use serde::Serialize;
use std::collections::HashMap;

use crate::catalog::Package;

/// A selectable filter value and its display label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn option(value: &'static str, label: &'static str) -> FacetOption {
    FacetOption { value, label }
}

/// Classification options, modelled on PyPI topic classifiers
pub const CLASSIFICATION_OPTIONS: &[FacetOption] = &[
    option("web-development", "Web Development"),
    option("data-science", "Data Science & Analytics"),
    option("machine-learning", "Machine Learning & AI"),
    option("cloud-services", "Cloud Services"),
    option("database", "Database & Storage"),
    option("security", "Security & Cryptography"),
    option("networking", "Networking & HTTP"),
    option("testing", "Testing & Quality Assurance"),
    option("devops", "DevOps & Automation"),
    option("scientific", "Scientific Computing"),
    option("gui", "GUI & Desktop Applications"),
    option("utilities", "System Utilities"),
    option("packaging", "Packaging & Distribution"),
    option("documentation", "Documentation Tools"),
    option("logging", "Logging & Monitoring"),
];

pub const LICENSE_OPTIONS: &[FacetOption] = &[
    option("MIT", "MIT License"),
    option("Apache-2.0", "Apache 2.0"),
    option("BSD-3-Clause", "BSD 3-Clause"),
    option("GPL-3.0", "GPL v3"),
    option("PSF", "Python Software Foundation"),
    option("HPND", "Historical Permission Notice and Disclaimer"),
    option("ISC", "ISC License"),
];

/// Label for a classification or license value, if it is a known option
pub fn option_label(value: &str) -> Option<&'static str> {
    CLASSIFICATION_OPTIONS
        .iter()
        .chain(LICENSE_OPTIONS)
        .find(|opt| opt.value == value)
        .map(|opt| opt.label)
}

/// Number of packages carrying one facet value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

/// Per-value counts for the license and index facets of a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetCounts {
    pub license: Vec<FacetCount>,
    pub index: Vec<FacetCount>,
    /// Packages without an `index` field
    pub unindexed: usize,
}

fn ranked(counts: HashMap<&str, usize>) -> Vec<FacetCount> {
    let mut ranked: Vec<FacetCount> = counts
        .into_iter()
        .map(|(value, count)| FacetCount {
            value: value.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    ranked
}

/// Count license and index values, most common first (ties by value)
pub fn facet_counts(catalog: &[&Package]) -> FacetCounts {
    let mut licenses: HashMap<&str, usize> = HashMap::new();
    let mut indexes: HashMap<&str, usize> = HashMap::new();
    let mut unindexed = 0;

    for pkg in catalog {
        *licenses.entry(pkg.license.as_str()).or_default() += 1;
        match &pkg.index {
            Some(index) => *indexes.entry(index.as_str()).or_default() += 1,
            None => unindexed += 1,
        }
    }

    FacetCounts {
        license: ranked(licenses),
        index: ranked(indexes),
        unindexed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_tables() {
        assert_eq!(CLASSIFICATION_OPTIONS.len(), 15);
        assert_eq!(LICENSE_OPTIONS.len(), 7);
        assert_eq!(option_label("PSF"), Some("Python Software Foundation"));
        assert_eq!(option_label("gui"), Some("GUI & Desktop Applications"));
        assert_eq!(option_label("WTFPL"), None);
    }

    #[test]
    fn test_facet_counts() {
        let mut a = Package::new("a", "1.0.0", 0);
        a.license = "MIT".to_string();
        a.index = Some("github".to_string());
        let mut b = Package::new("b", "1.0.0", 0);
        b.license = "MIT".to_string();
        let mut c = Package::new("c", "1.0.0", 0);
        c.license = "BSD-3-Clause".to_string();
        c.index = Some("artifactory".to_string());
        let mut d = Package::new("d", "1.0.0", 0);
        d.license = "Apache-2.0".to_string();
        d.index = Some("github".to_string());

        let counts = facet_counts(&[&a, &b, &c, &d]);
        let licenses: Vec<(&str, usize)> = counts
            .license
            .iter()
            .map(|c| (c.value.as_str(), c.count))
            .collect();
        assert_eq!(
            licenses,
            vec![("MIT", 2), ("Apache-2.0", 1), ("BSD-3-Clause", 1)]
        );
        assert_eq!(counts.index[0].value, "github");
        assert_eq!(counts.index[0].count, 2);
        assert_eq!(counts.unindexed, 1);
    }
}
