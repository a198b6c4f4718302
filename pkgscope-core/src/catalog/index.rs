//! Catalog selection and latest-version projection
//!
//! A catalog is a named view over the dataset ("trusted-libraries",
//! "aipcc", ...). Selecting a catalog picks its raw subset of records and
//! reduces it to one entry per package name, keeping the newest release.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Dataset, Package, Version};
use crate::error::{ExplorerError, Result};

/// Default catalog key
pub const DEFAULT_CATALOG: &str = "trusted-libraries";

/// Secondary demo catalog backed by a fixed slice of the dataset
pub const AIPCC_CATALOG: &str = "aipcc";

/// Half-open `[start, end)` slice of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRange {
    pub start: usize,
    pub end: usize,
}

/// A named catalog and the rule selecting its records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDefinition {
    pub key: String,
    pub label: String,
    /// `None` selects the whole dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<CatalogRange>,
}

impl CatalogDefinition {
    pub fn all(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            range: None,
        }
    }

    pub fn range(key: &str, label: &str, start: usize, end: usize) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            range: Some(CatalogRange { start, end }),
        }
    }

    /// Raw (not yet deduplicated) subset of `packages`.
    ///
    /// Ranges past the end of the dataset are clamped.
    pub fn raw_subset<'a>(&self, packages: &'a [Package]) -> &'a [Package] {
        match self.range {
            None => packages,
            Some(CatalogRange { start, end }) => {
                let end = end.min(packages.len());
                let start = start.min(end);
                &packages[start..end]
            }
        }
    }

    /// Offset of the raw subset inside the full dataset
    fn offset(&self, len: usize) -> usize {
        match self.range {
            None => 0,
            Some(CatalogRange { start, end }) => start.min(end.min(len)),
        }
    }
}

/// The set of known catalogs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogs {
    definitions: Vec<CatalogDefinition>,
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            definitions: vec![
                CatalogDefinition::all(DEFAULT_CATALOG, "Trusted Libraries"),
                CatalogDefinition::range(AIPCC_CATALOG, "AIPCC", 20, 26),
            ],
        }
    }
}

impl Catalogs {
    /// Build from explicit definitions, validating keys and ranges
    pub fn new(definitions: Vec<CatalogDefinition>) -> Result<Self> {
        let mut keys = std::collections::HashSet::new();
        for def in &definitions {
            if def.key.trim().is_empty() {
                return Err(ExplorerError::InvalidCatalog(
                    "catalog key must not be empty".to_string(),
                ));
            }
            if !keys.insert(def.key.as_str()) {
                return Err(ExplorerError::InvalidCatalog(format!(
                    "duplicate catalog key '{}'",
                    def.key
                )));
            }
            if let Some(range) = def.range {
                if range.start > range.end {
                    return Err(ExplorerError::InvalidCatalog(format!(
                        "catalog '{}' has start {} after end {}",
                        def.key, range.start, range.end
                    )));
                }
            }
        }
        Ok(Self { definitions })
    }

    pub fn definitions(&self) -> &[CatalogDefinition] {
        &self.definitions
    }

    pub fn get(&self, key: &str) -> Option<&CatalogDefinition> {
        self.definitions.iter().find(|def| def.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Dataset positions of the latest release of every package in a catalog.
    ///
    /// Unknown keys fall back to the full dataset. Output keeps first-seen
    /// name order.
    pub fn select_positions(&self, packages: &[Package], key: &str) -> Vec<usize> {
        let (subset, offset) = match self.get(key) {
            Some(def) => (def.raw_subset(packages), def.offset(packages.len())),
            None => {
                tracing::warn!("Unknown catalog '{}', using the full dataset", key);
                (packages, 0)
            }
        };

        let positions = latest_positions(subset)
            .into_iter()
            .map(|pos| pos + offset)
            .collect::<Vec<_>>();

        tracing::debug!(
            "Catalog '{}': {} records reduced to {} packages",
            key,
            subset.len(),
            positions.len()
        );
        positions
    }

    /// Latest-version view of a catalog
    pub fn select_catalog<'a>(&self, dataset: &'a Dataset, key: &str) -> Vec<&'a Package> {
        let packages = dataset.packages();
        self.select_positions(packages, key)
            .into_iter()
            .map(|pos| &packages[pos])
            .collect()
    }
}

/// Positions (relative to `packages`) of the newest release per name.
///
/// A candidate replaces the current pick only when strictly newer, so on a
/// full tie the first-seen record wins.
fn latest_positions(packages: &[Package]) -> Vec<usize> {
    let mut slot_by_name: HashMap<&str, usize> = HashMap::new();
    let mut picks: Vec<(usize, Version)> = Vec::new();

    for (pos, pkg) in packages.iter().enumerate() {
        let version = pkg.parsed_version();
        match slot_by_name.get(pkg.name.as_str()) {
            None => {
                slot_by_name.insert(pkg.name.as_str(), picks.len());
                picks.push((pos, version));
            }
            Some(&slot) => {
                if version > picks[slot].1 {
                    picks[slot] = (pos, version);
                }
            }
        }
    }

    picks.into_iter().map(|(pos, _)| pos).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(name: &str, version: &str) -> Package {
        Package::new(name, version, 0)
    }

    fn versions(selected: &[&Package]) -> Vec<(String, String)> {
        selected
            .iter()
            .map(|p| (p.name.clone(), p.version.clone()))
            .collect()
    }

    #[test]
    fn test_latest_per_name() {
        let dataset = Dataset::new(vec![
            pkg("requests", "2.30.0"),
            pkg("numpy", "1.26.0"),
            pkg("requests", "2.31.0"),
            pkg("requests", "2.32.0rc1"),
            pkg("numpy", "2.0.0beta1"),
        ])
        .unwrap();

        let selected = Catalogs::default().select_catalog(&dataset, DEFAULT_CATALOG);
        assert_eq!(
            versions(&selected),
            vec![
                ("requests".to_string(), "2.32.0rc1".to_string()),
                ("numpy".to_string(), "2.0.0beta1".to_string()),
            ]
        );
    }

    #[test]
    fn test_stable_beats_pre_release_at_same_base() {
        let dataset = Dataset::new(vec![
            pkg("torch", "2.1.0rc2"),
            pkg("torch", "2.1.0"),
            pkg("torch", "2.1.0rc3"),
        ])
        .unwrap();

        let selected = Catalogs::default().select_catalog(&dataset, DEFAULT_CATALOG);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].version, "2.1.0");
    }

    #[test]
    fn test_full_tie_keeps_first_seen() {
        let mut first = pkg("scipy", "1.11.0");
        first.description = "first".to_string();
        let mut second = pkg("scipy", "1.11.0.post1");
        second.description = "second".to_string();
        let dataset = Dataset::new(vec![first, second]).unwrap();

        let selected = Catalogs::default().select_catalog(&dataset, DEFAULT_CATALOG);
        assert_eq!(selected[0].description, "first");
    }

    #[test]
    fn test_range_catalog_and_clamping() {
        let packages: Vec<Package> = (0..30).map(|i| pkg(&format!("p{i}"), "1.0.0")).collect();
        let dataset = Dataset::new(packages).unwrap();
        let catalogs = Catalogs::default();

        let aipcc = catalogs.select_catalog(&dataset, AIPCC_CATALOG);
        let names: Vec<&str> = aipcc.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["p20", "p21", "p22", "p23", "p24", "p25"]);

        let small = Dataset::new((0..22).map(|i| pkg(&format!("p{i}"), "1.0.0")).collect()).unwrap();
        assert_eq!(catalogs.select_catalog(&small, AIPCC_CATALOG).len(), 2);

        let tiny = Dataset::new(vec![pkg("only", "1.0.0")]).unwrap();
        assert!(catalogs.select_catalog(&tiny, AIPCC_CATALOG).is_empty());
    }

    #[test]
    fn test_unknown_catalog_falls_back_to_full_dataset() {
        let dataset = Dataset::new((0..30).map(|i| pkg(&format!("p{i}"), "1.0.0")).collect()).unwrap();
        let selected = Catalogs::default().select_catalog(&dataset, "no-such-index");
        assert_eq!(selected.len(), 30);
    }

    #[test]
    fn test_validation() {
        assert!(Catalogs::new(vec![
            CatalogDefinition::all("a", "A"),
            CatalogDefinition::all("a", "A again"),
        ])
        .is_err());
        assert!(Catalogs::new(vec![CatalogDefinition::range("a", "A", 5, 2)]).is_err());
        assert!(Catalogs::new(vec![CatalogDefinition::all(" ", "blank")]).is_err());
        assert!(Catalogs::new(vec![CatalogDefinition::range("a", "A", 2, 5)]).is_ok());
    }
}
