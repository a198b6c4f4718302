//! Immutable package dataset
//!
//! The dataset is loaded once and shared read-only by every search session
//! (wrap it in an `Arc`). Loading enforces that `name` + `version` pairs are
//! unique; everything after loading is infallible.

use std::collections::HashSet;
use std::path::Path;

use super::{compare_newest_first, Package};
use crate::error::{ExplorerError, Result};

/// Registry snapshot shipped with the crate
const BUNDLED_DATASET: &str = include_str!("../../data/packages.json");

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    packages: Vec<Package>,
}

impl Dataset {
    /// Build a dataset from records, rejecting duplicate `name@version` pairs
    pub fn new(packages: Vec<Package>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(packages.len());
        for pkg in &packages {
            if !seen.insert((pkg.name.as_str(), pkg.version.as_str())) {
                return Err(ExplorerError::DuplicatePackage {
                    name: pkg.name.clone(),
                    version: pkg.version.clone(),
                });
            }
        }

        tracing::debug!("Loaded dataset with {} package records", packages.len());
        Ok(Self { packages })
    }

    /// Parse a dataset from a JSON array of package records
    pub fn from_json(content: &str) -> Result<Self> {
        let packages: Vec<Package> = serde_json::from_str(content)?;
        Self::new(packages)
    }

    /// Load a dataset from a JSON file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("Reading dataset from {}", path.display());
        Self::from_json(&content)
    }

    /// The registry snapshot embedded in the crate
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_DATASET)
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Exact `name@version` lookup
    pub fn find(&self, name: &str, version: &str) -> Option<&Package> {
        self.packages
            .iter()
            .find(|pkg| pkg.name == name && pkg.version == version)
    }

    /// Every release of a package, newest first
    pub fn versions_of(&self, name: &str) -> Vec<&Package> {
        let mut versions: Vec<&Package> =
            self.packages.iter().filter(|pkg| pkg.name == name).collect();
        versions.sort_by(|a, b| compare_newest_first(&a.version, &b.version));
        versions
    }

    /// Number of distinct package names
    pub fn name_count(&self) -> usize {
        self.packages
            .iter()
            .map(|pkg| pkg.name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}
