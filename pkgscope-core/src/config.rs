//! Explorer configuration (`config.yaml`)
//!
//! Declares which catalogs exist, which one is selected by default and
//! where the dataset comes from. A missing file means defaults.
//!
//! ```yaml
//! defaultIndex: trusted-libraries
//! dataset: /srv/registry/packages.json
//! catalogs:
//!   - key: trusted-libraries
//!     label: Trusted Libraries
//!   - key: aipcc
//!     label: AIPCC
//!     range: { start: 20, end: 26 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::{CatalogDefinition, Catalogs, Dataset, DEFAULT_CATALOG};
use crate::error::{ExplorerError, Result};

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerConfig {
    #[serde(default = "default_index")]
    pub default_index: String,

    /// External dataset; the bundled snapshot is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<PathBuf>,

    #[serde(default = "default_catalogs")]
    pub catalogs: Vec<CatalogDefinition>,
}

fn default_index() -> String {
    DEFAULT_CATALOG.to_string()
}

fn default_catalogs() -> Vec<CatalogDefinition> {
    Catalogs::default().definitions().to_vec()
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            default_index: default_index(),
            dataset: None,
            catalogs: default_catalogs(),
        }
    }
}

impl ExplorerConfig {
    /// Parse and validate config YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ExplorerConfig = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Load from `path`, or defaults if the file does not exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;

        // Relative dataset paths are resolved against the config file
        if let (Some(dataset), Some(parent)) = (config.dataset.as_mut(), path.parent()) {
            if dataset.is_relative() {
                *dataset = parent.join(&*dataset);
            }
        }

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Platform config location, e.g. `~/.config/pkgscope/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "pkgscope", "pkgscope")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Check catalog definitions and that the default index names one of them
    pub fn validate(&self) -> Result<()> {
        let catalogs = Catalogs::new(self.catalogs.clone())?;
        if !catalogs.contains(&self.default_index) {
            return Err(ExplorerError::InvalidCatalog(format!(
                "default index '{}' is not a configured catalog",
                self.default_index
            )));
        }
        Ok(())
    }

    pub fn catalogs(&self) -> Result<Catalogs> {
        Catalogs::new(self.catalogs.clone())
    }

    /// Configured dataset, or the bundled snapshot
    pub fn load_dataset(&self) -> Result<Dataset> {
        match &self.dataset {
            Some(path) => Dataset::load_from_path(path),
            None => Dataset::bundled(),
        }
    }
}
