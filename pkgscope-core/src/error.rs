use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset parsing error: {0}")]
    DatasetParse(#[from] serde_json::Error),

    #[error("Config parsing error: {0}")]
    ConfigParse(#[from] serde_yaml_ng::Error),

    #[error("Duplicate package in dataset: {name}@{version}")]
    DuplicatePackage { name: String, version: String },

    #[error("Invalid catalog definition: {0}")]
    InvalidCatalog(String),

    #[error("Package not found: {name}@{version}")]
    PackageNotFound { name: String, version: String },
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
