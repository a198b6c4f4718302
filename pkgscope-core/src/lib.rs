//! pkgscope core library exports

pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod facets;
pub mod query;

pub use error::{ExplorerError, Result};
