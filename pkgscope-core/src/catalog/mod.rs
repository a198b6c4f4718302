//! pkgscope catalog - package records, versions and catalog views
//!
//! # Overview
//!
//! The catalog layer owns the immutable registry snapshot and the
//! index-specific views over it:
//! - Parse package records (with optional SBOM / attestation data)
//! - Order release versions, pre-releases included
//! - Select a catalog and reduce it to the latest release per package
//!
//! # Architecture
//!
//! ```text
//! packages.json (bundled or --dataset)
//!        │
//!        ▼
//!     Dataset            ← immutable, name@version unique
//!        │
//!        ▼
//!     Catalogs           ← "trusted-libraries" (all), "aipcc" (slice)
//!        │
//!        ▼
//!  latest-version view   ← one entry per name, consumed by query::SearchSession
//! ```

mod dataset;
mod index;
mod package;
mod version;

pub use dataset::Dataset;
pub use index::{
    CatalogDefinition, CatalogRange, Catalogs, AIPCC_CATALOG, DEFAULT_CATALOG,
};
pub use package::{
    Attestation, AttestationStatus, Dependent, Package, PackageVersion, Sbom, SbomSummary,
    SecurityAdvisory, Severity,
};
pub use version::{compare_newest_first, PreRelease, PreReleaseKind, Version};
