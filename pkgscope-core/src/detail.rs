//! Package detail view model
//!
//! Resolves one exact `name@version` release and derives what the detail
//! tabs show: the release history, and a trust summary built from SLSA
//! level, attestations, SBOM and advisories.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::catalog::{AttestationStatus, Dataset, Package, Severity};
use crate::error::{ExplorerError, Result};
use crate::query::codec;

/// URL parameter holding the active detail tab
pub const PARAM_ACTIVE_TAB: &str = "activeTab";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailTab {
    #[default]
    Overview,
    Versions,
    Files,
    Security,
}

impl DetailTab {
    pub const ALL: [DetailTab; 4] = [
        DetailTab::Overview,
        DetailTab::Versions,
        DetailTab::Files,
        DetailTab::Security,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DetailTab::Overview => "overview",
            DetailTab::Versions => "versions",
            DetailTab::Files => "files",
            DetailTab::Security => "security",
        }
    }

    /// Active tab from a URL query string; anything unrecognised is `Overview`
    pub fn from_query_string(query: &str) -> Self {
        codec::parse_pairs(query)
            .into_iter()
            .find(|(key, _)| key == PARAM_ACTIVE_TAB)
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for DetailTab {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DetailTab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| format!("Unknown detail tab: {s}"))
    }
}

impl fmt::Display for DetailTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trust signals for the current release
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustSummary {
    pub slsa_level: Option<u8>,
    pub trust_score: Option<f64>,
    pub verified_attestations: usize,
    pub total_attestations: usize,
    pub expired_attestations: usize,
    pub has_sbom: bool,
    pub has_vulnerabilities: bool,
    pub advisories_by_severity: BTreeMap<Severity, usize>,
}

impl TrustSummary {
    /// Summarize `pkg` as of `now`. Attestations whose `validUntil` cannot be
    /// parsed are treated as still valid.
    pub fn from_package(pkg: &Package, now: DateTime<Utc>) -> Self {
        let attestations = pkg.current_version_attestations.as_deref().unwrap_or_default();

        let expired_attestations = attestations
            .iter()
            .filter_map(|att| att.valid_until.as_deref())
            .filter_map(|until| DateTime::parse_from_rfc3339(until).ok())
            .filter(|until| until.with_timezone(&Utc) < now)
            .count();

        let mut advisories_by_severity = BTreeMap::new();
        for advisory in pkg.security_advisories.as_deref().unwrap_or_default() {
            *advisories_by_severity.entry(advisory.severity).or_insert(0) += 1;
        }

        let has_vulnerabilities = pkg
            .current_version_sbom
            .as_ref()
            .and_then(|sbom| sbom.summary.as_ref())
            .and_then(|summary| summary.has_vulnerabilities)
            .unwrap_or(false)
            || !advisories_by_severity.is_empty();

        Self {
            slsa_level: pkg.slsa_level,
            trust_score: pkg.trust_score,
            verified_attestations: attestations
                .iter()
                .filter(|att| att.status == AttestationStatus::Verified)
                .count(),
            total_attestations: attestations.len(),
            expired_attestations,
            has_sbom: pkg.current_version_sbom.is_some(),
            has_vulnerabilities,
            advisories_by_severity,
        }
    }

    /// No SLSA level, attestation or SBOM to show
    pub fn is_empty(&self) -> bool {
        self.slsa_level.is_none() && self.total_attestations == 0 && !self.has_sbom
    }
}

/// One resolved release plus its detail tab state
#[derive(Debug, Clone)]
pub struct PackageDetail<'a> {
    dataset: &'a Dataset,
    package: &'a Package,
    active_tab: DetailTab,
    passthrough: Vec<(String, String)>,
}

impl<'a> PackageDetail<'a> {
    /// Open the detail view for `name@version`, reading the tab from the URL
    pub fn open(dataset: &'a Dataset, name: &str, version: &str, query_string: &str) -> Result<Self> {
        let package = dataset
            .find(name, version)
            .ok_or_else(|| ExplorerError::PackageNotFound {
                name: name.to_string(),
                version: version.to_string(),
            })?;

        let mut active_tab = DetailTab::default();
        let mut passthrough = Vec::new();
        for (key, value) in codec::parse_pairs(query_string) {
            if key == PARAM_ACTIVE_TAB {
                active_tab = value.parse().unwrap_or_default();
            } else {
                passthrough.push((key, value));
            }
        }

        tracing::debug!("Opened {}@{} on tab {}", name, version, active_tab);
        Ok(Self {
            dataset,
            package,
            active_tab,
            passthrough,
        })
    }

    pub fn package(&self) -> &'a Package {
        self.package
    }

    pub fn active_tab(&self) -> DetailTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: DetailTab) {
        self.active_tab = tab;
    }

    /// Query string with `activeTab` after any other parameters
    pub fn query_string(&self) -> String {
        codec::serialize_pairs(
            self.passthrough
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .chain([(PARAM_ACTIVE_TAB, self.active_tab.as_str())]),
        )
    }

    /// Every release of this package, newest first
    pub fn versions(&self) -> Vec<&'a Package> {
        self.dataset.versions_of(&self.package.name)
    }

    /// Whether the open release is the newest one
    pub fn is_latest(&self) -> bool {
        self.versions()
            .first()
            .is_some_and(|latest| latest.version == self.package.version)
    }

    pub fn trust_summary(&self, now: DateTime<Utc>) -> TrustSummary {
        TrustSummary::from_package(self.package, now)
    }
}

/// Compact download count: `1.5M`, `12K`, `999`. Halves round up.
pub fn format_downloads(downloads: u64) -> String {
    if downloads >= 1_000_000 {
        let tenths = downloads.saturating_add(50_000) / 100_000;
        format!("{}.{}M", tenths / 10, tenths % 10)
    } else if downloads >= 1_000 {
        format!("{}K", (downloads + 500) / 1_000)
    } else {
        downloads.to_string()
    }
}
