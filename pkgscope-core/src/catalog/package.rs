//! Package records as they appear in a registry snapshot
//!
//! Only the identity and descriptive fields are required. Everything the
//! detail view reads (versions, SBOM, attestations, advisories) is optional
//! and absent fields stay `None` rather than defaulting to empty values, so
//! filters can tell "no tags" apart from "empty tag list" when they need to.

use serde::{Deserialize, Serialize};

/// A single package release in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub downloads: u64,
    /// Human readable recency, e.g. "2 days ago"
    pub updated: String,
    pub author: String,
    pub license: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_description: Option<String>,

    /// Classification tags, order irrelevant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheel_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    /// Source index the package was mirrored from (github, artifactory, nexus)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<PackageVersion>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependents: Option<Vec<Dependent>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_advisories: Option<Vec<SecurityAdvisory>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version_attestations: Option<Vec<Attestation>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version_sbom: Option<Sbom>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slsa_level: Option<u8>,
}

/// Release history entry embedded in a package record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageVersion {
    pub version: String,
    pub release_date: String,
    pub downloads: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sbom: Option<Sbom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestations: Option<Vec<Attestation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependent {
    pub name: String,
    pub version: String,
    pub downloads: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAdvisory {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub affected_versions: Vec<String>,
    pub published_at: String,
}

/// Software bill of materials attached to a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sbom {
    pub format: String,
    pub url: String,
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SbomSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SbomSummary {
    pub total_components: u32,
    pub direct_dependencies: u32,
    #[serde(default)]
    pub licenses_found: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_dependencies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_vulnerabilities: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationStatus {
    Verified,
    Unverified,
    Failed,
}

/// Provenance or signature attestation for a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    #[serde(rename = "type")]
    pub kind: String,
    pub verifier: String,
    pub timestamp: String,
    pub status: AttestationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slsa_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// RFC 3339 expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_platform: Option<String>,
}

impl Package {
    /// Minimal record with only the required fields set
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        downloads: u64,
    ) -> Self {
        let name = name.into();
        let version = version.into();
        Self {
            id: format!("{name}-{version}"),
            name,
            version,
            description: String::new(),
            downloads,
            updated: String::new(),
            author: String::new(),
            license: String::new(),
            full_description: None,
            tags: None,
            wheel_name: None,
            python_version: None,
            abi: None,
            architecture: None,
            index: None,
            versions: None,
            dependents: None,
            security_advisories: None,
            current_version_attestations: None,
            current_version_sbom: None,
            trust_score: None,
            slsa_level: None,
        }
    }

    /// Parsed form of [`Package::version`]
    pub fn parsed_version(&self) -> super::Version {
        super::Version::parse(&self.version)
    }

    /// Truncate description to first line
    pub fn short_description(&self) -> &str {
        self.description
            .lines()
            .next()
            .unwrap_or(&self.description)
            .trim()
    }

    /// Get tags as a comma-separated string
    pub fn tags_display(&self) -> String {
        self.tags.as_deref().unwrap_or_default().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_record() {
        let json = r#"{
            "id": "1",
            "name": "requests",
            "version": "2.31.0",
            "description": "HTTP for Humans",
            "downloads": 1000,
            "updated": "2 days ago",
            "author": "Kenneth Reitz",
            "license": "Apache-2.0"
        }"#;

        let pkg: Package = serde_json::from_str(json).unwrap();
        assert_eq!(pkg.name, "requests");
        assert!(pkg.tags.is_none());
        assert!(pkg.index.is_none());
        assert!(pkg.current_version_sbom.is_none());
    }

    #[test]
    fn test_parse_nested_trust_records() {
        let json = r#"{
            "id": "7",
            "name": "cryptography",
            "version": "41.0.0",
            "description": "Cryptographic recipes",
            "downloads": 5,
            "updated": "1 week ago",
            "author": "PyCA",
            "license": "Apache-2.0",
            "tags": ["security"],
            "slsaLevel": 3,
            "currentVersionAttestations": [{
                "type": "SLSA Provenance",
                "verifier": "sigstore",
                "timestamp": "2024-01-01T00:00:00Z",
                "status": "verified",
                "validUntil": "2025-01-01T00:00:00Z"
            }],
            "securityAdvisories": [{
                "id": "GHSA-1",
                "severity": "high",
                "title": "Bad",
                "description": "Very bad",
                "affectedVersions": ["40.0.0"],
                "publishedAt": "2023-06-01"
            }]
        }"#;

        let pkg: Package = serde_json::from_str(json).unwrap();
        let attestations = pkg.current_version_attestations.unwrap();
        assert_eq!(attestations[0].kind, "SLSA Provenance");
        assert_eq!(attestations[0].status, AttestationStatus::Verified);
        assert_eq!(pkg.slsa_level, Some(3));
        assert_eq!(
            pkg.security_advisories.unwrap()[0].severity,
            Severity::High
        );
    }

    #[test]
    fn test_short_description_and_tags() {
        let mut pkg = Package::new("a", "1.0.0", 0);
        pkg.description = "First line\nSecond line".to_string();
        assert_eq!(pkg.short_description(), "First line");
        assert_eq!(pkg.tags_display(), "");

        pkg.tags = Some(vec!["web".to_string(), "http".to_string()]);
        assert_eq!(pkg.tags_display(), "web, http");
        assert_eq!(pkg.id, "a-1.0.0");
    }
}
