//! Package detail and release history commands

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use tabled::Tabled;

use pkgscope_core::catalog::{compare_newest_first, Package};
use pkgscope_core::detail::{format_downloads, DetailTab, PackageDetail, TrustSummary};

use crate::search_cli::render_table;
use crate::Explorer;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Package name
    pub name: String,

    /// Exact release version
    pub version: String,

    /// Tab to show: overview, versions, files or security
    #[clap(long)]
    pub tab: Option<DetailTab>,

    /// Start from a shared URL query string (e.g. "activeTab=files")
    #[clap(long, default_value = "")]
    pub url: String,

    /// Output as JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ReleaseRow {
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Downloads")]
    downloads: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "")]
    marker: String,
}

fn release_rows(releases: &[&Package], current: Option<&str>) -> Vec<ReleaseRow> {
    releases
        .iter()
        .enumerate()
        .map(|(i, pkg)| {
            let mut markers = Vec::new();
            if i == 0 {
                markers.push("latest");
            }
            if current == Some(pkg.version.as_str()) {
                markers.push("current");
            }
            ReleaseRow {
                version: pkg.version.clone(),
                downloads: format_downloads(pkg.downloads),
                updated: pkg.updated.clone(),
                marker: markers.join(", "),
            }
        })
        .collect()
}

pub fn execute_show(explorer: &Explorer, args: ShowArgs) -> Result<()> {
    let mut detail = PackageDetail::open(&explorer.dataset, &args.name, &args.version, &args.url)
        .with_context(|| format!("Cannot open {}@{}", args.name, args.version))?;
    if let Some(tab) = args.tab {
        detail.set_active_tab(tab);
    }

    let pkg = detail.package();
    let url = format!(
        "/package/{}/{}?{}",
        pkg.name,
        pkg.version,
        detail.query_string()
    );

    if args.json {
        let output = serde_json::json!({
            "package": pkg,
            "activeTab": detail.active_tab(),
            "isLatest": detail.is_latest(),
            "versions": detail.versions().iter().map(|p| &p.version).collect::<Vec<_>>(),
            "trust": detail.trust_summary(Utc::now()),
            "url": url,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let latest = if detail.is_latest() { " (latest)" } else { "" };
    println!("Package: {} v{}{}", pkg.name, pkg.version, latest);
    println!("Tab:     {}", detail.active_tab());
    println!();

    match detail.active_tab() {
        DetailTab::Overview => print_overview(pkg),
        DetailTab::Versions => print_versions(&detail),
        DetailTab::Files => print_files(pkg),
        DetailTab::Security => print_security(pkg, &detail.trust_summary(Utc::now())),
    }

    println!();
    println!("URL: {url}");
    Ok(())
}

fn print_overview(pkg: &Package) {
    println!("Author:    {}", pkg.author);
    println!("License:   {}", pkg.license);
    println!("Downloads: {}", format_downloads(pkg.downloads));
    println!("Updated:   {}", pkg.updated);
    if let Some(index) = &pkg.index {
        println!("Index:     {index}");
    }
    let tags = pkg.tags_display();
    if !tags.is_empty() {
        println!("Tags:      {tags}");
    }

    println!();
    println!("Description:");
    let description = pkg.full_description.as_deref().unwrap_or(&pkg.description);
    for line in description.lines() {
        println!("  {line}");
    }

    if let Some(dependents) = pkg.dependents.as_deref().filter(|d| !d.is_empty()) {
        println!();
        println!("Used by:");
        for dependent in dependents {
            println!(
                "  {} v{} ({} downloads)",
                dependent.name,
                dependent.version,
                format_downloads(dependent.downloads)
            );
        }
    }
}

fn print_versions(detail: &PackageDetail<'_>) {
    let releases = detail.versions();
    let current = detail.package().version.as_str();
    println!("{}", render_table(&release_rows(&releases, Some(current))));

    // Release history recorded on the package itself, when it has one
    if let Some(history) = detail.package().versions.as_deref().filter(|h| !h.is_empty()) {
        let mut history: Vec<_> = history.iter().collect();
        history.sort_by(|a, b| compare_newest_first(&a.version, &b.version));
        println!();
        println!("Release history:");
        for entry in history {
            println!(
                "  v{:<14} {:<12} {} downloads",
                entry.version,
                entry.release_date,
                format_downloads(entry.downloads)
            );
        }
    }
}

fn print_files(pkg: &Package) {
    let Some(wheel) = &pkg.wheel_name else {
        println!("No distribution files recorded.");
        return;
    };
    println!("Wheel:        {wheel}");
    for (label, value) in [
        ("Python:      ", &pkg.python_version),
        ("ABI:         ", &pkg.abi),
        ("Architecture:", &pkg.architecture),
    ] {
        if let Some(value) = value {
            println!("{label} {value}");
        }
    }
}

fn print_security(pkg: &Package, trust: &TrustSummary) {
    if trust.is_empty() {
        println!("No provenance data available.");
    } else {
        if let Some(level) = trust.slsa_level {
            println!("SLSA level:   {level}");
        }
        if let Some(score) = trust.trust_score {
            println!("Trust score:  {score:.1}");
        }
        println!(
            "Attestations: {}/{} verified, {} expired",
            trust.verified_attestations, trust.total_attestations, trust.expired_attestations
        );
        if let Some(sbom) = &pkg.current_version_sbom {
            println!("SBOM:         {} ({})", sbom.format, sbom.url);
        }
    }

    println!();
    match pkg.security_advisories.as_deref() {
        Some(advisories) if !advisories.is_empty() => {
            println!("Advisories:");
            for advisory in advisories {
                println!(
                    "  [{:?}] {} - {}",
                    advisory.severity, advisory.id, advisory.title
                );
            }
        }
        _ if trust.has_vulnerabilities => println!("SBOM reports known vulnerabilities."),
        _ => println!("No known advisories."),
    }
}

pub fn execute_versions(explorer: &Explorer, name: &str, json_output: bool) -> Result<()> {
    let releases = explorer.dataset.versions_of(name);
    if releases.is_empty() {
        bail!("Package '{name}' not found");
    }

    if json_output {
        let output: Vec<serde_json::Value> = releases
            .iter()
            .map(|pkg| {
                serde_json::json!({
                    "version": pkg.version,
                    "downloads": pkg.downloads,
                    "updated": pkg.updated,
                    "preRelease": pkg.parsed_version().is_pre_release(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} release(s) of {name}:\n", releases.len());
        println!("{}", render_table(&release_rows(&releases, None)));
    }

    Ok(())
}
