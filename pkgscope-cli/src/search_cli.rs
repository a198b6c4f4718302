//! Search, catalog and facet commands

use anyhow::Result;
use clap::Args;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use pkgscope_core::catalog::Package;
use pkgscope_core::detail::format_downloads;
use pkgscope_core::facets::{facet_counts, option_label, FacetCount, CLASSIFICATION_OPTIONS, LICENSE_OPTIONS};
use pkgscope_core::query::{
    apply_filters, FilterCategory, FilterValues, PerPage, SearchSession, SortOption,
};

use crate::Explorer;

/// Width the description column is cut to
const DESCRIPTION_WIDTH: usize = 50;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Start from a shared URL query string (e.g. "q=http&sort=downloads")
    #[clap(long, default_value = "")]
    pub url: String,

    /// Search text (matches name, description and author)
    #[clap(short, long)]
    pub query: Option<String>,

    /// Result ordering: relevance, date or downloads
    #[clap(long)]
    pub sort: Option<SortOption>,

    /// Page number, starting at 1
    #[clap(long)]
    pub page: Option<usize>,

    /// Results per page: 10, 20 or 50
    #[clap(long)]
    pub per_page: Option<PerPage>,

    /// Source indexes to include (comma-separated)
    #[clap(long, value_delimiter = ',')]
    pub index: Option<Vec<String>>,

    /// Classifications to include (comma-separated)
    #[clap(long, value_delimiter = ',')]
    pub classification: Option<Vec<String>>,

    /// Licenses to include (comma-separated)
    #[clap(long, value_delimiter = ',')]
    pub license: Option<Vec<String>>,

    /// Catalog to search (defaults to the configured default index)
    #[clap(long)]
    pub catalog: Option<String>,

    /// Output results as JSON
    #[clap(long)]
    pub json: bool,
}

impl SearchArgs {
    /// Apply flag overrides on top of the URL state.
    ///
    /// Page-resetting changes go first so an explicit `--page` survives.
    pub fn apply(self, session: &mut SearchSession) {
        if let Some(query) = self.query {
            session.set_search_query(query);
        }
        for (category, values) in [
            (FilterCategory::Index, self.index),
            (FilterCategory::Classification, self.classification),
            (FilterCategory::License, self.license),
        ] {
            if let Some(values) = values {
                session.set_filter(category, values);
            }
        }
        if let Some(per_page) = self.per_page {
            session.set_per_page(per_page);
        }
        if let Some(sort) = self.sort {
            session.set_sort_by(sort);
        }
        if let Some(page) = self.page {
            session.set_page(page);
        }
    }
}

/// Table row for search results
#[derive(Tabled)]
struct SearchResultRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Downloads")]
    downloads: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "License")]
    license: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Package> for SearchResultRow {
    fn from(pkg: &Package) -> Self {
        Self {
            name: pkg.name.clone(),
            version: pkg.version.clone(),
            downloads: format_downloads(pkg.downloads),
            updated: pkg.updated.clone(),
            license: pkg.license.clone(),
            description: truncate(pkg.short_description(), DESCRIPTION_WIDTH),
        }
    }
}

/// Cut `text` to `max` characters, ending in `...` when shortened
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}

pub fn execute_search(explorer: &Explorer, args: SearchArgs) -> Result<()> {
    let selected_index = args
        .catalog
        .clone()
        .unwrap_or_else(|| explorer.config.default_index.clone());
    let json_output = args.json;

    let mut session = SearchSession::new(
        explorer.dataset.clone(),
        explorer.catalogs.clone(),
        selected_index,
        &args.url,
    );
    args.apply(&mut session);

    let page = session.current_page();
    let url = session.url_for("/search");

    if json_output {
        let output = serde_json::json!({
            "catalog": session.selected_index(),
            "url": url,
            "params": session.params(),
            "totalInCatalog": session.total_item_count(),
            "page": page,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match page.item_range() {
        None => {
            println!("No packages found.");
            if session.filtered_item_count() > 0 {
                println!(
                    "Page {} is past the last page ({}).",
                    page.page, page.total_pages
                );
            }
        }
        Some((first, last)) => {
            let rows: Vec<SearchResultRow> = page.items.iter().map(|pkg| (*pkg).into()).collect();
            println!("{}", render_table(&rows));
            println!(
                "Showing {first}-{last} of {} ({} in catalog) | page {} of {} | sorted by {}",
                page.total,
                session.total_item_count(),
                page.page,
                page.total_pages,
                session.sort_by().label()
            );
        }
    }

    let active = session.filters().active_count();
    if active > 0 {
        println!("{active} filter value(s) active");
    }
    println!("URL: {url}");

    Ok(())
}

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Packages")]
    packages: usize,
    #[tabled(rename = "Default")]
    default: String,
}

pub fn execute_catalogs(explorer: &Explorer, json_output: bool) -> Result<()> {
    let packages = explorer.dataset.packages();

    let rows: Vec<CatalogRow> = explorer
        .catalogs
        .definitions()
        .iter()
        .map(|def| CatalogRow {
            key: def.key.clone(),
            label: def.label.clone(),
            records: def.raw_subset(packages).len(),
            packages: explorer.catalogs.select_positions(packages, &def.key).len(),
            default: if def.key == explorer.config.default_index {
                "yes".to_string()
            } else {
                String::new()
            },
        })
        .collect();

    if json_output {
        let output: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                serde_json::json!({
                    "key": row.key,
                    "label": row.label,
                    "records": row.records,
                    "packages": row.packages,
                    "default": !row.default.is_empty(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", render_table(&rows));
    }

    Ok(())
}

#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Count")]
    count: usize,
}

fn count_of(counts: &[FacetCount], value: &str) -> usize {
    counts
        .iter()
        .find(|c| c.value == value)
        .map_or(0, |c| c.count)
}

pub fn execute_facets(explorer: &Explorer, catalog_key: &str, json_output: bool) -> Result<()> {
    let catalog = explorer.catalogs.select_catalog(&explorer.dataset, catalog_key);
    let counts = facet_counts(&catalog);

    if json_output {
        let output = serde_json::json!({
            "catalog": catalog_key,
            "sortOptions": SortOption::ALL.iter().map(|s| serde_json::json!({
                "value": s.as_str(),
                "label": s.label(),
            })).collect::<Vec<_>>(),
            "perPageOptions": PerPage::ALL.iter().map(|p| p.get()).collect::<Vec<_>>(),
            "classificationOptions": CLASSIFICATION_OPTIONS,
            "licenseOptions": LICENSE_OPTIONS,
            "counts": counts,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Classification options:");
    let rows: Vec<OptionRow> = CLASSIFICATION_OPTIONS
        .iter()
        .map(|opt| OptionRow {
            value: opt.value.to_string(),
            label: opt.label.to_string(),
            count: apply_filters(
                &catalog,
                "",
                &FilterValues {
                    classification: vec![opt.value.to_string()],
                    ..FilterValues::default()
                },
            )
            .len(),
        })
        .collect();
    println!("{}", render_table(&rows));

    println!("\nLicenses in '{catalog_key}':");
    let mut rows: Vec<OptionRow> = LICENSE_OPTIONS
        .iter()
        .map(|opt| OptionRow {
            value: opt.value.to_string(),
            label: opt.label.to_string(),
            count: count_of(&counts.license, opt.value),
        })
        .collect();
    // Licenses present in the data but missing from the option list
    rows.extend(
        counts
            .license
            .iter()
            .filter(|c| option_label(&c.value).is_none())
            .map(|c| OptionRow {
                value: c.value.clone(),
                label: "-".to_string(),
                count: c.count,
            }),
    );
    println!("{}", render_table(&rows));

    println!("\nIndexes in '{catalog_key}':");
    let mut rows: Vec<OptionRow> = counts
        .index
        .iter()
        .map(|c| OptionRow {
            value: c.value.clone(),
            label: "-".to_string(),
            count: c.count,
        })
        .collect();
    if counts.unindexed > 0 {
        rows.push(OptionRow {
            value: "(none)".to_string(),
            label: "not filterable by index".to_string(),
            count: counts.unindexed,
        });
    }
    println!("{}", render_table(&rows));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pkgscope_core::catalog::Dataset;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[derive(Parser, Debug)]
    struct Harness {
        #[clap(flatten)]
        args: SearchArgs,
    }

    fn parse(argv: &[&str]) -> SearchArgs {
        let mut full = vec!["search"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_parse_search_flags() {
        let args = parse(&[
            "-q",
            "http",
            "--sort",
            "downloads",
            "--per-page",
            "20",
            "--license",
            "MIT,Apache-2.0",
        ]);
        assert_eq!(args.query.as_deref(), Some("http"));
        assert_eq!(args.sort, Some(SortOption::Downloads));
        assert_eq!(args.per_page, Some(PerPage::Twenty));
        assert_eq!(
            args.license,
            Some(vec!["MIT".to_string(), "Apache-2.0".to_string()])
        );
    }

    #[test]
    fn test_rejects_unsupported_page_size() {
        assert!(Harness::try_parse_from(["search", "--per-page", "25"]).is_err());
    }

    #[test]
    fn test_explicit_page_survives_other_overrides() {
        let dataset = Arc::new(Dataset::bundled().unwrap());
        let mut session = SearchSession::with_defaults(dataset, "page=3");

        parse(&["-q", "py", "--page", "2", "--license", "MIT"]).apply(&mut session);
        assert_eq!(session.page(), 2);
        assert_eq!(session.query_string(), "q=py&page=2&license=MIT");
    }

    #[test]
    fn test_flags_override_url_state() {
        let dataset = Arc::new(Dataset::bundled().unwrap());
        let mut session = SearchSession::with_defaults(dataset, "q=torch&sort=date&ref=share");

        parse(&["--sort", "downloads"]).apply(&mut session);
        assert_eq!(session.query_string(), "q=torch&sort=downloads&ref=share");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 10), "abcdefg...");
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_row_formats_downloads() {
        let mut pkg = Package::new("numpy", "1.26.4", 39_110_000);
        pkg.description = "Array computing.\nSecond line.".to_string();
        let row = SearchResultRow::from(&pkg);
        assert_eq!(row.downloads, "39.1M");
        assert_eq!(row.description, "Array computing.");
    }
}
