//! Catalog query engine
//!
//! Turns a latest-version catalog plus [`QueryParams`] into a sorted,
//! paginated result page, and keeps those parameters in sync with a URL
//! query string so a search can be shared and restored.

pub mod codec;
mod page;
mod params;
mod pipeline;
mod session;

pub use codec::DecodedQuery;
pub use page::{total_pages, Page};
pub use params::{
    normalize_facet_values, FilterCategory, FilterValues, PerPage, QueryParams, SortOption,
};
pub use pipeline::{apply_filters, paginate, recency_days, sort_catalog, UNKNOWN_RECENCY_DAYS};
pub use session::SearchSession;
