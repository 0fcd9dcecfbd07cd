//! Read path over the search index and the live catalog source.
//!
//! Search and browse hit the index; detail views always go to the catalog
//! source so seasons and episodes are current.

mod facade;
mod pagination;

pub use facade::{normalize_series_info, CombinedResults, MediaQuery};
pub use pagination::{Page, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::search_index::IndexError;

/// Errors from the read path.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Search index error: {0}")]
    Index(#[from] IndexError),

    #[error("Catalog source error: {0}")]
    Catalog(CatalogError),
}

impl From<CatalogError> for QueryError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(what) => QueryError::NotFound(what),
            other => QueryError::Catalog(other),
        }
    }
}
