use serde::{Deserialize, Serialize};

use super::QueryError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// A 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Validated page; out-of-range values are rejected, never clamped.
    pub fn new(page: u32, limit: u32) -> Result<Self, QueryError> {
        if page < 1 {
            return Err(QueryError::InvalidPagination(
                "page must be at least 1".to_string(),
            ));
        }
        if limit < 1 || limit > MAX_LIMIT {
            return Err(QueryError::InvalidPagination(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        Ok(Self { page, limit })
    }

    /// `(page - 1) * limit`
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}
