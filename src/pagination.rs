//! This module defines the common functionality for paging data.

use serde::Serialize;

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum transactions to return per page when not specified in a
    /// request.
    pub default_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_limit: 1000,
        }
    }
}

/// The paging metadata returned alongside a page of results.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// The 1-indexed page that was served.
    pub page: u64,
    /// The maximum number of rows in the page.
    pub limit: u64,
    /// The total number of rows matching the filters, across all pages.
    pub total: u64,
}

/// The row offset for a 1-indexed `page` of size `limit`.
///
/// A page of zero is treated the same as page one.
pub fn page_offset(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(limit)
}
