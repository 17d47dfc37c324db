//! Page arithmetic shared by grids and product listings.

use serde::Serialize;

use crate::error::{GridError, Result};

/// Largest page number, page size or offset; LIMIT and OFFSET are bound as
/// signed 64-bit integers.
pub const MAX_PAGE_VALUE: u64 = i64::MAX.unsigned_abs();

/// Number of pages needed for `total` rows, `ceil(total / limit)`.
///
/// Zero rows means zero pages.
pub fn page_count(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

/// Check that a page number or page size lies in `1..=MAX_PAGE_VALUE`.
pub fn check_page_value(name: &str, value: u64) -> Result<u64> {
    if value < 1 || value > MAX_PAGE_VALUE {
        return Err(GridError::InvalidGridState(format!(
            "{name} must be between 1 and {MAX_PAGE_VALUE}, got {value}"
        )));
    }
    Ok(value)
}

/// Row offset of a 1-based page.
///
/// Fails when the offset does not fit in `MAX_PAGE_VALUE`.
pub fn offset(page: u64, limit: u64) -> Result<u64> {
    limit
        .checked_mul(page.saturating_sub(1))
        .filter(|offset| *offset <= MAX_PAGE_VALUE)
        .ok_or_else(|| {
            GridError::InvalidGridState(format!(
                "page {page} with page size {limit} is out of range"
            ))
        })
}

/// The requested page clamped to the last page, `min(page, max(page_count, 1))`.
pub fn effective_page(page: u64, page_count: u64) -> u64 {
    page.min(page_count.max(1))
}

/// One page of a listing plus its paging metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationResult<T> {
    /// Effective (clamped) page number.
    pub page: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub page_count: u64,
    pub results: Vec<T>,
}

impl<T> PaginationResult<T> {
    pub fn new(requested_page: u64, page_size: u64, total_count: u64, results: Vec<T>) -> Self {
        let page_count = page_count(total_count, page_size);
        Self {
            page: effective_page(requested_page, page_count),
            page_size,
            total_count,
            page_count,
            results,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Map each result, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginationResult<U> {
        PaginationResult {
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            page_count: self.page_count,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
