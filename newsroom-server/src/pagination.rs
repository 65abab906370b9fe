//! Pagination utilities for admin listings

use serde::Serialize;

/// Rows per page on the admin HTML-backed listings
pub const ADMIN_PAGE_SIZE: i64 = 20;

/// Default `limit` for the `/data` JSON endpoints
pub const DEFAULT_DATA_LIMIT: i64 = 50;

/// Upper bound for a caller-supplied `limit`
pub const MAX_DATA_LIMIT: i64 = 100;

/// Pagination metadata flattened into listing responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub has_next: bool,
    pub has_prev: bool,
    /// Offset for SQL LIMIT/OFFSET
    #[serde(skip)]
    pub offset: i64,
}

/// Calculate pagination metadata from total results and requested page
///
/// Pages below 1 are treated as page 1. Pages past the end are kept as
/// requested and simply return no rows; the offset saturates at `i64::MAX`
/// so any caller-supplied page is safe.
///
/// # Examples
/// ```
/// use newsroom_server::pagination::calculate_pagination;
///
/// // 45 results at 20 per page = 3 pages (20 + 20 + 5)
/// let p = calculate_pagination(45, 2, 20);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 20);
/// assert!(p.has_next && p.has_prev);
///
/// let p = calculate_pagination(45, 0, 20);
/// assert_eq!(p.current_page, 1);
/// assert!(!p.has_prev);
/// ```
pub fn calculate_pagination(total_count: i64, requested_page: i64, limit: i64) -> PageInfo {
    let limit = limit.max(1);
    let total_pages = total_count.max(0).saturating_add(limit - 1) / limit;
    let page = requested_page.max(1);

    PageInfo {
        total_count,
        total_pages,
        current_page: page,
        has_next: page < total_pages,
        has_prev: page > 1,
        offset: (page - 1).saturating_mul(limit),
    }
}

/// Caller-supplied limit bounded to `1..=MAX_DATA_LIMIT`
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_DATA_LIMIT)
        .clamp(1, MAX_DATA_LIMIT)
}
