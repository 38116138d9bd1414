//! Page-based pagination utilities.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not specify one.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// A normalised page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Normalise optional caller input: page is at least 1, per_page is clamped to 1..=100.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    /// Pagination summary for a result set of `total` rows.
    pub fn summary(&self, total: i64) -> Pagination {
        let total_pages = if total <= 0 {
            0
        } else {
            ((total as f64) / (self.per_page as f64)).ceil() as u32
        };
        Pagination {
            page: self.page,
            per_page: self.per_page,
            total,
            total_pages,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, DEFAULT_PER_PAGE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_clamps_out_of_range_values() {
        let req = PageRequest::new(Some(0), Some(1000));
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, MAX_PER_PAGE);

        let req = PageRequest::new(Some(3), Some(0));
        assert_eq!(req.per_page, 1);
        assert_eq!(req.offset(), 2);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::new(Some(4), Some(25));
        assert_eq!(req.offset(), 75);
        assert_eq!(req.limit(), 25);
    }

    #[test]
    fn test_summary_total_pages() {
        let req = PageRequest::new(Some(1), Some(10));
        assert_eq!(req.summary(0).total_pages, 0);
        assert_eq!(req.summary(10).total_pages, 1);
        assert_eq!(req.summary(11).total_pages, 2);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = PageRequest::new(Some(2), Some(5)).summary(12);
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["perPage"], 5);
        assert_eq!(json["totalPages"], 3);
    }
}
