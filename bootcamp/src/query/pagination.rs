//! Page windows and previous/next links.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 25;

/// A requested page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Parse a positive integer; anything else is `None`.
fn positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

impl PageRequest {
    /// Build a page request from raw `page` and `limit` parameters.
    ///
    /// Missing, non-numeric, zero or negative values fall back to the
    /// defaults (page 1, limit 25).
    ///
    /// # Examples
    ///
    /// ```
    /// use bootcamp::query::PageRequest;
    ///
    /// let page = PageRequest::parse(Some("3"), Some("10"));
    /// assert_eq!(page.start_index(), 20);
    ///
    /// let page = PageRequest::parse(Some("zero"), Some("-5"));
    /// assert_eq!((page.page, page.limit), (1, 25));
    /// ```
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            limit: positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Number of documents skipped before this page: `(page - 1) * limit`.
    pub fn start_index(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Links to the neighbouring pages given the total number of matches.
    pub fn pagination(&self, total: u64) -> Pagination {
        let start = self.start_index();
        let end = start.saturating_add(self.limit);

        Pagination {
            next: (end < total).then(|| PageLink {
                page: self.page + 1,
                limit: self.limit,
            }),
            prev: (start > 0).then(|| PageLink {
                page: self.page - 1,
                limit: self.limit,
            }),
        }
    }
}

/// A pointer to another page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: u64,
    pub limit: u64,
}

/// Previous/next links; absent links are omitted from JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}
