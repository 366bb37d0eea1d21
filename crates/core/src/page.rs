//! Page-based pagination shared by list endpoints.

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Hard cap on page size regardless of what the caller requests.
pub const MAX_LIMIT: u32 = 100;

/// A normalized page request: `page >= 1`, `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Self { page, limit }
    }

    /// Build from raw query-string values. Unparseable values fall back to defaults.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<u64>().ok());
        // Saturate rather than wrap so `limit=99999999999` still caps at MAX_LIMIT.
        let page = parse(page).map(|p| p.min(u32::MAX as u64) as u32);
        let limit = parse(limit).map(|l| l.min(u32::MAX as u64) as u32);
        Self::new(page, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Zero-based row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Cut one page out of an already filtered and ordered collection.
    pub fn slice<T>(&self, all: Vec<T>) -> Page<T> {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(self.offset().min(usize::MAX as u64) as usize)
            .take(self.limit as usize)
            .collect();
        Page::new(items, total, *self)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl PageInfo {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(request.limit as u64),
        }
    }
}

/// One page of results plus its position in the full result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            pagination: PageInfo::new(request, total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_apply_when_absent() {
        let req = PageRequest::new(None, None);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn limit_is_capped() {
        assert_eq!(PageRequest::new(Some(1), Some(500)).limit(), MAX_LIMIT);
        assert_eq!(PageRequest::from_query(None, Some("99999999999")).limit(), MAX_LIMIT);
    }

    #[test]
    fn zero_and_garbage_are_normalized() {
        let req = PageRequest::from_query(Some("0"), Some("abc"));
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), DEFAULT_LIMIT);

        let req = PageRequest::new(Some(3), Some(0));
        assert_eq!(req.limit(), 1);
        assert_eq!(req.offset(), 2);
    }

    #[test]
    fn slice_returns_requested_window() {
        let req = PageRequest::new(Some(2), Some(3));
        let page = req.slice((1..=8).collect::<Vec<_>>());
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.pagination.total, 8);
        assert_eq!(page.pagination.pages, 3);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = PageRequest::new(Some(10), Some(5)).slice(vec![1, 2, 3]);
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.pages, 1);
    }

    proptest! {
        #[test]
        fn pages_is_ceiling_of_total_over_limit(
            page in proptest::option::of(0u32..1_000),
            limit in proptest::option::of(0u32..10_000),
            total in 0u64..1_000_000,
        ) {
            let req = PageRequest::new(page, limit);
            let info = PageInfo::new(req, total);
            prop_assert!(info.limit >= 1 && info.limit <= MAX_LIMIT);
            prop_assert!(info.page >= 1);
            let limit = info.limit as u64;
            prop_assert!(info.pages * limit >= total);
            prop_assert!(info.pages == 0 || (info.pages - 1) * limit < total);
        }

        #[test]
        fn slice_never_exceeds_limit(len in 0usize..500, page in 1u32..20, limit in 1u32..150) {
            let req = PageRequest::new(Some(page), Some(limit));
            let out = req.slice(vec![0u8; len]);
            prop_assert!(out.items.len() <= req.limit() as usize);
            prop_assert_eq!(out.pagination.total, len as u64);
        }
    }
}
