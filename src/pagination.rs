//! Offset pagination shared by list endpoints and table state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page sizes a table may be switched between.
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [10, 20, 30, 50, 100];

/// Page size used by a freshly created table.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// `limit` applied by list endpoints when the client does not send one.
pub const DEFAULT_LIMIT: usize = 100;

/// Largest `limit` accepted by list endpoints.
pub const MAX_LIMIT: usize = 1000;

/// Offset window requested from a list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub skip: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a window from raw query parameters, clamping `limit` to `1..=MAX_LIMIT`.
    pub fn new(skip: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    /// Window covering the zero-based `page_index` of a table showing `page_size` rows.
    pub fn from_page(page_index: usize, page_size: usize) -> Self {
        Self {
            skip: page_index * page_size,
            limit: page_size,
        }
    }
}

/// Bare `skip`/`limit` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl From<PageParams> for PageRequest {
    fn from(params: PageParams) -> Self {
        Self::new(params.skip, params.limit)
    }
}

/// One page of results together with the total number of matching rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListPage<T> {
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
    pub items: Vec<T>,
}

impl<T> ListPage<T> {
    pub fn new(total: usize, page: PageRequest, items: Vec<T>) -> Self {
        Self {
            total,
            skip: page.skip,
            limit: page.limit,
            items,
        }
    }

    /// Convert every item while keeping the window metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListPage<U> {
        ListPage {
            total: self.total,
            skip: self.skip,
            limit: self.limit,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page size {0} is not one of 10, 20, 30, 50 or 100")]
    UnsupportedPageSize(usize),
}

/// Client-side pagination state of a server-driven table.
///
/// The table never fetches data itself: it exposes the [`PageRequest`] the
/// owner should send and is told the `total` once a page arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePagination {
    page_index: usize,
    page_size: usize,
    total: usize,
    page_input: String,
}

impl Default for TablePagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
            page_input: "1".to_string(),
        }
    }
}

impl TablePagination {
    pub fn new(page_size: usize) -> Result<Self, PaginationError> {
        let mut table = Self::default();
        table.set_page_size(page_size)?;
        Ok(table)
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Text currently shown in the "go to page" input (1-based).
    pub fn page_input(&self) -> &str {
        &self.page_input
    }

    /// Number of pages, never less than one so an empty table still has a page.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    /// Window to request for the current page.
    pub fn request(&self) -> PageRequest {
        PageRequest::from_page(self.page_index, self.page_size)
    }

    /// Record the total reported by the server, pulling the current page back in range.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        if self.page_index >= self.page_count() {
            self.go_to(self.page_count() - 1);
        }
    }

    /// Switch to another page size and return to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), PaginationError> {
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            return Err(PaginationError::UnsupportedPageSize(page_size));
        }
        self.page_size = page_size;
        self.go_to(0);
        Ok(())
    }

    pub fn next_page(&mut self) -> bool {
        if self.page_index + 1 < self.page_count() {
            self.go_to(self.page_index + 1);
            return true;
        }
        false
    }

    pub fn previous_page(&mut self) -> bool {
        if self.page_index > 0 {
            self.go_to(self.page_index - 1);
            return true;
        }
        false
    }

    /// Apply a manually typed 1-based page number.
    ///
    /// Input that is not a number in `1..=page_count` is rejected and the
    /// input text reverts to the last valid page.
    pub fn type_page(&mut self, input: &str) -> bool {
        match input.trim().parse::<usize>() {
            Ok(page) if (1..=self.page_count()).contains(&page) => {
                self.go_to(page - 1);
                true
            }
            _ => {
                self.page_input = (self.page_index + 1).to_string();
                false
            }
        }
    }

    fn go_to(&mut self, page_index: usize) {
        self.page_index = page_index;
        self.page_input = (page_index + 1).to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_matches_page_index_and_size() {
        for &size in PAGE_SIZE_OPTIONS.iter() {
            for index in 0..5 {
                let request = PageRequest::from_page(index, size);
                assert_eq!(request.skip, index * size);
                assert_eq!(request.limit, size);
            }
        }
    }

    #[test]
    fn query_limit_is_clamped() {
        assert_eq!(PageRequest::new(None, None), PageRequest::default());
        assert_eq!(PageRequest::new(Some(5), Some(0)).limit, 1);
        assert_eq!(PageRequest::new(Some(5), Some(5000)).limit, MAX_LIMIT);
        assert_eq!(PageRequest::new(Some(5), Some(20)).skip, 5);
    }

    #[test]
    fn unsupported_page_size_is_rejected() {
        assert_eq!(
            TablePagination::new(25),
            Err(PaginationError::UnsupportedPageSize(25))
        );
        assert!(TablePagination::new(50).is_ok());
    }

    #[test]
    fn typed_page_out_of_range_reverts_to_last_valid_page() {
        let mut table = TablePagination::new(20).unwrap();
        table.set_total(95);
        assert_eq!(table.page_count(), 5);

        assert!(table.type_page("3"));
        assert_eq!(table.page_index(), 2);
        assert_eq!(table.request(), PageRequest { skip: 40, limit: 20 });

        assert!(!table.type_page("6"));
        assert_eq!(table.page_index(), 2);
        assert_eq!(table.page_input(), "3");

        assert!(!table.type_page("0"));
        assert!(!table.type_page("abc"));
        assert_eq!(table.page_input(), "3");
    }

    #[test]
    fn shrinking_total_pulls_page_back() {
        let mut table = TablePagination::new(10).unwrap();
        table.set_total(100);
        assert!(table.type_page("10"));
        table.set_total(25);
        assert_eq!(table.page_index(), 2);
        assert_eq!(table.page_input(), "3");
    }

    #[test]
    fn changing_page_size_returns_to_first_page() {
        let mut table = TablePagination::new(10).unwrap();
        table.set_total(100);
        assert!(table.next_page());
        assert!(table.set_page_size(30).is_ok());
        assert_eq!(table.page_index(), 0);
        assert!(!table.previous_page());
    }
}
