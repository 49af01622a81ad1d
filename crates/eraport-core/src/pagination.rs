//! Sequential paging over stores that cap the number of rows per response.
//!
//! Hosted stores silently truncate large result sets (the usual cap is 1000
//! rows). Anything that aggregates over a result set must therefore read every
//! page before computing, and each page's offset depends on the size of the
//! previous one, so pages are read strictly one after another.
//!
//! # Example
//!
//! ```ignore
//! use eraport_core::pagination::PageCursor;
//!
//! let mut cursor = PageCursor::new(1000);
//! let mut rows = Vec::new();
//! while let Some(page) = cursor.next_page() {
//!     let batch = store.fetch(page.offset, page.limit).await?;
//!     cursor.advance(batch.len());
//!     rows.extend(batch);
//! }
//! ```

use serde::Serialize;
use utoipa::ToSchema;

/// Largest page any store is asked for.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// One page to request from a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageRequest {
    /// Zero-based index of this page
    pub index: usize,
    /// Number of rows to skip
    pub offset: i64,
    /// Maximum rows to return
    pub limit: i64,
}

/// Cursor that walks a result set page by page until a short page arrives.
#[derive(Debug, Clone)]
pub struct PageCursor {
    limit: i64,
    offset: i64,
    index: usize,
    exhausted: bool,
}

impl PageCursor {
    /// Creates a cursor. The page size is clamped to `[1, MAX_PAGE_SIZE]`.
    pub fn new(page_size: i64) -> Self {
        Self {
            limit: page_size.clamp(1, MAX_PAGE_SIZE),
            offset: 0,
            index: 0,
            exhausted: false,
        }
    }

    #[must_use]
    pub fn page_size(&self) -> i64 {
        self.limit
    }

    /// Returns the next page to fetch, or `None` once a short page was seen.
    pub fn next_page(&self) -> Option<PageRequest> {
        if self.exhausted {
            return None;
        }
        Some(PageRequest {
            index: self.index,
            offset: self.offset,
            limit: self.limit,
        })
    }

    /// Records how many rows the last requested page returned.
    pub fn advance(&mut self, fetched: usize) {
        let fetched = fetched as i64;
        self.offset += fetched;
        self.index += 1;
        if fetched < self.limit {
            self.exhausted = true;
        }
    }

    /// Stops the walk early (e.g. after a failed page).
    pub fn stop(&mut self) {
        self.exhausted = true;
    }

    /// Number of pages requested so far.
    #[must_use]
    pub fn pages_read(&self) -> usize {
        self.index
    }
}
