//! Store paging configuration.
//!
//! The hosted store caps every query at 1000 rows, so attendance aggregation
//! pages through results. `ATTENDANCE_PAGE_SIZE` lowers the page size (useful
//! against slow links); values outside 1..=1000 are clamped.

use crate::env_or;

/// Hard cap enforced by the store.
pub const STORE_ROW_LIMIT: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub attendance_page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            attendance_page_size: STORE_ROW_LIMIT,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_page_size(env_or("ATTENDANCE_PAGE_SIZE", STORE_ROW_LIMIT))
    }

    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            attendance_page_size: page_size.clamp(1, STORE_ROW_LIMIT),
        }
    }
}
