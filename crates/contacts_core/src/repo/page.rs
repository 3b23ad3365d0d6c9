//! Page request/response envelopes for list-style queries.
//!
//! # Invariants
//! - Pages are 1-based.
//! - Size defaults to 50 and is clamped to 100.
//! - Queries fetch only one page of rows plus a count, never the full set.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Requested page of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Applies defaults and clamps out-of-range values.
    pub fn normalized(self) -> Self {
        let page = self.page.max(1);
        let size = match self.size {
            0 => DEFAULT_PAGE_SIZE,
            value if value > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
            value => value,
        };
        Self { page, size }
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.size)
    }
}

/// One page of results plus paging metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let pages = if request.size == 0 {
            0
        } else {
            total.div_ceil(u64::from(request.size))
        };
        Self {
            items,
            total,
            page: request.page,
            size: request.size,
            pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
