//! Server-driven pagination
//!
//! Mirrors the upstream `pagination` object and computes what the table
//! footer shows: entry range, page-number window and page-size choices.

use serde::{Deserialize, Serialize};

/// Page sizes offered by the page-size selector
pub const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Page-number lists longer than this get collapsed with ellipses
const MAX_VISIBLE_PAGES: u32 = 7;

/// Pagination snapshot as returned by list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            total: 0,
            total_pages: 0,
        }
    }
}

impl Pagination {
    /// 1-based index of the first entry on this page, 0 when empty
    pub fn show_entry(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        (self.page.max(1) as u64 - 1) * self.limit as u64 + 1
    }

    /// 1-based index of the last entry on this page, 0 when empty
    pub fn end_entry(&self) -> u64 {
        (self.page as u64 * self.limit as u64).min(self.total)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn items(&self) -> Vec<PageItem> {
        page_items(self.page, self.total_pages)
    }
}

/// The page the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build from raw query values, clamping nonsense
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.filter(|p| *p >= 1).unwrap_or(1),
            limit: limit
                .filter(|l| *l >= 1)
                .map(|l| l.min(MAX_LIMIT))
                .unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn with_page(self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self
        }
    }

    /// A new page size always starts over at page 1
    pub fn with_limit(self, limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Page-number window for the footer
///
/// Up to seven pages are all shown. Beyond that the first and last page stay
/// visible and the rest collapses around the current page.
pub fn page_items(current: u32, total_pages: u32) -> Vec<PageItem> {
    if total_pages <= MAX_VISIBLE_PAGES {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let current = current.clamp(1, total_pages);
    let mut items = Vec::with_capacity(MAX_VISIBLE_PAGES as usize);

    if current <= 3 {
        items.extend((1..=5).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total_pages));
    } else if current >= total_pages - 2 {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((total_pages - 4..=total_pages).map(PageItem::Page));
    } else {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((current - 1..=current + 1).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total_pages));
    }

    items
}
