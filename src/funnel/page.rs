//! Page slicing over an already-filtered collection.
//!
//! The paginator clamps the requested page number itself. Historically the
//! call sites were expected to clamp and did so inconsistently; clamping at
//! the boundary makes an out-of-range request land on the nearest valid
//! page instead of an empty slice.

use serde::Serialize;

/// Page size used across every list view unless overridden in config.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of records plus navigation bounds.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.total_pages > 0 && self.current_page < self.total_pages
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            page_size: self.page_size,
        }
    }
}

/// Navigation metadata without the items, for result payloads.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageMeta {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
}

impl PageMeta {
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.total_pages > 0 && self.current_page < self.total_pages
    }
}

/// Slices `records` into the requested fixed-size page.
///
/// `requested_page` is 1-based and clamped into `[1, max(1, total_pages)]`;
/// a zero `page_size` is treated as the default. An empty collection yields
/// `total_pages == 0` with `current_page == 1` and no items.
pub fn paginate<T: Clone>(records: &[T], page_size: usize, requested_page: usize) -> Page<T> {
    let page_size = if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    let total_items = records.len();
    let total_pages = total_items.div_ceil(page_size);

    let current_page = requested_page.clamp(1, total_pages.max(1));
    let start = (current_page - 1) * page_size;
    let end = (start + page_size).min(total_items);
    let items = if start >= total_items {
        Vec::new()
    } else {
        records[start..end].to_vec()
    };

    Page {
        items,
        current_page,
        total_pages,
        total_items,
        page_size,
    }
}
