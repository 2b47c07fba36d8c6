// ── Pagination ──
//
// Page arithmetic for list views. Pages are 1-indexed and out-of-range
// requests are clamped rather than rejected.

use serde::Serialize;

pub use crate::config::DEFAULT_PAGE_SIZE;

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// The page actually returned, after clamping.
    pub number: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slice out page `page` of `items`.
///
/// `total_pages` is at least 1, so an empty list yields one empty page.
/// A `page_size` of 0 is treated as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let number = page.clamp(1, total_pages);

    let start = (number - 1) * page_size;
    let end = (start + page_size).min(total_items);
    let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    Page {
        number,
        total_pages,
        page_size,
        total_items,
        items,
    }
}
