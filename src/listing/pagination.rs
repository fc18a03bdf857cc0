//! Fixed-size, 1-based pagination.

use std::ops::{Range, RangeInclusive};

/// Number of pages needed for `total` items.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    current: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_count(&self, total: usize) -> usize {
        page_count(total, self.page_size)
    }

    /// Highest reachable page; an empty list still has page 1.
    pub fn last_page(&self, total: usize) -> usize {
        self.page_count(total).max(1)
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    /// Jump to `page`, clamped into `[1, last_page]`.
    pub fn go_to(&mut self, page: usize, total: usize) {
        self.current = page.clamp(1, self.last_page(total));
    }

    /// Re-clamp after the item count changed.
    pub fn clamp(&mut self, total: usize) {
        self.go_to(self.current, total);
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.current < self.page_count(total)
    }

    pub fn previous(&mut self, total: usize) {
        if self.has_previous() {
            self.go_to(self.current - 1, total);
        }
    }

    pub fn next(&mut self, total: usize) {
        if self.has_next(total) {
            self.go_to(self.current + 1, total);
        }
    }

    /// Index range of the current page within the filtered list.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = ((self.current - 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    /// Page numbers shown between the previous and next controls.
    pub fn numbers(&self, total: usize) -> RangeInclusive<usize> {
        1..=self.page_count(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_is_ceiling() {
        assert_eq!(page_count(0, 5), 0);
        assert_eq!(page_count(5, 5), 1);
        assert_eq!(page_count(6, 5), 2);
        assert_eq!(page_count(23, 10), 3);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut pages = Pagination::new(5);
        let total = 12;

        pages.previous(total);
        assert_eq!(pages.current(), 1);
        assert!(!pages.has_previous());

        pages.go_to(99, total);
        assert_eq!(pages.current(), 3);
        assert!(!pages.has_next(total));
        pages.next(total);
        assert_eq!(pages.current(), 3);
        assert_eq!(pages.range(total), 10..12);

        pages.go_to(0, total);
        assert_eq!(pages.current(), 1);
        assert_eq!(pages.range(total), 0..5);
    }

    #[test]
    fn test_empty_list_stays_on_page_one() {
        let mut pages = Pagination::new(10);
        pages.go_to(4, 0);
        assert_eq!(pages.current(), 1);
        assert_eq!(pages.range(0), 0..0);
        assert!(!pages.has_next(0));
        assert!(pages.numbers(0).is_empty());
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut pages = Pagination::new(5);
        pages.go_to(3, 11);
        pages.clamp(10);
        assert_eq!(pages.current(), 2);
    }
}
