//! Page window arithmetic.

use crate::types::PageWindow;

/// Computes the window of zero-based `page` over `total` rows.
///
/// A page past the end yields an empty window. `page_size` is expected to be
/// positive; zero is treated as one.
pub fn window(page: u64, page_size: u64, total: u64) -> PageWindow {
    let page_size = page_size.max(1);
    let offset = page.saturating_mul(page_size);
    let limit = if offset < total { page_size } else { 0 };
    PageWindow {
        offset,
        limit,
        total_pages: total.div_ceil(page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page() {
        let w = window(2, 10, 25);
        assert_eq!(w.offset, 20);
        assert_eq!(w.limit, 10);
        assert_eq!(w.total_pages, 3);
        assert!(!w.is_empty());
    }

    #[test]
    fn test_past_the_end() {
        let w = window(5, 10, 25);
        assert!(w.is_empty());
        assert_eq!(w.total_pages, 3);
    }

    #[test]
    fn test_empty_result_set() {
        let w = window(0, 10, 0);
        assert!(w.is_empty());
        assert_eq!(w.total_pages, 0);
    }

    #[test]
    fn test_exact_multiple() {
        assert_eq!(window(0, 5, 10).total_pages, 2);
        assert!(window(2, 5, 10).is_empty());
    }
}
