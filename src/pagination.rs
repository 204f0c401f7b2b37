//! Page arithmetic shared by the service and the display board.
//!
//! Pages are 1-based. Requests beyond the last page are valid and simply
//! produce an empty page, so none of these functions reject out-of-range input.

/// Rows skipped before the requested page.
pub fn offset(page: u32, page_size: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(page_size)
}

/// `ceil(total_count / page_size)`, 0 for an empty set.
pub fn page_count(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Highest valid page number (at least 1).
pub fn last_page(total_count: u64, page_size: u32) -> u32 {
    page_count(total_count, page_size).max(1)
}

/// Auto-slide successor: wraps to page 1 after the last page.
pub fn next_page_wrapping(current_page: u32, page_count: u32) -> u32 {
    if current_page >= page_count {
        1
    } else {
        current_page + 1
    }
}

/// Clamp a requested page size into `[1, max_page_size]`.
pub fn clamp_page_size(requested: u32, max_page_size: u32) -> u32 {
    requested.clamp(1, max_page_size.max(1))
}

/// The pager is only drawn when the result does not fit on one page.
pub fn shows_pager(total_count: u64, page_size: u32) -> bool {
    total_count > u64::from(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(offset(1, 8), 0);
        assert_eq!(offset(3, 8), 16);
        assert_eq!(offset(0, 8), 0);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 8), 0);
        assert_eq!(page_count(1, 8), 1);
        assert_eq!(page_count(8, 8), 1);
        assert_eq!(page_count(9, 8), 2);
        assert_eq!(page_count(24, 12), 2);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn test_last_page_never_zero() {
        assert_eq!(last_page(0, 8), 1);
        assert_eq!(last_page(17, 8), 3);
    }

    #[test]
    fn test_next_page_wraps() {
        assert_eq!(next_page_wrapping(3, 3), 1);
        assert_eq!(next_page_wrapping(2, 3), 3);
        assert_eq!(next_page_wrapping(1, 0), 1);
        assert_eq!(next_page_wrapping(7, 3), 1);
    }

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(clamp_page_size(0, 100), 1);
        assert_eq!(clamp_page_size(12, 100), 12);
        assert_eq!(clamp_page_size(5000, 100), 100);
        assert_eq!(clamp_page_size(5, 0), 1);
    }

    #[test]
    fn test_shows_pager() {
        assert!(!shows_pager(12, 12));
        assert!(shows_pager(13, 12));
    }
}
