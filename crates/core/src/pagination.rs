//! Page-number list for the pagination bar

/// Marker in a page list meaning "render an ellipsis here"
pub const ELLIPSIS: u32 = 0;

/// Builds the page numbers to display for `current` out of `total` pages.
///
/// Up to five pages are listed in full. Beyond that the first and last pages
/// are always present and gaps are marked with [`ELLIPSIS`]:
///
/// ```
/// use libris_core::page_list;
///
/// assert_eq!(page_list(5, 10), vec![1, 0, 4, 5, 6, 0, 10]);
/// assert_eq!(page_list(2, 3), vec![1, 2, 3]);
/// ```
pub fn page_list(current: u32, total: u32) -> Vec<u32> {
    if total <= 5 {
        return (1..=total).collect();
    }

    if current <= 3 {
        vec![1, 2, 3, ELLIPSIS, total]
    } else if current >= total - 2 {
        vec![1, ELLIPSIS, total - 2, total - 1, total]
    } else {
        vec![
            1,
            ELLIPSIS,
            current - 1,
            current,
            current + 1,
            ELLIPSIS,
            total,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_lists_are_complete() {
        assert_eq!(page_list(2, 3), vec![1, 2, 3]);
        assert_eq!(page_list(1, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_list(1, 1), vec![1]);
    }

    #[test]
    fn test_empty_collection() {
        assert!(page_list(1, 0).is_empty());
    }

    #[test]
    fn test_near_start() {
        assert_eq!(page_list(1, 10), vec![1, 2, 3, 0, 10]);
        assert_eq!(page_list(3, 10), vec![1, 2, 3, 0, 10]);
    }

    #[test]
    fn test_near_end() {
        assert_eq!(page_list(10, 10), vec![1, 0, 8, 9, 10]);
        assert_eq!(page_list(8, 10), vec![1, 0, 8, 9, 10]);
    }

    #[test]
    fn test_middle() {
        assert_eq!(page_list(5, 10), vec![1, 0, 4, 5, 6, 0, 10]);
        assert_eq!(page_list(4, 6), vec![1, 0, 4, 5, 6]);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(page_list(7, 20), page_list(7, 20));
    }
}
