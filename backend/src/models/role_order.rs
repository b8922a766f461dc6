//! Reporting order for role codes.
//!
//! The weekly document lists roles in the order they are staffed on the
//! floor, not by id.

use std::cmp::Ordering;

/// Role codes in reporting order.
pub const ROLE_DISPLAY_ORDER: [&str; 18] = [
    "CF", "BART", "1", "2", "3", "C 1-3", "4", "5", "C 4-5", "CARR 1", "CARR 2", "CBL 2", "BOOST",
    "6", "0", "7", "8", "C 6-8",
];

/// Position of `code` in [`ROLE_DISPLAY_ORDER`], or -1 when unlisted.
///
/// Unlisted codes therefore sort ahead of every listed code.
pub fn role_rank(code: &str) -> i64 {
    ROLE_DISPLAY_ORDER
        .iter()
        .position(|listed| *listed == code)
        .map_or(-1, |index| index as i64)
}

/// Compare two role codes by reporting order.
pub fn compare_role_codes(a: &str, b: &str) -> Ordering {
    role_rank(a).cmp(&role_rank(b))
}

/// Stable sort of `items` by the reporting order of the code returned by `code_of`.
pub fn sort_by_role_order<T, F>(items: &mut [T], code_of: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| compare_role_codes(code_of(a), code_of(b)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listed_codes_follow_display_order() {
        let mut codes = vec!["CARR 1", "C 1-3", "1", "CF"];
        sort_by_role_order(&mut codes, |c| c);
        assert_eq!(codes, vec!["CF", "1", "C 1-3", "CARR 1"]);
    }

    #[test]
    fn test_unlisted_codes_sort_first_and_keep_input_order() {
        let mut codes = vec!["BART", "ZZZ", "CF", "AAA"];
        sort_by_role_order(&mut codes, |c| c);
        assert_eq!(codes, vec!["ZZZ", "AAA", "CF", "BART"]);
    }

    #[test]
    fn test_rank_values() {
        assert_eq!(role_rank("CF"), 0);
        assert_eq!(role_rank("C 6-8"), 17);
        assert_eq!(role_rank("cf"), -1);
    }
}
