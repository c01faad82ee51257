//! Requirement range shorthand expansion.
//!
//! Events may reference a run of requirements as `REQ-001 through REQ-005`.
//! Indexing and filtering work on the enumerated identifiers instead.

use std::sync::LazyLock;

use regex::Regex;

/// Pre-compiled pattern for `<prefix><digits> through <prefix><digits>`.
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S*?)(\d+)\s+(?i:through)\s+(\S*?)(\d+)$").expect("range pattern is valid")
});

/// Ranges wider than this are left unexpanded.
pub const MAX_RANGE_LEN: u64 = 10_000;

/// Expands a requirement reference into the identifiers it names.
///
/// `P-001 through P-003` becomes `["P-001", "P-002", "P-003"]`, each number
/// zero-padded to the width of the start value. Anything else comes back
/// unchanged as a single element: plain identifiers, reversed ranges, ranges
/// whose prefixes differ, and ranges longer than [`MAX_RANGE_LEN`].
pub fn expand_requirement(requirement: &str) -> Vec<String> {
    expand_range(requirement.trim()).unwrap_or_else(|| vec![requirement.to_string()])
}

fn expand_range(s: &str) -> Option<Vec<String>> {
    let caps = RANGE_RE.captures(s)?;
    let prefix = &caps[1];
    if prefix != &caps[3] {
        return None;
    }

    let start_digits = &caps[2];
    let width = start_digits.len();
    let start: u64 = start_digits.parse().ok()?;
    let end: u64 = caps[4].parse().ok()?;
    if start > end || end - start >= MAX_RANGE_LEN {
        return None;
    }

    Some(
        (start..=end)
            .map(|n| format!("{prefix}{n:0width$}"))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_inclusive_range() {
        let ids = expand_requirement("P-001 through P-005");
        assert_eq!(ids.len(), 5);
        assert_eq!(ids.first().map(String::as_str), Some("P-001"));
        assert_eq!(ids.last().map(String::as_str), Some("P-005"));
    }

    #[test]
    fn reversed_range_passes_through() {
        assert_eq!(
            expand_requirement("P-005 through P-001"),
            vec!["P-005 through P-001"]
        );
    }

    #[test]
    fn through_is_case_insensitive() {
        assert_eq!(
            expand_requirement("REQ-8 THROUGH REQ-10"),
            vec!["REQ-8", "REQ-9", "REQ-10"]
        );
    }

    #[test]
    fn pads_to_start_width() {
        assert_eq!(
            expand_requirement("FR-098 through FR-101"),
            vec!["FR-098", "FR-099", "FR-100", "FR-101"]
        );
    }

    #[test]
    fn mismatched_prefix_passes_through() {
        assert_eq!(
            expand_requirement("FR-001 through NFR-003"),
            vec!["FR-001 through NFR-003"]
        );
    }

    #[test]
    fn plain_identifiers_are_untouched() {
        assert_eq!(expand_requirement("REQ-042"), vec!["REQ-042"]);
        assert_eq!(expand_requirement("REQ-1, REQ-2"), vec!["REQ-1, REQ-2"]);
        assert_eq!(expand_requirement(""), vec![""]);
    }

    #[test]
    fn single_element_range() {
        assert_eq!(expand_requirement("R7 through R7"), vec!["R7"]);
    }

    #[test]
    fn oversized_range_passes_through() {
        let s = "R-1 through R-99999999";
        assert_eq!(expand_requirement(s), vec![s]);
    }
}
