//! Canonical workflow phase ordering.

use std::cmp::Ordering;

/// Known phases in workflow order.
pub const CANONICAL_PHASES: [&str; 9] = [
    "requirements",
    "architecture",
    "design",
    "planning",
    "implementation",
    "review",
    "testing",
    "documentation",
    "deployment",
];

/// Position of a phase in [`CANONICAL_PHASES`], or `None` for unknown phases.
pub fn phase_rank(phase: &str) -> Option<usize> {
    CANONICAL_PHASES.iter().position(|p| *p == phase)
}

/// Orders known phases canonically, then unknown phases alphabetically.
pub fn compare_phases(a: &str, b: &str) -> Ordering {
    match (phase_rank(a), phase_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sorts phase names in place using [`compare_phases`].
pub fn sort_phases<S: AsRef<str>>(phases: &mut [S]) {
    phases.sort_by(|a, b| compare_phases(a.as_ref(), b.as_ref()));
}
