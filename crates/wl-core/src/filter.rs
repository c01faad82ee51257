//! Event filtering across independent dimensions.
//!
//! Within a dimension any selected value matches (OR); across dimensions every
//! active constraint must hold (AND). An empty selection constrains nothing.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::event::Event;
use crate::index::EventRef;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub agents: HashSet<String>,
    pub actions: HashSet<String>,
    pub phases: HashSet<String>,
    pub work_seqs: HashSet<String>,
    /// Matches events that created or modified this path.
    pub file: Option<String>,
    /// Matches events referencing this requirement, after range expansion.
    pub requirement: Option<String>,
}

impl EventFilter {
    /// True if any dimension carries a constraint.
    pub fn is_active(&self) -> bool {
        !self.agents.is_empty()
            || !self.actions.is_empty()
            || !self.phases.is_empty()
            || !self.work_seqs.is_empty()
            || self.file.is_some()
            || self.requirement.is_some()
    }

    pub fn matches(&self, event: &Event) -> bool {
        allows(&self.agents, &event.agent)
            && allows(&self.actions, event.action.as_str())
            && allows(&self.phases, &event.phase)
            && allows(&self.work_seqs, &event.work_seq)
            && self.file.as_deref().is_none_or(|path| event.touches_file(path))
            && self
                .requirement
                .as_deref()
                .is_none_or(|id| event.expanded_requirements().any(|r| r == id))
    }

    /// Returns the matching events in order. Borrows `events` untouched when
    /// the filter is inactive.
    pub fn apply<'a>(&self, events: &'a [EventRef]) -> Cow<'a, [EventRef]> {
        if !self.is_active() {
            return Cow::Borrowed(events);
        }
        Cow::Owned(
            events
                .iter()
                .filter(|e| self.matches(e))
                .cloned()
                .collect(),
        )
    }
}

fn allows(selected: &HashSet<String>, value: &str) -> bool {
    selected.is_empty() || selected.contains(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    fn set(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn events() -> Vec<EventRef> {
        vec![
            Arc::new(
                Event::new(1, "t", "dev", "START")
                    .with_phase("implementation")
                    .with_work_seq("ws-1")
                    .with_requirements(["REQ-001 through REQ-003"]),
            ),
            Arc::new(
                Event::new(2, "t", "qa", "TEST_FAIL")
                    .with_phase("testing")
                    .with_work_seq("ws-1")
                    .with_files_modified(["src/lib.rs"]),
            ),
            Arc::new(
                Event::new(3, "t", "dev", "COMPLETE")
                    .with_phase("implementation")
                    .with_work_seq("ws-2")
                    .with_files_created(["src/lib.rs"]),
            ),
        ]
    }

    fn seqs(events: &[EventRef]) -> Vec<i64> {
        events.iter().map(|e| e.log_seq).collect()
    }

    #[test]
    fn inactive_filter_borrows_input() {
        let events = events();
        let filter = EventFilter::default();
        assert!(!filter.is_active());
        assert!(matches!(filter.apply(&events), Cow::Borrowed(_)));
    }

    #[test]
    fn or_within_dimension() {
        let filter = EventFilter {
            agents: set(&["dev", "qa"]),
            ..Default::default()
        };
        assert!(filter.is_active());
        assert_eq!(seqs(&filter.apply(&events())), vec![1, 2, 3]);
    }

    #[test]
    fn and_across_dimensions() {
        let filter = EventFilter {
            agents: set(&["dev"]),
            work_seqs: set(&["ws-2"]),
            ..Default::default()
        };
        assert_eq!(seqs(&filter.apply(&events())), vec![3]);
    }

    #[test]
    fn action_and_phase_dimensions() {
        let filter = EventFilter {
            actions: set(&["START", "TEST_FAIL"]),
            phases: set(&["testing"]),
            ..Default::default()
        };
        assert_eq!(seqs(&filter.apply(&events())), vec![2]);
    }

    #[test]
    fn file_matches_created_or_modified() {
        let filter = EventFilter {
            file: Some("src/lib.rs".to_string()),
            ..Default::default()
        };
        assert_eq!(seqs(&filter.apply(&events())), vec![2, 3]);
    }

    #[test]
    fn requirement_matches_expanded_ranges() {
        let filter = EventFilter {
            requirement: Some("REQ-002".to_string()),
            ..Default::default()
        };
        assert_eq!(seqs(&filter.apply(&events())), vec![1]);

        let none = EventFilter {
            requirement: Some("REQ-004".to_string()),
            ..Default::default()
        };
        assert!(none.apply(&events()).is_empty());
    }
}
