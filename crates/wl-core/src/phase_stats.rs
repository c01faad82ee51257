//! Per-phase completion statistics.
//!
//! Counts are taken over work units rather than raw events. A work unit is
//! every event of one agent sharing a `task_id`; events without a `task_id`
//! are units of their own. Only units that contain a START are counted, and
//! the unit's latest event by `log_seq` decides whether it completed, failed,
//! or is still in progress.

use std::collections::HashMap;

use serde::Serialize;

use crate::action::{ActionRole, Outcome};
use crate::event::Event;
use crate::index::EventRef;
use crate::phase::compare_phases;

/// Completion statistics for one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseStats {
    pub name: String,
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub failures: usize,
    /// Rounded share of completed units, never above 100.
    pub percentage: u8,
}

impl PhaseStats {
    fn from_units<'a, 'b: 'a>(
        name: &str,
        units: impl Iterator<Item = &'a [&'b EventRef]>,
    ) -> Self {
        let (mut total, mut completed, mut failures) = (0usize, 0usize, 0usize);

        for unit in units {
            if !unit.iter().any(|e| e.role() == ActionRole::Start) {
                continue;
            }
            total += 1;
            let latest = unit.iter().max_by_key(|e| e.log_seq);
            match latest.and_then(|e| e.outcome()) {
                Some(Outcome::Success) => completed += 1,
                Some(Outcome::Failure) => failures += 1,
                None => {}
            }
        }

        Self {
            name: name.to_string(),
            total,
            completed,
            in_progress: total.saturating_sub(completed + failures),
            failures,
            percentage: percentage(completed, total),
        }
    }
}

/// `round(completed / total * 100)`, clamped to 100; 0 when `total` is 0.
fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // Round half up in integer arithmetic: floor((200c + t) / 2t).
    let rounded = (completed.saturating_mul(200) + total) / (total * 2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

fn work_unit_key(event: &Event) -> String {
    match &event.task_id {
        Some(task_id) => format!("{}|{task_id}", event.agent),
        None => format!("{}|{}", event.agent, event.log_seq),
    }
}

/// Computes statistics for every non-empty phase in `events`, in canonical order.
pub fn compute_phase_stats(events: &[EventRef]) -> Vec<PhaseStats> {
    let mut phases: HashMap<&str, HashMap<String, Vec<&EventRef>>> = HashMap::new();
    for event in events.iter().filter(|e| !e.phase.is_empty()) {
        phases
            .entry(event.phase.as_str())
            .or_default()
            .entry(work_unit_key(event))
            .or_default()
            .push(event);
    }

    let mut names: Vec<&str> = phases.keys().copied().collect();
    names.sort_by(|a, b| compare_phases(a, b));

    names
        .into_iter()
        .map(|name| {
            let units = phases[name].values().map(Vec::as_slice);
            PhaseStats::from_units(name, units)
        })
        .collect()
}

/// Runs [`compute_phase_stats`] separately for each work sequence, in
/// first-appearance order.
pub fn compute_phase_stats_by_work_seq(events: &[EventRef]) -> Vec<(String, Vec<PhaseStats>)> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<EventRef>> = HashMap::new();
    for event in events {
        let key = event.work_seq.as_str();
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(EventRef::clone(event));
    }

    order
        .into_iter()
        .map(|key| {
            let stats = groups.get(key).map_or_else(Vec::new, |g| compute_phase_stats(g));
            (key.to_string(), stats)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use proptest::prelude::*;

    fn ev(seq: i64, agent: &str, action: &str, phase: &str) -> Event {
        Event::new(seq, "2025-01-15T09:00:00Z", agent, action).with_phase(phase)
    }

    fn refs(events: Vec<Event>) -> Vec<EventRef> {
        events.into_iter().map(Arc::new).collect()
    }

    #[test]
    fn work_units_drive_counts() {
        let events = refs(vec![
            ev(1, "dev", "START", "implementation").with_task("T1"),
            ev(2, "dev", "COMPLETE", "implementation").with_task("T1"),
            ev(3, "dev", "START", "implementation").with_task("T2"),
            ev(4, "dev", "START", "implementation").with_task("T3"),
            ev(5, "dev", "ERROR", "implementation").with_task("T3"),
        ]);
        let stats = compute_phase_stats(&events);

        assert_eq!(
            stats,
            vec![PhaseStats {
                name: "implementation".to_string(),
                total: 3,
                completed: 1,
                in_progress: 1,
                failures: 1,
                percentage: 33,
            }]
        );
    }

    #[test]
    fn latest_event_by_log_seq_decides() {
        // Input order differs from log_seq order; the failure at seq 3 is latest.
        let events = refs(vec![
            ev(3, "qa", "TEST_FAIL", "testing").with_task("T"),
            ev(1, "qa", "START", "testing").with_task("T"),
            ev(2, "qa", "TEST_PASS", "testing").with_task("T"),
        ]);
        let stats = compute_phase_stats(&events);
        assert_eq!((stats[0].completed, stats[0].failures), (0, 1));
    }

    #[test]
    fn units_without_start_are_excluded() {
        let events = refs(vec![
            ev(1, "dev", "COMPLETE", "design").with_task("T1"),
            ev(2, "dev", "START", "design"),
            ev(3, "dev", "COMPLETE", "design"),
        ]);
        let stats = compute_phase_stats(&events);

        // Without task ids the START and COMPLETE are separate units.
        assert_eq!(stats[0].total, 1);
        assert_eq!(stats[0].completed, 0);
        assert_eq!(stats[0].in_progress, 1);
        assert_eq!(stats[0].percentage, 0);
    }

    #[test]
    fn units_are_per_agent() {
        let events = refs(vec![
            ev(1, "dev", "START", "review").with_task("T1"),
            ev(2, "reviewer", "REVIEW_PASS", "review").with_task("T1"),
        ]);
        let stats = compute_phase_stats(&events);
        assert_eq!((stats[0].total, stats[0].completed), (1, 0));
    }

    #[test]
    fn empty_phase_is_excluded_and_order_is_canonical() {
        let events = refs(vec![
            ev(1, "a", "START", "testing"),
            ev(2, "a", "START", ""),
            ev(3, "a", "START", "custom"),
            ev(4, "a", "START", "requirements"),
        ]);
        let names: Vec<String> = compute_phase_stats(&events)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["requirements", "testing", "custom"]);
    }

    #[test]
    fn percentage_rounds_half_up_and_caps() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(5, 3), 100);
    }

    #[test]
    fn phase_with_no_started_units_reports_zero() {
        let events = refs(vec![ev(1, "a", "DECISION", "planning")]);
        let stats = compute_phase_stats(&events);
        assert_eq!(stats[0].total, 0);
        assert_eq!(stats[0].percentage, 0);
    }

    #[test]
    fn by_work_seq_is_independent_per_group() {
        let events = refs(vec![
            ev(1, "dev", "START", "design").with_task("T1").with_work_seq("ws-1"),
            ev(2, "dev", "COMPLETE", "design").with_task("T1").with_work_seq("ws-1"),
            ev(3, "dev", "START", "design").with_task("T1").with_work_seq("ws-2"),
        ]);
        let grouped = compute_phase_stats_by_work_seq(&events);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "ws-1");
        assert_eq!(grouped[0].1[0].completed, 1);
        assert_eq!(grouped[1].0, "ws-2");
        assert_eq!(grouped[1].1[0].in_progress, 1);
    }

    fn arb_events() -> impl Strategy<Value = Vec<EventRef>> {
        let one = (
            "[ab]",
            prop::sample::select(vec!["START", "COMPLETE", "ERROR", "REVIEW_PASS", "DECISION"]),
            prop::option::of("T[123]"),
            prop::sample::select(vec!["", "design", "testing", "other"]),
        );
        prop::collection::vec(one, 0..40).prop_map(|rows| {
            rows.into_iter()
                .zip(0i64..)
                .map(|((agent, action, task, phase), seq)| {
                    let mut event = ev(seq, &agent, action, phase);
                    event.task_id = task;
                    Arc::new(event)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_counts_balance_and_percentage_is_bounded(events in arb_events()) {
            for stats in compute_phase_stats(&events) {
                prop_assert!(stats.percentage <= 100);
                prop_assert_eq!(stats.completed + stats.failures + stats.in_progress, stats.total);
            }
        }
    }
}
