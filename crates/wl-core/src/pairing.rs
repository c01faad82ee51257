//! START/terminal pairing.
//!
//! Rebuilds work intervals from the flat event stream. Each START claims the
//! first unconsumed terminal of the same agent that matches it:
//!
//! 1. same `task_id` (only when the START has one), later `log_seq`;
//! 2. otherwise same `phase` and same `parent_log_seq`, later `log_seq`.
//!
//! A claimed terminal is never reused. STARTs that claim nothing are orphans.
//! Markers are attached to the first bar of their agent whose timestamp span
//! contains them.

use std::collections::HashMap;

use chrono::DateTime;
use serde::Serialize;

use crate::action::{ActionRole, Outcome};
use crate::event::Event;
use crate::index::EventRef;

/// A matched START and terminal pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationBar {
    pub start: EventRef,
    pub end: EventRef,
    pub outcome: Outcome,
}

impl DurationBar {
    /// Milliseconds between the two timestamps, if both are RFC 3339.
    pub fn duration_ms(&self) -> Option<i64> {
        let start = DateTime::parse_from_rfc3339(&self.start.timestamp).ok()?;
        let end = DateTime::parse_from_rfc3339(&self.end.timestamp).ok()?;
        Some((end - start).num_milliseconds())
    }

    /// Inclusive timestamp containment, by string comparison.
    pub fn contains(&self, timestamp: &str) -> bool {
        self.start.timestamp.as_str() <= timestamp && timestamp <= self.end.timestamp.as_str()
    }
}

/// A START with no matching terminal in the current view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrphanStart {
    pub event: EventRef,
}

/// A marker event and the bar it happened inside, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerEvent {
    pub event: EventRef,
    /// Position of the containing bar in [`PairingResult::bars`].
    pub parent_bar: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PairingResult {
    /// Bars in START order.
    pub bars: Vec<DurationBar>,
    pub orphans: Vec<OrphanStart>,
    /// Markers in input order.
    pub markers: Vec<MarkerEvent>,
}

impl PairingResult {
    pub fn parent_bar(&self, marker: &MarkerEvent) -> Option<&DurationBar> {
        marker.parent_bar.and_then(|idx| self.bars.get(idx))
    }

    /// Bars grouped by the START's work sequence, in first-appearance order.
    pub fn bars_by_work_seq(&self) -> Vec<(&str, Vec<&DurationBar>)> {
        let mut groups: Vec<(&str, Vec<&DurationBar>)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for bar in &self.bars {
            let key = bar.start.work_seq.as_str();
            let idx = *positions.entry(key).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[idx].1.push(bar);
        }
        groups
    }
}

/// One agent's terminals in arrival order.
#[derive(Default)]
struct TerminalPool<'a> {
    terminals: Vec<(&'a EventRef, Outcome)>,
    consumed: Vec<bool>,
}

impl<'a> TerminalPool<'a> {
    fn push(&mut self, event: &'a EventRef, outcome: Outcome) {
        self.terminals.push((event, outcome));
        self.consumed.push(false);
    }

    /// Consumes and returns the first unconsumed terminal satisfying `pred`.
    fn claim(&mut self, pred: impl Fn(&Event) -> bool) -> Option<(&'a EventRef, Outcome)> {
        let idx = (0..self.terminals.len())
            .find(|&i| !self.consumed[i] && pred(self.terminals[i].0.as_ref()))?;
        self.consumed[idx] = true;
        Some(self.terminals[idx])
    }
}

/// Partitions `events` into bars, orphan starts and markers.
///
/// Events with unknown actions are dropped.
pub fn pair_events(events: &[EventRef]) -> PairingResult {
    let mut starts: Vec<&EventRef> = Vec::new();
    let mut marker_events: Vec<&EventRef> = Vec::new();
    let mut pools: HashMap<&str, TerminalPool<'_>> = HashMap::new();

    for event in events {
        match event.role() {
            ActionRole::Start => starts.push(event),
            ActionRole::Terminal(outcome) => pools
                .entry(event.agent.as_str())
                .or_default()
                .push(event, outcome),
            ActionRole::Marker => marker_events.push(event),
            ActionRole::Inert => {}
        }
    }

    let mut result = PairingResult::default();

    for start in starts {
        let matched = pools
            .get_mut(start.agent.as_str())
            .and_then(|pool| match_terminal(pool, start));

        match matched {
            Some((end, outcome)) => result.bars.push(DurationBar {
                start: EventRef::clone(start),
                end: EventRef::clone(end),
                outcome,
            }),
            None => result.orphans.push(OrphanStart {
                event: EventRef::clone(start),
            }),
        }
    }

    result.markers = marker_events
        .into_iter()
        .map(|marker| MarkerEvent {
            event: EventRef::clone(marker),
            parent_bar: result
                .bars
                .iter()
                .position(|bar| bar.start.agent == marker.agent && bar.contains(&marker.timestamp)),
        })
        .collect();

    result
}

fn match_terminal<'a>(
    pool: &mut TerminalPool<'a>,
    start: &Event,
) -> Option<(&'a EventRef, Outcome)> {
    if let Some(task_id) = &start.task_id {
        let by_task = pool.claim(|t| {
            t.task_id.as_ref() == Some(task_id) && t.log_seq > start.log_seq
        });
        if by_task.is_some() {
            return by_task;
        }
    }

    pool.claim(|t| {
        t.phase == start.phase
            && t.parent_log_seq == start.parent_log_seq
            && t.log_seq > start.log_seq
    })
}
