//! Derived lookup structures over the event log.
//!
//! [`Indices`] holds six views that are kept consistent with every event seen
//! so far:
//!
//! - entry-by-id (`log_seq → event`)
//! - agent, phase and work-sequence groupings (insertion ordered)
//! - per-file create/modify statistics
//! - requirement traces, with range shorthand expanded
//! - parent → children links
//!
//! [`Indices::extend`] applies the same per-event step as [`Indices::build`],
//! so building from `A ++ B` and building from `A` then extending with `B`
//! produce equal indices.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::action::Action;
use crate::event::Event;
use crate::phase::sort_phases;

/// Shared handle to a parsed event.
pub type EventRef = Arc<Event>;

/// Directory recorded for paths without a `/`.
pub const ROOT_DIRECTORY: &str = "(root)";

/// Events grouped by a string key, preserving first-seen key order and
/// arrival order within each group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouped {
    keys: Vec<String>,
    groups: HashMap<String, Vec<EventRef>>,
}

impl Grouped {
    fn push(&mut self, key: &str, event: &EventRef) {
        if let Some(group) = self.groups.get_mut(key) {
            group.push(Arc::clone(event));
        } else {
            self.keys.push(key.to_string());
            self.groups.insert(key.to_string(), vec![Arc::clone(event)]);
        }
    }

    /// Events under `key`, or an empty slice.
    pub fn get(&self, key: &str) -> &[EventRef] {
        self.groups.get(key).map_or(&[][..], Vec::as_slice)
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

/// Create/modify counts for one file path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    /// Everything before the last `/`, or [`ROOT_DIRECTORY`].
    pub directory: String,
    pub create_count: usize,
    pub modify_count: usize,
    pub total_count: usize,
    pub agents: BTreeSet<String>,
    /// Set once the file has been both created and modified.
    pub is_churn: bool,
}

impl FileStats {
    fn for_path(path: &str) -> Self {
        Self {
            directory: directory_of(path),
            ..Self::default()
        }
    }

    fn record(&mut self, agent: &str, created: bool) {
        if created {
            self.create_count += 1;
        } else {
            self.modify_count += 1;
        }
        self.total_count += 1;
        if !self.agents.contains(agent) {
            self.agents.insert(agent.to_string());
        }
        self.is_churn = self.create_count > 0 && self.modify_count > 0;
    }
}

/// Aggregated file counts for one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryStats {
    pub files: usize,
    pub total_count: usize,
    pub churn_files: usize,
}

/// One event's reference to a requirement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementTrace {
    pub event: EventRef,
    pub phase: String,
    pub action: Action,
}

/// Values available as filter choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub agents: Vec<String>,
    /// Canonical phase order.
    pub phases: Vec<String>,
    /// Non-empty work sequences in first-seen order.
    pub work_seqs: Vec<String>,
}

/// The six derived views over the event log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Indices {
    by_id: HashMap<i64, EventRef>,
    by_agent: Grouped,
    by_phase: Grouped,
    by_work_seq: Grouped,
    files: BTreeMap<String, FileStats>,
    requirements: BTreeMap<String, Vec<RequirementTrace>>,
    children: HashMap<i64, Vec<i64>>,
}

impl Indices {
    /// Builds all indices from scratch, in input order.
    pub fn build(events: &[EventRef]) -> Self {
        let mut indices = Self::default();
        indices.extend(events);
        indices
    }

    /// Indexes `new_events` on top of what is already here. Never removes entries.
    pub fn extend(&mut self, new_events: &[EventRef]) {
        for event in new_events {
            self.index_event(event);
        }
    }

    fn index_event(&mut self, event: &EventRef) {
        self.by_id.insert(event.log_seq, Arc::clone(event));
        self.by_agent.push(&event.agent, event);
        if !event.phase.is_empty() {
            self.by_phase.push(&event.phase, event);
        }
        self.by_work_seq.push(&event.work_seq, event);

        for (path, created) in event
            .files_created
            .iter()
            .map(|p| (p, true))
            .chain(event.files_modified.iter().map(|p| (p, false)))
        {
            self.files
                .entry(path.clone())
                .or_insert_with(|| FileStats::for_path(path))
                .record(&event.agent, created);
        }

        for id in event.expanded_requirements() {
            self.requirements
                .entry(id)
                .or_default()
                .push(RequirementTrace {
                    event: Arc::clone(event),
                    phase: event.phase.clone(),
                    action: event.action.clone(),
                });
        }

        if let Some(parent) = event.parent_log_seq {
            self.children.entry(parent).or_default().push(event.log_seq);
        }
    }

    /// Number of distinct `log_seq` values indexed.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn event(&self, log_seq: i64) -> Option<&EventRef> {
        self.by_id.get(&log_seq)
    }

    /// The event `event` points back to, if it is indexed.
    pub fn parent_of(&self, event: &Event) -> Option<&EventRef> {
        event.parent_log_seq.and_then(|seq| self.by_id.get(&seq))
    }

    /// Child `log_seq`s in arrival order.
    pub fn children_of(&self, log_seq: i64) -> &[i64] {
        self.children.get(&log_seq).map_or(&[][..], Vec::as_slice)
    }

    pub const fn by_agent(&self) -> &Grouped {
        &self.by_agent
    }

    pub const fn by_phase(&self) -> &Grouped {
        &self.by_phase
    }

    pub const fn by_work_seq(&self) -> &Grouped {
        &self.by_work_seq
    }

    pub const fn files(&self) -> &BTreeMap<String, FileStats> {
        &self.files
    }

    pub const fn requirements(&self) -> &BTreeMap<String, Vec<RequirementTrace>> {
        &self.requirements
    }

    /// Files that have been both created and modified.
    pub fn churn_files(&self) -> impl Iterator<Item = (&str, &FileStats)> {
        self.files
            .iter()
            .filter(|(_, stats)| stats.is_churn)
            .map(|(path, stats)| (path.as_str(), stats))
    }

    /// Per-directory sums of the file statistics.
    pub fn directory_totals(&self) -> BTreeMap<String, DirectoryStats> {
        let mut totals: BTreeMap<String, DirectoryStats> = BTreeMap::new();
        for stats in self.files.values() {
            let dir = totals.entry(stats.directory.clone()).or_default();
            dir.files += 1;
            dir.total_count += stats.total_count;
            if stats.is_churn {
                dir.churn_files += 1;
            }
        }
        totals
    }

    pub fn filter_options(&self) -> FilterOptions {
        let mut phases: Vec<String> = self.by_phase.keys().map(String::from).collect();
        sort_phases(&mut phases);
        FilterOptions {
            agents: self.by_agent.keys().map(String::from).collect(),
            phases,
            work_seqs: self
                .by_work_seq
                .keys()
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

fn directory_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
        None => ROOT_DIRECTORY.to_string(),
    }
}

/// Earliest and latest timestamp of an event set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampRange {
    pub min: String,
    pub max: String,
}

/// Lexicographic min/max timestamp in one pass, or `None` for no events.
///
/// ISO-8601 strings in a consistent format compare chronologically.
pub fn timestamp_range(events: &[EventRef]) -> Option<TimestampRange> {
    let mut iter = events.iter();
    let first = iter.next()?;
    let (mut min, mut max) = (&first.timestamp, &first.timestamp);
    for event in iter {
        if event.timestamp < *min {
            min = &event.timestamp;
        }
        if event.timestamp > *max {
            max = &event.timestamp;
        }
    }
    Some(TimestampRange {
        min: min.clone(),
        max: max.clone(),
    })
}
