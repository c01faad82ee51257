//! The in-memory log: events plus their derived indices.

use std::sync::Arc;
use std::time::Duration;

use crate::index::{EventRef, Indices, TimestampRange, timestamp_range};
use crate::parser::{self, ParseResult};

/// Outcome of a load or append.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Events added by this operation.
    pub new_events: usize,
    /// Malformed lines seen by this operation.
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Events and indices for one loaded log.
///
/// [`LogStore::replace`] swaps everything for a fresh load; [`LogStore::append`]
/// only ever adds.
#[derive(Debug, Clone, Default)]
pub struct LogStore {
    events: Vec<EventRef>,
    indices: Indices,
    skipped: usize,
    watermark: Option<i64>,
}

impl LogStore {
    /// Parses `content` into a new store.
    pub fn load(content: &str) -> (Self, LoadReport) {
        let mut store = Self::default();
        let report = store.replace(content);
        (store, report)
    }

    /// Discards everything and loads `content` from scratch.
    pub fn replace(&mut self, content: &str) -> LoadReport {
        let parsed = parser::parse(content);
        let report = report_for(&parsed);
        let events: Vec<EventRef> = parsed.events.into_iter().map(Arc::new).collect();

        *self = Self {
            indices: Indices::build(&events),
            watermark: events.iter().map(|e| e.log_seq).max(),
            skipped: parsed.skipped,
            events,
        };

        tracing::debug!(
            events = report.new_events,
            skipped = report.skipped,
            elapsed_ms = report.elapsed.as_millis(),
            "loaded log"
        );
        report
    }

    /// Adds events from re-read `content` whose `log_seq` is past the watermark.
    pub fn append(&mut self, content: &str) -> LoadReport {
        let parsed = match self.watermark {
            Some(since) => parser::parse_incremental(content, since),
            None => parser::parse(content),
        };
        let report = report_for(&parsed);
        if parsed.events.is_empty() {
            return report;
        }

        let new_events: Vec<EventRef> = parsed.events.into_iter().map(Arc::new).collect();
        self.indices.extend(&new_events);
        if let Some(max) = new_events.iter().map(|e| e.log_seq).max() {
            self.watermark = Some(self.watermark.map_or(max, |w| w.max(max)));
        }
        self.events.extend(new_events);

        tracing::debug!(
            new_events = report.new_events,
            total = self.events.len(),
            watermark = ?self.watermark,
            "appended to log"
        );
        report
    }

    /// All events in arrival order.
    pub fn events(&self) -> &[EventRef] {
        &self.events
    }

    pub const fn indices(&self) -> &Indices {
        &self.indices
    }

    /// Malformed lines seen by the last full load.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Highest `log_seq` seen so far.
    pub const fn watermark(&self) -> Option<i64> {
        self.watermark
    }

    pub fn timestamp_range(&self) -> Option<TimestampRange> {
        timestamp_range(&self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn report_for(parsed: &ParseResult) -> LoadReport {
    LoadReport {
        new_events: parsed.events.len(),
        skipped: parsed.skipped,
        elapsed: parsed.elapsed,
    }
}
