//! Core ingestion and derivation logic for the workflow log analyzer.
//!
//! This crate contains the fundamental types and logic for:
//! - Parsing: turning line-delimited JSON into events, tolerating bad lines
//! - Indexing: building and incrementally extending lookup structures
//! - Pairing: reconstructing START/terminal intervals for the timeline
//! - Phase statistics: work-unit based completion per phase
//! - Filtering, requirements coverage, and tail polling

pub mod action;
pub mod coverage;
pub mod event;
pub mod filter;
pub mod index;
pub mod pairing;
pub mod parser;
pub mod phase;
pub mod phase_stats;
pub mod poll;
pub mod requirements;
pub mod store;

pub use action::{Action, ActionRole, Outcome};
pub use coverage::{RequirementCoverage, requirement_coverage};
pub use event::Event;
pub use filter::EventFilter;
pub use index::{
    DirectoryStats, EventRef, FileStats, FilterOptions, Grouped, Indices, RequirementTrace,
    TimestampRange, timestamp_range,
};
pub use pairing::{DurationBar, MarkerEvent, OrphanStart, PairingResult, pair_events};
pub use parser::{ParseResult, parse, parse_incremental};
pub use phase::{CANONICAL_PHASES, compare_phases, sort_phases};
pub use phase_stats::{PhaseStats, compute_phase_stats, compute_phase_stats_by_work_seq};
pub use poll::{AcquireError, ContentSource, FileSource, PollState, Poller, TickOutcome};
pub use requirements::expand_requirement;
pub use store::{LoadReport, LogStore};
