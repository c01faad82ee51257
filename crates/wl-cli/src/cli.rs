//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use wl_core::EventFilter;

use crate::commands::phases::PhasesArgs;
use crate::commands::watch::WatchArgs;

/// Workflow log analyzer.
///
/// Reads a multi-agent activity log (one JSON event per line) and derives
/// timelines, phase completion, file churn, and requirements coverage.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show event counts, time range, and the agents, phases and work sequences seen.
    Summary(LogArgs),

    /// Show completion statistics per phase.
    Phases(PhasesArgs),

    /// Show paired work intervals, orphaned starts, and markers.
    Timeline(TimelineArgs),

    /// Show per-file create/modify counts and churn.
    Files(LogArgs),

    /// Show which phases touched each requirement.
    Requirements(LogArgs),

    /// Follow a growing log and report new events.
    Watch(WatchArgs),
}

/// Log selection and output format shared by every read command.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Activity log to read. Falls back to `log_path` from config.
    pub path: Option<PathBuf>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Narrows the events fed to the timeline and phase views.
///
/// Repeating a flag selects any of the values; different flags must all match.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only events from this agent.
    #[arg(long = "agent", value_name = "AGENT")]
    pub agents: Vec<String>,

    /// Only events with this action (e.g. START, COMPLETE).
    #[arg(long = "action", value_name = "ACTION")]
    pub actions: Vec<String>,

    /// Only events in this phase.
    #[arg(long = "phase", value_name = "PHASE")]
    pub phases: Vec<String>,

    /// Only events in this work sequence.
    #[arg(long = "work-seq", value_name = "WORK_SEQ")]
    pub work_seqs: Vec<String>,

    /// Only events that created or modified this file.
    #[arg(long)]
    pub file: Option<String>,

    /// Only events referencing this requirement id.
    #[arg(long)]
    pub requirement: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> EventFilter {
        EventFilter {
            agents: self.agents.iter().cloned().collect(),
            actions: self.actions.iter().cloned().collect(),
            phases: self.phases.iter().cloned().collect(),
            work_seqs: self.work_seqs.iter().cloned().collect(),
            file: self.file.clone(),
            requirement: self.requirement.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct TimelineArgs {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(flatten)]
    pub filter: FilterArgs,
}
