//! Phases command: work-unit completion per phase.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use wl_core::{PhaseStats, compute_phase_stats, compute_phase_stats_by_work_seq};

use super::util::{load_store, progress_bar, resolve_log_path};
use crate::Config;
use crate::cli::{FilterArgs, LogArgs};

#[derive(Debug, Clone, Default, Args)]
pub struct PhasesArgs {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Break the statistics down per work sequence.
    #[arg(long)]
    pub by_work_seq: bool,
}

#[derive(Debug, Serialize)]
struct WorkSeqPhases {
    work_seq: String,
    phases: Vec<PhaseStats>,
}

pub fn run<W: Write>(writer: &mut W, args: &PhasesArgs, config: &Config) -> Result<()> {
    let path = resolve_log_path(args.log.path.as_deref(), config)?;
    let store = load_store(&path)?;
    let filter = args.filter.to_filter();
    let events = filter.apply(store.events());

    if args.by_work_seq {
        let groups: Vec<WorkSeqPhases> = compute_phase_stats_by_work_seq(&events)
            .into_iter()
            .map(|(work_seq, phases)| WorkSeqPhases { work_seq, phases })
            .collect();

        if args.log.json {
            writeln!(writer, "{}", serde_json::to_string_pretty(&groups)?)?;
            return Ok(());
        }
        if groups.iter().all(|g| g.phases.is_empty()) {
            writeln!(writer, "No phase activity.")?;
            return Ok(());
        }
        for group in groups.iter().filter(|g| !g.phases.is_empty()) {
            let label = if group.work_seq.is_empty() {
                "(none)"
            } else {
                group.work_seq.as_str()
            };
            writeln!(writer, "[{label}]")?;
            for stats in &group.phases {
                writeln!(writer, "  {}", format_row(stats))?;
            }
        }
        return Ok(());
    }

    let stats = compute_phase_stats(&events);
    if args.log.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&stats)?)?;
        return Ok(());
    }
    if stats.is_empty() {
        writeln!(writer, "No phase activity.")?;
        return Ok(());
    }
    for row in &stats {
        writeln!(writer, "{}", format_row(row))?;
    }
    Ok(())
}

fn format_row(stats: &PhaseStats) -> String {
    format!(
        "{:<16}{} {:>3}%  done {}/{}, active {}, failed {}",
        stats.name,
        progress_bar(stats.percentage),
        stats.percentage,
        stats.completed,
        stats.total,
        stats.in_progress,
        stats.failures
    )
}
