//! Summary command: counts, time range and the values available for filtering.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use wl_core::{FilterOptions, LogStore, TimestampRange};

use super::util::{load_store, resolve_log_path};
use crate::Config;
use crate::cli::LogArgs;

#[derive(Debug, Serialize)]
struct SummaryOutput {
    events: usize,
    skipped: usize,
    time_range: Option<TimestampRange>,
    #[serde(flatten)]
    options: FilterOptions,
    files: usize,
    churn_files: usize,
    requirements: usize,
}

impl SummaryOutput {
    fn from_store(store: &LogStore) -> Self {
        let indices = store.indices();
        Self {
            events: store.len(),
            skipped: store.skipped(),
            time_range: store.timestamp_range(),
            options: indices.filter_options(),
            files: indices.files().len(),
            churn_files: indices.churn_files().count(),
            requirements: indices.requirements().len(),
        }
    }
}

pub fn run<W: Write>(writer: &mut W, args: &LogArgs, config: &Config) -> Result<()> {
    let path = resolve_log_path(args.path.as_deref(), config)?;
    let store = load_store(&path)?;
    let summary = SummaryOutput::from_store(&store);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
        return Ok(());
    }

    writeln!(writer, "Events: {} ({} skipped)", summary.events, summary.skipped)?;
    match &summary.time_range {
        Some(range) => writeln!(writer, "Time range: {} .. {}", range.min, range.max)?,
        None => writeln!(writer, "Time range: -")?,
    }
    writeln!(writer, "Agents: {}", join_or_dash(&summary.options.agents))?;
    writeln!(writer, "Phases: {}", join_or_dash(&summary.options.phases))?;
    writeln!(
        writer,
        "Work sequences: {}",
        join_or_dash(&summary.options.work_seqs)
    )?;
    writeln!(
        writer,
        "Files: {} ({} churn)",
        summary.files, summary.churn_files
    )?;
    writeln!(writer, "Requirements: {}", summary.requirements)?;
    Ok(())
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
