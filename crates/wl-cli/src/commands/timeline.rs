//! Timeline command: paired intervals, orphaned starts and markers.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use wl_core::{Action, Outcome, PairingResult, pair_events};

use super::util::{format_duration, load_store, or_dash, resolve_log_path};
use crate::Config;
use crate::cli::TimelineArgs;

#[derive(Debug, Serialize)]
struct BarOutput<'a> {
    start_log_seq: i64,
    end_log_seq: i64,
    agent: &'a str,
    phase: &'a str,
    work_seq: &'a str,
    outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
struct OrphanOutput<'a> {
    log_seq: i64,
    agent: &'a str,
    phase: &'a str,
    timestamp: &'a str,
}

#[derive(Debug, Serialize)]
struct MarkerOutput<'a> {
    log_seq: i64,
    action: &'a Action,
    agent: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_start_log_seq: Option<i64>,
}

#[derive(Debug, Serialize)]
struct TimelineOutput<'a> {
    bars: Vec<BarOutput<'a>>,
    orphans: Vec<OrphanOutput<'a>>,
    markers: Vec<MarkerOutput<'a>>,
}

impl<'a> TimelineOutput<'a> {
    fn from_pairing(pairing: &'a PairingResult) -> Self {
        Self {
            bars: pairing
                .bars
                .iter()
                .map(|bar| BarOutput {
                    start_log_seq: bar.start.log_seq,
                    end_log_seq: bar.end.log_seq,
                    agent: &bar.start.agent,
                    phase: &bar.start.phase,
                    work_seq: &bar.start.work_seq,
                    outcome: bar.outcome,
                    duration_ms: bar.duration_ms(),
                })
                .collect(),
            orphans: pairing
                .orphans
                .iter()
                .map(|orphan| OrphanOutput {
                    log_seq: orphan.event.log_seq,
                    agent: &orphan.event.agent,
                    phase: &orphan.event.phase,
                    timestamp: &orphan.event.timestamp,
                })
                .collect(),
            markers: pairing
                .markers
                .iter()
                .map(|marker| MarkerOutput {
                    log_seq: marker.event.log_seq,
                    action: &marker.event.action,
                    agent: &marker.event.agent,
                    parent_start_log_seq: pairing.parent_bar(marker).map(|bar| bar.start.log_seq),
                })
                .collect(),
        }
    }
}

pub fn run<W: Write>(writer: &mut W, args: &TimelineArgs, config: &Config) -> Result<()> {
    let path = resolve_log_path(args.log.path.as_deref(), config)?;
    let store = load_store(&path)?;
    let filter = args.filter.to_filter();
    let events = filter.apply(store.events());
    let pairing = pair_events(&events);

    if args.log.json {
        let output = TimelineOutput::from_pairing(&pairing);
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    if pairing.bars.is_empty() && pairing.orphans.is_empty() && pairing.markers.is_empty() {
        writeln!(writer, "No activity.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "Bars: {}, orphans: {}, markers: {}",
        pairing.bars.len(),
        pairing.orphans.len(),
        pairing.markers.len()
    )?;

    for (work_seq, bars) in pairing.bars_by_work_seq() {
        let label = if work_seq.is_empty() { "(none)" } else { work_seq };
        writeln!(writer, "[{label}]")?;
        for bar in bars {
            let duration = bar
                .duration_ms()
                .map_or_else(|| "?".to_string(), format_duration);
            writeln!(
                writer,
                "  #{} -> #{}  {}  {}  {}  {duration}",
                bar.start.log_seq,
                bar.end.log_seq,
                bar.start.agent,
                or_dash(&bar.start.phase),
                bar.outcome
            )?;
        }
    }

    if !pairing.orphans.is_empty() {
        writeln!(writer, "Orphans:")?;
        for orphan in &pairing.orphans {
            let event = &orphan.event;
            writeln!(
                writer,
                "  #{}  {}  {}  started {}",
                event.log_seq,
                event.agent,
                or_dash(&event.phase),
                event.timestamp
            )?;
        }
    }

    if !pairing.markers.is_empty() {
        writeln!(writer, "Markers:")?;
        for marker in &pairing.markers {
            let event = &marker.event;
            let parent = pairing.parent_bar(marker).map_or_else(
                || "unattributed".to_string(),
                |bar| format!("in #{}", bar.start.log_seq),
            );
            writeln!(
                writer,
                "  #{}  {}  {}  {parent}",
                event.log_seq, event.action, event.agent
            )?;
        }
    }

    Ok(())
}
