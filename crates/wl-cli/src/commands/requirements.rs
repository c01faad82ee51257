//! Requirements command: coverage of each expanded requirement id.

use std::io::Write;

use anyhow::Result;

use wl_core::requirement_coverage;

use super::util::{load_store, resolve_log_path};
use crate::Config;
use crate::cli::LogArgs;

pub fn run<W: Write>(writer: &mut W, args: &LogArgs, config: &Config) -> Result<()> {
    let path = resolve_log_path(args.path.as_deref(), config)?;
    let store = load_store(&path)?;
    let rows = requirement_coverage(store.indices());

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }

    if rows.is_empty() {
        writeln!(writer, "No requirements referenced.")?;
        return Ok(());
    }

    for row in &rows {
        let phases = if row.phases.is_empty() {
            "-".to_string()
        } else {
            row.phases.join(", ")
        };
        let agents: Vec<&str> = row.agents.iter().map(String::as_str).collect();
        let latest = row
            .latest_action
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        writeln!(
            writer,
            "{}  {} traces  phases: {phases}  agents: {}  latest {latest}",
            row.id,
            row.trace_count,
            agents.join(", ")
        )?;
    }
    Ok(())
}
