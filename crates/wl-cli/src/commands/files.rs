//! Files command: per-file activity and churn.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use wl_core::{DirectoryStats, FileStats};

use super::util::{load_store, resolve_log_path};
use crate::Config;
use crate::cli::LogArgs;

#[derive(Debug, Serialize)]
struct FilesOutput<'a> {
    files: &'a BTreeMap<String, FileStats>,
    directories: BTreeMap<String, DirectoryStats>,
}

pub fn run<W: Write>(writer: &mut W, args: &LogArgs, config: &Config) -> Result<()> {
    let path = resolve_log_path(args.path.as_deref(), config)?;
    let store = load_store(&path)?;
    let indices = store.indices();

    let output = FilesOutput {
        files: indices.files(),
        directories: indices.directory_totals(),
    };

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    if output.files.is_empty() {
        writeln!(writer, "No file activity.")?;
        return Ok(());
    }

    for (file, stats) in output.files {
        let agents: Vec<&str> = stats.agents.iter().map(String::as_str).collect();
        let churn = if stats.is_churn { "  churn" } else { "" };
        writeln!(
            writer,
            "{file}  created {}, modified {}  [{}]{churn}",
            stats.create_count,
            stats.modify_count,
            agents.join(", ")
        )?;
    }

    writeln!(writer, "Directories:")?;
    for (dir, totals) in &output.directories {
        writeln!(
            writer,
            "  {dir}  {} files, {} changes, {} churn",
            totals.files, totals.total_count, totals.churn_files
        )?;
    }

    Ok(())
}
