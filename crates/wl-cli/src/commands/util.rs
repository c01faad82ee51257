//! Shared utilities for CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use wl_core::{ContentSource, FileSource, LogStore};

use crate::Config;

/// Picks the explicit path, else `log_path` from config.
pub fn resolve_log_path(path: Option<&Path>, config: &Config) -> Result<PathBuf> {
    path.map(Path::to_path_buf)
        .or_else(|| config.log_path.clone())
        .context("no log file given; pass a path or set log_path in config")
}

/// Reads and indexes a whole log file.
pub fn load_store(path: &Path) -> Result<LogStore> {
    let content = FileSource::new(path)
        .acquire_initial()
        .with_context(|| format!("failed to load {}", path.display()))?;
    let (store, report) = LogStore::load(&content);
    tracing::debug!(
        path = %path.display(),
        events = report.new_events,
        skipped = report.skipped,
        elapsed_ms = report.elapsed.as_millis(),
        "loaded log"
    );
    Ok(store)
}

/// Formats milliseconds as "Xh Ym", "Xm Ys" or "Xs".
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0s".to_string();
    }
    let total_seconds = ms / 1_000;
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else if minutes >= 1 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// A 10-character bar with one block per full 10%.
pub fn progress_bar(percentage: u8) -> String {
    let filled = usize::from(percentage.min(100) / 10);
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

/// Empty strings render as "-".
pub fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}
