//! Watch command: poll a growing log and report what each tick brings.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::time::MissedTickBehavior;

use wl_core::{AcquireError, LogStore, PollState, Poller, TickOutcome};

use super::util::{load_store, resolve_log_path};
use crate::Config;

#[derive(Debug, Clone, Default, Args)]
pub struct WatchArgs {
    /// Activity log to follow. Falls back to `log_path` from config.
    pub path: Option<PathBuf>,

    /// Milliseconds between polls. Defaults to `poll_interval_ms` from config.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Stop after this many polls instead of running until interrupted.
    #[arg(long)]
    pub ticks: Option<u32>,
}

pub fn run<W: Write>(writer: &mut W, args: &WatchArgs, config: &Config) -> Result<()> {
    let path = resolve_log_path(args.path.as_deref(), config)?;
    let mut store = load_store(&path)?;
    writeln!(
        writer,
        "Watching {} ({} events, {} skipped)",
        path.display(),
        store.len(),
        store.skipped()
    )?;

    let interval_ms = args.interval_ms.unwrap_or(config.poll_interval_ms).max(1);
    let interval = Duration::from_millis(interval_ms);
    let mut poller = Poller::new(config.max_poll_failures);
    poller.start();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize tokio runtime")?;
    runtime.block_on(poll_loop(
        writer,
        &path,
        &mut poller,
        &mut store,
        interval,
        args.ticks,
    ))
}

/// Polls until `ticks` run out, polling is disabled, or Ctrl-C.
async fn poll_loop<W: Write>(
    writer: &mut W,
    path: &Path,
    poller: &mut Poller,
    store: &mut LogStore,
    interval: Duration,
    ticks: Option<u32>,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the initial load already happened.
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut remaining = ticks;
    while remaining != Some(0) {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                poller.stop();
                writeln!(writer, "Stopped.")?;
                return Ok(());
            }
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| AcquireError::Io {
                path: path.to_path_buf(),
                source,
            });
        let outcome = poller.on_content(content, store);
        report(writer, outcome, store)?;

        if poller.state() == PollState::Disabled {
            break;
        }
        if let Some(n) = remaining.as_mut() {
            *n -= 1;
        }
    }
    Ok(())
}

fn report<W: Write>(writer: &mut W, outcome: TickOutcome, store: &LogStore) -> Result<()> {
    match outcome {
        TickOutcome::Appended {
            new_events,
            skipped,
        } => writeln!(
            writer,
            "+{new_events} events ({skipped} skipped), {} total",
            store.len()
        )?,
        TickOutcome::Failed { consecutive } => {
            writeln!(writer, "read failed ({consecutive} in a row)")?;
        }
        TickOutcome::Disabled { consecutive } => writeln!(
            writer,
            "polling disabled after {consecutive} consecutive failures"
        )?,
        TickOutcome::Unchanged | TickOutcome::Inactive => {}
    }
    Ok(())
}
