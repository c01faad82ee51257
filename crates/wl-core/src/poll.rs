//! Tail polling of a growing log.
//!
//! [`Poller`] is a small state machine driven by an external clock: each tick
//! hands it one acquisition result. Success appends new events to the
//! [`LogStore`] and resets the failure count; `max_failures` consecutive
//! failures disable polling until [`Poller::restart`].
//!
//! ```text
//! Idle --start--> Active --failure #max--> Disabled --restart--> Active
//!                   |  ^
//!                   +--+ success / failure below max
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::store::{LoadReport, LogStore};

/// Default number of consecutive failures before polling is disabled.
pub const DEFAULT_MAX_FAILURES: u32 = 3;

/// Errors acquiring log content.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The source has no content to offer right now.
    #[error("log content unavailable: {0}")]
    Unavailable(String),
}

/// Something that can hand over the full current log text.
///
/// Both calls must be safe to repeat.
pub trait ContentSource {
    fn acquire_initial(&mut self) -> Result<String, AcquireError>;

    fn reacquire(&mut self) -> Result<String, AcquireError>;
}

/// Reads the log from a file on every call.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, AcquireError> {
        std::fs::read_to_string(&self.path).map_err(|source| AcquireError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl ContentSource for FileSource {
    fn acquire_initial(&mut self) -> Result<String, AcquireError> {
        self.read()
    }

    fn reacquire(&mut self) -> Result<String, AcquireError> {
        self.read()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Active,
    /// Stopped after too many consecutive failures.
    Disabled,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// New events were appended.
    Appended { new_events: usize, skipped: usize },
    /// Content was read but held nothing new.
    Unchanged,
    /// Acquisition failed; polling continues.
    Failed { consecutive: u32 },
    /// Acquisition failed and polling is now disabled. Reported once.
    Disabled { consecutive: u32 },
    /// The poller is not active; the tick was ignored.
    Inactive,
}

#[derive(Debug, Clone)]
pub struct Poller {
    state: PollState,
    consecutive_failures: u32,
    max_failures: u32,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FAILURES)
    }
}

impl Poller {
    /// Creates an idle poller. A `max_failures` of zero is treated as one.
    pub fn new(max_failures: u32) -> Self {
        Self {
            state: PollState::Idle,
            consecutive_failures: 0,
            max_failures: max_failures.max(1),
        }
    }

    pub const fn state(&self) -> PollState {
        self.state
    }

    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Idle → Active. Has no effect on a disabled poller.
    pub fn start(&mut self) {
        if self.state == PollState::Idle {
            self.consecutive_failures = 0;
            self.state = PollState::Active;
        }
    }

    /// Returns to Idle immediately. There is never a tick in flight to cancel.
    ///
    /// A disabled poller stays disabled; only [`Poller::restart`] leaves that state.
    pub fn stop(&mut self) {
        if self.state != PollState::Disabled {
            self.state = PollState::Idle;
        }
    }

    /// Explicit restart from any state, clearing the failure count.
    pub fn restart(&mut self) {
        if self.state == PollState::Disabled {
            tracing::info!("polling restarted");
        }
        self.consecutive_failures = 0;
        self.state = PollState::Active;
    }

    /// Applies one acquisition result to `store`.
    pub fn on_content(
        &mut self,
        content: Result<String, AcquireError>,
        store: &mut LogStore,
    ) -> TickOutcome {
        if self.state != PollState::Active {
            return TickOutcome::Inactive;
        }

        match content {
            Ok(text) => {
                self.consecutive_failures = 0;
                let LoadReport {
                    new_events,
                    skipped,
                    ..
                } = store.append(&text);
                if new_events == 0 {
                    TickOutcome::Unchanged
                } else {
                    TickOutcome::Appended {
                        new_events,
                        skipped,
                    }
                }
            }
            Err(error) => {
                self.consecutive_failures += 1;
                let consecutive = self.consecutive_failures;
                if consecutive >= self.max_failures {
                    self.state = PollState::Disabled;
                    tracing::warn!(%error, consecutive, "polling disabled after repeated failures");
                    TickOutcome::Disabled { consecutive }
                } else {
                    tracing::debug!(%error, consecutive, "poll failed");
                    TickOutcome::Failed { consecutive }
                }
            }
        }
    }

    /// One tick: reacquire from `source` and apply the result.
    pub fn tick<S: ContentSource>(&mut self, source: &mut S, store: &mut LogStore) -> TickOutcome {
        if self.state != PollState::Active {
            return TickOutcome::Inactive;
        }
        let content = source.reacquire();
        self.on_content(content, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::io::Write;

    /// Replays scripted acquisition results.
    struct Scripted {
        results: VecDeque<Result<String, AcquireError>>,
    }

    impl Scripted {
        fn new(results: Vec<Result<String, AcquireError>>) -> Self {
            Self {
                results: results.into(),
            }
        }
    }

    impl ContentSource for Scripted {
        fn acquire_initial(&mut self) -> Result<String, AcquireError> {
            self.reacquire()
        }

        fn reacquire(&mut self) -> Result<String, AcquireError> {
            self.results
                .pop_front()
                .unwrap_or_else(|| Err(AcquireError::Unavailable("script exhausted".into())))
        }
    }

    fn line(seq: i64) -> String {
        format!(
            r#"{{"log_seq":{seq},"timestamp":"2025-01-15T09:00:00Z","agent":"dev","action":"START"}}"#
        )
    }

    fn fail() -> Result<String, AcquireError> {
        Err(AcquireError::Unavailable("gone".into()))
    }

    #[test]
    fn starts_idle_and_ignores_ticks() {
        let mut poller = Poller::default();
        let mut store = LogStore::default();
        let mut source = Scripted::new(vec![Ok(line(1))]);

        assert_eq!(poller.state(), PollState::Idle);
        assert_eq!(poller.tick(&mut source, &mut store), TickOutcome::Inactive);
        assert!(store.is_empty());
    }

    #[test]
    fn success_appends_and_unchanged_content_is_reported() {
        let (mut store, _) = LogStore::load(&line(1));
        let mut poller = Poller::default();
        poller.start();

        let grown = [line(1), line(2)].join("\n");
        let mut source = Scripted::new(vec![Ok(grown.clone()), Ok(grown)]);

        assert_eq!(
            poller.tick(&mut source, &mut store),
            TickOutcome::Appended {
                new_events: 1,
                skipped: 0
            }
        );
        assert_eq!(poller.tick(&mut source, &mut store), TickOutcome::Unchanged);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn three_consecutive_failures_disable_once() {
        let mut store = LogStore::default();
        let mut poller = Poller::default();
        poller.start();
        let mut source = Scripted::new(vec![fail(), fail(), fail(), fail()]);

        assert_eq!(
            poller.tick(&mut source, &mut store),
            TickOutcome::Failed { consecutive: 1 }
        );
        assert_eq!(
            poller.tick(&mut source, &mut store),
            TickOutcome::Failed { consecutive: 2 }
        );
        assert_eq!(
            poller.tick(&mut source, &mut store),
            TickOutcome::Disabled { consecutive: 3 }
        );
        assert_eq!(poller.state(), PollState::Disabled);
        assert_eq!(poller.tick(&mut source, &mut store), TickOutcome::Inactive);
    }

    #[test]
    fn success_resets_failure_count() {
        let mut store = LogStore::default();
        let mut poller = Poller::default();
        poller.start();
        let mut source = Scripted::new(vec![fail(), fail(), Ok(line(1)), fail(), fail()]);

        for _ in 0..5 {
            poller.tick(&mut source, &mut store);
        }
        assert_eq!(poller.state(), PollState::Active);
        assert_eq!(poller.consecutive_failures(), 2);
    }

    #[test]
    fn restart_resumes_disabled_poller() {
        let mut store = LogStore::default();
        let mut poller = Poller::new(1);
        poller.start();

        assert_eq!(
            poller.on_content(fail(), &mut store),
            TickOutcome::Disabled { consecutive: 1 }
        );
        poller.start();
        assert_eq!(poller.state(), PollState::Disabled);
        poller.stop();
        poller.start();
        assert_eq!(poller.state(), PollState::Disabled);

        poller.restart();
        assert_eq!(poller.state(), PollState::Active);
        assert_eq!(poller.consecutive_failures(), 0);
        assert!(matches!(
            poller.on_content(Ok(line(4)), &mut store),
            TickOutcome::Appended { new_events: 1, .. }
        ));
    }

    #[test]
    fn stop_returns_to_idle() {
        let mut poller = Poller::default();
        poller.start();
        poller.stop();
        assert_eq!(poller.state(), PollState::Idle);
        assert_eq!(
            poller.on_content(Ok(line(1)), &mut LogStore::default()),
            TickOutcome::Inactive
        );
    }

    #[test]
    fn file_source_reads_current_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", line(1)).unwrap();

        let mut source = FileSource::new(file.path());
        let (mut store, _) = LogStore::load(&source.acquire_initial().unwrap());
        let mut poller = Poller::default();
        poller.start();

        writeln!(file, "{}", line(2)).unwrap();
        file.flush().unwrap();
        assert!(matches!(
            poller.tick(&mut source, &mut store),
            TickOutcome::Appended { new_events: 1, .. }
        ));
    }

    #[test]
    fn file_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FileSource::new(dir.path().join("missing.jsonl"));
        let err = source.reacquire().unwrap_err();
        assert!(matches!(err, AcquireError::Io { .. }));
        assert!(err.to_string().contains("missing.jsonl"));
    }
}
