//! Watcher lifecycle and control commands.
//!
//! The [`Watcher`] owns the scheduling state (interval and watch list),
//! the dedup history, and at most one background worker task. Control
//! commands validate input, persist the new state through the host's
//! [`ConfigStore`], and nudge the worker: every accepted mutation calls
//! `start()`, which is a no-op while a worker is already alive.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::config::ConfigStore;
use crate::delivery::DeliverySink;
use crate::error::{AppError, Result};
use crate::models::{TargetList, is_valid_handle};
use crate::services::{PageFetcher, PostExtractor};
use crate::session::PageSession;
use crate::watcher::cycle::{CycleOutcome, run_cycle};
use crate::watcher::dedup::DedupCache;

/// Store key holding the polling interval in seconds.
pub const KEY_INTERVAL: &str = "interval";

/// Store key holding the comma-joined watch list.
pub const KEY_TARGETS: &str = "targets";

/// Polling cadence applied when the store has no interval.
pub const DEFAULT_INTERVAL_SECS: u64 = 30;

/// How long `stop()` waits for the worker before aborting it.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Scheduling state shared between the controller and the worker.
///
/// The worker snapshots it once per pass, so mutations apply from the
/// next pass without interrupting the current one.
#[derive(Debug)]
struct WatcherState {
    /// Seconds between passes; 0 is the loop's exit condition
    interval_secs: u64,

    /// Watched screen names in insertion order
    targets: TargetList,
}

struct WorkerHandle {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Background poller over a set of profile pages.
///
/// New posts flow fetch -> extract -> dedup -> sink. The interval and
/// watch list are re-read from the [`ConfigStore`] at construction, so a
/// watcher resumes where the previous process left off.
pub struct Watcher {
    state: Arc<Mutex<WatcherState>>,
    dedup: Arc<Mutex<DedupCache>>,
    worker: tokio::sync::Mutex<Option<WorkerHandle>>,
    fetcher: Arc<PageFetcher>,
    extractor: Arc<PostExtractor>,
    session: Arc<dyn PageSession>,
    sink: Arc<dyn DeliverySink>,
    store: Arc<dyn ConfigStore>,
}

impl Watcher {
    /// Build a watcher over the injected collaborators.
    pub fn new(
        session: Arc<dyn PageSession>,
        sink: Arc<dyn DeliverySink>,
        store: Arc<dyn ConfigStore>,
    ) -> Result<Self> {
        let interval_secs = match store.get(KEY_INTERVAL) {
            None => DEFAULT_INTERVAL_SECS,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!(
                    "stored interval {raw:?} is not a number; using {DEFAULT_INTERVAL_SECS}s"
                );
                DEFAULT_INTERVAL_SECS
            }),
        };
        let targets = store
            .get(KEY_TARGETS)
            .map(|raw| TargetList::from_joined(&raw))
            .unwrap_or_default();

        Ok(Self {
            state: Arc::new(Mutex::new(WatcherState {
                interval_secs,
                targets,
            })),
            dedup: Arc::new(Mutex::new(DedupCache::new())),
            worker: tokio::sync::Mutex::new(None),
            fetcher: Arc::new(PageFetcher::new(Arc::clone(&session))),
            extractor: Arc::new(PostExtractor::new()?),
            session,
            sink,
            store,
        })
    }

    /// Current polling interval in seconds (0 once stopped).
    pub fn interval_secs(&self) -> u64 {
        self.state.lock().unwrap().interval_secs
    }

    /// Snapshot of the watch list in insertion order.
    pub fn targets(&self) -> Vec<String> {
        self.state.lock().unwrap().targets.to_vec()
    }

    /// Whether a worker task is currently alive.
    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Start polling in the background.
    ///
    /// Returns `Ok(true)` when a worker was spawned and `Ok(false)` when
    /// the call was a no-op: a worker is already alive, the interval is 0,
    /// or the watch list is empty. The session is re-authenticated before
    /// every spawn.
    pub async fn start(&self) -> Result<bool> {
        let mut worker = self.worker.lock().await;
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            return Ok(false);
        }

        {
            let state = self.state.lock().unwrap();
            if state.interval_secs == 0 || state.targets.is_empty() {
                log::debug!("watcher not started: nothing to poll");
                return Ok(false);
            }
        }

        self.session.authenticate().await?;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_worker(
            Arc::clone(&self.state),
            Arc::clone(&self.dedup),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.extractor),
            Arc::clone(&self.sink),
            cancel.clone(),
        ));
        *worker = Some(WorkerHandle { handle, cancel });
        log::info!("watcher started");
        Ok(true)
    }

    /// Stop polling.
    ///
    /// The in-memory interval is zeroed (the loop's exit condition, and
    /// deliberately not persisted so the configured cadence survives a
    /// restart), the worker is cancelled, and up to the grace period is
    /// spent waiting for it to finish. A worker that overstays is aborted
    /// and reported as [`AppError::CancellationTimeout`]. The worker slot
    /// stays locked for the whole wait, so a concurrent `start` cannot
    /// spawn until the old worker is gone.
    pub async fn stop(&self) -> Result<()> {
        self.state.lock().unwrap().interval_secs = 0;

        let mut slot = self.worker.lock().await;
        let Some(WorkerHandle { mut handle, cancel }) = slot.take() else {
            return Ok(());
        };

        cancel.cancel();
        match timeout(STOP_GRACE, &mut handle).await {
            Ok(join_result) => {
                if let Err(e) = join_result {
                    log::warn!("watcher worker ended abnormally: {e}");
                } else {
                    log::info!("watcher stopped");
                }
                Ok(())
            }
            Err(_) => {
                handle.abort();
                Err(AppError::CancellationTimeout {
                    grace_secs: STOP_GRACE.as_secs(),
                })
            }
        }
    }

    /// Authenticate and run exactly one pass over the current watch list.
    ///
    /// Shares the dedup history with the background worker, so one-shot
    /// hosts and the background loop never re-deliver each other's posts.
    pub async fn poll_once(&self) -> Result<CycleOutcome> {
        self.session.authenticate().await?;
        let targets = self.targets();
        let cancel = CancellationToken::new();
        Ok(run_cycle(
            &targets,
            &self.fetcher,
            &self.extractor,
            &self.dedup,
            self.sink.as_ref(),
            &cancel,
        )
        .await)
    }

    /// Set the polling interval from user input and (re)start watching.
    pub async fn set_interval(&self, input: &str) -> Result<String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::validation(
                "specify the polling interval in seconds",
            ));
        }
        let secs: u64 = input
            .parse()
            .map_err(|_| AppError::validation(format!("'{input}' is not a valid interval")))?;
        if secs == 0 {
            return Err(AppError::validation(
                "the polling interval must be greater than zero",
            ));
        }

        self.state.lock().unwrap().interval_secs = secs;
        self.store.set(KEY_INTERVAL, &secs.to_string())?;
        self.start().await?;
        Ok(format!("polling interval set to {secs} seconds"))
    }

    /// Add a screen name to the watch list and (re)start watching.
    pub async fn add_target(&self, input: &str) -> Result<String> {
        let handle = input.trim();
        if !is_valid_handle(handle) {
            return Err(AppError::validation(
                "specify a screen name (letters, digits, and underscores)",
            ));
        }

        let joined = {
            let mut state = self.state.lock().unwrap();
            if !state.targets.add(handle) {
                return Err(AppError::validation(format!(
                    "{handle} is already being watched"
                )));
            }
            state.targets.to_joined()
        };
        self.store.set(KEY_TARGETS, &joined)?;
        self.start().await?;
        Ok(format!("{handle} added to the watch list"))
    }

    /// Remove a screen name from the watch list.
    ///
    /// A worker left with an empty list exits on its own at the next pass.
    pub async fn remove_target(&self, input: &str) -> Result<String> {
        let handle = input.trim();
        if handle.is_empty() {
            return Err(AppError::validation("specify the screen name to remove"));
        }

        let joined = {
            let mut state = self.state.lock().unwrap();
            if !state.targets.remove(handle) {
                return Err(AppError::validation(format!(
                    "{handle} is not being watched"
                )));
            }
            state.targets.to_joined()
        };
        self.store.set(KEY_TARGETS, &joined)?;
        self.start().await?;
        Ok(format!("{handle} removed from the watch list"))
    }

    /// User-facing summary of the watch list.
    pub fn list_targets(&self) -> String {
        let state = self.state.lock().unwrap();
        if state.targets.is_empty() {
            return "the watch list is empty".to_string();
        }
        let names: Vec<&str> = state.targets.iter().collect();
        format!("watching {} target(s): {}", names.len(), names.join(", "))
    }
}

/// Worker body: fetch every target, sleep, repeat until told to stop.
async fn run_worker(
    state: Arc<Mutex<WatcherState>>,
    dedup: Arc<Mutex<DedupCache>>,
    fetcher: Arc<PageFetcher>,
    extractor: Arc<PostExtractor>,
    sink: Arc<dyn DeliverySink>,
    cancel: CancellationToken,
) {
    log::info!("watch loop running");
    loop {
        // Snapshot once per pass; control commands apply from the next one.
        let (interval_secs, targets) = {
            let state = state.lock().unwrap();
            (state.interval_secs, state.targets.to_vec())
        };
        if interval_secs == 0 || targets.is_empty() {
            break;
        }

        let outcome = run_cycle(
            &targets,
            &fetcher,
            &extractor,
            &dedup,
            sink.as_ref(),
            &cancel,
        )
        .await;
        log::debug!(
            "pass finished: {} target(s), {} delivered, {} failure(s)",
            outcome.targets_polled,
            outcome.delivered,
            outcome.failures
        );

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(Duration::from_secs(interval_secs)) => {}
        }
    }
    log::info!("watch loop exited");
}
