//! Directory monitoring: filesystem events feeding sort passes.
//!
//! The monitor subscribes to creation events on the watch directory
//! (non-recursive) and forwards each qualifying event as a trigger to a
//! single worker thread. The worker runs one full sort pass per surviving
//! trigger; triggers queued while a pass is running are drained and
//! coalesced beforehand, so passes never overlap and a burst of arrivals
//! does not pile up redundant work.
//!
//! Lifecycle is Idle -> Watching -> Idle. `stop` tears down the subscription
//! first, then joins the worker, so no pass starts after stop returns and an
//! in-flight pass completes rather than being abandoned.

use crate::ledger::LedgerStore;
use crate::sorter::SortEngine;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;

/// Errors that can occur when starting the monitor.
#[derive(Debug)]
pub enum MonitorError {
    /// The watch path is missing or not a directory.
    InvalidDirectory { path: PathBuf },
    /// The filesystem subscription could not be registered.
    SubscriptionFailed { source: notify::Error },
}

impl std::fmt::Display for MonitorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorError::InvalidDirectory { path } => {
                write!(f, "Invalid watch directory: {}", path.display())
            }
            MonitorError::SubscriptionFailed { source } => {
                write!(f, "Failed to subscribe to filesystem events: {}", source)
            }
        }
    }
}

impl std::error::Error for MonitorError {}

/// Messages delivered to the worker thread.
enum Signal {
    /// Run a sort pass.
    Sort,
    /// Quiesce and exit.
    Shutdown,
}

/// Resources held while watching.
struct Active {
    watcher: RecommendedWatcher,
    signal_tx: Sender<Signal>,
    worker: JoinHandle<()>,
}

/// Watches a directory and triggers sort passes on file creation.
pub struct Monitor {
    watch_dir: PathBuf,
    sort_dir: PathBuf,
    ledger_store: LedgerStore,
    active: Option<Active>,
}

impl Monitor {
    /// Creates an idle monitor for the given directories.
    pub fn new(
        watch_dir: impl Into<PathBuf>,
        sort_dir: impl Into<PathBuf>,
        ledger_store: LedgerStore,
    ) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            sort_dir: sort_dir.into(),
            ledger_store,
            active: None,
        }
    }

    /// Returns true while the subscription is registered.
    pub fn is_watching(&self) -> bool {
        self.active.is_some()
    }

    /// Registers the filesystem subscription and spawns the worker.
    ///
    /// A no-op when already watching; never creates a second subscription.
    ///
    /// # Errors
    ///
    /// `InvalidDirectory` if the watch path is missing or not a directory,
    /// `SubscriptionFailed` if registration fails. Either way the monitor
    /// stays idle.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if self.active.is_some() {
            return Ok(());
        }

        if !self.watch_dir.is_dir() {
            return Err(MonitorError::InvalidDirectory {
                path: self.watch_dir.clone(),
            });
        }

        let (signal_tx, signal_rx) = channel();

        let event_tx = signal_tx.clone();
        let handler = move |result: notify::Result<Event>| {
            if let Ok(event) = result
                && is_file_creation(&event)
            {
                // Send failures mean the worker is gone; nothing to do.
                let _ = event_tx.send(Signal::Sort);
            }
        };

        let mut watcher = RecommendedWatcher::new(handler, Config::default())
            .map_err(|source| MonitorError::SubscriptionFailed { source })?;
        watcher
            .watch(&self.watch_dir, RecursiveMode::NonRecursive)
            .map_err(|source| MonitorError::SubscriptionFailed { source })?;

        let watch_dir = self.watch_dir.clone();
        let sort_dir = self.sort_dir.clone();
        let ledger_store = self.ledger_store.clone();
        let worker = std::thread::spawn(move || {
            run_worker(&watch_dir, &sort_dir, &ledger_store, &signal_rx);
        });

        self.active = Some(Active {
            watcher,
            signal_tx,
            worker,
        });

        Ok(())
    }

    /// Deregisters the subscription and quiesces the worker.
    ///
    /// A no-op when idle. After this returns no further events are
    /// delivered; an in-flight pass has completed.
    pub fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        // Drop the watcher first so no new triggers are produced, then ask
        // the worker to exit once its queue is drained.
        drop(active.watcher);
        let _ = active.signal_tx.send(Signal::Shutdown);
        let _ = active.worker.join();
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker loop: one sort pass per surviving trigger, strictly serial.
fn run_worker(
    watch_dir: &Path,
    sort_dir: &Path,
    ledger_store: &LedgerStore,
    signal_rx: &Receiver<Signal>,
) {
    while let Ok(signal) = signal_rx.recv() {
        match signal {
            Signal::Shutdown => break,
            Signal::Sort => {
                // Coalesce any triggers that queued up behind this one; a
                // burst of N creations needs one sweep, not N.
                let mut shutdown_pending = false;
                while let Ok(next) = signal_rx.try_recv() {
                    if matches!(next, Signal::Shutdown) {
                        shutdown_pending = true;
                        break;
                    }
                }

                match SortEngine::sort_once(watch_dir, sort_dir, ledger_store) {
                    Ok(report) => {
                        for (path, cause) in &report.errors {
                            eprintln!("Warning: could not sort {}: {}", path.display(), cause);
                        }
                    }
                    Err(e) => eprintln!("Warning: sort pass failed: {}", e),
                }

                if shutdown_pending {
                    break;
                }
            }
        }
    }
}

/// Returns true for creation events that concern a regular file.
///
/// Directory creations are excluded; so are creations whose path is already
/// gone by the time the event is handled (the next pass would find nothing).
fn is_file_creation(event: &Event) -> bool {
    matches!(event.kind, EventKind::Create(_)) && event.paths.iter().any(|p| p.is_file())
}
