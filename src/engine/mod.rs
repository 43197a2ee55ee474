//! Coordinator/worker split for long-running operations
//!
//! The engine owns a dedicated runtime with a single worker task.
//! Requests travel over a bounded channel and are processed strictly one
//! at a time, so at most one scan and one execute are ever in flight;
//! later requests queue behind the current one, never interleave with it.
//! Results and progress come back as events, and the caller remains the
//! sole owner of the authoritative tree/status/selection state.

use crate::config::Config;
use crate::diff::{compare_tree, PathMapper};
use crate::executor::{self, ExecuteEvent, ExecuteOptions, ExecutionReport};
use crate::scanner;
use crate::select::SelectionModel;
use crate::types::{FileNode, StatusMap, SyncError};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::debug;

/// How long the worker waits for further settings changes before it
/// rescans; every new change restarts the window.
const SETTINGS_COALESCE_WINDOW: Duration = Duration::from_millis(100);

/// Requests accepted by the worker.
#[derive(Debug, Clone)]
pub enum EngineRequest {
    /// Scan the source tree, classify it, and derive the smart selection.
    Scan(Config),
    /// Execute a previously scanned tree under the caller's selection.
    Execute {
        config: Config,
        tree: Vec<FileNode>,
        statuses: StatusMap,
        selection: SelectionModel,
    },
    /// A configuration change; coalesced, then triggers a rescan.
    SettingsChanged(Config),
}

/// Events handed back to the coordinator.
#[derive(Debug)]
pub enum EngineEvent {
    ScanStarted,
    /// A scan finished; the coordinator takes ownership of the new state.
    ScanCompleted {
        tree: Vec<FileNode>,
        statuses: StatusMap,
        selection: SelectionModel,
    },
    ScanFailed(SyncError),
    /// Forwarded executor event (item progress, per-item outcomes).
    Execute(ExecuteEvent),
    /// An execute run finished; statuses in the report are authoritative.
    ExecuteCompleted(ExecutionReport),
    ExecuteFailed(SyncError),
}

/// Handle to the background worker.
pub struct SyncEngine {
    runtime: Runtime,
    request_tx: Option<mpsc::Sender<EngineRequest>>,
    event_rx: mpsc::UnboundedReceiver<EngineEvent>,
    worker: Option<JoinHandle<()>>,
}

impl SyncEngine {
    /// Spawn the worker on a fresh runtime.
    pub fn new() -> Result<Self, SyncError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let (request_tx, request_rx) = mpsc::channel::<EngineRequest>(16);
        let (event_tx, event_rx) = mpsc::unbounded_channel::<EngineEvent>();
        let worker = runtime.handle().spawn(worker_loop(request_rx, event_tx));

        Ok(Self {
            runtime,
            request_tx: Some(request_tx),
            event_rx,
            worker: Some(worker),
        })
    }

    /// Queue a request; the worker picks it up after the current one.
    pub fn submit(&self, request: EngineRequest) -> Result<(), SyncError> {
        let sender = self.request_tx.as_ref().ok_or(SyncError::EngineClosed)?;
        self.runtime
            .block_on(sender.send(request))
            .map_err(|_| SyncError::EngineClosed)
    }

    /// Block until the next event; `None` once the worker has exited and
    /// the queue is drained.
    pub fn next_event(&mut self) -> Option<EngineEvent> {
        self.runtime.block_on(self.event_rx.recv())
    }

    /// Close the request queue and wait for the worker to drain.
    pub fn shutdown(mut self) -> Result<(), SyncError> {
        self.request_tx.take();
        if let Some(worker) = self.worker.take() {
            self.runtime
                .block_on(worker)
                .map_err(|e| SyncError::Config(format!("engine worker failed: {e}")))?;
        }
        Ok(())
    }
}

async fn worker_loop(
    mut request_rx: mpsc::Receiver<EngineRequest>,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
) {
    let mut pending: Option<EngineRequest> = None;

    loop {
        let request = match pending.take() {
            Some(request) => request,
            None => match request_rx.recv().await {
                Some(request) => request,
                None => break,
            },
        };

        match request {
            EngineRequest::Scan(config) => run_scan(&config, &event_tx),
            EngineRequest::SettingsChanged(config) => {
                let (config, leftover) = coalesce_settings(config, &mut request_rx).await;
                pending = leftover;
                run_scan(&config, &event_tx);
            }
            EngineRequest::Execute {
                config,
                tree,
                statuses,
                selection,
            } => run_execute(&config, &tree, &statuses, &selection, &event_tx),
        }
    }

    debug!("engine worker drained");
}

/// Swallow a burst of settings changes, restarting the wait window on
/// each one. A non-settings request ends the burst and is handed back to
/// the main loop.
async fn coalesce_settings(
    mut latest: Config,
    request_rx: &mut mpsc::Receiver<EngineRequest>,
) -> (Config, Option<EngineRequest>) {
    loop {
        match timeout(SETTINGS_COALESCE_WINDOW, request_rx.recv()).await {
            Ok(Some(EngineRequest::SettingsChanged(config))) => latest = config,
            Ok(Some(other)) => return (latest, Some(other)),
            Ok(None) | Err(_) => return (latest, None),
        }
    }
}

fn run_scan(config: &Config, event_tx: &mpsc::UnboundedSender<EngineEvent>) {
    let _ = event_tx.send(EngineEvent::ScanStarted);

    let mapper = match PathMapper::new(&config.source, &config.destination) {
        Ok(mapper) => mapper,
        Err(err) => {
            let _ = event_tx.send(EngineEvent::ScanFailed(err));
            return;
        }
    };

    // Scan from the canonical root so node paths share the mapper's
    // prefix; the tree is always built recursively for display, the
    // recursive_scan flag only gates classification of sub-levels.
    let tree = scanner::scan(mapper.source_root(), config.copy_hidden_files, true);
    let statuses = compare_tree(
        &tree,
        &mapper,
        config.overwrite_rule,
        config.compare_by_hash,
        config.recursive_scan,
    );

    let mut selection = SelectionModel::new();
    selection.rebuild(&tree);
    selection.smart_select(&tree, &statuses);

    let _ = event_tx.send(EngineEvent::ScanCompleted {
        tree,
        statuses,
        selection,
    });
}

fn run_execute(
    config: &Config,
    tree: &[FileNode],
    statuses: &StatusMap,
    selection: &SelectionModel,
    event_tx: &mpsc::UnboundedSender<EngineEvent>,
) {
    let mapper = match PathMapper::new(&config.source, &config.destination) {
        Ok(mapper) => mapper,
        Err(err) => {
            let _ = event_tx.send(EngineEvent::ExecuteFailed(err));
            return;
        }
    };

    let options = ExecuteOptions {
        rule: config.overwrite_rule,
        compare_by_hash: config.compare_by_hash,
        preserve_attributes: config.preserve_attributes,
    };

    let forward = event_tx.clone();
    let callback = move |event: &ExecuteEvent| {
        let _ = forward.send(EngineEvent::Execute(event.clone()));
    };

    let report = executor::execute(tree, statuses, selection, &mapper, options, Some(&callback));
    let _ = event_tx.send(EngineEvent::ExecuteCompleted(report));
}
