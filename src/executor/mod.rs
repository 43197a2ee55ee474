//! Copy plan construction and execution

mod copy;

pub use copy::copy_file;

use crate::diff::{compare, PathMapper};
use crate::select::SelectionModel;
use crate::types::{ErrorLogEntry, FileNode, NodeId, OverwriteRule, StatusMap, SyncError, SyncStatus};
use std::fs;
use std::time::{Duration, Instant};

/// Rate and ETA stay unreported until this much wall time has passed;
/// earlier samples are all division-by-near-zero noise.
const RATE_WARMUP: Duration = Duration::from_millis(500);

/// Comparator inputs the executor needs to re-validate each item.
#[derive(Debug, Clone, Copy)]
pub struct ExecuteOptions {
    pub rule: OverwriteRule,
    pub compare_by_hash: bool,
    pub preserve_attributes: bool,
}

/// Point-in-time counters emitted after every item.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// processed items / planned items
    pub fraction: f64,
    /// Display name of the item just processed
    pub current_item: String,
    pub processed_items: usize,
    pub planned_items: usize,
    pub processed_bytes: u64,
    pub total_bytes: u64,
    /// Bytes per second; `None` until enough wall time has passed for the
    /// figure to mean anything
    pub rate: Option<f64>,
    /// Estimated remaining time; `None` whenever `rate` is
    pub eta: Option<Duration>,
}

/// Events emitted while executing a plan.
#[derive(Debug, Clone)]
pub enum ExecuteEvent {
    /// An item is about to be processed.
    ItemStarted {
        index: usize,
        total: usize,
        name: String,
    },
    /// An item finished with a terminal status (`Done`, `Error`, or
    /// `Skip` when re-validation found the destination already current).
    ItemFinished {
        id: NodeId,
        name: String,
        status: SyncStatus,
        error: Option<String>,
    },
    /// Counters after each item.
    Progress(ProgressSnapshot),
    /// The whole plan has been attempted.
    Completed(ExecutionReport),
}

/// Optional callback used to receive execution events.
pub type ExecuteCallback = dyn Fn(&ExecuteEvent) + Send + Sync;

/// Terminal outcome of a run. The executor itself never fails; an empty
/// plan is a valid, immediately-successful no-op.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    /// Number of items in the plan
    pub planned: usize,
    /// Items copied or created
    pub succeeded: usize,
    /// Items that failed; details are in `error_log`
    pub failed: usize,
    /// Items whose re-validation found the destination already current
    pub skipped: usize,
    /// Bytes actually copied
    pub bytes_copied: u64,
    /// New destination entries created (for display counters)
    pub dest_items_created: usize,
    /// Terminal status per attempted node, in plan order
    pub outcomes: Vec<(NodeId, SyncStatus)>,
    /// One entry per failed item
    pub error_log: Vec<ErrorLogEntry>,
}

/// Collect the ordered copy plan: a single pre-order traversal that does
/// not enter excluded nodes (their subtrees are implicitly skipped) and
/// keeps every included node whose status is `Add`/`Update`. Directories
/// stay in the plan as create-directory steps.
pub fn build_copy_list<'t>(
    nodes: &'t [FileNode],
    statuses: &StatusMap,
    selection: &SelectionModel,
) -> Vec<&'t FileNode> {
    let mut plan = Vec::new();
    collect_level(nodes, statuses, selection, &mut plan);
    plan
}

fn collect_level<'t>(
    nodes: &'t [FileNode],
    statuses: &StatusMap,
    selection: &SelectionModel,
    plan: &mut Vec<&'t FileNode>,
) {
    for node in nodes {
        if !selection.is_included(node.id) {
            continue;
        }
        if statuses.get(&node.id).is_some_and(|s| s.is_actionable()) {
            plan.push(node);
        }
        if let Some(children) = &node.children {
            collect_level(children, statuses, selection, plan);
        }
    }
}

/// Execute the actionable, included subset of `nodes`.
///
/// Items are attempted in plan order. Each item's status is re-validated
/// against a fresh look at the destination immediately before acting; a
/// failed item is recorded in the error log and the batch carries on.
pub fn execute(
    nodes: &[FileNode],
    statuses: &StatusMap,
    selection: &SelectionModel,
    mapper: &PathMapper,
    options: ExecuteOptions,
    on_event: Option<&ExecuteCallback>,
) -> ExecutionReport {
    let plan = build_copy_list(nodes, statuses, selection);
    let total_bytes: u64 = plan.iter().map(|node| node.size).sum();

    let mut report = ExecutionReport {
        planned: plan.len(),
        ..Default::default()
    };
    let started = Instant::now();
    let mut processed_bytes = 0u64;

    for (idx, node) in plan.iter().enumerate() {
        emit(
            on_event,
            ExecuteEvent::ItemStarted {
                index: idx + 1,
                total: report.planned,
                name: node.name.clone(),
            },
        );

        let (status, error) = match run_item(node, mapper, options) {
            Ok(ItemOutcome::Done { created }) => {
                report.succeeded += 1;
                report.bytes_copied += node.size;
                if created {
                    report.dest_items_created += 1;
                }
                (SyncStatus::Done, None)
            }
            Ok(ItemOutcome::AlreadyCurrent) => {
                report.skipped += 1;
                (SyncStatus::Skip, None)
            }
            Err(err) => {
                report.failed += 1;
                let message = err.to_string();
                report
                    .error_log
                    .push(ErrorLogEntry::new(message.as_str(), node.path.clone()));
                (SyncStatus::Error, Some(message))
            }
        };

        report.outcomes.push((node.id, status));
        emit(
            on_event,
            ExecuteEvent::ItemFinished {
                id: node.id,
                name: node.name.clone(),
                status,
                error,
            },
        );

        // The item counts toward throughput whatever its outcome, so the
        // ETA keeps shrinking monotonically.
        processed_bytes += node.size;
        emit(
            on_event,
            ExecuteEvent::Progress(snapshot(
                idx + 1,
                report.planned,
                processed_bytes,
                total_bytes,
                &node.name,
                started.elapsed(),
            )),
        );
    }

    emit(on_event, ExecuteEvent::Completed(report.clone()));
    report
}

enum ItemOutcome {
    /// The destination was created or replaced. `created` is set when
    /// the entry did not exist before.
    Done { created: bool },
    /// A fresh comparison says the destination caught up since scan time.
    AlreadyCurrent,
}

fn run_item(
    node: &FileNode,
    mapper: &PathMapper,
    options: ExecuteOptions,
) -> Result<ItemOutcome, SyncError> {
    let dest_path = mapper.map(&node.path)?;

    // The destination may have changed between scan time and now; only a
    // fresh comparison is trusted.
    let status = compare(node, &dest_path, options.rule, options.compare_by_hash);
    if !status.is_actionable() {
        return Ok(ItemOutcome::AlreadyCurrent);
    }
    let created = status == SyncStatus::Add;

    if node.is_dir {
        fs::create_dir_all(&dest_path)?;
    } else {
        copy_file(&node.path, &dest_path, options.preserve_attributes)?;
    }

    Ok(ItemOutcome::Done { created })
}

fn snapshot(
    processed_items: usize,
    planned_items: usize,
    processed_bytes: u64,
    total_bytes: u64,
    current_item: &str,
    elapsed: Duration,
) -> ProgressSnapshot {
    let rate = if elapsed >= RATE_WARMUP && processed_bytes > 0 {
        let bytes_per_sec = processed_bytes as f64 / elapsed.as_secs_f64();
        (bytes_per_sec.is_finite() && bytes_per_sec > 0.0).then_some(bytes_per_sec)
    } else {
        None
    };
    let eta = rate.map(|bytes_per_sec| {
        let remaining = total_bytes.saturating_sub(processed_bytes);
        Duration::from_secs_f64(remaining as f64 / bytes_per_sec)
    });

    ProgressSnapshot {
        fraction: processed_items as f64 / planned_items.max(1) as f64,
        current_item: current_item.to_string(),
        processed_items,
        planned_items,
        processed_bytes,
        total_bytes,
        rate,
        eta,
    }
}

fn emit(on_event: Option<&ExecuteCallback>, event: ExecuteEvent) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}
