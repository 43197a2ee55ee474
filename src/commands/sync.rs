//! Main sync command

use crate::config::{Cli, Prefs};
use crate::engine::{EngineEvent, EngineRequest, SyncEngine};
use crate::executor::{build_copy_list, ExecuteEvent, ExecutionReport};
use crate::types::{FileNode, StatusMap, SyncError, SyncStatus};
use crate::ui::ProgressReporter;
use indicatif::HumanBytes;
use tracing::warn;

/// Run the sync operation
pub fn run(cli: Cli) -> Result<(), SyncError> {
    let prefs_path = cli.prefs.clone().or_else(Prefs::default_path);
    let mut prefs = prefs_path
        .as_deref()
        .map(Prefs::load)
        .unwrap_or_default();
    let config = cli.into_config(&prefs)?;

    let reporter = ProgressReporter::new();
    let mut engine = SyncEngine::new()?;

    reporter.start_scan();
    engine.submit(EngineRequest::Scan(config.clone()))?;
    let (tree, statuses, selection) = loop {
        match engine.next_event() {
            Some(EngineEvent::ScanStarted) => {}
            Some(EngineEvent::ScanCompleted {
                tree,
                statuses,
                selection,
            }) => break (tree, statuses, selection),
            Some(EngineEvent::ScanFailed(err)) => return Err(err),
            Some(_) => {}
            None => return Err(SyncError::EngineClosed),
        }
    };
    reporter.finish_scan(statuses.len());

    let (planned_items, planned_bytes) = {
        let plan = build_copy_list(&tree, &statuses, &selection);
        print_plan_summary(&plan, &statuses);
        (plan.len(), plan.iter().map(|node| node.size).sum::<u64>())
    };

    if planned_items == 0 {
        println!("Nothing to copy.");
    } else {
        reporter.start_transfer(planned_items as u64, planned_bytes);
        engine.submit(EngineRequest::Execute {
            config: config.clone(),
            tree,
            statuses,
            selection,
        })?;

        let report = loop {
            match engine.next_event() {
                Some(EngineEvent::Execute(event)) => match event {
                    ExecuteEvent::ItemStarted { name, .. } => reporter.set_current_item(&name),
                    ExecuteEvent::ItemFinished {
                        name,
                        status: SyncStatus::Error,
                        error,
                        ..
                    } => reporter.item_error(&name, error.as_deref().unwrap_or("unknown error")),
                    ExecuteEvent::Progress(snapshot) => reporter.update(&snapshot),
                    _ => {}
                },
                Some(EngineEvent::ExecuteCompleted(report)) => break report,
                Some(EngineEvent::ExecuteFailed(err)) => return Err(err),
                Some(_) => {}
                None => return Err(SyncError::EngineClosed),
            }
        };

        reporter.finish_transfer(&report);
        print_error_summary(&report);
    }

    prefs.remember(&config.source, &config.destination);
    if let Some(path) = &prefs_path {
        if let Err(err) = prefs.store(path) {
            warn!("failed to persist preferences: {err}");
        }
    }

    engine.shutdown()?;
    Ok(())
}

fn print_plan_summary(plan: &[&FileNode], statuses: &StatusMap) {
    println!("{}", format_plan_summary(plan, statuses));
}

fn format_plan_summary(plan: &[&FileNode], statuses: &StatusMap) -> String {
    let adds = plan
        .iter()
        .filter(|node| statuses.get(&node.id) == Some(&SyncStatus::Add))
        .count();
    let updates = plan
        .iter()
        .filter(|node| statuses.get(&node.id) == Some(&SyncStatus::Update))
        .count();
    let bytes: u64 = plan.iter().map(|node| node.size).sum();

    format!(
        "Plan:\n  Add: {}  Update: {}\n  Total bytes to copy: {}",
        adds,
        updates,
        HumanBytes(bytes)
    )
}

fn print_error_summary(report: &ExecutionReport) {
    if report.error_log.is_empty() {
        return;
    }
    println!("{}", format_error_summary(report));
}

fn format_error_summary(report: &ExecutionReport) -> String {
    let mut lines = Vec::with_capacity(report.error_log.len() + 1);
    lines.push(format!("{} item(s) failed:", report.error_log.len()));
    for entry in &report.error_log {
        lines.push(format!("  {entry}"));
    }
    lines.join("\n")
}
