//! Progress reporting

use crate::executor::{ExecutionReport, ProgressSnapshot};
use indicatif::{HumanBytes, HumanDuration, ProgressBar, ProgressStyle};

/// Progress reporter for sync operations
pub struct ProgressReporter {
    scan_bar: ProgressBar,
    transfer_bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let scan_bar = ProgressBar::new_spinner();
        scan_bar.enable_steady_tick(std::time::Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            scan_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }

        let transfer_bar = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} items | {msg}")
        {
            transfer_bar.set_style(style.progress_chars("=>-"));
        }

        Self {
            scan_bar,
            transfer_bar,
        }
    }

    /// Mark start of the scanning phase.
    pub fn start_scan(&self) {
        self.scan_bar.set_message("Scanning source...");
    }

    /// Mark completion of the scanning phase.
    pub fn finish_scan(&self, items: usize) {
        self.scan_bar
            .finish_with_message(format!("Scanned source: {items} items"));
    }

    /// Initialize the transfer phase.
    pub fn start_transfer(&self, planned_items: u64, total_bytes: u64) {
        self.transfer_bar.set_length(planned_items);
        self.transfer_bar.set_position(0);
        self.transfer_bar
            .set_message(format!("Starting copy of {}", HumanBytes(total_bytes)));
    }

    /// Update the current item indicator.
    pub fn set_current_item(&self, name: &str) {
        self.transfer_bar.set_message(format!("Copying {name}"));
    }

    /// Refresh position, throughput and remaining-time display.
    pub fn update(&self, snapshot: &ProgressSnapshot) {
        self.transfer_bar.set_position(snapshot.processed_items as u64);

        let mut message = snapshot.current_item.clone();
        if let Some(rate) = snapshot.rate {
            message.push_str(&format!(" | {}/s", HumanBytes(rate as u64)));
        }
        if let Some(eta) = snapshot.eta {
            message.push_str(&format!(" | {} left", HumanDuration(eta)));
        }
        self.transfer_bar.set_message(message);
    }

    /// Surface an item failure without disturbing the bar.
    pub fn item_error(&self, name: &str, message: &str) {
        self.transfer_bar.println(format!("ERROR {name}: {message}"));
    }

    /// Finalize the transfer phase.
    pub fn finish_transfer(&self, report: &ExecutionReport) {
        self.transfer_bar.finish_with_message(format!(
            "Done: {} copied, {} failed, {} skipped | {}",
            report.succeeded,
            report.failed,
            report.skipped,
            HumanBytes(report.bytes_copied)
        ));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
