//! Console progress for reconciliation runs.
//!
//! Drives an indicatif bar over the declared resources and prints one
//! line per resource that changed something.

use colored::Colorize;
use declarative::{ApplyResult, ProgressCallback, ReconcileSummary};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::ui;

/// Progress reporter for `hostconf apply`
pub struct ConsoleProgress {
    bar: ProgressBar,
    quiet: bool,
    verbose: bool,
}

impl ConsoleProgress {
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            quiet,
            verbose,
        }
    }

    fn print(&self, line: &str) {
        if self.bar.is_hidden() {
            println!("{line}");
        } else {
            self.bar.println(line);
        }
    }
}

/// Describe one converged resource for the console
pub fn result_line(identity: &str, result: ApplyResult) -> String {
    match result {
        ApplyResult::Created => format!("{} {identity} created", "+".green()),
        ApplyResult::Modified => format!("{} {identity} modified", "~".yellow()),
        ApplyResult::Removed => format!("{} {identity} removed", "-".red()),
        ApplyResult::NoChange => format!("{} {identity}", "·".dimmed()),
    }
}

/// Describe a finished run in one line
pub fn summary_line(summary: &ReconcileSummary) -> String {
    if summary.total_changes() == 0 {
        return format!("{} already converged", ui::plural(summary.total(), "resource"));
    }
    format!(
        "{} created, {} modified, {} removed, {} unchanged",
        summary.created, summary.modified, summary.removed, summary.no_change
    )
}

impl ProgressCallback for ConsoleProgress {
    fn on_start(&mut self, count: usize) {
        if self.quiet || count == 0 {
            return;
        }
        let bar = ProgressBar::new(count as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/dim}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = bar;
    }

    fn on_resource_start(&mut self, identity: &str) {
        self.bar.set_message(identity.to_string());
    }

    fn on_resource_complete(&mut self, identity: &str, result: ApplyResult) {
        self.bar.inc(1);
        if self.quiet || (!result.is_change() && !self.verbose) {
            return;
        }
        self.print(&result_line(identity, result));
    }

    fn on_complete(&mut self, summary: &ReconcileSummary) {
        self.bar.finish_and_clear();
        if self.quiet {
            return;
        }
        ui::success(&summary_line(summary));
        if !summary.changed.is_empty() {
            ui::kv("changed", &summary.changed.join(", "));
        }
    }
}

impl Drop for ConsoleProgress {
    fn drop(&mut self) {
        // A failed run never reaches on_complete
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}
