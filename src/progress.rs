//! Progress reporting for the CLI
//!
//! Provides a live spinner fed from the engine's concurrently-readable
//! `seen` counter, plus header/summary printing.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Snapshot of one run's counters, for display
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    /// Identifiers whose retrieval was attempted
    pub seen: u64,
    /// Records yielded to the consumer
    pub yielded: u64,
    /// Per-record errors reported
    pub errors: u64,
}

impl RunStats {
    pub fn records_per_second(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            self.seen as f64 / secs
        } else {
            0.0
        }
    }
}

/// Spinner-based progress display
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, stats: &RunStats, elapsed: Duration) {
        let msg = format!(
            "Seen: {} | Yielded: {} | Errors: {} | Rate: {:.0}/s",
            format_number(stats.seen),
            format_number(stats.yielded),
            format_number(stats.errors),
            stats.records_per_second(elapsed),
        );
        self.bar.set_message(msg);
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Print a header at the start of a run
pub fn print_header(iterator_uri: &str, identifiers: usize) {
    println!();
    println!(
        "{} {}",
        style("recstream").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Iterator:").bold(), iterator_uri);
    println!("  {} {}", style("Identifiers:").bold(), identifiers);
    println!();
}

/// Print a summary of the run
pub fn print_summary(stats: &RunStats, duration: Duration, stopped_early: bool) {
    println!();
    if stopped_early {
        println!("{}", style("Stream Stopped Early").yellow().bold());
    } else {
        println!("{}", style("Stream Complete").green().bold());
    }
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Seen:").bold(), format_number(stats.seen));
    println!(
        "  {} {}",
        style("Yielded:").bold(),
        format_number(stats.yielded)
    );
    if stats.errors > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(stats.errors)
        );
    }
    println!(
        "  {} {:.1}s ({:.0} records/sec)",
        style("Duration:").bold(),
        duration.as_secs_f64(),
        stats.records_per_second(duration),
    );
    println!();
}
