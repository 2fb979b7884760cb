//! Terminal feedback while a job is being polled.
//!
//! Uses `indicatif` for the spinner and `console` for colored result lines.
//! [`PollProgress::hidden`] turns everything off, which is what tests,
//! `--debug` and non-interactive runs use. Log lines go through
//! [`LogWriter`] so they never land in the middle of a spinner frame.

use std::io::{self, Write};
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::fmt::MakeWriter;

use crate::error::TideError;
use crate::state_machine::{PollReport, PollState};

#[derive(Clone)]
pub struct PollProgress {
    pb: ProgressBar,
    enabled: bool,
    green: Style,
    red: Style,
    yellow: Style,
}

impl PollProgress {
    /// Spinner for interactive runs. Debug runs stream logs instead, and a
    /// stderr that is not a terminal gets no spinner either.
    pub fn for_mode(debug: bool, interactive: bool) -> Self {
        if debug || !interactive {
            Self::hidden()
        } else {
            Self::spinner()
        }
    }

    fn spinner() -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Self::with_bar(pb, true)
    }

    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden(), false)
    }

    fn with_bar(pb: ProgressBar, enabled: bool) -> Self {
        Self {
            pb,
            enabled,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    #[cfg(test)]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_message(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    /// A `tracing` writer that pauses the spinner around each log line.
    pub fn log_writer(&self) -> LogWriter {
        LogWriter {
            pb: self.pb.clone(),
        }
    }

    /// Shows the latest status next to the attempt counter.
    pub fn update(&self, state: PollState, attempt: u32, max: u32, status: &str) {
        self.pb
            .set_message(format!("{state} {attempt}/{max}: {status}"));
    }

    pub fn transient(&self, attempt: u32, max: u32, reason: &str) {
        self.pb.println(format!(
            "  {} Attempt {attempt}/{max}: {reason}",
            self.yellow.apply_to("↻")
        ));
    }

    /// Removes the spinner without printing an outcome.
    pub fn clear(&self) {
        self.pb.finish_and_clear();
    }

    /// Clears the spinner and prints the outcome of the run.
    pub fn finish(&self, result: &Result<PollReport, TideError>) {
        self.pb.finish_and_clear();
        if !self.enabled {
            return;
        }
        match result {
            Ok(report) => eprintln!(
                "  {} {} ({} bytes)",
                self.green.apply_to("✓"),
                report.output.display(),
                report.bytes_written
            ),
            Err(e) => eprintln!("  {} {e}", self.red.apply_to("✗")),
        }
    }
}

/// Stderr writer that suspends the spinner while a line is written.
#[derive(Clone)]
pub struct LogWriter {
    pb: ProgressBar,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pb.suspend(|| io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.pb.suspend(|| io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Pretty JSON rendering of a report, for debug output.
pub fn render_report(report: &PollReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_default()
}
