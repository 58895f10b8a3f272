//! `testbox test`: build, run every registered test, report.
//!
//! ## Reporters
//!
//! Output goes through the [`TestReporter`] trait, so the run loop does not care about formats:
//! - [`ConsoleReporter`] prints one `PASS`/`FAIL` line per test, the output of failed tests and a
//!   summary count.
//! - [`JsonReporter`] prints the whole report as a single JSON document once the run completes.

use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use serde::Serialize;

use super::commands::{format_build_error, load_project};
use super::{CliError, CliResult, ExitCode, ReportFormat};
use crate::orchestrator::{TestEntry, TestReport, TestReporter, TestSummary};

/// Options for a test run
#[derive(Debug, Clone)]
pub struct TestOptions {
    pub filter: Option<String>,
    pub verbose: bool,
    pub format: ReportFormat,
    /// Rebuild before running
    pub build: bool,
}

/// Run the project's tests.
///
/// Returns `TESTS_FAILED` (with an empty message, the summary is already printed) unless every test
/// passed.
pub fn run_tests(manifest_path: &Path, options: &TestOptions) -> CliResult<ExitCode> {
    let orchestrator = load_project(manifest_path)?;

    if options.build {
        orchestrator
            .build_all()
            .map_err(|e| CliError::build(format_build_error(&e)))?;
    }

    let mut reporter: Box<dyn TestReporter> = match options.format {
        ReportFormat::Console => Box::new(ConsoleReporter::new(options.verbose)),
        ReportFormat::Json => Box::new(JsonReporter::new(io::stdout())),
    };

    let report = match options.filter.as_deref() {
        Some(filter) => orchestrator.run_matching(filter, reporter.as_mut()),
        None => orchestrator.run_all_with(reporter.as_mut()),
    };

    if report.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Err(CliError::new("", ExitCode::TESTS_FAILED))
    }
}

// ============================================================================
// Console reporter
// ============================================================================

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD_GREEN: &str = "\x1b[1;32m";
const BOLD_RED: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

/// Default console reporter
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
    verbose: bool,
    color: bool,
    /// Set after the first failed write; later output is dropped
    broken: bool,
}

impl ConsoleReporter {
    /// Print to stdout, colored when stdout is a terminal.
    pub fn new(verbose: bool) -> Self {
        let color = io::stdout().is_terminal();
        Self::with_writer(io::stdout(), verbose, color)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn with_writer(out: W, verbose: bool, color: bool) -> Self {
        Self {
            out,
            verbose,
            color,
            broken: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write one line. The first failure is logged, then the reporter goes quiet.
    fn line(&mut self, text: impl fmt::Display) {
        if self.broken {
            return;
        }
        if let Err(e) = writeln!(self.out, "{text}") {
            self.broken = true;
            tracing::error!(error = %e, "failed to write test output");
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_run_start(&mut self, test_count: usize) {
        self.line(format_args!("running {test_count} test(s)"));
    }

    fn on_test_complete(&mut self, entry: &TestEntry) {
        let mut line = if entry.passed() {
            format!("{} {}", self.paint(GREEN, "PASS"), entry.name)
        } else {
            format!("{} {}", self.paint(RED, "FAIL"), entry.name)
        };
        match (entry.failure_reason(), self.verbose) {
            (Some(reason), true) => line.push_str(&format!(" ({reason}, {}ms)", entry.duration_ms)),
            (Some(reason), false) => line.push_str(&format!(" ({reason})")),
            (None, true) => line.push_str(&format!(" ({}ms)", entry.duration_ms)),
            (None, false) => {}
        }
        self.line(line);
    }

    fn on_run_complete(&mut self, report: &TestReport) {
        let failures: Vec<&TestEntry> = report.failures().collect();
        if !failures.is_empty() {
            self.line("");
            self.line("failures:");
            for entry in failures {
                self.line("");
                self.line(format_args!("---- {} ----", entry.name));
                if let Some(error) = &entry.error {
                    self.line(error);
                }
                for stream in [&entry.stdout, &entry.stderr] {
                    let text = stream.trim_end();
                    if !text.is_empty() {
                        self.line(text);
                    }
                }
            }
        }

        self.line("");
        let summary = report.summary();
        let banner = format!(
            "====== {} in {:.2}s ======",
            summary_parts(&summary),
            report.duration_ms as f64 / 1000.0
        );
        let color = if report.passed() { BOLD_GREEN } else { BOLD_RED };
        let banner = self.paint(color, &banner);
        self.line(banner);
        if self.broken {
            return;
        }
        if let Err(e) = self.out.flush() {
            self.broken = true;
            tracing::error!(error = %e, "failed to write test output");
        }
    }
}

fn summary_parts(summary: &TestSummary) -> String {
    if summary.total == 0 {
        return "no tests ran".to_string();
    }
    let mut parts = Vec::new();
    if summary.passed > 0 {
        parts.push(format!("{} passed", summary.passed));
    }
    if summary.failed > 0 {
        parts.push(format!("{} failed", summary.failed));
    }
    parts.join(", ")
}

// ============================================================================
// JSON reporter
// ============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    success: bool,
    summary: TestSummary,
    duration_ms: u64,
    tests: &'a [TestEntry],
}

/// Writes the report as one JSON document when the run completes
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TestReporter for JsonReporter<W> {
    fn on_test_complete(&mut self, _entry: &TestEntry) {}

    fn on_run_complete(&mut self, report: &TestReport) {
        let document = JsonDocument {
            success: report.passed(),
            summary: report.summary(),
            duration_ms: report.duration_ms,
            tests: &report.entries,
        };
        let written = serde_json::to_writer_pretty(&mut self.out, &document)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            tracing::error!(error = %e, "failed to write JSON report");
        }
    }
}
