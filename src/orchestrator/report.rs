//! Test run results and the reporter hooks invoked while tests run.

use std::time::Duration;

use serde::Serialize;

use crate::backend::ExecutionOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

/// Result of running one registered test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestEntry {
    pub name: String,
    pub status: TestStatus,
    /// `None` when the process was killed by a signal or never started
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Why the test could not be run at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl TestEntry {
    /// A test passes iff its process exited with code 0.
    pub fn from_output(name: impl Into<String>, output: ExecutionOutput, duration: Duration) -> Self {
        let status = if output.exit_code == Some(0) {
            TestStatus::Passed
        } else {
            TestStatus::Failed
        };
        Self {
            name: name.into(),
            status,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            error: None,
            duration_ms: millis(duration),
        }
    }

    /// A test whose executable could not be launched.
    pub fn launch_failed(name: impl Into<String>, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failed,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(error.into()),
            duration_ms: millis(duration),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }

    /// Short reason for a failure (`exit code 1`, `terminated by signal`, launch error).
    pub fn failure_reason(&self) -> Option<String> {
        if self.passed() {
            return None;
        }
        Some(match (&self.error, self.exit_code) {
            (Some(error), _) => error.clone(),
            (None, Some(code)) => format!("exit code {code}"),
            (None, None) => "terminated by signal".to_string(),
        })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

/// All entries of one run, in the order the tests ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestReport {
    pub entries: Vec<TestEntry>,
    pub duration_ms: u64,
}

impl TestReport {
    pub fn new(entries: Vec<TestEntry>, duration: Duration) -> Self {
        Self {
            entries,
            duration_ms: millis(duration),
        }
    }

    /// Overall status: pass iff every individual test passed.
    pub fn passed(&self) -> bool {
        self.entries.iter().all(TestEntry::passed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestEntry> {
        self.entries.iter().filter(|e| !e.passed())
    }

    pub fn summary(&self) -> TestSummary {
        let passed = self.entries.iter().filter(|e| e.passed()).count();
        TestSummary {
            total: self.entries.len(),
            passed,
            failed: self.entries.len() - passed,
        }
    }
}

/// Hooks invoked while tests run.
///
/// Implement this trait to customize test output format (console, JSON, TAP, ...).
pub trait TestReporter {
    /// Called once with the number of tests about to run
    fn on_run_start(&mut self, _test_count: usize) {}

    /// Called before a test process is launched
    fn on_test_start(&mut self, _name: &str) {}

    /// Called when a test completes
    fn on_test_complete(&mut self, entry: &TestEntry);

    /// Called when all tests have completed
    fn on_run_complete(&mut self, report: &TestReport);
}

/// Reporter that prints nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl TestReporter for SilentReporter {
    fn on_test_complete(&mut self, _entry: &TestEntry) {}

    fn on_run_complete(&mut self, _report: &TestReport) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_decides_status() {
        let pass = TestEntry::from_output("a", ExecutionOutput::exited(0), Duration::from_millis(3));
        let fail = TestEntry::from_output("b", ExecutionOutput::exited(1), Duration::ZERO);
        let killed = TestEntry::from_output("c", ExecutionOutput::default(), Duration::ZERO);
        assert!(pass.passed());
        assert_eq!(pass.duration_ms, 3);
        assert_eq!(fail.failure_reason().as_deref(), Some("exit code 1"));
        assert_eq!(killed.failure_reason().as_deref(), Some("terminated by signal"));
        assert_eq!(pass.failure_reason(), None);
    }

    #[test]
    fn test_launch_failure_is_a_failed_entry() {
        let entry = TestEntry::launch_failed("t", "failed to launch `bin/t`: not found", Duration::ZERO);
        assert!(!entry.passed());
        assert_eq!(entry.exit_code, None);
        assert_eq!(entry.failure_reason().as_deref(), Some("failed to launch `bin/t`: not found"));
    }

    #[test]
    fn test_report_summary() {
        let report = TestReport::new(
            vec![
                TestEntry::from_output("a", ExecutionOutput::exited(0), Duration::ZERO),
                TestEntry::from_output("b", ExecutionOutput::exited(2), Duration::ZERO),
                TestEntry::from_output("c", ExecutionOutput::exited(0), Duration::ZERO),
            ],
            Duration::from_millis(10),
        );
        assert!(!report.passed());
        assert_eq!(
            report.summary(),
            TestSummary {
                total: 3,
                passed: 2,
                failed: 1
            }
        );
        assert_eq!(report.failures().map(|e| e.name.as_str()).collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_empty_report_passes() {
        assert!(TestReport::default().passed());
    }

    #[test]
    fn test_entry_serialization_omits_missing_error() {
        let entry = TestEntry::from_output("a", ExecutionOutput::exited(0).with_stdout("ok"), Duration::ZERO);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "passed");
        assert_eq!(json["exit_code"], 0);
        assert!(json.get("error").is_none());
    }
}
