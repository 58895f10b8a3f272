use std::time::Instant;

use testbox_core::TestTarget;

use super::Orchestrator;
use super::report::{SilentReporter, TestEntry, TestReport, TestReporter};

impl Orchestrator {
    /// Run every registered test, in registration order, without printing anything.
    pub fn run_all(&self) -> TestReport {
        self.run_all_with(&mut SilentReporter)
    }

    /// Run every registered test, in registration order.
    ///
    /// A failing or unlaunchable test is recorded and the run continues, so the report always has one
    /// entry per registered test.
    pub fn run_all_with(&self, reporter: &mut dyn TestReporter) -> TestReport {
        self.run_selected(self.tests().iter().collect(), reporter)
    }

    /// Run the registered tests whose name contains `filter`, in registration order.
    pub fn run_matching(&self, filter: &str, reporter: &mut dyn TestReporter) -> TestReport {
        let selected = self.tests().iter().filter(|t| t.name.contains(filter)).collect();
        self.run_selected(selected, reporter)
    }

    #[tracing::instrument(skip_all, fields(tests = tests.len()))]
    fn run_selected(&self, tests: Vec<&TestTarget>, reporter: &mut dyn TestReporter) -> TestReport {
        let start = Instant::now();
        reporter.on_run_start(tests.len());

        let mut entries = Vec::with_capacity(tests.len());
        for test in tests {
            reporter.on_test_start(&test.name);
            let entry = self.run_one(test);
            reporter.on_test_complete(&entry);
            entries.push(entry);
        }

        let report = TestReport::new(entries, start.elapsed());
        let summary = report.summary();
        tracing::info!(passed = summary.passed, failed = summary.failed, "test run finished");
        reporter.on_run_complete(&report);
        report
    }

    fn run_one(&self, test: &TestTarget) -> TestEntry {
        let executable = self.layout().executable_path(&test.name);
        let start = Instant::now();
        tracing::debug!(test = %test.name, executable = %executable.display(), "running test");

        match self.executor.execute(&executable, &test.args, &self.config.project_root) {
            Ok(output) => TestEntry::from_output(&test.name, output, start.elapsed()),
            Err(e) => TestEntry::launch_failed(
                &test.name,
                format!("failed to launch `{}`: {}", executable.display(), e),
                start.elapsed(),
            ),
        }
    }
}
