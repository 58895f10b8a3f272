//! Test executor boundary.
//!
//! Separates spawning a built test executable from the orchestration and reporting around it, so the
//! run loop can be exercised without a compiler.

use std::io;
use std::path::Path;
use std::process::Command;

/// Captured result of one test process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionOutput {
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }
}

/// Runs a built test executable and captures its result.
pub trait TestExecutor {
    /// `Err` means the executable could not be launched (missing, not built, not executable).
    fn execute(&self, executable: &Path, args: &[String], working_dir: &Path) -> io::Result<ExecutionOutput>;
}

/// Spawns the test executable as a child process (current behavior).
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl TestExecutor for ProcessExecutor {
    fn execute(&self, executable: &Path, args: &[String], working_dir: &Path) -> io::Result<ExecutionOutput> {
        let output = Command::new(executable).args(args).current_dir(working_dir).output()?;
        Ok(ExecutionOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable_is_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProcessExecutor.execute(&dir.path().join("bin/test_missing"), &[], dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_builders() {
        let out = ExecutionOutput::exited(1).with_stdout("[  FAILED  ] 1 test").with_stderr("boom");
        assert_eq!(out.exit_code, Some(1));
        assert_eq!(out.stdout, "[  FAILED  ] 1 test");
        assert_eq!(out.stderr, "boom");
    }
}
