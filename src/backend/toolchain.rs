//! Toolchain boundary.
//!
//! The orchestrator hands each [`BuildStep`] to a [`Toolchain`]. The default implementation spawns the
//! step's program. Tests substitute a recording toolchain.

use std::io;
use std::path::Path;
use std::process::Command;

use super::plan::BuildStep;

/// Outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    pub success: bool,
    /// Human-readable exit status (`exit status: 1`, `signal: 9`, ...)
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl StepOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            status: "exit status: 0".to_string(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn failed(status: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            status: status.into(),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs compile/archive/link steps.
pub trait Toolchain {
    /// Run `step` with `working_dir` as the current directory.
    ///
    /// `Err` means the tool could not be launched at all; a tool that ran and failed is reported
    /// through [`StepOutput::success`].
    fn run(&self, step: &BuildStep, working_dir: &Path) -> io::Result<StepOutput>;
}

/// Spawns the real compiler and archiver (current behavior).
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessToolchain;

impl Toolchain for ProcessToolchain {
    fn run(&self, step: &BuildStep, working_dir: &Path) -> io::Result<StepOutput> {
        let output = Command::new(&step.program)
            .args(&step.args)
            .current_dir(working_dir)
            .output()?;

        Ok(StepOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::plan::StepKind;
    use std::path::PathBuf;

    #[test]
    fn test_missing_program_is_a_launch_error() {
        let step = BuildStep {
            target: "core".to_string(),
            kind: StepKind::Compile,
            program: "testbox-definitely-not-a-compiler".to_string(),
            args: Vec::new(),
            output: PathBuf::from("x.o"),
        };
        let dir = std::env::temp_dir();
        assert!(ProcessToolchain.run(&step, &dir).is_err());
    }
}
