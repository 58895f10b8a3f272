use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::Orchestrator;
use crate::backend::{Artifact, StepKind};

/// A build that stopped at its first failing step.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to prepare build directory `{}`: {source}", path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch `{program}` while building `{target}`: {source}")]
    Spawn {
        target: String,
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{kind} step for `{target}` failed ({status})")]
    Step {
        target: String,
        kind: StepKind,
        status: String,
        command: String,
        stderr: String,
    },
}

impl BuildError {
    /// The target whose step failed, if the failure belongs to one.
    pub fn target(&self) -> Option<&str> {
        match self {
            BuildError::Prepare { .. } => None,
            BuildError::Spawn { target, .. } | BuildError::Step { target, .. } => Some(target),
        }
    }
}

/// Every artifact produced by a successful build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Libraries first, then test executables, in declaration order
    pub artifacts: Vec<Artifact>,
    pub duration: Duration,
}

impl Orchestrator {
    /// Regenerate the build directory and build every declared target.
    ///
    /// Steps run sequentially: every library (compile, then archive), then every test executable
    /// (compile + link). The first step that cannot be launched or exits unsuccessfully aborts the build.
    ///
    /// ## Errors
    /// - `BuildError::Prepare` if the build directory cannot be recreated.
    /// - `BuildError::Spawn` / `BuildError::Step` naming the target whose step failed.
    #[tracing::instrument(skip_all, fields(
        libraries = self.registry.libraries().len(),
        tests = self.registry.tests().len(),
    ))]
    pub fn build_all(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let plan = self.plan();
        let build_path = self.config.build_path();

        let prepare = |source| BuildError::Prepare {
            path: build_path.clone(),
            source,
        };
        if build_path.exists() {
            fs::remove_dir_all(&build_path).map_err(prepare)?;
        }
        for dir in plan.directories() {
            fs::create_dir_all(dir).map_err(prepare)?;
        }

        for step in plan.steps() {
            tracing::debug!(step_target = %step.target, kind = %step.kind, output = %step.output.display(), "running step");
            let output = self
                .toolchain
                .run(step, &self.config.project_root)
                .map_err(|source| BuildError::Spawn {
                    target: step.target.clone(),
                    program: step.program.clone(),
                    source,
                })?;

            if !output.success {
                tracing::debug!(step_target = %step.target, status = %output.status, "step failed");
                return Err(BuildError::Step {
                    target: step.target.clone(),
                    kind: step.kind,
                    status: output.status,
                    command: step.command_line(),
                    stderr: output.stderr,
                });
            }
        }

        let artifacts = plan.into_artifacts();
        let duration = start.elapsed();
        tracing::info!(artifacts = artifacts.len(), elapsed_ms = duration.as_millis() as u64, "build finished");
        Ok(BuildResult { artifacts, duration })
    }
}
