//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use testbox_core::{ConfigError, DependencyKind};
use testbox_manifest::{Manifest, ManifestError};

use super::{CliError, CliResult, ExitCode};
use crate::backend::{ArtifactKind, ProjectScaffold};
use crate::config::{OrchestratorConfig, ToolchainConfig};
use crate::orchestrator::{BuildError, Orchestrator, configure};

// ============================================================================
// Project loading (shared by every manifest-driven command)
// ============================================================================

/// Directory containing the manifest, made absolute when possible.
pub fn project_root(manifest_path: &Path) -> PathBuf {
    let parent = match manifest_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::canonicalize(&parent).unwrap_or(parent)
}

/// Load the manifest and declare everything in it.
///
/// The toolchain falls back to `CXX` / `AR` for keys the manifest leaves unset.
pub fn load_project(manifest_path: &Path) -> CliResult<Orchestrator> {
    let manifest = Manifest::load(manifest_path).map_err(|e| CliError::configuration(render_diagnostic(&e)))?;
    let toolchain = ToolchainConfig::from_section_with_env(&manifest.toolchain, |key| std::env::var(key).ok());
    let config = OrchestratorConfig::from_manifest(&manifest, project_root(manifest_path)).with_toolchain(toolchain);

    configure(&manifest, config).map_err(|errors| CliError::configuration(format_config_errors(&errors)))
}

/// Render one diagnostic as `error[code]: message` plus an optional help line.
pub fn render_diagnostic(diagnostic: &dyn Diagnostic) -> String {
    let mut out = match diagnostic.code() {
        Some(code) => format!("error[{code}]: {diagnostic}"),
        None => format!("error: {diagnostic}"),
    };
    if let Some(help) = diagnostic.help() {
        out.push_str(&format!("\n  help: {help}"));
    }
    out
}

/// List every configuration error, followed by a count.
pub fn format_config_errors(errors: &[ConfigError]) -> String {
    let mut msg = String::new();
    for error in errors {
        msg.push_str(&render_diagnostic(error));
        msg.push('\n');
    }
    msg.push_str(&format!("configuration failed with {} error(s)", errors.len()));
    msg
}

/// Describe a failed build, including the tool's stderr.
pub fn format_build_error(error: &BuildError) -> String {
    let mut msg = match error.target() {
        Some(target) => format!("error: build failed for target `{target}`\n  {error}"),
        None => format!("error: build failed\n  {error}"),
    };
    if let BuildError::Step { command, stderr, .. } = error {
        msg.push_str(&format!("\n  command: {command}"));
        let stderr = stderr.trim_end();
        if !stderr.is_empty() {
            msg.push('\n');
            msg.push_str(stderr);
        }
    }
    msg
}

// ============================================================================
// Commands
// ============================================================================

pub fn configure_project(manifest_path: &Path) -> CliResult<ExitCode> {
    let orchestrator = load_project(manifest_path)?;
    println!("{}", configure_summary(&orchestrator));
    println!("build directory: {}", orchestrator.config().build_path().display());
    Ok(ExitCode::SUCCESS)
}

/// One-line count of the declared targets, naming the project when the manifest does.
fn configure_summary(orchestrator: &Orchestrator) -> String {
    let registry = orchestrator.registry();
    let counts = format!(
        "{} library(s), {} framework(s), {} test(s)",
        registry.libraries().len(),
        registry.frameworks().len(),
        registry.tests().len()
    );
    match &orchestrator.config().project_name {
        Some(name) => format!("configured project `{name}`: {counts}"),
        None => format!("configured {counts}"),
    }
}

pub fn build_project(manifest_path: &Path, dry_run: bool) -> CliResult<ExitCode> {
    let orchestrator = load_project(manifest_path)?;

    if dry_run {
        let plan = orchestrator.plan();
        if !plan.steps().is_empty() {
            println!("{}", plan.render());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let result = orchestrator
        .build_all()
        .map_err(|e| CliError::build(format_build_error(&e)))?;

    for artifact in &result.artifacts {
        let kind = match artifact.kind {
            ArtifactKind::Library => "library",
            ArtifactKind::Executable => "test",
        };
        println!("{:>8}  {}  {}", kind, artifact.target, artifact.path.display());
    }
    println!(
        "built {} artifact(s) in {:.2}s",
        result.artifacts.len(),
        result.duration.as_secs_f64()
    );
    Ok(ExitCode::SUCCESS)
}

pub fn list_targets(manifest_path: &Path) -> CliResult<ExitCode> {
    let orchestrator = load_project(manifest_path)?;
    let registry = orchestrator.registry();

    for library in registry.libraries() {
        println!("library    {} ({} source(s))", library.name, library.sources.len());
    }
    for framework in registry.frameworks() {
        println!("framework  {}", framework.name);
    }
    for test in registry.tests() {
        let deps: Vec<String> = test
            .dependencies
            .iter()
            .map(|d| match d.kind {
                DependencyKind::Library => d.name.clone(),
                DependencyKind::Framework => format!("{} (framework)", d.name),
            })
            .collect();
        println!("test       {} -> {}", test.name, deps.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

pub fn clean_project(manifest_path: &Path) -> CliResult<ExitCode> {
    let orchestrator = load_project(manifest_path)?;
    let build_path = orchestrator.config().build_path();

    if build_path.exists() {
        fs::remove_dir_all(&build_path)
            .map_err(|e| CliError::io(format!("error: cannot remove `{}`: {}", build_path.display(), e)))?;
        println!("removed {}", build_path.display());
    }
    Ok(ExitCode::SUCCESS)
}

pub fn init_project(dir: &Path, name: Option<&str>) -> CliResult<ExitCode> {
    let scaffold = ProjectScaffold::new(dir, name);
    let manifest_path = scaffold.manifest_path();
    if manifest_path.exists() {
        let error = ManifestError::AlreadyExists { path: manifest_path };
        return Err(CliError::configuration(render_diagnostic(&error)));
    }

    let created = scaffold
        .generate()
        .map_err(|e| CliError::io(format!("error: cannot create project in `{}`: {}", dir.display(), e)))?;
    for path in &created {
        println!("created {}", path.display());
    }
    println!("initialized project `{}`", scaffold.name());
    Ok(ExitCode::SUCCESS)
}
