//! Configuration errors raised while declaring targets.
//!
//! Every variant is surfaced at declaration time and never recovered from. The CLI renders the
//! diagnostic code and help next to the message.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::targets::TargetKind;

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid target name `{name}`: {reason}")]
    #[diagnostic(
        code(testbox::invalid_name),
        help("names may contain ASCII letters, digits, `_`, `-` and `.`, and must start with a letter, digit or `_`")
    )]
    InvalidName { name: String, reason: &'static str },

    #[error("target `{name}` is already declared as a {existing}")]
    #[diagnostic(
        code(testbox::duplicate_target),
        help("libraries, frameworks and tests share one namespace; rename one of them")
    )]
    DuplicateTarget { name: String, existing: TargetKind },

    #[error("library `{name}` declares no source files")]
    #[diagnostic(code(testbox::empty_sources), help("add at least one entry to `sources`"))]
    EmptySources { name: String },

    #[error("test `{name}` declares no dependencies")]
    #[diagnostic(
        code(testbox::empty_dependencies),
        help("list the library under test and the test framework in `dependencies`")
    )]
    EmptyDependencies { name: String },

    #[error("`{target}` depends on undeclared target `{dependency}`")]
    #[diagnostic(
        code(testbox::unresolved_dependency),
        help("declare the library or framework before the tests that use it")
    )]
    UnresolvedDependency { target: String, dependency: String },

    #[error("`{target}` cannot depend on `{dependency}`, which is a {kind}")]
    #[diagnostic(
        code(testbox::invalid_dependency),
        help("tests may only depend on libraries and frameworks")
    )]
    InvalidDependency {
        target: String,
        dependency: String,
        kind: TargetKind,
    },

    #[error("source file `{}` for `{target}` does not exist", path.display())]
    #[diagnostic(code(testbox::missing_source), help("paths are resolved relative to the manifest directory"))]
    MissingSource { target: String, path: PathBuf },

    #[error("invalid build directory `{}`: {reason}", path.display())]
    #[diagnostic(
        code(testbox::invalid_build_dir),
        help("the build directory is deleted on every build; use a relative subdirectory such as `build`")
    )]
    InvalidBuildDir { path: PathBuf, reason: &'static str },

    #[error("cannot use `{}` as the project root: {message}", path.display())]
    #[diagnostic(code(testbox::invalid_project_root))]
    InvalidProjectRoot { path: PathBuf, message: String },

    #[error("failed to discover tests in `{}`: {message}", dir.display())]
    #[diagnostic(code(testbox::discovery))]
    Discovery { dir: PathBuf, message: String },
}

impl ConfigError {
    /// Name of the target the error is about, when there is one.
    pub fn target(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidName { name, .. }
            | ConfigError::DuplicateTarget { name, .. }
            | ConfigError::EmptySources { name }
            | ConfigError::EmptyDependencies { name } => Some(name),
            ConfigError::UnresolvedDependency { target, .. }
            | ConfigError::InvalidDependency { target, .. }
            | ConfigError::MissingSource { target, .. } => Some(target),
            ConfigError::InvalidBuildDir { .. }
            | ConfigError::InvalidProjectRoot { .. }
            | ConfigError::Discovery { .. } => None,
        }
    }
}
