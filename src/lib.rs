#![forbid(unsafe_code)]
//! testbox: build C/C++ libraries and run their unit-test executables
//!
//! Libraries, third-party test frameworks and test executables are declared against an
//! [`Orchestrator`], usually from a `testbox.toml` manifest. The orchestrator validates every
//! declaration up front, builds all targets with an external compiler and archiver, then runs each
//! test executable and collects a [`TestReport`].
//!
//! The pure declaration model (names, targets, registry, configuration errors) lives in the
//! `testbox_core` crate; manifest parsing lives in `testbox_manifest`.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `backend` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Child processes**: A tool or test that fails to start is an error value (`BuildError::Spawn`, a failed
//!   `TestEntry`), never a panic.

pub mod backend;
pub mod cli;
pub mod config;
pub mod orchestrator;
pub mod version;

pub use config::{OrchestratorConfig, ToolchainConfig};
pub use orchestrator::{BuildError, BuildResult, Orchestrator, TestEntry, TestReport, TestReporter, TestStatus, configure};
pub use testbox_core::{ConfigError, Registry, TargetKind};
