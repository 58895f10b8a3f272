//! Backend: turn declarations into tool invocations and run the results.
//!
//! ## Modules
//!
//! - `layout` - where artifacts live inside the build directory
//! - `plan` - ordered compile/archive/link commands
//! - `toolchain` - compiler/archiver boundary
//! - `executor` - test process boundary
//! - `scaffold` - sample project generation for `testbox init`

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]

pub mod executor;
pub mod layout;
pub mod plan;
pub mod scaffold;
pub mod toolchain;

pub use executor::{ExecutionOutput, ProcessExecutor, TestExecutor};
pub use layout::ArtifactLayout;
pub use plan::{Artifact, ArtifactKind, BuildPlan, BuildStep, StepKind};
pub use scaffold::ProjectScaffold;
pub use toolchain::{ProcessToolchain, StepOutput, Toolchain};
