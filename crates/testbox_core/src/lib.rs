//! Provide the pure target model shared by the testbox orchestrator and its tooling.
//!
//! This crate is intentionally small and dependency-light. It knows how targets are named, how a test's
//! dependency list resolves against what has already been declared, and how tests are kept in
//! registration order.
//!
//! ## Notes
//!
//! - This is a “model core” crate: **no IO**, no global state, no process spawning. Checks that need the
//!   filesystem (source files existing, build directories) live in the orchestrator.
//! - Libraries, frameworks and tests share a single name namespace.

pub mod errors;
pub mod names;
pub mod registry;
pub mod targets;

pub use errors::ConfigError;
pub use names::validate_name;
pub use registry::{Registry, TestRegistry};
pub use targets::{Dependency, DependencyKind, FrameworkLinkage, FrameworkTarget, LibraryTarget, TargetKind, TestTarget};
