//! The `testbox.toml` manifest.
//!
//! A manifest declares the project's libraries, the test frameworks they are tested with, and the
//! test executables. It is a plain data format: validating names and dependencies is done by
//! `testbox_core` when the declarations are applied.
//!
//! ```toml
//! [project]
//! name = "gtestbox"
//!
//! [[library]]
//! name = "gtestbox"
//! sources = ["src/person.cpp"]
//! include_dirs = ["include"]
//!
//! [[framework]]
//! name = "gtest"
//! libs = ["gtest", "pthread"]
//!
//! [[test]]
//! name = "test_hello"
//! source = "tests/test_hello.cpp"
//! dependencies = ["gtestbox", "gtest"]
//! ```

mod error;
mod schema;

pub use error::ManifestError;
pub use schema::{
    DiscoverSection, FrameworkSection, LibrarySection, Manifest, ProjectSection, TestSection, ToolchainSection,
};

/// File name looked up in the current directory when no manifest path is given.
pub const MANIFEST_FILE: &str = "testbox.toml";

/// Build directory used when `[project] build_dir` is not set.
pub const DEFAULT_BUILD_DIR: &str = "build";
