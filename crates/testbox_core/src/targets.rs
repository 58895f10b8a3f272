//! Declared targets: libraries, frameworks and tests.
//!
//! Targets are created once at declaration time and never mutated afterwards. Paths are stored as
//! declared (usually relative to the project root); resolving them is the orchestrator's job.

use std::fmt;
use std::path::PathBuf;

/// The role a named target plays. All roles share one namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Library,
    Framework,
    Test,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Library => "library",
            TargetKind::Framework => "framework",
            TargetKind::Test => "test",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A static library built from project sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryTarget {
    pub name: String,
    /// Sources in compile order (never empty)
    pub sources: Vec<PathBuf>,
    /// Public include directories, also handed to dependents
    pub include_dirs: Vec<PathBuf>,
}

/// How to compile and link against a prebuilt third-party framework.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameworkLinkage {
    pub include_dirs: Vec<PathBuf>,
    /// Library search paths (`-L`)
    pub lib_dirs: Vec<PathBuf>,
    /// Libraries to link (`-l`), in link order. Empty for header-only frameworks.
    pub libs: Vec<String>,
}

/// A third-party test framework (googletest, Catch2, ...). Declared once, shared by every test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkTarget {
    pub name: String,
    pub linkage: FrameworkLinkage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Library,
    Framework,
}

impl From<DependencyKind> for TargetKind {
    fn from(kind: DependencyKind) -> Self {
        match kind {
            DependencyKind::Library => TargetKind::Library,
            DependencyKind::Framework => TargetKind::Framework,
        }
    }
}

/// A resolved reference from a test to a library or framework.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub name: String,
    pub kind: DependencyKind,
}

impl Dependency {
    pub fn library(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DependencyKind::Library,
        }
    }

    pub fn framework(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DependencyKind::Framework,
        }
    }
}

/// One independent test executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTarget {
    pub name: String,
    pub source: PathBuf,
    /// Resolved dependencies in declaration order (never empty, no duplicates)
    pub dependencies: Vec<Dependency>,
    /// Extra arguments passed to the executable when it runs
    pub args: Vec<String>,
}

impl TestTarget {
    pub fn libraries(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .filter(|d| d.kind == DependencyKind::Library)
            .map(|d| d.name.as_str())
    }

    pub fn frameworks(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .filter(|d| d.kind == DependencyKind::Framework)
            .map(|d| d.name.as_str())
    }
}
