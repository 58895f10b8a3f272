//! Build & test orchestrator.
//!
//! An [`Orchestrator`] owns one project's declarations and drives three phases:
//!
//! 1. **Declare**: `declare_library`, `declare_framework`, `declare_test` (or [`configure`] from a
//!    manifest). Every configuration error surfaces here.
//! 2. **Build**: [`Orchestrator::build_all`] runs the [`BuildPlan`] step by step, fail-fast.
//! 3. **Run**: [`Orchestrator::run_all`] executes every registered test in registration order and
//!    collects a [`TestReport`]; failures never stop the run.
//!
//! The toolchain and test executor are injected so each phase can be exercised without a compiler.

mod build;
mod configure;
mod report;
mod run;

use std::path::{Path, PathBuf};

use testbox_core::{ConfigError, FrameworkLinkage, FrameworkTarget, LibraryTarget, Registry, TestRegistry, TestTarget};

use crate::backend::{ArtifactLayout, BuildPlan, ProcessExecutor, ProcessToolchain, TestExecutor, Toolchain};
use crate::config::OrchestratorConfig;

pub use build::{BuildError, BuildResult};
pub use configure::{configure, discover_test_sources};
pub use report::{SilentReporter, TestEntry, TestReport, TestReporter, TestStatus, TestSummary};

pub struct Orchestrator {
    config: OrchestratorConfig,
    registry: Registry,
    toolchain: Box<dyn Toolchain>,
    executor: Box<dyn TestExecutor>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an empty orchestrator using the process toolchain and executor.
    ///
    /// A relative project root is made absolute against the current directory.
    ///
    /// ## Errors
    /// - `InvalidBuildDir` if the configured build directory is not a subdirectory of the project root.
    /// - `InvalidProjectRoot` if the root cannot be made absolute.
    pub fn new(config: OrchestratorConfig) -> Result<Self, ConfigError> {
        config.validate_build_dir()?;
        let config = config.with_absolute_root()?;
        Ok(Self {
            config,
            registry: Registry::new(),
            toolchain: Box::new(ProcessToolchain),
            executor: Box::new(ProcessExecutor),
        })
    }

    pub fn with_toolchain(mut self, toolchain: impl Toolchain + 'static) -> Self {
        self.toolchain = Box::new(toolchain);
        self
    }

    pub fn with_executor(mut self, executor: impl TestExecutor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tests(&self) -> &TestRegistry {
        self.registry.tests()
    }

    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(self.config.build_path())
    }

    /// The commands [`Orchestrator::build_all`] would run, in order.
    pub fn plan(&self) -> BuildPlan {
        BuildPlan::new(&self.registry, &self.config)
    }

    /// Declare a static library.
    ///
    /// ## Errors
    /// - `InvalidName` / `DuplicateTarget` for a bad or taken name.
    /// - `EmptySources` when `sources` is empty.
    /// - `MissingSource` when a source file does not exist under the project root.
    /// - `InvalidBuildDir` when a source or include directory lies inside the build directory.
    pub fn declare_library(
        &mut self,
        name: &str,
        sources: Vec<PathBuf>,
        include_dirs: Vec<PathBuf>,
    ) -> Result<&LibraryTarget, ConfigError> {
        for source in &sources {
            self.require_source(name, source)?;
        }
        for dir in &include_dirs {
            self.config.check_outside_build_dir(dir)?;
        }
        let library = self.registry.declare_library(name, sources, include_dirs)?;
        tracing::debug!(library = %library.name, sources = library.sources.len(), "declared library");
        Ok(library)
    }

    /// Declare a third-party framework shared by every test that names it.
    ///
    /// Its include and library directories must not lie inside the build directory.
    pub fn declare_framework(&mut self, name: &str, linkage: FrameworkLinkage) -> Result<&FrameworkTarget, ConfigError> {
        for dir in linkage.include_dirs.iter().chain(&linkage.lib_dirs) {
            self.config.check_outside_build_dir(dir)?;
        }
        let framework = self.registry.declare_framework(name, linkage)?;
        tracing::debug!(framework = %framework.name, "declared framework");
        Ok(framework)
    }

    /// Declare a test executable built from a single source file.
    ///
    /// ## Errors
    /// - `InvalidName` / `DuplicateTarget` for a bad or taken name.
    /// - `EmptyDependencies`, `UnresolvedDependency` or `InvalidDependency` for a bad dependency list.
    /// - `MissingSource` when `source` does not exist under the project root.
    /// - `InvalidBuildDir` when `source` lies inside the build directory.
    pub fn declare_test(
        &mut self,
        name: &str,
        source: impl Into<PathBuf>,
        dependencies: &[String],
    ) -> Result<&TestTarget, ConfigError> {
        self.declare_test_with_args(name, source, dependencies, Vec::new())
    }

    /// [`Orchestrator::declare_test`] with extra arguments passed to the executable at run time.
    pub fn declare_test_with_args(
        &mut self,
        name: &str,
        source: impl Into<PathBuf>,
        dependencies: &[String],
        args: Vec<String>,
    ) -> Result<&TestTarget, ConfigError> {
        let source = source.into();
        self.require_source(name, &source)?;
        let test = self.registry.declare_test(name, source, dependencies, args)?;
        tracing::debug!(test = %test.name, dependencies = test.dependencies.len(), "declared test");
        Ok(test)
    }

    fn require_source(&self, target: &str, source: &Path) -> Result<(), ConfigError> {
        if self.config.resolve(source).is_file() {
            self.config.check_outside_build_dir(source)
        } else {
            Err(ConfigError::MissingSource {
                target: target.to_string(),
                path: source.to_path_buf(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project() -> (tempfile::TempDir, Orchestrator) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("tests")).unwrap();
        fs::write(dir.path().join("src/core.cpp"), "int core() { return 42; }\n").unwrap();
        fs::write(dir.path().join("tests/t1.cpp"), "int main() { return 0; }\n").unwrap();
        let orchestrator = Orchestrator::new(OrchestratorConfig::new(dir.path())).unwrap();
        (dir, orchestrator)
    }

    #[test]
    fn test_declare_library_then_test() {
        let (_dir, mut orchestrator) = project();
        orchestrator
            .declare_library("core", vec![PathBuf::from("src/core.cpp")], Vec::new())
            .unwrap();
        let test = orchestrator
            .declare_test("t1", "tests/t1.cpp", &["core".to_string()])
            .unwrap();
        assert_eq!(test.name, "t1");
        assert_eq!(orchestrator.tests().len(), 1);
    }

    #[test]
    fn test_undeclared_library_fails() {
        let (_dir, mut orchestrator) = project();
        let err = orchestrator
            .declare_test("t2", "tests/t1.cpp", &["missing".to_string()])
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedDependency { .. }));
    }

    #[test]
    fn test_missing_sources_fail() {
        let (_dir, mut orchestrator) = project();
        let err = orchestrator
            .declare_library("core", vec![PathBuf::from("src/nope.cpp")], Vec::new())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingSource {
                target: "core".to_string(),
                path: PathBuf::from("src/nope.cpp"),
            }
        );

        orchestrator.declare_framework("gtest", FrameworkLinkage::default()).unwrap();
        let err = orchestrator
            .declare_test("t1", "tests/nope.cpp", &["gtest".to_string()])
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSource { .. }));
    }

    #[test]
    fn test_directory_is_not_a_source() {
        let (_dir, mut orchestrator) = project();
        let err = orchestrator
            .declare_library("core", vec![PathBuf::from("src")], Vec::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSource { .. }));
    }

    #[test]
    fn test_inputs_inside_build_dir_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/core.cpp"), "int core() { return 42; }\n").unwrap();
        fs::write(dir.path().join("src/t1.cpp"), "int main() { return 0; }\n").unwrap();
        let mut orchestrator = Orchestrator::new(OrchestratorConfig::new(dir.path()).with_build_dir("src")).unwrap();

        let err = orchestrator
            .declare_library("core", vec![PathBuf::from("src/core.cpp")], Vec::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBuildDir { .. }));

        let linkage = FrameworkLinkage {
            include_dirs: vec![PathBuf::from("src/gtest/include")],
            ..FrameworkLinkage::default()
        };
        let err = orchestrator.declare_framework("gtest", linkage).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBuildDir { .. }));

        orchestrator.declare_framework("gtest", FrameworkLinkage::default()).unwrap();
        let err = orchestrator
            .declare_test("t1", "src/t1.cpp", &["gtest".to_string()])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBuildDir { .. }));
        assert!(orchestrator.tests().is_empty());
        assert!(orchestrator.registry().libraries().is_empty());
    }

    #[test]
    fn test_relative_root_is_made_absolute() {
        let orchestrator = Orchestrator::new(OrchestratorConfig::new("proj")).unwrap();
        let root = &orchestrator.config().project_root;
        assert!(root.is_absolute());
        assert_eq!(*root, std::env::current_dir().unwrap().join("proj"));
        assert!(orchestrator.config().build_path().starts_with(root));
    }

    #[test]
    fn test_rejects_unsafe_build_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = Orchestrator::new(OrchestratorConfig::new(dir.path()).with_build_dir("..")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBuildDir { .. }));
    }
}
