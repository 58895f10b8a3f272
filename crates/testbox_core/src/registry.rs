//! Declaration registry: the shared target namespace plus the ordered test registry.
//!
//! The registry is mutated only while targets are declared. Every check that can be decided without
//! touching the filesystem happens here, so a declared test always has a non-empty, fully resolved
//! dependency set.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::ConfigError;
use crate::names::validate_name;
use crate::targets::{Dependency, DependencyKind, FrameworkLinkage, FrameworkTarget, LibraryTarget, TargetKind, TestTarget};

/// Test targets keyed by name, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TestRegistry {
    tests: Vec<TestTarget>,
    index: HashMap<String, usize>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test. Duplicate names are rejected.
    pub fn register(&mut self, test: TestTarget) -> Result<&TestTarget, ConfigError> {
        if self.index.contains_key(&test.name) {
            return Err(ConfigError::DuplicateTarget {
                name: test.name,
                existing: TargetKind::Test,
            });
        }
        let slot = self.tests.len();
        self.index.insert(test.name.clone(), slot);
        self.tests.push(test);
        Ok(&self.tests[slot])
    }

    pub fn get(&self, name: &str) -> Option<&TestTarget> {
        self.index.get(name).map(|&i| &self.tests[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestTarget> {
        self.tests.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl<'a> IntoIterator for &'a TestRegistry {
    type Item = &'a TestTarget;
    type IntoIter = std::slice::Iter<'a, TestTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Every declared target, in declaration order per kind.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    libraries: Vec<LibraryTarget>,
    frameworks: Vec<FrameworkTarget>,
    tests: TestRegistry,
    kinds: HashMap<String, TargetKind>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a library.
    ///
    /// ## Errors
    /// - `InvalidName` / `DuplicateTarget` for a bad or taken name.
    /// - `EmptySources` when `sources` is empty.
    pub fn declare_library(
        &mut self,
        name: &str,
        sources: Vec<PathBuf>,
        include_dirs: Vec<PathBuf>,
    ) -> Result<&LibraryTarget, ConfigError> {
        self.claim_check(name)?;
        if sources.is_empty() {
            return Err(ConfigError::EmptySources { name: name.to_string() });
        }
        self.kinds.insert(name.to_string(), TargetKind::Library);
        self.libraries.push(LibraryTarget {
            name: name.to_string(),
            sources,
            include_dirs,
        });
        Ok(&self.libraries[self.libraries.len() - 1])
    }

    /// Declare a third-party framework.
    pub fn declare_framework(&mut self, name: &str, linkage: FrameworkLinkage) -> Result<&FrameworkTarget, ConfigError> {
        self.claim_check(name)?;
        self.kinds.insert(name.to_string(), TargetKind::Framework);
        self.frameworks.push(FrameworkTarget {
            name: name.to_string(),
            linkage,
        });
        Ok(&self.frameworks[self.frameworks.len() - 1])
    }

    /// Declare a test and append it to the test registry.
    ///
    /// ## Parameters
    /// - `dependencies`: names of already-declared libraries or frameworks. Repeated names collapse to
    ///   their first occurrence.
    ///
    /// ## Errors
    /// - `InvalidName` / `DuplicateTarget` for a bad or taken name.
    /// - `EmptyDependencies` when `dependencies` is empty.
    /// - `UnresolvedDependency` for an undeclared name, `InvalidDependency` for a test name.
    pub fn declare_test(
        &mut self,
        name: &str,
        source: PathBuf,
        dependencies: &[String],
        args: Vec<String>,
    ) -> Result<&TestTarget, ConfigError> {
        self.claim_check(name)?;
        if dependencies.is_empty() {
            return Err(ConfigError::EmptyDependencies { name: name.to_string() });
        }

        let mut resolved: Vec<Dependency> = Vec::with_capacity(dependencies.len());
        for dep in dependencies {
            let kind = match self.kinds.get(dep.as_str()) {
                Some(TargetKind::Library) => DependencyKind::Library,
                Some(TargetKind::Framework) => DependencyKind::Framework,
                Some(TargetKind::Test) => {
                    return Err(ConfigError::InvalidDependency {
                        target: name.to_string(),
                        dependency: dep.clone(),
                        kind: TargetKind::Test,
                    });
                }
                None => {
                    return Err(ConfigError::UnresolvedDependency {
                        target: name.to_string(),
                        dependency: dep.clone(),
                    });
                }
            };
            if !resolved.iter().any(|d| d.name == *dep) {
                resolved.push(Dependency { name: dep.clone(), kind });
            }
        }

        let test = self.tests.register(TestTarget {
            name: name.to_string(),
            source,
            dependencies: resolved,
            args,
        })?;
        self.kinds.insert(test.name.clone(), TargetKind::Test);
        Ok(test)
    }

    /// Fail if `name` is not a valid, unclaimed target name.
    fn claim_check(&self, name: &str) -> Result<(), ConfigError> {
        validate_name(name)?;
        if let Some(&existing) = self.kinds.get(name) {
            return Err(ConfigError::DuplicateTarget {
                name: name.to_string(),
                existing,
            });
        }
        Ok(())
    }

    pub fn kind_of(&self, name: &str) -> Option<TargetKind> {
        self.kinds.get(name).copied()
    }

    pub fn libraries(&self) -> &[LibraryTarget] {
        &self.libraries
    }

    pub fn library(&self, name: &str) -> Option<&LibraryTarget> {
        self.libraries.iter().find(|l| l.name == name)
    }

    pub fn frameworks(&self) -> &[FrameworkTarget] {
        &self.frameworks
    }

    pub fn framework(&self, name: &str) -> Option<&FrameworkTarget> {
        self.frameworks.iter().find(|f| f.name == name)
    }

    pub fn tests(&self) -> &TestRegistry {
        &self.tests
    }

    /// Total number of declared targets across all kinds.
    pub fn target_count(&self) -> usize {
        self.kinds.len()
    }
}
