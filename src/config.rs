//! Orchestrator configuration.
//!
//! An [`OrchestratorConfig`] is injected into every [`crate::Orchestrator`]; nothing reads process-wide
//! state after construction. The environment fallback for the toolchain is opt-in and only used by
//! the CLI.

use std::path::{Component, Path, PathBuf};

use testbox_core::ConfigError;
use testbox_manifest::{DEFAULT_BUILD_DIR, Manifest, ToolchainSection};

pub const DEFAULT_COMPILER: &str = "c++";
pub const DEFAULT_ARCHIVER: &str = "ar";

/// Compiler/archiver invocation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// Compiler driver used for compiling and linking
    pub compiler: String,
    /// Static archive tool
    pub archiver: String,
    /// Flags passed to every compile and link
    pub cflags: Vec<String>,
    /// Flags passed to the archiver before the archive path
    pub arflags: Vec<String>,
    /// Flags appended to every link
    pub ldflags: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: DEFAULT_COMPILER.to_string(),
            archiver: DEFAULT_ARCHIVER.to_string(),
            cflags: Vec::new(),
            arflags: vec!["rcs".to_string()],
            ldflags: Vec::new(),
        }
    }
}

impl ToolchainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    pub fn with_archiver(mut self, archiver: impl Into<String>) -> Self {
        self.archiver = archiver.into();
        self
    }

    pub fn with_cflags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cflags = flags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ldflags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ldflags = flags.into_iter().map(Into::into).collect();
        self
    }

    /// Build from a manifest `[toolchain]` section; unset keys keep the defaults.
    pub fn from_section(section: &ToolchainSection) -> Self {
        Self::from_section_with_env(section, |_| None)
    }

    /// Like [`ToolchainConfig::from_section`], but unset `compiler`/`archiver` first consult `CXX`/`AR`
    /// through `lookup`.
    pub fn from_section_with_env(section: &ToolchainSection, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            compiler: section
                .compiler
                .clone()
                .or_else(|| non_empty(lookup("CXX")))
                .unwrap_or(defaults.compiler),
            archiver: section
                .archiver
                .clone()
                .or_else(|| non_empty(lookup("AR")))
                .unwrap_or(defaults.archiver),
            cflags: section.cflags.clone().unwrap_or(defaults.cflags),
            arflags: section.arflags.clone().unwrap_or(defaults.arflags),
            ldflags: section.ldflags.clone().unwrap_or(defaults.ldflags),
        }
    }
}

/// Everything an orchestrator needs besides its declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Directory that relative source/include paths are resolved against
    pub project_root: PathBuf,
    /// Build output directory, relative to `project_root`
    pub build_dir: PathBuf,
    pub toolchain: ToolchainConfig,
    /// `[project] name`, shown in summaries
    pub project_name: Option<String>,
}

impl OrchestratorConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            toolchain: ToolchainConfig::default(),
            project_name: None,
        }
    }

    /// Derive the config for a manifest living in `project_root` (no environment fallback).
    pub fn from_manifest(manifest: &Manifest, project_root: impl Into<PathBuf>) -> Self {
        let mut config = Self::new(project_root)
            .with_build_dir(&manifest.project.build_dir)
            .with_toolchain(ToolchainConfig::from_section(&manifest.toolchain));
        config.project_name = manifest.project.name.clone();
        config
    }

    pub fn with_build_dir(mut self, build_dir: impl AsRef<Path>) -> Self {
        self.build_dir = build_dir.as_ref().to_path_buf();
        self
    }

    pub fn with_toolchain(mut self, toolchain: ToolchainConfig) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Make `project_root` absolute against the current directory.
    ///
    /// Tools run with the project root as working directory while every path handed to them is
    /// already joined onto the root, so a relative root would be applied twice.
    pub fn with_absolute_root(mut self) -> Result<Self, ConfigError> {
        let absolute = std::path::absolute(&self.project_root).map_err(|e| ConfigError::InvalidProjectRoot {
            path: self.project_root.clone(),
            message: e.to_string(),
        })?;
        self.project_root = normalize(&absolute);
        Ok(self)
    }

    /// Resolve a declared path against the project root. Absolute paths are returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Absolute (or root-relative) location of the build directory.
    pub fn build_path(&self) -> PathBuf {
        self.project_root.join(&self.build_dir)
    }

    /// Check the build directory is safe to delete and recreate on every build.
    ///
    /// The build directory must be a relative path strictly below the project root.
    pub fn validate_build_dir(&self) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidBuildDir {
            path: self.build_dir.clone(),
            reason,
        };

        if self.build_dir.is_absolute() || self.build_dir.has_root() {
            return Err(invalid("must be relative to the project root"));
        }

        let mut normal = 0usize;
        for component in self.build_dir.components() {
            match component {
                Component::ParentDir => return Err(invalid("contains path traversal (..)")),
                Component::Normal(_) => normal += 1,
                Component::CurDir => {}
                Component::Prefix(_) | Component::RootDir => {
                    return Err(invalid("must be relative to the project root"));
                }
            }
        }
        if normal == 0 {
            return Err(invalid("must be a subdirectory of the project root"));
        }
        Ok(())
    }

    /// Fail if `input` (a declared source, include or library directory) lies inside the build
    /// directory, which every build deletes.
    pub fn check_outside_build_dir(&self, input: &Path) -> Result<(), ConfigError> {
        if normalize(&self.resolve(input)).starts_with(normalize(&self.build_path())) {
            Err(ConfigError::InvalidBuildDir {
                path: self.build_dir.clone(),
                reason: "it holds declared inputs that every build would delete",
            })
        } else {
            Ok(())
        }
    }
}

/// Lexically drop `.` components and fold `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toolchain() {
        let config = ToolchainConfig::default();
        assert_eq!(config.compiler, "c++");
        assert_eq!(config.archiver, "ar");
        assert_eq!(config.arflags, vec!["rcs"]);
        assert!(config.cflags.is_empty());
    }

    #[test]
    fn test_builder_methods() {
        let config = ToolchainConfig::new()
            .with_compiler("clang++")
            .with_archiver("llvm-ar")
            .with_cflags(["-std=c++17", "-O2"])
            .with_ldflags(["-pthread"]);
        assert_eq!(config.compiler, "clang++");
        assert_eq!(config.archiver, "llvm-ar");
        assert_eq!(config.cflags, vec!["-std=c++17", "-O2"]);
        assert_eq!(config.ldflags, vec!["-pthread"]);
    }

    #[test]
    fn test_section_overrides_defaults() {
        let section = ToolchainSection {
            compiler: Some("g++".to_string()),
            cflags: Some(vec!["-Wall".to_string()]),
            ..ToolchainSection::default()
        };
        let config = ToolchainConfig::from_section(&section);
        assert_eq!(config.compiler, "g++");
        assert_eq!(config.archiver, "ar");
        assert_eq!(config.cflags, vec!["-Wall"]);
    }

    #[test]
    fn test_env_fallback_only_for_unset_keys() {
        let lookup = |key: &str| match key {
            "CXX" => Some("clang++".to_string()),
            "AR" => Some("llvm-ar".to_string()),
            _ => None,
        };
        let config = ToolchainConfig::from_section_with_env(&ToolchainSection::default(), lookup);
        assert_eq!(config.compiler, "clang++");
        assert_eq!(config.archiver, "llvm-ar");

        let section = ToolchainSection {
            compiler: Some("g++".to_string()),
            ..ToolchainSection::default()
        };
        let config = ToolchainConfig::from_section_with_env(&section, lookup);
        assert_eq!(config.compiler, "g++");
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let config =
            ToolchainConfig::from_section_with_env(&ToolchainSection::default(), |_| Some("  ".to_string()));
        assert_eq!(config.compiler, DEFAULT_COMPILER);
    }

    #[test]
    fn test_resolve_paths() {
        let config = OrchestratorConfig::new("/work/proj");
        assert_eq!(config.resolve(Path::new("src/a.cpp")), PathBuf::from("/work/proj/src/a.cpp"));
        assert_eq!(config.resolve(Path::new("/opt/gtest")), PathBuf::from("/opt/gtest"));
        assert_eq!(config.build_path(), PathBuf::from("/work/proj/build"));
    }

    #[test]
    fn test_build_dir_validation() {
        for ok in ["build", "out/debug", "./build"] {
            let config = OrchestratorConfig::new("/p").with_build_dir(ok);
            assert!(config.validate_build_dir().is_ok(), "{ok} should be accepted");
        }
        for bad in ["", ".", "..", "../build", "build/../..", "/tmp/build"] {
            let config = OrchestratorConfig::new("/p").with_build_dir(bad);
            assert!(config.validate_build_dir().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_inputs_inside_build_dir_are_rejected() {
        let config = OrchestratorConfig::new("/p").with_build_dir("src");
        for inside in ["src", "src/core.cpp", "./src/core.cpp", "lib/../src/a.cpp", "/p/src/a.cpp"] {
            let err = config.check_outside_build_dir(Path::new(inside)).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidBuildDir { .. }), "{inside} should be rejected");
        }
        for outside in ["tests/t1.cpp", "srcs/a.cpp", "include", "/opt/gtest/include"] {
            assert!(config.check_outside_build_dir(Path::new(outside)).is_ok(), "{outside} should be accepted");
        }
    }

    #[test]
    fn test_absolute_root() {
        let config = OrchestratorConfig::new("proj/./sub/..").with_absolute_root().unwrap();
        assert!(config.project_root.is_absolute());
        assert_eq!(config.project_root, std::env::current_dir().unwrap().join("proj"));

        let err = OrchestratorConfig::new("").with_absolute_root().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProjectRoot { .. }));
    }

    #[test]
    fn test_from_manifest_keeps_project_name() {
        let manifest = Manifest::parse("[project]\nname = \"demo\"\nbuild_dir = \"out\"\n").unwrap();
        let config = OrchestratorConfig::from_manifest(&manifest, "/p");
        assert_eq!(config.project_name.as_deref(), Some("demo"));
        assert_eq!(config.build_path(), PathBuf::from("/p/out"));
    }
}
