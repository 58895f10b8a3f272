use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::DEFAULT_BUILD_DIR;
use crate::error::ManifestError;

/// A parsed `testbox.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub toolchain: ToolchainSection,
    #[serde(default, rename = "library")]
    pub libraries: Vec<LibrarySection>,
    #[serde(default, rename = "framework")]
    pub frameworks: Vec<FrameworkSection>,
    #[serde(default, rename = "test")]
    pub tests: Vec<TestSection>,
    pub discover: Option<DiscoverSection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub name: Option<String>,
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: None,
            build_dir: default_build_dir(),
        }
    }
}

fn default_build_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BUILD_DIR)
}

/// Compiler and archiver settings. Unset keys fall back to the orchestrator defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainSection {
    pub compiler: Option<String>,
    pub archiver: Option<String>,
    pub cflags: Option<Vec<String>>,
    pub arflags: Option<Vec<String>>,
    pub ldflags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibrarySection {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameworkSection {
    pub name: String,
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub lib_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub libs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestSection {
    pub name: String,
    pub source: PathBuf,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Register one test per `test_*` / `*_test` source file found under `dir`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoverSection {
    pub dir: PathBuf,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Manifest {
    /// Parse manifest text.
    pub fn parse(source: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let source = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "loaded manifest");
        Self::parse(&source)
    }
}
