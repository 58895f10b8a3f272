//! Build directory layout.
//!
//! ```text
//! <build_dir>/
//!   obj/<library>/<index>-<stem>.o
//!   lib/lib<library>.a
//!   bin/<test>
//! ```

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};

/// Paths of every artifact inside one build directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn object_dir(&self, library: &str) -> PathBuf {
        self.root.join("obj").join(library)
    }

    /// Object file for the `index`-th source of `library`.
    ///
    /// The index prefix keeps `a/util.cpp` and `b/util.cpp` from colliding.
    pub fn object_path(&self, library: &str, index: usize, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source".to_string());
        self.object_dir(library).join(format!("{index}-{stem}.o"))
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    pub fn archive_path(&self, library: &str) -> PathBuf {
        self.lib_dir().join(format!("lib{library}.a"))
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn executable_path(&self, test: &str) -> PathBuf {
        self.bin_dir().join(format!("{test}{EXE_SUFFIX}"))
    }
}
