//! Apply a manifest's declarations to a fresh orchestrator.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use testbox_core::{ConfigError, FrameworkLinkage};
use testbox_manifest::Manifest;

use super::Orchestrator;
use crate::config::OrchestratorConfig;

/// Source extensions picked up by test discovery
const TEST_SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx"];

/// Declare everything in `manifest`: libraries, frameworks, explicit tests, then discovered tests.
///
/// Each failed declaration is recorded and configuration continues, so the caller sees every error at
/// once. Any error means no orchestrator is returned.
#[tracing::instrument(skip_all, fields(root = %config.project_root.display()))]
pub fn configure(manifest: &Manifest, config: OrchestratorConfig) -> Result<Orchestrator, Vec<ConfigError>> {
    let mut orchestrator = Orchestrator::new(config).map_err(|e| vec![e])?;
    let mut errors = Vec::new();

    for library in &manifest.libraries {
        if let Err(e) = orchestrator.declare_library(&library.name, library.sources.clone(), library.include_dirs.clone()) {
            errors.push(e);
        }
    }

    for framework in &manifest.frameworks {
        let linkage = FrameworkLinkage {
            include_dirs: framework.include_dirs.clone(),
            lib_dirs: framework.lib_dirs.clone(),
            libs: framework.libs.clone(),
        };
        if let Err(e) = orchestrator.declare_framework(&framework.name, linkage) {
            errors.push(e);
        }
    }

    for test in &manifest.tests {
        if let Err(e) =
            orchestrator.declare_test_with_args(&test.name, test.source.clone(), &test.dependencies, test.args.clone())
        {
            errors.push(e);
        }
    }

    if let Some(discover) = &manifest.discover {
        let config = orchestrator.config().clone();
        let explicit: Vec<PathBuf> = manifest.tests.iter().map(|t| config.resolve(&t.source)).collect();

        match config
            .check_outside_build_dir(&discover.dir)
            .and_then(|()| discover_test_sources(&config, &discover.dir).map_err(|e| discovery_error(&discover.dir, e)))
        {
            Ok(sources) => {
                for source in sources {
                    if explicit.contains(&config.resolve(&source)) {
                        tracing::debug!(source = %source.display(), "skipping explicitly declared test source");
                        continue;
                    }
                    let Some(name) = source.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                        continue;
                    };
                    if let Err(e) =
                        orchestrator.declare_test_with_args(&name, source, &discover.dependencies, discover.args.clone())
                    {
                        errors.push(e);
                    }
                }
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        tracing::info!(
            targets = orchestrator.registry().target_count(),
            tests = orchestrator.tests().len(),
            "configured"
        );
        Ok(orchestrator)
    } else {
        Err(errors)
    }
}

fn discovery_error(dir: &Path, error: io::Error) -> ConfigError {
    ConfigError::Discovery {
        dir: dir.to_path_buf(),
        message: error.to_string(),
    }
}

/// Find test sources under `dir` (relative to the project root).
///
/// A test source is named `test_*` or `*_test` with a C/C++ extension. Hidden directories and the build
/// directory are skipped. Paths are returned relative to the project root where possible, sorted.
pub fn discover_test_sources(config: &OrchestratorConfig, dir: &Path) -> io::Result<Vec<PathBuf>> {
    let root = config.resolve(dir);
    if !root.is_dir() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "not a directory"));
    }

    let mut found = Vec::new();
    walk(&root, &config.build_path(), &mut found)?;
    found.sort();

    Ok(found
        .into_iter()
        .map(|path| match path.strip_prefix(&config.project_root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => path,
        })
        .collect())
}

fn walk(dir: &Path, build_path: &Path, found: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if path.is_dir() {
            if name.starts_with('.') || path == build_path {
                continue;
            }
            walk(&path, build_path, found)?;
        } else if is_test_source(&path) {
            found.push(path);
        } else if name.starts_with("test_") {
            tracing::warn!(path = %path.display(), "ignoring test-like file with an unsupported extension");
        }
    }
    Ok(())
}

fn is_test_source(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    TEST_SOURCE_EXTENSIONS.contains(&ext) && (stem.starts_with("test_") || stem.ends_with("_test"))
}
