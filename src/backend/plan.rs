//! Build planning.
//!
//! A [`BuildPlan`] is the exact, ordered list of tool invocations a build performs. It is a pure
//! function of the declarations and the configuration, so two builds of unchanged declarations run
//! identical commands.

use std::fmt;
use std::path::{Path, PathBuf};

use testbox_core::{DependencyKind, LibraryTarget, Registry, TestTarget};

use super::layout::ArtifactLayout;
use crate::config::OrchestratorConfig;

/// What a build step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Source file → object file
    Compile,
    /// Object files → static library
    Archive,
    /// Test source + libraries → executable
    Link,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StepKind::Compile => "compile",
            StepKind::Archive => "archive",
            StepKind::Link => "link",
        })
    }
}

/// One tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    /// Target this step belongs to
    pub target: String,
    pub kind: StepKind,
    pub program: String,
    pub args: Vec<String>,
    /// File the step writes
    pub output: PathBuf,
}

impl BuildStep {
    /// Shell-like rendering of the command, for dry runs and error messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote_arg)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Library,
    Executable,
}

/// A file produced for a declared target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub target: String,
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
    steps: Vec<BuildStep>,
    artifacts: Vec<Artifact>,
    directories: Vec<PathBuf>,
}

impl BuildPlan {
    /// Plan every library (in declaration order), then every test (in registry order).
    pub fn new(registry: &Registry, config: &OrchestratorConfig) -> Self {
        let layout = ArtifactLayout::new(config.build_path());
        let mut plan = BuildPlan::default();

        plan.directories.push(layout.lib_dir());
        plan.directories.push(layout.bin_dir());

        for library in registry.libraries() {
            plan.add_library(library, &layout, config);
        }
        for test in registry.tests() {
            plan.add_test(test, registry, &layout, config);
        }
        plan
    }

    fn add_library(&mut self, library: &LibraryTarget, layout: &ArtifactLayout, config: &OrchestratorConfig) {
        let toolchain = &config.toolchain;
        self.directories.push(layout.object_dir(&library.name));

        let includes: Vec<String> = library
            .include_dirs
            .iter()
            .map(|dir| include_flag(&config.resolve(dir)))
            .collect();

        let mut objects = Vec::with_capacity(library.sources.len());
        for (index, source) in library.sources.iter().enumerate() {
            let object = layout.object_path(&library.name, index, source);

            let mut args = toolchain.cflags.clone();
            args.extend(includes.iter().cloned());
            args.push("-c".to_string());
            args.push(path_arg(&config.resolve(source)));
            args.push("-o".to_string());
            args.push(path_arg(&object));

            self.steps.push(BuildStep {
                target: library.name.clone(),
                kind: StepKind::Compile,
                program: toolchain.compiler.clone(),
                args,
                output: object.clone(),
            });
            objects.push(object);
        }

        let archive = layout.archive_path(&library.name);
        let mut args = toolchain.arflags.clone();
        args.push(path_arg(&archive));
        args.extend(objects.iter().map(|o| path_arg(o)));

        self.steps.push(BuildStep {
            target: library.name.clone(),
            kind: StepKind::Archive,
            program: toolchain.archiver.clone(),
            args,
            output: archive.clone(),
        });
        self.artifacts.push(Artifact {
            target: library.name.clone(),
            kind: ArtifactKind::Library,
            path: archive,
        });
    }

    fn add_test(&mut self, test: &TestTarget, registry: &Registry, layout: &ArtifactLayout, config: &OrchestratorConfig) {
        let toolchain = &config.toolchain;
        let executable = layout.executable_path(&test.name);

        let mut includes: Vec<String> = Vec::new();
        let mut link: Vec<String> = Vec::new();

        let mut libraries = test.libraries().peekable();
        if libraries.peek().is_some() {
            link.push(format!("-L{}", layout.lib_dir().display()));
            link.extend(libraries.map(|name| format!("-l{name}")));
        }

        for dep in &test.dependencies {
            match dep.kind {
                DependencyKind::Library => {
                    if let Some(library) = registry.library(&dep.name) {
                        includes.extend(library.include_dirs.iter().map(|d| include_flag(&config.resolve(d))));
                    }
                }
                DependencyKind::Framework => {
                    if let Some(framework) = registry.framework(&dep.name) {
                        let linkage = &framework.linkage;
                        includes.extend(linkage.include_dirs.iter().map(|d| include_flag(&config.resolve(d))));
                        link.extend(
                            linkage
                                .lib_dirs
                                .iter()
                                .map(|d| format!("-L{}", config.resolve(d).display())),
                        );
                        link.extend(linkage.libs.iter().map(|lib| format!("-l{lib}")));
                    }
                }
            }
        }
        dedup_preserving_order(&mut includes);

        let mut args = toolchain.cflags.clone();
        args.extend(includes);
        args.push(path_arg(&config.resolve(&test.source)));
        args.push("-o".to_string());
        args.push(path_arg(&executable));
        args.extend(link);
        args.extend(toolchain.ldflags.iter().cloned());

        self.steps.push(BuildStep {
            target: test.name.clone(),
            kind: StepKind::Link,
            program: toolchain.compiler.clone(),
            args,
            output: executable.clone(),
        });
        self.artifacts.push(Artifact {
            target: test.name.clone(),
            kind: ArtifactKind::Executable,
            path: executable,
        });
    }

    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    /// Artifacts in build order: libraries first, then test executables.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Directories that must exist before the first step runs.
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn into_artifacts(self) -> Vec<Artifact> {
        self.artifacts
    }

    /// One command line per step.
    pub fn render(&self) -> String {
        self.steps
            .iter()
            .map(|step| format!("[{}] {}", step.target, step.command_line()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn include_flag(dir: &Path) -> String {
    format!("-I{}", dir.display())
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

fn dedup_preserving_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ToolchainConfig;
    use testbox_core::FrameworkLinkage;

    fn sample_registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .declare_library(
                "gtestbox",
                vec![PathBuf::from("src/person.cpp"), PathBuf::from("src/util.cpp")],
                vec![PathBuf::from("include")],
            )
            .unwrap();
        registry
            .declare_framework(
                "gtest",
                FrameworkLinkage {
                    include_dirs: vec![PathBuf::from("/opt/gtest/include")],
                    lib_dirs: vec![PathBuf::from("/opt/gtest/lib")],
                    libs: vec!["gtest".to_string(), "pthread".to_string()],
                },
            )
            .unwrap();
        registry
            .declare_test(
                "test_hello",
                PathBuf::from("tests/test_hello.cpp"),
                &["gtestbox".to_string(), "gtest".to_string()],
                Vec::new(),
            )
            .unwrap();
        registry
    }

    fn sample_config() -> OrchestratorConfig {
        OrchestratorConfig::new("/proj").with_toolchain(ToolchainConfig::new().with_cflags(["-std=c++17"]))
    }

    #[test]
    fn test_plan_orders_libraries_before_tests() {
        let plan = BuildPlan::new(&sample_registry(), &sample_config());
        let kinds: Vec<StepKind> = plan.steps().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StepKind::Compile, StepKind::Compile, StepKind::Archive, StepKind::Link]
        );
        let targets: Vec<&str> = plan.artifacts().iter().map(|a| a.target.as_str()).collect();
        assert_eq!(targets, vec!["gtestbox", "test_hello"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_plan_snapshot() {
        let plan = BuildPlan::new(&sample_registry(), &sample_config());
        insta::assert_snapshot!(plan.render(), @r"
        [gtestbox] c++ -std=c++17 -I/proj/include -c /proj/src/person.cpp -o /proj/build/obj/gtestbox/0-person.o
        [gtestbox] c++ -std=c++17 -I/proj/include -c /proj/src/util.cpp -o /proj/build/obj/gtestbox/1-util.o
        [gtestbox] ar rcs /proj/build/lib/libgtestbox.a /proj/build/obj/gtestbox/0-person.o /proj/build/obj/gtestbox/1-util.o
        [test_hello] c++ -std=c++17 -I/proj/include -I/opt/gtest/include /proj/tests/test_hello.cpp -o /proj/build/bin/test_hello -L/proj/build/lib -lgtestbox -L/opt/gtest/lib -lgtest -lpthread
        ");
    }

    #[test]
    fn test_directories_cover_every_output() {
        let plan = BuildPlan::new(&sample_registry(), &sample_config());
        for step in plan.steps() {
            let parent = step.output.parent().unwrap();
            assert!(
                plan.directories().iter().any(|d| d == parent),
                "missing directory for {}",
                step.output.display()
            );
        }
    }

    #[test]
    fn test_framework_only_test_has_no_project_lib_dir() {
        let mut registry = Registry::new();
        registry.declare_framework("catch2", FrameworkLinkage::default()).unwrap();
        registry
            .declare_test("t", PathBuf::from("t.cpp"), &["catch2".to_string()], Vec::new())
            .unwrap();
        let plan = BuildPlan::new(&registry, &OrchestratorConfig::new("/p"));
        let link = &plan.steps()[0];
        assert!(!link.args.iter().any(|a| a.starts_with("-L")));
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let step = BuildStep {
            target: "t".to_string(),
            kind: StepKind::Link,
            program: "c++".to_string(),
            args: vec!["/my dir/a.cpp".to_string(), String::new()],
            output: PathBuf::from("t"),
        };
        assert_eq!(step.command_line(), "c++ \"/my dir/a.cpp\" \"\"");
    }
}
