//! Builds and runs a real C++ project when a compiler and archiver are available.
//!
//! Skipped (passes trivially) on machines without `c++` and `ar` on the PATH.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use testbox::{Orchestrator, OrchestratorConfig, TestStatus};

fn tool_available(program: &str, arg: &str) -> bool {
    Command::new(program)
        .arg(arg)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn builds_and_runs_with_system_toolchain() {
    if !tool_available("c++", "--version") || !tool_available("ar", "--version") {
        eprintln!("skipping: c++/ar not available");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "include/core.h", "int answer();\n");
    write(dir.path(), "src/core.cpp", "#include \"core.h\"\nint answer() { return 42; }\n");
    write(
        dir.path(),
        "tests/test_answer.cpp",
        "#include \"core.h\"\nint main() { return answer() == 42 ? 0 : 1; }\n",
    );
    write(
        dir.path(),
        "tests/test_wrong.cpp",
        "#include \"core.h\"\nint main() { return answer() == 41 ? 0 : 1; }\n",
    );

    let mut orch = Orchestrator::new(OrchestratorConfig::new(dir.path())).unwrap();
    orch.declare_library("core", vec![PathBuf::from("src/core.cpp")], vec![PathBuf::from("include")])
        .unwrap();
    orch.declare_test("test_answer", "tests/test_answer.cpp", &["core".to_string()])
        .unwrap();
    orch.declare_test("test_wrong", "tests/test_wrong.cpp", &["core".to_string()])
        .unwrap();

    orch.build_all().unwrap();
    let report = orch.run_all();

    assert_eq!(report.len(), 2);
    assert_eq!(report.entries[0].status, TestStatus::Passed);
    assert_eq!(report.entries[1].status, TestStatus::Failed);
    assert_eq!(report.entries[1].exit_code, Some(1));
}
