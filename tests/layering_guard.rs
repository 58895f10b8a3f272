//! Layering guardrails for the workspace.
//!
//! `testbox_core` holds the declaration model and must stay free of I/O and process handling: its
//! `[dependencies]` may only list error-reporting crates. This test scans its `Cargo.toml` and fails
//! on anything else.

const CORE_ALLOWED: &[&str] = &["thiserror", "miette"];

fn dependency_names(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_crate_has_no_io_dependencies() {
    let manifest = include_str!("../crates/testbox_core/Cargo.toml");
    for name in dependency_names(manifest) {
        assert!(
            CORE_ALLOWED.contains(&name.as_str()),
            "`{name}` must not appear in testbox_core [dependencies]; keep I/O in the `testbox` crate"
        );
    }
}

#[test]
fn manifest_crate_does_not_depend_on_core() {
    let manifest = include_str!("../crates/testbox_manifest/Cargo.toml");
    assert!(
        !dependency_names(manifest).iter().any(|n| n == "testbox_core"),
        "testbox_manifest is a plain data format and must not depend on testbox_core"
    );
}
