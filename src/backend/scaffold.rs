//! Project scaffolding for `testbox init`.
//!
//! Generates:
//! - testbox.toml with one library, the googletest framework and test discovery
//! - include/<name>/person.h and src/person.cpp
//! - tests/test_hello.cpp and tests/test_person.cpp
//!
//! Existing files are never overwritten.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use testbox_core::validate_name;
use testbox_manifest::MANIFEST_FILE;

use crate::version::TESTBOX_VERSION;

/// Generator for a minimal library + googletest project
pub struct ProjectScaffold {
    /// Directory the project is written into
    output_dir: PathBuf,
    /// Library (and C++ namespace) name
    name: String,
}

impl ProjectScaffold {
    /// Create a scaffold; an invalid or missing `name` falls back to the directory name, then `project`.
    pub fn new(output_dir: impl AsRef<Path>, name: Option<&str>) -> Self {
        let output_dir = output_dir.as_ref().to_path_buf();
        let from_dir = output_dir
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()));
        let name = name
            .map(str::to_string)
            .into_iter()
            .chain(from_dir)
            .find(|candidate| validate_name(candidate).is_ok())
            .unwrap_or_else(|| "project".to_string());
        Self { output_dir, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_FILE)
    }

    /// Write the project files, returning the ones actually created.
    pub fn generate(&self) -> io::Result<Vec<PathBuf>> {
        let namespace = cpp_identifier(&self.name);
        let files = [
            (PathBuf::from(MANIFEST_FILE), self.manifest()),
            (PathBuf::from(".gitignore"), "/build/\n".to_string()),
            (
                PathBuf::from("include").join(&self.name).join("person.h"),
                person_header(&namespace),
            ),
            (PathBuf::from("src/person.cpp"), person_source(&self.name, &namespace)),
            (PathBuf::from("tests/test_hello.cpp"), hello_test(&namespace)),
            (PathBuf::from("tests/test_person.cpp"), person_test(&self.name, &namespace)),
        ];

        let mut created = Vec::new();
        for (relative, contents) in files {
            let path = self.output_dir.join(relative);
            if path.exists() {
                tracing::info!(path = %path.display(), "keeping existing file");
                continue;
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, contents)?;
            created.push(path);
        }
        Ok(created)
    }

    fn manifest(&self) -> String {
        format!(
            r#"# Generated by testbox {version}

[project]
name = "{name}"
build_dir = "build"

[toolchain]
cflags = ["-std=c++17", "-Wall"]

[[library]]
name = "{name}"
sources = ["src/person.cpp"]
include_dirs = ["include"]

# Point include_dirs/lib_dirs at your googletest checkout if it is not installed system-wide.
[[framework]]
name = "gtest"
libs = ["gtest", "pthread"]

[discover]
dir = "tests"
dependencies = ["{name}", "gtest"]
"#,
            version = TESTBOX_VERSION,
            name = self.name,
        )
    }
}

/// Map a target name onto a C++ identifier (`my-lib.2` → `my_lib_2`).
fn cpp_identifier(name: &str) -> String {
    let ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{ident}")
    } else {
        ident
    }
}

fn person_header(namespace: &str) -> String {
    format!(
        r#"#pragma once

#include <ostream>
#include <string>

namespace {namespace} {{

class Person {{
public:
    Person();
    Person(std::string name, int age);

    const std::string& name() const;
    int age() const;

    void print(std::ostream& out) const;

private:
    std::string name_;
    int age_;
}};

}}  // namespace {namespace}
"#
    )
}

fn person_source(name: &str, namespace: &str) -> String {
    format!(
        r#"#include "{name}/person.h"

#include <utility>

namespace {namespace} {{

Person::Person() : name_("anonymous"), age_(0) {{}}

Person::Person(std::string name, int age) : name_(std::move(name)), age_(age) {{}}

const std::string& Person::name() const {{ return name_; }}

int Person::age() const {{ return age_; }}

void Person::print(std::ostream& out) const {{
    out << name_ << " (" << age_ << ")";
}}

}}  // namespace {namespace}
"#
    )
}

fn hello_test(namespace: &str) -> String {
    format!(
        r#"#include "gtest/gtest.h"

namespace {namespace}::tests::test_hello {{

TEST(HelloTest, BasicAssertions) {{
    EXPECT_STRNE("hello", "world");
    EXPECT_EQ(7 * 6, 42);
}}

}}  // namespace {namespace}::tests::test_hello

int main(int argc, char** argv) {{
    ::testing::InitGoogleTest(&argc, argv);
    return RUN_ALL_TESTS();
}}
"#
    )
}

fn person_test(name: &str, namespace: &str) -> String {
    format!(
        r#"#include "gtest/gtest.h"
#include "{name}/person.h"

#include <sstream>

namespace {namespace}::tests::test_person {{

TEST(PersonTest, DefaultConstructed) {{
    Person person;
    EXPECT_EQ(person.name(), "anonymous");
    EXPECT_EQ(person.age(), 0);
}}

TEST(PersonTest, Prints) {{
    std::ostringstream out;
    Person("Ada", 36).print(out);
    EXPECT_EQ(out.str(), "Ada (36)");
}}

}}  // namespace {namespace}::tests::test_person

int main(int argc, char** argv) {{
    ::testing::InitGoogleTest(&argc, argv);
    return RUN_ALL_TESTS();
}}
"#
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use testbox_manifest::Manifest;

    #[test]
    fn test_cpp_identifier() {
        assert_eq!(cpp_identifier("gtestbox"), "gtestbox");
        assert_eq!(cpp_identifier("my-lib.2"), "my_lib_2");
        assert_eq!(cpp_identifier("2d"), "_2d");
    }

    #[test]
    fn test_invalid_name_falls_back() {
        let scaffold = ProjectScaffold::new("/definitely/not/here", Some("bad name"));
        assert_eq!(scaffold.name(), "project");
    }

    #[test]
    fn test_generated_manifest_parses() {
        let scaffold = ProjectScaffold::new("/tmp", Some("gtestbox"));
        let manifest = Manifest::parse(&scaffold.manifest()).unwrap();
        assert_eq!(manifest.libraries[0].name, "gtestbox");
        assert_eq!(manifest.frameworks[0].name, "gtest");
        assert_eq!(
            manifest.discover.map(|d| d.dependencies),
            Some(vec!["gtestbox".to_string(), "gtest".to_string()])
        );
    }

    #[test]
    fn test_generate_writes_project_and_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/person.cpp"), "// mine").unwrap();

        let scaffold = ProjectScaffold::new(dir.path(), Some("box"));
        let created = scaffold.generate().unwrap();

        assert!(created.contains(&dir.path().join("testbox.toml")));
        assert!(dir.path().join("include/box/person.h").exists());
        assert!(dir.path().join("tests/test_hello.cpp").exists());
        assert!(!created.contains(&dir.path().join("src/person.cpp")));
        assert_eq!(fs::read_to_string(dir.path().join("src/person.cpp")).unwrap(), "// mine");
    }
}
