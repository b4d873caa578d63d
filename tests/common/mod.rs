//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory holding a `shuriken.toml` and its sources.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a project with `manifest` as its `shuriken.toml`
    pub fn with_manifest(manifest: &str) -> Self {
        let project = Self::new();
        project.create_file("shuriken.toml", manifest);
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Path of `name` inside the project, as a string
    pub fn join(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run the shuriken binary in the project directory
    #[allow(dead_code)]
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_shuriken"))
            .current_dir(self.path())
            .args(args)
            .output()
            .expect("Failed to execute shuriken")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample manifest: compile every C file under `src/` and link `hello`
#[allow(dead_code)]
pub const SAMPLE_MANIFEST: &str = r#"
[project]
name = "hello"
version = "1.0"
variant = "linux64"

[ninja]
columns = 0

[[phase]]
name = "compile"
executor = "gcc-compile"
inputs = ["src/**/*.c"]
optimize = "2"

[[phase]]
name = "link"
executor = "gcc-link"
inputs_from = ["compile"]
output = "hello"
libraries = ["m"]
"#;

/// Create a project from [`SAMPLE_MANIFEST`] with two sources
#[allow(dead_code)]
pub fn sample_project() -> TestProject {
    let project = TestProject::with_manifest(SAMPLE_MANIFEST);
    project.create_file("src/main.c", "int main(void) { return 0; }\n");
    project.create_file("src/util/strings.c", "int length(void) { return 0; }\n");
    project
}
