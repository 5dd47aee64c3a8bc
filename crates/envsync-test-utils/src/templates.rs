//! [`TestTemplates`] builder for `environment_templates` trees.

use std::fs;
use std::path::{Path, PathBuf};

use envsync_config::DECLARATION_FILE;
use tempfile::TempDir;

/// A well-formed organization owner id (24 hexadecimal characters).
pub const OWNER_ID: &str = "5f1b2c3d4e5f6a7b8c9d0e1f";

/// A temporary `environment_templates` directory.
///
/// # Example
///
/// ```rust
/// use envsync_test_utils::TestTemplates;
///
/// let templates = TestTemplates::new()
///     .with_environment("demo", "name: demo\n")
///     .with_empty_directory("notes");
/// assert!(templates.path().join("demo/environment.yaml").is_file());
/// ```
pub struct TestTemplates {
    temp_dir: TempDir,
    target: PathBuf,
}

impl Default for TestTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTemplates {
    /// Create an empty `environment_templates` directory inside a new temp dir.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("environment_templates");
        fs::create_dir_all(&target).unwrap();
        Self { temp_dir, target }
    }

    /// The temporary directory that contains `environment_templates`
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The `environment_templates` directory itself
    pub fn path(&self) -> &Path {
        &self.target
    }

    /// Add `<directory>/environment.yaml` with the given content
    pub fn with_environment(self, directory: &str, content: &str) -> Self {
        self.write(directory, content);
        self
    }

    /// Add a directory that holds no declaration
    pub fn with_empty_directory(self, directory: &str) -> Self {
        fs::create_dir_all(self.target.join(directory)).unwrap();
        self
    }

    /// Write (or overwrite) a declaration, returning its path
    pub fn write(&self, directory: &str, content: &str) -> PathBuf {
        let dir = self.target.join(directory);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(DECLARATION_FILE);
        fs::write(&path, content).unwrap();
        path
    }

    /// Minimal valid declaration named `name`
    pub fn minimal(name: &str) -> String {
        format!("name: {name}\nimage: quay.io/example/base:latest\n")
    }
}
