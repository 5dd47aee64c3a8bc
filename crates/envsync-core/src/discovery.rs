//! Discovery of environment directories

use std::fs;
use std::path::{Path, PathBuf};

use envsync_config::DECLARATION_FILE;

use crate::{Error, Result};

/// One entry of the target directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentEntry {
    /// Entry name, used to label results and log lines
    pub name: String,
    /// Full path of the entry
    pub path: PathBuf,
}

impl EnvironmentEntry {
    /// Expected location of the declaration document
    pub fn declaration_path(&self) -> PathBuf {
        self.path.join(DECLARATION_FILE)
    }

    /// Whether the entry contains a declaration document
    pub fn has_declaration(&self) -> bool {
        self.declaration_path().is_file()
    }
}

/// List the entries of `target`, sorted by name.
///
/// Every entry is returned, including ones without a declaration, so that
/// the engine can report them as skipped.
///
/// # Errors
///
/// Returns [`Error::TargetDirectory`] if `target` is not a directory and
/// [`Error::NoEnvironments`] if it is empty.
pub fn discover_environments(target: &Path) -> Result<Vec<EnvironmentEntry>> {
    if !target.is_dir() {
        return Err(Error::TargetDirectory {
            path: target.to_path_buf(),
        });
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(target).map_err(|e| Error::io(target, e))? {
        let entry = entry.map_err(|e| Error::io(target, e))?;
        entries.push(EnvironmentEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }

    if entries.is_empty() {
        return Err(Error::NoEnvironments {
            path: target.to_path_buf(),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
