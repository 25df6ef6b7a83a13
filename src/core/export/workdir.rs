//! Scoped working directory for multi-chunk exports

use crate::domain::Result;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Prefix of every working directory name
pub const WORKDIR_PREFIX: &str = "bundle-export-";

/// Uniquely named temporary directory removed on drop
///
/// Rendered chunk files live here until the archive has been streamed.
/// Removal failures are logged, never raised.
#[derive(Debug)]
pub struct WorkingDirectory {
    path: PathBuf,
}

impl WorkingDirectory {
    /// Creates a fresh directory under `parent`
    ///
    /// The name is `bundle-export-<uuid v4>`; creation fails rather than
    /// reuse an existing directory.
    pub fn create_in(parent: &Path) -> Result<Self> {
        let path = parent.join(format!("{WORKDIR_PREFIX}{}", Uuid::new_v4()));
        fs::create_dir(&path)?;
        tracing::debug!(path = %path.display(), "Created working directory");
        Ok(Self { path })
    }

    /// Creates a fresh directory under the system temp directory
    pub fn create() -> Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the directory
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for WorkingDirectory {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed working directory");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove working directory"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_created_and_removed_on_drop() {
        let parent = TempDir::new().unwrap();
        let path = {
            let workdir = WorkingDirectory::create_in(parent.path()).unwrap();
            fs::write(workdir.file("report_1.csv"), "a").unwrap();
            assert!(workdir.path().is_dir());
            workdir.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_names_are_unique() {
        let parent = TempDir::new().unwrap();
        let a = WorkingDirectory::create_in(parent.path()).unwrap();
        let b = WorkingDirectory::create_in(parent.path()).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(WORKDIR_PREFIX));
    }

    #[test]
    fn test_missing_parent_fails() {
        let parent = TempDir::new().unwrap();
        assert!(WorkingDirectory::create_in(&parent.path().join("missing")).is_err());
    }

    #[test]
    fn test_drop_tolerates_external_removal() {
        let parent = TempDir::new().unwrap();
        let workdir = WorkingDirectory::create_in(parent.path()).unwrap();
        fs::remove_dir_all(workdir.path()).unwrap();
        drop(workdir);
    }
}
