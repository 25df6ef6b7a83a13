//! Filesystem-backed template lookup
//!
//! Resolves template names relative to a root directory. Names that would
//! escape the root (absolute paths, `..` components) never exist.

use super::traits::TemplateSource;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Template source rooted at a directory
#[derive(Debug, Clone)]
pub struct FsTemplateSource {
    root: PathBuf,
}

impl FsTemplateSource {
    /// Creates a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this source
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name.trim_start_matches('/'));
        let confined = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || !confined {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl TemplateSource for FsTemplateSource {
    fn exists(&self, name: &str) -> bool {
        self.locate(name).is_some_and(|path| path.is_file())
    }

    fn open(&self, name: &str) -> io::Result<Box<dyn Read + '_>> {
        let path = self.locate(name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("template name '{name}' is outside the template root"),
            )
        })?;
        let file = File::open(&path)?;
        tracing::trace!(path = %path.display(), "Opened template");
        Ok(Box::new(BufReader::new(file)))
    }
}
