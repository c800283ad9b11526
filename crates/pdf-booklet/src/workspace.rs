//! Scoped temporary working directory

use crate::constants::WORKDIR_SUFFIX;
use crate::types::Result;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding the intermediate documents of one run.
///
/// The directory is removed when the value is dropped, on every exit path,
/// unless it was created with `keep` set.
#[derive(Debug)]
pub struct WorkDir {
    dir: Option<TempDir>,
    path: PathBuf,
    keep: bool,
}

impl WorkDir {
    pub fn new(keep: bool) -> Result<Self> {
        let dir = tempfile::Builder::new().suffix(WORKDIR_SUFFIX).tempdir()?;
        let path = dir.path().to_owned();
        info!("Created temporary directory: {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the working directory
    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn keeps_files(&self) -> bool {
        self.keep
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        if self.keep {
            let path = dir.keep();
            info!("Temporary files are preserved in: {}", path.display());
        } else {
            match dir.close() {
                Ok(()) => debug!("Deleted temporary directory: {}", self.path.display()),
                Err(e) => warn!(
                    "Failed to delete temporary directory {}: {}",
                    self.path.display(),
                    e
                ),
            }
        }
    }
}
