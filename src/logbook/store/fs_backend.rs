use super::backend::StorageBackend;
use crate::error::{LogbookError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Collection files stored as plain files in one data directory.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the data directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|source| LogbookError::DataDir {
                path: self.root.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// First half of an atomic write: the new content is fully written and
    /// flushed to a temporary file next to the target. Nothing visible changes
    /// until [`StagedWrite::commit`].
    pub fn stage(&self, name: &str, bytes: &[u8]) -> Result<StagedWrite> {
        self.ensure_dir()?;

        let target = self.root.join(name);
        let tmp = self.root.join(format!(".{}-{}.tmp", name, Uuid::new_v4()));
        let write_err = |source| LogbookError::Write {
            path: target.clone(),
            source,
        };

        let staged = File::create(&tmp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        if let Err(source) = staged {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(source));
        }

        Ok(StagedWrite { tmp, target })
    }
}

/// A fully written temporary file waiting to replace its target.
#[derive(Debug)]
#[must_use = "a staged write does nothing until committed"]
pub struct StagedWrite {
    tmp: PathBuf,
    target: PathBuf,
}

impl StagedWrite {
    pub fn temp_path(&self) -> &Path {
        &self.tmp
    }

    /// Rename the temporary file over the target.
    pub fn commit(self) -> Result<()> {
        if let Err(source) = fs::rename(&self.tmp, &self.target) {
            let _ = fs::remove_file(&self.tmp);
            return Err(LogbookError::Write {
                path: self.target,
                source,
            });
        }
        debug!(path = %self.target.display(), "committed write");
        Ok(())
    }

    /// Drop the staged content, leaving the target as it was.
    pub fn discard(self) {
        if let Err(e) = fs::remove_file(&self.tmp) {
            warn!(path = %self.tmp.display(), "could not remove staged file: {}", e);
        }
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.root.join(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LogbookError::Io(e)),
        }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.stage(name, bytes)?.commit()
    }

    fn quarantine(&self, name: &str, suffix: &str) -> Result<Option<PathBuf>> {
        let path = self.root.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let aside = self.root.join(format!("{}.{}", name, suffix));
        fs::rename(&path, &aside).map_err(|source| LogbookError::Write {
            path: aside.clone(),
            source,
        })?;
        Ok(Some(aside))
    }

    fn location(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}
