//! Cross-process exclusion for index updates.
//!
//! Two overlapping runs against one master would race on the shard and
//! merge artifacts, so every run holds an advisory lock on
//! `<master>.lock` from before the first artifact is touched until after
//! the publish rename.

use crate::index::types::with_suffix;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("index is locked by another process: {0}")]
    Locked(PathBuf),

    #[error("failed to create lock file {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to acquire lock {path}: {source}")]
    AcquireFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Held for the duration of a build; the lock is released on drop.
#[derive(Debug)]
pub struct IndexLock {
    file: File,
    path: PathBuf,
}

/// Lock file path for a master index
pub fn lock_path_for(master: &Path) -> PathBuf {
    with_suffix(master, ".lock")
}

impl IndexLock {
    /// Try to take the lock without blocking
    pub fn acquire(master: &Path) -> Result<Self, LockError> {
        let path = lock_path_for(master);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| LockError::CreateFailed {
                path: path.clone(),
                source,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!("acquired index lock {}", path.display());
                Ok(Self { file, path })
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                Err(LockError::Locked(path))
            }
            Err(source) => Err(LockError::AcquireFailed { path, source }),
        }
    }
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        debug!("releasing index lock {}", self.path.display());
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lock_path() {
        assert_eq!(
            lock_path_for(Path::new("/w/.csearchindex")),
            PathBuf::from("/w/.csearchindex.lock")
        );
    }

    #[test]
    fn test_second_lock_is_rejected_until_release() {
        let dir = tempdir().unwrap();
        let master = dir.path().join(".csearchindex");

        let first = IndexLock::acquire(&master).unwrap();
        assert!(matches!(
            IndexLock::acquire(&master),
            Err(LockError::Locked(_))
        ));

        drop(first);
        assert!(IndexLock::acquire(&master).is_ok());
    }
}
