//! Request-scoped staging of uploaded archives
//!
//! Each file upload gets its own freshly created directory under the staging
//! root. The directory is owned by a [`StagingHandle`] and is removed exactly
//! once: explicitly through [`StagingHandle::release`], or by `Drop` when the
//! request future is cancelled, times out, or panics.
//!
//! [`StagingManager::with_staged`] is the entry point for request handlers: it
//! acquires, writes, runs the caller's work against the staged path, and
//! releases only after that work has settled.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{ValidationError, ValidationResult};

/// Prefix of every per-request staging directory.
pub const STAGING_PREFIX: &str = "gtfs-upload-";

/// Name used when the uploaded file name has no usable final component.
pub const DEFAULT_STAGED_NAME: &str = "gtfs.zip";

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("failed to create staging directory under {root}: {source}")]
    Acquire {
        root: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write staged file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove staging directory {path}: {source}")]
    Release {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reduce an untrusted file name to a single path component.
///
/// Directory parts are discarded so the staged file always lands directly
/// inside its staging directory.
pub fn safe_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();

    match cleaned.trim() {
        "" | "." | ".." => DEFAULT_STAGED_NAME.to_string(),
        _ => cleaned,
    }
}

/// Allocates staging directories under a common root
#[derive(Debug, Clone)]
pub struct StagingManager {
    root: PathBuf,
}

impl StagingManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a new, uniquely named directory for one request.
    pub fn acquire(&self) -> Result<StagingHandle, StagingError> {
        let acquire_err = |source| StagingError::Acquire {
            root: self.root.clone(),
            source,
        };

        std::fs::create_dir_all(&self.root).map_err(acquire_err)?;
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)
            .map_err(acquire_err)?;

        debug!(path = %dir.path().display(), "Staging directory acquired");

        Ok(StagingHandle {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
        })
    }

    /// Stage `bytes` as `file_name`, run `work` on the staged path, then
    /// remove the staging directory whatever the outcome.
    ///
    /// A release failure turns a successful outcome into an error; if `work`
    /// already failed, its error wins and the release failure is logged.
    pub async fn with_staged<T, F, Fut>(
        &self,
        file_name: &str,
        bytes: &[u8],
        work: F,
    ) -> ValidationResult<T>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = ValidationResult<T>>,
    {
        let handle = self.acquire()?;

        let outcome = match handle.write(file_name, bytes).await {
            Ok(staged_path) => work(staged_path).await,
            Err(err) => Err(ValidationError::from(err)),
        };

        match (outcome, handle.release().await) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(release_err)) => Err(release_err.into()),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(release_err)) => {
                warn!(error = %release_err, "Staging cleanup failed after a failed validation");
                Err(err)
            }
        }
    }
}

/// Exclusive owner of one staging directory
#[derive(Debug)]
pub struct StagingHandle {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl StagingHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the whole buffer and return the staged path.
    ///
    /// Returns only once the bytes are flushed to disk.
    pub async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, StagingError> {
        let staged_path = self.path.join(safe_file_name(file_name));
        let write_err = |source| StagingError::Write {
            path: staged_path.clone(),
            source,
        };

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staged_path)
            .await
            .map_err(write_err)?;
        file.write_all(bytes).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;

        debug!(path = %staged_path.display(), size = bytes.len(), "Upload staged");

        Ok(staged_path)
    }

    /// Recursively remove the directory on the blocking pool.
    ///
    /// Once started, removal runs to completion even if the caller is
    /// cancelled.
    pub async fn release(mut self) -> Result<(), StagingError> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };

        tokio::task::spawn_blocking(move || dir.close())
            .await
            .map_err(io::Error::other)
            .and_then(|closed| closed)
            .map_err(|source| StagingError::Release {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), "Staging directory released");
        Ok(())
    }

    /// Synchronous fallback for `Drop`.
    fn remove(&mut self) -> Result<(), StagingError> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };

        dir.close().map_err(|source| StagingError::Release {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "Staging directory released");
        Ok(())
    }
}

impl Drop for StagingHandle {
    fn drop(&mut self) {
        if self.dir.is_some() {
            warn!(path = %self.path.display(), "Staging directory released by drop");
            if let Err(err) = self.remove() {
                warn!(error = %err, "Staging cleanup on drop failed");
            }
        }
    }
}
