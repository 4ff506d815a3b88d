//! The shared volume: write-once persistence and wholesale clearing.
//!
//! Files are written once and then handed off by path; nothing here reads a
//! stored file back. Clearing races with concurrent writes by design of the
//! wider system, there is no locking between the two.
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::naming::StoredFilePath;

/// Handle on the shared volume root.
#[derive(Debug, Clone)]
pub struct Volume {
    root: PathBuf,
}

impl Volume {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to a new file at `target`.
    ///
    /// Open, write, flush and sync succeed or fail as one unit. The file must
    /// not already exist. A failure part-way may leave a partial file behind;
    /// callers that care can [`remove`](Self::remove) it.
    pub async fn persist(&self, target: &StoredFilePath, bytes: &[u8]) -> Result<(), IngestError> {
        write_new(target.path(), bytes)
            .await
            .map_err(|err| IngestError::Persist {
                path: target.to_string(),
                reason: err.to_string(),
            })?;
        debug!(path = %target, bytes = bytes.len(), "volume_persisted");
        Ok(())
    }

    /// Recursively delete every entry under the root, keeping the root itself.
    ///
    /// Returns the number of top-level entries removed. Stops at the first
    /// failure; entries removed before it stay removed.
    pub async fn clear(&self) -> Result<usize, IngestError> {
        let removed = clear_contents(&self.root)
            .await
            .map_err(|err| IngestError::ClearVolume {
                path: self.root.display().to_string(),
                reason: err.to_string(),
            })?;
        debug!(root = %self.root.display(), removed, "volume_cleared");
        Ok(removed)
    }

    /// Best-effort removal of a stored file. Failures are logged, not returned.
    pub async fn remove(&self, target: &StoredFilePath) -> bool {
        match fs::remove_file(target.path()).await {
            Ok(()) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                warn!(path = %target, error = %err, "volume_remove_failed");
                false
            }
        }
    }
}

async fn write_new(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

async fn clear_contents(root: &Path) -> io::Result<usize> {
    let mut entries = fs::read_dir(root).await?;
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            fs::remove_dir_all(&path).await?;
        } else {
            fs::remove_file(&path).await?;
        }
        removed += 1;
    }
    Ok(removed)
}
