//! Whole-file sync of the local store against a remote blob service.
//!
//! The local database is a cached mirror of a single remote file. It is
//! replaced by the remote copy before any read, and the remote copy is
//! replaced by the local file after any write. There is no merging.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info};

/// Remote failures, reduced to the one distinction the tracker acts on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("remote file not found")]
    NotFound,

    #[error("remote storage failed: {0}")]
    Other(String),
}

/// A remote service that stores named blobs.
///
/// The Dropbox client implements this with reqwest; `DirectoryBlobStore`
/// implements it on a plain directory.
pub trait BlobStore {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, RemoteError>;

    /// Uploads `bytes`, replacing whatever is stored under `name`.
    fn store(&self, name: &str, bytes: &[u8]) -> Result<(), RemoteError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote snapshot replaced the local store.
    Downloaded { bytes: usize },
    /// Nothing stored remotely yet; the local store starts fresh.
    NotFound,
    /// No remote configured.
    Offline,
}

/// Replace the local store with the remote snapshot.
///
/// `NotFound` leaves the local file alone. Any other remote error is
/// returned before the local file is touched.
pub fn pull_snapshot(remote: &dyn BlobStore, name: &str, local_path: &Path) -> Result<SyncOutcome> {
    let bytes = match remote.fetch(name) {
        Ok(bytes) => bytes,
        Err(RemoteError::NotFound) => {
            info!(name, "no remote snapshot yet, starting with a fresh store");
            return Ok(SyncOutcome::NotFound);
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to download '{name}', stopping before touching local data")
            });
        }
    };

    write_replacing(local_path, &bytes)?;
    debug!(name, bytes = bytes.len(), path = %local_path.display(), "pulled snapshot");
    Ok(SyncOutcome::Downloaded { bytes: bytes.len() })
}

/// Upload the whole local store, overwriting the remote snapshot.
pub fn push_snapshot(remote: &dyn BlobStore, name: &str, local_path: &Path) -> Result<()> {
    let bytes = fs::read(local_path)
        .with_context(|| format!("Failed to read local store: {}", local_path.display()))?;
    remote
        .store(name, &bytes)
        .with_context(|| format!("Failed to upload '{name}'"))?;
    debug!(name, bytes = bytes.len(), "pushed snapshot");
    Ok(())
}

/// Write through a sibling temp file so a failed write never leaves a
/// truncated store behind.
fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".download");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)
        .with_context(|| format!("Failed to write downloaded store: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace local store: {}", path.display()))?;
    Ok(())
}

/// A directory standing in for the remote, e.g. a folder kept in sync by
/// another tool.
pub struct DirectoryBlobStore {
    root: PathBuf,
}

impl DirectoryBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for DirectoryBlobStore {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, RemoteError> {
        let path = self.root.join(name);
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RemoteError::NotFound,
            _ => RemoteError::Other(format!("{}: {e}", path.display())),
        })
    }

    fn store(&self, name: &str, bytes: &[u8]) -> Result<(), RemoteError> {
        let path = self.root.join(name);
        write_replacing(&path, bytes).map_err(|e| RemoteError::Other(format!("{e:#}")))
    }
}
