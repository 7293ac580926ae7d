use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{errors::SnapshotError, models::ReplicaMetadata};

/// Storage backend holding replica bytes
#[async_trait]
pub trait ReplicaStore: Send + Sync {
    /// `None` when nothing is stored at `path`
    async fn probe(&self, path: &Path) -> Result<Option<ReplicaMetadata>, SnapshotError>;
    async fn read(&self, path: &Path) -> Result<Vec<u8>, SnapshotError>;
    /// Replaces the contents at `path`, creating parent locations as needed
    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), SnapshotError>;
}

/// Replicas as plain files on the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FileReplicaStore;

impl FileReplicaStore {
    pub fn new() -> Self {
        Self
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "replica".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

#[async_trait]
impl ReplicaStore for FileReplicaStore {
    async fn probe(&self, path: &Path) -> Result<Option<ReplicaMetadata>, SnapshotError> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => {
                let modified = metadata
                    .modified()
                    .map_err(|e| SnapshotError::io(path.display(), e))?;
                Ok(Some(ReplicaMetadata {
                    modified: DateTime::<Utc>::from(modified),
                    size_bytes: metadata.len(),
                }))
            }
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SnapshotError::io(path.display(), e)),
        }
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, SnapshotError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| SnapshotError::io(path.display(), e))
    }

    #[instrument(skip(self, bytes), fields(path = %path.display(), size = bytes.len()))]
    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SnapshotError::io(parent.display(), e))?;
            }
        }

        // Stage next to the destination so the rename stays on one filesystem
        let staging = staging_path(path);
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|e| SnapshotError::io(staging.display(), e))?;

        if let Err(e) = tokio::fs::rename(&staging, path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(SnapshotError::io(path.display(), e));
        }

        debug!("Replica written");
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredReplica {
    bytes: Vec<u8>,
    modified: DateTime<Utc>,
}

/// In-memory store with controllable timestamps and injectable write failures
#[derive(Debug, Default, Clone)]
pub struct InMemoryReplicaStore {
    replicas: Arc<RwLock<HashMap<PathBuf, StoredReplica>>>,
    failing: Arc<RwLock<HashSet<PathBuf>>>,
    last_write: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl InMemoryReplicaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a replica with an explicit modification time
    pub async fn insert(&self, path: impl Into<PathBuf>, bytes: &[u8], modified: DateTime<Utc>) {
        self.replicas.write().await.insert(
            path.into(),
            StoredReplica {
                bytes: bytes.to_vec(),
                modified,
            },
        );
    }

    /// Makes every later write to `path` fail
    pub async fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.failing.write().await.insert(path.into());
    }

    pub async fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.replicas
            .read()
            .await
            .get(path.as_ref())
            .map(|replica| replica.bytes.clone())
    }

    pub async fn modified(&self, path: impl AsRef<Path>) -> Option<DateTime<Utc>> {
        self.replicas
            .read()
            .await
            .get(path.as_ref())
            .map(|replica| replica.modified)
    }

    /// Strictly increasing write timestamps, even within one clock tick
    async fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.last_write.write().await;
        let now = Utc::now();
        let next = match *last {
            Some(previous) if previous >= now => previous + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}

#[async_trait]
impl ReplicaStore for InMemoryReplicaStore {
    async fn probe(&self, path: &Path) -> Result<Option<ReplicaMetadata>, SnapshotError> {
        Ok(self
            .replicas
            .read()
            .await
            .get(path)
            .map(|replica| ReplicaMetadata {
                modified: replica.modified,
                size_bytes: replica.bytes.len() as u64,
            }))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, SnapshotError> {
        self.contents(path)
            .await
            .ok_or_else(|| SnapshotError::io(path.display(), "not found"))
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), SnapshotError> {
        if self.failing.read().await.contains(path) {
            return Err(SnapshotError::io(path.display(), "write rejected"));
        }

        let modified = self.next_timestamp().await;
        self.insert(path, bytes, modified).await;
        Ok(())
    }
}
