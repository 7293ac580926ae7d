use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use super::errors::SnapshotError;

/// A declared storage location for the serialized leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaConfig {
    pub id: String,
    pub path: PathBuf,
}

impl ReplicaConfig {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}

/// Ordered, non-empty list of replicas. Declaration order breaks canonical
/// ties and the first entry is the primary that each cycle writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaSet {
    replicas: Vec<ReplicaConfig>,
}

impl ReplicaSet {
    pub fn new(replicas: Vec<ReplicaConfig>) -> Result<Self, SnapshotError> {
        if replicas.is_empty() {
            return Err(SnapshotError::InvalidReplicaSet(
                "at least one replica is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for replica in &replicas {
            if !seen.insert(replica.id.as_str()) {
                return Err(SnapshotError::InvalidReplicaSet(format!(
                    "duplicate replica id {}",
                    replica.id
                )));
            }
        }

        Ok(Self { replicas })
    }

    pub fn primary(&self) -> &ReplicaConfig {
        // Non-empty by construction
        &self.replicas[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplicaConfig> {
        self.replicas.iter()
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }
}

/// Existence, modification time and size of a stored replica
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicaMetadata {
    pub modified: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Probe result for one declared replica
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaLocation {
    pub id: String,
    pub path: PathBuf,
    pub last_modified: Option<DateTime<Utc>>,
    pub size_bytes: u64,
}

impl ReplicaLocation {
    pub fn exists(&self) -> bool {
        self.last_modified.is_some()
    }

    /// Only replicas that exist and hold bytes can become canonical
    pub fn is_candidate(&self) -> bool {
        self.exists() && self.size_bytes > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaFailure {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileReport {
    /// No replica exists with content
    NothingToSync,
    Synced {
        canonical: String,
        written: Vec<String>,
        /// Destinations that already held the canonical bytes
        unchanged: Vec<String>,
        failed: Vec<ReplicaFailure>,
    },
}

impl ReconcileReport {
    pub fn canonical(&self) -> Option<&str> {
        match self {
            ReconcileReport::NothingToSync => None,
            ReconcileReport::Synced { canonical, .. } => Some(canonical),
        }
    }

    pub fn failed_ids(&self) -> Vec<String> {
        match self {
            ReconcileReport::NothingToSync => Vec::new(),
            ReconcileReport::Synced { failed, .. } => {
                failed.iter().map(|f| f.id.clone()).collect()
            }
        }
    }
}
