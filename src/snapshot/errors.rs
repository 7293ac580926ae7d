use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Replica I/O error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid replica set: {0}")]
    InvalidReplicaSet(String),

    #[error("Failed to write every destination replica: {}", .0.join(", "))]
    AllDestinationsFailed(Vec<String>),
}

impl SnapshotError {
    pub fn io(path: impl std::fmt::Display, error: impl std::fmt::Display) -> Self {
        SnapshotError::Io {
            path: path.to_string(),
            message: error.to_string(),
        }
    }
}
