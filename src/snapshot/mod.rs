// Public API - what other modules can use
pub use errors::SnapshotError;
pub use models::{
    ReconcileReport, ReplicaConfig, ReplicaFailure, ReplicaLocation, ReplicaMetadata, ReplicaSet,
};
pub use reconciler::SnapshotReconciler;
pub use store::{FileReplicaStore, InMemoryReplicaStore, ReplicaStore};

// Internal modules
mod errors;
pub mod models;
mod reconciler;
pub mod store;
