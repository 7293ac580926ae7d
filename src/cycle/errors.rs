use thiserror::Error;

use crate::snapshot::SnapshotError;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Failed to write primary replica: {0}")]
    PrimaryWrite(SnapshotError),

    #[error("Reconciliation failed: {0}")]
    Reconcile(SnapshotError),
}
