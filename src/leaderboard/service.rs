use std::sync::Arc;
use tracing::{debug, instrument};

use super::{assembler::deserialize, models::LeaderboardTable};
use crate::shared::AppError;
use crate::snapshot::SnapshotReconciler;

/// Read path over the canonical replica. Never copies between replicas.
pub struct LeaderboardService {
    reconciler: Arc<SnapshotReconciler>,
}

impl LeaderboardService {
    pub fn new(reconciler: Arc<SnapshotReconciler>) -> Self {
        Self { reconciler }
    }

    /// `None` when no replica has ever been populated. A header-only table is
    /// `Some` with zero rows.
    #[instrument(skip(self))]
    pub async fn current_table(&self) -> Result<Option<LeaderboardTable>, AppError> {
        let Some(bytes) = self.reconciler.read_canonical().await? else {
            debug!("No replica holds leaderboard data");
            return Ok(None);
        };

        let table = deserialize(&bytes)?;
        debug!(rows = table.len(), "Leaderboard loaded from canonical replica");
        Ok(Some(table))
    }

    /// Canonical replica bytes, verbatim
    #[instrument(skip(self))]
    pub async fn raw_export(&self) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.reconciler.read_canonical().await?)
    }
}
