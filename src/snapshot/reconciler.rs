use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::{
    errors::SnapshotError,
    models::{ReconcileReport, ReplicaConfig, ReplicaFailure, ReplicaLocation, ReplicaSet},
    store::ReplicaStore,
};

/// Owns the replica set and decides which copy is canonical.
///
/// Writes and reconciliation passes are serialized through one lock so a
/// forced sync never interleaves with a cycle's fan-out.
pub struct SnapshotReconciler {
    replicas: ReplicaSet,
    store: Arc<dyn ReplicaStore>,
    write_lock: Mutex<()>,
}

impl SnapshotReconciler {
    pub fn new(replicas: ReplicaSet, store: Arc<dyn ReplicaStore>) -> Self {
        Self {
            replicas,
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn replicas(&self) -> &ReplicaSet {
        &self.replicas
    }

    /// Probes every declared replica in declaration order.
    /// A replica that cannot be probed is reported as absent.
    pub async fn probe_all(&self) -> Vec<ReplicaLocation> {
        let mut locations = Vec::with_capacity(self.replicas.len());
        for replica in self.replicas.iter() {
            let metadata = match self.store.probe(&replica.path).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(replica = %replica.id, error = %e, "Failed to probe replica");
                    None
                }
            };
            locations.push(ReplicaLocation {
                id: replica.id.clone(),
                path: replica.path.clone(),
                last_modified: metadata.map(|m| m.modified),
                size_bytes: metadata.map(|m| m.size_bytes).unwrap_or_default(),
            });
        }
        locations
    }

    /// Newest non-empty replica; ties go to the earlier declaration
    pub async fn canonical(&self) -> Option<ReplicaLocation> {
        select_canonical(self.probe_all().await)
    }

    /// Bytes of the canonical replica, or `None` if no replica holds any
    pub async fn read_canonical(&self) -> Result<Option<Vec<u8>>, SnapshotError> {
        match self.canonical().await {
            Some(location) => Ok(Some(self.store.read(&location.path).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn write_primary(&self, bytes: &[u8]) -> Result<(), SnapshotError> {
        let _guard = self.write_lock.lock().await;
        let primary = self.replicas.primary();
        self.store.write(&primary.path, bytes).await?;
        info!(replica = %primary.id, "Primary replica written");
        Ok(())
    }

    /// Picks the canonical replica and copies its bytes over every other one.
    ///
    /// Individual destination failures are reported, not raised; the pass
    /// only fails when there were destinations and none could be written.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<ReconcileReport, SnapshotError> {
        let _guard = self.write_lock.lock().await;

        let Some(canonical) = self.canonical().await else {
            info!("Nothing to synchronize: no replica holds data");
            return Ok(ReconcileReport::NothingToSync);
        };

        info!(
            replica = %canonical.id,
            size_bytes = canonical.size_bytes,
            "Selected canonical replica"
        );

        let bytes = self.store.read(&canonical.path).await?;
        let destinations: Vec<&ReplicaConfig> = self
            .replicas
            .iter()
            .filter(|replica| replica.id != canonical.id)
            .collect();

        let mut written = Vec::new();
        let mut unchanged = Vec::new();
        let mut failed = Vec::new();

        for destination in &destinations {
            if self.holds(destination, &bytes).await {
                debug!(replica = %destination.id, "Replica already in sync");
                unchanged.push(destination.id.clone());
                continue;
            }

            match self.store.write(&destination.path, &bytes).await {
                Ok(()) => {
                    debug!(replica = %destination.id, "Replica synchronized");
                    written.push(destination.id.clone());
                }
                Err(e) => {
                    warn!(
                        replica = %destination.id,
                        error = %e,
                        "Failed to synchronize replica"
                    );
                    failed.push(ReplicaFailure {
                        id: destination.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if !destinations.is_empty() && written.is_empty() && unchanged.is_empty() {
            return Err(SnapshotError::AllDestinationsFailed(
                failed.into_iter().map(|f| f.id).collect(),
            ));
        }

        info!(
            written = written.len(),
            unchanged = unchanged.len(),
            failed = failed.len(),
            "Reconciliation completed"
        );

        Ok(ReconcileReport::Synced {
            canonical: canonical.id,
            written,
            unchanged,
            failed,
        })
    }

    /// True when `replica` already stores exactly `bytes`
    async fn holds(&self, replica: &ReplicaConfig, bytes: &[u8]) -> bool {
        match self.store.probe(&replica.path).await {
            Ok(Some(metadata)) if metadata.size_bytes == bytes.len() as u64 => self
                .store
                .read(&replica.path)
                .await
                .map(|current| current == bytes)
                .unwrap_or(false),
            _ => false,
        }
    }
}

fn select_canonical(locations: Vec<ReplicaLocation>) -> Option<ReplicaLocation> {
    locations
        .into_iter()
        .filter(ReplicaLocation::is_candidate)
        // Equal timestamps keep the earlier declaration
        .fold(None, |best: Option<ReplicaLocation>, candidate| match best {
            Some(current) if current.last_modified >= candidate.last_modified => Some(current),
            _ => Some(candidate),
        })
}
