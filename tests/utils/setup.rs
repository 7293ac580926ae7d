use axum::Router;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use badge_leaderboard::{
    build_router,
    config::ReplicasConfig,
    snapshot::{FileReplicaStore, InMemoryReplicaStore, ReplicaConfig, ReplicaSet},
    AppState, CycleCoordinator, FailurePolicy, ProfileSource, ReplicaStore, SnapshotReconciler,
};

use super::mocks::MockProfileFetcher;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub fetcher: MockProfileFetcher,
    pub store: Arc<dyn ReplicaStore>,
    pub replicas: Vec<ReplicaConfig>,
    pub reconciler: Arc<SnapshotReconciler>,
    pub coordinator: Arc<CycleCoordinator>,
    pub state: AppState,
}

impl TestSetup {
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn replica_path(&self, id: &str) -> PathBuf {
        self.replicas
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.path.clone())
            .unwrap_or_else(|| panic!("unknown replica {}", id))
    }

    /// Current bytes of a replica, `None` if it does not exist
    pub async fn read_replica(&self, id: &str) -> Option<Vec<u8>> {
        let path = self.replica_path(id);
        match self.store.probe(&path).await.unwrap() {
            Some(_) => Some(self.store.read(&path).await.unwrap()),
            None => None,
        }
    }

    pub async fn write_replica(&self, id: &str, bytes: &[u8]) {
        self.store
            .write(&self.replica_path(id), bytes)
            .await
            .unwrap();
    }
}

pub struct TestSetupBuilder {
    fetcher: MockProfileFetcher,
    profiles: Vec<ProfileSource>,
    failure_policy: FailurePolicy,
    root: Option<PathBuf>,
    memory: Option<InMemoryReplicaStore>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            fetcher: MockProfileFetcher::new(),
            profiles: Vec::new(),
            failure_policy: FailurePolicy::Skip,
            root: None,
            memory: None,
        }
    }

    pub fn with_fetcher(mut self, fetcher: MockProfileFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_profiles(mut self, urls: &[&str]) -> Self {
        self.profiles = urls.iter().map(|url| ProfileSource::new(*url)).collect();
        self
    }

    pub fn with_sources(mut self, sources: Vec<ProfileSource>) -> Self {
        self.profiles = sources;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Real files under `root`, laid out like the default replica set
    pub fn on_disk(mut self, root: &Path) -> Self {
        self.root = Some(root.to_path_buf());
        self
    }

    /// Shares an in-memory store so tests can inject failures
    pub fn with_memory_store(mut self, store: InMemoryReplicaStore) -> Self {
        self.memory = Some(store);
        self
    }

    pub fn build(self) -> TestSetup {
        let replicas: Vec<ReplicaConfig> = match &self.root {
            Some(root) => ReplicasConfig::default()
                .0
                .into_iter()
                .map(|r| ReplicaConfig::new(r.id, root.join(r.path)))
                .collect(),
            None => ReplicasConfig::default().0,
        };

        let store: Arc<dyn ReplicaStore> = match (&self.root, self.memory) {
            (Some(_), _) => Arc::new(FileReplicaStore::new()),
            (None, Some(memory)) => Arc::new(memory),
            (None, None) => Arc::new(InMemoryReplicaStore::new()),
        };

        let reconciler = Arc::new(SnapshotReconciler::new(
            ReplicaSet::new(replicas.clone()).unwrap(),
            Arc::clone(&store),
        ));
        let coordinator = Arc::new(
            CycleCoordinator::builder(Arc::new(self.fetcher.clone()), Arc::clone(&reconciler))
                .with_profiles(self.profiles)
                .with_failure_policy(self.failure_policy)
                .with_concurrency(2)
                .build(),
        );
        let state = AppState::new(Arc::clone(&reconciler), Arc::clone(&coordinator));

        TestSetup {
            fetcher: self.fetcher,
            store,
            replicas,
            reconciler,
            coordinator,
            state,
        }
    }
}
