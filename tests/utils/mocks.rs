use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

use badge_leaderboard::{FetchError, FetchedProfile, ProfileFetcher, ProfileSource};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Serves canned profiles and counts how often each URL was fetched.
/// Optionally holds every fetch until `release` is called.
#[derive(Clone, Default)]
pub struct MockProfileFetcher {
    profiles: Arc<RwLock<HashMap<String, Result<FetchedProfile, FetchError>>>>,
    calls: Arc<RwLock<HashMap<String, usize>>>,
    gate: Option<Arc<Gate>>,
}

#[derive(Default)]
struct Gate {
    started: Notify,
    release: Notify,
}

impl MockProfileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch blocks until [`MockProfileFetcher::release`]
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Gate::default())),
            ..Self::default()
        }
    }

    pub async fn add_profile(&self, url: &str, profile: FetchedProfile) {
        self.profiles
            .write()
            .await
            .insert(url.to_string(), Ok(profile));
    }

    pub async fn add_failure(&self, url: &str, error: FetchError) {
        self.profiles
            .write()
            .await
            .insert(url.to_string(), Err(error));
    }

    pub async fn calls_for(&self, url: &str) -> usize {
        self.calls.read().await.get(url).copied().unwrap_or(0)
    }

    pub async fn total_calls(&self) -> usize {
        self.calls.read().await.values().sum()
    }

    /// Waits until a gated fetch has begun
    pub async fn wait_until_started(&self) {
        if let Some(gate) = &self.gate {
            gate.started.notified().await;
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            // Wakes current waiters and lets the next fetch through
            gate.release.notify_waiters();
            gate.release.notify_one();
        }
    }
}

#[async_trait]
impl ProfileFetcher for MockProfileFetcher {
    async fn fetch(&self, source: &ProfileSource) -> Result<FetchedProfile, FetchError> {
        *self
            .calls
            .write()
            .await
            .entry(source.url.clone())
            .or_insert(0) += 1;

        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }

        self.profiles
            .read()
            .await
            .get(&source.url)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}
