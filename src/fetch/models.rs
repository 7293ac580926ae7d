use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{errors::FetchError, ProfileFetcher};
use crate::badge::RawBadge;

/// A public profile to scrape, as listed in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSource {
    pub url: String,
    /// Fallback display name when the page does not carry one
    #[serde(default)]
    pub name: Option<String>,
}

impl ProfileSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Configured name, else the URL
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedProfile {
    pub name: String,
    pub badges: Vec<RawBadge>,
    pub stats: BTreeMap<String, String>,
}

impl FetchedProfile {
    pub fn new(name: impl Into<String>, badges: Vec<RawBadge>) -> Self {
        Self {
            name: name.into(),
            badges,
            stats: BTreeMap::new(),
        }
    }
}

/// Serves canned results keyed by profile URL; unknown URLs are a 404
#[derive(Debug, Default, Clone)]
pub struct StaticProfileFetcher {
    profiles: Arc<RwLock<HashMap<String, Result<FetchedProfile, FetchError>>>>,
}

impl StaticProfileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, url: impl Into<String>, profile: FetchedProfile) {
        self.profiles.write().await.insert(url.into(), Ok(profile));
    }

    pub async fn insert_error(&self, url: impl Into<String>, error: FetchError) {
        self.profiles.write().await.insert(url.into(), Err(error));
    }
}

#[async_trait]
impl ProfileFetcher for StaticProfileFetcher {
    async fn fetch(&self, source: &ProfileSource) -> Result<FetchedProfile, FetchError> {
        self.profiles
            .read()
            .await
            .get(&source.url)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}
