//! Configuration loading: TOML file with defaults for every section

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::badge::LabCatalog;
use crate::fetch::{cloud::DEFAULT_USER_AGENT, ProfileSource};
use crate::scoring::MilestoneCatalog;
use crate::snapshot::ReplicaConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub schedule: ScheduleConfig,
    pub fetch: FetchConfig,
    pub profiles: ProfilesConfig,
    pub replicas: ReplicasConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Reads `path` if given, otherwise uses built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.replicas.0.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one replica must be configured".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        for replica in &self.replicas.0 {
            if !ids.insert(replica.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate replica id {}",
                    replica.id
                )));
            }
        }

        let mut names = HashSet::new();
        for tier in self.catalog.milestones.tiers() {
            if !names.insert(tier.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate milestone {}",
                    tier.name
                )));
            }
        }

        if let Some((earlier, later)) = self.catalog.milestones.first_misordered() {
            return Err(ConfigError::Invalid(format!(
                "milestone {} must not require fewer badges than {} in any category",
                later.name, earlier.name
            )));
        }

        if self.fetch.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "fetch.concurrency must be at least 1".to_string(),
            ));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch.timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
    pub run_on_startup: bool,
    /// Pinged periodically so free hosting tiers do not idle the service
    pub keep_alive_url: Option<String>,
    pub keep_alive_interval_secs: u64,
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_interval_secs.max(1))
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60 * 60,
            run_on_startup: true,
            keep_alive_url: None,
            keep_alive_interval_secs: 10 * 60,
        }
    }
}

/// What a cycle does with a profile whose fetch failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Leave the profile out of this cycle's table
    #[default]
    Skip,
    /// Keep the profile with zero badges
    ZeroBadges,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub concurrency: usize,
    pub user_agent: String,
    pub failure_policy: FailurePolicy,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            concurrency: 4,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            failure_policy: FailurePolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ProfilesConfig(pub Vec<ProfileSource>);

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self(vec![
            ProfileSource::new(
                "https://www.cloudskillsboost.google/public_profiles/ddfc7723-216a-444c-ab34-cba5d7807296",
            ),
            ProfileSource::new(
                "https://www.cloudskillsboost.google/public_profiles/104ba705-a4ed-422e-9599-e8cbcdfb0be6",
            ),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ReplicasConfig(pub Vec<ReplicaConfig>);

impl Default for ReplicasConfig {
    fn default() -> Self {
        Self(vec![
            ReplicaConfig::new("primary", "data/profiles/profiles_data.csv"),
            ReplicaConfig::new("root", "profiles_data.csv"),
            ReplicaConfig::new("public", "public/data.csv"),
        ])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub lab_free_courses: LabCatalog,
    pub milestones: MilestoneCatalog,
}
