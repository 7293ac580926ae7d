use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{
    errors::FetchError,
    html::parse_profile,
    models::{FetchedProfile, ProfileSource},
    ProfileFetcher,
};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetches public profile pages over HTTP and extracts their badges
#[derive(Debug, Clone)]
pub struct CloudProfileFetcher {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl CloudProfileFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            timeout,
        })
    }
}

#[async_trait]
impl ProfileFetcher for CloudProfileFetcher {
    #[instrument(skip(self), fields(url = %source.url))]
    async fn fetch(&self, source: &ProfileSource) -> Result<FetchedProfile, FetchError> {
        let response = self
            .http_client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(self.timeout)
                } else {
                    FetchError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let parsed = parse_profile(&body);
        debug!(
            badges = parsed.badges.len(),
            stats = parsed.stats.len(),
            "Profile page parsed"
        );

        Ok(FetchedProfile {
            name: parsed
                .name
                .unwrap_or_else(|| source.label().to_string()),
            badges: parsed.badges,
            stats: parsed.stats,
        })
    }
}
