pub mod cloud;
mod errors;
pub mod html;
pub mod models;

pub use cloud::CloudProfileFetcher;
pub use errors::FetchError;
pub use models::{FetchedProfile, ProfileSource, StaticProfileFetcher};

use async_trait::async_trait;

/// Supplies raw badge records for one public profile
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch(&self, source: &ProfileSource) -> Result<FetchedProfile, FetchError>;
}
