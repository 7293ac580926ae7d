pub mod fixtures;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use fixtures::{badges, milestone_one_badges, profile};
#[allow(unused_imports)]
pub use mocks::MockProfileFetcher;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
