pub mod calculator;
pub mod models;

pub use calculator::ScoreCalculator;
pub use models::{MilestoneCatalog, MilestoneTier, ScoreResult, TierRequirement, TierReward};

/// Milestone name reported when no tier is satisfied
pub const NO_MILESTONE: &str = "None";
