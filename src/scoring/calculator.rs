use super::models::{MilestoneCatalog, MilestoneTier, ScoreResult};
use crate::badge::BadgeCounts;

/// Special game badges beyond this many add nothing to a milestone score
const SPECIAL_GAME_CAP: u32 = 2;

/// Scores badge counts against a milestone catalog.
///
/// Both operations are total: missing categories count as zero.
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    catalog: MilestoneCatalog,
}

impl ScoreCalculator {
    pub fn new(catalog: MilestoneCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &MilestoneCatalog {
        &self.catalog
    }

    /// Base arcade points: one per game and trivia badge, one per pair of
    /// skill badges, two per special game badge. Saturates at `u32::MAX`.
    pub fn points(&self, counts: &BadgeCounts) -> u32 {
        counts
            .game
            .saturating_add(counts.trivia)
            .saturating_add(counts.skill / 2)
            .saturating_add(counts.special_game.saturating_mul(2))
    }

    pub fn evaluate_milestone(&self, counts: &BadgeCounts) -> ScoreResult {
        match self.catalog.highest_reached(counts) {
            Some(tier) => tier_score(tier, counts),
            None => ScoreResult::none(),
        }
    }
}

fn tier_score(tier: &MilestoneTier, counts: &BadgeCounts) -> ScoreResult {
    let reward = &tier.reward;
    let special_bonus = counts.special_game.min(SPECIAL_GAME_CAP);
    let arcade_points = reward
        .game_points
        .saturating_add(reward.trivia_points)
        .saturating_add(special_bonus);
    // The bonus is counted twice; downstream consumers rely on these totals.
    // Sums saturate at u32::MAX.
    let total_points = arcade_points
        .saturating_add(reward.skill_points)
        .saturating_add(reward.bonus.saturating_mul(2));

    ScoreResult {
        arcade_points,
        milestone: tier.name.clone(),
        bonus_points: reward.bonus,
        total_points,
    }
}
