use serde::{Deserialize, Serialize};

use super::NO_MILESTONE;
use crate::badge::BadgeCounts;

/// Minimum badge counts a profile needs, per category, to reach a tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRequirement {
    pub game: u32,
    pub trivia: u32,
    pub skill: u32,
    pub lab: u32,
}

impl TierRequirement {
    /// Every category must be met; a surplus in one never covers a shortfall in another.
    pub fn is_met_by(&self, counts: &BadgeCounts) -> bool {
        counts.game >= self.game
            && counts.trivia >= self.trivia
            && counts.skill >= self.skill
            && counts.lab >= self.lab
    }

    /// True when every threshold is at least the matching one in `other`
    pub fn covers(&self, other: &TierRequirement) -> bool {
        self.game >= other.game
            && self.trivia >= other.trivia
            && self.skill >= other.skill
            && self.lab >= other.lab
    }
}

/// Fixed points a tier awards once reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierReward {
    pub game_points: u32,
    pub trivia_points: u32,
    pub skill_points: u32,
    pub bonus: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneTier {
    pub name: String,
    pub requirement: TierRequirement,
    pub reward: TierReward,
}

/// Tiers ordered from the laxest to the strictest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestoneCatalog {
    tiers: Vec<MilestoneTier>,
}

impl MilestoneCatalog {
    pub fn new(tiers: Vec<MilestoneTier>) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &[MilestoneTier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// The first adjacent pair whose later tier is not at least as strict as
    /// the earlier one in every category
    pub fn first_misordered(&self) -> Option<(&MilestoneTier, &MilestoneTier)> {
        self.tiers
            .windows(2)
            .find(|pair| !pair[1].requirement.covers(&pair[0].requirement))
            .map(|pair| (&pair[0], &pair[1]))
    }

    /// The strictest tier whose requirement `counts` satisfies
    pub fn highest_reached(&self, counts: &BadgeCounts) -> Option<&MilestoneTier> {
        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.requirement.is_met_by(counts))
    }
}

impl Default for MilestoneCatalog {
    fn default() -> Self {
        fn tier(name: &str, requirement: [u32; 4], reward: [u32; 4]) -> MilestoneTier {
            let [game, trivia, skill, lab] = requirement;
            let [game_points, trivia_points, skill_points, bonus] = reward;
            MilestoneTier {
                name: name.to_string(),
                requirement: TierRequirement {
                    game,
                    trivia,
                    skill,
                    lab,
                },
                reward: TierReward {
                    game_points,
                    trivia_points,
                    skill_points,
                    bonus,
                },
            }
        }

        Self::new(vec![
            tier("Milestone 1", [4, 4, 10, 4], [4, 4, 5, 2]),
            tier("Milestone 2", [6, 6, 20, 8], [6, 6, 10, 8]),
            tier("Milestone 3", [8, 7, 30, 12], [8, 7, 15, 15]),
            tier("Ultimate Milestone", [10, 8, 44, 16], [10, 8, 22, 25]),
        ])
    }
}

/// Outcome of milestone evaluation for one profile, recomputed every cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub arcade_points: u32,
    pub milestone: String,
    pub bonus_points: u32,
    pub total_points: u32,
}

impl ScoreResult {
    pub fn none() -> Self {
        Self {
            arcade_points: 0,
            milestone: NO_MILESTONE.to_string(),
            bonus_points: 0,
            total_points: 0,
        }
    }

    pub fn has_milestone(&self) -> bool {
        self.milestone != NO_MILESTONE
    }
}

impl Default for ScoreResult {
    fn default() -> Self {
        Self::none()
    }
}
