use serde::{Deserialize, Serialize};

use crate::badge::BadgeCounts;
use crate::scoring::ScoreResult;

/// One leaderboard entry, identified by the profile's display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRow {
    pub name: String,
    pub counts: BadgeCounts,
    pub score: ScoreResult,
}

impl ProfileRow {
    pub fn new(name: impl Into<String>, counts: BadgeCounts, score: ScoreResult) -> Self {
        Self {
            name: name.into(),
            counts,
            score,
        }
    }

    pub fn total_points(&self) -> u32 {
        self.score.total_points
    }

    pub fn to_record(&self) -> LeaderboardRecord {
        LeaderboardRecord {
            name: self.name.clone(),
            game_badges: self.counts.game,
            special_game_badges: self.counts.special_game,
            trivia_badges: self.counts.trivia,
            skill_badges: self.counts.skill,
            lab_badges: self.counts.lab,
            arcade_points: self.score.arcade_points,
            milestone: self.score.milestone.clone(),
            bonus_points: self.score.bonus_points,
            total_points: self.score.total_points,
        }
    }
}

impl From<LeaderboardRecord> for ProfileRow {
    fn from(record: LeaderboardRecord) -> Self {
        Self {
            name: record.name,
            counts: BadgeCounts {
                lab: record.lab_badges,
                skill: record.skill_badges,
                game: record.game_badges,
                trivia: record.trivia_badges,
                special_game: record.special_game_badges,
            },
            score: ScoreResult {
                arcade_points: record.arcade_points,
                milestone: record.milestone,
                bonus_points: record.bonus_points,
                total_points: record.total_points,
            },
        }
    }
}

/// Flat row shape shared by the CSV snapshot and the JSON read endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRecord {
    pub name: String,
    pub game_badges: u32,
    pub special_game_badges: u32,
    pub trivia_badges: u32,
    pub skill_badges: u32,
    pub lab_badges: u32,
    pub arcade_points: u32,
    pub milestone: String,
    pub bonus_points: u32,
    pub total_points: u32,
}

/// Rows ordered by total points, highest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardTable {
    rows: Vec<ProfileRow>,
}

impl LeaderboardTable {
    /// Wraps rows that are already in leaderboard order
    pub(crate) fn from_ordered(rows: Vec<ProfileRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ProfileRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> Vec<LeaderboardRecord> {
        self.rows.iter().map(ProfileRow::to_record).collect()
    }
}
