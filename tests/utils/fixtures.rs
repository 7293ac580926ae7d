use badge_leaderboard::{FetchedProfile, RawBadge};

// ============================================================================
// Profile Fixtures
// ============================================================================

pub fn badges(names: &[&str]) -> Vec<RawBadge> {
    names.iter().map(|name| RawBadge::new(*name)).collect()
}

pub fn profile(name: &str, badge_names: &[&str]) -> FetchedProfile {
    FetchedProfile::new(name, badges(badge_names))
}

/// Exactly the Milestone 1 thresholds: 4 game, 4 trivia, 10 skill, 4 lab
pub fn milestone_one_badges() -> Vec<RawBadge> {
    let mut names: Vec<String> = Vec::new();
    names.extend((1..=4).map(|i| format!("Level {}: Cloud Arcade", i)));
    names.extend((1..=4).map(|i| format!("Skills Boost Arcade Trivia Week {}", i)));
    names.extend((1..=10).map(|i| format!("Build Skill {}", i)));
    names.extend(
        ["Google Docs", "Google Drive", "Google Sheets", "Google Meet"]
            .iter()
            .map(|s| s.to_string()),
    );
    names.into_iter().map(RawBadge::new).collect()
}
