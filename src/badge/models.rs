use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// A badge as scraped from a public profile page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBadge {
    pub name: String,
    pub date: Option<String>,
    pub image_url: Option<String>,
}

impl RawBadge {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: None,
            image_url: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum BadgeKind {
    Lab,
    Skill,
    Game,
    Trivia,
    SpecialGame,
}

impl fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                BadgeKind::Lab => "lab",
                BadgeKind::Skill => "skill",
                BadgeKind::Game => "game",
                BadgeKind::Trivia => "trivia",
                BadgeKind::SpecialGame => "special_game",
            }
        )
    }
}

/// Per-kind badge tally for one profile.
///
/// The total is always derived from the per-kind counts, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeCounts {
    pub lab: u32,
    pub skill: u32,
    pub game: u32,
    pub trivia: u32,
    pub special_game: u32,
}

impl BadgeCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: BadgeKind) -> u32 {
        match kind {
            BadgeKind::Lab => self.lab,
            BadgeKind::Skill => self.skill,
            BadgeKind::Game => self.game,
            BadgeKind::Trivia => self.trivia,
            BadgeKind::SpecialGame => self.special_game,
        }
    }

    pub fn set(&mut self, kind: BadgeKind, count: u32) {
        let slot = match kind {
            BadgeKind::Lab => &mut self.lab,
            BadgeKind::Skill => &mut self.skill,
            BadgeKind::Game => &mut self.game,
            BadgeKind::Trivia => &mut self.trivia,
            BadgeKind::SpecialGame => &mut self.special_game,
        };
        *slot = count;
    }

    pub fn increment(&mut self, kind: BadgeKind) {
        self.set(kind, self.get(kind).saturating_add(1));
    }

    pub fn total(&self) -> u32 {
        BadgeKind::iter().map(|kind| self.get(kind)).sum()
    }

    /// Builder-style setter, handy for fixtures
    pub fn with(mut self, kind: BadgeKind, count: u32) -> Self {
        self.set(kind, count);
        self
    }
}

impl FromIterator<BadgeKind> for BadgeCounts {
    fn from_iter<I: IntoIterator<Item = BadgeKind>>(iter: I) -> Self {
        let mut counts = BadgeCounts::new();
        for kind in iter {
            counts.increment(kind);
        }
        counts
    }
}
