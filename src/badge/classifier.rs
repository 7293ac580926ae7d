use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::models::{BadgeKind, RawBadge};

const TRIVIA_TOKEN: &str = "Week";
const GAME_PREFIX: &str = "Level ";
const GAME_MARKER: &str = "Base Camp";
const SPECIAL_GAME_NAME: &str = "Arcade TechCare";

/// Allow-list of lab-free course titles that count as lab badges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabCatalog {
    titles: Vec<String>,
}

impl LabCatalog {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl Default for LabCatalog {
    fn default() -> Self {
        Self::new([
            "Digital Transformation with Google Cloud",
            "Exploring Data Transformation with Google Cloud",
            "Infrastructure and Application Modernization with Google Cloud",
            "Scaling with Google Cloud Operations",
            "Innovating with Google Cloud Artificial Intelligence",
            "Trust and Security with Google Cloud",
            "Google Drive",
            "Google Docs",
            "Google Slides",
            "Google Meet",
            "Google Sheets",
            "Google Calendar",
            "Responsible AI: Applying AI Principles with Google Cloud",
            "Responsible AI for Digital Leaders with Google Cloud",
            "Customer Experience with Google AI Architecture",
            "Machine Learning Operations (MLOps) with Vertex AI: Model Evaluation",
            "Conversational AI on Vertex AI and Dialogflow CX",
            "Building Complex End to End Self-Service Experiences in Dialogflow CX",
        ])
    }
}

/// Maps scraped badges to a [`BadgeKind`].
///
/// Rules are evaluated in a fixed order and the first match wins:
/// trivia week suffix, game prefix/marker, the special game title,
/// the lab-free allow-list, and finally skill as the fallback.
#[derive(Debug, Clone)]
pub struct BadgeClassifier {
    lab_titles: HashSet<String>,
}

impl BadgeClassifier {
    pub fn new(catalog: &LabCatalog) -> Self {
        Self {
            lab_titles: catalog.titles().iter().cloned().collect(),
        }
    }

    /// The date is accepted for parity with the scraped record but no rule reads it.
    pub fn classify(&self, name: &str, _date: Option<&str>) -> BadgeKind {
        if has_trivia_suffix(name) {
            return BadgeKind::Trivia;
        }

        if name.starts_with(GAME_PREFIX) || name.contains(GAME_MARKER) {
            return BadgeKind::Game;
        }

        if name == SPECIAL_GAME_NAME {
            return BadgeKind::SpecialGame;
        }

        if self.lab_titles.contains(name) {
            return BadgeKind::Lab;
        }

        BadgeKind::Skill
    }

    pub fn classify_badge(&self, badge: &RawBadge) -> BadgeKind {
        self.classify(&badge.name, badge.date.as_deref())
    }
}

impl Default for BadgeClassifier {
    fn default() -> Self {
        Self::new(&LabCatalog::default())
    }
}

/// True when the four characters ending two before the end spell "Week",
/// as in "Skills Boost Arcade Trivia July 2024 Week 3".
fn has_trivia_suffix(name: &str) -> bool {
    let len = name.chars().count();
    if len < TRIVIA_TOKEN.len() + 2 {
        return false;
    }

    name.chars()
        .skip(len - TRIVIA_TOKEN.len() - 2)
        .take(TRIVIA_TOKEN.len())
        .eq(TRIVIA_TOKEN.chars())
}
