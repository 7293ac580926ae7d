// Public API - what other modules can use
pub use classifier::{BadgeClassifier, LabCatalog};
pub use models::{BadgeCounts, BadgeKind, RawBadge};

// Internal modules
mod classifier;
pub mod models;
