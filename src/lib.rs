// Library crate for the badge leaderboard service
// This file exposes the public API for integration tests

pub mod badge;
pub mod config;
pub mod cycle;
pub mod fetch;
pub mod leaderboard;
pub mod router;
pub mod scoring;
pub mod shared;
pub mod snapshot;

// Re-export commonly used types for easier access in tests
pub use badge::{BadgeClassifier, BadgeCounts, BadgeKind, LabCatalog, RawBadge};
pub use config::{AppConfig, FailurePolicy};
pub use cycle::{CycleCoordinator, CycleOutcome, CycleReport, CycleState, CycleTrigger};
pub use fetch::{FetchError, FetchedProfile, ProfileFetcher, ProfileSource};
pub use leaderboard::{LeaderboardRecord, LeaderboardTable, ProfileRow};
pub use router::build_router;
pub use scoring::{MilestoneCatalog, ScoreCalculator, ScoreResult};
pub use shared::{AppError, AppState};
pub use snapshot::{ReconcileReport, ReplicaStore, SnapshotReconciler};
