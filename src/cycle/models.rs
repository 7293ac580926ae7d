use serde::Serialize;

use crate::snapshot::ReconcileReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    Idle,
    Running,
}

/// Answer to an on-demand trigger; never waits for the cycle itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    Accepted,
    AlreadyRunning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Rejected without doing any work
    AlreadyRunning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub cycle_id: String,
    pub profiles_scored: usize,
    pub profiles_failed: usize,
    pub reconcile: ReconcileReport,
}
