use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::cycle::CycleCoordinator;
use crate::leaderboard::LeaderboardError;
use crate::snapshot::{SnapshotError, SnapshotReconciler};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<SnapshotReconciler>,
    pub coordinator: Arc<CycleCoordinator>,
}

impl AppState {
    pub fn new(reconciler: Arc<SnapshotReconciler>, coordinator: Arc<CycleCoordinator>) -> Self {
        Self {
            reconciler,
            coordinator,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to write replicas: {}", .0.join(", "))]
    ReplicaWrite(Vec<String>),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl From<SnapshotError> for AppError {
    fn from(error: SnapshotError) -> Self {
        match error {
            SnapshotError::AllDestinationsFailed(ids) => AppError::ReplicaWrite(ids),
            other => AppError::Snapshot(other.to_string()),
        }
    }
}

impl From<LeaderboardError> for AppError {
    fn from(error: LeaderboardError) -> Self {
        AppError::Snapshot(format!("Stored leaderboard is malformed: {}", error))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ReplicaWrite(ids) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to write replicas: {}", ids.join(", ")),
            ),
            AppError::Snapshot(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
