use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::models::CycleTrigger;
use crate::shared::{AppError, AppState};
use crate::snapshot::ReconcileReport;

/// HTTP handler for starting a cycle on demand
///
/// POST /api/run-scraper
/// Returns 202 when accepted, 409 when a cycle is already running
#[instrument(name = "trigger_cycle", skip(state))]
pub async fn trigger_cycle(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.coordinator.request_cycle() {
        CycleTrigger::Accepted => {
            info!("Cycle accepted");
            (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" })))
        }
        CycleTrigger::AlreadyRunning => (
            StatusCode::CONFLICT,
            Json(json!({ "status": "already running" })),
        ),
    }
}

/// HTTP handler for reconciling replicas outside a cycle
///
/// POST /api/sync
#[instrument(name = "force_sync", skip(state))]
pub async fn force_sync(State(state): State<AppState>) -> Result<Json<ReconcileReport>, AppError> {
    let report = state.reconciler.reconcile().await?;

    info!(
        canonical = report.canonical().unwrap_or("none"),
        "Forced synchronization finished"
    );

    Ok(Json(report))
}
