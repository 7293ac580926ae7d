use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{models::LeaderboardRecord, service::LeaderboardService};
use crate::shared::{AppError, AppState};

const NOT_FOUND_MESSAGE: &str = "Leaderboard data not found";

/// HTTP handler for reading the leaderboard
///
/// GET /api/leaderboard
/// Returns rows ordered by total points, highest first
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardRecord>>, AppError> {
    let service = LeaderboardService::new(Arc::clone(&state.reconciler));
    let table = service
        .current_table()
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    info!(rows = table.len(), "Leaderboard served");

    Ok(Json(table.records()))
}

/// HTTP handler for the raw CSV export
///
/// GET /api/csv
#[instrument(name = "get_csv", skip(state))]
pub async fn get_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let service = LeaderboardService::new(Arc::clone(&state.reconciler));
    let bytes = service
        .raw_export()
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    info!(size_bytes = bytes.len(), "CSV export served");

    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], bytes))
}
