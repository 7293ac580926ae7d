use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cycle::{force_sync, trigger_cycle};
use crate::leaderboard::{get_csv, get_leaderboard};
use crate::shared::AppState;

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/csv", get(get_csv))
        .route("/api/run-scraper", post(trigger_cycle))
        .route("/api/sync", post(force_sync))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
