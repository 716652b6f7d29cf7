//! Stats, streak and diagnostics endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/srs/stats
pub async fn get(State(state): State<AppState>) -> Result<Json<StatsSnapshot>> {
    Ok(Json(state.srs.stats().await?.into()))
}

/// POST /api/srs/stats
pub async fn adjust(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StatsDeltaRequest>, JsonRejection>,
) -> Result<Json<StatsSnapshot>> {
    let Json(request) = payload?;
    let stats = state
        .srs
        .adjust_stats(request.total_reviews_delta, request.correct_answers_delta)
        .await?;
    Ok(Json(stats.into()))
}

/// GET /api/srs/stats/overview
pub async fn overview(State(state): State<AppState>) -> Result<Json<StatsOverview>> {
    Ok(Json(state.srs.overview().await?))
}

/// GET /api/srs/streak
pub async fn streak(State(state): State<AppState>) -> Result<Json<StreakInfo>> {
    Ok(Json(state.srs.streak().await?))
}

/// GET /api/srs/diagnostics
pub async fn diagnostics(State(state): State<AppState>) -> Result<Json<IntegrityReport>> {
    Ok(Json(state.srs.diagnostics().await?))
}
