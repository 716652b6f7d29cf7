//! Settings endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/srs/settings
pub async fn get(State(state): State<AppState>) -> Result<Json<Settings>> {
    Ok(Json(state.srs.settings().await?))
}

/// POST /api/srs/settings
///
/// Partial update. Fields left out keep their stored value; `id`,
/// `created_at` and `updated_at` in the body are ignored.
pub async fn update(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<Settings>> {
    let Json(update) = payload?;
    Ok(Json(state.srs.update_settings(&update).await?))
}

/// POST /api/srs/settings/reset
pub async fn reset(State(state): State<AppState>) -> Result<Json<Settings>> {
    Ok(Json(state.srs.reset_settings().await?))
}
