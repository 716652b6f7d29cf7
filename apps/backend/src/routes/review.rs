//! Review, preview and due-queue endpoints

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};
use srs_core::{Difficulty, UiRating};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// POST /api/srs/review
///
/// `difficulty` is on the 4-point UI scale and is mapped onto the
/// engine scale before scheduling.
pub async fn review(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewResponse>> {
    let Json(request) = payload?;
    let card_id = required_card_id(&request.card_id)?;

    let difficulty = UiRating::map_value(request.difficulty);
    let review = state.srs.review(card_id, difficulty).await?;

    let server_time = state.srs.now();
    let next_review_in_ms = (review.next_review - server_time).max(0);

    Ok(Json(ReviewResponse {
        review,
        meta: ReviewMeta {
            server_time,
            next_review_in_ms,
        },
    }))
}

/// POST /api/srs/preview
///
/// `difficulty` is on the engine scale (1-5).
pub async fn preview(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<PreviewResponse>> {
    let Json(request) = payload?;
    let card_id = required_card_id(&request.card_id)?;
    let difficulty = Difficulty::new(request.difficulty)?;

    let preview = state.srs.preview(card_id, difficulty).await?;

    Ok(Json(PreviewResponse {
        preview,
        meta: ServerMeta {
            server_time: state.srs.now(),
        },
    }))
}

/// GET /api/srs/due
pub async fn due(
    State(state): State<AppState>,
    query: std::result::Result<Query<DueQuery>, QueryRejection>,
) -> Result<Json<DueResponse>> {
    let Query(query) = query?;
    let cards = state.srs.due(query.limit).await?;
    Ok(Json(DueResponse { cards }))
}

/// GET /api/srs/reviews
pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<ReviewsQuery>, QueryRejection>,
) -> Result<Json<ReviewsResponse>> {
    let Query(query) = query?;
    let reviews = state.srs.list_reviews(&query).await?;
    Ok(Json(ReviewsResponse {
        reviews,
        paging: query,
    }))
}

/// GET /api/srs/reviews/{card_id}
pub async fn get_one(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> Result<Json<SingleReviewResponse>> {
    let review = state.srs.get_review(&card_id).await?;
    Ok(Json(SingleReviewResponse { review }))
}

fn required_card_id(card_id: &str) -> Result<&str> {
    let trimmed = card_id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest("Missing field: card_id".to_string()));
    }
    Ok(trimmed)
}
