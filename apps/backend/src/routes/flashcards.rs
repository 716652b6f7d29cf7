//! Flashcard endpoints. Only what the review engine needs: creation
//! with eager review-state setup, lookup and cascading delete.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// POST /api/flashcards
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateFlashcardRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateFlashcardResponse>)> {
    let Json(request) = payload?;
    let (flashcard, review) = state.srs.create_flashcard(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateFlashcardResponse { flashcard, review }),
    ))
}

/// GET /api/flashcards
pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<FlashcardListResponse>> {
    let Query(page) = query?;
    let flashcards = state.srs.list_flashcards(&page).await?;
    Ok(Json(FlashcardListResponse { flashcards }))
}

/// GET /api/flashcards/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Flashcard>> {
    Ok(Json(state.srs.get_flashcard(&id).await?))
}

/// DELETE /api/flashcards/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteFlashcardResponse>> {
    let review_removed = state.srs.delete_flashcard(&id).await?;
    Ok(Json(DeleteFlashcardResponse { id, review_removed }))
}
