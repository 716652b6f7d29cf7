//! Test fixtures and factory functions for creating request bodies.

use serde_json::{json, Value};

/// UI-scale ratings.
pub const AGAIN: i64 = 1;
pub const HARD: i64 = 2;
pub const GOOD: i64 = 3;
pub const EASY: i64 = 4;

/// Create a review request body (UI scale).
pub fn review_request(card_id: &str, difficulty: i64) -> Value {
    json!({ "card_id": card_id, "difficulty": difficulty })
}

/// Create a preview request body (engine scale).
pub fn preview_request(card_id: &str, difficulty: i64) -> Value {
    json!({ "card_id": card_id, "difficulty": difficulty })
}

/// Create a flashcard body with a generated id.
pub fn flashcard(front: &str, back: &str) -> Value {
    json!({
        "front": front,
        "back": back,
        "reading": "よみ",
        "tags": ["n5", "manga"],
    })
}

/// Create a flashcard body with an explicit id.
pub fn flashcard_with_id(id: &str, front: &str, back: &str) -> Value {
    json!({ "id": id, "front": front, "back": back })
}
