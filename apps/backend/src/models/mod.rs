//! Database models and API types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Re-export shared types from srs-core
pub use srs_core::{
    IntegrityReport, PredictedState, ReviewState, Settings, SettingsUpdate, Stats, StatsOverview,
    StreakInfo,
};

// === Database Entity Types ===

/// Review state row in SQLite
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReviewState {
    pub card_id: String,
    pub interval_days: i64,
    pub ease_factor: f64,
    pub repetition: i64,
    pub next_review: i64,
    pub last_review: i64,
    pub difficulty: i64,
    pub streak: i64,
}

impl DbReviewState {
    /// Create from srs-core ReviewState
    pub fn from_core_state(state: &ReviewState) -> Self {
        Self {
            card_id: state.card_id.clone(),
            interval_days: state.interval_days,
            ease_factor: state.ease_factor,
            repetition: state.repetition,
            next_review: state.next_review,
            last_review: state.last_review,
            difficulty: state.difficulty,
            streak: state.streak,
        }
    }

    /// Convert to srs-core ReviewState
    pub fn to_core_state(&self) -> ReviewState {
        ReviewState {
            card_id: self.card_id.clone(),
            interval_days: self.interval_days,
            ease_factor: self.ease_factor,
            repetition: self.repetition,
            next_review: self.next_review,
            last_review: self.last_review,
            difficulty: self.difficulty,
            streak: self.streak,
        }
    }
}

/// Settings row in SQLite
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSettings {
    pub id: String,
    pub name: String,
    pub min_ease_factor: f64,
    pub max_ease_factor: f64,
    pub initial_ease_factor: f64,
    pub initial_interval: i64,
    pub second_interval: i64,
    pub max_difficulty: i64,
    pub correct_threshold: i64,
    pub easy_bonus: f64,
    pub easy_penalty: f64,
    pub easy_penalty_multiplier: f64,
    pub hard_penalty: f64,
    pub hard_penalty_linear: f64,
    pub hard_penalty_quadratic: f64,
    pub graduation_interval: i64,
    pub max_interval: i64,
    pub min_interval: i64,
    pub lapse_multiplier: f64,
    pub lapse_min_interval: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DbSettings {
    pub fn to_core_settings(&self) -> Settings {
        Settings {
            id: self.id.clone(),
            name: self.name.clone(),
            min_ease_factor: self.min_ease_factor,
            max_ease_factor: self.max_ease_factor,
            initial_ease_factor: self.initial_ease_factor,
            initial_interval: self.initial_interval,
            second_interval: self.second_interval,
            max_difficulty: small_int(self.max_difficulty),
            correct_threshold: small_int(self.correct_threshold),
            easy_bonus: self.easy_bonus,
            easy_penalty: self.easy_penalty,
            easy_penalty_multiplier: self.easy_penalty_multiplier,
            hard_penalty: self.hard_penalty,
            hard_penalty_linear: self.hard_penalty_linear,
            hard_penalty_quadratic: self.hard_penalty_quadratic,
            graduation_interval: self.graduation_interval,
            max_interval: self.max_interval,
            min_interval: self.min_interval,
            lapse_multiplier: self.lapse_multiplier,
            lapse_min_interval: self.lapse_min_interval,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Stats singleton row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, FromRow)]
pub struct DbStats {
    pub total_reviews: i64,
    pub correct_answers: i64,
    pub last_updated: i64,
}

impl DbStats {
    pub fn to_core_stats(&self) -> Stats {
        Stats {
            total_reviews: self.total_reviews,
            correct_answers: self.correct_answers,
            last_updated: self.last_updated,
        }
    }
}

/// One committed review, appended to `srs_review_log`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewLogEntry {
    pub card_id: String,
    pub reviewed_at: i64,
    pub difficulty: i64,
    pub was_correct: bool,
    pub interval_before: i64,
    pub interval_after: i64,
    pub ease_before: f64,
    pub ease_after: f64,
}

impl ReviewLogEntry {
    pub fn new(before: &ReviewState, after: &ReviewState, was_correct: bool) -> Self {
        Self {
            card_id: after.card_id.clone(),
            reviewed_at: after.last_review,
            difficulty: after.difficulty,
            was_correct,
            interval_before: before.interval_days,
            interval_after: after.interval_days,
            ease_before: before.ease_factor,
            ease_after: after.ease_factor,
        }
    }
}

/// Flashcard stored in SQLite
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbFlashcard {
    pub id: String,
    pub front: String,
    pub back: String,
    pub reading: Option<String>,
    pub image_path: Option<String>,
    pub notes: Option<String>,
    /// JSON array of strings
    pub tags: String,
    pub created_at: i64,
}

impl DbFlashcard {
    /// Convert to API flashcard type
    pub fn to_api_card(&self) -> Flashcard {
        Flashcard {
            id: self.id.clone(),
            front: self.front.clone(),
            back: self.back.clone(),
            reading: self.reading.clone(),
            image_path: self.image_path.clone(),
            notes: self.notes.clone(),
            tags: serde_json::from_str(&self.tags).unwrap_or_default(),
            created_at: self.created_at,
        }
    }
}

/// Settings thresholds are small; corrupt stored values saturate.
fn small_int(value: i64) -> u8 {
    value.clamp(0, u8::MAX as i64) as u8
}

// === API Request/Response Types ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub front: String,
    pub back: String,
    pub reading: Option<String>,
    pub image_path: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFlashcardRequest {
    /// Generated when absent
    #[serde(default)]
    pub id: Option<String>,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub reading: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFlashcardResponse {
    pub flashcard: Flashcard,
    pub review: ReviewState,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteFlashcardResponse {
    pub id: String,
    pub review_removed: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlashcardListResponse {
    pub flashcards: Vec<Flashcard>,
}

/// Review submission on the 4-point UI scale
#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub card_id: String,
    pub difficulty: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewMeta {
    pub server_time: i64,
    pub next_review_in_ms: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub review: ReviewState,
    pub meta: ReviewMeta,
}

/// Preview on the engine scale (1-5)
#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub card_id: String,
    pub difficulty: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerMeta {
    pub server_time: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub preview: PredictedState,
    pub meta: ServerMeta,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DueQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DueResponse {
    pub cards: Vec<ReviewState>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReviewsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub changed_since: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<ReviewState>,
    pub paging: ReviewsQuery,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SingleReviewResponse {
    pub review: Option<ReviewState>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_reviews: i64,
    pub correct_answers: i64,
    pub last_updated: i64,
    pub accuracy: f64,
}

impl From<Stats> for StatsSnapshot {
    fn from(stats: Stats) -> Self {
        Self {
            total_reviews: stats.total_reviews,
            correct_answers: stats.correct_answers,
            last_updated: stats.last_updated,
            accuracy: stats.accuracy(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StatsDeltaRequest {
    #[serde(default)]
    pub total_reviews_delta: i64,
    #[serde(default)]
    pub correct_answers_delta: i64,
}
