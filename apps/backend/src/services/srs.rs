//! Review scheduling service.
//!
//! Loads state and settings, runs the algorithm from srs-core and
//! persists the outcome. Reviews commit with a compare-and-swap on the
//! stored row and retry from a fresh read when they lose a race.
//! Previews never write.

use std::collections::HashSet;
use std::sync::Arc;

use srs_core::algorithm::predict;
use srs_core::streak::{self, MAX_STREAK_DAYS};
use srs_core::{
    diagnostics, stats, Clock, Difficulty, SpacedRepetitionAlgorithm, Sm2, DAY_MS,
};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::*;

/// Attempts before a contended review gives up with `Conflict`.
pub const MAX_COMMIT_ATTEMPTS: usize = 5;

pub struct SrsService {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    due_default_limit: i64,
}

impl SrsService {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>, due_default_limit: i64) -> Self {
        Self {
            db,
            clock,
            due_default_limit,
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    // === Settings ===

    /// The active profile, or the built-in defaults if none is stored.
    pub async fn settings(&self) -> Result<Settings> {
        Ok(match self.db.get_settings().await? {
            Some(row) => row.to_core_settings(),
            None => Settings::defaults(self.now()),
        })
    }

    /// Merge `update` onto the stored profile. Nothing is written when
    /// validation fails.
    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings> {
        let current = self.settings().await?;
        let next = update.apply(&current, self.now())?;
        self.db.save_settings(&next).await?;
        tracing::info!(profile = %next.id, "settings updated");
        Ok(next)
    }

    pub async fn reset_settings(&self) -> Result<Settings> {
        let current = self.settings().await?;
        let next = current.reset(self.now());
        self.db.save_settings(&next).await?;
        tracing::info!(profile = %next.id, "settings reset to defaults");
        Ok(next)
    }

    // === Review State Lifecycle ===

    /// Stored state for `card_id`, creating the initial one first if the
    /// card has none. Reviewing an unknown card therefore always succeeds.
    pub async fn get_or_initialize(&self, card_id: &str) -> Result<ReviewState> {
        Ok(self.load_or_initialize(card_id).await?.to_core_state())
    }

    async fn load_or_initialize(&self, card_id: &str) -> Result<DbReviewState> {
        if let Some(row) = self.db.get_review(card_id).await? {
            return Ok(row);
        }

        self.initialize_card(card_id).await?;

        // Re-read: a concurrent initializer or reviewer may have won.
        self.db
            .get_review(card_id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("Review state for {card_id} vanished")))
    }

    /// Insert the initial state unless one exists. Returns whether a row
    /// was written.
    pub async fn initialize_card(&self, card_id: &str) -> Result<bool> {
        let settings = self.settings().await?;
        let initial = Sm2::from_settings(&settings).initial_state(card_id, self.now());
        let created = self
            .db
            .insert_review_if_absent(&DbReviewState::from_core_state(&initial))
            .await?;
        if created {
            tracing::debug!(card_id, "review state initialized");
        }
        Ok(created)
    }

    pub async fn get_review(&self, card_id: &str) -> Result<Option<ReviewState>> {
        Ok(self.db.get_review(card_id).await?.map(|r| r.to_core_state()))
    }

    pub async fn list_reviews(&self, query: &ReviewsQuery) -> Result<Vec<ReviewState>> {
        if query.limit.is_some_and(|l| l < 0) || query.offset.is_some_and(|o| o < 0) {
            return Err(ApiError::BadRequest(
                "limit and offset must not be negative".to_string(),
            ));
        }
        let rows = self
            .db
            .list_reviews(query.limit, query.offset, query.changed_since)
            .await?;
        Ok(rows.iter().map(DbReviewState::to_core_state).collect())
    }

    // === Review & Preview ===

    /// Apply `difficulty` to the card and persist the new state.
    pub async fn review(&self, card_id: &str, difficulty: Difficulty) -> Result<ReviewState> {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let stored = self.load_or_initialize(card_id).await?;
            let current = stored.to_core_state();
            let settings = self.settings().await?;
            let now = self.now();

            let result = Sm2::from_settings(&settings).schedule(&current, difficulty, now);
            let entry = ReviewLogEntry::new(&current, &result.new_state, result.was_correct);

            if self
                .db
                .commit_review(&stored, &result.new_state, &entry, now)
                .await?
            {
                tracing::info!(
                    card_id,
                    difficulty = difficulty.value(),
                    interval_days = result.new_state.interval_days,
                    was_correct = result.was_correct,
                    "review committed"
                );
                return Ok(result.new_state);
            }

            tracing::debug!(card_id, attempt, "review state changed underneath, retrying");
        }

        Err(ApiError::Conflict(format!(
            "Card {card_id} is being reviewed concurrently, try again"
        )))
    }

    /// What `difficulty` would do to the card, without writing anything.
    /// A card without state is previewed from a transient initial state.
    pub async fn preview(&self, card_id: &str, difficulty: Difficulty) -> Result<PredictedState> {
        let settings = self.settings().await?;
        let sm2 = Sm2::from_settings(&settings);
        let now = self.now();

        let current = match self.db.get_review(card_id).await? {
            Some(row) => row.to_core_state(),
            None => sm2.initial_state(card_id, now),
        };

        Ok(predict(&sm2, current, difficulty, now))
    }

    // === Due Queue ===

    /// Due cards, soonest first. An empty result triggers a backfill of
    /// review state for the newest flashcards that have none.
    pub async fn due(&self, limit: Option<i64>) -> Result<Vec<ReviewState>> {
        let limit = limit.unwrap_or(self.due_default_limit);
        if limit < 1 {
            return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
        }

        let mut rows = self.db.due_reviews(self.now(), limit).await?;

        if rows.is_empty() {
            match self.backfill(limit).await {
                Ok(0) => {}
                Ok(seeded) => {
                    tracing::info!(seeded, "seeded review state for new flashcards");
                    rows = self.db.due_reviews(self.now(), limit).await?;
                }
                Err(e) => tracing::warn!(error = %e, "due backfill failed"),
            }
        }

        Ok(rows.iter().map(DbReviewState::to_core_state).collect())
    }

    async fn backfill(&self, limit: i64) -> Result<usize> {
        let mut seeded = 0;
        for card_id in self.db.flashcards_without_review(limit).await? {
            if self.initialize_card(&card_id).await? {
                seeded += 1;
            }
        }
        Ok(seeded)
    }

    // === Stats & Streak ===

    pub async fn stats(&self) -> Result<Stats> {
        Ok(self.db.get_stats().await?.to_core_stats())
    }

    /// Relative counter adjustment. Counters only grow, and correct
    /// answers may not outgrow total reviews.
    pub async fn adjust_stats(&self, total_delta: i64, correct_delta: i64) -> Result<Stats> {
        if total_delta < 0 || correct_delta < 0 {
            return Err(ApiError::BadRequest("deltas must not be negative".to_string()));
        }
        if correct_delta > total_delta {
            return Err(ApiError::BadRequest(
                "correct_answers_delta cannot exceed total_reviews_delta".to_string(),
            ));
        }
        self.db
            .increment_stats(total_delta, correct_delta, self.now())
            .await?;
        self.stats().await
    }

    pub async fn streak(&self) -> Result<StreakInfo> {
        let settings = self.settings().await?;
        let now = self.now();
        let since = now - (MAX_STREAK_DAYS + 1) * DAY_MS;

        let log = self.db.review_log_since(since).await?;
        let days = streak::qualifying_days(
            log.into_iter()
                .map(|(at, d)| (at, u8::try_from(d).unwrap_or(u8::MAX))),
            settings.correct_threshold,
        );

        Ok(streak::current_streak(&days, now))
    }

    pub async fn overview(&self) -> Result<StatsOverview> {
        let settings = self.settings().await?;
        let totals = self.stats().await?;
        let states = self.all_states().await?;
        Ok(stats::overview(&totals, &states, &settings))
    }

    /// Read-only integrity pass over the stored review data.
    pub async fn diagnostics(&self) -> Result<IntegrityReport> {
        let settings = self.settings().await?;
        let totals = self.stats().await?;
        let states = self.all_states().await?;
        let cards: HashSet<String> = self.db.flashcard_ids().await?.into_iter().collect();

        let report = diagnostics::check(&states, &totals, &settings, Some(&cards), self.now());
        for anomaly in &report.anomalies {
            tracing::warn!(?anomaly, severity = ?anomaly.severity(), "integrity anomaly");
        }
        Ok(report)
    }

    async fn all_states(&self) -> Result<Vec<ReviewState>> {
        let rows = self.db.list_reviews(None, None, None).await?;
        Ok(rows.iter().map(DbReviewState::to_core_state).collect())
    }

    // === Flashcards ===

    /// Create a flashcard and make it reviewable right away.
    pub async fn create_flashcard(
        &self,
        request: CreateFlashcardRequest,
    ) -> Result<(Flashcard, ReviewState)> {
        if request.front.trim().is_empty() || request.back.trim().is_empty() {
            return Err(ApiError::BadRequest("front and back are required".to_string()));
        }

        let id = request
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = self.now();
        let tags = serde_json::to_string(&request.tags)
            .map_err(|e| ApiError::Internal(format!("Failed to encode tags: {e}")))?;

        let card = DbFlashcard {
            id: id.clone(),
            front: request.front,
            back: request.back,
            reading: request.reading,
            image_path: request.image_path,
            notes: request.notes,
            tags,
            created_at: now,
        };

        let settings = self.settings().await?;
        let initial = Sm2::from_settings(&settings).initial_state(&id, now);
        self.db
            .insert_flashcard(&card, &DbReviewState::from_core_state(&initial))
            .await?;
        tracing::info!(card_id = %id, "flashcard created");

        // A card reviewed before it existed keeps its earlier state.
        let review = self.get_or_initialize(&id).await?;
        Ok((card.to_api_card(), review))
    }

    pub async fn get_flashcard(&self, id: &str) -> Result<Flashcard> {
        self.db
            .get_flashcard(id)
            .await?
            .map(|c| c.to_api_card())
            .ok_or_else(|| ApiError::NotFound(format!("Flashcard {id}")))
    }

    pub async fn list_flashcards(&self, page: &PageQuery) -> Result<Vec<Flashcard>> {
        let cards = self.db.list_flashcards(page.limit, page.offset).await?;
        Ok(cards.iter().map(DbFlashcard::to_api_card).collect())
    }

    /// Delete a flashcard and cascade to its review state.
    pub async fn delete_flashcard(&self, id: &str) -> Result<bool> {
        let review_removed = self
            .db
            .delete_flashcard(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Flashcard {id}")))?;
        tracing::info!(card_id = %id, review_removed, "flashcard deleted");
        Ok(review_removed)
    }
}
