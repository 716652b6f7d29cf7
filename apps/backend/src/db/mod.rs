//! SQLite database operations

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use srs_core::{ReviewState, Settings, DEFAULT_PROFILE_ID};

use crate::error::{ApiError, Result};
use crate::models::*;

const REVIEW_COLUMNS: &str =
    "card_id, interval_days, ease_factor, repetition, next_review, last_review, difficulty, streak";

const FLASHCARD_COLUMNS: &str = "id, front, back, reading, image_path, notes, tags, created_at";

const STATS_ROW_ID: i64 = 1;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite, creating the file if needed
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Private in-memory database. One connection that never expires,
    /// since each connection would otherwise get its own empty database.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Seed the stats and settings singletons. Existing rows are kept.
    pub async fn ensure_defaults(&self, now: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO srs_stats (id, total_reviews, correct_answers, last_updated)
            VALUES (?, 0, 0, ?)
            "#,
        )
        .bind(STATS_ROW_ID)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.write_settings("INSERT OR IGNORE", &Settings::defaults(now))
            .await
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // === Review State Repository ===

    pub async fn get_review(&self, card_id: &str) -> Result<Option<DbReviewState>> {
        let row = sqlx::query_as::<_, DbReviewState>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM srs_reviews WHERE card_id = ?"
        ))
        .bind(card_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Insert a fresh state unless the card already has one. Returns
    /// whether a row was written.
    pub async fn insert_review_if_absent(&self, state: &DbReviewState) -> Result<bool> {
        let result = sqlx::query(&format!(
            "INSERT OR IGNORE INTO srs_reviews ({REVIEW_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&state.card_id)
        .bind(state.interval_days)
        .bind(state.ease_factor)
        .bind(state.repetition)
        .bind(state.next_review)
        .bind(state.last_review)
        .bind(state.difficulty)
        .bind(state.streak)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// All states, soonest due first. `changed_since` keeps rows whose
    /// `last_review` or `next_review` is at or after it.
    pub async fn list_reviews(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
        changed_since: Option<i64>,
    ) -> Result<Vec<DbReviewState>> {
        let rows = sqlx::query_as::<_, DbReviewState>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM srs_reviews
            WHERE (? IS NULL OR last_review >= ? OR next_review >= ?)
            ORDER BY next_review ASC, card_id ASC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(changed_since)
        .bind(changed_since)
        .bind(changed_since)
        // SQLite treats a negative LIMIT as unbounded
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0).max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// States with `next_review <= now`, soonest first.
    pub async fn due_reviews(&self, now: i64, limit: i64) -> Result<Vec<DbReviewState>> {
        let rows = sqlx::query_as::<_, DbReviewState>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM srs_reviews
            WHERE next_review <= ?
            ORDER BY next_review ASC, card_id ASC
            LIMIT ?
            "#
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Write `next` only if the stored row still equals `expected`, then
    /// append to the log and bump the counters in the same transaction.
    /// Returns `false` when another writer got there first.
    ///
    /// Every column takes part in the comparison. Matching on the
    /// timestamps alone would accept a stale read when two commits land
    /// in the same millisecond with the same interval.
    pub async fn commit_review(
        &self,
        expected: &DbReviewState,
        next: &ReviewState,
        entry: &ReviewLogEntry,
        now: i64,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE srs_reviews
            SET interval_days = ?, ease_factor = ?, repetition = ?,
                next_review = ?, last_review = ?, difficulty = ?, streak = ?
            WHERE card_id = ? AND interval_days = ? AND ease_factor = ? AND repetition = ?
              AND next_review = ? AND last_review = ? AND difficulty = ? AND streak = ?
            "#,
        )
        .bind(next.interval_days)
        .bind(next.ease_factor)
        .bind(next.repetition)
        .bind(next.next_review)
        .bind(next.last_review)
        .bind(next.difficulty)
        .bind(next.streak)
        .bind(&expected.card_id)
        .bind(expected.interval_days)
        .bind(expected.ease_factor)
        .bind(expected.repetition)
        .bind(expected.next_review)
        .bind(expected.last_review)
        .bind(expected.difficulty)
        .bind(expected.streak)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO srs_review_log
                (card_id, reviewed_at, difficulty, was_correct,
                 interval_before, interval_after, ease_before, ease_after)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.card_id)
        .bind(entry.reviewed_at)
        .bind(entry.difficulty)
        .bind(entry.was_correct)
        .bind(entry.interval_before)
        .bind(entry.interval_after)
        .bind(entry.ease_before)
        .bind(entry.ease_after)
        .execute(&mut *tx)
        .await?;

        // The singleton row may be missing; create it on first use
        sqlx::query(
            r#"
            INSERT INTO srs_stats (id, total_reviews, correct_answers, last_updated)
            VALUES (?, 1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                total_reviews = total_reviews + 1,
                correct_answers = correct_answers + excluded.correct_answers,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(STATS_ROW_ID)
        .bind(i64::from(entry.was_correct))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    // === Review Log ===

    /// `(reviewed_at, difficulty)` of every logged review at or after `since`.
    pub async fn review_log_since(&self, since: i64) -> Result<Vec<(i64, i64)>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT reviewed_at, difficulty
            FROM srs_review_log
            WHERE reviewed_at >= ?
            ORDER BY reviewed_at DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_review_log(&self, card_id: &str) -> Result<i64> {
        let (count,) =
            sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM srs_review_log WHERE card_id = ?")
                .bind(card_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    // === Stats ===

    pub async fn get_stats(&self) -> Result<DbStats> {
        let row = sqlx::query_as::<_, DbStats>(
            "SELECT total_reviews, correct_answers, last_updated FROM srs_stats WHERE id = ?",
        )
        .bind(STATS_ROW_ID)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.unwrap_or(DbStats {
            total_reviews: 0,
            correct_answers: 0,
            last_updated: 0,
        }))
    }

    /// Relative update; never overwrites concurrent increments.
    pub async fn increment_stats(&self, total_delta: i64, correct_delta: i64, now: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO srs_stats (id, total_reviews, correct_answers, last_updated)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                total_reviews = total_reviews + excluded.total_reviews,
                correct_answers = correct_answers + excluded.correct_answers,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(STATS_ROW_ID)
        .bind(total_delta)
        .bind(correct_delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Settings ===

    pub async fn get_settings(&self) -> Result<Option<DbSettings>> {
        let row = sqlx::query_as::<_, DbSettings>("SELECT * FROM srs_settings WHERE id = ?")
            .bind(DEFAULT_PROFILE_ID)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.write_settings("INSERT OR REPLACE", settings).await
    }

    async fn write_settings(&self, verb: &str, s: &Settings) -> Result<()> {
        sqlx::query(&format!(
            r#"
            {verb} INTO srs_settings (
                id, name, min_ease_factor, max_ease_factor, initial_ease_factor,
                initial_interval, second_interval, max_difficulty, correct_threshold,
                easy_bonus, easy_penalty, easy_penalty_multiplier,
                hard_penalty, hard_penalty_linear, hard_penalty_quadratic,
                graduation_interval, max_interval, min_interval,
                lapse_multiplier, lapse_min_interval, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        ))
        .bind(&s.id)
        .bind(&s.name)
        .bind(s.min_ease_factor)
        .bind(s.max_ease_factor)
        .bind(s.initial_ease_factor)
        .bind(s.initial_interval)
        .bind(s.second_interval)
        .bind(s.max_difficulty as i64)
        .bind(s.correct_threshold as i64)
        .bind(s.easy_bonus)
        .bind(s.easy_penalty)
        .bind(s.easy_penalty_multiplier)
        .bind(s.hard_penalty)
        .bind(s.hard_penalty_linear)
        .bind(s.hard_penalty_quadratic)
        .bind(s.graduation_interval)
        .bind(s.max_interval)
        .bind(s.min_interval)
        .bind(s.lapse_multiplier)
        .bind(s.lapse_min_interval)
        .bind(s.created_at)
        .bind(s.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Flashcard Repository ===

    /// Insert a flashcard together with its initial review state.
    pub async fn insert_flashcard(&self, card: &DbFlashcard, initial: &DbReviewState) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(&format!(
            "INSERT INTO flashcards ({FLASHCARD_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&card.id)
        .bind(&card.front)
        .bind(&card.back)
        .bind(&card.reading)
        .bind(&card.image_path)
        .bind(&card.notes)
        .bind(&card.tags)
        .bind(card.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            let duplicate = e
                .as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false);
            if duplicate {
                return Err(ApiError::Conflict(format!("Flashcard {} already exists", card.id)));
            }
            return Err(e.into());
        }

        sqlx::query(&format!(
            "INSERT OR IGNORE INTO srs_reviews ({REVIEW_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&initial.card_id)
        .bind(initial.interval_days)
        .bind(initial.ease_factor)
        .bind(initial.repetition)
        .bind(initial.next_review)
        .bind(initial.last_review)
        .bind(initial.difficulty)
        .bind(initial.streak)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_flashcard(&self, id: &str) -> Result<Option<DbFlashcard>> {
        let card = sqlx::query_as::<_, DbFlashcard>(&format!(
            "SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    /// Newest first.
    pub async fn list_flashcards(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<DbFlashcard>> {
        let cards = sqlx::query_as::<_, DbFlashcard>(&format!(
            r#"
            SELECT {FLASHCARD_COLUMNS}
            FROM flashcards
            ORDER BY created_at DESC, id ASC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0).max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    /// Delete a flashcard and its review state. The review log is kept.
    /// Returns `None` when the flashcard does not exist, otherwise whether
    /// a review state was removed.
    pub async fn delete_flashcard(&self, id: &str) -> Result<Option<bool>> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM flashcards WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let review = sqlx::query("DELETE FROM srs_reviews WHERE card_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(review.rows_affected() > 0))
    }

    /// Ids of the newest flashcards that have no review state yet.
    pub async fn flashcards_without_review(&self, limit: i64) -> Result<Vec<String>> {
        let ids = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT f.id
            FROM flashcards f
            LEFT JOIN srs_reviews r ON r.card_id = f.id
            WHERE r.card_id IS NULL
            ORDER BY f.created_at DESC, f.id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    pub async fn flashcard_ids(&self) -> Result<Vec<String>> {
        let ids = sqlx::query_as::<_, (String,)>("SELECT id FROM flashcards")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
