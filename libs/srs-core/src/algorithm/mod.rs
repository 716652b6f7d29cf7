//! Spaced repetition algorithm implementations.

pub mod sm2;

use serde::{Deserialize, Serialize};

use crate::types::{Difficulty, ReviewState};

/// Result of scheduling a card after review.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingResult {
    pub new_state: ReviewState,
    /// Epoch milliseconds.
    pub next_due: i64,
    pub was_correct: bool,
}

/// Trait for spaced repetition algorithms.
///
/// Implementations are pure: the same state, rating and `now` always
/// produce the same result.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate next review state after a review.
    fn schedule(&self, state: &ReviewState, difficulty: Difficulty, now: i64) -> SchedulingResult;

    /// Initial state for a new card, due immediately.
    fn initial_state(&self, card_id: &str, now: i64) -> ReviewState;

    /// Whether a rating counts as a correct answer.
    fn is_correct(&self, difficulty: Difficulty) -> bool;
}

/// Outcome a rating would have, without committing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedState {
    pub card_id: String,
    pub difficulty: u8,
    pub was_correct: bool,
    pub predicted_interval_days: i64,
    pub predicted_next_review: i64,
    pub predicted_ease_factor: f64,
    pub predicted_repetition: i64,
    pub predicted_streak: i64,
    /// The state the prediction was computed from.
    pub current: ReviewState,
}

/// Run `algorithm` against `current` and describe the outcome.
pub fn predict(
    algorithm: &dyn SpacedRepetitionAlgorithm,
    current: ReviewState,
    difficulty: Difficulty,
    now: i64,
) -> PredictedState {
    let result = algorithm.schedule(&current, difficulty, now);
    PredictedState {
        card_id: current.card_id.clone(),
        difficulty: difficulty.value(),
        was_correct: result.was_correct,
        predicted_interval_days: result.new_state.interval_days,
        predicted_next_review: result.next_due,
        predicted_ease_factor: result.new_state.ease_factor,
        predicted_repetition: result.new_state.repetition,
        predicted_streak: result.new_state.streak,
        current,
    }
}

#[cfg(test)]
mod tests {
    use super::sm2::Sm2;
    use super::*;
    use crate::settings::Settings;
    use pretty_assertions::assert_eq;

    #[test]
    fn prediction_matches_schedule_and_keeps_current() {
        let sm2 = Sm2::from_settings(&Settings::defaults(0));
        let current = sm2.initial_state("card-1", 1_000);
        let difficulty = Difficulty::new(2).unwrap();

        let predicted = predict(&sm2, current.clone(), difficulty, 5_000);
        let scheduled = sm2.schedule(&current, difficulty, 5_000);

        assert_eq!(predicted.current, current);
        assert_eq!(predicted.predicted_next_review, scheduled.next_due);
        assert_eq!(predicted.predicted_interval_days, scheduled.new_state.interval_days);
        assert_eq!(predicted.predicted_ease_factor, scheduled.new_state.ease_factor);
        assert!(predicted.was_correct);
    }

    #[test]
    fn prediction_is_repeatable() {
        let sm2 = Sm2::from_settings(&Settings::defaults(0));
        let current = sm2.initial_state("card-1", 0);
        let difficulty = Difficulty::new(4).unwrap();

        let first = predict(&sm2, current.clone(), difficulty, 10);
        let second = predict(&sm2, current, difficulty, 10);

        assert_eq!(first, second);
    }
}
