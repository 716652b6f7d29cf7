//! SM-2 spaced repetition algorithm.
//!
//! SuperMemo 2 with an asymmetric ease adjustment: ratings easier than
//! the correct threshold nudge the ease factor by a quadratic term,
//! harder ratings subtract a penalty that grows quadratically with the
//! distance from the threshold.

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::settings::Settings;
use crate::types::{Difficulty, ReviewState, DAY_MS};

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub min_ease: f64,
    pub max_ease: f64,
    pub initial_ease: f64,
    pub initial_interval: i64,
    pub second_interval: i64,
    pub min_interval: i64,
    pub max_interval: i64,
    pub correct_threshold: u8,
    pub easy_bonus: f64,
    pub easy_penalty: f64,
    pub easy_penalty_multiplier: f64,
    pub hard_penalty: f64,
    pub hard_penalty_linear: f64,
    pub hard_penalty_quadratic: f64,
    pub lapse_multiplier: f64,
    pub lapse_min_interval: i64,
}

impl Sm2 {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            min_ease: settings.min_ease_factor,
            max_ease: settings.max_ease_factor,
            initial_ease: settings.initial_ease_factor,
            initial_interval: settings.initial_interval,
            second_interval: settings.second_interval,
            min_interval: settings.min_interval,
            max_interval: settings.max_interval,
            correct_threshold: settings.correct_threshold,
            easy_bonus: settings.easy_bonus,
            easy_penalty: settings.easy_penalty,
            easy_penalty_multiplier: settings.easy_penalty_multiplier,
            hard_penalty: settings.hard_penalty,
            hard_penalty_linear: settings.hard_penalty_linear,
            hard_penalty_quadratic: settings.hard_penalty_quadratic,
            lapse_multiplier: settings.lapse_multiplier,
            lapse_min_interval: settings.lapse_min_interval,
        }
    }
}

impl Default for Sm2 {
    fn default() -> Self {
        Self::from_settings(&Settings::defaults(0))
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self, card_id: &str, now: i64) -> ReviewState {
        ReviewState {
            card_id: card_id.to_string(),
            interval_days: self.initial_interval,
            ease_factor: self.initial_ease,
            repetition: 0,
            next_review: now,
            last_review: 0,
            difficulty: i64::from(self.correct_threshold),
            streak: 0,
        }
    }

    fn is_correct(&self, difficulty: Difficulty) -> bool {
        difficulty.value() <= self.correct_threshold
    }

    fn schedule(&self, state: &ReviewState, difficulty: Difficulty, now: i64) -> SchedulingResult {
        let was_correct = self.is_correct(difficulty);
        let ease_factor = self.adjust_ease(state.ease_factor, difficulty);

        let (interval_days, repetition, streak) = if was_correct {
            let interval = match state.repetition {
                0 => self.initial_interval,
                1 => self.second_interval,
                _ => (state.interval_days as f64 * ease_factor).floor() as i64,
            };
            (
                interval.max(self.min_interval).min(self.max_interval),
                state.repetition + 1,
                state.streak + 1,
            )
        } else {
            // Lapse: scheduling starts over
            let shrunk = (state.interval_days as f64 * self.lapse_multiplier).floor() as i64;
            (
                shrunk.max(self.lapse_min_interval).min(self.max_interval),
                0,
                0,
            )
        };

        let next_due = now.saturating_add(interval_days.saturating_mul(DAY_MS));

        SchedulingResult {
            new_state: ReviewState {
                card_id: state.card_id.clone(),
                interval_days,
                ease_factor,
                repetition,
                next_review: next_due,
                last_review: now,
                difficulty: i64::from(difficulty.value()),
                streak,
            },
            next_due,
            was_correct,
        }
    }
}

impl Sm2 {
    fn adjust_ease(&self, ease: f64, difficulty: Difficulty) -> f64 {
        let threshold = self.correct_threshold as i64;
        let d = difficulty.value() as i64;

        let adjusted = if d < threshold {
            let distance = (threshold - d) as f64;
            ease + self.easy_bonus
                - distance * (self.easy_penalty + distance * self.easy_penalty_multiplier)
        } else if d > threshold {
            let steps = (d - (threshold + 1)) as f64;
            ease - (self.hard_penalty
                + steps * self.hard_penalty_linear
                + steps * steps * self.hard_penalty_quadratic)
        } else {
            ease
        };

        adjusted.max(self.min_ease).min(self.max_ease)
    }
}
