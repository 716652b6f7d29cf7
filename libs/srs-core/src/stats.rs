//! Aggregates derived from the stored review states.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::types::{ReviewState, Stats};

/// Card ids grouped by learning stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalBuckets {
    /// Never answered correctly since the last lapse.
    pub new: Vec<String>,
    pub learning: Vec<String>,
    /// Interval at or above the graduation interval.
    pub mature: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsOverview {
    pub total_reviews: i64,
    pub correct_answers: i64,
    /// Percentage, `0.0` before any review.
    pub accuracy: f64,
    pub cards_learned: usize,
    pub cards_mature: usize,
    pub average_ease: f64,
    pub buckets: IntervalBuckets,
}

/// Group states into new / learning / mature.
pub fn bucket_by_interval(states: &[ReviewState], graduation_interval: i64) -> IntervalBuckets {
    let mut buckets = IntervalBuckets::default();
    for state in states {
        let id = state.card_id.clone();
        if state.repetition == 0 {
            buckets.new.push(id);
        } else if state.interval_days < graduation_interval {
            buckets.learning.push(id);
        } else {
            buckets.mature.push(id);
        }
    }
    buckets
}

pub fn overview(stats: &Stats, states: &[ReviewState], settings: &Settings) -> StatsOverview {
    let cards_learned = states.iter().filter(|s| s.repetition > 0).count();
    let cards_mature = states
        .iter()
        .filter(|s| s.interval_days >= settings.graduation_interval)
        .count();
    let average_ease = if states.is_empty() {
        settings.initial_ease_factor
    } else {
        states.iter().map(|s| s.ease_factor).sum::<f64>() / states.len() as f64
    };

    StatsOverview {
        total_reviews: stats.total_reviews,
        correct_answers: stats.correct_answers,
        accuracy: stats.accuracy(),
        cards_learned,
        cards_mature,
        average_ease,
        buckets: bucket_by_interval(states, settings.graduation_interval),
    }
}
