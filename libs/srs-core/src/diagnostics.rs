//! Read-only integrity check over stored review data.
//!
//! Anomalies are reported, never repaired. None of them is raised during
//! normal operation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::types::{ReviewState, Stats, MAX_DIFFICULTY, MIN_DIFFICULTY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// `last_review` later than `next_review`.
    StaleSchedule {
        card_id: String,
        last_review: i64,
        next_review: i64,
    },
    InvalidInterval { card_id: String, interval_days: i64 },
    EaseOutOfBounds { card_id: String, ease_factor: f64 },
    InvalidDifficulty { card_id: String, difficulty: i64 },
    /// Review state whose flashcard no longer exists.
    OrphanReview { card_id: String },
    StatsOverflow {
        total_reviews: i64,
        correct_answers: i64,
    },
}

impl Anomaly {
    pub fn severity(&self) -> Severity {
        match self {
            Self::StaleSchedule { .. } | Self::InvalidInterval { .. } | Self::StatsOverflow { .. } => {
                Severity::Critical
            }
            Self::EaseOutOfBounds { .. } | Self::InvalidDifficulty { .. } | Self::OrphanReview { .. } => {
                Severity::Warning
            }
        }
    }
}

/// Spread of one column across all review rows. Zeros when empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub count: usize,
    pub min: f64,
    pub median: f64,
    pub p90: f64,
    pub max: f64,
    pub mean: f64,
}

impl Distribution {
    pub fn from_values(mut values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        values.sort_by(f64::total_cmp);
        let count = values.len();
        Self {
            count,
            min: values[0],
            median: percentile(&values, 50.0),
            p90: percentile(&values, 90.0),
            max: values[count - 1],
            mean: values.iter().sum::<f64>() / count as f64,
        }
    }
}

/// Linear interpolation between closest ranks. `sorted` must be
/// ascending and non-empty.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * (p / 100.0);
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    if lower == upper {
        return sorted[lower];
    }
    sorted[lower] * (upper as f64 - rank) + sorted[upper] * (rank - lower as f64)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distributions {
    pub interval_days: Distribution,
    pub ease_factor: Distribution,
    pub repetition: Distribution,
}

impl Distributions {
    pub fn of(states: &[ReviewState]) -> Self {
        Self {
            interval_days: Distribution::from_values(
                states.iter().map(|s| s.interval_days as f64).collect(),
            ),
            ease_factor: Distribution::from_values(states.iter().map(|s| s.ease_factor).collect()),
            repetition: Distribution::from_values(
                states.iter().map(|s| s.repetition as f64).collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub checked_rows: usize,
    pub due_count: usize,
    pub distributions: Distributions,
    pub anomalies: Vec<Anomaly>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        !self
            .anomalies
            .iter()
            .any(|a| a.severity() == Severity::Critical)
    }

    pub fn critical_count(&self) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.severity() == Severity::Critical)
            .count()
    }
}

/// Scan `states` and `stats` against `settings`.
///
/// `known_cards` enables the orphan check; pass `None` to skip it.
pub fn check(
    states: &[ReviewState],
    stats: &Stats,
    settings: &Settings,
    known_cards: Option<&HashSet<String>>,
    now: i64,
) -> IntegrityReport {
    let mut anomalies = Vec::new();

    for state in states {
        if state.last_review > state.next_review {
            anomalies.push(Anomaly::StaleSchedule {
                card_id: state.card_id.clone(),
                last_review: state.last_review,
                next_review: state.next_review,
            });
        }
        if state.interval_days < 1 {
            anomalies.push(Anomaly::InvalidInterval {
                card_id: state.card_id.clone(),
                interval_days: state.interval_days,
            });
        }
        if state.ease_factor < settings.min_ease_factor || state.ease_factor > settings.max_ease_factor {
            anomalies.push(Anomaly::EaseOutOfBounds {
                card_id: state.card_id.clone(),
                ease_factor: state.ease_factor,
            });
        }
        if !(i64::from(MIN_DIFFICULTY)..=i64::from(MAX_DIFFICULTY)).contains(&state.difficulty) {
            anomalies.push(Anomaly::InvalidDifficulty {
                card_id: state.card_id.clone(),
                difficulty: state.difficulty,
            });
        }
        if let Some(cards) = known_cards {
            if !cards.contains(&state.card_id) {
                anomalies.push(Anomaly::OrphanReview {
                    card_id: state.card_id.clone(),
                });
            }
        }
    }

    if stats.correct_answers > stats.total_reviews {
        anomalies.push(Anomaly::StatsOverflow {
            total_reviews: stats.total_reviews,
            correct_answers: stats.correct_answers,
        });
    }

    IntegrityReport {
        checked_rows: states.len(),
        due_count: states.iter().filter(|s| s.is_due(now)).count(),
        distributions: Distributions::of(states),
        anomalies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn healthy(id: &str) -> ReviewState {
        ReviewState {
            card_id: id.to_string(),
            interval_days: 6,
            ease_factor: 2.5,
            repetition: 2,
            next_review: 2_000,
            last_review: 1_000,
            difficulty: 2,
            streak: 2,
        }
    }

    fn stats(total: i64, correct: i64) -> Stats {
        Stats {
            total_reviews: total,
            correct_answers: correct,
            last_updated: 0,
        }
    }

    #[test]
    fn clean_data_has_no_anomalies() {
        let settings = Settings::defaults(0);
        let report = check(&[healthy("a")], &stats(3, 2), &settings, None, 1_500);
        assert!(report.anomalies.is_empty());
        assert!(report.is_healthy());
        assert_eq!(report.due_count, 0);
    }

    #[test]
    fn detects_each_kind_of_anomaly() {
        let settings = Settings::defaults(0);
        let mut stale = healthy("stale");
        stale.last_review = 5_000;
        let mut bad_interval = healthy("interval");
        bad_interval.interval_days = -2;
        let mut bad_ease = healthy("ease");
        bad_ease.ease_factor = 3.1;
        let known: HashSet<String> = ["stale", "interval", "ease"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let orphan = healthy("orphan");

        let report = check(
            &[stale, bad_interval, bad_ease, orphan],
            &stats(1, 4),
            &settings,
            Some(&known),
            10_000,
        );

        let kinds: Vec<&str> = report
            .anomalies
            .iter()
            .map(|a| match a {
                Anomaly::StaleSchedule { .. } => "stale",
                Anomaly::InvalidInterval { .. } => "interval",
                Anomaly::EaseOutOfBounds { .. } => "ease",
                Anomaly::InvalidDifficulty { .. } => "difficulty",
                Anomaly::OrphanReview { .. } => "orphan",
                Anomaly::StatsOverflow { .. } => "stats",
            })
            .collect();
        assert_eq!(kinds, vec!["stale", "interval", "ease", "orphan", "stats"]);
        assert_eq!(report.critical_count(), 3);
        assert!(!report.is_healthy());
        assert_eq!(report.due_count, 4);
    }

    #[test]
    fn out_of_range_difficulty_is_reported_as_stored() {
        let settings = Settings::defaults(0);
        let mut corrupt = healthy("a");
        corrupt.difficulty = -7;
        let report = check(&[corrupt], &stats(0, 0), &settings, None, 0);
        assert_eq!(
            report.anomalies,
            vec![Anomaly::InvalidDifficulty {
                card_id: "a".to_string(),
                difficulty: -7
            }]
        );
        assert!(report.is_healthy());
    }

    #[test]
    fn distributions_interpolate_between_ranks() {
        let dist = Distribution::from_values(vec![10.0, 1.0, 4.0, 6.0, 2.0]);
        assert_eq!(dist.count, 5);
        assert_eq!(dist.min, 1.0);
        assert_eq!(dist.median, 4.0);
        // rank 3.6 between 6 and 10
        assert!((dist.p90 - 8.4).abs() < 1e-9);
        assert_eq!(dist.max, 10.0);
        assert!((dist.mean - 4.6).abs() < 1e-9);
    }

    #[test]
    fn distributions_of_nothing_are_zero() {
        assert_eq!(Distributions::of(&[]), Distributions::default());
    }

    #[test]
    fn distributions_cover_each_column() {
        let mut young = healthy("a");
        young.interval_days = 1;
        young.repetition = 0;
        young.ease_factor = 2.0;
        let report = check(
            &[young, healthy("b")],
            &stats(0, 0),
            &Settings::defaults(0),
            None,
            0,
        );
        let d = report.distributions;
        assert_eq!((d.interval_days.min, d.interval_days.max), (1.0, 6.0));
        assert_eq!(d.interval_days.median, 3.5);
        assert_eq!((d.ease_factor.min, d.ease_factor.max), (2.0, 2.5));
        assert_eq!(d.repetition.mean, 1.0);
    }

    #[test]
    fn fresh_state_is_not_stale() {
        let settings = Settings::defaults(0);
        let mut fresh = healthy("new");
        fresh.last_review = 0;
        fresh.next_review = 500;
        let report = check(&[fresh], &stats(0, 0), &settings, None, 500);
        assert!(report.anomalies.is_empty());
        assert_eq!(report.due_count, 1);
    }
}
