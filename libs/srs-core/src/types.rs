//! Core types for the review scheduler.

use serde::{Deserialize, Serialize};

use crate::error::SrsError;

/// Milliseconds in one scheduling day.
pub const DAY_MS: i64 = 86_400_000;

/// Lowest difficulty rating the engine accepts.
pub const MIN_DIFFICULTY: u8 = 1;

/// Highest difficulty rating the engine accepts.
pub const MAX_DIFFICULTY: u8 = 5;

/// Engine-scale difficulty rating (1 = easiest, 5 = hardest).
///
/// Ratings at or below the active `correct_threshold` count as correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    /// Create from a raw value, rejecting anything outside 1..=5.
    pub fn new(value: i64) -> Result<Self, SrsError> {
        if (MIN_DIFFICULTY as i64..=MAX_DIFFICULTY as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(SrsError::InvalidDifficulty(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = SrsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

/// Rating as shown on the review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiRating {
    Again,
    Hard,
    Good,
    Easy,
}

impl UiRating {
    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Map onto the engine scale. The scales run in opposite directions:
    /// Again -> 4 (incorrect), Hard -> 3, Good -> 2, Easy -> 1.
    pub fn to_difficulty(self) -> Difficulty {
        let value = match self {
            Self::Again => 4,
            Self::Hard => 3,
            Self::Good => 2,
            Self::Easy => 1,
        };
        Difficulty(value)
    }

    /// Map a raw 4-point value onto the engine scale. Unknown values are
    /// treated as Good.
    pub fn map_value(value: i64) -> Difficulty {
        Self::from_value(value)
            .unwrap_or(Self::Good)
            .to_difficulty()
    }
}

/// Scheduling state of one card. Keyed by `card_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub card_id: String,
    pub interval_days: i64,
    pub ease_factor: f64,
    /// Consecutive successful reviews since the last failure.
    pub repetition: i64,
    /// Epoch milliseconds.
    pub next_review: i64,
    /// Epoch milliseconds; `0` until the first review.
    pub last_review: i64,
    /// Most recent engine-scale rating. Out-of-range stored values are
    /// carried as-is for the integrity check.
    pub difficulty: i64,
    /// Consecutive correct reviews.
    pub streak: i64,
}

impl ReviewState {
    /// Due at `now` (epoch ms).
    pub fn is_due(&self, now: i64) -> bool {
        self.next_review <= now
    }
}

/// Global review counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_reviews: i64,
    pub correct_answers: i64,
    pub last_updated: i64,
}

impl Stats {
    /// Percentage of correct answers, `0.0` before any review.
    pub fn accuracy(&self) -> f64 {
        if self.total_reviews > 0 {
            self.correct_answers as f64 / self.total_reviews as f64 * 100.0
        } else {
            0.0
        }
    }
}
