//! Scheduling core for the spaced repetition review engine.
//!
//! Provides:
//! - SM-2 scheduling behind the `SpacedRepetitionAlgorithm` trait
//! - Settings profile with partial updates and collected validation
//! - Day streak, stats overview and integrity checks
//! - Shared types (ReviewState, Difficulty, UiRating, Stats)
//!
//! Everything here is pure. Storage and transport live in the backend.

pub mod algorithm;
pub mod clock;
pub mod diagnostics;
pub mod error;
pub mod settings;
pub mod stats;
pub mod streak;
pub mod types;

pub use algorithm::sm2::Sm2;
pub use algorithm::{predict, PredictedState, SchedulingResult, SpacedRepetitionAlgorithm};
pub use clock::{Clock, ManualClock, SystemClock};
pub use diagnostics::{Anomaly, Distribution, Distributions, IntegrityReport, Severity};
pub use error::{Result, SrsError, ValidationErrors};
pub use settings::{Settings, SettingsUpdate, DEFAULT_PROFILE_ID, MAX_INTERVAL_DAYS};
pub use stats::{IntervalBuckets, StatsOverview};
pub use streak::StreakInfo;
pub use types::{Difficulty, ReviewState, Stats, UiRating, DAY_MS};
