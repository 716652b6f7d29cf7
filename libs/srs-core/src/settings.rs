//! Algorithm settings profile, partial updates and validation.

use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;
use crate::types::MAX_DIFFICULTY;

/// Id of the single active profile.
pub const DEFAULT_PROFILE_ID: &str = "default";

/// Longest interval a profile may schedule, about a century.
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

/// Display name of the built-in profile.
pub const DEFAULT_PROFILE_NAME: &str = "SuperMemo 2 (Default)";

/// The active algorithm configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub id: String,
    pub name: String,
    pub min_ease_factor: f64,
    pub max_ease_factor: f64,
    pub initial_ease_factor: f64,
    pub initial_interval: i64,
    pub second_interval: i64,
    pub max_difficulty: u8,
    pub correct_threshold: u8,
    pub easy_bonus: f64,
    pub easy_penalty: f64,
    pub easy_penalty_multiplier: f64,
    pub hard_penalty: f64,
    pub hard_penalty_linear: f64,
    pub hard_penalty_quadratic: f64,
    /// Interval (days) from which a card counts as mature.
    pub graduation_interval: i64,
    pub max_interval: i64,
    pub min_interval: i64,
    pub lapse_multiplier: f64,
    pub lapse_min_interval: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Settings {
    /// The fixed default profile, stamped with `now` (epoch ms).
    pub fn defaults(now: i64) -> Self {
        Self {
            id: DEFAULT_PROFILE_ID.to_string(),
            name: DEFAULT_PROFILE_NAME.to_string(),
            min_ease_factor: 1.3,
            max_ease_factor: 2.5,
            initial_ease_factor: 2.5,
            initial_interval: 1,
            second_interval: 6,
            max_difficulty: 5,
            correct_threshold: 3,
            easy_bonus: 0.1,
            easy_penalty: 0.08,
            easy_penalty_multiplier: 0.02,
            hard_penalty: 0.8,
            hard_penalty_linear: 0.28,
            hard_penalty_quadratic: 0.02,
            graduation_interval: 21,
            max_interval: 365,
            min_interval: 1,
            lapse_multiplier: 0.0,
            lapse_min_interval: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Defaults for every tunable field, keeping this profile's
    /// `created_at`.
    pub fn reset(&self, now: i64) -> Self {
        Self {
            created_at: self.created_at,
            ..Self::defaults(now)
        }
    }

    /// Check every constraint and report all violations together.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.min_ease_factor >= self.max_ease_factor {
            errors.push("Minimum ease factor must be less than maximum ease factor");
        }
        if !(1.0..=3.0).contains(&self.min_ease_factor) {
            errors.push("Minimum ease factor must be between 1.0 and 3.0");
        }
        if !(1.0..=5.0).contains(&self.max_ease_factor) {
            errors.push("Maximum ease factor must be between 1.0 and 5.0");
        }
        if self.initial_ease_factor < self.min_ease_factor
            || self.initial_ease_factor > self.max_ease_factor
        {
            errors.push("Initial ease factor must lie between the minimum and maximum ease factor");
        }

        if self.initial_interval < 1 {
            errors.push("Initial interval must be at least 1 day");
        }
        if self.second_interval < 1 {
            errors.push("Second interval must be at least 1 day");
        }
        if self.max_interval < 1 {
            errors.push("Maximum interval must be at least 1 day");
        }
        if self.max_interval > MAX_INTERVAL_DAYS {
            errors.push(format!(
                "Maximum interval must be at most {} days",
                MAX_INTERVAL_DAYS
            ));
        }
        if self.min_interval < 1 {
            errors.push("Minimum interval must be at least 1 day");
        }
        if self.graduation_interval < 1 {
            errors.push("Graduation interval must be at least 1 day");
        }
        if self.lapse_min_interval < 1 {
            errors.push("Lapse minimum interval must be at least 1 day");
        }
        for (label, value) in [
            ("Initial interval", self.initial_interval),
            ("Second interval", self.second_interval),
            ("Minimum interval", self.min_interval),
            ("Lapse minimum interval", self.lapse_min_interval),
        ] {
            if value > self.max_interval {
                errors.push(format!("{label} must not exceed maximum interval"));
            }
        }
        if !(0.0..=1.0).contains(&self.lapse_multiplier) {
            errors.push("Lapse multiplier must be between 0.0 and 1.0");
        }

        if self.correct_threshold >= self.max_difficulty {
            errors.push("Correct threshold must be less than maximum difficulty");
        }
        if self.correct_threshold < 1 {
            errors.push("Correct threshold must be at least 1");
        }
        if self.max_difficulty > MAX_DIFFICULTY {
            errors.push(format!("Maximum difficulty must be at most {}", MAX_DIFFICULTY));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial settings update. Only supplied fields change. `id`,
/// `created_at` and `updated_at` have no counterpart here, so a client
/// echoing a full profile back cannot overwrite them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ease_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ease_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_ease_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_difficulty: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_threshold: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easy_bonus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easy_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easy_penalty_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_penalty_linear: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_penalty_quadratic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lapse_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lapse_min_interval: Option<i64>,
}

impl SettingsUpdate {
    /// Merge onto `current` and validate the result. `current` is left
    /// untouched either way.
    pub fn apply(&self, current: &Settings, now: i64) -> Result<Settings, ValidationErrors> {
        let mut next = current.clone();

        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(v) = self.min_ease_factor {
            next.min_ease_factor = v;
        }
        if let Some(v) = self.max_ease_factor {
            next.max_ease_factor = v;
        }
        if let Some(v) = self.initial_ease_factor {
            next.initial_ease_factor = v;
        }
        if let Some(v) = self.initial_interval {
            next.initial_interval = v;
        }
        if let Some(v) = self.second_interval {
            next.second_interval = v;
        }
        if let Some(v) = self.max_difficulty {
            next.max_difficulty = v;
        }
        if let Some(v) = self.correct_threshold {
            next.correct_threshold = v;
        }
        if let Some(v) = self.easy_bonus {
            next.easy_bonus = v;
        }
        if let Some(v) = self.easy_penalty {
            next.easy_penalty = v;
        }
        if let Some(v) = self.easy_penalty_multiplier {
            next.easy_penalty_multiplier = v;
        }
        if let Some(v) = self.hard_penalty {
            next.hard_penalty = v;
        }
        if let Some(v) = self.hard_penalty_linear {
            next.hard_penalty_linear = v;
        }
        if let Some(v) = self.hard_penalty_quadratic {
            next.hard_penalty_quadratic = v;
        }
        if let Some(v) = self.graduation_interval {
            next.graduation_interval = v;
        }
        if let Some(v) = self.max_interval {
            next.max_interval = v;
        }
        if let Some(v) = self.min_interval {
            next.min_interval = v;
        }
        if let Some(v) = self.lapse_multiplier {
            next.lapse_multiplier = v;
        }
        if let Some(v) = self.lapse_min_interval {
            next.lapse_min_interval = v;
        }

        next.validate()?;
        next.updated_at = now;
        Ok(next)
    }
}
