//! Day streak of correct reviews.
//!
//! A day (UTC) qualifies when at least one review on it was rated at or
//! below the correct threshold. The streak counts qualifying days walking
//! backwards from today and stops at the first gap.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Furthest the walk looks back.
pub const MAX_STREAK_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    pub streak: u32,
    pub today_has_review: bool,
}

/// UTC calendar date of an epoch-millisecond timestamp.
pub fn utc_day(epoch_ms: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms).map(|dt| dt.date_naive())
}

/// Collect the days that contain a correct review.
///
/// `reviews` yields `(reviewed_at_ms, difficulty)` pairs. Unset
/// timestamps (`<= 0`) are skipped.
pub fn qualifying_days<I>(reviews: I, correct_threshold: u8) -> HashSet<NaiveDate>
where
    I: IntoIterator<Item = (i64, u8)>,
{
    reviews
        .into_iter()
        .filter(|&(at, difficulty)| at > 0 && difficulty <= correct_threshold)
        .filter_map(|(at, _)| utc_day(at))
        .collect()
}

/// Streak ending today (the day containing `now`).
pub fn current_streak(days: &HashSet<NaiveDate>, now: i64) -> StreakInfo {
    let Some(today) = utc_day(now) else {
        return StreakInfo {
            streak: 0,
            today_has_review: false,
        };
    };

    let mut streak = 0;
    for offset in 0..MAX_STREAK_DAYS {
        let day = today - Duration::days(offset);
        if days.contains(&day) {
            streak += 1;
        } else {
            break;
        }
    }

    StreakInfo {
        streak,
        today_has_review: days.contains(&today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DAY_MS;
    use pretty_assertions::assert_eq;

    // 2024-03-10T12:00:00Z
    const NOW: i64 = 1_710_072_000_000;

    #[test]
    fn no_reviews_means_no_streak() {
        let days = qualifying_days(Vec::new(), 3);
        assert_eq!(
            current_streak(&days, NOW),
            StreakInfo {
                streak: 0,
                today_has_review: false
            }
        );
    }

    #[test]
    fn three_consecutive_days_then_gap() {
        let reviews = vec![
            (NOW, 2),
            (NOW - DAY_MS, 3),
            (NOW - 2 * DAY_MS, 1),
            (NOW - 4 * DAY_MS, 2),
        ];
        let days = qualifying_days(reviews, 3);
        assert_eq!(
            current_streak(&days, NOW),
            StreakInfo {
                streak: 3,
                today_has_review: true
            }
        );
    }

    #[test]
    fn incorrect_reviews_do_not_qualify() {
        let reviews = vec![(NOW, 4), (NOW - DAY_MS, 2)];
        let days = qualifying_days(reviews, 3);
        let info = current_streak(&days, NOW);
        assert_eq!(info.streak, 0);
        assert!(!info.today_has_review);
    }

    #[test]
    fn days_are_utc_calendar_days() {
        // 2024-03-10T00:00:00Z and 2024-03-09T23:59:59Z
        let midnight = 1_710_028_800_000;
        let reviews = vec![(midnight, 2), (midnight - 1_000, 2)];
        let days = qualifying_days(reviews, 3);
        assert_eq!(days.len(), 2);
        assert_eq!(current_streak(&days, NOW).streak, 2);
    }

    #[test]
    fn unreviewed_timestamps_are_ignored() {
        let days = qualifying_days(vec![(0, 3)], 3);
        assert!(days.is_empty());
    }

    #[test]
    fn streak_is_capped_at_a_year() {
        let reviews: Vec<(i64, u8)> = (0..400).map(|i| (NOW - i * DAY_MS, 2)).collect();
        let days = qualifying_days(reviews, 3);
        assert_eq!(current_streak(&days, NOW).streak, 365);
    }
}
