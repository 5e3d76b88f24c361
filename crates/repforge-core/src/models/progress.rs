// ABOUTME: Scoring, leaderboard, user statistics, and strength progression types
// ABOUTME: Read models returned by the leaderboard, user stats, and movement summary endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One awarded-points record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLog {
    /// Log ID
    pub id: i64,
    /// Recipient
    pub user_id: i64,
    /// Reason ("Workout Completion", ...)
    pub score_type: String,
    /// Points awarded
    pub score_value: i64,
    /// When the points were awarded
    pub timestamp: DateTime<Utc>,
    /// Workout the award relates to
    pub workout_id: Option<i64>,
    /// Section movement the award relates to
    pub section_movement_id: Option<i64>,
}

/// Score totals as shown on the profile page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreTotals {
    /// All-time points
    pub total_score: i64,
    /// Points in the last seven days
    pub weekly_score: i64,
    /// Points since the first of the month
    pub monthly_score: i64,
}

/// A leaderboard row joined with the user's public names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// User ID
    pub user_id: i64,
    /// Username
    pub username: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Score totals
    #[serde(flatten)]
    pub scores: ScoreTotals,
    /// All-time rank
    pub total_rank: Option<i64>,
    /// Weekly rank
    pub weekly_rank: Option<i64>,
    /// Monthly rank
    pub monthly_rank: Option<i64>,
    /// Last recompute time
    pub last_updated: DateTime<Utc>,
}

/// Counts keyed by body part or activity type
pub type CountMap = BTreeMap<String, i64>;

/// Aggregated training statistics for one user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStats {
    /// User ID
    pub user_id: i64,
    /// Body-part counts over seven days
    pub weekly_body_part: CountMap,
    /// Body-part counts over thirty days
    pub monthly_body_part: CountMap,
    /// Body-part counts over a year
    pub yearly_body_part: CountMap,
    /// Minutes per activity type over seven days
    pub weekly_activity_type: CountMap,
    /// Minutes per activity type over thirty days
    pub monthly_activity_type: CountMap,
    /// Minutes per activity type over a year
    pub yearly_activity_type: CountMap,
    /// Last recompute time
    pub last_updated: Option<DateTime<Utc>>,
}

/// A working set recorded for strength progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthSet {
    /// Record ID
    pub id: i64,
    /// Athlete
    pub owner_id: i64,
    /// Catalog movement
    pub movement_id: i64,
    /// Workout the set was logged in
    pub workout_id: Option<i64>,
    /// Date performed
    pub performed_date: NaiveDate,
    /// Set number
    pub set_number: i64,
    /// Repetitions
    pub reps: i64,
    /// Load lifted
    pub weight: f64,
    /// Set RPE
    pub rpe: Option<i64>,
    /// Volume, weight times reps
    pub load: f64,
}

/// Best lift summary for one movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementSummary {
    /// Catalog movement
    pub movement_id: i64,
    /// Exercise name
    pub exercise: String,
    /// Heaviest weight lifted
    pub best_weight: f64,
    /// Reps achieved at the best weight
    pub best_reps: i64,
    /// Epley estimate of the one-rep max
    pub estimated_1rm: f64,
    /// Last recompute time
    pub updated_at: DateTime<Utc>,
}

/// Response of the movement summary endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementSummaryResponse {
    /// One summary per movement
    pub summaries: Vec<MovementSummary>,
    /// Raw strength sets, newest first
    pub strength_sets: Vec<StrengthSet>,
}

/// Epley one-rep-max estimate rounded to two decimals
#[must_use]
pub fn estimated_one_rep_max(weight: f64, reps: i64) -> f64 {
    let estimate = weight * (1.0 + reps as f64 / 30.0);
    (estimate * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_one_rep_max() {
        assert!((estimated_one_rep_max(100.0, 5) - 116.67).abs() < f64::EPSILON * 1000.0);
        assert!((estimated_one_rep_max(80.0, 0) - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_leaderboard_entry_flattens_scores() {
        let entry = LeaderboardEntry {
            user_id: 3,
            username: "runner".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: String::new(),
            scores: ScoreTotals {
                total_score: 120,
                weekly_score: 55,
                monthly_score: 70,
            },
            total_rank: Some(1),
            weekly_rank: None,
            monthly_rank: Some(2),
            last_updated: Utc::now(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["weekly_score"], 55);
        assert!(json["weekly_rank"].is_null());
    }
}
