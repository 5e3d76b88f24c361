// ABOUTME: Saved running, HIIT, and mobility session records and their payloads
// ABOUTME: Running splits, HIIT blocks, mobility details, and per-modality completion bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Running
// ============================================================================

/// One repeat of a running interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSplitTime {
    /// Split ID
    pub id: i64,
    /// 1-based repeat number
    pub repeat_number: i64,
    /// Target time in seconds
    pub target_time: Option<i64>,
    /// Recorded time in seconds
    pub actual_time: Option<i64>,
    /// Athlete comments
    pub comments: Option<String>,
}

/// An interval block of a saved running session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRunningInterval {
    /// Interval ID
    pub id: i64,
    /// Variation index from the template
    pub repeat_variation: i64,
    /// Number of repeats
    pub repeats: i64,
    /// Distance of each repeat in km
    pub repeat_distance: f64,
    /// Target pace in seconds per km
    pub target_pace: Option<i64>,
    /// Average achieved pace in seconds per km
    pub average_actual_pace: Option<i64>,
    /// Athlete comments
    pub comments: Option<String>,
    /// Split rows ordered by repeat number
    pub split_times: Vec<SavedSplitTime>,
}

/// Running details attached to a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRunningSession {
    /// Session ID
    pub id: i64,
    /// Template the session was built from
    pub running_session_id: Option<i64>,
    /// Warm-up distance in km
    pub warmup_distance: f64,
    /// Cool-down distance in km
    pub cooldown_distance: f64,
    /// Total distance in km
    pub total_distance: f64,
    /// Notes carried from the template
    pub workout_notes: Option<String>,
    /// Session RPE
    pub rpe: Option<i64>,
    /// Athlete comments
    pub comments: Option<String>,
    /// Suggested warm-up pace in seconds per km
    pub suggested_warmup_pace: Option<i64>,
    /// Recorded warm-up pace
    pub actual_warmup_pace: Option<i64>,
    /// Suggested cool-down pace in seconds per km
    pub suggested_cooldown_pace: Option<i64>,
    /// Recorded cool-down pace
    pub actual_cooldown_pace: Option<i64>,
    /// Interval blocks
    pub saved_intervals: Vec<SavedRunningInterval>,
}

/// Interval in a save-workout request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningIntervalPayload {
    /// Variation index
    #[serde(default)]
    pub repeat_variation: i64,
    /// Number of repeats
    #[serde(default)]
    pub repeats: i64,
    /// Distance of each repeat in km
    #[serde(default)]
    pub repeat_distance: f64,
    /// Target pace in seconds per km
    #[serde(default)]
    pub target_pace: Option<i64>,
}

impl RunningIntervalPayload {
    /// Target time for one repeat in whole seconds
    #[must_use]
    pub fn target_time(&self) -> Option<i64> {
        self.target_pace
            .map(|pace| (pace as f64 * self.repeat_distance).round() as i64)
    }
}

/// Running session in a save-workout request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningSessionPayload {
    /// Template ID
    #[serde(default)]
    pub running_session_id: Option<i64>,
    /// Warm-up distance in km
    #[serde(default)]
    pub warmup_distance: f64,
    /// Cool-down distance in km
    #[serde(default)]
    pub cooldown_distance: f64,
    /// Total distance in km
    #[serde(default)]
    pub total_distance: f64,
    /// Notes
    #[serde(default)]
    pub workout_notes: Option<String>,
    /// Suggested warm-up pace in seconds per km
    #[serde(default)]
    pub suggested_warmup_pace: Option<i64>,
    /// Suggested cool-down pace in seconds per km
    #[serde(default)]
    pub suggested_cooldown_pace: Option<i64>,
    /// Interval blocks
    #[serde(default)]
    pub saved_intervals: Vec<RunningIntervalPayload>,
}

/// A split as submitted by the running completion form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitLog {
    /// Split ID
    pub id: i64,
    /// Recorded time in seconds
    #[serde(default)]
    pub actual_time: Option<i64>,
    /// Comments
    #[serde(default)]
    pub comments: Option<String>,
}

/// An interval as submitted by the running completion form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalLog {
    /// Interval ID
    pub id: i64,
    /// Splits in the interval
    #[serde(default)]
    pub split_times: Vec<SplitLog>,
}

/// Body of `PUT /api/saved_runs/complete-workout/{id}/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningCompletionRequest {
    /// Date the run took place, defaults to today
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    /// Session RPE
    #[serde(default)]
    pub rpe: Option<i64>,
    /// Session comments
    #[serde(default)]
    pub comments: Option<String>,
    /// Interval splits
    #[serde(default)]
    pub intervals: Vec<IntervalLog>,
}

// ============================================================================
// HIIT
// ============================================================================

/// A movement slot in a HIIT block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedHiitMovement {
    /// Slot ID
    pub id: i64,
    /// Linked catalog movement, when the name resolved
    pub movement_id: Option<i64>,
    /// Exercise name as planned
    pub exercise_name: String,
    /// Order within the block
    pub movement_order: i64,
    /// Whether the slot is a rest period
    pub rest_period: bool,
}

/// A block of a saved HIIT workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedHiitBlock {
    /// Block ID
    pub id: i64,
    /// Display name
    pub block_name: String,
    /// Rep scheme ("15-12-10", ...)
    pub rep_scheme: Option<String>,
    /// Order within the workout
    pub block_order: i64,
    /// Movement slots
    pub hiit_movements: Vec<SavedHiitMovement>,
}

/// HIIT details attached to a workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedHiitWorkout {
    /// Session ID
    pub id: i64,
    /// Format ("AMRAP", "EMOM", "Tabata (20/10)", "30/30")
    pub workout_type: String,
    /// Structure instructions
    pub structure: String,
    /// Duration in minutes
    pub duration: i64,
    /// Session RPE
    pub rpe: Option<i64>,
    /// Athlete comments
    pub comments: Option<String>,
    /// Blocks
    pub hiit_details: Vec<SavedHiitBlock>,
}

// ============================================================================
// Mobility
// ============================================================================

/// One step of a mobility session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMobilityDetail {
    /// Detail ID
    pub id: i64,
    /// Order within the session
    pub detail_order: i64,
    /// Hold or work duration in seconds
    pub duration: Option<f64>,
    /// Linked catalog movement
    pub movement_id: Option<i64>,
    /// Exercise name resolved from the catalog
    pub exercise: Option<String>,
}

/// Mobility details attached to a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMobilitySession {
    /// Session ID
    pub id: i64,
    /// Number of movements in the session
    pub number_of_movements: i64,
    /// Optional follow-along video reference
    pub session_video: Option<String>,
    /// Session RPE
    pub rpe: Option<i64>,
    /// Athlete comments
    pub comments: Option<String>,
    /// Steps ordered by `detail_order`
    pub mobility_details: Vec<SavedMobilityDetail>,
}

/// Mobility step in a save-workout request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MobilityDetailPayload {
    /// Order within the session
    #[serde(default)]
    pub order: i64,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// Catalog exercise name
    #[serde(default)]
    pub movement_name: Option<String>,
    /// Catalog movement ID
    #[serde(default)]
    pub movement_id: Option<i64>,
}

/// Mobility session in a save-workout request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MobilitySessionPayload {
    /// Number of movements
    #[serde(default)]
    pub number_of_movements: i64,
    /// Video reference
    #[serde(default)]
    pub session_video: Option<String>,
    /// Steps
    #[serde(default)]
    pub mobility_details: Vec<MobilityDetailPayload>,
}

/// Body of the HIIT and mobility completion endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCompletionRequest {
    /// Session RPE
    #[serde(default)]
    pub rpe: Option<i64>,
    /// Session comments
    #[serde(default)]
    pub comments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_target_time_rounds_to_seconds() {
        let interval = RunningIntervalPayload {
            repeat_variation: 1,
            repeats: 4,
            repeat_distance: 0.4,
            target_pace: Some(255),
        };
        assert_eq!(interval.target_time(), Some(102));

        let open = RunningIntervalPayload {
            target_pace: None,
            ..interval
        };
        assert_eq!(open.target_time(), None);
    }
}
