// ABOUTME: Saved workout domain types, request payloads, and populated responses
// ABOUTME: Covers sections, section movements, logged sets, and per-movement history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::activity::{ActivityType, SectionType, WorkoutStatus};
use super::flexible_id;
use super::movement::Movement;
use super::sessions::{
    MobilitySessionPayload, RunningSessionPayload, SavedHiitWorkout, SavedMobilitySession,
    SavedRunningSession,
};

// ============================================================================
// Stored records
// ============================================================================

/// A workout saved by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Workout ID
    pub id: i64,
    /// Owning user
    pub owner_id: i64,
    /// Per-owner sequence number
    pub workout_number: i64,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Lifecycle status
    pub status: WorkoutStatus,
    /// Complexity level the workout was generated with
    pub complexity: i64,
    /// Planned duration in minutes
    pub duration: i64,
    /// Training modality
    pub activity_type: ActivityType,
    /// Comments left by the athlete
    pub comments: Option<String>,
    /// Date the workout is planned for
    pub scheduled_date: Option<NaiveDate>,
    /// Date the workout was completed
    pub completed_date: Option<NaiveDate>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A logged set for a section movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    /// Set ID
    pub id: i64,
    /// 1-based position within the movement
    pub set_number: i64,
    /// Repetitions performed
    pub reps: i64,
    /// Load lifted
    pub weight: f64,
}

/// A movement placed in a section, with its catalog entry and sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionMovementDetail {
    /// Section movement ID
    pub id: i64,
    /// Order within the section
    pub movement_order: i64,
    /// RPE recorded for the movement
    pub movement_difficulty: Option<i64>,
    /// Comment recorded for the movement
    pub movement_comment: Option<String>,
    /// Catalog movement
    pub movements: Movement,
    /// Logged sets ordered by set number
    pub workout_sets: Vec<WorkoutSet>,
}

/// A section of a gym or hyrox workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSection {
    /// Section ID
    pub id: i64,
    /// Display name
    pub section_name: String,
    /// Single or superset
    pub section_type: SectionType,
    /// 1-based position within the workout
    pub section_order: i64,
    /// Movements ordered by `movement_order`
    pub section_movement_details: Vec<SectionMovementDetail>,
}

/// A workout with every child record attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulatedWorkout {
    /// Base workout record
    #[serde(flatten)]
    pub workout: Workout,
    /// Gym/hyrox sections
    #[serde(default)]
    pub workout_sections: Vec<WorkoutSection>,
    /// Running sessions
    #[serde(default)]
    pub running_sessions: Vec<SavedRunningSession>,
    /// HIIT sessions
    #[serde(default)]
    pub hiit_sessions: Vec<SavedHiitWorkout>,
    /// Mobility sessions
    #[serde(default)]
    pub mobility_sessions: Vec<SavedMobilitySession>,
}

/// One set as shown in movement history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySet {
    /// Set number
    pub set_number: i64,
    /// Repetitions performed
    pub reps: i64,
    /// Load lifted
    pub weight: f64,
}

/// A movement's logged sets on one earlier workout date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementHistoryEntry {
    /// Completed date of the earlier workout
    pub workout_date: NaiveDate,
    /// RPE recorded that day
    pub movement_difficulty: Option<i64>,
    /// Sets logged that day
    pub sets: Vec<HistorySet>,
}

/// Movement ID to history entries, newest date first
pub type MovementHistory = BTreeMap<i64, Vec<MovementHistoryEntry>>;

/// Response of the single-workout endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleWorkoutResponse {
    /// The populated workout
    pub workout: PopulatedWorkout,
    /// History for every movement in the workout
    pub movement_history: MovementHistory,
}

/// Compact workout used on the profile page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentWorkout {
    /// Workout ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Completion date
    pub completed_date: Option<NaiveDate>,
    /// Duration in minutes
    pub duration: i64,
}

// ============================================================================
// Request payloads
// ============================================================================

/// A movement inside a section of a save-workout request
///
/// Gym clients send `movement_name`; HIIT clients send `exercise` as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionMovementPayload {
    /// Catalog exercise name
    #[serde(default)]
    pub movement_name: Option<String>,
    /// Alternate exercise name field
    #[serde(default)]
    pub exercise: Option<String>,
    /// Order within the section
    #[serde(default)]
    pub movement_order: i64,
    /// Whether this slot is a rest period (HIIT)
    #[serde(default)]
    pub rest_period: bool,
}

impl SectionMovementPayload {
    /// The exercise name, whichever field carried it
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.movement_name
            .as_deref()
            .or(self.exercise.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// A section of a save-workout request
///
/// Gym sections use `section_*` fields, HIIT blocks use `block_name` and `rep_scheme`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionPayload {
    /// Gym section name
    #[serde(default)]
    pub section_name: Option<String>,
    /// Gym section order
    #[serde(default)]
    pub section_order: Option<i64>,
    /// Gym section type
    #[serde(default)]
    pub section_type: Option<SectionType>,
    /// HIIT block name
    #[serde(default)]
    pub block_name: Option<String>,
    /// HIIT rep scheme
    #[serde(default)]
    pub rep_scheme: Option<String>,
    /// Movements in the section
    #[serde(default)]
    pub movements: Vec<SectionMovementPayload>,
}

/// Body of `POST /api/saved_workouts/save-workout/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveWorkoutRequest {
    /// Owner, defaults to the authenticated user
    #[serde(
        default,
        deserialize_with = "flexible_id::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<i64>,
    /// Display name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Duration in minutes
    #[serde(default)]
    pub duration: i64,
    /// Complexity level
    #[serde(default)]
    pub complexity: i64,
    /// Initial status, defaults to Saved
    #[serde(default)]
    pub status: Option<String>,
    /// Planned date
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    /// Training modality as sent by the client
    pub activity_type: String,
    /// Gym sections or HIIT blocks
    #[serde(default)]
    pub sections: Vec<SectionPayload>,
    /// HIIT format ("AMRAP", "EMOM", ...)
    #[serde(default)]
    pub workout_type: Option<String>,
    /// HIIT structure description
    #[serde(default)]
    pub structure: Option<String>,
    /// Running session details
    #[serde(default)]
    pub running_sessions: Option<RunningSessionPayload>,
    /// Mobility session details
    #[serde(default)]
    pub mobility_sessions: Option<MobilitySessionPayload>,
}

/// Response of a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveWorkoutResponse {
    /// Confirmation message
    pub message: String,
    /// ID of the new workout
    pub workout_id: i64,
}

/// A set as submitted by the completion form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    /// Set number
    pub set_number: i64,
    /// Repetitions, `None` when left empty
    #[serde(default)]
    pub reps: Option<i64>,
    /// Load, `None` when left empty
    #[serde(default)]
    pub weight: Option<f64>,
}

impl SetEntry {
    /// A set counts as a working set when both reps and load are positive
    #[must_use]
    pub fn is_working_set(&self) -> bool {
        self.reps.unwrap_or(0) > 0 && self.weight.unwrap_or(0.0) > 0.0
    }
}

/// A section movement's logged data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementLog {
    /// Section movement ID
    pub movement_id: i64,
    /// RPE for the movement
    #[serde(default)]
    pub movement_difficulty: Option<i64>,
    /// Comment for the movement
    #[serde(default)]
    pub movement_comments: Option<String>,
    /// Logged sets
    #[serde(default)]
    pub sets: Vec<SetEntry>,
}

/// A section's logged data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLog {
    /// Section ID
    pub section_id: i64,
    /// Movements in the section
    #[serde(default)]
    pub movements: Vec<MovementLog>,
}

/// Body of the gym completion and save-workout-details endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLogRequest {
    /// Sections with logged movements
    #[serde(default)]
    pub sections: Vec<SectionLog>,
}

/// Body of the status update endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    /// Requested status
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of the date update endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateUpdateRequest {
    /// New planned date
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
}

/// Generic `{ "message": ... }` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    /// Build a message response
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_request_accepts_string_user_id() {
        let request: SaveWorkoutRequest = serde_json::from_value(serde_json::json!({
            "user_id": "12",
            "name": "Upper body Workout",
            "activity_type": "Gym",
            "sections": [{
                "section_name": "Warmup",
                "section_order": 1,
                "section_type": "single",
                "movements": [{ "movement_name": "Row", "movement_order": 1 }]
            }]
        }))
        .unwrap();

        assert_eq!(request.user_id, Some(12));
        assert_eq!(request.sections[0].movements[0].name(), Some("Row"));
        assert_eq!(request.sections[0].section_type, Some(SectionType::Single));
    }

    #[test]
    fn test_hiit_movement_name_falls_back_to_exercise() {
        let movement = SectionMovementPayload {
            movement_name: None,
            exercise: Some("Burpee".to_owned()),
            movement_order: 2,
            rest_period: false,
        };
        assert_eq!(movement.name(), Some("Burpee"));
    }

    #[test]
    fn test_working_set_requires_reps_and_weight() {
        let full = SetEntry {
            set_number: 1,
            reps: Some(5),
            weight: Some(60.0),
        };
        let empty_weight = SetEntry {
            set_number: 2,
            reps: Some(5),
            weight: None,
        };
        assert!(full.is_working_set());
        assert!(!empty_weight.is_working_set());
    }
}
