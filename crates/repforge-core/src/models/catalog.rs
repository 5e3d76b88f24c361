// ABOUTME: Read-only workout templates served by the catalog endpoints
// ABOUTME: Running sessions, mobility flows, suggested strength sessions, and conditioning pieces
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

/// Interval of a running template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningIntervalTemplate {
    /// Interval ID
    #[serde(default)]
    pub id: i64,
    /// Variation index
    pub repeat_variation: i64,
    /// Number of repeats
    pub repeats: i64,
    /// Distance of each repeat in km
    pub repeat_distance: Option<f64>,
    /// Pace label ("5k", "Threshold", ...)
    pub target_pace: String,
    /// Rest between repeats in seconds
    pub rest_time: Option<i64>,
}

/// A running session template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningSessionTemplate {
    /// Template ID
    #[serde(default)]
    pub id: i64,
    /// Session type ("Intervals", "Tempo", ...)
    pub session_type: String,
    /// Display name
    pub session_name: Option<String>,
    /// Duration label
    pub duration: String,
    /// Warm-up distance in km
    pub warmup_distance: Option<f64>,
    /// Cool-down distance in km
    pub cool_down_distance: Option<f64>,
    /// Total distance in km
    pub total_distance: Option<f64>,
    /// Coaching notes
    pub notes: Option<String>,
    /// Intervals in order
    #[serde(default)]
    pub intervals: Vec<RunningIntervalTemplate>,
}

/// Step of a mobility template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobilityDetailTemplate {
    /// Detail ID
    #[serde(default)]
    pub id: i64,
    /// Exercise name
    pub exercise: Option<String>,
    /// Order within the flow
    pub order: i64,
    /// Duration label ("60s", ...)
    pub duration: Option<String>,
}

/// A mobility flow template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobilityWorkoutTemplate {
    /// Template ID
    #[serde(default)]
    pub id: i64,
    /// Display name
    pub workout_name: String,
    /// Body area
    pub body_area: Option<String>,
    /// Duration in minutes
    pub duration: Option<f64>,
    /// Summary line
    pub summary: Option<String>,
    /// Number of movements
    pub number_of_movements: Option<i64>,
    /// Steps in order
    #[serde(default)]
    pub details: Vec<MobilityDetailTemplate>,
}

/// Movement slot of a suggested strength session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthDetailTemplate {
    /// Detail ID
    #[serde(default)]
    pub id: i64,
    /// Section label
    pub section_name: Option<String>,
    /// Section number
    pub section_number: i64,
    /// Position within the section
    pub section_movement: i64,
    /// Exercise name
    pub exercise: Option<String>,
}

/// A suggested strength session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedStrengthTemplate {
    /// Template ID
    #[serde(default)]
    pub id: i64,
    /// Display name
    pub workout_name: String,
    /// Body area
    pub body_area: Option<String>,
    /// Duration in minutes
    pub duration: Option<f64>,
    /// Description
    pub description: Option<String>,
    /// Number of sections
    pub number_of_sections: Option<i64>,
    /// Movement slots ordered by section then position
    #[serde(default)]
    pub details: Vec<StrengthDetailTemplate>,
}

/// Movement of a conditioning piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditioningDetailTemplate {
    /// Detail ID
    #[serde(default)]
    pub id: i64,
    /// Order within the piece
    pub movement_order: Option<i64>,
    /// Exercise name
    pub exercise: Option<String>,
    /// Prescription ("60s", "10 reps", ...)
    pub detail: Option<String>,
}

/// A conditioning piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditioningTemplate {
    /// Template ID
    #[serde(default)]
    pub id: i64,
    /// Display name ("8' AMRAP", ...)
    pub name: String,
    /// Duration in minutes
    pub duration: Option<i64>,
    /// Number of movements
    pub movements: Option<i64>,
    /// Rest in seconds
    pub rest: Option<i64>,
    /// Instructions
    pub notes: Option<String>,
    /// Movements in order
    #[serde(default)]
    pub details: Vec<ConditioningDetailTemplate>,
}
