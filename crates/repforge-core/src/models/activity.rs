// ABOUTME: Activity type, workout status, and section type enumerations
// ABOUTME: String-backed enums with parsing used for both storage and the JSON wire format
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt;

use serde::{Deserialize, Serialize};

/// Training modality a workout belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    /// Gym / strength session built from sections
    Gym,
    /// Running session with intervals and splits
    Running,
    /// Mobility flow
    Mobility,
    /// High intensity interval session
    Hiit,
    /// Hyrox session, structured like a gym session
    Hyrox,
}

impl ActivityType {
    /// All activity types in display order
    pub const ALL: [Self; 5] = [
        Self::Gym,
        Self::Running,
        Self::Mobility,
        Self::Hiit,
        Self::Hyrox,
    ];

    /// Storage and wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gym => "Gym",
            Self::Running => "Running",
            Self::Mobility => "Mobility",
            Self::Hiit => "Hiit",
            Self::Hyrox => "Hyrox",
        }
    }

    /// Parse from the wire representation (case-insensitive)
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
    }

    /// Whether workouts of this type are stored as sections of movements
    #[must_use]
    pub const fn uses_sections(self) -> bool {
        matches!(self, Self::Gym | Self::Hyrox)
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a saved workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WorkoutStatus {
    /// Saved for later, no date attached
    #[default]
    Saved,
    /// Planned for a specific date
    Scheduled,
    /// In progress
    Started,
    /// Finished and logged
    Completed,
}

impl WorkoutStatus {
    /// Statuses a client may set through the status endpoint
    pub const CLIENT_SETTABLE: [Self; 3] = [Self::Started, Self::Completed, Self::Scheduled];

    /// Storage and wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Saved => "Saved",
            Self::Scheduled => "Scheduled",
            Self::Started => "Started",
            Self::Completed => "Completed",
        }
    }

    /// Parse from the exact wire representation
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Saved" => Some(Self::Saved),
            "Scheduled" => Some(Self::Scheduled),
            "Started" => Some(Self::Started),
            "Completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the movements in a section are performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    /// One movement at a time
    #[default]
    Single,
    /// Movements performed back to back
    Superset,
}

impl SectionType {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Superset => "superset",
        }
    }

    /// Parse from storage, falling back to `Single`
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        if value.eq_ignore_ascii_case("superset") {
            Self::Superset
        } else {
            Self::Single
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_parse_is_case_insensitive() {
        assert_eq!(ActivityType::parse("hiit"), Some(ActivityType::Hiit));
        assert_eq!(ActivityType::parse(" Running "), Some(ActivityType::Running));
        assert_eq!(ActivityType::parse("Swimming"), None);
        assert!(ActivityType::Hyrox.uses_sections());
        assert!(!ActivityType::Running.uses_sections());
    }

    #[test]
    fn test_workout_status_parse_is_exact() {
        assert_eq!(WorkoutStatus::parse("Started"), Some(WorkoutStatus::Started));
        assert_eq!(WorkoutStatus::parse("started"), None);
        assert!(!WorkoutStatus::CLIENT_SETTABLE.contains(&WorkoutStatus::Saved));
    }

    #[test]
    fn test_section_type_serde() {
        let json = serde_json::to_string(&SectionType::Superset).unwrap();
        assert_eq!(json, "\"superset\"");
        assert_eq!(SectionType::parse_or_default("anything"), SectionType::Single);
    }
}
