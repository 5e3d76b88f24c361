// ABOUTME: Domain models shared by the server, the planner, and the client
// ABOUTME: Re-exports workout, session, catalog, progress, social, and user types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Data Models
//!
//! Every type here is both a storage read model and a JSON wire type, so the
//! server and the client agree on field names by construction.

mod activity;
mod catalog;
mod movement;
mod progress;
mod sessions;
mod social;
mod user;
mod workout;

// Activity domain
pub use activity::{ActivityType, SectionType, WorkoutStatus};

// Catalog templates
pub use catalog::{
    ConditioningDetailTemplate, ConditioningTemplate, MobilityDetailTemplate,
    MobilityWorkoutTemplate, RunningIntervalTemplate, RunningSessionTemplate,
    StrengthDetailTemplate, SuggestedStrengthTemplate,
};

// Movement catalog
pub use movement::{Equipment, Movement, MovementField};

// Progress domain
pub use progress::{
    estimated_one_rep_max, CountMap, LeaderboardEntry, MovementSummary, MovementSummaryResponse,
    ScoreLog, ScoreTotals, StrengthSet, UserStats,
};

// Session domain
pub use sessions::{
    IntervalLog, MobilityDetailPayload, MobilitySessionPayload, RunningCompletionRequest,
    RunningIntervalPayload, RunningSessionPayload, SavedHiitBlock, SavedHiitMovement,
    SavedHiitWorkout, SavedMobilityDetail, SavedMobilitySession, SavedRunningInterval,
    SavedRunningSession, SavedSplitTime, SessionCompletionRequest, SplitLog,
};

// Social domain
pub use social::{
    ChatMessage, ChatRoom, ClearNotificationsRequest, CreateRoomRequest, EquipmentFilter,
    EquipmentFilterRequest, NotificationList, PostMessageRequest, PushTokenRequest,
    ScheduledNotification, StatusResponse,
};

// User domain
pub use user::{
    FullProfile, LoginRequest, LoginResponse, LoginUser, ProfileStats, ProfileUpdateRequest,
    RegisterRequest, RegisterResponse, User,
};

// Workout domain
pub use workout::{
    DateUpdateRequest, HistorySet, MessageResponse, MovementHistory, MovementHistoryEntry,
    MovementLog, PopulatedWorkout, RecentWorkout, SaveWorkoutRequest, SaveWorkoutResponse,
    SectionLog, SectionMovementDetail, SectionMovementPayload, SectionPayload, SetEntry,
    SingleWorkoutResponse, StatusUpdateRequest, Workout, WorkoutLogRequest, WorkoutSection,
    WorkoutSet,
};

/// Accept IDs sent either as JSON numbers or as numeric strings
///
/// Older clients read the user id back from string storage and post it as-is.
pub mod flexible_id {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(i64),
        Text(String),
    }

    /// Deserialize an optional ID from a number, a numeric string, or null
    ///
    /// # Errors
    ///
    /// Returns an error when a string is present but is not an integer
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Repr::Number(id)) => Ok(Some(id)),
            Some(Repr::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(Repr::Text(text)) => text.trim().parse().map(Some).map_err(D::Error::custom),
        }
    }
}
