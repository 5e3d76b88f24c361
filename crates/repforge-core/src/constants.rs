// ABOUTME: Application constants organized by domain for the Repforge platform
// ABOUTME: Scoring values, stats windows, reminder timing, and HTTP defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Constants module
//!
//! Constants are grouped into small domain modules rather than one flat list.

/// API endpoints
pub mod endpoints {
    /// Health check endpoint
    pub const HEALTH_CHECK: &str = "/health";
    /// Readiness endpoint
    pub const READY_CHECK: &str = "/ready";
    /// API base path
    pub const API_BASE: &str = "/api";
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Points awarded by the scoring engine
pub mod scoring {
    /// Score type written when a workout is completed
    pub const WORKOUT_COMPLETION: &str = "Workout Completion";
    /// Score type written for each section movement with a valid logged set
    pub const MOVEMENT_SCORE: &str = "Movement Score";
    /// Score type written when every running split has an actual time
    pub const FULL_RUNNING_SPLITS: &str = "Full Running Splits";

    /// Points for completing any workout
    pub const WORKOUT_COMPLETION_POINTS: i64 = 50;
    /// Points per section movement with a logged working set
    pub const MOVEMENT_SCORE_POINTS: i64 = 5;
    /// Bonus for logging every running split
    pub const FULL_RUNNING_SPLITS_POINTS: i64 = 20;

    /// Days counted by the weekly leaderboard window
    pub const WEEKLY_WINDOW_DAYS: i64 = 7;
}

/// Rate of perceived exertion
pub mod rpe {
    /// Highest RPE on the 0-10 scale
    pub const MAX_RPE: i64 = 10;

    /// Keep a workout RPE or movement difficulty on the 0-10 scale
    #[must_use]
    pub fn clamp_rpe(rpe: i64) -> i64 {
        rpe.clamp(0, MAX_RPE)
    }
}

/// User statistics aggregation
pub mod stats {
    /// Weekly window length in days
    pub const WEEKLY_DAYS: i64 = 7;
    /// Monthly window length in days
    pub const MONTHLY_DAYS: i64 = 30;
    /// Yearly window length in days
    pub const YEARLY_DAYS: i64 = 365;

    /// Sections whose movements do not count toward body-part totals
    pub const EXCLUDED_SECTIONS: &[&str] = &["Warm Up A", "Warm Up B", "Conditioning"];

    /// Key used when a window holds no activity
    pub const UNKNOWN_ACTIVITY: &str = "Unknown";

    /// Number of completed workouts shown on the profile
    pub const RECENT_WORKOUTS: i64 = 2;

    /// Distinct completed dates included in movement history
    pub const HISTORY_DATES: i64 = 4;
}

/// Workout reminder scheduling
pub mod reminders {
    /// Hour of day (UTC) at which a workout reminder fires
    pub const REMINDER_HOUR_UTC: u32 = 8;
    /// Reminder title
    pub const REMINDER_TITLE: &str = "Workout reminder";
}

/// User account rules
pub mod users {
    /// Length of a generated username
    pub const GENERATED_USERNAME_LEN: usize = 15;
    /// Minimum accepted password length
    pub const MIN_PASSWORD_LEN: usize = 8;
    /// Default JWT expiry in hours
    pub const DEFAULT_TOKEN_EXPIRY_HOURS: i64 = 12;
}

/// Chat pagination
pub mod chat {
    /// Default page size for room messages
    pub const DEFAULT_PAGE_SIZE: i64 = 20;
    /// Largest page a client may request
    pub const MAX_PAGE_SIZE: i64 = 100;
}

/// Service identity used in logs and user agents
pub mod service {
    /// Server service name
    pub const SERVER: &str = "repforge-server";
    /// Client user agent prefix
    pub const CLIENT: &str = "repforge-client";
}

#[cfg(test)]
mod tests {
    use super::rpe::{clamp_rpe, MAX_RPE};

    #[test]
    fn test_rpe_is_clamped() {
        assert_eq!(clamp_rpe(-2), 0);
        assert_eq!(clamp_rpe(7), 7);
        assert_eq!(clamp_rpe(14), MAX_RPE);
    }
}
