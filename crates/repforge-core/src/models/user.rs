// ABOUTME: User account types and the authentication request/response bodies
// ABOUTME: Public profile, registration, login, profile update, and full-profile statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::progress::ScoreTotals;
use super::workout::RecentWorkout;

/// Public view of a user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: i64,
    /// Login email
    pub email: String,
    /// Public handle
    pub username: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Avatar reference
    pub profile_image: Option<String>,
    /// Whether onboarding has been completed
    pub is_onboarding_complete: bool,
    /// First successful login
    pub first_login: Option<DateTime<Utc>>,
    /// Most recent login
    pub last_login: Option<DateTime<Utc>>,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/auth/register/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Login email
    #[serde(default)]
    pub email: String,
    /// Plain-text password
    #[serde(default)]
    pub password: String,
    /// First name
    #[serde(default)]
    pub first_name: String,
    /// Last name
    #[serde(default)]
    pub last_name: String,
    /// Desired handle, generated when empty
    #[serde(default)]
    pub username: Option<String>,
}

/// Response of a successful registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Confirmation message
    pub message: String,
    /// Session token
    pub token: String,
    /// New user ID
    pub user_id: i64,
}

/// Body of `POST /api/auth/login/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login email
    #[serde(default)]
    pub email: Option<String>,
    /// Plain-text password
    #[serde(default)]
    pub password: Option<String>,
}

/// User summary returned at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    /// Login email
    pub email: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Whether onboarding has been completed
    pub is_onboarding_complete: bool,
}

/// Response of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Greeting
    pub message: String,
    /// Session token
    pub token: String,
    /// User ID
    pub user_id: i64,
    /// User summary
    pub user: LoginUser,
}

/// Body of `PATCH /api/auth/update-profile/{id}/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    /// New first name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New last name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New handle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New avatar reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

/// Training summary shown on the profile page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    /// Completed workouts since the first of the month
    pub workouts_this_month: i64,
    /// Completed workouts ever
    pub workouts_all_time: i64,
    /// Latest completed workouts
    pub recent_workouts: Vec<RecentWorkout>,
    /// Score totals
    pub leaderboard: ScoreTotals,
    /// Position by total score
    pub leaderboard_rank: i64,
}

/// Response of `GET /api/auth/full-profile/{id}/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullProfile {
    /// Public user
    pub user: User,
    /// Training summary
    pub stats: ProfileStats,
}
