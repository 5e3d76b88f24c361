// ABOUTME: Notification, equipment filter, and chat room types with their request bodies
// ABOUTME: Shared between the server routes and the client API wrapper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::flexible_id;

// ============================================================================
// Notifications
// ============================================================================

/// A reminder queued for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    /// Notification ID
    pub id: i64,
    /// Recipient
    pub owner_id: i64,
    /// Workout the reminder is about
    pub workout_id: Option<i64>,
    /// When the reminder becomes due
    pub scheduled_datetime: DateTime<Utc>,
    /// Whether the due job has released it
    pub sent: bool,
    /// Whether it was withdrawn before release
    pub canceled: bool,
    /// Title
    pub title: String,
    /// Subtitle
    pub subtitle: Option<String>,
    /// Body text
    pub body: String,
    /// Whether the user dismissed it
    pub cleared_by_user: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/notifications/set_token/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushTokenRequest {
    /// Token owner
    #[serde(default, deserialize_with = "flexible_id::deserialize")]
    pub user_id: Option<i64>,
    /// Device push token
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of `POST /api/notifications/clear/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearNotificationsRequest {
    /// User whose notifications are cleared
    #[serde(default, deserialize_with = "flexible_id::deserialize")]
    pub user_id: Option<i64>,
}

/// Response of the notification list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationList {
    /// Released notifications, newest first
    pub notifications: Vec<ScheduledNotification>,
}

/// Acknowledgement of `POST /api/notifications/set_token/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Human readable status
    pub status: String,
}

// ============================================================================
// Equipment filters
// ============================================================================

/// A named set of equipment a user owns or has access to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentFilter {
    /// Filter ID
    pub id: i64,
    /// Owner
    pub owner_id: i64,
    /// Name, unique per owner
    pub filter_name: String,
    /// Equipment names in the filter, alphabetical
    pub equipment: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Body of the create and update filter endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentFilterRequest {
    /// Filter name
    #[serde(default)]
    pub name: Option<String>,
    /// Equipment names
    #[serde(default, rename = "equipmentIds")]
    pub equipment_ids: Vec<String>,
}

// ============================================================================
// Chat
// ============================================================================

/// A chat room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    /// Room ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// A message posted in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message ID
    pub id: i64,
    /// Room
    pub room_id: i64,
    /// Author
    pub owner_id: i64,
    /// Author's username
    pub username: String,
    /// Message text
    pub content: String,
    /// Post time
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /api/chat/rooms/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    /// Room name
    #[serde(default)]
    pub name: String,
}

/// Body of `POST /api/chat/rooms/{id}/messages/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMessageRequest {
    /// Author, defaults to the authenticated user
    #[serde(
        default,
        deserialize_with = "flexible_id::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<i64>,
    /// Message text
    #[serde(default)]
    pub content: String,
}
