// ABOUTME: Release of due workout reminders
// ABOUTME: Flips scheduled notifications to sent once their time has passed
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use repforge_core::errors::AppResult;
use tracing::{debug, info};

use crate::resources::ServerResources;

/// Mark every reminder due at or before `at` as sent, returning how many were released
///
/// Push delivery happens outside the server; released reminders become
/// visible through the notification list.
///
/// # Errors
///
/// Returns an error if the update fails
pub async fn release_due_reminders(resources: &ServerResources, at: DateTime<Utc>) -> AppResult<usize> {
    let released = resources.database.notifications().release_due(at).await?;

    for notification in &released {
        debug!(
            notification_id = notification.id,
            user_id = notification.owner_id,
            workout_id = ?notification.workout_id,
            "Reminder released"
        );
    }
    if !released.is_empty() {
        info!(count = released.len(), "Released due reminders");
    }
    Ok(released.len())
}
