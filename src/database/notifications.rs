// ABOUTME: Scheduled workout reminder storage
// ABOUTME: Queues, cancels, releases, lists, and clears per-user notifications
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use repforge_core::constants::reminders::{REMINDER_HOUR_UTC, REMINDER_TITLE};
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::ScheduledNotification;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use super::{format_timestamp, now, parse_timestamp, Database};

const NOTIFICATION_COLUMNS: &str = "id, owner_id, workout_id, scheduled_datetime, sent, canceled, \
     title, subtitle, body, cleared_by_user, created_at, updated_at";

impl Database {
    /// Create the scheduled notification table
    pub(super) async fn migrate_notifications(&self) -> Result<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS scheduled_notifications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                workout_id INTEGER REFERENCES workouts(id) ON DELETE CASCADE,
                scheduled_datetime TEXT NOT NULL,
                sent INTEGER NOT NULL DEFAULT 0,
                canceled INTEGER NOT NULL DEFAULT 0,
                title TEXT NOT NULL,
                subtitle TEXT,
                body TEXT NOT NULL,
                cleared_by_user INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_notifications_due ON scheduled_notifications(sent, canceled, scheduled_datetime)",
        ])
        .await
    }
}

/// When the reminder for a workout planned on `date` fires
#[must_use]
pub fn reminder_time(date: NaiveDate) -> DateTime<Utc> {
    let hour = NaiveTime::from_hms_opt(REMINDER_HOUR_UTC, 0, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(hour).and_utc()
}

/// Queue the reminder for a workout, withdrawing any pending one first
///
/// # Errors
///
/// Returns an error if a write fails
pub async fn schedule_reminder(
    conn: &mut SqliteConnection,
    owner_id: i64,
    workout_id: i64,
    workout_name: &str,
    date: NaiveDate,
) -> AppResult<i64> {
    cancel_pending_reminders(conn, workout_id).await?;

    let stamp = format_timestamp(now());
    let id = sqlx::query(
        r"
        INSERT INTO scheduled_notifications
            (owner_id, workout_id, scheduled_datetime, title, subtitle, body, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        ",
    )
    .bind(owner_id)
    .bind(workout_id)
    .bind(format_timestamp(reminder_time(date)))
    .bind(REMINDER_TITLE)
    .bind(workout_name)
    .bind(format!("{workout_name} is scheduled for today"))
    .bind(&stamp)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to schedule reminder: {e}")))?
    .last_insert_rowid();

    debug!(owner_id, workout_id, %date, "Scheduled workout reminder");
    Ok(id)
}

/// Withdraw unreleased reminders for a workout
///
/// # Errors
///
/// Returns an error if the update fails
pub async fn cancel_pending_reminders(conn: &mut SqliteConnection, workout_id: i64) -> AppResult<u64> {
    let result = sqlx::query(
        r"
        UPDATE scheduled_notifications SET canceled = 1, updated_at = $1
        WHERE workout_id = $2 AND sent = 0 AND canceled = 0
        ",
    )
    .bind(format_timestamp(now()))
    .bind(workout_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to cancel reminders: {e}")))?;
    Ok(result.rows_affected())
}

/// Scheduled notification database operations
pub struct NotificationManager {
    pool: SqlitePool,
}

impl NotificationManager {
    /// Create a new notification manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Released, live, uncleared notifications for a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_released(&self, owner_id: i64) -> AppResult<Vec<ScheduledNotification>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {NOTIFICATION_COLUMNS} FROM scheduled_notifications
            WHERE owner_id = $1 AND sent = 1 AND canceled = 0 AND cleared_by_user = 0
            ORDER BY scheduled_datetime DESC, id DESC
            "
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list notifications: {e}")))?;

        rows.iter().map(row_to_notification).collect()
    }

    /// Every notification of a user, including pending and canceled ones
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_all(&self, owner_id: i64) -> AppResult<Vec<ScheduledNotification>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM scheduled_notifications WHERE owner_id = $1 ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list notifications: {e}")))?;

        rows.iter().map(row_to_notification).collect()
    }

    /// Mark every notification of a user as cleared
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn clear_all(&self, owner_id: i64) -> AppResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE scheduled_notifications SET cleared_by_user = 1, updated_at = $1
            WHERE owner_id = $2 AND cleared_by_user = 0
            ",
        )
        .bind(format_timestamp(now()))
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear notifications: {e}")))?;
        Ok(result.rows_affected())
    }

    /// Release every pending notification due at or before `at`
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn release_due(&self, at: DateTime<Utc>) -> AppResult<Vec<ScheduledNotification>> {
        let rows = sqlx::query(&format!(
            r"
            UPDATE scheduled_notifications SET sent = 1, updated_at = $1
            WHERE sent = 0 AND canceled = 0 AND scheduled_datetime <= $2
            RETURNING {NOTIFICATION_COLUMNS}
            "
        ))
        .bind(format_timestamp(now()))
        .bind(format_timestamp(at))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to release notifications: {e}")))?;

        rows.iter().map(row_to_notification).collect()
    }
}

fn row_to_notification(row: &SqliteRow) -> AppResult<ScheduledNotification> {
    let scheduled: String = row.get("scheduled_datetime");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    Ok(ScheduledNotification {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        workout_id: row.get("workout_id"),
        scheduled_datetime: parse_timestamp(&scheduled)?,
        sent: row.get("sent"),
        canceled: row.get("canceled"),
        title: row.get("title"),
        subtitle: row.get("subtitle"),
        body: row.get("body"),
        cleared_by_user: row.get("cleared_by_user"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
