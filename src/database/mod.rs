// ABOUTME: SQLite connection pool, schema migrations, and per-domain database managers
// ABOUTME: Shared date and timestamp helpers keep storage formats consistent across tables
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Database Management
//!
//! One [`Database`] owns the `SQLite` pool. Each domain keeps its tables and
//! queries in its own module and exposes a small manager over a pool clone.
//! Functions that must run inside a caller's transaction take a
//! `&mut SqliteConnection` instead of the pool.

mod catalog;
mod chat;
mod equipment_filters;
mod movements;
mod notifications;
mod scores;
mod sessions;
mod stats;
mod strength;
mod users;
mod workouts;

pub use catalog::CatalogManager;
pub use chat::ChatManager;
pub use equipment_filters::EquipmentFilterManager;
pub use movements::{MovementManager, MovementSeed};
pub use notifications::{
    cancel_pending_reminders, reminder_time, schedule_reminder, NotificationManager,
};
pub use scores::{award_points, AwardKey, ScoreManager};
pub use sessions::{apply_split_logs, record_session_feedback, SessionManager};
pub use stats::StatsManager;
pub use strength::{record_strength_sets, refresh_movement_summaries, StrengthManager};
pub use users::{StoredCredentials, UserManager};
pub use workouts::{
    apply_section_logs, fetch_owned_workout, insert_workout, mark_completed, section_workout_id,
    set_scheduled_date, LoggedMovement, WorkoutManager,
};

use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use repforge_core::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

/// Storage format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database manager holding the shared pool
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) and migrate the database at `database_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the file cannot be opened, or a
    /// migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` is a separate database, so pin one
        let pool = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(8)
                .connect_with(options)
                .await?
        };

        let db = Self { pool };
        db.migrate().await?;
        info!("Database ready at {}", redact(database_url));
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction for a multi-table write
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available
    pub async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to start transaction: {e}")))
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any `CREATE` statement fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_movements().await?;
        self.migrate_equipment_filters().await?;
        self.migrate_workouts().await?;
        self.migrate_sessions().await?;
        self.migrate_catalog().await?;
        self.migrate_scores().await?;
        self.migrate_stats().await?;
        self.migrate_strength().await?;
        self.migrate_notifications().await?;
        self.migrate_chat().await?;
        debug!("Database migrations complete");
        Ok(())
    }

    /// Run a batch of DDL statements
    async fn execute_ddl(&self, statements: &[&str]) -> Result<()> {
        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ========================================================================
    // Managers
    // ========================================================================

    /// User accounts
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Movement and equipment catalog
    #[must_use]
    pub fn movements(&self) -> MovementManager {
        MovementManager::new(self.pool.clone())
    }

    /// Saved equipment filters
    #[must_use]
    pub fn equipment_filters(&self) -> EquipmentFilterManager {
        EquipmentFilterManager::new(self.pool.clone())
    }

    /// Saved workouts and their sections
    #[must_use]
    pub fn workouts(&self) -> WorkoutManager {
        WorkoutManager::new(self.pool.clone())
    }

    /// Running, HIIT, and mobility sessions attached to workouts
    #[must_use]
    pub fn sessions(&self) -> SessionManager {
        SessionManager::new(self.pool.clone())
    }

    /// Read-only workout templates
    #[must_use]
    pub fn catalog(&self) -> CatalogManager {
        CatalogManager::new(self.pool.clone())
    }

    /// Score logs and the leaderboard
    #[must_use]
    pub fn scores(&self) -> ScoreManager {
        ScoreManager::new(self.pool.clone())
    }

    /// Aggregated user statistics
    #[must_use]
    pub fn stats(&self) -> StatsManager {
        StatsManager::new(self.pool.clone())
    }

    /// Strength sets and movement summaries
    #[must_use]
    pub fn strength(&self) -> StrengthManager {
        StrengthManager::new(self.pool.clone())
    }

    /// Scheduled notifications
    #[must_use]
    pub fn notifications(&self) -> NotificationManager {
        NotificationManager::new(self.pool.clone())
    }

    /// Chat rooms and messages
    #[must_use]
    pub fn chat(&self) -> ChatManager {
        ChatManager::new(self.pool.clone())
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

// ============================================================================
// Storage format helpers
// ============================================================================

/// Current UTC time at second precision
#[must_use]
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}

/// Today's date in UTC
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// RFC3339 UTC text at second precision
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp
///
/// # Errors
///
/// Returns a database error if the text is not RFC3339
pub fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid stored timestamp '{raw}': {e}")))
}

/// Parse an optional stored timestamp
///
/// # Errors
///
/// Returns a database error if the text is present but not RFC3339
pub fn parse_optional_timestamp(raw: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    raw.map(parse_timestamp).transpose()
}

/// `YYYY-MM-DD` text
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored date
///
/// # Errors
///
/// Returns a database error if the text is not `YYYY-MM-DD`
pub fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| AppError::database(format!("Invalid stored date '{raw}': {e}")))
}

/// Parse an optional stored date
///
/// # Errors
///
/// Returns a database error if the text is present but not `YYYY-MM-DD`
pub fn parse_optional_date(raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    raw.map(parse_date).transpose()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_timestamp_format_is_second_precision_utc() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 9, 8, 0, 0).unwrap();
        assert_eq!(format_timestamp(ts), "2025-03-09T08:00:00Z");
        assert_eq!(parse_timestamp("2025-03-09T08:00:00Z").unwrap(), ts);
    }

    #[test]
    fn test_date_round_trip_and_rejects_garbage() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(parse_date(&format_date(date)).unwrap(), date);
        assert!(parse_date("31/01/2025").is_err());
        assert_eq!(parse_optional_date(None).unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_database_migrates_twice() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'workouts'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, 1);
    }
}
