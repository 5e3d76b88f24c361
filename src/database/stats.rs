// ABOUTME: Per-user training statistics storage and computation
// ABOUTME: Body-part counts and activity minutes over weekly, monthly, and yearly windows
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use repforge_core::constants::stats::{
    EXCLUDED_SECTIONS, MONTHLY_DAYS, UNKNOWN_ACTIVITY, WEEKLY_DAYS, YEARLY_DAYS,
};
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{CountMap, UserStats};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::{format_date, format_timestamp, now, parse_optional_timestamp, Database};

impl Database {
    /// Create the user statistics table
    pub(super) async fn migrate_stats(&self) -> Result<()> {
        self.execute_ddl(&[r"
            CREATE TABLE IF NOT EXISTS user_stats (
                user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                weekly_body_part TEXT NOT NULL DEFAULT '{}',
                monthly_body_part TEXT NOT NULL DEFAULT '{}',
                yearly_body_part TEXT NOT NULL DEFAULT '{}',
                weekly_activity_type TEXT NOT NULL DEFAULT '{}',
                monthly_activity_type TEXT NOT NULL DEFAULT '{}',
                yearly_activity_type TEXT NOT NULL DEFAULT '{}',
                last_updated TEXT
            )
            "])
        .await
    }
}

/// User statistics database operations
pub struct StatsManager {
    pool: SqlitePool,
}

impl StatsManager {
    /// Create a new stats manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stored statistics for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored map is not valid JSON
    pub async fn get_stats(&self, user_id: i64) -> AppResult<Option<UserStats>> {
        let Some(row) = sqlx::query(
            r"
            SELECT user_id, weekly_body_part, monthly_body_part, yearly_body_part,
                   weekly_activity_type, monthly_activity_type, yearly_activity_type, last_updated
            FROM user_stats WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user stats: {e}")))?
        else {
            return Ok(None);
        };

        Ok(Some(UserStats {
            user_id: row.get("user_id"),
            weekly_body_part: decode_counts(row.get::<&str, _>("weekly_body_part"))?,
            monthly_body_part: decode_counts(row.get::<&str, _>("monthly_body_part"))?,
            yearly_body_part: decode_counts(row.get::<&str, _>("yearly_body_part"))?,
            weekly_activity_type: decode_counts(row.get::<&str, _>("weekly_activity_type"))?,
            monthly_activity_type: decode_counts(row.get::<&str, _>("monthly_activity_type"))?,
            yearly_activity_type: decode_counts(row.get::<&str, _>("yearly_activity_type"))?,
            last_updated: parse_optional_timestamp(row.get("last_updated"))?,
        }))
    }

    /// Compute and store fresh statistics for a user
    ///
    /// # Errors
    ///
    /// Returns an error if a query or write fails
    pub async fn refresh_stats(&self, user_id: i64, today: NaiveDate) -> AppResult<UserStats> {
        let stats = UserStats {
            user_id,
            weekly_body_part: self.body_part_counts(user_id, today, WEEKLY_DAYS).await?,
            monthly_body_part: self.body_part_counts(user_id, today, MONTHLY_DAYS).await?,
            yearly_body_part: self.body_part_counts(user_id, today, YEARLY_DAYS).await?,
            weekly_activity_type: self.activity_minutes(user_id, today, WEEKLY_DAYS).await?,
            monthly_activity_type: self.activity_minutes(user_id, today, MONTHLY_DAYS).await?,
            yearly_activity_type: self.activity_minutes(user_id, today, YEARLY_DAYS).await?,
            last_updated: Some(now()),
        };
        self.store_stats(&stats).await?;
        debug!(user_id, "User stats refreshed");
        Ok(stats)
    }

    async fn store_stats(&self, stats: &UserStats) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_stats
                (user_id, weekly_body_part, monthly_body_part, yearly_body_part,
                 weekly_activity_type, monthly_activity_type, yearly_activity_type, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT(user_id) DO UPDATE SET
                weekly_body_part = excluded.weekly_body_part,
                monthly_body_part = excluded.monthly_body_part,
                yearly_body_part = excluded.yearly_body_part,
                weekly_activity_type = excluded.weekly_activity_type,
                monthly_activity_type = excluded.monthly_activity_type,
                yearly_activity_type = excluded.yearly_activity_type,
                last_updated = excluded.last_updated
            ",
        )
        .bind(stats.user_id)
        .bind(encode_counts(&stats.weekly_body_part)?)
        .bind(encode_counts(&stats.monthly_body_part)?)
        .bind(encode_counts(&stats.yearly_body_part)?)
        .bind(encode_counts(&stats.weekly_activity_type)?)
        .bind(encode_counts(&stats.monthly_activity_type)?)
        .bind(encode_counts(&stats.yearly_activity_type)?)
        .bind(stats.last_updated.map(format_timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to store user stats: {e}")))?;
        Ok(())
    }

    /// Distinct movements per completed workout, counted by primary body part
    async fn body_part_counts(&self, user_id: i64, today: NaiveDate, days: i64) -> AppResult<CountMap> {
        let excluded = EXCLUDED_SECTIONS
            .iter()
            .enumerate()
            .map(|(index, _)| format!("${}", index + 4))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r"
            SELECT DISTINCT w.id AS workout_id, m.id AS movement_id, m.primary_body_part
            FROM workouts w
            JOIN workout_sections s ON s.workout_id = w.id
            JOIN section_movements sm ON sm.section_id = s.id
            JOIN movements m ON m.id = sm.movement_id
            WHERE w.owner_id = $1
              AND w.status = 'Completed'
              AND w.completed_date >= $2
              AND w.completed_date <= $3
              AND s.section_name NOT IN ({excluded})
            "
        );

        let mut query = sqlx::query(&sql)
            .bind(user_id)
            .bind(format_date(window_start(today, days)))
            .bind(format_date(today));
        for section in EXCLUDED_SECTIONS {
            query = query.bind(*section);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count body parts: {e}")))?;

        let mut seen = BTreeSet::new();
        let mut counts = CountMap::new();
        for row in rows {
            let key: (i64, i64) = (row.get("workout_id"), row.get("movement_id"));
            let body_part: String = row.get("primary_body_part");
            if body_part.trim().is_empty() || !seen.insert(key) {
                continue;
            }
            *counts.entry(body_part).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Completed minutes per activity type
    async fn activity_minutes(&self, user_id: i64, today: NaiveDate, days: i64) -> AppResult<CountMap> {
        let rows = sqlx::query(
            r"
            SELECT activity_type, COALESCE(SUM(duration), 0) AS minutes
            FROM workouts
            WHERE owner_id = $1
              AND status = 'Completed'
              AND completed_date >= $2
              AND completed_date <= $3
            GROUP BY activity_type
            ",
        )
        .bind(user_id)
        .bind(format_date(window_start(today, days)))
        .bind(format_date(today))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum activity minutes: {e}")))?;

        let mut minutes: CountMap = rows
            .iter()
            .map(|row| (row.get("activity_type"), row.get("minutes")))
            .collect();
        if minutes.is_empty() {
            minutes.insert(UNKNOWN_ACTIVITY.to_owned(), 0);
        }
        Ok(minutes)
    }
}

/// First day of the window looking back `days` days from `today`, both ends inclusive
fn window_start(today: NaiveDate, days: i64) -> NaiveDate {
    today - Duration::days(days)
}

fn encode_counts(counts: &CountMap) -> AppResult<String> {
    serde_json::to_string(counts)
        .map_err(|e| AppError::internal(format!("Failed to encode stats: {e}")))
}

fn decode_counts(raw: &str) -> AppResult<CountMap> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::database(format!("Invalid stored stats map: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_reaches_back_full_days() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(window_start(today, 7), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(window_start(today, 30), NaiveDate::from_ymd_opt(2025, 2, 8).unwrap());
        assert_eq!(window_start(today, 365), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_counts_round_trip_through_json() {
        let mut counts = CountMap::new();
        counts.insert("Legs".to_owned(), 3);
        let encoded = encode_counts(&counts).unwrap();
        assert_eq!(encoded, r#"{"Legs":3}"#);
        assert_eq!(decode_counts(&encoded).unwrap(), counts);
    }
}
