// ABOUTME: Score log and leaderboard database operations
// ABOUTME: Idempotent point awards, periodic total/weekly/monthly recompute, and ranked listing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use repforge_core::constants::scoring::{
    FULL_RUNNING_SPLITS, FULL_RUNNING_SPLITS_POINTS, MOVEMENT_SCORE, MOVEMENT_SCORE_POINTS,
    WEEKLY_WINDOW_DAYS, WORKOUT_COMPLETION, WORKOUT_COMPLETION_POINTS,
};
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{LeaderboardEntry, ScoreLog, ScoreTotals};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::{format_timestamp, now, parse_timestamp, Database};

impl Database {
    /// Create score log and leaderboard tables
    pub(super) async fn migrate_scores(&self) -> Result<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS score_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                score_type TEXT NOT NULL,
                score_value INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                workout_id INTEGER REFERENCES workouts(id) ON DELETE SET NULL,
                section_movement_id INTEGER REFERENCES section_movements(id) ON DELETE SET NULL,
                award_key TEXT NOT NULL UNIQUE
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS leaderboards (
                user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                total_score INTEGER NOT NULL DEFAULT 0,
                weekly_score INTEGER NOT NULL DEFAULT 0,
                monthly_score INTEGER NOT NULL DEFAULT 0,
                total_rank INTEGER,
                weekly_rank INTEGER,
                monthly_rank INTEGER,
                last_updated TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_score_logs_user ON score_logs(user_id, timestamp)",
        ])
        .await
    }
}

/// What a point award is for; each key pays out at most once per user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardKey {
    /// Finishing a workout
    WorkoutCompletion {
        /// Completed workout
        workout_id: i64,
    },
    /// Logging a working set for a section movement
    MovementScore {
        /// Workout the movement belongs to
        workout_id: i64,
        /// Logged section movement
        section_movement_id: i64,
    },
    /// Recording every split of a run
    FullRunningSplits {
        /// Completed run
        workout_id: i64,
    },
}

impl AwardKey {
    /// Score type stored in the log
    #[must_use]
    pub const fn score_type(self) -> &'static str {
        match self {
            Self::WorkoutCompletion { .. } => WORKOUT_COMPLETION,
            Self::MovementScore { .. } => MOVEMENT_SCORE,
            Self::FullRunningSplits { .. } => FULL_RUNNING_SPLITS,
        }
    }

    /// Points paid for the award
    #[must_use]
    pub const fn points(self) -> i64 {
        match self {
            Self::WorkoutCompletion { .. } => WORKOUT_COMPLETION_POINTS,
            Self::MovementScore { .. } => MOVEMENT_SCORE_POINTS,
            Self::FullRunningSplits { .. } => FULL_RUNNING_SPLITS_POINTS,
        }
    }

    const fn workout_id(self) -> i64 {
        match self {
            Self::WorkoutCompletion { workout_id }
            | Self::MovementScore { workout_id, .. }
            | Self::FullRunningSplits { workout_id } => workout_id,
        }
    }

    const fn section_movement_id(self) -> Option<i64> {
        match self {
            Self::MovementScore {
                section_movement_id,
                ..
            } => Some(section_movement_id),
            Self::WorkoutCompletion { .. } | Self::FullRunningSplits { .. } => None,
        }
    }

    /// Uniqueness key for the award
    fn dedup_key(self, user_id: i64) -> String {
        match self {
            Self::MovementScore {
                section_movement_id,
                ..
            } => format!("{user_id}:{}:section_movement:{section_movement_id}", self.score_type()),
            Self::WorkoutCompletion { workout_id } | Self::FullRunningSplits { workout_id } => {
                format!("{user_id}:{}:workout:{workout_id}", self.score_type())
            }
        }
    }
}

/// Award points once per key, adding them to every leaderboard column
///
/// Returns `false` when the award was already paid.
///
/// # Errors
///
/// Returns an error if a write fails
pub async fn award_points(
    conn: &mut SqliteConnection,
    user_id: i64,
    key: AwardKey,
) -> AppResult<bool> {
    let stamp = format_timestamp(now());
    let result = sqlx::query(
        r"
        INSERT OR IGNORE INTO score_logs
            (user_id, score_type, score_value, timestamp, workout_id, section_movement_id, award_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ",
    )
    .bind(user_id)
    .bind(key.score_type())
    .bind(key.points())
    .bind(&stamp)
    .bind(key.workout_id())
    .bind(key.section_movement_id())
    .bind(key.dedup_key(user_id))
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to log score: {e}")))?;

    if result.rows_affected() == 0 {
        debug!(user_id, score_type = key.score_type(), "Award already paid");
        return Ok(false);
    }

    sqlx::query(
        r"
        INSERT INTO leaderboards (user_id, total_score, weekly_score, monthly_score, last_updated)
        VALUES ($1, $2, $2, $2, $3)
        ON CONFLICT(user_id) DO UPDATE SET
            total_score = total_score + excluded.total_score,
            weekly_score = weekly_score + excluded.weekly_score,
            monthly_score = monthly_score + excluded.monthly_score,
            last_updated = excluded.last_updated
        ",
    )
    .bind(user_id)
    .bind(key.points())
    .bind(&stamp)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to update leaderboard: {e}")))?;

    Ok(true)
}

/// Score log and leaderboard database operations
pub struct ScoreManager {
    pool: SqlitePool,
}

impl ScoreManager {
    /// Create a new score manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Score logs for a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_logs(&self, user_id: i64) -> AppResult<Vec<ScoreLog>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, score_type, score_value, timestamp, workout_id, section_movement_id
            FROM score_logs WHERE user_id = $1 ORDER BY timestamp DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list score logs: {e}")))?;

        rows.iter()
            .map(|row| {
                let timestamp: String = row.get("timestamp");
                Ok(ScoreLog {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    score_type: row.get("score_type"),
                    score_value: row.get("score_value"),
                    timestamp: parse_timestamp(&timestamp)?,
                    workout_id: row.get("workout_id"),
                    section_movement_id: row.get("section_movement_id"),
                })
            })
            .collect()
    }

    /// Recompute every leaderboard row from the score logs
    ///
    /// Weekly scores cover the last seven days from midnight, monthly scores
    /// start on the first of the month. A category's rank is left empty when
    /// the user has no points in it. Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or write fails
    pub async fn recompute_leaderboard(&self, today: NaiveDate) -> AppResult<usize> {
        let weekly_start = start_of_day(today - Duration::days(WEEKLY_WINDOW_DAYS));
        let monthly_start = start_of_day(today.with_day(1).unwrap_or(today));

        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(
            r"
            SELECT user_id,
                   COALESCE(SUM(score_value), 0) AS total_score,
                   COALESCE(SUM(CASE WHEN timestamp >= $1 THEN score_value ELSE 0 END), 0) AS weekly_score,
                   COALESCE(SUM(CASE WHEN timestamp >= $2 THEN score_value ELSE 0 END), 0) AS monthly_score
            FROM score_logs
            GROUP BY user_id
            ",
        )
        .bind(format_timestamp(weekly_start))
        .bind(format_timestamp(monthly_start))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to total score logs: {e}")))?;

        let mut totals: BTreeMap<i64, ScoreTotals> = BTreeMap::new();
        for row in &rows {
            totals.insert(
                row.get("user_id"),
                ScoreTotals {
                    total_score: row.get("total_score"),
                    weekly_score: row.get("weekly_score"),
                    monthly_score: row.get("monthly_score"),
                },
            );
        }

        // Users whose logs were all removed still keep a zeroed row
        let existing: Vec<i64> = sqlx::query_scalar("SELECT user_id FROM leaderboards")
            .fetch_all(&mut *tx)
            .await?;
        for user_id in existing {
            totals.entry(user_id).or_default();
        }

        let total_ranks = rank_by(&totals, |scores| scores.total_score);
        let weekly_ranks = rank_by(&totals, |scores| scores.weekly_score);
        let monthly_ranks = rank_by(&totals, |scores| scores.monthly_score);
        let stamp = format_timestamp(now());

        for (user_id, scores) in &totals {
            sqlx::query(
                r"
                INSERT INTO leaderboards
                    (user_id, total_score, weekly_score, monthly_score,
                     total_rank, weekly_rank, monthly_rank, last_updated)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT(user_id) DO UPDATE SET
                    total_score = excluded.total_score,
                    weekly_score = excluded.weekly_score,
                    monthly_score = excluded.monthly_score,
                    total_rank = excluded.total_rank,
                    weekly_rank = excluded.weekly_rank,
                    monthly_rank = excluded.monthly_rank,
                    last_updated = excluded.last_updated
                ",
            )
            .bind(user_id)
            .bind(scores.total_score)
            .bind(scores.weekly_score)
            .bind(scores.monthly_score)
            .bind(total_ranks.get(user_id).copied())
            .bind(weekly_ranks.get(user_id).copied())
            .bind(monthly_ranks.get(user_id).copied())
            .bind(&stamp)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to write leaderboard: {e}")))?;
        }

        tx.commit().await?;
        info!(users = totals.len(), "Leaderboard recomputed");
        Ok(totals.len())
    }

    /// Leaderboard rows by weekly rank; unranked rows last by weekly score
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_entries(&self) -> AppResult<Vec<LeaderboardEntry>> {
        let rows = sqlx::query(
            r"
            SELECT l.user_id, u.username, u.first_name, u.last_name,
                   l.total_score, l.weekly_score, l.monthly_score,
                   l.total_rank, l.weekly_rank, l.monthly_rank, l.last_updated
            FROM leaderboards l
            JOIN users u ON u.id = l.user_id
            ORDER BY l.weekly_rank IS NULL, l.weekly_rank, l.weekly_score DESC, l.user_id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list leaderboard: {e}")))?;

        rows.iter().map(row_to_entry).collect()
    }

    /// A user's totals, zero when they have no row yet
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn totals(&self, user_id: i64) -> AppResult<ScoreTotals> {
        let row = sqlx::query(
            "SELECT total_score, weekly_score, monthly_score FROM leaderboards WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read leaderboard: {e}")))?;

        Ok(row.map_or_else(ScoreTotals::default, |row| ScoreTotals {
            total_score: row.get("total_score"),
            weekly_score: row.get("weekly_score"),
            monthly_score: row.get("monthly_score"),
        }))
    }

    /// One plus the number of users with a strictly higher total score
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn rank(&self, user_id: i64) -> AppResult<i64> {
        let total = self.totals(user_id).await?.total_score;
        let higher: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM leaderboards WHERE total_score > $1")
                .bind(total)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to rank user: {e}")))?;
        Ok(higher + 1)
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map_or_else(now, |midnight| midnight.and_utc())
}

/// Ordinal ranks 1..n by descending score, ties broken by user id; zero scores stay unranked
fn rank_by(totals: &BTreeMap<i64, ScoreTotals>, score: impl Fn(&ScoreTotals) -> i64) -> BTreeMap<i64, i64> {
    let mut ordered: Vec<(i64, i64)> = totals
        .iter()
        .map(|(user_id, scores)| (*user_id, score(scores)))
        .filter(|(_, value)| *value > 0)
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, (user_id, _))| (user_id, index as i64 + 1))
        .collect()
}

fn row_to_entry(row: &SqliteRow) -> AppResult<LeaderboardEntry> {
    let last_updated: String = row.get("last_updated");
    Ok(LeaderboardEntry {
        user_id: row.get("user_id"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        scores: ScoreTotals {
            total_score: row.get("total_score"),
            weekly_score: row.get("weekly_score"),
            monthly_score: row.get("monthly_score"),
        },
        total_rank: row.get("total_rank"),
        weekly_rank: row.get("weekly_rank"),
        monthly_rank: row.get("monthly_rank"),
        last_updated: parse_timestamp(&last_updated)?,
    })
}
