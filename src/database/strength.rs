// ABOUTME: Strength set history and per-movement best-lift summaries
// ABOUTME: Records working sets at completion time and recomputes estimated one-rep maxes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{
    estimated_one_rep_max, MovementSummary, MovementSummaryResponse, StrengthSet,
};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use super::workouts::LoggedMovement;
use super::{format_date, format_timestamp, now, parse_date, parse_timestamp, Database};

impl Database {
    /// Create strength set and movement summary tables
    pub(super) async fn migrate_strength(&self) -> Result<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS strength_sets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                movement_id INTEGER NOT NULL REFERENCES movements(id) ON DELETE CASCADE,
                workout_id INTEGER REFERENCES workouts(id) ON DELETE SET NULL,
                performed_date TEXT NOT NULL,
                set_number INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight REAL NOT NULL,
                rpe INTEGER,
                load REAL NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS movement_summaries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                movement_id INTEGER NOT NULL REFERENCES movements(id) ON DELETE CASCADE,
                best_weight REAL NOT NULL,
                best_reps INTEGER NOT NULL,
                estimated_1rm REAL NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (owner_id, movement_id)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_strength_sets_owner ON strength_sets(owner_id, movement_id)",
        ])
        .await
    }
}

/// Replace the strength sets recorded for a workout with its working sets
///
/// # Errors
///
/// Returns an error if a write fails
pub async fn record_strength_sets(
    conn: &mut SqliteConnection,
    owner_id: i64,
    workout_id: i64,
    performed: NaiveDate,
    logged: &[LoggedMovement],
) -> AppResult<usize> {
    sqlx::query("DELETE FROM strength_sets WHERE workout_id = $1")
        .bind(workout_id)
        .execute(&mut *conn)
        .await?;

    let mut recorded = 0;
    for movement in logged {
        for set in movement.sets.iter().filter(|set| set.is_working_set()) {
            let reps = set.reps.unwrap_or(0);
            let weight = set.weight.unwrap_or(0.0);
            sqlx::query(
                r"
                INSERT INTO strength_sets
                    (owner_id, movement_id, workout_id, performed_date, set_number, reps, weight, rpe, load)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(owner_id)
            .bind(movement.movement_id)
            .bind(workout_id)
            .bind(format_date(performed))
            .bind(set.set_number)
            .bind(reps)
            .bind(weight)
            .bind(movement.movement_difficulty)
            .bind(weight * reps as f64)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to record strength set: {e}")))?;
            recorded += 1;
        }
    }

    debug!(owner_id, workout_id, recorded, "Recorded strength sets");
    Ok(recorded)
}

/// Rebuild every movement summary for an owner from their strength sets
///
/// The best set is the heaviest one, with more reps winning a tie.
///
/// # Errors
///
/// Returns an error if a query or write fails
pub async fn refresh_movement_summaries(conn: &mut SqliteConnection, owner_id: i64) -> AppResult<()> {
    let rows = sqlx::query("SELECT movement_id, reps, weight FROM strength_sets WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_all(&mut *conn)
        .await?;

    let mut best: BTreeMap<i64, (f64, i64)> = BTreeMap::new();
    for row in rows {
        let movement_id: i64 = row.get("movement_id");
        let candidate: (f64, i64) = (row.get("weight"), row.get("reps"));
        best.entry(movement_id)
            .and_modify(|current| {
                if is_better(candidate, *current) {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }

    sqlx::query("DELETE FROM movement_summaries WHERE owner_id = $1")
        .bind(owner_id)
        .execute(&mut *conn)
        .await?;

    let stamp = format_timestamp(now());
    for (movement_id, (weight, reps)) in best {
        sqlx::query(
            r"
            INSERT INTO movement_summaries
                (owner_id, movement_id, best_weight, best_reps, estimated_1rm, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(owner_id)
        .bind(movement_id)
        .bind(weight)
        .bind(reps)
        .bind(estimated_one_rep_max(weight, reps))
        .bind(&stamp)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to write movement summary: {e}")))?;
    }
    Ok(())
}

fn is_better(candidate: (f64, i64), current: (f64, i64)) -> bool {
    candidate.0 > current.0 || ((candidate.0 - current.0).abs() < f64::EPSILON && candidate.1 > current.1)
}

/// Strength progression read operations
pub struct StrengthManager {
    pool: SqlitePool,
}

impl StrengthManager {
    /// Create a new strength manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Summaries by exercise name and raw sets newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn movement_summary(&self, owner_id: i64) -> AppResult<MovementSummaryResponse> {
        let summary_rows = sqlx::query(
            r"
            SELECT s.movement_id, m.exercise, s.best_weight, s.best_reps, s.estimated_1rm, s.updated_at
            FROM movement_summaries s
            JOIN movements m ON m.id = s.movement_id
            WHERE s.owner_id = $1
            ORDER BY m.exercise
            ",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load movement summaries: {e}")))?;

        let summaries = summary_rows
            .iter()
            .map(|row| {
                let updated_at: String = row.get("updated_at");
                Ok(MovementSummary {
                    movement_id: row.get("movement_id"),
                    exercise: row.get("exercise"),
                    best_weight: row.get("best_weight"),
                    best_reps: row.get("best_reps"),
                    estimated_1rm: row.get("estimated_1rm"),
                    updated_at: parse_timestamp(&updated_at)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let set_rows = sqlx::query(
            r"
            SELECT id, owner_id, movement_id, workout_id, performed_date, set_number,
                   reps, weight, rpe, load
            FROM strength_sets WHERE owner_id = $1
            ORDER BY performed_date DESC, id DESC
            ",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load strength sets: {e}")))?;

        let strength_sets = set_rows
            .iter()
            .map(|row| {
                let performed: String = row.get("performed_date");
                Ok(StrengthSet {
                    id: row.get("id"),
                    owner_id: row.get("owner_id"),
                    movement_id: row.get("movement_id"),
                    workout_id: row.get("workout_id"),
                    performed_date: parse_date(&performed)?,
                    set_number: row.get("set_number"),
                    reps: row.get("reps"),
                    weight: row.get("weight"),
                    rpe: row.get("rpe"),
                    load: row.get("load"),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(MovementSummaryResponse {
            summaries,
            strength_sets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heavier_set_wins_then_more_reps() {
        assert!(is_better((100.0, 3), (90.0, 10)));
        assert!(is_better((100.0, 5), (100.0, 3)));
        assert!(!is_better((100.0, 3), (100.0, 5)));
        assert!(!is_better((80.0, 12), (100.0, 1)));
    }
}
