// ABOUTME: Running, HIIT, and mobility session storage attached to saved workouts
// ABOUTME: Inserts session trees inside the save transaction and applies completion logs
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use anyhow::Result;
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{
    ActivityType, IntervalLog, MobilitySessionPayload, RunningSessionPayload, SavedHiitBlock,
    SavedHiitMovement, SavedHiitWorkout, SavedMobilityDetail, SavedMobilitySession,
    SavedRunningInterval, SavedRunningSession, SavedSplitTime, SectionPayload,
};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use super::movements::movement_id_by_name;
use super::Database;

impl Database {
    /// Create saved session tables for running, HIIT, and mobility workouts
    pub(super) async fn migrate_sessions(&self) -> Result<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS saved_running_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                running_session_id INTEGER,
                warmup_distance REAL NOT NULL DEFAULT 0,
                cooldown_distance REAL NOT NULL DEFAULT 0,
                total_distance REAL NOT NULL DEFAULT 0,
                workout_notes TEXT,
                rpe INTEGER,
                comments TEXT,
                suggested_warmup_pace INTEGER,
                actual_warmup_pace INTEGER,
                suggested_cooldown_pace INTEGER,
                actual_cooldown_pace INTEGER
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS saved_running_intervals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                running_session_id INTEGER NOT NULL
                    REFERENCES saved_running_sessions(id) ON DELETE CASCADE,
                repeat_variation INTEGER NOT NULL DEFAULT 0,
                repeats INTEGER NOT NULL DEFAULT 0,
                repeat_distance REAL NOT NULL DEFAULT 0,
                target_pace INTEGER,
                average_actual_pace INTEGER,
                comments TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS saved_split_times (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                interval_id INTEGER NOT NULL
                    REFERENCES saved_running_intervals(id) ON DELETE CASCADE,
                repeat_number INTEGER NOT NULL,
                target_time INTEGER,
                actual_time INTEGER,
                comments TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS saved_hiit_workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                workout_type TEXT NOT NULL DEFAULT '',
                structure TEXT NOT NULL DEFAULT '',
                duration INTEGER NOT NULL DEFAULT 0,
                rpe INTEGER,
                comments TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS saved_hiit_blocks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                hiit_workout_id INTEGER NOT NULL
                    REFERENCES saved_hiit_workouts(id) ON DELETE CASCADE,
                block_name TEXT NOT NULL DEFAULT '',
                rep_scheme TEXT,
                block_order INTEGER NOT NULL DEFAULT 0
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS saved_hiit_movements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                block_id INTEGER NOT NULL REFERENCES saved_hiit_blocks(id) ON DELETE CASCADE,
                movement_id INTEGER REFERENCES movements(id) ON DELETE SET NULL,
                exercise_name TEXT NOT NULL DEFAULT '',
                movement_order INTEGER NOT NULL DEFAULT 0,
                rest_period INTEGER NOT NULL DEFAULT 0
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS saved_mobility_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                number_of_movements INTEGER NOT NULL DEFAULT 0,
                session_video TEXT,
                rpe INTEGER,
                comments TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS saved_mobility_details (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id INTEGER NOT NULL
                    REFERENCES saved_mobility_sessions(id) ON DELETE CASCADE,
                detail_order INTEGER NOT NULL DEFAULT 0,
                duration REAL,
                movement_id INTEGER REFERENCES movements(id) ON DELETE SET NULL,
                exercise_name TEXT
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_running_sessions_workout ON saved_running_sessions(workout_id)",
            "CREATE INDEX IF NOT EXISTS idx_hiit_workouts_workout ON saved_hiit_workouts(workout_id)",
            "CREATE INDEX IF NOT EXISTS idx_mobility_sessions_workout ON saved_mobility_sessions(workout_id)",
        ])
        .await
    }
}

/// Read access to the sessions attached to workouts
pub struct SessionManager {
    pool: SqlitePool,
}

impl SessionManager {
    /// Create a new session manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Running sessions of a workout with intervals and splits
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn running_sessions(&self, workout_id: i64) -> AppResult<Vec<SavedRunningSession>> {
        let rows = sqlx::query(
            r"
            SELECT id, running_session_id, warmup_distance, cooldown_distance, total_distance,
                   workout_notes, rpe, comments, suggested_warmup_pace, actual_warmup_pace,
                   suggested_cooldown_pace, actual_cooldown_pace
            FROM saved_running_sessions WHERE workout_id = $1 ORDER BY id
            ",
        )
        .bind(workout_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load running sessions: {e}")))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            sessions.push(SavedRunningSession {
                id,
                running_session_id: row.get("running_session_id"),
                warmup_distance: row.get("warmup_distance"),
                cooldown_distance: row.get("cooldown_distance"),
                total_distance: row.get("total_distance"),
                workout_notes: row.get("workout_notes"),
                rpe: row.get("rpe"),
                comments: row.get("comments"),
                suggested_warmup_pace: row.get("suggested_warmup_pace"),
                actual_warmup_pace: row.get("actual_warmup_pace"),
                suggested_cooldown_pace: row.get("suggested_cooldown_pace"),
                actual_cooldown_pace: row.get("actual_cooldown_pace"),
                saved_intervals: self.running_intervals(id).await?,
            });
        }
        Ok(sessions)
    }

    async fn running_intervals(&self, session_id: i64) -> AppResult<Vec<SavedRunningInterval>> {
        let rows = sqlx::query(
            r"
            SELECT id, repeat_variation, repeats, repeat_distance, target_pace,
                   average_actual_pace, comments
            FROM saved_running_intervals WHERE running_session_id = $1 ORDER BY id
            ",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load running intervals: {e}")))?;

        let mut intervals = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let split_times = sqlx::query(
                r"
                SELECT id, repeat_number, target_time, actual_time, comments
                FROM saved_split_times WHERE interval_id = $1 ORDER BY repeat_number
                ",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load split times: {e}")))?
            .iter()
            .map(|split| SavedSplitTime {
                id: split.get("id"),
                repeat_number: split.get("repeat_number"),
                target_time: split.get("target_time"),
                actual_time: split.get("actual_time"),
                comments: split.get("comments"),
            })
            .collect();

            intervals.push(SavedRunningInterval {
                id,
                repeat_variation: row.get("repeat_variation"),
                repeats: row.get("repeats"),
                repeat_distance: row.get("repeat_distance"),
                target_pace: row.get("target_pace"),
                average_actual_pace: row.get("average_actual_pace"),
                comments: row.get("comments"),
                split_times,
            });
        }
        Ok(intervals)
    }

    /// HIIT sessions of a workout with blocks and movement slots
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn hiit_sessions(&self, workout_id: i64) -> AppResult<Vec<SavedHiitWorkout>> {
        let rows = sqlx::query(
            r"
            SELECT id, workout_type, structure, duration, rpe, comments
            FROM saved_hiit_workouts WHERE workout_id = $1 ORDER BY id
            ",
        )
        .bind(workout_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load HIIT sessions: {e}")))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            sessions.push(SavedHiitWorkout {
                id,
                workout_type: row.get("workout_type"),
                structure: row.get("structure"),
                duration: row.get("duration"),
                rpe: row.get("rpe"),
                comments: row.get("comments"),
                hiit_details: self.hiit_blocks(id).await?,
            });
        }
        Ok(sessions)
    }

    async fn hiit_blocks(&self, hiit_workout_id: i64) -> AppResult<Vec<SavedHiitBlock>> {
        let rows = sqlx::query(
            r"
            SELECT id, block_name, rep_scheme, block_order
            FROM saved_hiit_blocks WHERE hiit_workout_id = $1 ORDER BY block_order, id
            ",
        )
        .bind(hiit_workout_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load HIIT blocks: {e}")))?;

        let mut blocks = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let hiit_movements = sqlx::query(
                r"
                SELECT id, movement_id, exercise_name, movement_order, rest_period
                FROM saved_hiit_movements WHERE block_id = $1 ORDER BY movement_order, id
                ",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load HIIT movements: {e}")))?
            .iter()
            .map(|slot| SavedHiitMovement {
                id: slot.get("id"),
                movement_id: slot.get("movement_id"),
                exercise_name: slot.get("exercise_name"),
                movement_order: slot.get("movement_order"),
                rest_period: slot.get("rest_period"),
            })
            .collect();

            blocks.push(SavedHiitBlock {
                id,
                block_name: row.get("block_name"),
                rep_scheme: row.get("rep_scheme"),
                block_order: row.get("block_order"),
                hiit_movements,
            });
        }
        Ok(blocks)
    }

    /// Mobility sessions of a workout with their steps
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn mobility_sessions(&self, workout_id: i64) -> AppResult<Vec<SavedMobilitySession>> {
        let rows = sqlx::query(
            r"
            SELECT id, number_of_movements, session_video, rpe, comments
            FROM saved_mobility_sessions WHERE workout_id = $1 ORDER BY id
            ",
        )
        .bind(workout_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load mobility sessions: {e}")))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let mobility_details = sqlx::query(
                r"
                SELECT d.id, d.detail_order, d.duration, d.movement_id,
                       COALESCE(m.exercise, d.exercise_name) AS exercise
                FROM saved_mobility_details d
                LEFT JOIN movements m ON m.id = d.movement_id
                WHERE d.session_id = $1
                ORDER BY d.detail_order, d.id
                ",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load mobility details: {e}")))?
            .iter()
            .map(|detail| SavedMobilityDetail {
                id: detail.get("id"),
                detail_order: detail.get("detail_order"),
                duration: detail.get("duration"),
                movement_id: detail.get("movement_id"),
                exercise: detail.get("exercise"),
            })
            .collect();

            sessions.push(SavedMobilitySession {
                id,
                number_of_movements: row.get("number_of_movements"),
                session_video: row.get("session_video"),
                rpe: row.get("rpe"),
                comments: row.get("comments"),
                mobility_details,
            });
        }
        Ok(sessions)
    }
}

// ============================================================================
// Writes inside the save transaction
// ============================================================================

/// Insert a running session with one split row per interval repeat
pub(super) async fn insert_running_session(
    conn: &mut SqliteConnection,
    workout_id: i64,
    session: &RunningSessionPayload,
) -> AppResult<i64> {
    let session_id = sqlx::query(
        r"
        INSERT INTO saved_running_sessions
            (workout_id, running_session_id, warmup_distance, cooldown_distance, total_distance,
             workout_notes, suggested_warmup_pace, suggested_cooldown_pace)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(workout_id)
    .bind(session.running_session_id)
    .bind(session.warmup_distance)
    .bind(session.cooldown_distance)
    .bind(session.total_distance)
    .bind(session.workout_notes.as_deref())
    .bind(session.suggested_warmup_pace)
    .bind(session.suggested_cooldown_pace)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    for interval in &session.saved_intervals {
        let interval_id = sqlx::query(
            r"
            INSERT INTO saved_running_intervals
                (running_session_id, repeat_variation, repeats, repeat_distance, target_pace)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(session_id)
        .bind(interval.repeat_variation)
        .bind(interval.repeats)
        .bind(interval.repeat_distance)
        .bind(interval.target_pace)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        let target_time = interval.target_time();
        for repeat_number in 1..=interval.repeats.max(0) {
            sqlx::query(
                "INSERT INTO saved_split_times (interval_id, repeat_number, target_time) VALUES ($1, $2, $3)",
            )
            .bind(interval_id)
            .bind(repeat_number)
            .bind(target_time)
            .execute(&mut *conn)
            .await?;
        }
    }

    debug!(workout_id, session_id, "Saved running session");
    Ok(session_id)
}

/// Insert a HIIT session; slots link to the catalog when their name resolves
pub(super) async fn insert_hiit_workout(
    conn: &mut SqliteConnection,
    workout_id: i64,
    workout_type: &str,
    structure: &str,
    duration: i64,
    blocks: &[SectionPayload],
) -> AppResult<i64> {
    let hiit_id = sqlx::query(
        r"
        INSERT INTO saved_hiit_workouts (workout_id, workout_type, structure, duration)
        VALUES ($1, $2, $3, $4)
        ",
    )
    .bind(workout_id)
    .bind(workout_type)
    .bind(structure)
    .bind(duration)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    for (index, block) in blocks.iter().enumerate() {
        let block_order = index as i64 + 1;
        let block_id = sqlx::query(
            "INSERT INTO saved_hiit_blocks (hiit_workout_id, block_name, rep_scheme, block_order) VALUES ($1, $2, $3, $4)",
        )
        .bind(hiit_id)
        .bind(block.block_name.as_deref().unwrap_or_default())
        .bind(block.rep_scheme.as_deref())
        .bind(block_order)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        for slot in &block.movements {
            let name = slot.name().unwrap_or_default();
            let movement_id = if slot.rest_period || name.is_empty() {
                None
            } else {
                movement_id_by_name(conn, name).await?
            };
            sqlx::query(
                r"
                INSERT INTO saved_hiit_movements
                    (block_id, movement_id, exercise_name, movement_order, rest_period)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(block_id)
            .bind(movement_id)
            .bind(name)
            .bind(slot.movement_order)
            .bind(slot.rest_period)
            .execute(&mut *conn)
            .await?;
        }
    }

    debug!(workout_id, hiit_id, "Saved HIIT session");
    Ok(hiit_id)
}

/// Insert a mobility session, resolving each step by ID or exercise name
pub(super) async fn insert_mobility_session(
    conn: &mut SqliteConnection,
    workout_id: i64,
    session: &MobilitySessionPayload,
) -> AppResult<i64> {
    let session_id = sqlx::query(
        "INSERT INTO saved_mobility_sessions (workout_id, number_of_movements, session_video) VALUES ($1, $2, $3)",
    )
    .bind(workout_id)
    .bind(session.number_of_movements)
    .bind(session.session_video.as_deref())
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    for detail in &session.mobility_details {
        let by_id = match detail.movement_id {
            Some(id) => sqlx::query_scalar::<_, i64>("SELECT id FROM movements WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?,
            None => None,
        };
        let movement_id = match (by_id, detail.movement_name.as_deref()) {
            (Some(id), _) => Some(id),
            (None, Some(name)) => movement_id_by_name(conn, name).await?,
            (None, None) => None,
        };

        sqlx::query(
            r"
            INSERT INTO saved_mobility_details
                (session_id, detail_order, duration, movement_id, exercise_name)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(session_id)
        .bind(detail.order)
        .bind(detail.duration)
        .bind(movement_id)
        .bind(detail.movement_name.as_deref().map(str::trim))
        .execute(&mut *conn)
        .await?;
    }

    debug!(workout_id, session_id, "Saved mobility session");
    Ok(session_id)
}

// ============================================================================
// Completion writes
// ============================================================================

/// Record session RPE and comments for the workout's session of `activity`
///
/// Fields left as `None` keep their stored value.
///
/// # Errors
///
/// Returns an error if the update fails
pub async fn record_session_feedback(
    conn: &mut SqliteConnection,
    activity: ActivityType,
    workout_id: i64,
    rpe: Option<i64>,
    comments: Option<&str>,
) -> AppResult<()> {
    let table = match activity {
        ActivityType::Running => "saved_running_sessions",
        ActivityType::Hiit => "saved_hiit_workouts",
        ActivityType::Mobility => "saved_mobility_sessions",
        ActivityType::Gym | ActivityType::Hyrox => return Ok(()),
    };

    sqlx::query(&format!(
        "UPDATE {table} SET rpe = COALESCE($1, rpe), comments = COALESCE($2, comments) WHERE workout_id = $3"
    ))
    .bind(rpe)
    .bind(comments)
    .bind(workout_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to record session feedback: {e}")))?;
    Ok(())
}

/// Apply submitted split times and report whether the run was fully logged
///
/// Fully logged means at least one split was submitted and every submitted
/// interval and split belongs to the workout and carries an actual time.
///
/// # Errors
///
/// Returns an error if a query or write fails
pub async fn apply_split_logs(
    conn: &mut SqliteConnection,
    workout_id: i64,
    intervals: &[IntervalLog],
) -> AppResult<bool> {
    let mut submitted = 0_usize;
    let mut complete = true;

    for interval in intervals {
        let owned: Option<i64> = sqlx::query_scalar(
            r"
            SELECT i.id FROM saved_running_intervals i
            JOIN saved_running_sessions r ON r.id = i.running_session_id
            WHERE i.id = $1 AND r.workout_id = $2
            ",
        )
        .bind(interval.id)
        .bind(workout_id)
        .fetch_optional(&mut *conn)
        .await?;

        if owned.is_none() {
            complete = false;
            continue;
        }

        for split in &interval.split_times {
            submitted += 1;
            let stored = sqlx::query(
                r"
                UPDATE saved_split_times
                SET actual_time = COALESCE($1, actual_time), comments = COALESCE($2, comments)
                WHERE id = $3 AND interval_id = $4
                RETURNING actual_time
                ",
            )
            .bind(split.actual_time)
            .bind(split.comments.as_deref())
            .bind(split.id)
            .bind(interval.id)
            .fetch_optional(&mut *conn)
            .await?;

            // A split counts as logged once its stored time is positive
            let logged = stored
                .and_then(|row| row.get::<Option<i64>, _>("actual_time"))
                .is_some_and(|time| time > 0);
            if !logged {
                complete = false;
            }
        }

        sqlx::query(
            r"
            UPDATE saved_running_intervals
            SET average_actual_pace = (
                SELECT CAST(ROUND(AVG(s.actual_time) / saved_running_intervals.repeat_distance) AS INTEGER)
                FROM saved_split_times s
                WHERE s.interval_id = saved_running_intervals.id AND s.actual_time IS NOT NULL
            )
            WHERE id = $1 AND repeat_distance > 0
            ",
        )
        .bind(interval.id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(submitted > 0 && complete)
}
