// ABOUTME: Saved workout database operations for every activity type
// ABOUTME: Saves workout trees, loads populated workouts and movement history, and logs sets
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use repforge_core::constants::rpe::clamp_rpe;
use repforge_core::constants::stats::HISTORY_DATES;
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{
    ActivityType, HistorySet, MovementHistory, MovementHistoryEntry, PopulatedWorkout,
    RecentWorkout, SaveWorkoutRequest, SectionLog, SectionMovementDetail, SectionType, SetEntry,
    Workout, WorkoutSection, WorkoutSet, WorkoutStatus,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use super::movements::{movement_id_by_name, row_to_movement, MOVEMENT_COLUMNS};
use super::sessions::{insert_hiit_workout, insert_mobility_session, insert_running_session};
use super::{
    format_date, format_timestamp, now, parse_optional_date, parse_timestamp, Database,
    SessionManager,
};

const WORKOUT_COLUMNS: &str = "id, owner_id, workout_number, name, description, status, \
     complexity, duration, activity_type, comments, scheduled_date, completed_date, \
     created_at, updated_at";

impl Database {
    /// Create workout, section, section movement, and set tables
    pub(super) async fn migrate_workouts(&self) -> Result<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                workout_number INTEGER NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'Saved',
                complexity INTEGER NOT NULL DEFAULT 0,
                duration INTEGER NOT NULL DEFAULT 0,
                activity_type TEXT NOT NULL,
                comments TEXT,
                scheduled_date TEXT,
                completed_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS workout_sections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                section_name TEXT NOT NULL,
                section_type TEXT NOT NULL DEFAULT 'single',
                section_order INTEGER NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS section_movements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                section_id INTEGER NOT NULL REFERENCES workout_sections(id) ON DELETE CASCADE,
                movement_id INTEGER NOT NULL REFERENCES movements(id),
                movement_order INTEGER NOT NULL DEFAULT 0,
                movement_difficulty INTEGER,
                movement_comment TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS section_sets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                section_movement_id INTEGER NOT NULL
                    REFERENCES section_movements(id) ON DELETE CASCADE,
                set_number INTEGER NOT NULL,
                reps INTEGER NOT NULL DEFAULT 0,
                weight REAL NOT NULL DEFAULT 0,
                UNIQUE (section_movement_id, set_number)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_workouts_owner ON workouts(owner_id, status, completed_date)",
            "CREATE INDEX IF NOT EXISTS idx_sections_workout ON workout_sections(workout_id)",
            "CREATE INDEX IF NOT EXISTS idx_section_movements_section ON section_movements(section_id)",
            "CREATE INDEX IF NOT EXISTS idx_section_movements_movement ON section_movements(movement_id)",
        ])
        .await
    }
}

/// A section movement after its completion log was applied
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedMovement {
    /// Section movement ID
    pub section_movement_id: i64,
    /// Catalog movement ID
    pub movement_id: i64,
    /// RPE recorded for the movement
    pub movement_difficulty: Option<i64>,
    /// Sets as submitted
    pub sets: Vec<SetEntry>,
}

impl LoggedMovement {
    /// Whether any submitted set is a working set
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.sets.iter().any(SetEntry::is_working_set)
    }
}

/// Saved workout database operations
pub struct WorkoutManager {
    pool: SqlitePool,
}

impl WorkoutManager {
    /// Create a new workout manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All of an owner's workouts, newest created first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_workouts(&self, owner_id: i64) -> AppResult<Vec<Workout>> {
        let rows = sqlx::query(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workouts: {e}")))?;

        rows.iter().map(row_to_workout).collect()
    }

    /// Upcoming workouts from `today` by scheduled date, or all workouts newest first
    ///
    /// A `limit` of zero or less returns every match.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn upcoming_workouts(
        &self,
        owner_id: i64,
        upcoming: bool,
        limit: i64,
        today: NaiveDate,
    ) -> AppResult<Vec<Workout>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = if limit > 0 { limit } else { -1 };
        let sql = if upcoming {
            format!(
                r"
                SELECT {WORKOUT_COLUMNS} FROM workouts
                WHERE owner_id = $1 AND scheduled_date IS NOT NULL AND scheduled_date >= $3
                ORDER BY scheduled_date ASC, id ASC
                LIMIT $2
                "
            )
        } else {
            format!(
                r"
                SELECT {WORKOUT_COLUMNS} FROM workouts
                WHERE owner_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2
                "
            )
        };

        let mut query = sqlx::query(&sql).bind(owner_id).bind(limit);
        if upcoming {
            query = query.bind(format_date(today));
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list upcoming workouts: {e}")))?;

        rows.iter().map(row_to_workout).collect()
    }

    /// A workout visible to `owner_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_workout(&self, owner_id: i64, workout_id: i64) -> AppResult<Option<Workout>> {
        let mut conn = self.pool.acquire().await?;
        fetch_owned_workout(&mut conn, owner_id, workout_id).await
    }

    /// A workout visible to `owner_id`, failing with `404` when absent
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the workout does not exist or has another owner
    pub async fn require_workout(&self, owner_id: i64, workout_id: i64) -> AppResult<Workout> {
        self.get_workout(owner_id, workout_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout").with_user_id(owner_id))
    }

    /// Attach sections and sessions to a workout
    ///
    /// # Errors
    ///
    /// Returns an error if any child query fails
    pub async fn populate(&self, workout: Workout) -> AppResult<PopulatedWorkout> {
        let sessions = SessionManager::new(self.pool.clone());
        let workout_sections = self.sections(workout.id).await?;
        let running_sessions = sessions.running_sessions(workout.id).await?;
        let hiit_sessions = sessions.hiit_sessions(workout.id).await?;
        let mobility_sessions = sessions.mobility_sessions(workout.id).await?;

        Ok(PopulatedWorkout {
            workout,
            workout_sections,
            running_sessions,
            hiit_sessions,
            mobility_sessions,
        })
    }

    async fn sections(&self, workout_id: i64) -> AppResult<Vec<WorkoutSection>> {
        let rows = sqlx::query(
            r"
            SELECT id, section_name, section_type, section_order
            FROM workout_sections WHERE workout_id = $1 ORDER BY section_order, id
            ",
        )
        .bind(workout_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load sections: {e}")))?;

        let mut sections = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let section_type: String = row.get("section_type");
            sections.push(WorkoutSection {
                id,
                section_name: row.get("section_name"),
                section_type: SectionType::parse_or_default(&section_type),
                section_order: row.get("section_order"),
                section_movement_details: self.section_movements(id).await?,
            });
        }
        Ok(sections)
    }

    async fn section_movements(&self, section_id: i64) -> AppResult<Vec<SectionMovementDetail>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT sm.id AS section_movement_id, sm.movement_order, sm.movement_difficulty,
                   sm.movement_comment, {MOVEMENT_COLUMNS}
            FROM section_movements sm
            JOIN movements m ON m.id = sm.movement_id
            WHERE sm.section_id = $1
            ORDER BY sm.movement_order, sm.id
            "
        ))
        .bind(section_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load section movements: {e}")))?;

        let mut details = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("section_movement_id");
            let workout_sets = sqlx::query(
                "SELECT id, set_number, reps, weight FROM section_sets WHERE section_movement_id = $1 ORDER BY set_number",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load sets: {e}")))?
            .iter()
            .map(|set| WorkoutSet {
                id: set.get("id"),
                set_number: set.get("set_number"),
                reps: set.get("reps"),
                weight: set.get("weight"),
            })
            .collect();

            details.push(SectionMovementDetail {
                id,
                movement_order: row.get("movement_order"),
                movement_difficulty: row.get("movement_difficulty"),
                movement_comment: row.get("movement_comment"),
                movements: row_to_movement(&row),
                workout_sets,
            });
        }
        Ok(details)
    }

    /// Logged sets for every movement in `workout`
    ///
    /// The window is the owner's most recent distinct completed dates across
    /// all of their workouts. A movement with no sets logged on those dates
    /// gets an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn movement_history(&self, workout: &PopulatedWorkout) -> AppResult<MovementHistory> {
        let mut history = MovementHistory::new();
        let movement_ids: Vec<i64> = workout
            .workout_sections
            .iter()
            .flat_map(|section| &section.section_movement_details)
            .map(|detail| detail.movements.id)
            .collect();
        if movement_ids.is_empty() {
            return Ok(history);
        }

        let owner_id = workout.workout.owner_id;
        let oldest_date = self.oldest_history_date(owner_id).await?;

        for movement_id in movement_ids {
            if history.contains_key(&movement_id) {
                continue;
            }
            let entries = match oldest_date.as_deref() {
                Some(oldest) => self.history_for_movement(owner_id, oldest, movement_id).await?,
                None => Vec::new(),
            };
            history.insert(movement_id, entries);
        }
        Ok(history)
    }

    /// Earliest of the owner's last `HISTORY_DATES` distinct completed dates
    async fn oldest_history_date(&self, owner_id: i64) -> AppResult<Option<String>> {
        let row = sqlx::query(
            r"
            SELECT MIN(completed_date) AS oldest FROM (
                SELECT DISTINCT completed_date FROM workouts
                WHERE owner_id = $1 AND status = 'Completed' AND completed_date IS NOT NULL
                ORDER BY completed_date DESC
                LIMIT $2
            )
            ",
        )
        .bind(owner_id)
        .bind(HISTORY_DATES)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load history dates: {e}")))?;
        Ok(row.get("oldest"))
    }

    async fn history_for_movement(
        &self,
        owner_id: i64,
        oldest_date: &str,
        movement_id: i64,
    ) -> AppResult<Vec<MovementHistoryEntry>> {
        // Every owner completed date at or after the oldest is one of the window dates
        let rows = sqlx::query(
            r"
            SELECT w.completed_date, sm.id AS section_movement_id, sm.movement_difficulty
            FROM section_movements sm
            JOIN workout_sections s ON s.id = sm.section_id
            JOIN workouts w ON w.id = s.workout_id
            WHERE w.owner_id = $1
              AND sm.movement_id = $2
              AND w.status = 'Completed'
              AND w.completed_date >= $3
            ORDER BY w.completed_date DESC, sm.id ASC
            ",
        )
        .bind(owner_id)
        .bind(movement_id)
        .bind(oldest_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load movement history: {e}")))?;

        // Grouped by date, newest first
        let mut by_date: BTreeMap<NaiveDate, MovementHistoryEntry> = BTreeMap::new();
        for row in rows {
            let Some(workout_date) = parse_optional_date(row.get("completed_date"))? else {
                continue;
            };
            let section_movement_id: i64 = row.get("section_movement_id");
            let difficulty: Option<i64> = row.get("movement_difficulty");

            let sets: Vec<HistorySet> = sqlx::query(
                "SELECT set_number, reps, weight FROM section_sets WHERE section_movement_id = $1 ORDER BY set_number",
            )
            .bind(section_movement_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load history sets: {e}")))?
            .iter()
            .map(|set| HistorySet {
                set_number: set.get("set_number"),
                reps: set.get("reps"),
                weight: set.get("weight"),
            })
            .collect();
            if sets.is_empty() {
                continue;
            }

            let entry = by_date.entry(workout_date).or_insert_with(|| MovementHistoryEntry {
                workout_date,
                movement_difficulty: None,
                sets: Vec::new(),
            });
            entry.movement_difficulty = entry.movement_difficulty.or(difficulty);
            entry.sets.extend(sets);
        }

        Ok(by_date.into_values().rev().collect())
    }

    /// Set the status, stamping the completed date on first completion
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the owner has no such workout
    pub async fn update_status(
        &self,
        owner_id: i64,
        workout_id: i64,
        status: WorkoutStatus,
        today: NaiveDate,
    ) -> AppResult<()> {
        let completed_date = (status == WorkoutStatus::Completed).then(|| format_date(today));
        let result = sqlx::query(
            r"
            UPDATE workouts
            SET status = $1,
                completed_date = COALESCE(completed_date, $2),
                updated_at = $3
            WHERE id = $4 AND owner_id = $5
            ",
        )
        .bind(status.as_str())
        .bind(completed_date)
        .bind(format_timestamp(now()))
        .bind(workout_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update workout status: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Workout"));
        }
        Ok(())
    }

    /// Delete a workout and its children, returning whether one was removed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_workout(&self, owner_id: i64, workout_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1 AND owner_id = $2")
            .bind(workout_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete workout: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Profile queries
    // ========================================================================

    /// Number of completed workouts, optionally on or after `since`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_completed(&self, owner_id: i64, since: Option<NaiveDate>) -> AppResult<i64> {
        sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM workouts
            WHERE owner_id = $1 AND status = 'Completed'
              AND ($2 IS NULL OR (completed_date IS NOT NULL AND completed_date >= $2))
            ",
        )
        .bind(owner_id)
        .bind(since.map(format_date))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count workouts: {e}")))
    }

    /// The latest completed workouts
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn recent_completed(&self, owner_id: i64, limit: i64) -> AppResult<Vec<RecentWorkout>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, completed_date, duration FROM workouts
            WHERE owner_id = $1 AND status = 'Completed'
            ORDER BY completed_date DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load recent workouts: {e}")))?;

        rows.iter()
            .map(|row| {
                Ok(RecentWorkout {
                    id: row.get("id"),
                    name: row.get("name"),
                    completed_date: parse_optional_date(row.get("completed_date"))?,
                    duration: row.get("duration"),
                })
            })
            .collect()
    }
}

// ============================================================================
// Transactional writes
// ============================================================================

/// Insert a workout and every child record for its activity type
///
/// # Errors
///
/// Returns `InvalidInput` when a gym movement cannot be resolved, or a database error
pub async fn insert_workout(
    conn: &mut SqliteConnection,
    owner_id: i64,
    request: &SaveWorkoutRequest,
    activity: ActivityType,
    status: WorkoutStatus,
) -> AppResult<Workout> {
    let workout_number: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(workout_number), 0) + 1 FROM workouts WHERE owner_id = $1",
    )
    .bind(owner_id)
    .fetch_one(&mut *conn)
    .await?;

    let complexity = if activity == ActivityType::Running {
        0
    } else {
        request.complexity
    };
    let timestamp = now();

    let workout_id = sqlx::query(
        r"
        INSERT INTO workouts
            (owner_id, workout_number, name, description, status, complexity, duration,
             activity_type, scheduled_date, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        ",
    )
    .bind(owner_id)
    .bind(workout_number)
    .bind(request.name.trim())
    .bind(&request.description)
    .bind(status.as_str())
    .bind(complexity)
    .bind(request.duration)
    .bind(activity.as_str())
    .bind(request.scheduled_date.map(format_date))
    .bind(format_timestamp(timestamp))
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    match activity {
        ActivityType::Gym | ActivityType::Hyrox => {
            insert_sections(conn, workout_id, request).await?;
        }
        ActivityType::Running => {
            if let Some(session) = &request.running_sessions {
                insert_running_session(conn, workout_id, session).await?;
            }
        }
        ActivityType::Hiit => {
            insert_hiit_workout(
                conn,
                workout_id,
                request.workout_type.as_deref().unwrap_or_default(),
                request.structure.as_deref().unwrap_or_default(),
                request.duration,
                &request.sections,
            )
            .await?;
        }
        ActivityType::Mobility => {
            if let Some(session) = &request.mobility_sessions {
                insert_mobility_session(conn, workout_id, session).await?;
            }
        }
    }

    debug!(owner_id, workout_id, activity = %activity, "Inserted workout");
    Ok(Workout {
        id: workout_id,
        owner_id,
        workout_number,
        name: request.name.trim().to_owned(),
        description: request.description.clone(),
        status,
        complexity,
        duration: request.duration,
        activity_type: activity,
        comments: None,
        scheduled_date: request.scheduled_date,
        completed_date: None,
        created_at: timestamp,
        updated_at: timestamp,
    })
}

async fn insert_sections(
    conn: &mut SqliteConnection,
    workout_id: i64,
    request: &SaveWorkoutRequest,
) -> AppResult<()> {
    for (index, section) in request.sections.iter().enumerate() {
        let position = index as i64 + 1;
        let section_name = section
            .section_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("Section {position}"), str::to_owned);

        let section_id = sqlx::query(
            r"
            INSERT INTO workout_sections (workout_id, section_name, section_type, section_order)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(workout_id)
        .bind(&section_name)
        .bind(section.section_type.unwrap_or_default().as_str())
        .bind(section.section_order.unwrap_or(position))
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        for movement in &section.movements {
            let name = movement
                .name()
                .ok_or_else(|| AppError::invalid_input("Movement name is required"))?;
            let movement_id = movement_id_by_name(conn, name)
                .await?
                .ok_or_else(|| AppError::invalid_input(format!("Movement not found: {name}")))?;

            sqlx::query(
                "INSERT INTO section_movements (section_id, movement_id, movement_order) VALUES ($1, $2, $3)",
            )
            .bind(section_id)
            .bind(movement_id)
            .bind(movement.movement_order)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}

/// Load a workout owned by `owner_id` on the given connection
///
/// # Errors
///
/// Returns an error if the database query fails
pub async fn fetch_owned_workout(
    conn: &mut SqliteConnection,
    owner_id: i64,
    workout_id: i64,
) -> AppResult<Option<Workout>> {
    let row = sqlx::query(&format!(
        "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = $1 AND owner_id = $2"
    ))
    .bind(workout_id)
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to get workout: {e}")))?;

    row.as_ref().map(row_to_workout).transpose()
}

/// Mark a workout completed on `date`
///
/// # Errors
///
/// Returns an error if the update fails
pub async fn mark_completed(
    conn: &mut SqliteConnection,
    workout_id: i64,
    date: NaiveDate,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE workouts SET status = 'Completed', completed_date = $1, updated_at = $2 WHERE id = $3",
    )
    .bind(format_date(date))
    .bind(format_timestamp(now()))
    .bind(workout_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to complete workout: {e}")))?;
    Ok(())
}

/// Move a workout to a new planned date
///
/// # Errors
///
/// Returns an error if the update fails
pub async fn set_scheduled_date(
    conn: &mut SqliteConnection,
    workout_id: i64,
    date: NaiveDate,
) -> AppResult<()> {
    sqlx::query("UPDATE workouts SET scheduled_date = $1, updated_at = $2 WHERE id = $3")
        .bind(format_date(date))
        .bind(format_timestamp(now()))
        .bind(workout_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to reschedule workout: {e}")))?;
    Ok(())
}

/// The workout a section belongs to, when the owner holds it
///
/// # Errors
///
/// Returns an error if the database query fails
pub async fn section_workout_id(
    conn: &mut SqliteConnection,
    owner_id: i64,
    section_id: i64,
) -> AppResult<Option<i64>> {
    sqlx::query_scalar(
        r"
        SELECT w.id FROM workout_sections s
        JOIN workouts w ON w.id = s.workout_id
        WHERE s.id = $1 AND w.owner_id = $2
        ",
    )
    .bind(section_id)
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to resolve section: {e}")))
}

/// Apply section logs to a workout's section movements
///
/// Sections and movements that do not belong to the workout are skipped. Sets
/// are upserted by set number with empty reps or weight stored as zero.
///
/// # Errors
///
/// Returns an error if any write fails
pub async fn apply_section_logs(
    conn: &mut SqliteConnection,
    workout_id: i64,
    sections: &[SectionLog],
) -> AppResult<Vec<LoggedMovement>> {
    let mut logged = Vec::new();

    for section in sections {
        for log in &section.movements {
            let movement_id: Option<i64> = sqlx::query_scalar(
                r"
                SELECT sm.movement_id FROM section_movements sm
                JOIN workout_sections s ON s.id = sm.section_id
                WHERE sm.id = $1 AND s.id = $2 AND s.workout_id = $3
                ",
            )
            .bind(log.movement_id)
            .bind(section.section_id)
            .bind(workout_id)
            .fetch_optional(&mut *conn)
            .await?;

            let Some(movement_id) = movement_id else {
                debug!(
                    workout_id,
                    section_id = section.section_id,
                    section_movement_id = log.movement_id,
                    "Skipping movement log outside the workout"
                );
                continue;
            };

            let difficulty = log.movement_difficulty.map(clamp_rpe);
            sqlx::query(
                r"
                UPDATE section_movements
                SET movement_difficulty = COALESCE($1, movement_difficulty),
                    movement_comment = COALESCE($2, movement_comment)
                WHERE id = $3
                ",
            )
            .bind(difficulty)
            .bind(log.movement_comments.as_deref())
            .bind(log.movement_id)
            .execute(&mut *conn)
            .await?;

            for set in &log.sets {
                sqlx::query(
                    r"
                    INSERT INTO section_sets (section_movement_id, set_number, reps, weight)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT(section_movement_id, set_number) DO UPDATE SET
                        reps = excluded.reps,
                        weight = excluded.weight
                    ",
                )
                .bind(log.movement_id)
                .bind(set.set_number)
                .bind(set.reps.unwrap_or(0))
                .bind(set.weight.unwrap_or(0.0))
                .execute(&mut *conn)
                .await?;
            }

            logged.push(LoggedMovement {
                section_movement_id: log.movement_id,
                movement_id,
                movement_difficulty: difficulty,
                sets: log.sets.clone(),
            });
        }
    }

    Ok(logged)
}

fn row_to_workout(row: &SqliteRow) -> AppResult<Workout> {
    let status: String = row.get("status");
    let activity: String = row.get("activity_type");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Workout {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        workout_number: row.get("workout_number"),
        name: row.get("name"),
        description: row.get("description"),
        status: WorkoutStatus::parse(&status)
            .ok_or_else(|| AppError::database(format!("Invalid stored status '{status}'")))?,
        complexity: row.get("complexity"),
        duration: row.get("duration"),
        activity_type: ActivityType::parse(&activity).ok_or_else(|| {
            AppError::database(format!("Invalid stored activity type '{activity}'"))
        })?,
        comments: row.get("comments"),
        scheduled_date: parse_optional_date(row.get("scheduled_date"))?,
        completed_date: parse_optional_date(row.get("completed_date"))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_movement_needs_a_working_set() {
        let mut logged = LoggedMovement {
            section_movement_id: 1,
            movement_id: 7,
            movement_difficulty: Some(6),
            sets: vec![SetEntry {
                set_number: 1,
                reps: Some(8),
                weight: None,
            }],
        };
        assert!(!logged.is_valid());

        logged.sets.push(SetEntry {
            set_number: 2,
            reps: Some(8),
            weight: Some(40.0),
        });
        assert!(logged.is_valid());
    }
}
