// ABOUTME: Read-only workout template storage for the catalog endpoints
// ABOUTME: Running sessions, mobility flows, suggested strength sessions, and conditioning pieces
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use anyhow::Result;
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{
    ConditioningDetailTemplate, ConditioningTemplate, MobilityDetailTemplate,
    MobilityWorkoutTemplate, RunningIntervalTemplate, RunningSessionTemplate,
    StrengthDetailTemplate, SuggestedStrengthTemplate,
};
use sqlx::{Row, SqlitePool};

use super::Database;

/// Template tables, children first so a clear never trips a foreign key
const TEMPLATE_TABLES: [&str; 8] = [
    "running_intervals",
    "running_sessions",
    "mobility_details",
    "mobility_workouts",
    "suggested_strength_details",
    "suggested_strength",
    "conditioning_details",
    "conditioning",
];

impl Database {
    /// Create template tables
    pub(super) async fn migrate_catalog(&self) -> Result<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS running_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_type TEXT NOT NULL,
                session_name TEXT,
                duration TEXT NOT NULL DEFAULT '',
                warmup_distance REAL,
                cool_down_distance REAL,
                total_distance REAL,
                notes TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS running_intervals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                running_session_id INTEGER NOT NULL REFERENCES running_sessions(id) ON DELETE CASCADE,
                repeat_variation INTEGER NOT NULL DEFAULT 1,
                repeats INTEGER NOT NULL DEFAULT 1,
                repeat_distance REAL,
                target_pace TEXT NOT NULL DEFAULT '',
                rest_time INTEGER
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS mobility_workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_name TEXT NOT NULL,
                body_area TEXT,
                duration REAL,
                summary TEXT,
                number_of_movements INTEGER
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS mobility_details (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mobility_workout_id INTEGER NOT NULL REFERENCES mobility_workouts(id) ON DELETE CASCADE,
                exercise TEXT,
                detail_order INTEGER NOT NULL DEFAULT 0,
                duration TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS suggested_strength (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_name TEXT NOT NULL,
                body_area TEXT,
                duration REAL,
                description TEXT,
                number_of_sections INTEGER
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS suggested_strength_details (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                suggested_strength_id INTEGER NOT NULL REFERENCES suggested_strength(id) ON DELETE CASCADE,
                section_name TEXT,
                section_number INTEGER NOT NULL DEFAULT 0,
                section_movement INTEGER NOT NULL DEFAULT 0,
                exercise TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS conditioning (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                duration INTEGER,
                movements INTEGER,
                rest INTEGER,
                notes TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS conditioning_details (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conditioning_id INTEGER NOT NULL REFERENCES conditioning(id) ON DELETE CASCADE,
                movement_order INTEGER,
                exercise TEXT,
                detail TEXT
            )
            ",
        ])
        .await
    }
}

/// Workout template database operations
pub struct CatalogManager {
    pool: SqlitePool,
}

impl CatalogManager {
    /// Create a new catalog manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Running templates with their intervals
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_running_sessions(&self) -> AppResult<Vec<RunningSessionTemplate>> {
        let rows = sqlx::query(
            r"
            SELECT id, session_type, session_name, duration, warmup_distance,
                   cool_down_distance, total_distance, notes
            FROM running_sessions ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list running sessions: {e}")))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let intervals = sqlx::query(
                r"
                SELECT id, repeat_variation, repeats, repeat_distance, target_pace, rest_time
                FROM running_intervals WHERE running_session_id = $1
                ORDER BY repeat_variation, id
                ",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list running intervals: {e}")))?
            .iter()
            .map(|interval| RunningIntervalTemplate {
                id: interval.get("id"),
                repeat_variation: interval.get("repeat_variation"),
                repeats: interval.get("repeats"),
                repeat_distance: interval.get("repeat_distance"),
                target_pace: interval.get("target_pace"),
                rest_time: interval.get("rest_time"),
            })
            .collect();

            sessions.push(RunningSessionTemplate {
                id,
                session_type: row.get("session_type"),
                session_name: row.get("session_name"),
                duration: row.get("duration"),
                warmup_distance: row.get("warmup_distance"),
                cool_down_distance: row.get("cool_down_distance"),
                total_distance: row.get("total_distance"),
                notes: row.get("notes"),
                intervals,
            });
        }
        Ok(sessions)
    }

    /// Mobility templates with their steps
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_mobility_workouts(&self) -> AppResult<Vec<MobilityWorkoutTemplate>> {
        let rows = sqlx::query(
            r"
            SELECT id, workout_name, body_area, duration, summary, number_of_movements
            FROM mobility_workouts ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list mobility workouts: {e}")))?;

        let mut workouts = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let details = sqlx::query(
                r"
                SELECT id, exercise, detail_order, duration FROM mobility_details
                WHERE mobility_workout_id = $1 ORDER BY detail_order, id
                ",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list mobility details: {e}")))?
            .iter()
            .map(|detail| MobilityDetailTemplate {
                id: detail.get("id"),
                exercise: detail.get("exercise"),
                order: detail.get("detail_order"),
                duration: detail.get("duration"),
            })
            .collect();

            workouts.push(MobilityWorkoutTemplate {
                id,
                workout_name: row.get("workout_name"),
                body_area: row.get("body_area"),
                duration: row.get("duration"),
                summary: row.get("summary"),
                number_of_movements: row.get("number_of_movements"),
                details,
            });
        }
        Ok(workouts)
    }

    /// Suggested strength sessions with their movement slots
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_suggested_strength(&self) -> AppResult<Vec<SuggestedStrengthTemplate>> {
        let rows = sqlx::query(
            r"
            SELECT id, workout_name, body_area, duration, description, number_of_sections
            FROM suggested_strength ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list strength templates: {e}")))?;

        let mut templates = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let details = sqlx::query(
                r"
                SELECT id, section_name, section_number, section_movement, exercise
                FROM suggested_strength_details WHERE suggested_strength_id = $1
                ORDER BY section_number, section_movement, id
                ",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list strength details: {e}")))?
            .iter()
            .map(|detail| StrengthDetailTemplate {
                id: detail.get("id"),
                section_name: detail.get("section_name"),
                section_number: detail.get("section_number"),
                section_movement: detail.get("section_movement"),
                exercise: detail.get("exercise"),
            })
            .collect();

            templates.push(SuggestedStrengthTemplate {
                id,
                workout_name: row.get("workout_name"),
                body_area: row.get("body_area"),
                duration: row.get("duration"),
                description: row.get("description"),
                number_of_sections: row.get("number_of_sections"),
                details,
            });
        }
        Ok(templates)
    }

    /// Conditioning pieces with their movements
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_conditioning(&self) -> AppResult<Vec<ConditioningTemplate>> {
        let rows = sqlx::query(
            "SELECT id, name, duration, movements, rest, notes FROM conditioning ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list conditioning: {e}")))?;

        let mut pieces = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let details = sqlx::query(
                r"
                SELECT id, movement_order, exercise, detail FROM conditioning_details
                WHERE conditioning_id = $1 ORDER BY movement_order, id
                ",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list conditioning details: {e}")))?
            .iter()
            .map(|detail| ConditioningDetailTemplate {
                id: detail.get("id"),
                movement_order: detail.get("movement_order"),
                exercise: detail.get("exercise"),
                detail: detail.get("detail"),
            })
            .collect();

            pieces.push(ConditioningTemplate {
                id,
                name: row.get("name"),
                duration: row.get("duration"),
                movements: row.get("movements"),
                rest: row.get("rest"),
                notes: row.get("notes"),
                details,
            });
        }
        Ok(pieces)
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    /// Total number of top-level templates across all kinds
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn template_count(&self) -> AppResult<i64> {
        sqlx::query_scalar(
            r"
            SELECT (SELECT COUNT(*) FROM running_sessions)
                 + (SELECT COUNT(*) FROM mobility_workouts)
                 + (SELECT COUNT(*) FROM suggested_strength)
                 + (SELECT COUNT(*) FROM conditioning)
            ",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count templates: {e}")))
    }

    /// Delete every template
    ///
    /// # Errors
    ///
    /// Returns an error if a delete fails
    pub async fn clear_templates(&self) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        for table in TEMPLATE_TABLES {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to clear {table}: {e}")))?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Insert a running template; template and interval IDs are assigned
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails
    pub async fn insert_running_session(&self, template: &RunningSessionTemplate) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            r"
            INSERT INTO running_sessions
                (session_type, session_name, duration, warmup_distance, cool_down_distance,
                 total_distance, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&template.session_type)
        .bind(template.session_name.as_deref())
        .bind(&template.duration)
        .bind(template.warmup_distance)
        .bind(template.cool_down_distance)
        .bind(template.total_distance)
        .bind(template.notes.as_deref())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for interval in &template.intervals {
            sqlx::query(
                r"
                INSERT INTO running_intervals
                    (running_session_id, repeat_variation, repeats, repeat_distance, target_pace, rest_time)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(id)
            .bind(interval.repeat_variation)
            .bind(interval.repeats)
            .bind(interval.repeat_distance)
            .bind(&interval.target_pace)
            .bind(interval.rest_time)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Insert a mobility template
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails
    pub async fn insert_mobility_workout(&self, template: &MobilityWorkoutTemplate) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            r"
            INSERT INTO mobility_workouts
                (workout_name, body_area, duration, summary, number_of_movements)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&template.workout_name)
        .bind(template.body_area.as_deref())
        .bind(template.duration)
        .bind(template.summary.as_deref())
        .bind(template.number_of_movements)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for detail in &template.details {
            sqlx::query(
                "INSERT INTO mobility_details (mobility_workout_id, exercise, detail_order, duration) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(detail.exercise.as_deref())
            .bind(detail.order)
            .bind(detail.duration.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Insert a suggested strength template
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails
    pub async fn insert_suggested_strength(&self, template: &SuggestedStrengthTemplate) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            r"
            INSERT INTO suggested_strength
                (workout_name, body_area, duration, description, number_of_sections)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&template.workout_name)
        .bind(template.body_area.as_deref())
        .bind(template.duration)
        .bind(template.description.as_deref())
        .bind(template.number_of_sections)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for detail in &template.details {
            sqlx::query(
                r"
                INSERT INTO suggested_strength_details
                    (suggested_strength_id, section_name, section_number, section_movement, exercise)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(id)
            .bind(detail.section_name.as_deref())
            .bind(detail.section_number)
            .bind(detail.section_movement)
            .bind(detail.exercise.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Insert a conditioning template
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails
    pub async fn insert_conditioning(&self, template: &ConditioningTemplate) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            "INSERT INTO conditioning (name, duration, movements, rest, notes) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&template.name)
        .bind(template.duration)
        .bind(template.movements)
        .bind(template.rest)
        .bind(template.notes.as_deref())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for detail in &template.details {
            sqlx::query(
                "INSERT INTO conditioning_details (conditioning_id, movement_order, exercise, detail) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(detail.movement_order)
            .bind(detail.exercise.as_deref())
            .bind(detail.detail.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }
}
