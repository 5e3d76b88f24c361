// ABOUTME: Movement catalog and equipment database operations
// ABOUTME: Lists and resolves catalog movements, equipment, and the links between them
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use anyhow::Result;
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{Equipment, Movement};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::Database;

pub(super) const MOVEMENT_COLUMNS: &str = "m.id, m.exercise, m.body_area, m.movement, m.complexity, \
     m.movement_type, m.primary_body_part, m.advanced_movements, m.hiit_flag";

impl Database {
    /// Create movement, equipment, and link tables
    pub(super) async fn migrate_movements(&self) -> Result<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS movements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exercise TEXT NOT NULL UNIQUE,
                body_area TEXT NOT NULL DEFAULT '',
                movement TEXT NOT NULL DEFAULT '',
                complexity INTEGER NOT NULL DEFAULT 1,
                movement_type TEXT NOT NULL DEFAULT '',
                primary_body_part TEXT NOT NULL DEFAULT '',
                advanced_movements TEXT NOT NULL DEFAULT '',
                hiit_flag INTEGER NOT NULL DEFAULT 0
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS equipment (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                equipment_name TEXT NOT NULL UNIQUE
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS movement_equipment (
                movement_id INTEGER NOT NULL REFERENCES movements(id) ON DELETE CASCADE,
                equipment_id INTEGER NOT NULL REFERENCES equipment(id) ON DELETE CASCADE,
                PRIMARY KEY (movement_id, equipment_id)
            )
            ",
        ])
        .await
    }
}

/// A catalog entry as loaded by the seeding tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementSeed {
    /// Exercise name
    pub exercise: String,
    /// Body area
    pub body_area: String,
    /// Movement pattern
    pub movement: String,
    /// Complexity 1 to 3
    pub complexity: i64,
    /// Session role
    pub movement_type: String,
    /// Main body part
    pub primary_body_part: String,
    /// HIIT pattern tags
    #[serde(default)]
    pub advanced_movements: String,
    /// HIIT suitable
    #[serde(default)]
    pub hiit_flag: bool,
    /// Equipment names needed
    #[serde(default)]
    pub equipment: Vec<String>,
}

/// Movement catalog database operations
pub struct MovementManager {
    pool: SqlitePool,
}

impl MovementManager {
    /// Create a new movement manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every movement ordered by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_movements(&self) -> AppResult<Vec<Movement>> {
        let rows = sqlx::query(&format!("SELECT {MOVEMENT_COLUMNS} FROM movements m ORDER BY m.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list movements: {e}")))?;

        Ok(rows.iter().map(row_to_movement).collect())
    }

    /// Movements that use any of the named equipment
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn movements_for_equipment(&self, equipment: &[String]) -> AppResult<Vec<Movement>> {
        if equipment.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = placeholders(equipment.len());
        let sql = format!(
            r"
            SELECT DISTINCT {MOVEMENT_COLUMNS}
            FROM movements m
            JOIN movement_equipment me ON me.movement_id = m.id
            JOIN equipment e ON e.id = me.equipment_id
            WHERE e.equipment_name IN ({placeholders})
            ORDER BY m.id
            "
        );
        let mut query = sqlx::query(&sql);
        for name in equipment {
            query = query.bind(name);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to filter movements: {e}")))?;

        Ok(rows.iter().map(row_to_movement).collect())
    }

    /// Every piece of equipment ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query("SELECT id, equipment_name FROM equipment ORDER BY equipment_name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list equipment: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| Equipment {
                id: row.get("id"),
                equipment_name: row.get("equipment_name"),
            })
            .collect())
    }

    /// Number of catalog movements
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_movements(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM movements")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count movements: {e}")))
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    /// Insert or update a movement by exercise name and replace its equipment links
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails
    pub async fn upsert_movement(&self, seed: &MovementSeed) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;

        let movement_id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO movements
                (exercise, body_area, movement, complexity, movement_type,
                 primary_body_part, advanced_movements, hiit_flag)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT(exercise) DO UPDATE SET
                body_area = excluded.body_area,
                movement = excluded.movement,
                complexity = excluded.complexity,
                movement_type = excluded.movement_type,
                primary_body_part = excluded.primary_body_part,
                advanced_movements = excluded.advanced_movements,
                hiit_flag = excluded.hiit_flag
            RETURNING id
            ",
        )
        .bind(&seed.exercise)
        .bind(&seed.body_area)
        .bind(&seed.movement)
        .bind(seed.complexity)
        .bind(&seed.movement_type)
        .bind(&seed.primary_body_part)
        .bind(&seed.advanced_movements)
        .bind(seed.hiit_flag)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to upsert movement: {e}")))?;

        sqlx::query("DELETE FROM movement_equipment WHERE movement_id = $1")
            .bind(movement_id)
            .execute(&mut *tx)
            .await?;

        for name in &seed.equipment {
            let equipment_id = upsert_equipment_in(&mut tx, name).await?;
            sqlx::query(
                "INSERT OR IGNORE INTO movement_equipment (movement_id, equipment_id) VALUES ($1, $2)",
            )
            .bind(movement_id)
            .bind(equipment_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(movement_id)
    }

    /// Insert equipment if missing and return its ID
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    pub async fn upsert_equipment(&self, name: &str) -> AppResult<i64> {
        let mut conn = self.pool.acquire().await?;
        upsert_equipment_in(&mut conn, name).await
    }
}

async fn upsert_equipment_in(conn: &mut SqliteConnection, name: &str) -> AppResult<i64> {
    sqlx::query_scalar(
        r"
        INSERT INTO equipment (equipment_name) VALUES ($1)
        ON CONFLICT(equipment_name) DO UPDATE SET equipment_name = excluded.equipment_name
        RETURNING id
        ",
    )
    .bind(name.trim())
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to upsert equipment: {e}")))
}

/// Resolve an exercise name to a catalog movement inside a transaction
///
/// # Errors
///
/// Returns an error if the database query fails
pub(super) async fn movement_id_by_name(
    conn: &mut SqliteConnection,
    exercise: &str,
) -> AppResult<Option<i64>> {
    sqlx::query_scalar("SELECT id FROM movements WHERE exercise = $1 COLLATE NOCASE")
        .bind(exercise.trim())
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to resolve movement: {e}")))
}

/// Exercise name for a catalog ID inside a transaction
///
/// # Errors
///
/// Returns an error if the database query fails
pub(super) async fn movement_name_by_id(
    conn: &mut SqliteConnection,
    movement_id: i64,
) -> AppResult<Option<String>> {
    sqlx::query_scalar("SELECT exercise FROM movements WHERE id = $1")
        .bind(movement_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to resolve movement: {e}")))
}

/// Comma-separated `$n` placeholders starting at 1
pub(super) fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|index| format!("${index}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Map a row selected with [`MOVEMENT_COLUMNS`]
pub(super) fn row_to_movement(row: &SqliteRow) -> Movement {
    Movement {
        id: row.get("id"),
        exercise: row.get("exercise"),
        body_area: row.get("body_area"),
        movement: row.get("movement"),
        complexity: row.get("complexity"),
        movement_type: row.get("movement_type"),
        primary_body_part: row.get("primary_body_part"),
        advanced_movements: row.get("advanced_movements"),
        hiit_flag: row.get("hiit_flag"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(3), "$1, $2, $3");
        assert_eq!(placeholders(0), "");
    }
}
