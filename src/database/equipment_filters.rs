// ABOUTME: Saved equipment filter database operations
// ABOUTME: Per-user named equipment sets with unique names and owner-scoped access
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use anyhow::Result;
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::EquipmentFilter;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::{format_timestamp, now, parse_timestamp, Database};

impl Database {
    /// Create equipment filter tables
    pub(super) async fn migrate_equipment_filters(&self) -> Result<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS equipment_filters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                filter_name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (owner_id, filter_name)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS equipment_filter_items (
                filter_id INTEGER NOT NULL REFERENCES equipment_filters(id) ON DELETE CASCADE,
                equipment_id INTEGER NOT NULL REFERENCES equipment(id) ON DELETE CASCADE,
                PRIMARY KEY (filter_id, equipment_id)
            )
            ",
        ])
        .await
    }
}

/// Saved equipment filter database operations
pub struct EquipmentFilterManager {
    pool: SqlitePool,
}

impl EquipmentFilterManager {
    /// Create a new equipment filter manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every filter owned by a user, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_filters(&self, owner_id: i64) -> AppResult<Vec<EquipmentFilter>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM equipment_filters WHERE owner_id = $1 ORDER BY id")
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to list filters: {e}")))?;

        let mut filters = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(filter) = self.get_filter(owner_id, id).await? {
                filters.push(filter);
            }
        }
        Ok(filters)
    }

    /// One filter, visible only to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_filter(&self, owner_id: i64, filter_id: i64) -> AppResult<Option<EquipmentFilter>> {
        let Some(row) = sqlx::query(
            "SELECT id, owner_id, filter_name, created_at FROM equipment_filters WHERE id = $1 AND owner_id = $2",
        )
        .bind(filter_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get filter: {e}")))?
        else {
            return Ok(None);
        };

        let equipment: Vec<String> = sqlx::query_scalar(
            r"
            SELECT e.equipment_name
            FROM equipment_filter_items i
            JOIN equipment e ON e.id = i.equipment_id
            WHERE i.filter_id = $1
            ORDER BY e.equipment_name
            ",
        )
        .bind(filter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get filter equipment: {e}")))?;

        let created_at: String = row.get("created_at");
        Ok(Some(EquipmentFilter {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            filter_name: row.get("filter_name"),
            equipment,
            created_at: parse_timestamp(&created_at)?,
        }))
    }

    /// Whether the owner already has a filter named `name`, other than `except`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn name_taken(&self, owner_id: i64, name: &str, except: Option<i64>) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM equipment_filters WHERE owner_id = $1 AND filter_name = $2 AND id != $3",
        )
        .bind(owner_id)
        .bind(name)
        .bind(except.unwrap_or(0))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check filter name: {e}")))?;
        Ok(found.is_some())
    }

    /// Create a filter; unknown equipment names are skipped
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` on a duplicate name, or a database error
    pub async fn create_filter(
        &self,
        owner_id: i64,
        name: &str,
        equipment: &[String],
    ) -> AppResult<EquipmentFilter> {
        let mut tx = self.pool.begin().await?;
        let filter_id = sqlx::query(
            "INSERT INTO equipment_filters (owner_id, filter_name, created_at) VALUES ($1, $2, $3)",
        )
        .bind(owner_id)
        .bind(name)
        .bind(format_timestamp(now()))
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        replace_items(&mut tx, filter_id, equipment).await?;
        tx.commit().await?;

        self.get_filter(owner_id, filter_id)
            .await?
            .ok_or_else(|| AppError::internal("Created filter could not be read back"))
    }

    /// Rename and/or re-equip a filter
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the owner has no such filter
    pub async fn update_filter(
        &self,
        owner_id: i64,
        filter_id: i64,
        name: Option<&str>,
        equipment: &[String],
    ) -> AppResult<EquipmentFilter> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE equipment_filters SET filter_name = COALESCE($1, filter_name) WHERE id = $2 AND owner_id = $3",
        )
        .bind(name)
        .bind(filter_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Equipment filter"));
        }

        replace_items(&mut tx, filter_id, equipment).await?;
        tx.commit().await?;

        self.get_filter(owner_id, filter_id)
            .await?
            .ok_or_else(|| AppError::not_found("Equipment filter"))
    }

    /// Delete a filter, returning whether one was removed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_filter(&self, owner_id: i64, filter_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM equipment_filters WHERE id = $1 AND owner_id = $2")
            .bind(filter_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete filter: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}

async fn replace_items(
    conn: &mut SqliteConnection,
    filter_id: i64,
    equipment: &[String],
) -> AppResult<()> {
    sqlx::query("DELETE FROM equipment_filter_items WHERE filter_id = $1")
        .bind(filter_id)
        .execute(&mut *conn)
        .await?;

    if equipment.is_empty() {
        return Ok(());
    }

    // $1 is the filter id
    let names = (2..=equipment.len() + 1)
        .map(|index| format!("${index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        r"
        INSERT OR IGNORE INTO equipment_filter_items (filter_id, equipment_id)
        SELECT $1, id FROM equipment WHERE equipment_name IN ({names})
        "
    );
    let mut query = sqlx::query(&sql).bind(filter_id);
    for name in equipment {
        query = query.bind(name.trim());
    }
    query.execute(&mut *conn).await?;
    Ok(())
}
