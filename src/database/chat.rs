// ABOUTME: Community chat room and message database operations
// ABOUTME: Room listing and creation plus paged, newest-first message history with author names
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use anyhow::Result;
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{ChatMessage, ChatRoom};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{format_timestamp, now, parse_timestamp, Database};

impl Database {
    /// Create chat room and message tables
    pub(super) async fn migrate_chat(&self) -> Result<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS chat_rooms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                room_id INTEGER NOT NULL REFERENCES chat_rooms(id) ON DELETE CASCADE,
                owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_room ON chat_messages(room_id, timestamp)",
        ])
        .await
    }
}

// ============================================================================
// Chat Manager
// ============================================================================

/// Chat database operations
pub struct ChatManager {
    pool: SqlitePool,
}

impl ChatManager {
    /// Create a new chat manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every room ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_rooms(&self) -> AppResult<Vec<ChatRoom>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM chat_rooms ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list chat rooms: {e}")))?;

        rows.iter().map(row_to_room).collect()
    }

    /// Create a room
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the name is taken
    pub async fn create_room(&self, name: &str) -> AppResult<ChatRoom> {
        let created_at = now();
        let id = sqlx::query("INSERT INTO chat_rooms (name, created_at) VALUES ($1, $2)")
            .bind(name)
            .bind(format_timestamp(created_at))
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(ChatRoom {
            id,
            name: name.to_owned(),
            created_at,
        })
    }

    /// Create a room unless one with the same name exists, returning whether it was created
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    pub async fn ensure_room(&self, name: &str) -> AppResult<bool> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO chat_rooms (name, created_at) VALUES ($1, $2)")
                .bind(name)
                .bind(format_timestamp(now()))
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to create chat room: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether a room exists
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn room_exists(&self, room_id: i64) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM chat_rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check chat room: {e}")))?;
        Ok(found.is_some())
    }

    /// A page of messages, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_messages(&self, room_id: i64, offset: i64, limit: i64) -> AppResult<Vec<ChatMessage>> {
        let rows = sqlx::query(
            r"
            SELECT c.id, c.room_id, c.owner_id, u.username, c.content, c.timestamp
            FROM chat_messages c
            JOIN users u ON u.id = c.owner_id
            WHERE c.room_id = $1
            ORDER BY c.timestamp DESC, c.id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(room_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list chat messages: {e}")))?;

        rows.iter().map(row_to_message).collect()
    }

    /// Post a message and return it with the author's username
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or the author does not exist
    pub async fn post_message(&self, room_id: i64, owner_id: i64, content: &str) -> AppResult<ChatMessage> {
        let id = sqlx::query(
            "INSERT INTO chat_messages (room_id, owner_id, content, timestamp) VALUES ($1, $2, $3, $4)",
        )
        .bind(room_id)
        .bind(owner_id)
        .bind(content)
        .bind(format_timestamp(now()))
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        let row = sqlx::query(
            r"
            SELECT c.id, c.room_id, c.owner_id, u.username, c.content, c.timestamp
            FROM chat_messages c
            JOIN users u ON u.id = c.owner_id
            WHERE c.id = $1
            ",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read posted message: {e}")))?;

        row_to_message(&row)
    }
}

fn row_to_room(row: &SqliteRow) -> AppResult<ChatRoom> {
    let created_at: String = row.get("created_at");
    Ok(ChatRoom {
        id: row.get("id"),
        name: row.get("name"),
        created_at: parse_timestamp(&created_at)?,
    })
}

fn row_to_message(row: &SqliteRow) -> AppResult<ChatMessage> {
    let timestamp: String = row.get("timestamp");
    Ok(ChatMessage {
        id: row.get("id"),
        room_id: row.get("room_id"),
        owner_id: row.get("owner_id"),
        username: row.get("username"),
        content: row.get("content"),
        timestamp: parse_timestamp(&timestamp)?,
    })
}
