// ABOUTME: User management database operations
// ABOUTME: Handles registration, credential lookup, login timestamps, and profile updates
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use anyhow::Result;
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{ProfileUpdateRequest, User};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{format_timestamp, now, parse_optional_timestamp, parse_timestamp, Database};

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, profile_image, \
     is_onboarding_complete, first_login, last_login, created_at";

impl Database {
    /// Create the users table
    pub(super) async fn migrate_users(&self) -> Result<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                username TEXT NOT NULL UNIQUE,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                profile_image TEXT,
                push_token TEXT,
                is_onboarding_complete INTEGER NOT NULL DEFAULT 0,
                first_login TEXT,
                last_login TEXT,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
        ])
        .await
    }
}

/// Password hash stored for a login email
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// The account
    pub user: User,
    /// bcrypt hash
    pub password_hash: String,
}

/// User account database operations
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the email or username is taken
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        username: &str,
    ) -> AppResult<User> {
        let created_at = now();
        let result = sqlx::query(
            r"
            INSERT INTO users (email, password_hash, username, first_name, last_name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(email)
        .bind(password_hash)
        .bind(username)
        .bind(first_name)
        .bind(last_name)
        .bind(format_timestamp(created_at))
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: email.to_owned(),
            username: username.to_owned(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            profile_image: None,
            is_onboarding_complete: false,
            first_login: None,
            last_login: None,
            created_at,
        })
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Get a user by ID, failing with `404` when absent
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user does not exist
    pub async fn require_user(&self, user_id: i64) -> AppResult<User> {
        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User").with_user_id(user_id))
    }

    /// Whether an account exists
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn user_exists(&self, user_id: i64) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check user: {e}")))?;
        Ok(found.is_some())
    }

    /// Look up the account and password hash for a login email
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_credentials(&self, email: &str) -> AppResult<Option<StoredCredentials>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1 COLLATE NOCASE"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up credentials: {e}")))?;

        row.map(|row| {
            Ok(StoredCredentials {
                user: row_to_user(&row)?,
                password_hash: row.get("password_hash"),
            })
        })
        .transpose()
    }

    /// Whether an email is already registered (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE email = $1 COLLATE NOCASE")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to check email: {e}")))?;
        Ok(found.is_some())
    }

    /// Whether a username is held by an account other than `except_user`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn username_taken(&self, username: &str, except_user: Option<i64>) -> AppResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE username = $1 AND id != $2")
                .bind(username)
                .bind(except_user.unwrap_or(0))
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to check username: {e}")))?;
        Ok(found.is_some())
    }

    /// Stamp a successful login, setting `first_login` the first time
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn record_login(&self, user_id: i64) -> AppResult<()> {
        let stamp = format_timestamp(now());
        sqlx::query(
            r"
            UPDATE users
            SET last_login = $1, first_login = COALESCE(first_login, $1)
            WHERE id = $2
            ",
        )
        .bind(&stamp)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record login: {e}")))?;
        Ok(())
    }

    /// Apply a partial profile update and return the new profile
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user does not exist, or a database error
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdateRequest,
    ) -> AppResult<User> {
        let result = sqlx::query(
            r"
            UPDATE users SET
                first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                username = COALESCE($3, username),
                profile_image = COALESCE($4, profile_image)
            WHERE id = $5
            ",
        )
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .bind(update.username.as_deref())
        .bind(update.profile_image.as_deref())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        self.require_user(user_id).await
    }

    /// Set the onboarding flag
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user does not exist
    pub async fn complete_onboarding(&self, user_id: i64) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET is_onboarding_complete = 1 WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to complete onboarding: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    /// Store the device push token
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user does not exist
    pub async fn set_push_token(&self, user_id: i64, token: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET push_token = $1 WHERE id = $2")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to save push token: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    /// Stored push token, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_push_token(&self, user_id: i64) -> AppResult<Option<String>> {
        let token: Option<Option<String>> =
            sqlx::query_scalar("SELECT push_token FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to read push token: {e}")))?;
        Ok(token.flatten())
    }

    /// Every user id, ascending
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_user_ids(&self) -> AppResult<Vec<i64>> {
        sqlx::query_scalar("SELECT id FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list users: {e}")))
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let created_at: String = row.get("created_at");
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        profile_image: row.get("profile_image"),
        is_onboarding_complete: row.get("is_onboarding_complete"),
        first_login: parse_optional_timestamp(row.get("first_login"))?,
        last_login: parse_optional_timestamp(row.get("last_login"))?,
        created_at: parse_timestamp(&created_at)?,
    })
}
