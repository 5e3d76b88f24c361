// ABOUTME: Periodic progress jobs for leaderboard ranks and per-user training statistics
// ABOUTME: Shared by the background scheduler and the on-demand stats endpoint
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::time::Instant;

use chrono::NaiveDate;
use repforge_core::errors::AppResult;
use repforge_core::models::UserStats;
use tracing::{info, warn};

use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// Recompute leaderboard scores and ranks, returning the number of rows written
///
/// # Errors
///
/// Returns an error if the recompute fails
pub async fn refresh_leaderboard(resources: &ServerResources, today: NaiveDate) -> AppResult<usize> {
    let started = Instant::now();
    let result = resources.database.scores().recompute_leaderboard(today).await;
    AppLogger::log_database_operation(
        "recompute",
        "leaderboards",
        result.is_ok(),
        started.elapsed().as_millis() as u64,
    );

    let rows = result?;
    info!(rows, "Leaderboard recomputed");
    Ok(rows)
}

/// Recompute statistics for every user, returning how many succeeded
///
/// A failure for one user is logged and does not stop the others.
///
/// # Errors
///
/// Returns an error if the user list cannot be loaded
pub async fn refresh_all_user_stats(
    resources: &ServerResources,
    today: NaiveDate,
) -> AppResult<usize> {
    let user_ids = resources.database.users().list_user_ids().await?;
    let stats = resources.database.stats();

    let mut refreshed = 0;
    for user_id in &user_ids {
        match stats.refresh_stats(*user_id, today).await {
            Ok(_) => refreshed += 1,
            Err(e) => warn!(user_id, error = %e, "Failed to refresh user stats"),
        }
    }

    info!(refreshed, users = user_ids.len(), "User stats recomputed");
    Ok(refreshed)
}

/// Stored statistics for a user, computed on first request or when `refresh` is set
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown user, or a database error
pub async fn user_stats(
    resources: &ServerResources,
    user_id: i64,
    refresh: bool,
    today: NaiveDate,
) -> AppResult<UserStats> {
    resources.database.users().require_user(user_id).await?;
    let stats = resources.database.stats();

    if !refresh {
        if let Some(stored) = stats.get_stats(user_id).await? {
            return Ok(stored);
        }
    }
    stats.refresh_stats(user_id, today).await
}
