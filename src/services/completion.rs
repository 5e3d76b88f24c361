// ABOUTME: Workout completion flows for gym, running, HIIT, and mobility sessions
// ABOUTME: Completes the workout, logs results, awards points, and cancels reminders in one transaction
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Workout Completion
//!
//! Every flow runs inside a single transaction so a failed write leaves the
//! workout untouched. Awards are keyed, so repeating a completion never pays
//! twice.

use chrono::NaiveDate;
use repforge_core::constants::rpe::clamp_rpe;
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{
    ActivityType, MessageResponse, RunningCompletionRequest, SessionCompletionRequest, Workout,
    WorkoutLogRequest,
};
use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::info;

use crate::database::{
    apply_section_logs, apply_split_logs, award_points, cancel_pending_reminders,
    fetch_owned_workout, mark_completed, record_session_feedback, record_strength_sets,
    refresh_movement_summaries, AwardKey,
};
use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// Complete a gym or Hyrox workout with its logged sets
///
/// # Errors
///
/// Returns `ResourceNotFound` when the owner has no such workout, or a
/// database error if any write fails
pub async fn complete_gym_workout(
    resources: &ServerResources,
    owner_id: i64,
    workout_id: i64,
    request: &WorkoutLogRequest,
    today: NaiveDate,
) -> AppResult<MessageResponse> {
    let mut tx = resources.database.begin().await?;
    fetch_owned_workout(&mut tx, owner_id, workout_id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout"))?;

    mark_completed(&mut tx, workout_id, today).await?;
    award(&mut tx, owner_id, AwardKey::WorkoutCompletion { workout_id }).await?;

    let logged = apply_section_logs(&mut tx, workout_id, &request.sections).await?;
    for movement in logged.iter().filter(|movement| movement.is_valid()) {
        let key = AwardKey::MovementScore {
            workout_id,
            section_movement_id: movement.section_movement_id,
        };
        award(&mut tx, owner_id, key).await?;
    }

    let recorded = record_strength_sets(&mut tx, owner_id, workout_id, today, &logged).await?;
    refresh_movement_summaries(&mut tx, owner_id).await?;
    cancel_pending_reminders(&mut tx, workout_id).await?;
    commit(tx).await?;

    info!(
        user_id = owner_id,
        workout_id,
        movements = logged.len(),
        strength_sets = recorded,
        "Gym workout completed"
    );
    Ok(MessageResponse::new("Workout completed successfully!"))
}

/// Complete a running workout with its split times
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown workout and `InvalidInput` when
/// the workout is not a run
pub async fn complete_running_workout(
    resources: &ServerResources,
    owner_id: i64,
    workout_id: i64,
    request: &RunningCompletionRequest,
    today: NaiveDate,
) -> AppResult<MessageResponse> {
    let mut tx = resources.database.begin().await?;
    let workout = owned_workout_of(&mut tx, owner_id, workout_id, ActivityType::Running).await?;

    let completed_on = request.scheduled_date.unwrap_or(today);
    mark_completed(&mut tx, workout.id, completed_on).await?;
    award(&mut tx, owner_id, AwardKey::WorkoutCompletion { workout_id }).await?;
    record_session_feedback(
        &mut tx,
        ActivityType::Running,
        workout_id,
        request.rpe.map(clamp_rpe),
        request.comments.as_deref(),
    )
    .await?;

    let fully_logged = apply_split_logs(&mut tx, workout_id, &request.intervals).await?;
    if fully_logged {
        award(&mut tx, owner_id, AwardKey::FullRunningSplits { workout_id }).await?;
    }
    cancel_pending_reminders(&mut tx, workout_id).await?;
    commit(tx).await?;

    info!(
        user_id = owner_id,
        workout_id,
        %completed_on,
        fully_logged,
        "Running workout completed"
    );
    Ok(MessageResponse::new("Running workout completed successfully!"))
}

/// Complete a HIIT or mobility workout with session feedback
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown workout and `InvalidInput` when
/// the workout is of another activity type
pub async fn complete_session_workout(
    resources: &ServerResources,
    owner_id: i64,
    workout_id: i64,
    activity: ActivityType,
    request: &SessionCompletionRequest,
    today: NaiveDate,
) -> AppResult<MessageResponse> {
    let mut tx = resources.database.begin().await?;
    owned_workout_of(&mut tx, owner_id, workout_id, activity).await?;

    mark_completed(&mut tx, workout_id, today).await?;
    award(&mut tx, owner_id, AwardKey::WorkoutCompletion { workout_id }).await?;
    record_session_feedback(
        &mut tx,
        activity,
        workout_id,
        request.rpe.map(clamp_rpe),
        request.comments.as_deref(),
    )
    .await?;
    cancel_pending_reminders(&mut tx, workout_id).await?;
    commit(tx).await?;

    info!(user_id = owner_id, workout_id, activity = activity.as_str(), "Workout completed");
    let label = match activity {
        ActivityType::Hiit => "HIIT",
        other => other.as_str(),
    };
    Ok(MessageResponse::new(format!(
        "{label} workout completed successfully!"
    )))
}

async fn owned_workout_of(
    conn: &mut SqliteConnection,
    owner_id: i64,
    workout_id: i64,
    activity: ActivityType,
) -> AppResult<Workout> {
    let workout = fetch_owned_workout(conn, owner_id, workout_id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout"))?;
    if workout.activity_type != activity {
        return Err(AppError::invalid_input(format!(
            "Workout {workout_id} is not a {activity} workout"
        )));
    }
    Ok(workout)
}

async fn award(conn: &mut SqliteConnection, user_id: i64, key: AwardKey) -> AppResult<()> {
    let awarded = award_points(conn, user_id, key).await?;
    AppLogger::log_score_event(user_id, key.score_type(), key.points(), awarded);
    Ok(())
}

async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit completion: {e}")))
}
