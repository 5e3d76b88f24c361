// ABOUTME: Saved workout business rules for saving, rescheduling, status changes, and detail logs
// ABOUTME: Runs multi-table writes in one transaction and keeps workout reminders in step
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::slice;

use chrono::NaiveDate;
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{
    ActivityType, DateUpdateRequest, MessageResponse, SaveWorkoutRequest, SaveWorkoutResponse,
    StatusUpdateRequest, WorkoutLogRequest, WorkoutStatus,
};
use tracing::info;

use crate::database::{
    apply_section_logs, fetch_owned_workout, insert_workout, schedule_reminder,
    section_workout_id, set_scheduled_date,
};
use crate::resources::ServerResources;

/// Rejection text for a status outside [`WorkoutStatus::CLIENT_SETTABLE`]
pub const INVALID_STATUS_MESSAGE: &str =
    r#"Invalid status. Allowed values are: "Started", "Completed", "Scheduled"."#;

/// Save a workout of any activity type for `owner_id`
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown activity type, status, owner, or
/// gym movement name
pub async fn save_workout(
    resources: &ServerResources,
    owner_id: i64,
    request: &SaveWorkoutRequest,
) -> AppResult<SaveWorkoutResponse> {
    let activity = ActivityType::parse(&request.activity_type).ok_or_else(|| {
        AppError::invalid_input(format!("Unsupported workout type: {}", request.activity_type))
    })?;
    let status = match request.status.as_deref() {
        None | Some("") => WorkoutStatus::Saved,
        Some(raw) => WorkoutStatus::parse(raw)
            .ok_or_else(|| AppError::invalid_input(format!("Invalid status: {raw}")))?,
    };
    if request.name.trim().is_empty() {
        return Err(AppError::invalid_input("Workout name is required"));
    }
    if !resources.database.users().user_exists(owner_id).await? {
        return Err(AppError::invalid_input("User not found").with_user_id(owner_id));
    }

    let mut tx = resources.database.begin().await?;
    let workout = insert_workout(&mut tx, owner_id, request, activity, status).await?;
    if let Some(date) = request.scheduled_date {
        schedule_reminder(&mut tx, owner_id, workout.id, &workout.name, date).await?;
    }
    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit workout: {e}")))?;

    info!(
        user_id = owner_id,
        workout_id = workout.id,
        activity = activity.as_str(),
        "Workout saved"
    );
    Ok(SaveWorkoutResponse {
        message: format!("{activity} workout saved successfully"),
        workout_id: workout.id,
    })
}

/// Apply a client status change
///
/// # Errors
///
/// Returns `InvalidInput` for a status outside the client-settable set and
/// `ResourceNotFound` when the owner has no such workout
pub async fn update_status(
    resources: &ServerResources,
    owner_id: i64,
    workout_id: i64,
    request: &StatusUpdateRequest,
    today: NaiveDate,
) -> AppResult<MessageResponse> {
    let status = request
        .status
        .as_deref()
        .and_then(WorkoutStatus::parse)
        .filter(|status| WorkoutStatus::CLIENT_SETTABLE.contains(status))
        .ok_or_else(|| AppError::invalid_input(INVALID_STATUS_MESSAGE))?;

    resources
        .database
        .workouts()
        .update_status(owner_id, workout_id, status, today)
        .await?;

    info!(user_id = owner_id, workout_id, status = status.as_str(), "Workout status updated");
    Ok(MessageResponse::new(format!("Workout status updated to {status}")))
}

/// Move a workout to a new date and reschedule its reminder
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown workout and `InvalidInput` for a
/// completed workout or a missing date
pub async fn update_date(
    resources: &ServerResources,
    owner_id: i64,
    workout_id: i64,
    request: &DateUpdateRequest,
) -> AppResult<MessageResponse> {
    let mut tx = resources.database.begin().await?;
    let workout = fetch_owned_workout(&mut tx, owner_id, workout_id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout"))?;

    if workout.status == WorkoutStatus::Completed {
        return Err(AppError::invalid_input(
            "Cannot edit the date of a completed workout",
        ));
    }
    let date = request
        .scheduled_date
        .ok_or_else(|| AppError::invalid_input("Scheduled date is required"))?;

    set_scheduled_date(&mut tx, workout_id, date).await?;
    schedule_reminder(&mut tx, owner_id, workout_id, &workout.name, date).await?;
    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit reschedule: {e}")))?;

    info!(user_id = owner_id, workout_id, %date, "Workout rescheduled");
    Ok(MessageResponse::new("Workout date updated successfully"))
}

/// Save per-movement difficulty, comments, and sets without completing
///
/// Sections the owner does not hold are skipped like unknown ones.
///
/// # Errors
///
/// Returns an error if a write fails
pub async fn save_workout_details(
    resources: &ServerResources,
    owner_id: i64,
    request: &WorkoutLogRequest,
) -> AppResult<MessageResponse> {
    let mut tx = resources.database.begin().await?;
    let mut saved = 0;
    for section in &request.sections {
        let Some(workout_id) = section_workout_id(&mut tx, owner_id, section.section_id).await?
        else {
            continue;
        };
        saved += apply_section_logs(&mut tx, workout_id, slice::from_ref(section))
            .await?
            .len();
    }
    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit workout details: {e}")))?;

    info!(user_id = owner_id, movements = saved, "Workout details saved");
    Ok(MessageResponse::new("Workout details saved successfully!"))
}
