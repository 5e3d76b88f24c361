// ABOUTME: Integration tests for per-user training statistics and the periodic progress jobs
// ABOUTME: Covers body-part counts, activity minutes, window boundaries, and owner checks
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use axum::Router;
use chrono::Duration;
use helpers::axum_test::AxumTestRequest;
use repforge_core::models::WorkoutStatus;
use repforge_server::database::today;
use repforge_server::services::progress;
use serde_json::{json, Value};

async fn save(app: &Router, user: &common::TestUser, body: &Value) -> i64 {
    let saved: Value = AxumTestRequest::post("/api/saved_workouts/save-workout/")
        .bearer(&user.token)
        .json(body)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    saved["workout_id"].as_i64().unwrap()
}

async fn complete(app: &Router, user: &common::TestUser, workout_id: i64) {
    AxumTestRequest::put(&format!(
        "/api/saved_workouts/complete-workout/{workout_id}/"
    ))
    .bearer(&user.token)
    .json(&json!({}))
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK);
}

async fn fetch_stats(app: &Router, user: &common::TestUser, refresh: bool) -> Value {
    AxumTestRequest::get(&format!("/api/user_stats/{}/?refresh={refresh}", user.id))
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json()
}

#[tokio::test]
async fn test_stats_without_completions_report_unknown_activity() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "idle@example.com").await;
    let app = common::test_app(&resources);

    let stats = fetch_stats(&app, &user, false).await;
    assert_eq!(stats["user_id"], user.id);
    assert_eq!(stats["weekly_body_part"], json!({}));
    assert_eq!(stats["weekly_activity_type"], json!({ "Unknown": 0 }));
    assert_eq!(stats["yearly_activity_type"], json!({ "Unknown": 0 }));
    assert!(!stats["last_updated"].is_null());
}

#[tokio::test]
async fn test_completed_gym_workout_counts_body_parts_and_minutes() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "stats@example.com").await;
    let app = common::test_app(&resources);

    let workout_id = save(&app, &user, &common::gym_workout_body(user.id, "Counted")).await;
    complete(&app, &user, workout_id).await;

    // Saved but never completed: contributes nothing
    save(&app, &user, &common::gym_workout_body(user.id, "Planned")).await;

    let stats = fetch_stats(&app, &user, true).await;
    let expected_parts = json!({ "Back": 1, "Chest": 1, "Quads": 1 });
    assert_eq!(stats["weekly_body_part"], expected_parts);
    assert_eq!(stats["monthly_body_part"], expected_parts);
    assert_eq!(stats["yearly_body_part"], expected_parts);
    assert_eq!(stats["weekly_activity_type"], json!({ "Gym": 45 }));
}

#[tokio::test]
async fn test_warm_up_sections_are_not_counted() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "warmup@example.com").await;
    let app = common::test_app(&resources);

    let mut body = common::gym_workout_body(user.id, "With warm up");
    body["sections"].as_array_mut().unwrap().insert(
        0,
        json!({
            "section_name": "Warm Up A",
            "section_order": 0,
            "section_type": "single",
            "movements": [{ "movement_name": "Leg Swing", "movement_order": 1 }]
        }),
    );
    let workout_id = save(&app, &user, &body).await;
    complete(&app, &user, workout_id).await;

    let stats = fetch_stats(&app, &user, true).await;
    assert!(stats["weekly_body_part"].get("Hamstrings").is_none());
    assert_eq!(stats["weekly_body_part"]["Quads"], 1);
}

#[tokio::test]
async fn test_windows_reach_back_full_days_from_today() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "windows@example.com").await;
    let app = common::test_app(&resources);
    let as_of = common::date(2025, 6, 15);

    for days_ago in [7, 8, 30, 31, 365, 366] {
        let run = save(&app, &user, &common::running_workout_body(user.id)).await;
        resources
            .database
            .workouts()
            .update_status(
                user.id,
                run,
                WorkoutStatus::Completed,
                as_of - Duration::days(days_ago),
            )
            .await
            .unwrap();
    }

    let stats = resources
        .database
        .stats()
        .refresh_stats(user.id, as_of)
        .await
        .unwrap();
    // 45 minutes per run: 7 days back is the oldest weekly day
    assert_eq!(stats.weekly_activity_type.get("Running"), Some(&45));
    assert_eq!(stats.monthly_activity_type.get("Running"), Some(&135));
    assert_eq!(stats.yearly_activity_type.get("Running"), Some(&225));
}

#[tokio::test]
async fn test_stored_stats_are_served_until_refreshed() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "cached@example.com").await;
    let app = common::test_app(&resources);

    let before = fetch_stats(&app, &user, false).await;
    assert_eq!(before["weekly_activity_type"], json!({ "Unknown": 0 }));

    let workout_id = save(&app, &user, &common::hiit_workout_body(user.id)).await;
    AxumTestRequest::put(&format!(
        "/api/saved_hiit/complete-workout/{workout_id}/"
    ))
    .bearer(&user.token)
    .json(&json!({ "rpe": 7 }))
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK);

    let stale = fetch_stats(&app, &user, false).await;
    assert_eq!(stale["weekly_activity_type"], json!({ "Unknown": 0 }));

    let fresh = fetch_stats(&app, &user, true).await;
    assert_eq!(fresh["weekly_activity_type"], json!({ "Hiit": 16 }));
}

#[tokio::test]
async fn test_stats_are_private() {
    let resources = common::create_seeded_resources().await;
    let owner = common::create_test_user(&resources, "owner@example.com").await;
    let other = common::create_test_user(&resources, "other@example.com").await;
    let app = common::test_app(&resources);

    AxumTestRequest::get(&format!("/api/user_stats/{}/", owner.id))
        .bearer(&other.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    AxumTestRequest::get(&format!("/api/user_stats/{}/", owner.id))
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_scheduled_jobs_refresh_every_user() {
    let resources = common::create_seeded_resources().await;
    let first = common::create_test_user(&resources, "first@example.com").await;
    let second = common::create_test_user(&resources, "second@example.com").await;
    let app = common::test_app(&resources);

    let workout_id = save(&app, &first, &common::gym_workout_body(first.id, "Job")).await;
    complete(&app, &first, workout_id).await;

    let refreshed = progress::refresh_all_user_stats(&resources, today()).await.unwrap();
    assert_eq!(refreshed, 2);

    let stored = resources.database.stats().get_stats(first.id).await.unwrap().unwrap();
    assert_eq!(stored.weekly_activity_type.get("Gym"), Some(&45));
    let stored = resources.database.stats().get_stats(second.id).await.unwrap().unwrap();
    assert_eq!(stored.weekly_activity_type.get("Unknown"), Some(&0));

    progress::refresh_leaderboard(&resources, today()).await.unwrap();
    let board: Value = AxumTestRequest::get("/api/leaderboard/")
        .bearer(&second.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let leader = board
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["user_id"] == first.id)
        .unwrap();
    assert_eq!(leader["total_rank"], 1);
    assert_eq!(leader["total_score"], 50);
}
