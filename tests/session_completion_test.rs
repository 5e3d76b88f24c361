// ABOUTME: Integration tests for running, HIIT, and mobility workout completion
// ABOUTME: Covers split logging, the full-splits bonus, RPE clamping, and activity checks
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use axum::Router;
use helpers::axum_test::AxumTestRequest;
use repforge_core::constants::scoring::{
    FULL_RUNNING_SPLITS, FULL_RUNNING_SPLITS_POINTS, WORKOUT_COMPLETION_POINTS,
};
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

async fn populated(app: &Router, user: &common::TestUser, workout_id: i64) -> Value {
    let body: Value = AxumTestRequest::get(&format!(
        "/api/saved_workouts/get-single-workout/{workout_id}/"
    ))
    .bearer(&user.token)
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK)
    .json();
    body["workout"].clone()
}

/// Interval ID and split IDs of the only interval of a saved run
fn interval_of(workout: &Value) -> (i64, Vec<i64>) {
    let interval = &workout["running_sessions"][0]["saved_intervals"][0];
    let splits = interval["split_times"]
        .as_array()
        .unwrap()
        .iter()
        .map(|split| split["id"].as_i64().unwrap())
        .collect();
    (interval["id"].as_i64().unwrap(), splits)
}

fn mobility_body(user_id: i64) -> Value {
    json!({
        "user_id": user_id,
        "name": "Morning mobility",
        "duration": 10,
        "activity_type": "Mobility",
        "mobility_sessions": {
            "number_of_movements": 2,
            "mobility_details": [
                { "order": 1, "duration": 2.0, "movement_name": "Thoracic Rotation" },
                { "order": 2, "duration": 3.0, "movement_name": "Pigeon Stretch" }
            ]
        }
    })
}

#[tokio::test]
async fn test_saved_run_has_one_split_per_repeat() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "splits@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user, &common::running_workout_body(user.id)).await;

    let workout = populated(&app, &user, workout_id).await;
    let interval = &workout["running_sessions"][0]["saved_intervals"][0];
    let splits = interval["split_times"].as_array().unwrap();
    assert_eq!(splits.len(), 4);
    let numbers: Vec<i64> = splits.iter().map(|s| s["repeat_number"].as_i64().unwrap()).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    // 255 s/km over 0.4 km
    assert!(splits.iter().all(|s| s["target_time"] == 102));
    assert!(splits.iter().all(|s| s["actual_time"].is_null()));
}

#[tokio::test]
async fn test_fully_logged_run_earns_split_bonus() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "runner@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user, &common::running_workout_body(user.id)).await;
    let (interval_id, splits) = interval_of(&populated(&app, &user, workout_id).await);

    let times = [100, 100, 104, 104];
    let request = json!({
        "scheduled_date": "2025-03-14",
        "rpe": 14,
        "comments": "Windy",
        "intervals": [{
            "id": interval_id,
            "split_times": splits
                .iter()
                .zip(times)
                .map(|(id, time)| json!({ "id": id, "actual_time": time }))
                .collect::<Vec<_>>()
        }]
    });

    let response: Value = AxumTestRequest::put(&format!(
        "/api/saved_runs/complete-workout/{workout_id}/"
    ))
    .bearer(&user.token)
    .json(&request)
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(response["message"], "Running workout completed successfully!");

    let totals = resources.database.scores().totals(user.id).await.unwrap();
    assert_eq!(
        totals.total_score,
        WORKOUT_COMPLETION_POINTS + FULL_RUNNING_SPLITS_POINTS
    );

    let workout = populated(&app, &user, workout_id).await;
    assert_eq!(workout["status"], "Completed");
    assert_eq!(workout["completed_date"], "2025-03-14");
    let session = &workout["running_sessions"][0];
    assert_eq!(session["rpe"], 10);
    assert_eq!(session["comments"], "Windy");
    // Mean split of 102 s over 0.4 km
    assert_eq!(session["saved_intervals"][0]["average_actual_pace"], 255);
}

#[tokio::test]
async fn test_partially_logged_run_gets_no_bonus() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "partial@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user, &common::running_workout_body(user.id)).await;
    let (interval_id, splits) = interval_of(&populated(&app, &user, workout_id).await);

    let request = json!({
        "intervals": [{
            "id": interval_id,
            "split_times": [
                { "id": splits[0], "actual_time": 100 },
                { "id": splits[1], "actual_time": null }
            ]
        }]
    });
    AxumTestRequest::put(&format!("/api/saved_runs/complete-workout/{workout_id}/"))
        .bearer(&user.token)
        .json(&request)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let logs = resources.database.scores().list_logs(user.id).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs.iter().all(|log| log.score_type != FULL_RUNNING_SPLITS));

    let workout = populated(&app, &user, workout_id).await;
    let logged = &workout["running_sessions"][0]["saved_intervals"][0];
    assert_eq!(logged["split_times"][0]["actual_time"], 100);
    assert!(logged["split_times"][1]["actual_time"].is_null());
    // 100 s over 0.4 km
    assert_eq!(logged["average_actual_pace"], 250);
}

async fn complete_run(app: &Router, user: &common::TestUser, workout_id: i64, request: &Value) {
    AxumTestRequest::put(&format!("/api/saved_runs/complete-workout/{workout_id}/"))
        .bearer(&user.token)
        .json(request)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
}

fn split_log(interval_id: i64, times: &[(i64, Value)]) -> Value {
    json!({
        "intervals": [{
            "id": interval_id,
            "split_times": times
                .iter()
                .map(|(id, time)| json!({ "id": id, "actual_time": time }))
                .collect::<Vec<_>>()
        }]
    })
}

#[tokio::test]
async fn test_zero_split_times_do_not_count_as_logged() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "zeros@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user, &common::running_workout_body(user.id)).await;
    let (interval_id, splits) = interval_of(&populated(&app, &user, workout_id).await);

    let zeros: Vec<(i64, Value)> = splits.iter().map(|id| (*id, json!(0))).collect();
    complete_run(&app, &user, workout_id, &split_log(interval_id, &zeros)).await;

    let totals = resources.database.scores().totals(user.id).await.unwrap();
    assert_eq!(totals.total_score, WORKOUT_COMPLETION_POINTS);
    let logs = resources.database.scores().list_logs(user.id).await.unwrap();
    assert!(logs.iter().all(|log| log.score_type != FULL_RUNNING_SPLITS));
}

#[tokio::test]
async fn test_previously_stored_split_times_count_toward_the_bonus() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "resume@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user, &common::running_workout_body(user.id)).await;
    let (interval_id, splits) = interval_of(&populated(&app, &user, workout_id).await);

    let first: Vec<(i64, Value)> = splits
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, if i < 3 { json!(101) } else { Value::Null }))
        .collect();
    complete_run(&app, &user, workout_id, &split_log(interval_id, &first)).await;
    let totals = resources.database.scores().totals(user.id).await.unwrap();
    assert_eq!(totals.total_score, WORKOUT_COMPLETION_POINTS);

    // Nulls keep the stored times, so every split is now logged
    let second: Vec<(i64, Value)> = splits
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, if i < 3 { Value::Null } else { json!(103) }))
        .collect();
    complete_run(&app, &user, workout_id, &split_log(interval_id, &second)).await;
    let totals = resources.database.scores().totals(user.id).await.unwrap();
    assert_eq!(
        totals.total_score,
        WORKOUT_COMPLETION_POINTS + FULL_RUNNING_SPLITS_POINTS
    );

    let workout = populated(&app, &user, workout_id).await;
    let stored = &workout["running_sessions"][0]["saved_intervals"][0]["split_times"];
    assert_eq!(stored[0]["actual_time"], 101);
    assert_eq!(stored[3]["actual_time"], 103);
}

#[tokio::test]
async fn test_completion_rejects_a_mismatched_user_id_query() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "legacy@example.com").await;
    let app = common::test_app(&resources);
    let run_id = save(&app, &user, &common::running_workout_body(user.id)).await;
    let hiit_id = save(&app, &user, &common::hiit_workout_body(user.id)).await;
    let mobility_id = save(&app, &user, &mobility_body(user.id)).await;

    let paths = [
        format!("/api/saved_runs/complete-workout/{run_id}/"),
        format!("/api/saved_hiit/complete-workout/{hiit_id}/"),
        format!("/api/saved_mobility/complete-workout/{mobility_id}/"),
    ];
    for path in &paths {
        AxumTestRequest::put(&format!("{path}?user_id={}", user.id + 1))
            .bearer(&user.token)
            .json(&json!({ "rpe": 5 }))
            .send(app.clone())
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
    assert!(resources.database.scores().list_logs(user.id).await.unwrap().is_empty());

    // The caller's own id is accepted
    AxumTestRequest::put(&format!("{}?user_id={}", paths[1], user.id))
        .bearer(&user.token)
        .json(&json!({ "rpe": 5 }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(populated(&app, &user, hiit_id).await["status"], "Completed");
}

#[tokio::test]
async fn test_completion_rejects_the_wrong_activity() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "mismatch@example.com").await;
    let app = common::test_app(&resources);
    let run_id = save(&app, &user, &common::running_workout_body(user.id)).await;

    AxumTestRequest::put(&format!("/api/saved_hiit/complete-workout/{run_id}/"))
        .bearer(&user.token)
        .json(&json!({ "rpe": 6 }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::put("/api/saved_runs/complete-workout/424242/")
        .bearer(&user.token)
        .json(&json!({}))
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert!(resources.database.scores().list_logs(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_hiit_completion_records_feedback() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "hiit@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user, &common::hiit_workout_body(user.id)).await;

    let response: Value = AxumTestRequest::put(&format!(
        "/api/saved_hiit/complete-workout/{workout_id}/"
    ))
    .bearer(&user.token)
    .json(&json!({ "rpe": -3, "comments": "Brutal" }))
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(response["message"], "HIIT workout completed successfully!");

    let workout = populated(&app, &user, workout_id).await;
    assert_eq!(workout["status"], "Completed");
    let session = &workout["hiit_sessions"][0];
    assert_eq!(session["rpe"], 0);
    assert_eq!(session["comments"], "Brutal");
    let slots = session["hiit_details"][0]["hiit_movements"].as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert!(slots.iter().all(|slot| slot["movement_id"].is_i64()));

    let totals = resources.database.scores().totals(user.id).await.unwrap();
    assert_eq!(totals.total_score, WORKOUT_COMPLETION_POINTS);
}

#[tokio::test]
async fn test_mobility_completion_resolves_known_steps() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "mobile@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user, &mobility_body(user.id)).await;

    let saved = populated(&app, &user, workout_id).await;
    let details = saved["mobility_sessions"][0]["mobility_details"].as_array().unwrap();
    assert_eq!(details.len(), 2);
    assert!(details[0]["movement_id"].is_i64());
    // Not in the movement catalog
    assert!(details[1]["movement_id"].is_null());
    assert_eq!(details[1]["exercise"], "Pigeon Stretch");

    let response: Value = AxumTestRequest::put(&format!(
        "/api/saved_mobility/complete-workout/{workout_id}/"
    ))
    .bearer(&user.token)
    .json(&json!({ "rpe": 3 }))
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(response["message"], "Mobility workout completed successfully!");

    let completed = populated(&app, &user, workout_id).await;
    assert_eq!(completed["mobility_sessions"][0]["rpe"], 3);
}
