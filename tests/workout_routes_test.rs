// ABOUTME: HTTP integration tests for saved workout routes
// ABOUTME: Saving each activity type, listing, status and date changes, deletion, and detail logs
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
use serde_json::{json, Value};

async fn save(app: &Router, token: &str, body: &Value) -> i64 {
    let response: Value = AxumTestRequest::post("/api/saved_workouts/save-workout/")
        .bearer(token)
        .json(body)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    response["workout_id"].as_i64().unwrap()
}

async fn single(app: &Router, token: &str, workout_id: i64) -> Value {
    AxumTestRequest::get(&format!(
        "/api/saved_workouts/get-single-workout/{workout_id}/"
    ))
    .bearer(token)
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK)
    .json()
}

#[tokio::test]
async fn test_save_gym_workout_populates_sections() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "gym@example.com").await;
    let app = common::test_app(&resources);

    let response: Value = AxumTestRequest::post("/api/saved_workouts/save-workout/")
        .bearer(&user.token)
        .json(&common::gym_workout_body(user.id, "Leg day"))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(response["message"], "Gym workout saved successfully");
    let workout_id = response["workout_id"].as_i64().unwrap();

    let body = single(&app, &user.token, workout_id).await;
    let workout = &body["workout"];
    assert_eq!(workout["name"], "Leg day");
    assert_eq!(workout["status"], "Saved");
    assert_eq!(workout["activity_type"], "Gym");
    assert_eq!(workout["workout_number"], 1);

    let sections = workout["workout_sections"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["section_type"], "single");
    assert_eq!(sections[1]["section_type"], "superset");
    let superset = sections[1]["section_movement_details"].as_array().unwrap();
    assert_eq!(superset[0]["movements"]["exercise"], "Push Up");
    assert_eq!(superset[1]["movements"]["exercise"], "Dumbbell Row");
    assert_eq!(superset[0]["workout_sets"], json!([]));

    // No earlier completions, so every movement has an empty history
    let history = body["movement_history"].as_object().unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.values().all(|entries| entries == &json!([])));
}

#[tokio::test]
async fn test_save_workout_numbers_are_per_owner() {
    let resources = common::create_seeded_resources().await;
    let first = common::create_test_user(&resources, "first@example.com").await;
    let second = common::create_test_user(&resources, "second@example.com").await;
    let app = common::test_app(&resources);

    save(&app, &first.token, &common::gym_workout_body(first.id, "A")).await;
    let b = save(&app, &first.token, &common::gym_workout_body(first.id, "B")).await;
    let c = save(&app, &second.token, &common::gym_workout_body(second.id, "C")).await;

    assert_eq!(single(&app, &first.token, b).await["workout"]["workout_number"], 2);
    assert_eq!(single(&app, &second.token, c).await["workout"]["workout_number"], 1);
}

#[tokio::test]
async fn test_save_running_and_hiit_workouts() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "mixed@example.com").await;
    let app = common::test_app(&resources);

    let run_id = save(&app, &user.token, &common::running_workout_body(user.id)).await;
    let run = single(&app, &user.token, run_id).await;
    assert_eq!(run["workout"]["activity_type"], "Running");
    assert_eq!(run["workout"]["complexity"], 0);
    let sessions = run["workout"]["running_sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    let intervals = sessions[0]["saved_intervals"].as_array().unwrap();
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0]["repeats"], 4);

    let hiit_id = save(&app, &user.token, &common::hiit_workout_body(user.id)).await;
    let hiit = single(&app, &user.token, hiit_id).await;
    assert_eq!(hiit["workout"]["activity_type"], "Hiit");
    let blocks = hiit["workout"]["hiit_sessions"].as_array().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["workout_type"], "Tabata");
}

#[tokio::test]
async fn test_save_workout_rejects_bad_payloads() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "strict@example.com").await;
    let other = common::create_test_user(&resources, "someone@example.com").await;
    let app = common::test_app(&resources);

    let mut unknown_type = common::gym_workout_body(user.id, "Swim");
    unknown_type["activity_type"] = json!("Swimming");
    let rejected: Value = AxumTestRequest::post("/api/saved_workouts/save-workout/")
        .bearer(&user.token)
        .json(&unknown_type)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(rejected["message"], "Unsupported workout type: Swimming");

    let mut unknown_movement = common::gym_workout_body(user.id, "Odd");
    unknown_movement["sections"][0]["movements"][0]["movement_name"] = json!("Moon Walk");
    AxumTestRequest::post("/api/saved_workouts/save-workout/")
        .bearer(&user.token)
        .json(&unknown_movement)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // A failed save leaves nothing behind
    let workouts = resources.database.workouts().list_workouts(user.id).await.unwrap();
    assert!(workouts.is_empty());

    AxumTestRequest::post("/api/saved_workouts/save-workout/")
        .bearer(&user.token)
        .json(&common::gym_workout_body(other.id, "Not mine"))
        .send(app)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_and_upcoming_workouts() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "planner@example.com").await;
    let app = common::test_app(&resources);

    let mut later = common::gym_workout_body(user.id, "Later");
    later["scheduled_date"] = json!("2099-03-10");
    let mut sooner = common::gym_workout_body(user.id, "Sooner");
    sooner["scheduled_date"] = json!("2099-03-01");
    let mut past = common::gym_workout_body(user.id, "Past");
    past["scheduled_date"] = json!("2001-01-01");

    save(&app, &user.token, &later).await;
    save(&app, &user.token, &sooner).await;
    save(&app, &user.token, &past).await;
    save(&app, &user.token, &common::gym_workout_body(user.id, "Unscheduled")).await;

    let all: Vec<Value> = AxumTestRequest::get("/api/saved_workouts/get-all-workouts/")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0]["name"], "Unscheduled");

    let upcoming: Vec<Value> =
        AxumTestRequest::get("/api/saved_workouts/upcoming-workouts/?upcoming=true&limit=5")
            .bearer(&user.token)
            .send(app.clone())
            .await
            .assert_status(StatusCode::OK)
            .json();
    let names: Vec<&str> = upcoming.iter().map(|w| w["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Sooner", "Later"]);

    let limited: Vec<Value> = AxumTestRequest::get("/api/saved_workouts/upcoming-workouts/?limit=1")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .json();
    assert_eq!(limited.len(), 1);

    AxumTestRequest::get(&format!(
        "/api/saved_workouts/get-all-workouts/?user_id={}",
        user.id + 100
    ))
    .bearer(&user.token)
    .send(app)
    .await
    .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_workouts_are_invisible_to_other_users() {
    let resources = common::create_seeded_resources().await;
    let owner = common::create_test_user(&resources, "owner@example.com").await;
    let intruder = common::create_test_user(&resources, "intruder@example.com").await;
    let app = common::test_app(&resources);

    let workout_id = save(&app, &owner.token, &common::gym_workout_body(owner.id, "Private")).await;

    AxumTestRequest::get(&format!(
        "/api/saved_workouts/get-single-workout/{workout_id}/"
    ))
    .bearer(&intruder.token)
    .send(app.clone())
    .await
    .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::delete(&format!("/api/saved_workouts/delete-workout/{workout_id}/"))
        .bearer(&intruder.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::patch(&format!(
        "/api/saved_workouts/update-workout-status/{workout_id}/"
    ))
    .bearer(&intruder.token)
    .json(&json!({ "status": "Started" }))
    .send(app.clone())
    .await
    .assert_status(StatusCode::NOT_FOUND);

    single(&app, &owner.token, workout_id).await;
}

#[tokio::test]
async fn test_update_status_accepts_only_client_statuses() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "status@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user.token, &common::gym_workout_body(user.id, "Push")).await;
    let path = format!("/api/saved_workouts/update-workout-status/{workout_id}/");

    let started: Value = AxumTestRequest::patch(&path)
        .bearer(&user.token)
        .json(&json!({ "status": "Started" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(started["message"], "Workout status updated to Started");

    for bad in ["Saved", "started", "Finished"] {
        let rejected: Value = AxumTestRequest::patch(&path)
            .bearer(&user.token)
            .json(&json!({ "status": bad }))
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST)
            .json();
        assert_eq!(
            rejected["message"],
            r#"Invalid status. Allowed values are: "Started", "Completed", "Scheduled"."#
        );
    }

    AxumTestRequest::patch(&path)
        .bearer(&user.token)
        .json(&json!({ "status": "Completed" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let workout = single(&app, &user.token, workout_id).await;
    assert_eq!(workout["workout"]["status"], "Completed");
    assert!(workout["workout"]["completed_date"].is_string());
}

#[tokio::test]
async fn test_update_date_reschedules_until_completed() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "dates@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user.token, &common::gym_workout_body(user.id, "Pull")).await;
    let path = format!("/api/saved_workouts/update-workout-date/{workout_id}/");

    let moved: Value = AxumTestRequest::patch(&path)
        .bearer(&user.token)
        .json(&json!({ "scheduled_date": "2099-05-04" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(moved["message"], "Workout date updated successfully");
    assert_eq!(
        single(&app, &user.token, workout_id).await["workout"]["scheduled_date"],
        "2099-05-04"
    );

    AxumTestRequest::patch(&path)
        .bearer(&user.token)
        .json(&json!({}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::patch(&format!(
        "/api/saved_workouts/update-workout-status/{workout_id}/"
    ))
    .bearer(&user.token)
    .json(&json!({ "status": "Completed" }))
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK);

    let locked: Value = AxumTestRequest::patch(&path)
        .bearer(&user.token)
        .json(&json!({ "scheduled_date": "2099-06-01" }))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(locked["message"], "Cannot edit the date of a completed workout");
}

#[tokio::test]
async fn test_delete_workout_removes_it() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "delete@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user.token, &common::gym_workout_body(user.id, "Gone")).await;
    let path = format!("/api/saved_workouts/delete-workout/{workout_id}/");

    let deleted: Value = AxumTestRequest::delete(&path)
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(deleted["message"], "Workout deleted successfully");

    AxumTestRequest::delete(&path)
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_save_workout_details_logs_without_completing() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "details@example.com").await;
    let intruder = common::create_test_user(&resources, "nosy@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user.token, &common::gym_workout_body(user.id, "Log me")).await;

    let workout = single(&app, &user.token, workout_id).await;
    let section = &workout["workout"]["workout_sections"][0];
    let section_id = section["id"].as_i64().unwrap();
    let movement_id = section["section_movement_details"][0]["id"].as_i64().unwrap();

    let log = json!({
        "sections": [{
            "section_id": section_id,
            "movements": [{
                "movement_id": movement_id,
                "movement_difficulty": 7,
                "movement_comments": "Felt heavy",
                "sets": [
                    { "set_number": 1, "reps": 5, "weight": 100.0 },
                    { "set_number": 2, "reps": 5, "weight": 102.5 }
                ]
            }]
        }]
    });

    // Another user's sections are skipped
    AxumTestRequest::put("/api/workout_sections/save-workout-details/")
        .bearer(&intruder.token)
        .json(&log)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
    let untouched = single(&app, &user.token, workout_id).await;
    assert_eq!(
        untouched["workout"]["workout_sections"][0]["section_movement_details"][0]["workout_sets"],
        json!([])
    );

    let saved: Value = AxumTestRequest::put("/api/workout_sections/save-workout-details/")
        .bearer(&user.token)
        .json(&log)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(saved["message"], "Workout details saved successfully!");

    let logged = single(&app, &user.token, workout_id).await;
    let detail = &logged["workout"]["workout_sections"][0]["section_movement_details"][0];
    assert_eq!(logged["workout"]["status"], "Saved");
    assert_eq!(detail["movement_difficulty"], 7);
    assert_eq!(detail["movement_comment"], "Felt heavy");
    assert_eq!(detail["workout_sets"].as_array().unwrap().len(), 2);
    assert_eq!(detail["workout_sets"][1]["weight"], 102.5);
}

#[tokio::test]
async fn test_movement_history_uses_the_owners_last_four_completed_dates() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "window@example.com").await;
    let app = common::test_app(&resources);

    let logged = save(&app, &user.token, &common::gym_workout_body(user.id, "Squats")).await;
    let workout = single(&app, &user.token, logged).await;
    let section = &workout["workout"]["workout_sections"][0];
    let squat_slot = section["section_movement_details"][0]["id"].as_i64().unwrap();
    let squat_id = section["section_movement_details"][0]["movements"]["id"]
        .as_i64()
        .unwrap()
        .to_string();
    AxumTestRequest::put(&format!("/api/saved_workouts/complete-workout/{logged}/"))
        .bearer(&user.token)
        .json(&json!({
            "sections": [{
                "section_id": section["id"],
                "movements": [{
                    "movement_id": squat_slot,
                    "sets": [{ "set_number": 1, "reps": 5, "weight": 100.0 }]
                }]
            }]
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let viewed = save(&app, &user.token, &common::gym_workout_body(user.id, "Next")).await;
    let manager = resources.database.workouts();

    // Later runs push the squat date out of the window, whatever their activity
    for days_later in 1..=4 {
        let run = save(&app, &user.token, &common::running_workout_body(user.id)).await;
        manager
            .update_status(
                user.id,
                run,
                WorkoutStatus::Completed,
                today() + Duration::days(days_later),
            )
            .await
            .unwrap();

        let history = single(&app, &user.token, viewed).await["movement_history"][&squat_id].clone();
        if days_later < 4 {
            let entries = history.as_array().unwrap();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0]["sets"][0]["weight"], 100.0);
        } else {
            assert_eq!(history, json!([]));
        }
    }
}

#[tokio::test]
async fn test_mutations_reject_a_mismatched_user_id_query() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "legacy@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user.token, &common::gym_workout_body(user.id, "Mine")).await;
    let other = user.id + 1;

    AxumTestRequest::patch(&format!(
        "/api/saved_workouts/update-workout-status/{workout_id}/?user_id={other}"
    ))
    .bearer(&user.token)
    .json(&json!({ "status": "Started" }))
    .send(app.clone())
    .await
    .assert_status(StatusCode::FORBIDDEN);

    AxumTestRequest::patch(&format!(
        "/api/saved_workouts/update-workout-date/{workout_id}/?user_id={other}"
    ))
    .bearer(&user.token)
    .json(&json!({ "scheduled_date": "2099-01-01" }))
    .send(app.clone())
    .await
    .assert_status(StatusCode::FORBIDDEN);

    AxumTestRequest::put(&format!(
        "/api/saved_workouts/complete-workout/{workout_id}/?user_id={other}"
    ))
    .bearer(&user.token)
    .json(&json!({}))
    .send(app.clone())
    .await
    .assert_status(StatusCode::FORBIDDEN);

    AxumTestRequest::put(&format!(
        "/api/workout_sections/save-workout-details/?user_id={other}"
    ))
    .bearer(&user.token)
    .json(&json!({ "sections": [] }))
    .send(app.clone())
    .await
    .assert_status(StatusCode::FORBIDDEN);

    AxumTestRequest::delete(&format!(
        "/api/saved_workouts/delete-workout/{workout_id}/?user_id={other}"
    ))
    .bearer(&user.token)
    .send(app.clone())
    .await
    .assert_status(StatusCode::FORBIDDEN);

    let untouched = single(&app, &user.token, workout_id).await;
    assert_eq!(untouched["workout"]["status"], "Saved");
    assert!(untouched["workout"]["scheduled_date"].is_null());

    // A matching legacy id is accepted
    AxumTestRequest::patch(&format!(
        "/api/saved_workouts/update-workout-status/{workout_id}/?user_id={}",
        user.id
    ))
    .bearer(&user.token)
    .json(&json!({ "status": "Started" }))
    .send(app)
    .await
    .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_logged_movement_difficulty_is_clamped() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "effort@example.com").await;
    let app = common::test_app(&resources);
    let workout_id = save(&app, &user.token, &common::gym_workout_body(user.id, "Max")).await;

    let workout = single(&app, &user.token, workout_id).await;
    let section = &workout["workout"]["workout_sections"][0];
    let slot = section["section_movement_details"][0]["id"].as_i64().unwrap();

    AxumTestRequest::put("/api/workout_sections/save-workout-details/")
        .bearer(&user.token)
        .json(&json!({
            "sections": [{
                "section_id": section["id"],
                "movements": [{ "movement_id": slot, "movement_difficulty": 15, "sets": [] }]
            }]
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let logged = single(&app, &user.token, workout_id).await;
    assert_eq!(
        logged["workout"]["workout_sections"][0]["section_movement_details"][0]
            ["movement_difficulty"],
        10
    );
}
