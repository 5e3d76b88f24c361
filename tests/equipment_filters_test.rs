// ABOUTME: Integration tests for the movement catalog, equipment list, and saved equipment filters
// ABOUTME: Covers filter CRUD, per-owner name uniqueness, and filtered movement queries
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
use serde_json::{json, Value};

async fn create_filter(app: &Router, user: &common::TestUser, name: &str, equipment: &[&str]) -> Value {
    AxumTestRequest::post("/api/saved_equipment_filters/create/")
        .bearer(&user.token)
        .json(&json!({ "name": name, "equipmentIds": equipment }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json()
}

fn exercises(movements: &[Value]) -> Vec<&str> {
    movements
        .iter()
        .map(|movement| movement["exercise"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_catalog_routes_are_public() {
    let resources = common::create_seeded_resources().await;
    let app = common::test_app(&resources);

    let movements: Vec<Value> = AxumTestRequest::get("/api/movements/extract-movements/")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(movements.len(), 52);
    assert!(exercises(&movements).contains(&"Back Squat"));

    let equipment: Vec<Value> = AxumTestRequest::get("/api/equipment/")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let names: Vec<&str> = equipment
        .iter()
        .map(|item| item["equipment_name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 13);
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);

    let unfiltered: Vec<Value> = AxumTestRequest::get("/api/movements/filtered-movements/")
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(unfiltered.len(), 52);
}

#[tokio::test]
async fn test_empty_catalog_reports_no_movements() {
    let resources = common::create_test_resources().await;

    let body: Value = AxumTestRequest::get("/api/movements/extract-movements/")
        .send(common::test_app(&resources))
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .json();
    assert_eq!(body["message"], "No movements found.");
}

#[tokio::test]
async fn test_filter_lifecycle() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "garage@example.com").await;
    let app = common::test_app(&resources);

    let created = create_filter(&app, &user, "Garage gym", &["Kettlebell", "Box", "Jetpack"]).await;
    let filter_id = created["id"].as_i64().unwrap();
    assert_eq!(created["filter_name"], "Garage gym");
    // Unknown equipment is ignored
    assert_eq!(created["equipment"], json!(["Box", "Kettlebell"]));

    let fetched: Value = AxumTestRequest::get(&format!(
        "/api/saved_equipment_filters/{filter_id}/get/"
    ))
    .bearer(&user.token)
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(fetched, created);

    let updated: Value = AxumTestRequest::put(&format!(
        "/api/saved_equipment_filters/{filter_id}/update/"
    ))
    .bearer(&user.token)
    .json(&json!({ "name": "Home", "equipmentIds": ["Dumbbell"] }))
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(updated["filter_name"], "Home");
    assert_eq!(updated["equipment"], json!(["Dumbbell"]));

    let all: Vec<Value> = AxumTestRequest::get("/api/saved_equipment_filters/get_all/")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(all.len(), 1);

    AxumTestRequest::delete(&format!(
        "/api/saved_equipment_filters/{filter_id}/delete/"
    ))
    .bearer(&user.token)
    .send(app.clone())
    .await
    .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::get(&format!(
        "/api/saved_equipment_filters/{filter_id}/get/"
    ))
    .bearer(&user.token)
    .send(app)
    .await
    .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filter_names_are_unique_per_owner() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "names@example.com").await;
    let other = common::create_test_user(&resources, "names2@example.com").await;
    let app = common::test_app(&resources);

    create_filter(&app, &user, "Travel", &["Bodyweight"]).await;
    let second = create_filter(&app, &user, "Hotel", &["Dumbbell"]).await;
    // Another user may reuse the name
    create_filter(&app, &other, "Travel", &["Bodyweight"]).await;

    let duplicate: Value = AxumTestRequest::post("/api/saved_equipment_filters/create/")
        .bearer(&user.token)
        .json(&json!({ "name": "Travel", "equipmentIds": [] }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(duplicate["message"], "Filter with this name already exists for this user.");

    let rename: Value = AxumTestRequest::put(&format!(
        "/api/saved_equipment_filters/{}/update/",
        second["id"]
    ))
    .bearer(&user.token)
    .json(&json!({ "name": "Travel", "equipmentIds": ["Dumbbell"] }))
    .send(app.clone())
    .await
    .assert_status(StatusCode::BAD_REQUEST)
    .json();
    assert_eq!(rename["message"], "Filter name must be unique for this user.");

    AxumTestRequest::post("/api/saved_equipment_filters/create/")
        .bearer(&user.token)
        .json(&json!({ "name": "  ", "equipmentIds": ["Box"] }))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_filters_are_private() {
    let resources = common::create_seeded_resources().await;
    let owner = common::create_test_user(&resources, "private@example.com").await;
    let other = common::create_test_user(&resources, "peek@example.com").await;
    let app = common::test_app(&resources);
    let filter = create_filter(&app, &owner, "Mine", &["Box"]).await;
    let filter_id = filter["id"].as_i64().unwrap();

    AxumTestRequest::get(&format!("/api/saved_equipment_filters/{filter_id}/get/"))
        .bearer(&other.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::delete(&format!(
        "/api/saved_equipment_filters/{filter_id}/delete/"
    ))
    .bearer(&other.token)
    .send(app.clone())
    .await
    .assert_status(StatusCode::NOT_FOUND);

    let theirs: Vec<Value> = AxumTestRequest::get("/api/saved_equipment_filters/get_all/")
        .bearer(&other.token)
        .send(app)
        .await
        .json();
    assert!(theirs.is_empty());
}

#[tokio::test]
async fn test_filtered_movements_match_any_equipment() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "filter@example.com").await;
    let app = common::test_app(&resources);
    let filter = create_filter(&app, &user, "Plyo", &["Kettlebell", "Box"]).await;
    let path = format!("/api/movements/filtered-movements/?filter_id={}", filter["id"]);

    let matching: Vec<Value> = AxumTestRequest::get(&path)
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let mut names = exercises(&matching);
    names.sort_unstable();
    assert_eq!(names, vec!["Box Jump", "Goblet Squat", "Kettlebell Swing", "Step Up"]);

    AxumTestRequest::get(&path)
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let empty = create_filter(&app, &user, "Nothing", &[]).await;
    let none: Vec<Value> = AxumTestRequest::get(&format!(
        "/api/movements/filtered-movements/?filter_id={}",
        empty["id"]
    ))
    .bearer(&user.token)
    .send(app)
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert!(none.is_empty());
}
