// ABOUTME: HTTP integration tests for registration, login, and profile routes
// ABOUTME: Covers validation messages, token enforcement, and owner-only profile access
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

#[tokio::test]
async fn test_register_returns_token_and_user_id() {
    let resources = common::create_test_resources().await;

    let response = AxumTestRequest::post("/api/auth/register/")
        .json(&json!({
            "email": "ada@example.com",
            "password": common::TEST_PASSWORD,
            "first_name": "Ada",
            "last_name": "Lovelace"
        }))
        .send(common::test_app(&resources))
        .await
        .assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    let user_id = body["user_id"].as_i64().unwrap();

    let user = resources.database.users().require_user(user_id).await.unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.username.len(), 15);
    assert!(!user.is_onboarding_complete);
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let resources = common::create_test_resources().await;
    common::create_test_user(&resources, "dup@example.com").await;

    let response = AxumTestRequest::post("/api/auth/register/")
        .json(&json!({ "email": "dup@example.com", "password": common::TEST_PASSWORD }))
        .send(common::test_app(&resources))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["message"], "A user with this email already exists.");
}

#[tokio::test]
async fn test_register_rejects_taken_username_and_bad_input() {
    let resources = common::create_test_resources().await;
    let app = common::test_app(&resources);

    AxumTestRequest::post("/api/auth/register/")
        .json(&json!({ "email": "one@example.com", "password": common::TEST_PASSWORD, "username": "lifter" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);

    let taken: Value = AxumTestRequest::post("/api/auth/register/")
        .json(&json!({ "email": "two@example.com", "password": common::TEST_PASSWORD, "username": "lifter" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(taken["message"], "A user with that username already exists.");

    AxumTestRequest::post("/api/auth/register/")
        .json(&json!({ "email": "not-an-email", "password": common::TEST_PASSWORD }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/auth/register/")
        .json(&json!({ "email": "short@example.com", "password": "abc" }))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_success_and_failures() {
    let resources = common::create_test_resources().await;
    let user = common::create_test_user(&resources, "runner@example.com").await;
    let app = common::test_app(&resources);

    let ok: Value = AxumTestRequest::post("/api/auth/login/")
        .json(&json!({ "email": user.email, "password": common::TEST_PASSWORD }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::ACCEPTED)
        .json();
    assert_eq!(ok["user_id"], user.id);
    assert_eq!(ok["message"], "Welcome back, runner@example.com");
    assert_eq!(ok["user"]["is_onboarding_complete"], false);

    let bad: Value = AxumTestRequest::post("/api/auth/login/")
        .json(&json!({ "email": user.email, "password": "wrong-password" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .json();
    assert_eq!(bad["message"], "Invalid credentials");

    AxumTestRequest::post("/api/auth/login/")
        .json(&json!({ "email": "nobody@example.com", "password": common::TEST_PASSWORD }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let missing: Value = AxumTestRequest::post("/api/auth/login/")
        .json(&json!({ "email": user.email }))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(missing["message"], "Email and password are required.");

    let stored = resources.database.users().require_user(user.id).await.unwrap();
    assert!(stored.first_login.is_some());
    assert!(stored.last_login.is_some());
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
    let resources = common::create_test_resources().await;
    let user = common::create_test_user(&resources, "guarded@example.com").await;
    let app = common::test_app(&resources);
    let path = format!("/api/auth/full-profile/{}/", user.id);

    AxumTestRequest::get(&path)
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let forged = AxumTestRequest::get(&path)
        .bearer("not.a.token")
        .send(app.clone())
        .await;
    assert!(forged.status() == 401 || forged.status() == 403);

    AxumTestRequest::get(&path)
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_profile_views_and_owner_only_updates() {
    let resources = common::create_test_resources().await;
    let owner = common::create_test_user(&resources, "owner@example.com").await;
    let other = common::create_test_user(&resources, "other@example.com").await;
    let app = common::test_app(&resources);

    let viewed: Value = AxumTestRequest::get(&format!("/api/auth/profile/{}/", owner.id))
        .bearer(&other.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(viewed["email"], "owner@example.com");

    AxumTestRequest::get(&format!("/api/auth/full-profile/{}/", owner.id))
        .bearer(&other.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    AxumTestRequest::patch(&format!("/api/auth/update-profile/{}/", owner.id))
        .bearer(&other.token)
        .json(&json!({ "first_name": "Mallory" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let updated: Value = AxumTestRequest::patch(&format!("/api/auth/update-profile/{}/", owner.id))
        .bearer(&owner.token)
        .json(&json!({ "first_name": "Grace", "username": "grace" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(updated["first_name"], "Grace");
    assert_eq!(updated["username"], "grace");

    AxumTestRequest::patch(&format!("/api/auth/update-profile/{}/", other.id))
        .bearer(&other.token)
        .json(&json!({ "username": "grace" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::get("/api/auth/profile/9999/")
        .bearer(&owner.token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_complete_onboarding_and_full_profile() {
    let resources = common::create_test_resources().await;
    let user = common::create_test_user(&resources, "new@example.com").await;
    let app = common::test_app(&resources);

    let done: Value = AxumTestRequest::post(&format!("/api/auth/complete-onboarding/{}/", user.id))
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(done["message"], "Onboarding completed");

    let profile: Value = AxumTestRequest::get(&format!("/api/auth/full-profile/{}/", user.id))
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(profile["user"]["is_onboarding_complete"], true);
    assert_eq!(profile["stats"]["workouts_all_time"], 0);
    assert_eq!(profile["stats"]["recent_workouts"], json!([]));
}
