// ABOUTME: HTTP integration tests for chat rooms and room messages
// ABOUTME: Covers seeded rooms, room creation, posting, and newest-first paging
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
async fn test_seeded_rooms_are_listed_by_name() {
    let resources = common::create_seeded_resources().await;

    let rooms: Vec<Value> = AxumTestRequest::get("/api/chat/rooms/")
        .send(common::test_app(&resources))
        .await
        .assert_status(StatusCode::OK)
        .json();
    let names: Vec<&str> = rooms.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["General", "HIIT", "Mobility", "Running", "Strength"]);
}

#[tokio::test]
async fn test_create_room_requires_token_and_unique_name() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "host@example.com").await;
    let app = common::test_app(&resources);

    AxumTestRequest::post("/api/chat/rooms/")
        .json(&json!({ "name": "Hyrox" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let room: Value = AxumTestRequest::post("/api/chat/rooms/")
        .bearer(&user.token)
        .json(&json!({ "name": "  Hyrox  " }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(room["name"], "Hyrox");

    AxumTestRequest::post("/api/chat/rooms/")
        .bearer(&user.token)
        .json(&json!({ "name": "Hyrox" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CONFLICT);

    AxumTestRequest::post("/api/chat/rooms/")
        .bearer(&user.token)
        .json(&json!({ "name": "" }))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_messages_page_newest_first() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "chatty@example.com").await;
    let app = common::test_app(&resources);
    let rooms: Vec<Value> = AxumTestRequest::get("/api/chat/rooms/")
        .send(app.clone())
        .await
        .json();
    let general = rooms[0]["id"].as_i64().unwrap();
    let path = format!("/api/chat/rooms/{general}/messages/");

    for n in 1..=5 {
        let posted: Value = AxumTestRequest::post(&path)
            .bearer(&user.token)
            .json(&json!({ "content": format!("message {n}") }))
            .send(app.clone())
            .await
            .assert_status(StatusCode::CREATED)
            .json();
        assert_eq!(posted["owner_id"], user.id);
        assert_eq!(posted["room_id"], general);
    }

    let first_page: Vec<Value> = AxumTestRequest::get(&format!("{path}?limit=2"))
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let contents: Vec<&str> = first_page.iter().map(|m| m["content"].as_str().unwrap()).collect();
    assert_eq!(contents, vec!["message 5", "message 4"]);

    let second_page: Vec<Value> = AxumTestRequest::get(&format!("{path}?offset=2&limit=2"))
        .bearer(&user.token)
        .send(app.clone())
        .await
        .json();
    assert_eq!(second_page[0]["content"], "message 3");

    let profile = resources.database.users().require_user(user.id).await.unwrap();
    assert_eq!(first_page[0]["username"], profile.username);

    AxumTestRequest::get(&path)
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_posting_checks_room_author_and_content() {
    let resources = common::create_seeded_resources().await;
    let user = common::create_test_user(&resources, "poster@example.com").await;
    let other = common::create_test_user(&resources, "other@example.com").await;
    let app = common::test_app(&resources);

    AxumTestRequest::post("/api/chat/rooms/9999/messages/")
        .bearer(&user.token)
        .json(&json!({ "content": "hello?" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::get("/api/chat/rooms/9999/messages/")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let rooms: Vec<Value> = AxumTestRequest::get("/api/chat/rooms/")
        .send(app.clone())
        .await
        .json();
    let path = format!("/api/chat/rooms/{}/messages/", rooms[0]["id"]);

    AxumTestRequest::post(&path)
        .bearer(&user.token)
        .json(&json!({ "content": "   " }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post(&path)
        .bearer(&user.token)
        .json(&json!({ "user_id": other.id, "content": "impersonating" }))
        .send(app)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
