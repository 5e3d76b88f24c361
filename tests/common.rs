// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory resources, the layered router, users, and workout payloads
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `repforge_server`

use std::env;
use std::sync::{Arc, Once};

use axum::Router;
use chrono::NaiveDate;
use repforge_core::models::RegisterRequest;
use repforge_server::config::ServerConfig;
use repforge_server::resources::ServerResources;
use repforge_server::seed::seed_catalog;
use repforge_server::server::build_router;
use repforge_server::services::accounts;
use serde_json::{json, Value};

static INIT_LOGGER: Once = Once::new();

/// Password every fixture user registers with
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Resources over a fresh in-memory database with an empty catalog
pub async fn create_test_resources() -> Arc<ServerResources> {
    init_test_logging();
    let resources = ServerResources::from_config(ServerConfig::for_testing())
        .await
        .expect("Failed to create test resources");
    Arc::new(resources)
}

/// Resources with the embedded catalog seeded
pub async fn create_seeded_resources() -> Arc<ServerResources> {
    let resources = create_test_resources().await;
    seed_catalog(&resources.database, false)
        .await
        .expect("Failed to seed catalog");
    resources
}

/// The full application router, middleware included
pub fn test_app(resources: &Arc<ServerResources>) -> Router {
    build_router(resources)
}

/// A registered user and their session token
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

/// Register a user through the account service
pub async fn create_test_user(resources: &ServerResources, email: &str) -> TestUser {
    let request = RegisterRequest {
        email: email.to_owned(),
        password: TEST_PASSWORD.to_owned(),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
        username: None,
    };
    let response = accounts::register(resources, &request)
        .await
        .expect("Failed to register test user");
    TestUser {
        id: response.user_id,
        email: email.to_owned(),
        token: response.token,
    }
}

/// A fixed date for deterministic scheduling
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A two-section gym workout over seeded movements
pub fn gym_workout_body(user_id: i64, name: &str) -> Value {
    json!({
        "user_id": user_id,
        "name": name,
        "description": "Custom generated workout",
        "duration": 45,
        "complexity": 2,
        "activity_type": "Gym",
        "sections": [
            {
                "section_name": "Workout part 1",
                "section_order": 1,
                "section_type": "single",
                "movements": [{ "movement_name": "Back Squat", "movement_order": 1 }]
            },
            {
                "section_name": "Workout part 2",
                "section_order": 2,
                "section_type": "superset",
                "movements": [
                    { "movement_name": "Push Up", "movement_order": 1 },
                    { "movement_name": "Dumbbell Row", "movement_order": 2 }
                ]
            }
        ]
    })
}

/// A single-interval running workout with four 400 m repeats
pub fn running_workout_body(user_id: i64) -> Value {
    json!({
        "user_id": user_id,
        "name": "400m repeats",
        "duration": 45,
        "activity_type": "Running",
        "running_sessions": {
            "warmup_distance": 2.0,
            "cooldown_distance": 1.5,
            "total_distance": 5.1,
            "saved_intervals": [
                { "repeat_variation": 1, "repeats": 4, "repeat_distance": 0.4, "target_pace": 255 }
            ]
        }
    })
}

/// A short HIIT workout built from seeded movements
pub fn hiit_workout_body(user_id: i64) -> Value {
    json!({
        "user_id": user_id,
        "name": "Tabata 16",
        "duration": 16,
        "activity_type": "Hiit",
        "workout_type": "Tabata",
        "structure": "20s work / 10s rest",
        "sections": [{
            "block_name": "Workout Block",
            "movements": [
                { "exercise": "Burpee", "movement_order": 1 },
                { "exercise": "Air Squat", "movement_order": 2 }
            ]
        }]
    })
}
