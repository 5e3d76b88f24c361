// ABOUTME: HTTP integration tests for health and readiness routes
// ABOUTME: Also checks the request-id and body-limit layers on the full middleware stack
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use helpers::axum_test::AxumTestRequest;
use repforge_server::config::ServerConfig;
use repforge_server::resources::ServerResources;
use repforge_server::server::build_router;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_endpoint_success() {
    let resources = common::create_test_resources().await;

    let response = AxumTestRequest::get("/health")
        .send(common::test_app(&resources))
        .await
        .assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_endpoint_checks_database() {
    let resources = common::create_test_resources().await;

    let response = AxumTestRequest::get("/ready")
        .send(common::test_app(&resources))
        .await
        .assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let resources = common::create_test_resources().await;

    let generated = AxumTestRequest::get("/health")
        .send(common::test_app(&resources))
        .await;
    let request_id = generated.header("x-request-id").expect("request id header");
    assert!(!request_id.is_empty());

    let echoed = AxumTestRequest::get("/health")
        .header("x-request-id", "trace-me-123")
        .send(common::test_app(&resources))
        .await;
    assert_eq!(echoed.header("x-request-id").as_deref(), Some("trace-me-123"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let resources = common::create_test_resources().await;

    let response = AxumTestRequest::get("/api/does-not-exist/")
        .send(common::test_app(&resources))
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_oversized_body_is_rejected_before_handlers() {
    let mut config = ServerConfig::for_testing();
    config.http.max_request_body_bytes = 64;
    let resources = Arc::new(ServerResources::from_config(config).await.unwrap());

    let body = json!({
        "email": "someone-with-a-long-address@example.com",
        "password": "x".repeat(128),
    })
    .to_string();
    let response = AxumTestRequest::post("/api/auth/login/")
        .header("content-type", "application/json")
        .header("content-length", &body.len().to_string())
        .raw_body(&body)
        .send(build_router(&resources))
        .await;
    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

    // Small bodies still reach the handler
    let response = AxumTestRequest::post("/api/auth/login/")
        .json(&json!({ "email": "a@b.c", "password": "pw" }))
        .send(build_router(&resources))
        .await;
    assert_ne!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}
