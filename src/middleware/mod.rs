// ABOUTME: HTTP middleware for request tracing, authentication, and CORS
// ABOUTME: Provides the bearer-token extractor, request spans, and the CORS layer
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub mod auth;
pub mod cors;
pub mod tracing;

// Authentication
pub use auth::AuthUser;

// CORS configuration
pub use cors::setup_cors;

// Request tracing
pub use tracing::{create_request_span, log_requests, REQUEST_ID_HEADER};
