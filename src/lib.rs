// ABOUTME: Main library entry point for the Repforge training API
// ABOUTME: Wires accounts, workouts, completion logging, scoring, planning, and chat over HTTP
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Repforge Server
//!
//! The HTTP backend for the Repforge training apps. Users register, plan gym,
//! running, HIIT and mobility workouts, log what they actually did, and earn
//! points on a leaderboard.
//!
//! ## Architecture
//!
//! - **Routes**: axum routers, one per resource, mounted under `/api`
//! - **Services**: multi-step operations such as saving and completing workouts
//! - **Database**: `SQLite` managers, one per table group
//! - **Scheduler**: periodic leaderboard, statistics, and reminder jobs
//!
//! Domain models and the error type live in `repforge-core`; the workout
//! generators live in `repforge-planner`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use repforge_server::config::ServerConfig;
//! use repforge_server::resources::ServerResources;
//! use repforge_server::server::RepforgeServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let port = config.http_port;
//!     let resources = Arc::new(ServerResources::from_config(config).await?);
//!     RepforgeServer::new(resources).run(port).await
//! }
//! ```

/// JWT issuing and password hashing
pub mod auth;

/// Environment-driven server configuration
pub mod config;

/// `SQLite` persistence, one manager per table group
pub mod database;

/// Structured logging setup and helpers
pub mod logging;

/// Request tracing, authentication extractor, and CORS
pub mod middleware;

/// Shared resources handed to every handler
pub mod resources;

/// HTTP routes
pub mod routes;

/// Background jobs
pub mod scheduler;

/// Embedded catalog seeding
pub mod seed;

/// Server assembly and graceful shutdown
pub mod server;

/// Multi-step domain operations used by the routes
pub mod services;
