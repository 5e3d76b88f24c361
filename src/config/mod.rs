// ABOUTME: Configuration management module for server settings
// ABOUTME: Re-exports the environment-driven ServerConfig and its sections
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Configuration for the Repforge server
//!
//! - **Environment**: Server configuration from environment variables

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AuthConfig, Environment, HttpConfig, LogLevel, SchedulerConfig, ServerConfig,
};
