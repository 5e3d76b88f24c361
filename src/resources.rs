// ABOUTME: Centralized resource container shared by every route handler and background job
// ABOUTME: Holds the database, the token manager, and the loaded server configuration
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Server Resources
//!
//! Built once at startup and handed to routers as `Arc<ServerResources>`.

use std::sync::Arc;

use anyhow::Result;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;

/// Centralized resource container for dependency injection
#[derive(Clone, Debug)]
pub struct ServerResources {
    /// Database pool and managers
    pub database: Arc<Database>,
    /// JWT issuing and password hashing
    pub auth: Arc<AuthManager>,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Assemble resources from already constructed parts
    #[must_use]
    pub fn new(database: Database, auth: AuthManager, config: ServerConfig) -> Self {
        Self {
            database: Arc::new(database),
            auth: Arc::new(auth),
            config: Arc::new(config),
        }
    }

    /// Open the database and build the token manager from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    pub async fn from_config(config: ServerConfig) -> Result<Self> {
        let database = Database::new(&config.database_url).await?;
        let auth = AuthManager::new(config.auth.jwt_secret.as_bytes(), config.auth.jwt_expiry_hours)
            .with_bcrypt_cost(config.auth.bcrypt_cost);
        Ok(Self::new(database, auth, config))
    }
}
