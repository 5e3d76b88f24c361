// ABOUTME: Environment configuration for deployment-specific server settings
// ABOUTME: Parses environment variables into a typed ServerConfig with validation and a summary banner
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration management

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use repforge_core::constants::{ports, users};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Development-only signing secret used when `JWT_SECRET` is unset
const DEV_JWT_SECRET: &str = "repforge-development-secret-change-me-before-deploying";

/// Minimum production secret length in bytes
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Default
    #[default]
    Info,
    /// Verbose
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback to info
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Live deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback to development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
            Self::Testing => f.write_str("testing"),
        }
    }
}

/// Token signing settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// bcrypt work factor for stored passwords
    pub bcrypt_cost: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// HTTP layer limits and CORS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Allowed origins; `["*"]` allows any
    pub cors_allowed_origins: Vec<String>,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Maximum request body size
    pub max_request_body_bytes: usize,
}

/// Background job intervals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Run the background jobs at all
    pub enabled: bool,
    /// Leaderboard recompute interval
    pub leaderboard_refresh_secs: u64,
    /// User statistics recompute interval
    pub user_stats_refresh_secs: u64,
    /// Due-notification poll interval
    pub notification_poll_secs: u64,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// `SQLite` connection URL
    pub database_url: String,
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Token settings
    pub auth: AuthConfig,
    /// HTTP layer settings
    pub http: HttpConfig,
    /// Background jobs
    pub scheduler: SchedulerConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables (and `.env` when present)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {e}");
        }

        let environment = Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using the development signing secret");
            DEV_JWT_SECRET.to_owned()
        });

        let config = Self {
            http_port: parse_env("HTTP_PORT", ports::DEFAULT_HTTP_PORT)?,
            database_url: env_var_or("DATABASE_URL", "sqlite:./data/repforge.db"),
            environment,
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: parse_env("JWT_EXPIRY_HOURS", users::DEFAULT_TOKEN_EXPIRY_HOURS)?,
                bcrypt_cost: parse_env("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            },
            http: HttpConfig {
                cors_allowed_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "*")),
                request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30)?,
                max_request_body_bytes: parse_env("MAX_REQUEST_BODY_BYTES", 1024 * 1024)?,
            },
            scheduler: SchedulerConfig {
                enabled: parse_env("SCHEDULER_ENABLED", true)?,
                leaderboard_refresh_secs: parse_env("LEADERBOARD_REFRESH_SECS", 86_400)?,
                user_stats_refresh_secs: parse_env("USER_STATS_REFRESH_SECS", 86_400)?,
                notification_poll_secs: parse_env("NOTIFICATION_POLL_SECS", 60)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Configuration for tests: in-memory database, fixed secret, no background jobs
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            http_port: 0,
            database_url: "sqlite::memory:".to_owned(),
            environment: Environment::Testing,
            log_level: LogLevel::Warn,
            auth: AuthConfig {
                jwt_secret: "repforge-test-secret-0123456789abcdef".to_owned(),
                jwt_expiry_hours: users::DEFAULT_TOKEN_EXPIRY_HOURS,
                bcrypt_cost: 4,
            },
            http: HttpConfig {
                cors_allowed_origins: vec!["*".to_owned()],
                request_timeout_secs: 30,
                max_request_body_bytes: 1024 * 1024,
            },
            scheduler: SchedulerConfig {
                enabled: false,
                leaderboard_refresh_secs: 86_400,
                user_stats_refresh_secs: 86_400,
                notification_poll_secs: 60,
            },
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error for a zero port in production, a short production secret, or zero intervals
    pub fn validate(&self) -> Result<()> {
        if self.environment.is_production() {
            if self.http_port == 0 {
                return Err(anyhow!("HTTP_PORT must be non-zero in production"));
            }
            if self.auth.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN
                || self.auth.jwt_secret == DEV_JWT_SECRET
            {
                return Err(anyhow!(
                    "JWT_SECRET must be set to at least {MIN_PRODUCTION_SECRET_LEN} bytes in production"
                ));
            }
        }

        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(anyhow!("BCRYPT_COST must be between 4 and 31"));
        }

        let intervals = [
            ("LEADERBOARD_REFRESH_SECS", self.scheduler.leaderboard_refresh_secs),
            ("USER_STATS_REFRESH_SECS", self.scheduler.user_stats_refresh_secs),
            ("NOTIFICATION_POLL_SECS", self.scheduler.notification_poll_secs),
            ("REQUEST_TIMEOUT_SECS", self.http.request_timeout_secs),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, secs)| *secs == 0) {
            return Err(anyhow!("{name} must be greater than zero"));
        }

        if self.http.cors_allowed_origins.is_empty() {
            warn!("CORS_ALLOWED_ORIGINS is empty; browser clients will be rejected");
        }

        Ok(())
    }

    /// Human readable startup banner
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Repforge Server Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - Token Expiry: {}h\n\
             - CORS Origins: {}\n\
             - Request Timeout: {}s\n\
             - Scheduler: {}",
            self.http_port,
            self.environment,
            self.log_level,
            redact_database_url(&self.database_url),
            self.auth.jwt_expiry_hours,
            self.http.cors_allowed_origins.join(", "),
            self.http.request_timeout_secs,
            if self.scheduler.enabled {
                format!(
                    "leaderboard {}s, stats {}s, notifications {}s",
                    self.scheduler.leaderboard_refresh_secs,
                    self.scheduler.user_stats_refresh_secs,
                    self.scheduler.notification_poll_secs
                )
            } else {
                "disabled".to_owned()
            }
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, using `default` when unset
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        Err(_) => Ok(default),
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins: &str) -> Vec<String> {
    if origins.trim() == "*" {
        return vec!["*".to_owned()];
    }
    origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Keep only the scheme and path of a database URL
fn redact_database_url(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("http://a.test, http://b.test,"),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn test_production_requires_long_secret() {
        let mut config = ServerConfig::for_testing();
        config.http_port = 8081;
        config.environment = Environment::Production;
        config.auth.jwt_secret = "short".to_owned();
        assert!(config.validate().is_err());

        config.auth.jwt_secret = "x".repeat(MIN_PRODUCTION_SECRET_LEN);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = ServerConfig::for_testing();
        config.scheduler.notification_poll_secs = 0;
        let err = config.validate().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("NOTIFICATION_POLL_SECS"));
    }

    #[test]
    fn test_summary_mentions_port() {
        let config = ServerConfig::for_testing();
        assert!(config.summary().contains("HTTP Port: 0"));
    }
}
